use std::cell::RefCell;
use std::rc::Rc;

use flockview_common::WorldSnapshot;

/// Failures reported by an engine (or by access to its shared handle).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("engine step failed: {0}")]
    Step(String),
    #[error("engine world snapshot failed: {0}")]
    World(String),
    #[error("engine train failed: {0}")]
    Train(String),
    /// The handle was re-entered while another call held it.
    #[error("engine handle is already borrowed")]
    Busy,
}

/// The external simulation, as seen by the driver.
///
/// Implementations own every simulation rule; callers only advance it,
/// read it back, and trigger generation changes.
pub trait Engine {
    /// Advance one tick.
    fn step(&mut self) -> Result<(), EngineError>;

    /// Produce a fresh snapshot of the current world.
    fn world(&self) -> Result<WorldSnapshot, EngineError>;

    /// Advance one generation and describe the result.
    fn train(&mut self) -> Result<String, EngineError>;
}

/// Cheaply clonable handle to one engine instance.
///
/// The render loop and the control binding each hold a clone. Calls borrow
/// the engine only for their own duration, so interleaving between the two
/// call sites is safe on a single thread.
#[derive(Debug)]
pub struct SharedEngine<E> {
    inner: Rc<RefCell<E>>,
}

impl<E> Clone for SharedEngine<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: Engine> SharedEngine<E> {
    pub fn new(engine: E) -> Self {
        Self {
            inner: Rc::new(RefCell::new(engine)),
        }
    }

    pub fn step(&self) -> Result<(), EngineError> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| EngineError::Busy)?
            .step()
    }

    pub fn world(&self) -> Result<WorldSnapshot, EngineError> {
        self.inner
            .try_borrow()
            .map_err(|_| EngineError::Busy)?
            .world()
    }

    pub fn train(&self) -> Result<String, EngineError> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| EngineError::Busy)?
            .train()
    }

    /// Read-only access to the concrete engine (inspection, tests).
    pub fn inspect<R>(&self, f: impl FnOnce(&E) -> R) -> Result<R, EngineError> {
        let engine = self.inner.try_borrow().map_err(|_| EngineError::Busy)?;
        Ok(f(&engine))
    }

    /// Number of live handles to this engine.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }
}
