use flockview_kernel::{Engine, EngineError, SharedEngine};

use crate::action::Action;

/// Stable identifier of the generation-advance control.
pub const TRAIN_CONTROL_ID: &str = "train";

/// Wires one clickable control to an action on the shared engine.
///
/// Fire-and-forget relative to the render loop: a trigger runs to completion
/// on the caller's turn and does not pause, lock, or signal the driver.
#[derive(Debug)]
pub struct ControlBinding<E> {
    control_id: String,
    action: Action,
    engine: SharedEngine<E>,
}

impl<E: Engine> ControlBinding<E> {
    pub fn new(control_id: impl Into<String>, action: Action, engine: SharedEngine<E>) -> Self {
        Self {
            control_id: control_id.into(),
            action,
            engine,
        }
    }

    /// The standard `train` control.
    pub fn train(engine: SharedEngine<E>) -> Self {
        Self::new(TRAIN_CONTROL_ID, Action::Train, engine)
    }

    /// Handle a click on `control_id`. Clicks on other controls are ignored
    /// and yield `Ok(None)`.
    pub fn on_trigger(&self, control_id: &str) -> Result<Option<String>, EngineError> {
        if control_id != self.control_id {
            tracing::debug!(control_id, "ignoring unbound control");
            return Ok(None);
        }
        self.dispatch(self.action)
    }

    /// Run an action against the engine and report its summary.
    pub fn dispatch(&self, action: Action) -> Result<Option<String>, EngineError> {
        match action {
            Action::Train => match self.engine.train() {
                Ok(summary) => {
                    tracing::info!(control = %self.control_id, action = action.label(), %summary);
                    Ok(Some(summary))
                }
                Err(e) => {
                    tracing::error!(
                        control = %self.control_id,
                        action = action.label(),
                        "failed: {e}"
                    );
                    Err(e)
                }
            },
            Action::Noop => {
                tracing::debug!(control = %self.control_id, action = action.label());
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flockview_common::WorldSnapshot;

    #[derive(Default)]
    struct Tally {
        steps: u32,
        trains: u32,
        fail_train: bool,
    }

    impl Engine for Tally {
        fn step(&mut self) -> Result<(), EngineError> {
            self.steps += 1;
            Ok(())
        }

        fn world(&self) -> Result<WorldSnapshot, EngineError> {
            Ok(WorldSnapshot::default())
        }

        fn train(&mut self) -> Result<String, EngineError> {
            if self.fail_train {
                return Err(EngineError::Train("diverged".into()));
            }
            self.trains += 1;
            Ok(format!("generation {}", self.trains))
        }
    }

    #[test]
    fn trigger_trains_without_stepping() {
        let engine = SharedEngine::new(Tally::default());
        let control = ControlBinding::train(engine.clone());

        assert_eq!(
            control.on_trigger(TRAIN_CONTROL_ID).unwrap(),
            Some("generation 1".to_string())
        );
        assert_eq!(engine.inspect(|e| (e.steps, e.trains)).unwrap(), (0, 1));
    }

    #[test]
    fn other_controls_are_ignored() {
        let engine = SharedEngine::new(Tally::default());
        let control = ControlBinding::train(engine.clone());
        assert_eq!(control.on_trigger("reset").unwrap(), None);
        assert_eq!(engine.inspect(|e| e.trains).unwrap(), 0);
    }

    #[test]
    fn noop_binding_leaves_engine_alone() {
        let engine = SharedEngine::new(Tally::default());
        let control = ControlBinding::new("spare", Action::Noop, engine.clone());
        assert_eq!(control.on_trigger("spare").unwrap(), None);
        assert_eq!(engine.inspect(|e| e.trains).unwrap(), 0);
    }

    #[test]
    fn train_failure_propagates() {
        let engine = SharedEngine::new(Tally {
            fail_train: true,
            ..Tally::default()
        });
        let control = ControlBinding::train(engine);
        assert_eq!(
            control.on_trigger(TRAIN_CONTROL_ID),
            Err(EngineError::Train("diverged".into()))
        );
    }
}
