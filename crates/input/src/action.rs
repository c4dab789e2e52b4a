/// A high-level action a control can produce.
///
/// The engine consumes actions, never raw UI events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Advance the engine by one generation.
    Train,
    /// No-op (used for controls that haven't been bound yet).
    Noop,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Train => "train",
            Action::Noop => "noop",
        }
    }
}
