/// Cancels logic units instead of changing state.
///
/// A poison pill is never forwarded to reducers. With `kill` set, every unit
/// is killed for good; without it, units are only canceled and resume on the
/// next action they handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoisonPill {
    pub reason: String,
    pub kill: bool,
}

impl PoisonPill {
    /// A fatal pill.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            kill: true,
        }
    }

    pub fn non_fatal(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            kill: false,
        }
    }
}
