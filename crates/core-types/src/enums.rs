use std::fmt;

/// The lifecycle of a built action.
///
/// Transitions are monotonic: `Pending -> Started -> Complete | Failed`.
/// `Cancelled` is reserved for cancellable action kinds; the built-in
/// non-query action never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActionStatus {
    #[default]
    Pending,
    Started,
    Complete,
    Cancelled,
    Failed,
}

impl ActionStatus {
    /// Returns true once the action can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ActionStatus::Complete | ActionStatus::Cancelled | ActionStatus::Failed
        )
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionStatus::Pending => "Pending",
            ActionStatus::Started => "Started",
            ActionStatus::Complete => "Complete",
            ActionStatus::Cancelled => "Cancelled",
            ActionStatus::Failed => "Failed",
        };
        f.write_str(label)
    }
}

/// Whether a repository currently holds a live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Closed,
    Open,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_finished_states_are_terminal() {
        assert!(!ActionStatus::Pending.is_terminal());
        assert!(!ActionStatus::Started.is_terminal());
        assert!(ActionStatus::Complete.is_terminal());
        assert!(ActionStatus::Cancelled.is_terminal());
        assert!(ActionStatus::Failed.is_terminal());
    }

    #[test]
    fn defaults_match_initial_states() {
        assert_eq!(ActionStatus::default(), ActionStatus::Pending);
        assert_eq!(ConnectionState::default(), ConnectionState::Closed);
    }
}
