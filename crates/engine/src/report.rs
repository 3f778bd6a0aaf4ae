use actions::ActionError;
use chrono::{DateTime, Utc};
use configuration::RunSettings;
use core_types::ActionStatus;

/// What to do with the remaining actions once one fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPolicy {
    /// Later actions are skipped and stay `Pending`.
    #[default]
    StopOnFailure,
    ContinueOnFailure,
}

impl RunPolicy {
    pub fn from_continue_flag(continue_on_error: bool) -> Self {
        if continue_on_error {
            RunPolicy::ContinueOnFailure
        } else {
            RunPolicy::StopOnFailure
        }
    }

    /// The document's `run` settings, with a command-line flag that can only
    /// switch continuing on.
    pub fn from_settings(settings: &RunSettings, continue_on_error: bool) -> Self {
        Self::from_continue_flag(continue_on_error || settings.continue_on_error)
    }
}

/// How a single action ended.
#[derive(Debug)]
pub enum ActionOutcome {
    Completed { rows: u64 },
    Failed(ActionError),
    /// Not run because an earlier action failed.
    Skipped,
}

#[derive(Debug)]
pub struct ActionReport {
    pub name: String,
    pub action_type: String,
    pub status: ActionStatus,
    pub outcome: ActionOutcome,
}

impl ActionReport {
    /// The SQL text of every statement that failed, if the action failed on statements.
    pub fn failed_statements(&self) -> Vec<&str> {
        match &self.outcome {
            ActionOutcome::Failed(error) => error
                .execution_error()
                .map(|source| {
                    source
                        .statement_failures()
                        .iter()
                        .map(|failure| failure.sql.as_str())
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

/// The result of running every action of an engine once, in order.
#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub actions: Vec<ActionReport>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.actions
            .iter()
            .all(|report| matches!(report.outcome, ActionOutcome::Completed { .. }))
    }

    pub fn total_rows(&self) -> u64 {
        self.actions
            .iter()
            .map(|report| match report.outcome {
                ActionOutcome::Completed { rows } => rows,
                _ => 0,
            })
            .fold(0u64, u64::saturating_add)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ActionReport> {
        self.actions
            .iter()
            .filter(|report| matches!(report.outcome, ActionOutcome::Failed(_)))
    }

    pub fn get(&self, name: &str) -> Option<&ActionReport> {
        self.actions.iter().find(|report| report.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(name: &str, rows: u64) -> ActionReport {
        ActionReport {
            name: name.to_string(),
            action_type: "nonquery".to_string(),
            status: ActionStatus::Complete,
            outcome: ActionOutcome::Completed { rows },
        }
    }

    #[test]
    fn flag_or_document_setting_turns_continuing_on() {
        let off = RunSettings::default();
        let on = RunSettings {
            continue_on_error: true,
        };

        assert_eq!(RunPolicy::from_settings(&off, false), RunPolicy::StopOnFailure);
        assert_eq!(RunPolicy::from_settings(&off, true), RunPolicy::ContinueOnFailure);
        assert_eq!(RunPolicy::from_settings(&on, false), RunPolicy::ContinueOnFailure);
        assert_eq!(RunPolicy::from_settings(&on, true), RunPolicy::ContinueOnFailure);
    }

    #[test]
    fn total_rows_saturates() {
        let now = Utc::now();
        let report = RunReport {
            started_at: now,
            finished_at: now,
            actions: vec![completed("a", u64::MAX), completed("b", 5)],
        };

        assert!(report.succeeded());
        assert_eq!(report.total_rows(), u64::MAX);
    }
}
