use crate::error::ConfigError;
use crate::settings::{Configuration, SUPPORTED_VERSION};
use core_types::{ActionRecord, ConnectionRecord};
use std::collections::HashSet;

/// Checks the structure of a loaded document.
///
/// Every violation is collected; the error lists all of them.
pub fn validate(configuration: &Configuration) -> Result<(), ConfigError> {
    let mut problems = Vec::new();

    if configuration.version.trim().is_empty() {
        problems.push("A configuration version is required.".to_string());
    } else if configuration.version != SUPPORTED_VERSION {
        problems.push(format!(
            "The configuration version must be {SUPPORTED_VERSION} (found '{}').",
            configuration.version
        ));
    }

    let mut connection_names = HashSet::new();
    for (index, connection) in configuration.connections.iter().enumerate() {
        check_connection(index, connection, &mut problems);
        if !connection.name.is_empty() && !connection_names.insert(connection.name.to_lowercase()) {
            problems.push(format!("Connection name '{}' is used more than once.", connection.name));
        }
    }

    if configuration.actions.is_empty() {
        problems.push("At least one action is required.".to_string());
    }

    let mut action_names = HashSet::new();
    for (index, action) in configuration.actions.iter().enumerate() {
        check_action(index, action, &mut problems);
        if !action.name.is_empty() && !action_names.insert(action.name.as_str()) {
            problems.push(format!("Action name '{}' is used more than once.", action.name));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailure(problems))
    }
}

fn check_connection(index: usize, connection: &ConnectionRecord, problems: &mut Vec<String>) {
    if connection.name.trim().is_empty() {
        problems.push(format!("connections[{index}]: A connection name is required."));
    }
    if connection.provider.trim().is_empty() {
        problems.push(format!("connections[{index}]: A connection provider is required."));
    }
    if connection.connection_string.trim().is_empty() {
        problems.push(format!("connections[{index}]: A connection string is required."));
    }
}

fn check_action(index: usize, action: &ActionRecord, problems: &mut Vec<String>) {
    if action.action_type.trim().is_empty() {
        problems.push(format!("actions[{index}]: The action type is required."));
    }
    if action.name.trim().is_empty() {
        problems.push(format!("actions[{index}]: An action name is required."));
    }
    if action.parameters.is_empty() {
        problems.push(format!("actions[{index}]: An action parameter is required."));
    } else if !action
        .parameters
        .keys()
        .any(|key| key.eq_ignore_ascii_case("connection"))
    {
        problems.push(format!("actions[{index}]: Parameters must contain a 'connection' key."));
    }
}
