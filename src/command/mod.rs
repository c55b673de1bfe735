//! Control-protocol command dispatch.
//!
//! Commands are single lines, tokenized on spaces. The first token is the
//! action; actions that operate on state also name a target system (`robot`,
//! `camera`, `collector`, `state`). Each handler mutates the session's
//! private copy of the state and returns a single response string.
//!
//! No response string starts or ends with a newline; that is part of the
//! wire contract, not formatting taste.

mod camera;
mod collector;
mod robot;
mod state;

use crate::persist::SnapshotStore;
use crate::state::TrackerState;

/// Actions that require a target system as the second token.
const TARGET_COMMANDS: [&str; 6] = ["set", "get", "delete", "list", "save", "load"];

/// Execute one tokenized command against `current` and return the response.
///
/// Validation always happens before mutation: a rejected command leaves
/// `current` untouched.
pub fn dispatch(tokens: &[&str], current: &mut TrackerState, store: &SnapshotStore) -> String {
    let Some(&command) = tokens.first() else {
        return "please provide a command".to_string();
    };

    if TARGET_COMMANDS.contains(&command) {
        if tokens.len() < 2 {
            return "please provide a target system".to_string();
        }

        match tokens[1] {
            "robot" => robot::handle(tokens, current),
            "state" => state::handle(tokens, current, store),
            "collector" => collector::handle(tokens, current),
            "camera" => camera::handle(tokens, current),
            other => format!("target system: '{other}' not found"),
        }
    } else if command == "help" {
        help_command()
    } else {
        format!("command: '{command}' not found")
    }
}

/// Parse a comma-separated list of exactly `expected` doubles.
///
/// Errors are full response strings so handlers can return them unchanged.
fn parse_doubles(values: &str, expected: usize, variable: &str) -> Result<Vec<f64>, String> {
    let parts: Vec<&str> = values.split(',').collect();
    if parts.len() != expected {
        return Err(format!(
            "please provide {expected} doubles separated by commas for '{variable}'"
        ));
    }

    let mut out = Vec::with_capacity(expected);
    for part in parts {
        match part.parse::<f64>() {
            Ok(v) => out.push(v),
            Err(_) => {
                return Err(format!(
                    "please provide a comma separated list of doubles for '{variable}'"
                ))
            }
        }
    }
    Ok(out)
}

/// Render a slice of doubles as a comma-separated list.
fn doubles_to_string(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn help_command() -> String {
    let mut response = String::from("current target systems:\n");
    response += "    robot, state, collector, camera\n\n";

    response += "for the 'robot' system you can use the commands:\n";
    response += "    get, set, list, delete\n";
    response +=
        "ex: 'get robot robot_1' or 'list robot' or 'set robot robot_1 1,2,3,4' or 'delete robot robot_1'\n\n";

    response += "for the 'state' system you can use the commands:\n";
    response += "    save, load, delete, list\n";
    response +=
        "ex: 'save state config1' or 'load state config1' or 'delete state config1' or 'list state'\n";
    response += "NOTE: keyword 'current' is used for clearing current state ('delete state current'). Cannot save a state with the name 'current'\n\n";

    response += "for the 'collector' system you can use the commands:\n";
    response += "    get, set, list, delete\n";
    response += "ex: 'get collector gcs' or 'list collector' or 'set collector gcs 127.0.0.1 5000' or 'delete collector gcs'\n\n";

    response += "for the 'camera' system you can use the commands:\n";
    response += "    get, set, list, delete\n";
    response += "you can modify the following variables:\n";
    response += "    type, source, connected, camera_matrix, distortion_matrix, marker_dictionary, marker_length, arena_distance, camera_options\n";
    response += "ex: 'get camera source' or 'list camera' or 'set camera marker_dictionary 6' or 'delete camera source'\n\n";

    response += "intended usage for each target system/variable will be clarified if used incorrectly.";
    response
}
