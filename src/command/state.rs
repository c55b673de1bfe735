//! Whole-state commands: snapshots on disk plus the in-memory current state.
//!
//! The name `current` is reserved for the live state and can never name a
//! snapshot file.

use crate::persist::{SnapshotStore, CURRENT_KEYWORD};
use crate::state::TrackerState;

pub fn handle(tokens: &[&str], current: &mut TrackerState, store: &SnapshotStore) -> String {
    match tokens[0] {
        "save" => save(tokens, current, store),
        "load" => load(tokens, current, store),
        "delete" => delete(tokens, current, store),
        "list" => list(store),
        other => format!("command '{other}' not valid for target system 'state'"),
    }
}

fn save(tokens: &[&str], current: &TrackerState, store: &SnapshotStore) -> String {
    if tokens.len() != 3 {
        return "please provide a name to save the current state as\n    ex: save state qualifiers"
            .to_string();
    }

    let name = tokens[2];
    if name == CURRENT_KEYWORD {
        return format!("'{CURRENT_KEYWORD}' cannot be used as a state name");
    }

    match store.save(name, current) {
        Ok(()) => format!("current state saved as '{name}'"),
        Err(err) => format!("failed to save state '{name}': {err}"),
    }
}

fn load(tokens: &[&str], current: &mut TrackerState, store: &SnapshotStore) -> String {
    if tokens.len() != 3 {
        return "please provide the name of the state to load\n    ex: load state qualifiers"
            .to_string();
    }

    let name = tokens[2];
    match store.load(name) {
        Ok(Some(saved)) => {
            saved.apply(current);
            format!("current state loaded from '{name}'")
        }
        Ok(None) => format!("given state '{name}' does not exist"),
        Err(err) => format!("failed to load state '{name}': {err}"),
    }
}

fn delete(tokens: &[&str], current: &mut TrackerState, store: &SnapshotStore) -> String {
    if tokens.len() != 3 {
        return "please provide the name of the state to delete\n    ex: delete state qualifiers"
            .to_string();
    }

    let name = tokens[2];
    if name == CURRENT_KEYWORD {
        current.clear();
        return "current state has been cleared".to_string();
    }

    match store.delete(name) {
        Ok(true) => format!("state '{name}' has been removed"),
        Ok(false) => format!("state '{name}' does not exist"),
        Err(err) => format!("failed to delete state '{name}': {err}"),
    }
}

fn list(store: &SnapshotStore) -> String {
    let mut response = String::from("Saved states:");
    match store.list() {
        Ok(names) => {
            for name in names {
                response += &format!("\n    {name}");
            }
        }
        Err(err) => response += &format!("\n    failed to read state directory: {err}"),
    }
    response
}
