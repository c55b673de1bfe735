//! Robot binding commands.
//!
//! A robot has a name and exactly four marker ids (corner roles TL, TR, BR,
//! BL); the first id is the lead marker used to localize the robot.

use crate::state::{TrackerState, MARKERS_PER_ROBOT};

pub fn handle(tokens: &[&str], current: &mut TrackerState) -> String {
    match tokens[0] {
        "list" => {
            let mut response = String::from("Current robots:");
            for (name, ids) in &current.robots {
                let ids = ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                response += &format!("\n    {name}: {ids}");
            }
            response
        }
        "set" => {
            if tokens.len() != 4 {
                return "please provide a robot name and marker ids separated by commas\n    ex: set robot robot_1 1,2,3,4".to_string();
            }

            let name = tokens[2];
            let values: Vec<&str> = tokens[3].split(',').collect();
            if values.len() != MARKERS_PER_ROBOT {
                return format!(
                    "please provide exactly {MARKERS_PER_ROBOT} marker ids for '{name}'"
                );
            }

            let mut ids = [0i32; MARKERS_PER_ROBOT];
            for (slot, value) in ids.iter_mut().zip(&values) {
                match value.parse::<i32>() {
                    Ok(id) => *slot = id,
                    Err(_) => {
                        return format!(
                            "please provide a comma separated list of integers for '{name}'s marker ids"
                        )
                    }
                }
            }

            current.robots.insert(name.to_string(), ids);
            format!("{name} added with marker values {}", tokens[3])
        }
        "get" => {
            if tokens.len() != 3 {
                return "please provide a robot to get\n    ex: get robot robot_1".to_string();
            }

            let name = tokens[2];
            match current.robots.get(name) {
                Some(ids) => {
                    let ids = ids
                        .iter()
                        .map(|id| id.to_string())
                        .collect::<Vec<_>>()
                        .join(",");
                    format!("{name}:\n    {ids}")
                }
                None => format!("robot '{name}' not found"),
            }
        }
        "delete" => {
            if tokens.len() != 3 {
                return "please provide a robot to delete\n    ex: delete robot robot_1"
                    .to_string();
            }

            let name = tokens[2];
            if current.robots.remove(name).is_some() {
                format!("robot '{name}' has been removed")
            } else {
                format!("robot '{name}' does not exist")
            }
        }
        other => format!("command '{other}' not valid for target system 'robot'"),
    }
}
