//! Camera configuration commands.
//!
//! Every variable is validated for type and shape before any mutation; a
//! rejected `set` leaves the previous value in place.

use std::str::FromStr;

use super::{doubles_to_string, parse_doubles};
use crate::state::{CameraKind, TrackerState};

const VAR_TYPE: &str = "type";
const VAR_SOURCE: &str = "source";
const VAR_CONNECTED: &str = "connected";
const VAR_CAM_MATRIX: &str = "camera_matrix";
const VAR_DIST_MATRIX: &str = "distortion_matrix";
const VAR_MARKER_DICT: &str = "marker_dictionary";
const VAR_MARKER_LENGTH: &str = "marker_length";
const VAR_ARENA_DISTANCE: &str = "arena_distance";
const VAR_OPTIONS: &str = "camera_options";

const CAMERA_MATRIX_LEN: usize = 9;
const DISTORTION_MATRIX_LEN: usize = 5;

pub fn handle(tokens: &[&str], current: &mut TrackerState) -> String {
    match tokens[0] {
        "set" => set(tokens, current),
        "get" => get(tokens, current),
        "delete" => delete(tokens, current),
        "list" => list(current),
        other => format!("command '{other}' not valid for target system 'camera'"),
    }
}

fn set(tokens: &[&str], current: &mut TrackerState) -> String {
    if tokens.len() < 4 {
        return "please provide a variable and a value\n    ex: set camera source 0".to_string();
    }

    let variable = tokens[2];
    let value = tokens[3];
    let camera = &mut current.camera;

    match variable {
        VAR_TYPE => match CameraKind::from_str(value) {
            Ok(kind) => {
                camera.kind = Some(kind);
                format!("type set to '{kind}'")
            }
            Err(()) => {
                let names = CameraKind::ALL
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("camera type must be one of: {names}")
            }
        },
        VAR_SOURCE => {
            camera.source = value.to_string();
            format!("source set to '{value}'")
        }
        VAR_CONNECTED => match parse_bool(value) {
            Some(connected) => {
                camera.connected = connected;
                format!("'connected' variable set to {connected}")
            }
            None => "please provide a boolean value (true/false) for 'connected'".to_string(),
        },
        VAR_CAM_MATRIX => match parse_doubles(value, CAMERA_MATRIX_LEN, VAR_CAM_MATRIX) {
            Ok(values) => {
                let mut matrix = [0.0; CAMERA_MATRIX_LEN];
                matrix.copy_from_slice(&values);
                camera.camera_matrix = Some(matrix);
                format!("'{VAR_CAM_MATRIX}' variable set")
            }
            Err(response) => response,
        },
        VAR_DIST_MATRIX => match parse_doubles(value, DISTORTION_MATRIX_LEN, VAR_DIST_MATRIX) {
            Ok(values) => {
                let mut matrix = [0.0; DISTORTION_MATRIX_LEN];
                matrix.copy_from_slice(&values);
                camera.distortion_matrix = Some(matrix);
                format!("'{VAR_DIST_MATRIX}' variable set")
            }
            Err(response) => response,
        },
        VAR_MARKER_DICT => match value.parse::<i32>() {
            Ok(id) => {
                camera.marker_dictionary = id;
                format!("'{VAR_MARKER_DICT}' variable set")
            }
            Err(_) => format!("please provide an integer for '{VAR_MARKER_DICT}'"),
        },
        VAR_MARKER_LENGTH => match value.parse::<f64>() {
            Ok(length) => {
                camera.marker_length = length;
                format!("'{VAR_MARKER_LENGTH}' variable set")
            }
            Err(_) => format!("please provide a double for '{VAR_MARKER_LENGTH}'"),
        },
        VAR_ARENA_DISTANCE => match value.parse::<f64>() {
            Ok(distance) => {
                camera.arena_distance = distance;
                format!("'{VAR_ARENA_DISTANCE}' variable set")
            }
            Err(_) => format!("please provide a double for '{VAR_ARENA_DISTANCE}'"),
        },
        VAR_OPTIONS => {
            if tokens.len() != 5 {
                return "please provide an option name and a boolean value\n    ex: set camera camera_options auto_exposure true".to_string();
            }
            match parse_bool(tokens[4]) {
                Some(enabled) => {
                    camera.options.insert(value.to_string(), enabled);
                    format!("'{value}' set to {enabled}")
                }
                None => format!("please provide a boolean value (true/false) for '{value}'"),
            }
        }
        other => format!("variable '{other}' does not exist for the camera system"),
    }
}

fn get(tokens: &[&str], current: &TrackerState) -> String {
    if tokens.len() != 3 {
        return "please provide a variable to get\n    ex: get camera source".to_string();
    }

    let camera = &current.camera;
    match tokens[2] {
        VAR_TYPE => format!("type: {}", kind_string(current)),
        VAR_SOURCE => format!("source: {}", camera.source),
        VAR_CONNECTED => format!("connected: {}", camera.connected),
        VAR_CAM_MATRIX => format!("{VAR_CAM_MATRIX}: {}", matrix_string(&camera.camera_matrix)),
        VAR_DIST_MATRIX => format!(
            "{VAR_DIST_MATRIX}: {}",
            matrix_string(&camera.distortion_matrix)
        ),
        VAR_MARKER_DICT => format!("{VAR_MARKER_DICT}: {}", camera.marker_dictionary),
        VAR_MARKER_LENGTH => format!("{VAR_MARKER_LENGTH}: {}", camera.marker_length),
        VAR_ARENA_DISTANCE => format!("{VAR_ARENA_DISTANCE}: {}", camera.arena_distance),
        VAR_OPTIONS => options_string(current),
        other => format!("variable '{other}' does not exist for the camera system"),
    }
}

fn delete(tokens: &[&str], current: &mut TrackerState) -> String {
    if tokens.len() != 3 {
        return "please provide a variable to clear\n    ex: delete camera source".to_string();
    }

    let camera = &mut current.camera;
    match tokens[2] {
        VAR_TYPE => camera.kind = None,
        VAR_SOURCE => camera.source.clear(),
        VAR_CONNECTED => camera.connected = false,
        VAR_CAM_MATRIX => camera.camera_matrix = None,
        VAR_DIST_MATRIX => camera.distortion_matrix = None,
        VAR_MARKER_DICT => camera.marker_dictionary = 0,
        VAR_MARKER_LENGTH => camera.marker_length = 0.0,
        VAR_ARENA_DISTANCE => camera.arena_distance = 0.0,
        VAR_OPTIONS => camera.options.clear(),
        other => return format!("variable '{other}' does not exist for the camera system"),
    }
    format!("'{}' variable cleared", tokens[2])
}

fn list(current: &TrackerState) -> String {
    let camera = &current.camera;
    let mut response = String::from("Current camera configuration:");
    response += &format!("\n    type: {}", kind_string(current));
    response += &format!("\n    source: {}", camera.source);
    response += &format!("\n    connected: {}", camera.connected);
    response += &format!(
        "\n    {VAR_CAM_MATRIX}: {}",
        matrix_string(&camera.camera_matrix)
    );
    response += &format!(
        "\n    {VAR_DIST_MATRIX}: {}",
        matrix_string(&camera.distortion_matrix)
    );
    response += &format!("\n    {VAR_MARKER_DICT}: {}", camera.marker_dictionary);
    response += &format!("\n    {VAR_MARKER_LENGTH}: {}", camera.marker_length);
    response += &format!("\n    {VAR_ARENA_DISTANCE}: {}", camera.arena_distance);
    response += "\n    ";
    response += &options_string(current);
    response
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn kind_string(current: &TrackerState) -> String {
    current
        .camera
        .kind
        .map(|k| k.to_string())
        .unwrap_or_default()
}

fn matrix_string<const N: usize>(matrix: &Option<[f64; N]>) -> String {
    match matrix {
        Some(values) => doubles_to_string(values),
        None => String::new(),
    }
}

fn options_string(current: &TrackerState) -> String {
    let mut out = String::from("camera_options:");
    for (name, enabled) in &current.camera.options {
        out += &format!("\n        {name}: {enabled}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_variables() {
        let mut state = TrackerState::default();

        let response = handle(&["set", "camera", "source", "testingurl"], &mut state);
        assert!(response.contains("source set to"));
        assert_eq!(state.camera.source, "testingurl");

        let response = handle(&["set", "camera", "marker_dictionary", "6"], &mut state);
        assert!(response.contains("'marker_dictionary' variable set"));
        assert_eq!(state.camera.marker_dictionary, 6);

        let response = handle(
            &["set", "camera", "camera_options", "testing", "false"],
            &mut state,
        );
        assert!(response.contains("'testing' set to"));
        assert_eq!(state.camera.options.get("testing"), Some(&false));

        let response = handle(
            &["set", "camera", "camera_matrix", "1,2,3,4,5,6,7,8,9"],
            &mut state,
        );
        assert!(response.contains("'camera_matrix' variable set"));
        let matrix = state.camera.camera_matrix.unwrap();
        assert_eq!(matrix[0], 1.0);
        assert_eq!(matrix[3], 4.0);

        let response = handle(
            &["set", "camera", "distortion_matrix", "1,2,3,4,5"],
            &mut state,
        );
        assert!(response.contains("'distortion_matrix' variable set"));
        assert_eq!(state.camera.distortion_matrix.unwrap()[3], 4.0);

        let response = handle(&["set", "camera", "type", "opencv"], &mut state);
        assert!(response.contains("type set to"));
        assert_eq!(state.camera.kind, Some(CameraKind::OpenCv));

        let response = handle(&["set", "camera", "connected", "true"], &mut state);
        assert!(response.contains("set to true"));
        assert!(state.camera.connected);
    }

    #[test]
    fn invalid_matrices_leave_state_untouched() {
        let mut state = TrackerState::default();

        let response = handle(
            &["set", "camera", "camera_matrix", "1,2,3,4,5,6,7,8,9,10,11"],
            &mut state,
        );
        assert!(response.contains("9 doubles"));
        assert!(state.camera.camera_matrix.is_none());

        let response = handle(
            &["set", "camera", "distortion_matrix", "1,2,3,4,5,6,7,8,9"],
            &mut state,
        );
        assert!(response.contains("5 doubles"));
        assert!(state.camera.distortion_matrix.is_none());

        let response = handle(&["set", "camera", "camera_matrix", "1,2,3"], &mut state);
        assert!(response.contains("9 doubles"));
        assert!(state.camera.camera_matrix.is_none());

        let response = handle(
            &["set", "camera", "camera_matrix", "1,2,3,4,f,6,7,8,9"],
            &mut state,
        );
        assert!(response.contains("list of doubles"));
        assert!(state.camera.camera_matrix.is_none());

        let response = handle(
            &["set", "camera", "distortion_matrix", "1,2,3,f,5"],
            &mut state,
        );
        assert!(response.contains("list of doubles"));
        assert!(state.camera.distortion_matrix.is_none());
    }

    #[test]
    fn unknown_variables_and_types_are_rejected() {
        let mut state = TrackerState::default();

        let response = handle(&["set", "camera", "zoom", "2"], &mut state);
        assert!(response.contains("does not exist"));

        let response = handle(&["set", "camera", "type", "webcam"], &mut state);
        assert!(response.contains("must be one of"));
        assert!(state.camera.kind.is_none());

        let response = handle(&["set", "camera", "connected", "yes"], &mut state);
        assert!(response.contains("boolean"));
        assert!(!state.camera.connected);
    }

    #[test]
    fn lists_variables() {
        let mut state = TrackerState::default();
        handle(&["set", "camera", "source", "testingurl"], &mut state);
        handle(&["set", "camera", "marker_dictionary", "6"], &mut state);
        handle(
            &["set", "camera", "camera_options", "testing", "false"],
            &mut state,
        );
        handle(
            &["set", "camera", "camera_matrix", "1,2,3,4,5,6,7,8,9"],
            &mut state,
        );
        handle(
            &["set", "camera", "distortion_matrix", "1,2,3,4,5"],
            &mut state,
        );

        let response = handle(&["list", "camera"], &mut state);
        assert!(response.contains("source: testingurl"));
        assert!(response.contains("marker_dictionary: 6"));
        assert!(response.contains("camera_matrix: 1,2,3,4,5,6,7,8,9"));
        assert!(response.contains("distortion_matrix: 1,2,3,4,5"));
        assert!(response.contains("camera_options:"));
        assert!(response.contains("testing: false"));
    }

    #[test]
    fn delete_resets_to_defaults() {
        let mut state = TrackerState::default();
        handle(&["set", "camera", "type", "mock"], &mut state);
        handle(
            &["set", "camera", "camera_matrix", "1,2,3,4,5,6,7,8,9"],
            &mut state,
        );

        let response = handle(&["delete", "camera", "camera_matrix"], &mut state);
        assert!(response.contains("cleared"));
        assert!(state.camera.camera_matrix.is_none());

        handle(&["delete", "camera", "type"], &mut state);
        assert!(state.camera.kind.is_none());
    }
}
