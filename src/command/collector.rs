//! Collector endpoint commands.

use std::net::{IpAddr, SocketAddr};

use crate::state::TrackerState;

pub fn handle(tokens: &[&str], current: &mut TrackerState) -> String {
    match tokens[0] {
        "set" => set(tokens, current),
        "get" => get(tokens, current),
        "delete" => delete(tokens, current),
        "list" => list(current),
        other => format!("command '{other}' not valid for target system 'collector'"),
    }
}

fn set(tokens: &[&str], current: &mut TrackerState) -> String {
    if tokens.len() != 5 {
        return "please provide a name, an ip address and a port\n    ex: set collector main 192.168.1.10 9000".to_string();
    }

    let name = tokens[2];
    let ip: IpAddr = match tokens[3].parse() {
        Ok(ip) => ip,
        Err(_) => return "please provide a valid ipv4 address".to_string(),
    };
    let port: u16 = match tokens[4].parse() {
        Ok(0) | Err(_) => return "please provide a valid port number (1-65535)".to_string(),
        Ok(port) => port,
    };

    let addr = SocketAddr::new(ip, port);
    current.collectors.insert(name.to_string(), addr);
    format!("{name} added with ip {addr}")
}

fn get(tokens: &[&str], current: &TrackerState) -> String {
    if tokens.len() != 3 {
        return "please provide a collector name to get\n    ex: get collector main".to_string();
    }

    let name = tokens[2];
    match current.collectors.get(name) {
        Some(addr) => format!("{name}:\n    {addr}"),
        None => format!("collector '{name}' not found"),
    }
}

fn delete(tokens: &[&str], current: &mut TrackerState) -> String {
    if tokens.len() != 3 {
        return "please provide a collector name to delete\n    ex: delete collector main".to_string();
    }

    let name = tokens[2];
    if current.collectors.remove(name).is_some() {
        format!("collector '{name}' has been removed")
    } else {
        format!("collector '{name}' does not exist")
    }
}

fn list(current: &TrackerState) -> String {
    let mut response = String::from("Current collectors:");
    for (name, addr) in &current.collectors {
        response += &format!("\n    {name}: {addr}");
    }
    response
}
