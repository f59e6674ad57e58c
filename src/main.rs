mod api;
mod forms;
mod ipc;
mod listview;
mod models;
mod session;
mod stats;
mod views;

use std::io::{self, BufRead, Write};

fn main() {
    // stdout carries IPC frames; everything logged goes to stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut state = ipc::AppState::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply with an id we never parsed. The error text is
                // arbitrary, so let serde escape it.
                let frame = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() },
                });
                let _ = writeln!(stdout, "{}", frame);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
