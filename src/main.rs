mod answers;
mod blanks;
mod editors;
mod geometry;
mod ipc;
mod model;
mod review;
mod session;
mod wire;

use std::io::{self, BufRead, Write};

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // stdout carries the protocol, so logs go to stderr only.
    let env_filter =
        EnvFilter::try_from_env("HOMEWORKD_LOG").unwrap_or_else(|_| EnvFilter::new("homeworkd=info"));
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

fn main() {
    init_logging();

    let mut state = ipc::AppState {
        session: None,
        review: None,
    };
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "homeworkd ready");

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
                // Can't reply with an id we never parsed.
                tracing::warn!(error = %e, "dropping unparseable request line");
                let _ = writeln!(
                    stdout,
                    "{{\"ok\":false,\"error\":{{\"code\":\"bad_json\",\"message\":\"{}\"}}}}",
                    e
                );
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
