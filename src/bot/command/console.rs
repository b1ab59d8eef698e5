use crate::{bot::embed::Reply, service::supervisor::ServerControl};

/// Discord embed descriptions are capped at 4096 characters.
const MAX_OUTPUT: usize = 1800;

/// /cmd: runs a console command.
///
/// RCON is tried first so the reply can be shown. When RCON is unavailable the
/// line is typed into the console instead and no output is returned.
pub async fn run(control: &dyn ServerControl, command: &str) -> Reply {
    let command = command.trim().trim_start_matches('/');
    if command.is_empty() {
        return Reply::failure("Console", "Missing command");
    }

    if !control.is_running().await {
        return Reply::failure("Console", "Server is not running");
    }

    tracing::info!("Console command: {}", command);

    match control.query(command).await {
        Ok(output) => {
            let output = if output.trim().is_empty() {
                "(no output)".to_string()
            } else {
                truncate(output.trim(), MAX_OUTPUT)
            };
            Reply::success(format!("/{}", command), format!("```\n{}\n```", output))
                .field("Via", "RCON")
        }
        Err(rcon_error) => {
            tracing::warn!("RCON failed, falling back to console input: {}", rcon_error);
            match control.send_command(command).await {
                Ok(()) => Reply::success(
                    format!("/{}", command),
                    "Sent to the server console (output not available without RCON)",
                )
                .field("Via", "Console"),
                Err(e) => Reply::failure(format!("/{}", command), e.to_string()),
            }
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((index, _)) => format!("{}…", &text[..index]),
        None => text.to_string(),
    }
}
