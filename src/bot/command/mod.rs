//! Slash command definitions and dispatch.
//!
//! Each submodule turns a command into a `Reply` without touching Discord, so the
//! behaviour is testable against a simulated server.

pub mod backup;
pub mod console;
pub mod control;
pub mod lifecycle;
pub mod status;

use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption, Permissions};

use crate::{bot::embed::Reply, model::lifecycle::LifecycleAction, state::AppState};

/// Commands registered in the guild on `ready`.
///
/// Commands that change the server require Manage Server by default; server
/// admins can adjust this in the guild's integration settings.
pub fn definitions() -> Vec<CreateCommand> {
    let admin = Permissions::MANAGE_GUILD;

    vec![
        CreateCommand::new("start")
            .description("Start the Minecraft server")
            .default_member_permissions(admin),
        CreateCommand::new("stop")
            .description("Stop the Minecraft server")
            .default_member_permissions(admin),
        CreateCommand::new("restart")
            .description("Restart the Minecraft server")
            .default_member_permissions(admin),
        CreateCommand::new("status").description("Show the server status"),
        CreateCommand::new("players").description("List online players"),
        CreateCommand::new("cmd")
            .description("Run a server console command")
            .default_member_permissions(admin)
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "command",
                    "Command to run, without the leading slash",
                )
                .required(true),
            ),
        CreateCommand::new("backup")
            .description("Create a world backup")
            .default_member_permissions(admin)
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "name",
                "Label for a kept custom backup; omit for an auto backup",
            )),
        CreateCommand::new("backup_list").description("List recent world backups"),
        CreateCommand::new("control")
            .description("Post a control panel with server buttons")
            .default_member_permissions(admin),
    ]
}

/// Runs the named command.
///
/// # Arguments
/// - `state` - Shared application state
/// - `name` - Command name without the slash
/// - `args` - String options as `(name, value)` pairs
pub async fn dispatch(state: &AppState, name: &str, args: &[(String, String)]) -> Reply {
    let arg = |key: &str| {
        args.iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    };

    match name {
        "start" => lifecycle::run(state, LifecycleAction::Start).await,
        "stop" => lifecycle::run(state, LifecycleAction::Stop).await,
        "restart" => lifecycle::run(state, LifecycleAction::Restart).await,
        "status" => status::status(state.control.as_ref()).await,
        "players" => status::players(state.control.as_ref()).await,
        "cmd" => match arg("command") {
            Some(command) => console::run(state.control.as_ref(), command).await,
            None => Reply::failure("Console", "Missing command"),
        },
        "backup" => backup::run(&state.backups, arg("name")).await,
        "backup_list" => backup::list(&state.backups).await,
        "control" => control::panel(state).await,
        other => {
            tracing::warn!("Unknown command /{}", other);
            Reply::failure("Unknown command", format!("/{} is not handled", other))
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::{sync::Arc, time::Duration};

    use crate::{
        config::Config,
        data::state_store::StateStore,
        service::{
            backend::simulated::{SimulatedBackend, SimulatedOptions},
            backup::BackupService,
            notifier::recording::RecordingNotifier,
            supervisor::{ServerControl, Supervisor, SupervisorSettings},
        },
        state::AppState,
    };
    use test_utils::context::TestContext;

    /// App state over a simulated server inside `test`.
    pub fn state(
        test: &TestContext,
        options: SimulatedOptions,
        running: bool,
    ) -> (AppState, Arc<SimulatedBackend>, Arc<RecordingNotifier>) {
        let backend = Arc::new(if running {
            SimulatedBackend::running(options)
        } else {
            SimulatedBackend::new(options)
        });
        let supervisor = Supervisor::new(
            backend.clone(),
            StateStore::new(test.state_file()),
            SupervisorSettings {
                startup_grace: Duration::from_secs(5),
                shutdown_grace: Duration::from_secs(5),
                probe_interval: Duration::from_secs(1),
                lock_wait: Duration::from_secs(1),
                restart_delay: Duration::from_secs(1),
            },
            !running,
            running,
        );
        let control: Arc<dyn ServerControl> = Arc::new(supervisor);

        let dir = test.server_dir().display().to_string();
        let config = Config::from_lookup(move |key: &str| match key {
            "DISCORD_BOT_TOKEN" => Some("token".to_string()),
            "DISCORD_GUILD_ID" => Some("1".to_string()),
            "SERVER_DIR" => Some(dir.clone()),
            _ => None,
        })
        .unwrap();

        let notifier = Arc::new(RecordingNotifier::default());
        let backups = Arc::new(BackupService::new(control.clone(), &config));
        let state = AppState::new(
            1,
            control,
            backups,
            notifier.clone(),
            tokio::sync::watch::channel(0).1,
        );

        (state, backend, notifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bot::embed::Tone, service::backend::simulated::SimulatedOptions};
    use test_utils::{builder::TestBuilder, error::TestError};

    #[test]
    fn defines_every_command() {
        assert_eq!(definitions().len(), 9);
    }

    /// Tests routing of an unknown command name.
    ///
    /// Expected: failure reply
    #[tokio::test]
    async fn rejects_unknown_command() -> Result<(), TestError> {
        let test = TestBuilder::new().build()?;
        let (state, _, _) = test_support::state(&test, SimulatedOptions::default(), false);

        let reply = dispatch(&state, "teleport", &[]).await;

        assert_eq!(reply.tone, Tone::Failure);
        Ok(())
    }

    /// Tests routing of /cmd with and without its option.
    ///
    /// Expected: missing option fails, present option reaches the console
    #[tokio::test]
    async fn routes_cmd_option() -> Result<(), TestError> {
        let test = TestBuilder::new().build()?;
        let (state, _, _) = test_support::state(&test, SimulatedOptions::default(), true);

        let missing = dispatch(&state, "cmd", &[]).await;
        assert_eq!(missing.description, "Missing command");

        let args = vec![("command".to_string(), "list".to_string())];
        let reply = dispatch(&state, "cmd", &args).await;
        assert!(reply.is_success());
        assert!(reply.description.contains("There are 0 of a max of 20 players online"));

        Ok(())
    }
}
