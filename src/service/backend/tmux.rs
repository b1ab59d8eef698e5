//! Real server backend running Java inside a detached tmux session.
//!
//! The session outlives the bot, so restarting the bot never takes the server
//! down. Console input goes through `tmux send-keys`, queries through RCON, and
//! liveness through the process table.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Output,
};

use async_trait::async_trait;
use tokio::process::Command;

use crate::{
    config::Config,
    error::{lifecycle::LifecycleError, transport::TransportError},
    service::{
        backend::ServerBackend,
        console::CommandChannel,
        probe::{ProcessProbe, ProcessSignature, SysinfoProbe},
        rcon::RconClient,
    },
};

const TMUX: &str = "tmux";

pub struct TmuxBackend {
    session: String,
    server_dir: PathBuf,
    jar_name: String,
    world_dir: PathBuf,
    java_path: String,
    java_xms: String,
    java_xmx: String,
    probe: SysinfoProbe,
    rcon: RconClient,
}

impl TmuxBackend {
    pub fn new(config: &Config, rcon: RconClient) -> Self {
        let signature = ProcessSignature::new(&config.java_path, &config.server_jar, &config.server_dir);

        Self {
            session: config.tmux_session.clone(),
            server_dir: config.server_dir.clone(),
            jar_name: config.server_jar.clone(),
            world_dir: config.world_dir(),
            java_path: config.java_path.clone(),
            java_xms: config.java_xms.clone(),
            java_xmx: config.java_xmx.clone(),
            probe: SysinfoProbe::new(signature),
            rcon,
        }
    }

    /// Arguments passed to `tmux` to create the server session.
    fn launch_args(&self) -> Vec<String> {
        vec![
            "new-session".to_string(),
            "-d".to_string(),
            "-s".to_string(),
            self.session.clone(),
            "-c".to_string(),
            self.server_dir.display().to_string(),
            self.java_path.clone(),
            format!("-Xms{}", self.java_xms),
            format!("-Xmx{}", self.java_xmx),
            "-jar".to_string(),
            self.jar_name.clone(),
            "nogui".to_string(),
        ]
    }

    async fn tmux(&self, args: &[&str]) -> std::io::Result<Output> {
        Command::new(TMUX).args(args).output().await
    }

    async fn has_session(&self) -> bool {
        self.tmux(&["has-session", "-t", &self.session])
            .await
            .is_ok_and(|output| output.status.success())
    }

    async fn kill_session(&self) {
        match self.tmux(&["kill-session", "-t", &self.session]).await {
            Ok(output) if output.status.success() => {
                tracing::info!("Killed tmux session {}", self.session)
            }
            Ok(_) => tracing::debug!("No tmux session {} to kill", self.session),
            Err(e) => tracing::warn!("Failed to run tmux kill-session: {}", e),
        }
    }
}

#[async_trait]
impl ProcessProbe for TmuxBackend {
    async fn is_running(&self) -> bool {
        self.probe.is_running().await
    }
}

#[async_trait]
impl CommandChannel for TmuxBackend {
    async fn send_line(&self, text: &str) -> Result<(), TransportError> {
        let output = self
            .tmux(&["send-keys", "-t", &self.session, text, "Enter"])
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(TransportError::Unavailable(format!(
                "tmux session {} not reachable: {}",
                self.session,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }

    async fn query(&self, command: &str) -> Result<String, TransportError> {
        self.rcon.execute(command).await
    }
}

#[async_trait]
impl ServerBackend for TmuxBackend {
    fn describe(&self) -> String {
        format!(
            "tmux session '{}' running {} in {}",
            self.session,
            self.jar_name,
            self.server_dir.display()
        )
    }

    async fn check_launchable(&self) -> Result<(), LifecycleError> {
        if !tokio::fs::metadata(&self.server_dir)
            .await
            .is_ok_and(|m| m.is_dir())
        {
            return Err(LifecycleError::missing_path("Server directory", &self.server_dir));
        }

        let jar = self.server_dir.join(&self.jar_name);
        if !tokio::fs::metadata(&jar).await.is_ok_and(|m| m.is_file()) {
            return Err(LifecycleError::missing_path("Server jar", &jar));
        }

        if resolve_executable(&self.java_path, std::env::var_os("PATH")).is_none() {
            return Err(LifecycleError::Configuration(format!(
                "Java executable not found: {}",
                self.java_path
            )));
        }

        Ok(())
    }

    async fn launch(&self) -> Result<(), LifecycleError> {
        if self.has_session().await {
            tracing::warn!("Stale tmux session {} found, killing it", self.session);
            self.kill_session().await;
        }

        let lock = self.world_dir.join("session.lock");
        match tokio::fs::remove_file(&lock).await {
            Ok(()) => tracing::info!("Removed stale {}", lock.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove {}: {}", lock.display(), e),
        }

        let args = self.launch_args();
        tracing::info!("Launching server: tmux {}", args.join(" "));

        let output = Command::new(TMUX)
            .args(&args)
            .output()
            .await
            .map_err(|e| LifecycleError::LaunchFailed(format!("could not run tmux: {}", e)))?;

        if !output.status.success() {
            return Err(LifecycleError::LaunchFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(())
    }

    async fn kill(&self) {
        let killed = self.probe.kill_all().await;
        tracing::warn!("Force-killed {} server process(es)", killed);
        self.kill_session().await;
    }
}

/// Resolves an executable the way a shell would.
///
/// Names containing a path separator must exist as given; bare names are
/// searched in `path_var`.
pub fn resolve_executable(name: &str, path_var: Option<OsString>) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_var = path_var?;
    std::env::split_paths(&path_var)
        .flat_map(|dir| {
            let plain = dir.join(name);
            let exe = dir.join(format!("{}.exe", name));
            [plain, exe]
        })
        .find(|path| path.is_file())
}
