//! Liveness checks against the OS process table.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

/// Answers whether the managed server process is alive.
///
/// "Not found" is a normal `false`. Implementations that fail to inspect the
/// system log the failure and also return `false`.
#[async_trait]
pub trait ProcessProbe: Send + Sync {
    async fn is_running(&self) -> bool;
}

/// What identifies the managed server among all OS processes.
#[derive(Debug, Clone)]
pub struct ProcessSignature {
    /// Executable name without extension, e.g. `java`.
    pub executable: String,
    /// Jar filename that must appear in the command line.
    pub jar_name: String,
    /// Working directory of the server process.
    pub working_dir: PathBuf,
}

impl ProcessSignature {
    pub fn new(java_path: &str, jar_name: &str, working_dir: &Path) -> Self {
        let executable = Path::new(java_path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| java_path.to_string());

        Self {
            executable,
            jar_name: jar_name.to_string(),
            working_dir: std::fs::canonicalize(working_dir)
                .unwrap_or_else(|_| working_dir.to_path_buf()),
        }
    }

    /// Whether a process with the given name, command line and cwd is the server.
    pub fn matches(&self, name: &str, cmd: &[OsString], cwd: Option<&Path>) -> bool {
        let name_matches = Path::new(name)
            .file_stem()
            .is_some_and(|stem| stem.to_string_lossy() == self.executable);

        let jar_matches = cmd.iter().any(|arg| {
            Path::new(arg)
                .file_name()
                .is_some_and(|file| file.to_string_lossy() == self.jar_name)
        });

        let cwd_matches = cwd.is_some_and(|cwd| {
            cwd == self.working_dir
                || std::fs::canonicalize(cwd).is_ok_and(|cwd| cwd == self.working_dir)
        });

        name_matches && jar_matches && cwd_matches
    }
}

/// Probe backed by `sysinfo` process enumeration.
///
/// Enumeration is blocking, so it runs on the blocking pool. When more than one
/// process matches (a double start), every match but the oldest is killed.
#[derive(Clone)]
pub struct SysinfoProbe {
    signature: Arc<ProcessSignature>,
}

impl SysinfoProbe {
    pub fn new(signature: ProcessSignature) -> Self {
        Self {
            signature: Arc::new(signature),
        }
    }

    /// Matching processes, oldest first.
    fn scan(signature: &ProcessSignature) -> (System, Vec<Pid>) {
        let mut system = System::new();
        let refresh = ProcessRefreshKind::nothing()
            .with_cmd(UpdateKind::Always)
            .with_cwd(UpdateKind::Always);
        system.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh);

        let mut matches: Vec<(u64, Pid)> = system
            .processes()
            .iter()
            .filter(|(_, process)| {
                signature.matches(
                    &process.name().to_string_lossy(),
                    process.cmd(),
                    process.cwd(),
                )
            })
            .map(|(pid, process)| (process.start_time(), *pid))
            .collect();
        matches.sort();

        (system, matches.into_iter().map(|(_, pid)| pid).collect())
    }

    /// Kills every matching process.
    ///
    /// # Returns
    /// - Number of processes a kill signal was delivered to
    pub async fn kill_all(&self) -> usize {
        let signature = self.signature.clone();
        let result = tokio::task::spawn_blocking(move || {
            let (system, pids) = Self::scan(&signature);
            pids.iter()
                .filter_map(|pid| system.process(*pid))
                .filter(|process| process.kill())
                .count()
        })
        .await;

        match result {
            Ok(killed) => killed,
            Err(e) => {
                tracing::error!("Process kill task failed: {}", e);
                0
            }
        }
    }
}

#[async_trait]
impl ProcessProbe for SysinfoProbe {
    async fn is_running(&self) -> bool {
        let signature = self.signature.clone();
        let result = tokio::task::spawn_blocking(move || {
            let (system, pids) = Self::scan(&signature);
            let mut duplicates = Vec::new();
            for pid in pids.iter().skip(1) {
                if let Some(process) = system.process(*pid) {
                    if process.kill() {
                        duplicates.push(pid.as_u32());
                    }
                }
            }
            (!pids.is_empty(), duplicates)
        })
        .await;

        match result {
            Ok((running, duplicates)) => {
                if !duplicates.is_empty() {
                    tracing::warn!(
                        "Found duplicate server processes, killed pids {:?}",
                        duplicates
                    );
                }
                running
            }
            Err(e) => {
                // Reported as not running; the supervisor re-probes after locking.
                tracing::error!("Process enumeration failed: {}", e);
                false
            }
        }
    }
}
