//! In-memory stand-in for the server process.
//!
//! Selected with `SERVER_BACKEND=simulated` to run the bot without Java, and used
//! by the tests to script launches, crashes and stubborn shutdowns. Every
//! interaction is counted and recorded in an ordered journal.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::Instant;

use crate::{
    error::{lifecycle::LifecycleError, transport::TransportError},
    service::{backend::ServerBackend, console::CommandChannel, probe::ProcessProbe},
};

/// Reply to `list` while the simulated server is up and empty.
pub const EMPTY_PLAYER_LIST: &str = "There are 0 of a max of 20 players online: ";
const MAX_PLAYERS: usize = 20;

/// Scripted behaviour of a simulated server.
#[derive(Debug, Clone)]
pub struct SimulatedOptions {
    /// Time between launch and the process becoming visible to the probe.
    pub launch_delay: Duration,
    /// Probes that still report running after `stop` was sent.
    pub shutdown_probes: u32,
    /// Ignore the `stop` command entirely (only `kill` ends the process).
    pub ignore_stop: bool,
    /// Survive `kill` as well.
    pub ignore_kill: bool,
    /// The launcher errors out.
    pub fail_launch: bool,
    /// The launcher succeeds but the process dies immediately.
    pub crash_on_launch: bool,
    /// Launch precondition check fails with a configuration error.
    pub missing_executable: bool,
    /// Names reported by `list`.
    pub online_players: Vec<String>,
}

impl Default for SimulatedOptions {
    fn default() -> Self {
        Self {
            launch_delay: Duration::ZERO,
            shutdown_probes: 0,
            ignore_stop: false,
            ignore_kill: false,
            fail_launch: false,
            crash_on_launch: false,
            missing_executable: false,
            online_players: Vec::new(),
        }
    }
}

impl SimulatedOptions {
    /// Delays resembling a real server, used by the `simulated` backend setting.
    pub fn realistic() -> Self {
        Self {
            launch_delay: Duration::from_secs(2),
            shutdown_probes: 2,
            ..Self::default()
        }
    }
}

/// Observable interactions, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    Launched,
    LaunchRejected,
    Sent(String),
    Killed,
    Crashed,
}

/// Hook run synchronously whenever a console line is sent.
pub type SendHook = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct SimState {
    /// Instant the process becomes visible; `None` when no process exists.
    alive_from: Option<Instant>,
    /// Remaining probes before a requested shutdown completes.
    stop_countdown: Option<u32>,
    launches: u32,
    kills: u32,
    probes: u32,
    journal: Vec<SimEvent>,
}

impl SimState {
    fn alive(&self) -> bool {
        self.alive_from.is_some_and(|from| Instant::now() >= from)
    }

    fn exit(&mut self) {
        self.alive_from = None;
        self.stop_countdown = None;
    }
}

pub struct SimulatedBackend {
    options: Mutex<SimulatedOptions>,
    state: Mutex<SimState>,
    send_hook: Mutex<Option<SendHook>>,
}

impl SimulatedBackend {
    pub fn new(options: SimulatedOptions) -> Self {
        Self {
            options: Mutex::new(options),
            state: Mutex::new(SimState::default()),
            send_hook: Mutex::new(None),
        }
    }

    /// A backend whose server is already up, as if started before the bot.
    pub fn running(options: SimulatedOptions) -> Self {
        let backend = Self::new(options);
        backend.state().alive_from = Some(Instant::now());
        backend
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        // A poisoned lock only means a test assertion panicked mid-update.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn options(&self) -> SimulatedOptions {
        self.options
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replaces the scripted behaviour for subsequent calls.
    pub fn set_options(&self, options: SimulatedOptions) {
        *self.options.lock().unwrap_or_else(|e| e.into_inner()) = options;
    }

    /// Registers a hook observing every console line at the moment it is sent.
    pub fn on_send(&self, hook: SendHook) {
        *self.send_hook.lock().unwrap_or_else(|e| e.into_inner()) = Some(hook);
    }

    /// Makes the process vanish without a stop command.
    pub fn crash(&self) {
        let mut state = self.state();
        state.exit();
        state.journal.push(SimEvent::Crashed);
    }

    pub fn launches(&self) -> u32 {
        self.state().launches
    }

    pub fn kills(&self) -> u32 {
        self.state().kills
    }

    pub fn probes(&self) -> u32 {
        self.state().probes
    }

    pub fn journal(&self) -> Vec<SimEvent> {
        self.state().journal.clone()
    }

    /// Console lines sent so far.
    pub fn sent_lines(&self) -> Vec<String> {
        self.state()
            .journal
            .iter()
            .filter_map(|event| match event {
                SimEvent::Sent(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Debug for SimulatedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("SimulatedBackend")
            .field("alive", &state.alive())
            .field("launches", &state.launches)
            .field("kills", &state.kills)
            .finish()
    }
}

#[async_trait]
impl ProcessProbe for SimulatedBackend {
    async fn is_running(&self) -> bool {
        let mut state = self.state();
        state.probes += 1;

        if !state.alive() {
            return false;
        }

        match state.stop_countdown {
            Some(0) => {
                state.exit();
                false
            }
            Some(remaining) => {
                state.stop_countdown = Some(remaining - 1);
                true
            }
            None => true,
        }
    }
}

#[async_trait]
impl CommandChannel for SimulatedBackend {
    async fn send_line(&self, text: &str) -> Result<(), TransportError> {
        let hook = self
            .send_hook
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(hook) = hook {
            hook(text);
        }

        let options = self.options();
        let mut state = self.state();
        state.journal.push(SimEvent::Sent(text.to_string()));

        if !state.alive() {
            return Err(TransportError::Unavailable(
                "simulated server is not running".to_string(),
            ));
        }

        if text.trim() == "stop" && !options.ignore_stop && state.stop_countdown.is_none() {
            state.stop_countdown = Some(options.shutdown_probes);
        }

        Ok(())
    }

    async fn query(&self, command: &str) -> Result<String, TransportError> {
        if !self.state().alive() {
            return Err(TransportError::Unavailable(
                "simulated server is not running".to_string(),
            ));
        }

        let players = self.options().online_players;
        let reply = match command.trim() {
            "list" => format!(
                "There are {} of a max of {} players online: {}",
                players.len(),
                MAX_PLAYERS,
                players.join(", ")
            ),
            "save-all" => "Saved the game".to_string(),
            other => format!("Unknown or incomplete command: {}", other),
        };
        Ok(reply)
    }
}

#[async_trait]
impl ServerBackend for SimulatedBackend {
    fn describe(&self) -> String {
        "simulated server (no process is launched)".to_string()
    }

    async fn check_launchable(&self) -> Result<(), LifecycleError> {
        if self.options().missing_executable {
            return Err(LifecycleError::Configuration(
                "Java executable not found: simulated".to_string(),
            ));
        }
        Ok(())
    }

    async fn launch(&self) -> Result<(), LifecycleError> {
        let options = self.options();
        let mut state = self.state();

        if options.fail_launch {
            state.journal.push(SimEvent::LaunchRejected);
            return Err(LifecycleError::LaunchFailed(
                "simulated launcher refused".to_string(),
            ));
        }

        state.launches += 1;
        state.journal.push(SimEvent::Launched);
        if !options.crash_on_launch {
            state.alive_from = Some(Instant::now() + options.launch_delay);
            state.stop_countdown = None;
        }

        Ok(())
    }

    async fn kill(&self) {
        let ignore_kill = self.options().ignore_kill;
        let mut state = self.state();
        state.kills += 1;
        state.journal.push(SimEvent::Killed);
        if !ignore_kill {
            state.exit();
        }
    }
}
