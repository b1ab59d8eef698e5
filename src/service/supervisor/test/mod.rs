use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::{
    data::state_store::StateStore,
    error::lifecycle::LifecycleError,
    model::lifecycle::{LifecycleOutcome, LifecyclePhase},
    service::{
        backend::simulated::{SimEvent, SimulatedBackend, SimulatedOptions},
        probe::ProcessProbe,
        supervisor::{ServerControl, Supervisor, SupervisorSettings},
    },
};
use test_utils::{builder::TestBuilder, context::TestContext, error::TestError, fixture};

mod start;

/// Settings in the shape of production defaults: 2s probes, 20-poll shutdown wait.
fn settings() -> SupervisorSettings {
    SupervisorSettings {
        startup_grace: Duration::from_secs(10),
        shutdown_grace: Duration::from_secs(40),
        probe_interval: Duration::from_secs(2),
        lock_wait: Duration::from_secs(5),
        restart_delay: Duration::from_secs(5),
    }
}

/// Supervisor wired to a simulated backend and a temporary state file.
struct Harness {
    test: TestContext,
    backend: Arc<SimulatedBackend>,
    supervisor: Arc<Supervisor>,
}

impl Harness {
    fn store(&self) -> StateStore {
        StateStore::new(self.test.state_file())
    }

    /// Reads the persisted flag straight from disk.
    async fn persisted(&self) -> bool {
        self.store().load().await
    }
}

/// Builds a harness via `Supervisor::boot`, optionally with the server already up.
async fn harness(
    builder: TestBuilder,
    options: SimulatedOptions,
    running: bool,
    settings: SupervisorSettings,
) -> Result<Harness, TestError> {
    let test = builder.build()?;
    let backend = Arc::new(if running {
        SimulatedBackend::running(options)
    } else {
        SimulatedBackend::new(options)
    });

    let supervisor = Supervisor::boot(
        backend.clone(),
        StateStore::new(test.state_file()),
        settings,
    )
    .await
    .unwrap();

    Ok(Harness {
        test,
        backend,
        supervisor: Arc::new(supervisor),
    })
}
