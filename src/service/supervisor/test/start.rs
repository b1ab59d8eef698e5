use super::*;

/// Tests the documented start scenario.
///
/// Verifies that a process which becomes observable within 2s of launch is
/// reported as started and that the intentional-stop flag is persisted as false.
///
/// Expected: Ok with success report, one launch, false persisted
#[tokio::test(start_paused = true)]
async fn starts_stopped_server() -> Result<(), TestError> {
    let h = harness(
        TestBuilder::new().with_state(true),
        SimulatedOptions {
            launch_delay: Duration::from_secs(2),
            ..SimulatedOptions::default()
        },
        false,
        settings(),
    )
    .await?;

    let report = h.supervisor.start().await.unwrap();

    assert!(report.success());
    assert_eq!(report.message(), "Server started successfully");
    assert_eq!(report.outcome, Ok(LifecycleOutcome::Started));
    assert_eq!(h.backend.launches(), 1);
    assert!(!h.supervisor.is_intentionally_stopped());
    assert!(!h.persisted().await);
    assert_eq!(h.supervisor.successful_starts(), 1);

    Ok(())
}

/// Tests starting a server that is already running.
///
/// Verifies idempotence: no second launch and no error.
///
/// Expected: Ok with success report and zero launches
#[tokio::test(start_paused = true)]
async fn start_when_running_is_noop() -> Result<(), TestError> {
    let h = harness(TestBuilder::new(), SimulatedOptions::default(), true, settings()).await?;

    let report = h.supervisor.start().await.unwrap();

    assert!(report.success());
    assert_eq!(report.message(), "Server is already running");
    assert_eq!(h.backend.launches(), 0);
    assert!(h.backend.is_running().await);

    Ok(())
}

/// Tests a process that dies right after launch.
///
/// Expected: StartupFailure, phase back to Stopped, flag untouched
#[tokio::test(start_paused = true)]
async fn reports_startup_failure() -> Result<(), TestError> {
    let h = harness(
        TestBuilder::new().with_state(true),
        SimulatedOptions {
            crash_on_launch: true,
            ..SimulatedOptions::default()
        },
        false,
        settings(),
    )
    .await?;

    let report = h.supervisor.start().await.unwrap();

    assert!(!report.success());
    assert_eq!(
        report.error(),
        Some(&LifecycleError::StartupFailure {
            grace: Duration::from_secs(10)
        })
    );
    assert_eq!(h.supervisor.phase(), LifecyclePhase::Stopped);
    assert!(h.supervisor.is_intentionally_stopped());
    assert!(h.persisted().await);
    assert_eq!(h.supervisor.successful_starts(), 0);

    Ok(())
}

/// Tests a server whose executable is missing.
///
/// Expected: Configuration error without any launch attempt
#[tokio::test(start_paused = true)]
async fn reports_configuration_error() -> Result<(), TestError> {
    let h = harness(
        TestBuilder::new(),
        SimulatedOptions {
            missing_executable: true,
            ..SimulatedOptions::default()
        },
        false,
        settings(),
    )
    .await?;

    let report = h.supervisor.start().await.unwrap();

    assert!(matches!(
        report.error(),
        Some(LifecycleError::Configuration(_))
    ));
    assert!(!report.error().unwrap().is_retryable());
    assert_eq!(h.backend.launches(), 0);

    Ok(())
}

/// Tests a launcher that fails outright.
///
/// Expected: LaunchFailed, which is retryable
#[tokio::test(start_paused = true)]
async fn reports_launch_failure() -> Result<(), TestError> {
    let h = harness(
        TestBuilder::new(),
        SimulatedOptions {
            fail_launch: true,
            ..SimulatedOptions::default()
        },
        false,
        settings(),
    )
    .await?;

    let report = h.supervisor.start().await.unwrap();

    assert!(matches!(report.error(), Some(LifecycleError::LaunchFailed(_))));
    assert!(report.error().unwrap().is_retryable());
    assert_eq!(h.backend.journal(), vec![SimEvent::LaunchRejected]);

    Ok(())
}

/// Tests that a failed start can be retried once the cause is fixed.
///
/// Expected: second start succeeds
#[tokio::test(start_paused = true)]
async fn start_recovers_after_failure() -> Result<(), TestError> {
    let h = harness(
        TestBuilder::new(),
        SimulatedOptions {
            crash_on_launch: true,
            ..SimulatedOptions::default()
        },
        false,
        settings(),
    )
    .await?;

    assert!(!h.supervisor.start().await.unwrap().success());

    h.backend.set_options(SimulatedOptions::default());
    let report = h.supervisor.start().await.unwrap();

    assert_eq!(report.outcome, Ok(LifecycleOutcome::Started));
    assert_eq!(h.backend.launches(), 2);

    Ok(())
}
