use crate::{
    bot::embed::Reply,
    model::lifecycle::{LifecycleAction, LifecycleOutcome},
    state::AppState,
};

/// Runs /start, /stop or /restart through the supervisor.
///
/// The outcome is mirrored to the debug channel. A stop that actually stopped the
/// server is also announced in the public log channel.
pub async fn run(state: &AppState, action: LifecycleAction) -> Reply {
    let title = format!("/{}", action);
    let control = state.control.as_ref();

    let result = match action {
        LifecycleAction::Start => control.start().await,
        LifecycleAction::Stop => control.stop().await,
        LifecycleAction::Restart => control.restart().await,
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("/{} failed unexpectedly: {}", action, e);
            state
                .notifier
                .alert(&format!("/{} failed unexpectedly: {}", action, e))
                .await;
            return Reply::failure(title, format!("Internal error: {}", e));
        }
    };

    tracing::info!("/{}: {}", action, report.message());
    state
        .notifier
        .debug(&format!("/{}: {}", action, report.message()))
        .await;

    if matches!(
        report.outcome,
        Ok(LifecycleOutcome::Stopped | LifecycleOutcome::StoppedForced)
    ) {
        state.notifier.log("🛑 Server is **OFFLINE**").await;
    }

    Reply::from_report(title, &report)
}
