use super::*;

/// Tests reconciliation when the server is found running despite an intentional stop.
///
/// Verifies the flag is forced to false and written back so a later crash is
/// treated as unplanned.
///
/// Expected: Ok(false) with false persisted
#[tokio::test]
async fn running_server_clears_flag() -> Result<(), TestError> {
    let test = TestBuilder::new().with_state(true).build()?;
    let store = StateStore::new(test.state_file());

    let effective = store.reconcile(true).await.unwrap();

    assert!(!effective);
    assert!(!store.load().await);

    Ok(())
}

/// Tests reconciliation when the server is not running.
///
/// Expected: Ok with the persisted value unchanged
#[tokio::test]
async fn stopped_server_keeps_persisted_value() -> Result<(), TestError> {
    let test = TestBuilder::new().with_state(false).build()?;
    let store = StateStore::new(test.state_file());

    assert!(!store.reconcile(false).await.unwrap());

    let test = TestBuilder::new().build()?;
    let store = StateStore::new(test.state_file());

    assert!(store.reconcile(false).await.unwrap());
    assert!(!test.state_file().exists());

    Ok(())
}
