use super::*;

/// Tests loading when no state file exists.
///
/// Verifies that a missing file is treated as an intentional stop so a fresh
/// install never auto-starts the server.
///
/// Expected: true
#[tokio::test]
async fn defaults_to_intentional_when_absent() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;
    let store = StateStore::new(test.state_file());

    assert!(store.load().await);

    Ok(())
}

/// Tests loading a persisted `false`.
///
/// Expected: false
#[tokio::test]
async fn reads_persisted_value() -> Result<(), TestError> {
    let test = TestBuilder::new().with_state(false).build()?;
    let store = StateStore::new(test.state_file());

    assert!(!store.load().await);

    Ok(())
}

/// Tests loading a file that is not valid JSON.
///
/// Expected: true
#[tokio::test]
async fn defaults_to_intentional_when_corrupt() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;
    std::fs::write(test.state_file(), fixture::state_file::CORRUPT)?;
    let store = StateStore::new(test.state_file());

    assert!(store.load().await);

    Ok(())
}

/// Tests loading valid JSON without the expected field.
///
/// Expected: true
#[tokio::test]
async fn defaults_to_intentional_when_field_missing() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;
    std::fs::write(test.state_file(), fixture::state_file::MISSING_FIELD)?;
    let store = StateStore::new(test.state_file());

    assert!(store.load().await);

    Ok(())
}
