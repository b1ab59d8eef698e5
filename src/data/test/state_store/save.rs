use super::*;

/// Tests that a saved value is read back.
///
/// Verifies the written file matches the documented record format.
///
/// Expected: Ok with the record on disk and load returning the saved value
#[tokio::test]
async fn persists_value() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;
    let store = StateStore::new(test.state_file());

    store.save(false).await.unwrap();

    assert!(!store.load().await);
    assert_eq!(
        std::fs::read_to_string(test.state_file())?,
        fixture::state_file::contents(false)?
    );

    Ok(())
}

/// Tests that saving replaces a corrupt file and leaves no temporary file behind.
///
/// Expected: Ok with only the state file present
#[tokio::test]
async fn replaces_existing_file() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;
    std::fs::write(test.state_file(), fixture::state_file::CORRUPT)?;
    let store = StateStore::new(test.state_file());

    store.save(true).await.unwrap();
    store.save(false).await.unwrap();

    assert!(!store.load().await);
    let entries: Vec<_> = std::fs::read_dir(test.root())?
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(entries.is_empty(), "leftover temp files: {:?}", entries);

    Ok(())
}

/// Tests that missing parent directories are created.
///
/// Expected: Ok with the file written under the new directory
#[tokio::test]
async fn creates_parent_directory() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;
    let path = test.root().join("nested").join("state.json");
    let store = StateStore::new(&path);

    store.save(true).await.unwrap();

    assert!(path.is_file());
    assert!(store.load().await);

    Ok(())
}

/// Tests a leftover temporary file from an interrupted earlier write.
///
/// Expected: Ok with the stale bytes replaced, not appended to
#[tokio::test]
async fn overwrites_stale_temp_file() -> Result<(), TestError> {
    let test = TestBuilder::new().build()?;
    let temp = test.root().join("server_state.json.tmp");
    std::fs::write(&temp, "x".repeat(256))?;
    let store = StateStore::new(test.state_file());

    store.save(false).await.unwrap();

    assert!(!temp.exists());
    assert_eq!(
        std::fs::read_to_string(test.state_file())?,
        fixture::state_file::contents(false)?
    );
    assert_eq!(store.path(), test.state_file().as_path());

    Ok(())
}
