use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
};

use crate::error::TestError;

/// Creates (or truncates) a log file containing the given lines.
pub fn create_log(path: &Path, lines: &[String]) -> Result<(), TestError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut contents = String::new();
    for line in lines {
        contents.push_str(line);
        contents.push('\n');
    }

    fs::write(path, contents)?;
    Ok(())
}

/// Appends lines to an existing log file, as a running server would.
pub fn append_lines(path: &Path, lines: &[String]) -> Result<(), TestError> {
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;

    for line in lines {
        writeln!(file, "{line}")?;
    }

    Ok(())
}
