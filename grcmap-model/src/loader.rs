//! Loading of optional TOML files with a built-in fallback.

use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Reads `path` and parses it with `parse`.
///
/// A missing, unreadable or unparsable file yields `fallback()` and a log
/// line naming `label`; loading never fails.
pub fn load_or_fallback<T, E: fmt::Display>(
    path: &Path,
    label: &str,
    parse: impl FnOnce(&str) -> Result<T, E>,
    fallback: impl FnOnce() -> T,
) -> T {
    if !path.exists() {
        info!("No {} at {:?}, using built-in defaults", label, path);
        return fallback();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match parse(&contents) {
            Ok(value) => {
                info!("Loaded {} from {:?}", label, path);
                value
            }
            Err(e) => {
                warn!(
                    "Failed to parse {} {:?}: {}. Falling back to built-in defaults.",
                    label, path, e
                );
                fallback()
            }
        },
        Err(e) => {
            warn!("Failed to read {} {:?}: {}", label, path, e);
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse_number(contents: &str) -> Result<u32, std::num::ParseIntError> {
        contents.trim().parse()
    }

    #[test]
    fn parses_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"42\n").unwrap();
        assert_eq!(load_or_fallback(file.path(), "number", parse_number, || 0), 42);
    }

    #[test]
    fn missing_file_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert_eq!(load_or_fallback(&path, "number", parse_number, || 7), 7);
    }

    #[test]
    fn unparsable_file_uses_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"forty-two").unwrap();
        assert_eq!(load_or_fallback(file.path(), "number", parse_number, || 7), 7);
    }

    #[test]
    fn unreadable_path_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_or_fallback(dir.path(), "number", parse_number, || 7), 7);
    }
}
