use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{HotfolderError, Result};

fn folder_name_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{2}-\d{2}$").expect("static pattern compiles"))
}

/// Check that a subfolder name matches the XX-XX format (two numeric
/// groups separated by a hyphen, e.g. "01-04").
pub fn validate_folder_name(name: &str) -> Result<()> {
    if folder_name_regex().is_match(name) {
        Ok(())
    } else {
        Err(HotfolderError::InvalidFolderFormat(name.to_string()))
    }
}

/// Resolve a subfolder name against the base source directory, checking
/// both the name format and that the resolved directory exists.
pub fn resolve_subfolder(base: &Path, name: &str) -> Result<PathBuf> {
    validate_folder_name(name)?;

    let path = base.join(name);
    if !path.is_dir() {
        return Err(HotfolderError::InvalidPath(path));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_valid_folder_names() {
        for name in ["01-04", "00-00", "99-99", "12-34"] {
            assert!(validate_folder_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_folder_names() {
        for name in [
            "", "1-04", "01-4", "001-04", "01-004", "0104", "01_04", "ab-cd", "01-04x",
            "x01-04", " 01-04", "01-04 ", "01--04",
        ] {
            assert!(
                matches!(
                    validate_folder_name(name),
                    Err(HotfolderError::InvalidFolderFormat(_))
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_existing_subfolder() {
        let base = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(base.path().join("01-04")).expect("Failed to create subfolder");

        let path = resolve_subfolder(base.path(), "01-04").expect("Failed to resolve");

        assert_eq!(path, base.path().join("01-04"));
    }

    #[test]
    fn test_resolve_missing_subfolder() {
        let base = TempDir::new().expect("Failed to create temp dir");

        let result = resolve_subfolder(base.path(), "01-04");

        assert!(matches!(result, Err(HotfolderError::InvalidPath(_))));
    }

    #[test]
    fn test_resolve_rejects_bad_format_before_path_check() {
        let base = TempDir::new().expect("Failed to create temp dir");

        let result = resolve_subfolder(base.path(), "../escape");

        assert!(matches!(
            result,
            Err(HotfolderError::InvalidFolderFormat(_))
        ));
    }
}
