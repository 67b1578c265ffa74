//! Dated export snapshot folders: `exports/<YYYYMMDD>/...`.

use std::path::{Path, PathBuf};

use crate::CliError;

/// The latest dated snapshot under `base`, by lexicographically greatest
/// folder name. Folder names are `YYYYMMDD`, so lexicographic order is
/// date order. Plain files are ignored.
pub fn latest_snapshot_dir(base: &Path) -> Result<PathBuf, CliError> {
    let entries = std::fs::read_dir(base)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", base.display())))?;

    let mut latest: Option<String> = None;
    for entry in entries {
        let entry = entry.map_err(|e| CliError::io(e.to_string()))?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if latest.as_deref().map_or(true, |current| name.as_str() > current) {
            latest = Some(name);
        }
    }

    match latest {
        Some(name) => Ok(base.join(name)),
        None => Err(CliError::io(format!(
            "no snapshot folders under {}",
            base.display()
        ))),
    }
}

/// Today's snapshot folder name, in UTC.
pub fn snapshot_name_today() -> String {
    chrono::Utc::now().format("%Y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_lexicographically_latest_folder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("20240101")).unwrap();
        std::fs::create_dir(dir.path().join("20241231")).unwrap();
        std::fs::create_dir(dir.path().join("20240615")).unwrap();

        let latest = latest_snapshot_dir(dir.path()).unwrap();
        assert_eq!(latest, dir.path().join("20241231"));
    }

    #[test]
    fn ignores_plain_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("20240101")).unwrap();
        std::fs::write(dir.path().join("99999999.txt"), b"not a folder").unwrap();

        let latest = latest_snapshot_dir(dir.path()).unwrap();
        assert_eq!(latest, dir.path().join("20240101"));
    }

    #[test]
    fn empty_base_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(latest_snapshot_dir(dir.path()).is_err());
        assert!(latest_snapshot_dir(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn snapshot_name_shape() {
        let name = snapshot_name_today();
        assert_eq!(name.len(), 8);
        assert!(name.chars().all(|c| c.is_ascii_digit()));
    }
}
