//! Output artifact naming
//!
//! Converted files are named `{base}_{timestamp}.{ext}` with a sortable
//! second-resolution timestamp. The timestamp alone cannot distinguish two
//! writes of the same base name within one second, so the final path is
//! probed against the filesystem and a numeric suffix is appended on
//! collision (`{base}_{timestamp}_{n}.{ext}`).

use chrono::Local;
use std::path::{Path, PathBuf};

/// Current wall-clock time as a sortable string (second resolution)
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d%H%M%S").to_string()
}

/// Compute a collision-free output path under `dir`.
///
/// Does not create the file; the caller is expected to create it promptly.
pub fn unique_output_path(dir: &Path, base: &str, extension: &str) -> PathBuf {
    output_path_at(dir, base, &timestamp(), extension)
}

fn output_path_at(dir: &Path, base: &str, ts: &str, extension: &str) -> PathBuf {
    let candidate = dir.join(format!("{base}_{ts}.{extension}"));
    if !candidate.exists() {
        return candidate;
    }

    let mut n: u32 = 1;
    loop {
        let candidate = dir.join(format!("{base}_{ts}_{n}.{extension}"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_timestamp_is_sortable_digits() {
        let ts = timestamp();
        assert_eq!(ts.len(), 14);
        assert!(ts.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_unique_path_no_collision() {
        let dir = tempdir().unwrap();
        let path = output_path_at(dir.path(), "report", "20240101120000", "csv");
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "report_20240101120000.csv"
        );
    }

    #[test]
    fn test_unique_path_appends_counter_on_collision() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("report_20240101120000.csv"), b"").unwrap();
        fs::write(dir.path().join("report_20240101120000_1.csv"), b"").unwrap();

        let path = output_path_at(dir.path(), "report", "20240101120000", "csv");
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "report_20240101120000_2.csv"
        );
    }
}
