//! I/O utility functions for output directories and clean-entry files.
//!
//! This module provides helper functions for:
//! - Creating the per-dictionary output directory
//! - Opening buffered output files
//! - Reading and writing tab-separated clean-entry files
//!
//! A clean-entry file holds one `key<TAB>value` line per entry, UTF-8 encoded.
//!
//! # Examples
//!
//! ```no_run
//! use hawdict::utils::io_utils::{read_clean_entries, write_clean_entries};
//!
//! let entries = vec![("hale".to_string(), "House.".to_string())];
//! write_clean_entries("PukuiElbert.HawToEng.clean.txt", &entries).unwrap();
//! let loaded = read_clean_entries("PukuiElbert.HawToEng.clean.txt").unwrap();
//! assert_eq!(loaded, entries);
//! ```

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::*;

use crate::{Result, DictError};

/// Returns `dir`, creating it (and its parents) when missing.
///
/// # Errors
///
/// Returns `InvalidParameter` for an empty path, or an I/O error if the
/// directory cannot be created.
pub fn ensure_dir<P: AsRef<Path>>(dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    if dir.as_os_str().is_empty() {
        return Err(DictError::invalid_parameter("output directory"));
    }
    if dir.is_dir() {
        debug!("Directory already exists: {}", dir.display());
    } else {
        debug!("Creating directory: {}", dir.display());
        fs::create_dir_all(dir)?;
    }
    Ok(dir.to_path_buf())
}

/// Creates (or truncates) `dir/file_name` and returns a buffered writer.
pub fn create_output_file<P: AsRef<Path>>(dir: P, file_name: &str) -> Result<BufWriter<File>> {
    let path = dir.as_ref().join(file_name);
    let file = File::create(&path)?;
    Ok(BufWriter::new(file))
}

fn skip_utf8_bom(line: &str) -> &str {
    // UTF-8 BOM is 0xEF 0xBB 0xBF which appears as \u{FEFF} in UTF-8
    line.strip_prefix('\u{FEFF}').unwrap_or(line)
}

/// Writes entries as `key<TAB>value` lines.
pub fn write_clean_entries<P: AsRef<Path>>(path: P, entries: &[(String, String)]) -> Result<usize> {
    let mut writer = BufWriter::new(File::create(path)?);
    for (key, value) in entries {
        writeln!(writer, "{}\t{}", key, value)?;
    }
    writer.flush()?;
    Ok(entries.len())
}

/// Reads a clean-entry file. Blank lines are skipped.
///
/// # Errors
///
/// Returns `InvalidDataFormat` for a non-blank line without a tab.
pub fn read_clean_entries<P: AsRef<Path>>(path: P) -> Result<Vec<(String, String)>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut entries = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let mut line = line.as_str();
        if line_no == 0 {
            line = skip_utf8_bom(line);
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('\t') else {
            return Err(DictError::invalid_data_format(format!(
                "{}:{}: missing tab separator",
                path.as_ref().display(),
                line_no + 1
            )));
        };
        entries.push((key.to_string(), value.to_string()));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_entries_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.clean.txt");
        let entries = vec![
            ("hale, home".to_string(), "1. House. 2. Building.".to_string()),
            ("pō·ʻai".to_string(), "Circle.".to_string()),
        ];
        assert_eq!(write_clean_entries(&path, &entries).unwrap(), 2);
        assert_eq!(read_clean_entries(&path).unwrap(), entries);
    }

    #[test]
    fn test_read_clean_entries_bom_and_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.clean.txt");
        fs::write(&path, "\u{FEFF}aloha\tLove.\r\n\r\nmahalo\tThanks.\n").unwrap();
        let entries = read_clean_entries(&path).unwrap();
        assert_eq!(entries, vec![
            ("aloha".to_string(), "Love.".to_string()),
            ("mahalo".to_string(), "Thanks.".to_string()),
        ]);
    }

    #[test]
    fn test_read_clean_entries_rejects_missing_tab() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.clean.txt");
        fs::write(&path, "aloha Love.\n").unwrap();
        assert!(matches!(read_clean_entries(&path), Err(DictError::InvalidDataFormat { .. })));
    }

    #[test]
    fn test_ensure_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        assert_eq!(ensure_dir(&nested).unwrap(), nested);
        assert!(nested.is_dir());
        assert!(ensure_dir(&nested).is_ok());
        assert!(ensure_dir("").unwrap_err().is_invalid_parameter());
    }
}
