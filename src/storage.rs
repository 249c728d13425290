//! Storage layer: one JSON file per submission record.
//!
//! Records live under `<root>/records/<ID>.json`. Claiming an id is an
//! exclusive file create, so two concurrent submissions can never write
//! the same id; the loser sees the file as already taken and picks a new
//! code.

use crate::refid::ReferenceId;
use crate::types::SubmissionRecord;
use eyre::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Subdirectory holding the record files.
const RECORDS_DIR: &str = "records";

/// Storage handle for reading/writing submission records.
pub struct Storage {
    records_dir: PathBuf,
}

impl Storage {
    /// Open storage rooted at the given directory, creating it as needed.
    pub fn open(root: &Path) -> Result<Self> {
        let records_dir = root.join(RECORDS_DIR);
        fs::create_dir_all(&records_dir).context("Failed to create records directory")?;
        Ok(Self { records_dir })
    }

    /// Path of the record file for an id. The id alphabet is filename-safe
    /// (uppercase alphanumerics and hyphens), so the mapping is the id
    /// itself plus an extension.
    fn record_path(&self, id: &ReferenceId) -> PathBuf {
        self.records_dir.join(format!("{id}.json"))
    }

    /// Does a record with this id exist?
    pub fn exists(&self, id: &ReferenceId) -> Result<bool> {
        Ok(self.record_path(id).exists())
    }

    /// Persist a record under its id, claiming the id exclusively.
    ///
    /// Returns `Ok(false)` without writing anything when the id is already
    /// taken; the create-if-absent open is what makes a concurrent
    /// collision lose cleanly instead of overwriting.
    pub fn create(&self, record: &SubmissionRecord) -> Result<bool> {
        let path = self.record_path(&record.reference_id);
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e).context("Failed to create record file"),
        };

        let mut writer = BufWriter::new(file);
        let written = serde_json::to_writer_pretty(&mut writer, record)
            .map_err(eyre::Report::from)
            .and_then(|()| writer.flush().map_err(eyre::Report::from));
        if let Err(e) = written {
            // A half-written record must not be visible to reads.
            fs::remove_file(&path).ok();
            return Err(e.wrap_err("Failed to write record file"));
        }

        Ok(true)
    }

    /// Read a record by id, `None` if no record exists.
    pub fn read(&self, id: &ReferenceId) -> Result<Option<SubmissionRecord>> {
        let path = self.record_path(id);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("Failed to open record file"),
        };

        let record = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse record file for {id}"))?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use tempfile::TempDir;

    fn make_record(id: &str) -> SubmissionRecord {
        SubmissionRecord {
            reference_id: id.parse().unwrap(),
            submitted_at: Utc::now(),
            client_ip: "1.2.3.4".to_string(),
            user_agent: None,
            network_headers: Default::default(),
            diagnostics: json!({ "online": true }),
        }
    }

    #[test]
    fn test_create_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(temp_dir.path()).unwrap();

        let record = make_record("AB2CD-EFGHJ-23456");
        assert!(storage.create(&record).unwrap());

        let read_back = storage.read(&record.reference_id).unwrap().unwrap();
        assert_eq!(read_back, record);
    }

    #[test]
    fn test_create_refuses_taken_id() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(temp_dir.path()).unwrap();

        let first = make_record("AB2CD-EFGHJ-23456");
        let mut second = make_record("AB2CD-EFGHJ-23456");
        second.client_ip = "9.9.9.9".to_string();

        assert!(storage.create(&first).unwrap());
        assert!(!storage.create(&second).unwrap());

        // The original record is untouched.
        let read_back = storage.read(&first.reference_id).unwrap().unwrap();
        assert_eq!(read_back.client_ip, "1.2.3.4");
    }

    #[test]
    fn test_exists() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(temp_dir.path()).unwrap();

        let record = make_record("AB2CD-EFGHJ-23456");
        assert!(!storage.exists(&record.reference_id).unwrap());
        storage.create(&record).unwrap();
        assert!(storage.exists(&record.reference_id).unwrap());
    }

    #[test]
    fn test_read_missing_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(temp_dir.path()).unwrap();
        let id: ReferenceId = "AB2CD-EFGHJ-23456".parse().unwrap();
        assert!(storage.read(&id).unwrap().is_none());
    }

    #[test]
    fn test_record_file_name_derives_from_id() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(temp_dir.path()).unwrap();
        storage.create(&make_record("AB2CD-EFGHJ-23456")).unwrap();

        let expected = temp_dir.path().join("records").join("AB2CD-EFGHJ-23456.json");
        assert!(expected.is_file());
    }

    #[test]
    fn test_open_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(temp_dir.path()).unwrap();
        storage.create(&make_record("AB2CD-EFGHJ-23456")).unwrap();

        // Re-opening the same root sees the existing record.
        let reopened = Storage::open(temp_dir.path()).unwrap();
        let id: ReferenceId = "AB2CD-EFGHJ-23456".parse().unwrap();
        assert!(reopened.exists(&id).unwrap());
    }
}
