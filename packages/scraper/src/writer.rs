//! JSON output: one file per record under `<output>/<scraper type>/`.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::level_fields;
use crate::error::{Result, ScrapeError};
use crate::metadata::Metadata;
use crate::model::Record;
use crate::scrape::ScraperType;

/// Writes records and jurisdiction metadata for one jurisdiction.
#[derive(Debug, Clone)]
pub struct RecordWriter {
    output_dir: PathBuf,
    level: String,
    /// `(field, value)` pairs stamped on every record, e.g. `state: nc`.
    level_values: Vec<(String, String)>,
}

impl RecordWriter {
    pub fn new(output_dir: impl Into<PathBuf>, metadata: &Metadata) -> Self {
        let level_values = level_fields(&metadata.level)
            .iter()
            .map(|field| {
                let value = if *field == metadata.level {
                    metadata.abbreviation.clone()
                } else {
                    metadata
                        .extra
                        .get(*field)
                        .and_then(Value::as_str)
                        .map_or_else(|| "us".to_string(), str::to_string)
                };
                ((*field).to_string(), value)
            })
            .collect();

        Self {
            output_dir: output_dir.into(),
            level: metadata.level.clone(),
            level_values,
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn type_dir(&self, scraper_type: ScraperType) -> PathBuf {
        self.output_dir.join(scraper_type.as_str())
    }

    /// Create the directory for a scraper type, or clear old `*.json` in it.
    pub fn prepare(&self, scraper_type: ScraperType) -> Result<()> {
        let dir = self.type_dir(scraper_type);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            tracing::debug!(dir = %dir.display(), "Created output directory");
            return Ok(());
        }

        let mut removed = 0usize;
        for path in json_files(&dir)? {
            fs::remove_file(&path)?;
            removed += 1;
        }
        tracing::debug!(dir = %dir.display(), removed, "Cleared old records");
        Ok(())
    }

    /// Write the metadata as `<level>_metadata.json`.
    pub fn write_metadata(&self, metadata: &Metadata) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{}_metadata.json", self.level));
        fs::write(&path, serde_json::to_vec_pretty(metadata)?)?;
        tracing::debug!(path = %path.display(), "Wrote metadata");
        Ok(path)
    }

    /// Write a record, stamping `_type`, `level` and the level fields.
    pub fn write<R: Record>(&self, scraper_type: ScraperType, record: &R) -> Result<PathBuf> {
        let mut value = serde_json::to_value(record)?;
        let Value::Object(fields) = &mut value else {
            return Err(ScrapeError::scraper(
                scraper_type,
                format!("{} did not serialize to a JSON object", R::KIND),
            ));
        };

        fields.insert("_type".to_string(), Value::from(R::KIND));
        fields.insert("level".to_string(), Value::from(self.level.as_str()));
        for (field, v) in &self.level_values {
            fields.insert(field.clone(), Value::from(v.as_str()));
        }

        let dir = self.type_dir(scraper_type);
        fs::create_dir_all(&dir)?;
        let path = dir.join(record.filename());
        fs::write(&path, serde_json::to_vec_pretty(&value)?)?;
        tracing::debug!(path = %path.display(), "Wrote record");
        Ok(path)
    }

    /// Written record files for a scraper type, sorted by name.
    pub fn records(&self, scraper_type: ScraperType) -> Result<Vec<PathBuf>> {
        let dir = self.type_dir(scraper_type);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        json_files(&dir)
    }
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "json"))
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bill, Chamber};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn metadata() -> Metadata {
        Metadata::from_json(
            r#"{"name": "North Carolina", "abbreviation": "nc",
                "terms": [{"name": "2011-2012", "start_year": 2011, "end_year": 2012,
                           "sessions": ["2011"]}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_write_stamps_level_fields() {
        let dir = TempDir::new().unwrap();
        let writer = RecordWriter::new(dir.path(), &metadata());
        let mut bill = Bill::new("2011", Chamber::Lower, "HB 1", "An Act");
        bill.add_source("http://example.com");

        let path = writer.write(ScraperType::Bills, &bill).unwrap();

        assert_eq!(path, dir.path().join("bills").join("2011_lower_HB 1.json"));
        let json: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(json["_type"], "bill");
        assert_eq!(json["level"], "state");
        assert_eq!(json["state"], "nc");
        assert_eq!(json["country"], "us");
        assert_eq!(json["bill_id"], "HB 1");
    }

    #[test]
    fn test_prepare_clears_only_json() {
        let dir = TempDir::new().unwrap();
        let writer = RecordWriter::new(dir.path(), &metadata());
        let bills = dir.path().join("bills");
        fs::create_dir_all(&bills).unwrap();
        fs::write(bills.join("old.json"), "{}").unwrap();
        fs::write(bills.join("notes.txt"), "keep").unwrap();

        writer.prepare(ScraperType::Bills).unwrap();

        assert!(!bills.join("old.json").exists());
        assert!(bills.join("notes.txt").exists());
    }

    #[test]
    fn test_prepare_creates_directory() {
        let dir = TempDir::new().unwrap();
        let writer = RecordWriter::new(dir.path().join("nc"), &metadata());
        writer.prepare(ScraperType::Votes).unwrap();
        assert!(dir.path().join("nc").join("votes").is_dir());
        assert!(writer.records(ScraperType::Votes).unwrap().is_empty());
    }

    #[test]
    fn test_write_metadata() {
        let dir = TempDir::new().unwrap();
        let writer = RecordWriter::new(dir.path(), &metadata());
        let path = writer.write_metadata(&metadata()).unwrap();
        assert_eq!(path, dir.path().join("state_metadata.json"));
        let back = Metadata::load(&path).unwrap();
        assert_eq!(back, metadata());
    }
}
