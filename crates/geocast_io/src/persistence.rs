//! Run report and event log storage.
//!
//! Reports are JSON; a path ending in `.gz` is written and read through
//! gzip.

use crate::error::{IoError, Result};
use crate::report::RunReport;
use crate::serialization::{from_json, to_json_pretty};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use geocast_core::history::EventLog;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

pub fn save_report<P: AsRef<Path>>(report: &RunReport, path: P) -> Result<()> {
    let path = path.as_ref();
    let json = to_json_pretty(report)?;
    let file = File::create(path)?;
    if is_gzip(path) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        encoder.write_all(json.as_bytes())?;
        encoder
            .finish()
            .map_err(IoError::Gzip)?
            .flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        writer.write_all(json.as_bytes())?;
        writer.flush()?;
    }
    Ok(())
}

pub fn load_report<P: AsRef<Path>>(path: P) -> Result<RunReport> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::MissingFile(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let mut json = String::new();
    if is_gzip(path) {
        GzDecoder::new(file)
            .read_to_string(&mut json)
            .map_err(IoError::Gzip)?;
    } else {
        let mut file = file;
        file.read_to_string(&mut json)?;
    }
    from_json(&json).map_err(|e| e.with_context(format!("loading report {}", path.display())))
}

/// Writes the event log as one JSON object per line.
pub fn save_events<P: AsRef<Path>>(events: &EventLog, path: P) -> Result<()> {
    let lines = events.to_json_lines()?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(lines.as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::small_run;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("geocast-{}-{}", uuid::Uuid::new_v4(), name))
    }

    #[test]
    fn test_plain_report_reload() {
        let report = small_run();
        let path = scratch("report.json");
        save_report(&report, &path).unwrap();
        let loaded = load_report(&path).unwrap();
        assert_eq!(loaded, report);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_gzip_report_reload() {
        let report = small_run();
        let path = scratch("report.json.gz");
        save_report(&report, &path).unwrap();

        let mut magic = [0u8; 2];
        File::open(&path).unwrap().read_exact(&mut magic).unwrap();
        assert_eq!(magic, [0x1f, 0x8b]);

        assert_eq!(load_report(&path).unwrap().run_id, report.run_id);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_missing_report() {
        let path = scratch("absent.json");
        let err = load_report(&path).unwrap_err();
        assert!(matches!(err, IoError::MissingFile(p) if p == path));
    }

    #[test]
    fn test_truncated_gzip_is_gzip_error() {
        let path = scratch("truncated.json.gz");
        std::fs::write(&path, [0x1f, 0x8b, 0x08]).unwrap();
        let err = load_report(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, IoError::Gzip(_)));
    }
}
