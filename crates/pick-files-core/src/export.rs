use crate::error::Error;
use crate::model::FileRecord;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, ErrorKind, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Target name meaning standard output.
pub const STDOUT_TARGET: &str = "-";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Yaml,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
            ExportFormat::Yaml => "YAML",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            _ => Err(Error::Export(format!("unknown database dump format '{}'", s))),
        }
    }
}

/// Serialize `records` in `format` to `writer`.
pub fn write_records<W: Write>(
    records: &[FileRecord],
    format: ExportFormat,
    mut writer: W,
) -> Result<(), Error> {
    match format {
        ExportFormat::Csv => {
            let mut csv_writer = csv::Writer::from_writer(writer);
            csv_writer.write_record(["Name", "Path", "Fingerprint", "Last Picked", "Last Seen"])?;
            for record in records {
                let last_picked = record
                    .last_picked
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default();
                csv_writer.write_record([
                    record.name.as_str(),
                    record.path.as_str(),
                    record.fingerprint.as_str(),
                    last_picked.as_str(),
                    record.last_seen.to_rfc3339().as_str(),
                ])?;
            }
            csv_writer.flush()?;
        }
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, records)
                .map_err(|e| Error::Export(e.to_string()))?;
            writeln!(writer)?;
        }
        ExportFormat::Yaml => {
            serde_yaml::to_writer(&mut writer, records)?;
        }
    }
    Ok(())
}

/// Write `records` to `target`, where `-` is standard output. A file target
/// that already exists is refused.
pub fn export_records(
    records: &[FileRecord],
    format: ExportFormat,
    target: &str,
) -> Result<(), Error> {
    if target == STDOUT_TARGET {
        let stdout = io::stdout();
        return write_records(records, format, stdout.lock());
    }

    let path = Path::new(target);
    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            return Err(Error::OutputExists(path.to_path_buf()));
        }
        Err(err) => return Err(Error::Io(err)),
    };
    write_records(records, format, io::BufWriter::new(file))?;
    debug!("Wrote {} records as {} to {}", records.len(), format, target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::fs;
    use tempfile::tempdir;

    fn sample() -> Vec<FileRecord> {
        let seen = DateTime::parse_from_rfc3339("2024-05-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        vec![
            FileRecord {
                name: "a.jpg".into(),
                path: "pics/a.jpg".into(),
                fingerprint: "aa".into(),
                last_seen: seen,
                last_picked: Some(seen),
            },
            FileRecord {
                name: "b, c.jpg".into(),
                path: "pics/b, c.jpg".into(),
                fingerprint: "bb".into(),
                last_seen: seen,
                last_picked: None,
            },
        ]
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("yml".parse::<ExportFormat>().unwrap(), ExportFormat::Yaml);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_csv_has_header_and_quotes() {
        let mut out = Vec::new();
        write_records(&sample(), ExportFormat::Csv, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Name,Path,Fingerprint,Last Picked,Last Seen");
        assert!(lines[1].starts_with("a.jpg,pics/a.jpg,aa,2024-05-01T08:00:00+00:00"));
        assert!(lines[2].starts_with("\"b, c.jpg\",\"pics/b, c.jpg\",bb,,"));
    }

    #[test]
    fn test_json_and_yaml_parse_back() {
        let mut json = Vec::new();
        write_records(&sample(), ExportFormat::Json, &mut json).unwrap();
        let from_json: Vec<FileRecord> = serde_json::from_slice(&json).unwrap();
        assert_eq!(from_json, sample());

        let mut yaml = Vec::new();
        write_records(&sample(), ExportFormat::Yaml, &mut yaml).unwrap();
        let from_yaml: Vec<FileRecord> = serde_yaml::from_slice(&yaml).unwrap();
        assert_eq!(from_yaml, sample());
    }

    #[test]
    fn test_export_refuses_existing_file() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("dump.csv");
        fs::write(&target, "precious").unwrap();

        let err = export_records(&sample(), ExportFormat::Csv, &target.to_string_lossy())
            .unwrap_err();
        assert!(matches!(err, Error::OutputExists(_)));
        assert_eq!(fs::read_to_string(&target).unwrap(), "precious");
    }

    #[test]
    fn test_export_to_new_file() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("dump.json");
        export_records(&sample(), ExportFormat::Json, &target.to_string_lossy()).unwrap();
        assert!(fs::read_to_string(&target).unwrap().contains("\"fingerprint\": \"aa\""));
    }
}
