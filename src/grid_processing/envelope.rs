//! The persisted grid document.
//!
//! ```json
//! {
//!   "timestamp": "2026-10-17T09:30:00.123+00:00",
//!   "version": "1.0",
//!   "gridWidth": 2,
//!   "gridHeight": 1,
//!   "data": [["#FF0000", "#00FF00"]]
//! }
//! ```

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::color::is_acceptable_cell;
use super::GridSize;
use crate::error::{GridError, GridResult};

/// Schema revision written into every document
pub const SCHEMA_VERSION: &str = "1.0";

/// Row-major hex colors: `grid[y][x]`
pub type Grid = Vec<Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridEnvelope {
    pub timestamp: String,
    pub version: String,
    pub grid_width: u32,
    pub grid_height: u32,
    pub data: Grid,
    /// Keys written by other tools, carried through merges untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Current UTC time, ISO-8601 with millisecond precision
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, false)
}

impl GridEnvelope {
    pub fn new(size: GridSize, data: Grid) -> Self {
        Self {
            timestamp: utc_timestamp(),
            version: SCHEMA_VERSION.to_string(),
            grid_width: size.width(),
            grid_height: size.height(),
            data,
            extra: serde_json::Map::new(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.grid_width, self.grid_height)
    }

    /// Check that `data` matches the declared dimensions and every cell is
    /// empty or a hex color.
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_width < 1 || self.grid_height < 1 {
            return Err(format!(
                "grid must be at least 1x1, found {}x{}",
                self.grid_width, self.grid_height
            ));
        }

        if self.data.len() != self.grid_height as usize {
            return Err(format!(
                "expected {} rows, found {}",
                self.grid_height,
                self.data.len()
            ));
        }

        for (y, row) in self.data.iter().enumerate() {
            if row.len() != self.grid_width as usize {
                return Err(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.len(),
                    self.grid_width
                ));
            }
            if let Some((x, cell)) = row.iter().enumerate().find(|(_, c)| !is_acceptable_cell(c)) {
                return Err(format!("cell ({}, {}) is not a hex color: {:?}", x, y, cell));
            }
        }

        Ok(())
    }
}

/// Serialize `envelope` to `path`, creating missing parent directories
pub fn write_envelope(envelope: &GridEnvelope, path: &Path, pretty: bool) -> GridResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| GridError::io(parent, e))?;
    }

    let file = File::create(path).map_err(|e| GridError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    let result = if pretty {
        serde_json::to_writer_pretty(&mut writer, envelope)
    } else {
        serde_json::to_writer(&mut writer, envelope)
    };
    result.map_err(|e| GridError::io(path, e.into()))?;

    writer.flush().map_err(|e| GridError::io(path, e))
}

/// Read and validate a grid document
pub fn load_envelope(path: &Path) -> GridResult<GridEnvelope> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => GridError::NotFound {
            path: path.to_path_buf(),
        },
        _ => GridError::io(path, e),
    })?;

    let envelope: GridEnvelope = serde_json::from_str(&contents).map_err(|e| GridError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;

    envelope.validate().map_err(|reason| GridError::MalformedGrid {
        path: path.to_path_buf(),
        reason,
    })?;

    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempDir;

    fn sample() -> GridEnvelope {
        GridEnvelope::new(
            GridSize::new(2, 1).unwrap(),
            vec![vec!["#FF0000".to_string(), "#00FF00".to_string()]],
        )
    }

    #[test]
    fn test_timestamp_format() {
        let ts = utc_timestamp();
        // 2026-10-17T09:30:00.123+00:00
        assert_eq!(ts.len(), 29, "unexpected timestamp {}", ts);
        assert!(ts.ends_with("+00:00"));
        assert_eq!(&ts[19..20], ".");
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_key_order_and_names() {
        let json = serde_json::to_string(&sample()).unwrap();
        let ts = json.find("\"timestamp\"").unwrap();
        let version = json.find("\"version\":\"1.0\"").unwrap();
        let width = json.find("\"gridWidth\":2").unwrap();
        let height = json.find("\"gridHeight\":1").unwrap();
        let data = json.find("\"data\"").unwrap();
        assert!(ts < version && version < width && width < height && height < data);
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let tmp = TempDir::new("envelope-write");
        let path = tmp.path().join("nested/deeper/out.json");

        write_envelope(&sample(), &path, true).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\n  \"version\": \"1.0\""));
        let loaded = load_envelope(&path).unwrap();
        assert_eq!(loaded, sample_with_timestamp(&loaded.timestamp));
    }

    fn sample_with_timestamp(ts: &str) -> GridEnvelope {
        GridEnvelope {
            timestamp: ts.to_string(),
            ..sample()
        }
    }

    #[test]
    fn test_compact_output_has_no_newlines() {
        let tmp = TempDir::new("envelope-compact");
        let path = tmp.path().join("out.json");
        write_envelope(&sample(), &path, false).unwrap();
        assert!(!fs::read_to_string(&path).unwrap().contains('\n'));
    }

    #[test]
    fn test_load_keeps_unknown_keys() {
        let tmp = TempDir::new("envelope-extra");
        let path = tmp.path().join("grid.json");
        fs::write(
            &path,
            r##"{"timestamp":"t","version":"1.0","gridWidth":1,"gridHeight":1,"data":[[""]],"owner":"alice"}"##,
        )
        .unwrap();

        let loaded = load_envelope(&path).unwrap();
        assert_eq!(loaded.extra.get("owner").and_then(|v| v.as_str()), Some("alice"));
        assert!(serde_json::to_string(&loaded).unwrap().contains("\"owner\":\"alice\""));
    }

    #[test]
    fn test_load_rejects_bad_shape() {
        let tmp = TempDir::new("envelope-shape");
        let path = tmp.path().join("grid.json");
        fs::write(
            &path,
            r##"{"timestamp":"t","version":"1.0","gridWidth":2,"gridHeight":1,"data":[["#FFFFFF"]]}"##,
        )
        .unwrap();

        assert!(matches!(
            load_envelope(&path),
            Err(GridError::MalformedGrid { .. })
        ));
    }

    #[test]
    fn test_load_rejects_empty_grid() {
        let tmp = TempDir::new("envelope-empty");
        let path = tmp.path().join("grid.json");
        fs::write(
            &path,
            r#"{"timestamp":"t","version":"1.0","gridWidth":0,"gridHeight":0,"data":[]}"#,
        )
        .unwrap();

        assert!(matches!(
            load_envelope(&path),
            Err(GridError::MalformedGrid { .. })
        ));
    }

    #[test]
    fn test_load_rejects_bad_cell() {
        let tmp = TempDir::new("envelope-cell");
        let path = tmp.path().join("grid.json");
        fs::write(
            &path,
            r##"{"timestamp":"t","version":"1.0","gridWidth":1,"gridHeight":1,"data":[["blue"]]}"##,
        )
        .unwrap();

        assert!(matches!(
            load_envelope(&path),
            Err(GridError::MalformedGrid { .. })
        ));
    }

    #[test]
    fn test_load_missing_and_invalid_json() {
        let tmp = TempDir::new("envelope-missing");
        assert!(matches!(
            load_envelope(&tmp.path().join("nope.json")),
            Err(GridError::NotFound { .. })
        ));

        let path = tmp.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_envelope(&path), Err(GridError::Json { .. })));
    }
}
