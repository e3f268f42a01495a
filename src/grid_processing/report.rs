use prettytable::{format, Cell, Row, Table};
use std::path::Path;

use super::batch::BatchResult;
use crate::utils::format_duration;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Summary table for a batch run
pub fn build_report_table(results: &[BatchResult]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);

    table.add_row(Row::new(vec![
        Cell::new("Input"),
        Cell::new("Output"),
        Cell::new("Source"),
        Cell::new("Grid"),
        Cell::new("Time"),
        Cell::new("Status"),
    ]));

    for entry in results {
        let row = match &entry.result {
            Ok(outcome) => vec![
                Cell::new(&file_name(&entry.job.source)),
                Cell::new(&file_name(&entry.job.destination)),
                Cell::new(&format!(
                    "{}x{}",
                    outcome.source_dimensions.0, outcome.source_dimensions.1
                )),
                Cell::new(&format!("{}x{}", outcome.grid_width, outcome.grid_height)),
                Cell::new(&format_duration(outcome.elapsed)),
                Cell::new("ok"),
            ],
            Err(e) => vec![
                Cell::new(&file_name(&entry.job.source)),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new(&format!("failed: {}", e)),
            ],
        };
        table.add_row(Row::new(row));
    }

    table
}

pub fn print_report(results: &[BatchResult]) {
    if results.is_empty() {
        return;
    }
    println!("CONVERSION REPORT ({} files)\n", results.len());
    build_report_table(results).printstd();
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use crate::grid_processing::batch::BatchJob;
    use crate::grid_processing::ConversionOutcome;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_report_rows() {
        let ok = BatchResult {
            job: BatchJob {
                source: PathBuf::from("/in/a.png"),
                destination: PathBuf::from("/out/a_grid.json"),
            },
            result: Ok(ConversionOutcome {
                source: PathBuf::from("/in/a.png"),
                destination: PathBuf::from("/out/a_grid.json"),
                source_dimensions: (640, 480),
                grid_width: 32,
                grid_height: 24,
                elapsed: Duration::from_millis(12),
            }),
        };
        let failed = BatchResult {
            job: BatchJob {
                source: PathBuf::from("/in/b.png"),
                destination: PathBuf::from("/out/b_grid.json"),
            },
            result: Err(GridError::NotFound {
                path: PathBuf::from("/in/b.png"),
            }),
        };

        let table = build_report_table(&[ok, failed]);
        assert_eq!(table.len(), 3);

        let rendered = table.to_string();
        assert!(rendered.contains("a_grid.json"));
        assert!(rendered.contains("640x480"));
        assert!(rendered.contains("32x24"));
        assert!(rendered.contains("12ms"));
        assert!(rendered.contains("failed: source image not found"));
    }
}
