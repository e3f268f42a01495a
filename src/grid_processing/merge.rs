//! Layer several grid documents into one.
//!
//! The last grid is the base layer. Earlier grids are painted over it in
//! reverse order, so the first grid has the highest priority. Only cells that
//! carry a color count: empty strings and plain white are treated as
//! "nothing painted here".

use super::envelope::{utc_timestamp, GridEnvelope};
use crate::error::{GridError, GridResult};

/// Default output name when merging from the command line
pub const DEFAULT_MERGE_OUTPUT: &str = "merged-grid.json";

/// Cells that never override a lower layer. White matches in any letter case.
pub fn is_default_cell(cell: &str) -> bool {
    cell.is_empty() || cell.eq_ignore_ascii_case("#FFFFFF")
}

pub fn merge_grids(grids: &[GridEnvelope]) -> GridResult<GridEnvelope> {
    let (base, layers) = match grids.split_last() {
        Some((base, layers)) if !layers.is_empty() => (base, layers),
        _ => return Err(GridError::NotEnoughGrids),
    };

    for layer in layers {
        if layer.dimensions() != base.dimensions() {
            return Err(GridError::DimensionMismatch {
                expected_width: base.grid_width,
                expected_height: base.grid_height,
                width: layer.grid_width,
                height: layer.grid_height,
            });
        }
    }

    let mut merged = base.clone();
    for layer in layers.iter().rev() {
        for (merged_row, layer_row) in merged.data.iter_mut().zip(&layer.data) {
            for (merged_cell, cell) in merged_row.iter_mut().zip(layer_row) {
                if !is_default_cell(cell) {
                    merged_cell.clone_from(cell);
                }
            }
        }
    }

    merged.timestamp = utc_timestamp();
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid_processing::GridSize;

    fn grid(rows: &[&[&str]]) -> GridEnvelope {
        let data: Vec<Vec<String>> = rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
        let size = GridSize::new(data[0].len() as i64, data.len() as i64).unwrap();
        GridEnvelope::new(size, data)
    }

    #[test]
    fn test_earlier_grids_win_on_painted_cells() {
        let top = grid(&[&["#FF0000", ""], &["#FFFFFF", "#00FF00"]]);
        let middle = grid(&[&["#0000FF", "#0000FF"], &["", ""]]);
        let base = grid(&[&["#111111", "#222222"], &["#333333", "#444444"]]);

        let merged = merge_grids(&[top, middle, base]).unwrap();
        assert_eq!(
            merged.data,
            vec![
                vec!["#FF0000".to_string(), "#0000FF".to_string()],
                vec!["#333333".to_string(), "#00FF00".to_string()],
            ]
        );
    }

    #[test]
    fn test_keeps_base_metadata() {
        let layer = grid(&[&["#ABCDEF"]]);
        let mut base = grid(&[&[""]]);
        base.version = "0.9".to_string();
        base.extra
            .insert("source".to_string(), serde_json::Value::from("base"));

        let merged = merge_grids(&[layer, base]).unwrap();
        assert_eq!(merged.version, "0.9");
        assert_eq!(merged.extra["source"], "base");
        assert_eq!(merged.data, vec![vec!["#ABCDEF".to_string()]]);
    }

    #[test]
    fn test_requires_two_grids() {
        assert!(matches!(merge_grids(&[]), Err(GridError::NotEnoughGrids)));
        assert!(matches!(
            merge_grids(&[grid(&[&["#000000"]])]),
            Err(GridError::NotEnoughGrids)
        ));
    }

    #[test]
    fn test_rejects_mismatched_sizes() {
        let small = grid(&[&["#000000"]]);
        let wide = grid(&[&["#000000", "#000000"]]);
        assert!(matches!(
            merge_grids(&[small, wide]),
            Err(GridError::DimensionMismatch {
                expected_width: 2,
                width: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_lowercase_white_does_not_override() {
        let top = grid(&[&["#ffffff", "#fFfFfF"]]);
        let base = grid(&[&["#123456", "#654321"]]);

        let merged = merge_grids(&[top, base]).unwrap();
        assert_eq!(
            merged.data,
            vec![vec!["#123456".to_string(), "#654321".to_string()]]
        );
    }

    #[test]
    fn test_default_cells() {
        assert!(is_default_cell(""));
        assert!(is_default_cell("#FFFFFF"));
        assert!(is_default_cell("#ffffff"));
        assert!(!is_default_cell("#FFFFFE"));
    }
}
