//! Placement manifest: a JSON record of where every source page ended up.

use serde::Serialize;

use crate::error::GridError;
use crate::layout::Placement;
use crate::pipeline::LabeledUnit;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ManifestEntry {
    pub label: String,
    pub source_page: usize,
    pub page: usize,
    pub row: u32,
    pub col: u32,
    pub x: f64,
    pub y: f64,
}

pub fn entries(units: &[LabeledUnit], placements: &[Placement]) -> Vec<ManifestEntry> {
    placements
        .iter()
        .map(|p| {
            let unit = &units[p.index];
            ManifestEntry {
                label: unit.label.clone(),
                source_page: unit.source_page,
                page: p.page,
                row: p.row,
                col: p.col,
                x: p.x,
                y: p.y,
            }
        })
        .collect()
}

pub fn to_json(units: &[LabeledUnit], placements: &[Placement]) -> Result<String, GridError> {
    Ok(serde_json::to_string_pretty(&entries(units, placements))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::layout::layout;
    use image::DynamicImage;

    #[test]
    fn test_manifest_lists_units_in_grid_order() {
        let units = vec![
            LabeledUnit {
                image: DynamicImage::new_rgb8(1, 1),
                label: "Apple".to_string(),
                source_page: 3,
            },
            LabeledUnit {
                image: DynamicImage::new_rgb8(1, 1),
                label: "Banana".to_string(),
                source_page: 0,
            },
        ];
        let placements = layout(units.len(), &GridConfig::default());
        let json = to_json(&units, &placements).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed[0]["label"], "Apple");
        assert_eq!(parsed[0]["source_page"], 3);
        assert_eq!(parsed[1]["x"], 220.0);
        assert_eq!(parsed[1]["page"], 0);
    }
}
