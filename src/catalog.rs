//! Company catalog: the fixed set of plotted points, loaded once from CSV.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use bevy::prelude::*;

use crate::geo::GeoPoint;

// =============================================================================
// Records and components
// =============================================================================

/// One row of the source dataset. An empty or unparsable `Average_Rating`
/// cell means the company is unrated, not a bad row.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompanyRecord {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Average_Rating", deserialize_with = "lenient_rating")]
    pub average_rating: Option<f64>,
}

/// Read the rating cell as text and keep whatever parses as a number. Only
/// the identity and position columns can fail a row.
fn lenient_rating<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let cell: String = serde::Deserialize::deserialize(deserializer)?;
    Ok(cell.trim().parse::<f64>().ok())
}

/// Immutable company data attached to each plotted entity.
#[derive(Component, Debug, Clone)]
pub struct Company {
    pub id: u32,
    pub name: String,
    pub position: GeoPoint,
    pub average_rating: Option<f64>,
}

impl Company {
    pub fn from_record(record: CompanyRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            position: GeoPoint::new(record.longitude, record.latitude),
            average_rating: record.average_rating,
        }
    }

    /// Rating text as shown in the tooltip, one decimal like the source data.
    pub fn rating_label(&self) -> String {
        match self.average_rating {
            Some(rating) => format!("{:.1}", rating),
            None => "N/A".to_string(),
        }
    }
}

/// Derived filter membership. Recomputed, never persisted.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InFilter(pub bool);

// =============================================================================
// Loading
// =============================================================================

/// Result of loading the catalog: parsed rows plus the count of rows that
/// failed to parse and were skipped.
#[derive(Debug, Default)]
pub struct CatalogLoad {
    pub companies: Vec<CompanyRecord>,
    pub skipped_rows: usize,
}

/// Read the catalog CSV from disk. Individual malformed rows are skipped and
/// counted rather than failing the whole load.
pub fn load_catalog(path: &Path) -> Result<CatalogLoad> {
    let file =
        File::open(path).with_context(|| format!("opening catalog {}", path.display()))?;
    Ok(read_catalog(file))
}

pub fn read_catalog<R: Read>(reader: R) -> CatalogLoad {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut load = CatalogLoad::default();

    for row in csv_reader.deserialize::<CompanyRecord>() {
        match row {
            Ok(record) => load.companies.push(record),
            Err(_) => load.skipped_rows += 1,
        }
    }

    load
}

// =============================================================================
// Tests
// =============================================================================
