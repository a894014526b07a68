/*
Copyright 2021 Jakub Lewandowski

This file is part of GRIB2 Wind Converter (gribwind).

GRIB2 Wind Converter (gribwind) is a free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation; either version 3 of the License, or
(at your option) any later version.

GRIB2 Wind Converter (gribwind) is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with GRIB2 Wind Converter (gribwind). If not, see https://www.gnu.org/licenses/.
*/

//! Data extracted from one GRIB2 file, kept in the shape in which
//! it is saved as the source JSON.
//!
//! Everything here is recomputed from the input file on each run,
//! the source JSON is only a diagnostic artifact that can be fed back
//! to the wind mapper.

use crate::constants::{LAMBERT_CONFORMAL, LAT_LON};
use crate::Float;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, time::UNIX_EPOCH};

/// Projection tag of a grid.
///
/// Tags that the converter does not know are kept verbatim
/// so that hand-edited source files survive a round trip.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProjectionKind {
    LatLon,
    LambertConformal,
    Other(String),
}

impl From<String> for ProjectionKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            LAT_LON => ProjectionKind::LatLon,
            LAMBERT_CONFORMAL => ProjectionKind::LambertConformal,
            _ => ProjectionKind::Other(tag),
        }
    }
}

impl From<ProjectionKind> for String {
    fn from(kind: ProjectionKind) -> Self {
        match kind {
            ProjectionKind::LatLon => LAT_LON.to_string(),
            ProjectionKind::LambertConformal => LAMBERT_CONFORMAL.to_string(),
            ProjectionKind::Other(tag) => tag,
        }
    }
}

/// Grid geometry read from the decoder's grid description.
///
/// Every field is matched independently, so a partially filled
/// descriptor is a valid result. When no known grid header was found
/// `projection` stays `None`.
///
/// For lat-lon grids `dx` and `dy` are in degrees. For Lambert Conformal
/// grids they are in metres and `lo2`/`la2` are a rough display-only
/// estimate of the far corner.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<ProjectionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nx: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ny: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub la1: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub la2: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lo1: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lo2: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dx: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dy: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lov: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latin1: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latin2: Option<Float>,
}

impl GridDescriptor {
    pub fn is_lambert(&self) -> bool {
        self.projection == Some(ProjectionKind::LambertConformal)
    }
}

/// Inventory kept in place of the structured dump
/// when the decoder cannot produce one.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryFallback {
    pub records: Vec<String>,
    pub note: String,
}

/// Output of the decoder's structured dump mode.
///
/// The dump schema belongs to the decoder, so it is kept as
/// an opaque JSON value.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructuredRecords {
    Fallback(InventoryFallback),
    Dump(serde_json::Value),
}

impl Default for StructuredRecords {
    fn default() -> Self {
        StructuredRecords::Dump(serde_json::Value::Null)
    }
}

/// The two horizontal wind components.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum WindComponent {
    U,
    V,
}

impl WindComponent {
    /// Parameter token of the component in inventory lines.
    pub fn marker(self) -> &'static str {
        match self {
            WindComponent::U => ":UGRD:",
            WindComponent::V => ":VGRD:",
        }
    }

    /// Lowercase tag used in file names.
    pub fn tag(self) -> &'static str {
        match self {
            WindComponent::U => "u",
            WindComponent::V => "v",
        }
    }
}

impl fmt::Display for WindComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindComponent::U => write!(f, "U"),
            WindComponent::V => write!(f, "V"),
        }
    }
}

/// Sampled values of both wind components, in decoder order.
/// A component that could not be extracted is left empty.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WindComponents {
    pub u: Vec<Float>,
    pub v: Vec<Float>,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub parsed_at: DateTime<Utc>,
    pub parser: String,
    pub total_records: usize,
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata {
            parsed_at: UNIX_EPOCH.into(),
            parser: String::new(),
            total_records: 0,
        }
    }
}

/// Everything extracted from one GRIB2 file.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceRecord {
    pub file: PathBuf,
    pub grid: GridDescriptor,
    pub grid_info_raw: String,
    pub record_inventory: Vec<String>,
    pub structured_records: StructuredRecords,
    pub wind_components: WindComponents,
    /// Model run date as `YYYYMMDDHH`.
    pub data_date: Option<String>,
    pub forecast_hour: Option<u32>,
    pub metadata: Metadata,
}
