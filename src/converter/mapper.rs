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

//! Module mapping a [`SourceRecord`] onto the wind JSON read by
//! the map visualisation.
//!
//! Lambert Conformal grids get the projection-aware layout:
//!
//! ```json
//! {
//!   "projection": { "type": "lambert-conformal", "lo1": 105.25, "la1": 14.02,
//!                   "lov": 120.0, "latin1": 10.0, "latin2": 40.0,
//!                   "dx": 3000.0, "dy": 3000.0, "date": "2025111400", "fcst": 84 },
//!   "nx": 1158, "ny": 673, "u": [...], "v": [...]
//! }
//! ```
//!
//! Every other grid gets the legacy flat layout with `dx`/`dy` in degrees:
//!
//! ```json
//! { "dx": 1.0, "dy": 1.0, "nx": 360, "ny": 181, "lo1": 0.0, "la1": 90.0,
//!   "date": "2025111400", "u": [...], "v": [...] }
//! ```
//!
//! Values taken from the structured dump may hold masked points.
//! Entries that are not numbers are kept in place and written as `null`.
//!
//! Mapping is a pure function of the record, it reads no clock and
//! no randomness, so mapping the same record twice gives the same JSON.

use crate::constants::{LAMBERT_CONFORMAL, MOMENTUM_CATEGORY, U_WIND_NUMBER, V_WIND_NUMBER};
use crate::converter::{
    diagnostics::Diagnostic,
    source::{SourceRecord, StructuredRecords, WindComponent},
};
use crate::Float;
use serde::Serialize;
use serde_json::Value;

/// Component values as written to the wind JSON, `None` is a masked point.
pub type WindValues = Vec<Option<Float>>;

/// Wind JSON in one of its two layouts.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(untagged)]
pub enum WindJsonOutput {
    Lambert(LambertWind),
    Legacy(LegacyWind),
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct LegacyWind {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dx: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dy: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nx: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ny: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lo1: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub la1: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub u: WindValues,
    pub v: WindValues,
}

impl LegacyWind {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        for (name, present) in [
            ("dx", self.dx.is_some()),
            ("dy", self.dy.is_some()),
            ("nx", self.nx.is_some()),
            ("ny", self.ny.is_some()),
            ("lo1", self.lo1.is_some()),
            ("la1", self.la1.is_some()),
            ("u", !self.u.is_empty()),
            ("v", !self.v.is_empty()),
        ] {
            if !present {
                missing.push(name);
            }
        }

        missing
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct LambertProjection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lo1: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub la1: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lov: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latin1: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latin2: Option<Float>,
    /// Grid spacing in metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dx: Option<Float>,
    /// Grid spacing in metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dy: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub fcst: u32,
}

impl LambertProjection {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        for (name, present) in [
            ("type", !self.kind.is_empty()),
            ("lo1", self.lo1.is_some()),
            ("la1", self.la1.is_some()),
            ("lov", self.lov.is_some()),
            ("latin1", self.latin1.is_some()),
            ("latin2", self.latin2.is_some()),
            ("dx", self.dx.is_some()),
            ("dy", self.dy.is_some()),
        ] {
            if !present {
                missing.push(name);
            }
        }

        missing
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct LambertWind {
    pub projection: LambertProjection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nx: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ny: Option<u32>,
    pub u: WindValues,
    pub v: WindValues,
}

impl LambertWind {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        for (name, present) in [
            ("nx", self.nx.is_some()),
            ("ny", self.ny.is_some()),
            ("u", !self.u.is_empty()),
            ("v", !self.v.is_empty()),
        ] {
            if !present {
                missing.push(name);
            }
        }

        missing
    }
}

/// Result of [`build_wind_json`].
#[derive(Clone, PartialEq, Debug)]
pub struct WindMapping {
    pub wind: WindJsonOutput,
    pub diagnostics: Vec<Diagnostic>,
}

impl WindMapping {
    /// Whether every required field was filled.
    pub fn is_complete(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_missing_fields)
    }
}

/// Builds the wind JSON matching the grid projection of `source`.
///
/// Missing required fields are reported in the returned diagnostics,
/// the incomplete output is still returned.
pub fn build_wind_json(source: &SourceRecord) -> WindMapping {
    let mut diagnostics = Vec::new();
    let (u, v) = resolve_components(source, &mut diagnostics);
    let grid = &source.grid;

    let wind = if grid.is_lambert() {
        let wind = LambertWind {
            projection: LambertProjection {
                kind: LAMBERT_CONFORMAL,
                lo1: grid.lo1,
                la1: grid.la1,
                lov: grid.lov,
                latin1: grid.latin1,
                latin2: grid.latin2,
                dx: grid.dx,
                dy: grid.dy,
                date: source.data_date.clone(),
                // the record may be hand-made, treat a missing hour as analysis
                fcst: source.forecast_hour.unwrap_or(0),
            },
            nx: grid.nx,
            ny: grid.ny,
            u,
            v,
        };

        let missing = wind.projection.missing_fields();
        if !missing.is_empty() {
            diagnostics.push(Diagnostic::MissingProjectionFields { fields: missing });
        }

        let missing = wind.missing_fields();
        if !missing.is_empty() {
            diagnostics.push(Diagnostic::MissingFields { fields: missing });
        }

        WindJsonOutput::Lambert(wind)
    } else {
        let wind = LegacyWind {
            dx: grid.dx,
            dy: grid.dy,
            nx: grid.nx,
            ny: grid.ny,
            lo1: grid.lo1,
            la1: grid.la1,
            date: source.data_date.clone(),
            u,
            v,
        };

        let missing = wind.missing_fields();
        if !missing.is_empty() {
            diagnostics.push(Diagnostic::MissingFields { fields: missing });
        }

        WindJsonOutput::Legacy(wind)
    };

    WindMapping { wind, diagnostics }
}

/// Picks the U and V arrays, preferring the extracted components
/// and filling an empty one from the structured dump.
fn resolve_components(
    source: &SourceRecord,
    diagnostics: &mut Vec<Diagnostic>,
) -> (WindValues, WindValues) {
    let mut u = present_values(&source.wind_components.u);
    let mut v = present_values(&source.wind_components.v);

    if u.is_empty() || v.is_empty() {
        let (dump_u, dump_v) = scan_structured_records(&source.structured_records);

        for (component, target, found) in [
            (WindComponent::U, &mut u, dump_u),
            (WindComponent::V, &mut v, dump_v),
        ] {
            if let Some(values) = found.filter(|values| !values.is_empty()) {
                if target.is_empty() {
                    *target = values;
                    diagnostics.push(Diagnostic::ComponentFromStructuredDump { component });
                }
            }
        }
    }

    (u, v)
}

/// Finds U and V arrays in the structured dump.
///
/// An array of records is scanned for the momentum category codes,
/// the last qualifying record wins. A plain object may carry `u`
/// and `v` arrays directly.
fn scan_structured_records(records: &StructuredRecords) -> (Option<WindValues>, Option<WindValues>) {
    match records {
        StructuredRecords::Dump(Value::Array(records)) => {
            let mut u = None;
            let mut v = None;

            for record in records {
                let category = record.get("parameterCategory").and_then(Value::as_i64);
                let number = record.get("parameterNumber").and_then(Value::as_i64);
                let values = match record.get("values").and_then(value_array) {
                    Some(values) => values,
                    None => continue,
                };

                match (category, number) {
                    (Some(MOMENTUM_CATEGORY), Some(U_WIND_NUMBER)) => u = Some(values),
                    (Some(MOMENTUM_CATEGORY), Some(V_WIND_NUMBER)) => v = Some(values),
                    _ => {}
                }
            }

            (u, v)
        }
        StructuredRecords::Dump(Value::Object(fields)) => (
            fields.get("u").and_then(value_array),
            fields.get("v").and_then(value_array),
        ),
        _ => (None, None),
    }
}

fn present_values(values: &[Float]) -> WindValues {
    values.iter().copied().map(Some).collect()
}

/// Reads a JSON array of values, entries that are not numbers become `None`.
fn value_array(value: &Value) -> Option<WindValues> {
    Some(value.as_array()?.iter().map(Value::as_f64).collect())
}

#[cfg(test)]
mod tests {
    use super::{build_wind_json, WindJsonOutput};
    use crate::converter::diagnostics::Diagnostic;
    use crate::converter::source::{
        GridDescriptor, InventoryFallback, ProjectionKind, SourceRecord, StructuredRecords,
        WindComponent, WindComponents,
    };
    use serde_json::json;

    fn lambert_record() -> SourceRecord {
        SourceRecord {
            grid: GridDescriptor {
                projection: Some(ProjectionKind::LambertConformal),
                nx: Some(2),
                ny: Some(1),
                la1: Some(14.02224),
                lo1: Some(105.25),
                lov: Some(120.0),
                latin1: Some(10.0),
                latin2: Some(40.0),
                dx: Some(3000.0),
                dy: Some(3000.0),
                lo2: Some(105.27),
                la2: Some(14.02224),
            },
            wind_components: WindComponents {
                u: vec![1.0, 2.0],
                v: vec![-1.0, -2.0],
            },
            data_date: Some("2025111400".to_string()),
            forecast_hour: Some(84),
            ..SourceRecord::default()
        }
    }

    fn lat_lon_record() -> SourceRecord {
        SourceRecord {
            grid: GridDescriptor {
                projection: Some(ProjectionKind::LatLon),
                nx: Some(2),
                ny: Some(1),
                la1: Some(90.0),
                la2: Some(90.0),
                lo1: Some(0.0),
                lo2: Some(1.0),
                dx: Some(1.0),
                dy: Some(1.0),
                ..GridDescriptor::default()
            },
            wind_components: WindComponents {
                u: vec![1.0, 2.0],
                v: vec![3.0, 4.0],
            },
            data_date: Some("2025111400".to_string()),
            forecast_hour: Some(6),
            ..SourceRecord::default()
        }
    }

    #[test]
    fn lambert_layout() {
        let mapping = build_wind_json(&lambert_record());
        let json = serde_json::to_value(&mapping.wind).unwrap();

        assert!(mapping.is_complete());
        assert!(mapping.diagnostics.is_empty());
        assert_eq!(
            json,
            json!({
                "projection": {
                    "type": "lambert-conformal",
                    "lo1": 105.25,
                    "la1": 14.02224,
                    "lov": 120.0,
                    "latin1": 10.0,
                    "latin2": 40.0,
                    "dx": 3000.0,
                    "dy": 3000.0,
                    "date": "2025111400",
                    "fcst": 84
                },
                "nx": 2,
                "ny": 1,
                "u": [1.0, 2.0],
                "v": [-1.0, -2.0]
            })
        );
    }

    #[test]
    fn legacy_layout() {
        let mapping = build_wind_json(&lat_lon_record());
        let json = serde_json::to_value(&mapping.wind).unwrap();

        assert!(mapping.is_complete());
        assert_eq!(
            json,
            json!({
                "dx": 1.0,
                "dy": 1.0,
                "nx": 2,
                "ny": 1,
                "lo1": 0.0,
                "la1": 90.0,
                "date": "2025111400",
                "u": [1.0, 2.0],
                "v": [3.0, 4.0]
            })
        );
    }

    #[test]
    fn unknown_projection_uses_legacy_layout() {
        let mut record = lat_lon_record();
        record.grid.projection = Some(ProjectionKind::Other("mercator".to_string()));
        let json = serde_json::to_value(&build_wind_json(&record).wind).unwrap();
        assert!(json.get("projection").is_none());
        assert!(json.get("dx").is_some());

        record.grid.projection = None;
        let json = serde_json::to_value(&build_wind_json(&record).wind).unwrap();
        assert!(json.get("projection").is_none());
        assert!(json.get("lo1").is_some());
    }

    #[test]
    fn lambert_layout_has_no_flat_geometry() {
        let json = serde_json::to_value(&build_wind_json(&lambert_record()).wind).unwrap();

        assert!(json.get("projection").is_some());
        assert!(json.get("dx").is_none());
        assert!(json.get("lo1").is_none());
        assert!(json.get("date").is_none());
    }

    #[test]
    fn missing_date_and_forecast_hour() {
        let mut record = lambert_record();
        record.data_date = None;
        record.forecast_hour = None;

        let json = serde_json::to_value(&build_wind_json(&record).wind).unwrap();
        assert!(json["projection"].get("date").is_none());
        assert_eq!(json["projection"]["fcst"], json!(0));

        let mut record = lat_lon_record();
        record.data_date = None;
        let json = serde_json::to_value(&build_wind_json(&record).wind).unwrap();
        assert!(json.get("date").is_none());
    }

    #[test]
    fn component_from_structured_records() {
        let mut record = lat_lon_record();
        record.wind_components.u.clear();
        record.structured_records = StructuredRecords::Dump(json!([
            {"parameterCategory": 2, "parameterNumber": 2, "values": [7.0, 8.0]},
            {"parameterCategory": 0, "parameterNumber": 0, "values": [273.0, 274.0]},
            {"parameterCategory": 2, "parameterNumber": 3, "values": [9.0, 9.5]},
        ]));

        let mapping = build_wind_json(&record);
        match &mapping.wind {
            WindJsonOutput::Legacy(wind) => {
                assert_eq!(wind.u, vec![Some(7.0), Some(8.0)]);
                // extracted components are preferred
                assert_eq!(wind.v, vec![Some(3.0), Some(4.0)]);
            }
            other => panic!("unexpected layout {:?}", other),
        }
        assert_eq!(
            mapping.diagnostics,
            vec![Diagnostic::ComponentFromStructuredDump {
                component: WindComponent::U
            }]
        );
    }

    #[test]
    fn last_structured_record_wins() {
        let mut record = lambert_record();
        record.wind_components = WindComponents::default();
        record.structured_records = StructuredRecords::Dump(json!([
            {"parameterCategory": 2, "parameterNumber": 2, "values": [1.0]},
            {"parameterCategory": 2, "parameterNumber": 2, "values": [2.0]},
            {"parameterCategory": 2, "parameterNumber": 3, "values": [3.0]},
            {"parameterCategory": 2, "parameterNumber": 3, "values": null},
        ]));

        match build_wind_json(&record).wind {
            WindJsonOutput::Lambert(wind) => {
                assert_eq!(wind.u, vec![Some(2.0)]);
                assert_eq!(wind.v, vec![Some(3.0)]);
            }
            other => panic!("unexpected layout {:?}", other),
        }
    }

    #[test]
    fn masked_structured_values_are_kept() {
        let mut record = lat_lon_record();
        record.wind_components.u.clear();
        record.structured_records = StructuredRecords::Dump(json!([
            {"parameterCategory": 2, "parameterNumber": 2, "values": [1.0, null, 2.0]},
        ]));

        let mapping = build_wind_json(&record);
        assert!(mapping.is_complete());

        let json = serde_json::to_value(&mapping.wind).unwrap();
        assert_eq!(json["u"], json!([1.0, null, 2.0]));
        assert_eq!(json["v"], json!([3.0, 4.0]));
    }

    #[test]
    fn components_from_plain_object() {
        let mut record = lat_lon_record();
        record.wind_components = WindComponents::default();
        record.structured_records = StructuredRecords::Dump(json!({"u": [1.5], "v": [2.5]}));

        match build_wind_json(&record).wind {
            WindJsonOutput::Legacy(wind) => {
                assert_eq!(wind.u, vec![Some(1.5)]);
                assert_eq!(wind.v, vec![Some(2.5)]);
            }
            other => panic!("unexpected layout {:?}", other),
        }
    }

    #[test]
    fn missing_fields_are_reported() {
        let mut record = lat_lon_record();
        record.grid.dx = None;
        record.wind_components = WindComponents::default();
        record.structured_records = StructuredRecords::Fallback(InventoryFallback {
            records: vec![],
            note: "structured dump unavailable".to_string(),
        });

        let mapping = build_wind_json(&record);
        assert!(!mapping.is_complete());
        assert_eq!(
            mapping.diagnostics,
            vec![Diagnostic::MissingFields {
                fields: vec!["dx", "u", "v"]
            }]
        );
    }

    #[test]
    fn missing_projection_fields_are_reported() {
        let mut record = lambert_record();
        record.grid.lov = None;
        record.grid.latin2 = None;
        record.grid.ny = None;

        let mapping = build_wind_json(&record);
        assert_eq!(
            mapping.diagnostics,
            vec![
                Diagnostic::MissingProjectionFields {
                    fields: vec!["lov", "latin2"]
                },
                Diagnostic::MissingFields { fields: vec!["ny"] },
            ]
        );
    }

    #[test]
    fn mapping_is_repeatable() {
        let record = lambert_record();

        let first = serde_json::to_string_pretty(&build_wind_json(&record).wind).unwrap();
        let second = serde_json::to_string_pretty(&build_wind_json(&record).wind).unwrap();

        assert_eq!(first, second);
    }
}
