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

//! Module responsible for pulling grid geometry, record inventory
//! and wind component values out of one GRIB2 file.
//!
//! Every step is a separate decoder invocation. Failing to describe the
//! grid or to list the records aborts the file, everything that follows
//! degrades into [`Diagnostic`]s and partial data.

mod grid;
mod inventory;
mod values;

use crate::constants::STRUCTURED_DUMP_NOTE;
use crate::converter::{
    decoder::GribDecoder,
    diagnostics::Diagnostic,
    source::{
        GridDescriptor, InventoryFallback, Metadata, SourceRecord, StructuredRecords,
        WindComponent, WindComponents,
    },
};
use crate::{errors::ExtractionError, Float};
use chrono::Utc;
use log::{debug, info};
use std::{fs, path::Path};

/// Result of [`parse_grib2`], the extracted data with everything
/// that went wrong along the way without stopping it.
#[derive(Clone, PartialEq, Debug)]
pub struct Extraction {
    pub record: SourceRecord,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extracts everything needed for the wind JSON from one GRIB2 file.
pub fn parse_grib2(decoder: &dyn GribDecoder, file: &Path) -> Result<Extraction, ExtractionError> {
    decoder
        .check_available()
        .map_err(ExtractionError::DecoderMissing)?;

    info!("Parsing {} with {}", file.display(), decoder.name());
    let mut diagnostics = Vec::new();

    debug!("Reading grid description");
    let (grid_info_raw, grid) = describe_grid(decoder, file)?;
    debug!("Grid: {:?}", grid);

    debug!("Listing records");
    let record_inventory = list_records(decoder, file)?;
    info!("Found {} records", record_inventory.len());

    let structured_records = structured_records(decoder, file, &record_inventory, &mut diagnostics);

    debug!("Extracting wind components");
    let wind_components =
        extract_wind_components(decoder, file, &record_inventory, &mut diagnostics);

    let data_date = inventory::data_date(&record_inventory);
    let forecast_hour = inventory::forecast_hour(&record_inventory);

    let metadata = Metadata {
        parsed_at: Utc::now(),
        parser: decoder.name().to_string(),
        total_records: record_inventory.len(),
    };

    Ok(Extraction {
        record: SourceRecord {
            file: file.to_path_buf(),
            grid,
            grid_info_raw,
            record_inventory,
            structured_records,
            wind_components,
            data_date,
            forecast_hour: Some(forecast_hour),
            metadata,
        },
        diagnostics,
    })
}

/// Returns the raw grid description together with its parsed form.
pub fn describe_grid(
    decoder: &dyn GribDecoder,
    file: &Path,
) -> Result<(String, GridDescriptor), ExtractionError> {
    let raw = decoder
        .describe_grid(file)
        .map_err(ExtractionError::GridDescription)?;
    let grid = grid::parse_grid_description(&raw);

    Ok((raw, grid))
}

/// Lists inventory lines in decoder order.
pub fn list_records(decoder: &dyn GribDecoder, file: &Path) -> Result<Vec<String>, ExtractionError> {
    let listing = decoder
        .list_inventory(file)
        .map_err(ExtractionError::Inventory)?;

    Ok(inventory::split_lines(&listing))
}

/// Reads values of both wind components.
///
/// A component that cannot be located or read stays empty
/// and the reason is added to `diagnostics`.
pub fn extract_wind_components(
    decoder: &dyn GribDecoder,
    file: &Path,
    record_inventory: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) -> WindComponents {
    WindComponents {
        u: extract_component(decoder, file, record_inventory, WindComponent::U, diagnostics),
        v: extract_component(decoder, file, record_inventory, WindComponent::V, diagnostics),
    }
}

fn extract_component(
    decoder: &dyn GribDecoder,
    file: &Path,
    record_inventory: &[String],
    component: WindComponent,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Float> {
    let (record, line) = match inventory::find_component_record(record_inventory, component) {
        Some(found) => found,
        None => {
            diagnostics.push(Diagnostic::ComponentNotFound { component });
            return Vec::new();
        }
    };
    info!("Found {} component record: {}", component, line);

    let values = match read_csv_values(decoder, file, record) {
        Ok(values) => values,
        Err(csv_reason) => {
            debug!(
                "CSV listing of record {} failed ({}), trying text dump",
                record, csv_reason
            );

            match read_text_dump(decoder, file, record, component) {
                Ok(values) => {
                    diagnostics.push(Diagnostic::CsvFallbackUsed {
                        component,
                        record,
                        reason: csv_reason,
                    });
                    values
                }
                Err(reason) => {
                    diagnostics.push(Diagnostic::ComponentExtractionFailed {
                        component,
                        record,
                        reason,
                    });
                    Vec::new()
                }
            }
        }
    };

    info!(
        "{} component record {} has {} data points",
        component,
        record,
        values.len()
    );

    values
}

fn read_csv_values(decoder: &dyn GribDecoder, file: &Path, record: u32) -> Result<Vec<Float>, String> {
    let text = decoder
        .record_csv(file, record)
        .map_err(|err| err.to_string())?;

    let values = values::parse_csv_values(&text);

    if values.is_empty() {
        return Err("CSV listing contains no values".to_string());
    }

    Ok(values)
}

/// Dumps the record into a temporary file and parses it.
///
/// The file is removed afterwards whatever the outcome,
/// a failed removal is only logged.
fn read_text_dump(
    decoder: &dyn GribDecoder,
    file: &Path,
    record: u32,
    component: WindComponent,
) -> Result<Vec<Float>, String> {
    let dump_file = tempfile::Builder::new()
        .prefix(&format!("wgrib2_{}_", component.tag()))
        .suffix(".txt")
        .tempfile()
        .map_err(|err| format!("cannot create temporary file: {}", err))?;

    let text = decoder
        .record_text(file, record, dump_file.path())
        .map_err(|err| err.to_string())
        .and_then(|_| {
            fs::read_to_string(dump_file.path())
                .map_err(|err| format!("cannot read text dump: {}", err))
        });

    let dump_path = dump_file.path().to_path_buf();
    if let Err(err) = dump_file.close() {
        debug!("Cannot remove {}: {}", dump_path.display(), err);
    }

    let values = values::parse_text_dump(&text?);

    if values.is_empty() {
        return Err("text dump contains no values".to_string());
    }

    Ok(values)
}

/// Structured dump of all records, or the inventory when
/// the decoder cannot produce one.
fn structured_records(
    decoder: &dyn GribDecoder,
    file: &Path,
    record_inventory: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) -> StructuredRecords {
    let dump = decoder
        .dump_json(file)
        .map_err(|err| err.to_string())
        .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).map_err(|err| err.to_string()));

    match dump {
        Ok(dump) => {
            info!("Structured dump parsed");
            StructuredRecords::Dump(dump)
        }
        Err(reason) => {
            diagnostics.push(Diagnostic::StructuredDumpUnavailable { reason });
            StructuredRecords::Fallback(InventoryFallback {
                records: record_inventory.to_vec(),
                note: STRUCTURED_DUMP_NOTE.to_string(),
            })
        }
    }
}
