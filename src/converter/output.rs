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

//! Naming and writing of the JSON artifacts.

use crate::converter::source::SourceRecord;
use crate::errors::OutputError;
use log::debug;
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Builds `<prefix>-<YYYYMMDDHH>-<fff>.json`, or returns
/// `fallback` when the data date is unknown.
pub fn artifact_name(
    prefix: &str,
    data_date: Option<&str>,
    forecast_hour: Option<u32>,
    fallback: &str,
) -> String {
    match data_date {
        Some(date) => format!("{}-{}-{:03}.json", prefix, date, forecast_hour.unwrap_or(0)),
        None => fallback.to_string(),
    }
}

/// Name of the wind JSON written for `record`.
pub fn wind_file_name(record: &SourceRecord, fallback: &str) -> String {
    artifact_name(
        "wind",
        record.data_date.as_deref(),
        record.forecast_hour,
        fallback,
    )
}

/// Name of the source JSON written for `record`.
pub fn source_file_name(record: &SourceRecord, fallback: &str) -> String {
    artifact_name(
        "source",
        record.data_date.as_deref(),
        record.forecast_hour,
        fallback,
    )
}

/// Creates the output directory when it does not exist yet.
pub fn prepare_output_dir(out_path: &Path) -> Result<(), OutputError> {
    if out_path.is_dir() {
        debug!("Output directory {} exists", out_path.display());
        return Ok(());
    }

    debug!("Output directory does not exist so creating a new one");
    fs::create_dir_all(out_path).map_err(|source| OutputError::Io {
        path: out_path.to_path_buf(),
        source,
    })
}

/// Writes `value` as pretty-printed UTF-8 JSON.
pub fn write_json<T: Serialize>(out_path: &Path, value: &T) -> Result<(), OutputError> {
    let io_error = |source| OutputError::Io {
        path: out_path.to_path_buf(),
        source,
    };

    let out_file = File::create(out_path).map_err(io_error)?;
    let mut writer = BufWriter::new(out_file);

    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| OutputError::Json {
        path: out_path.to_path_buf(),
        source,
    })?;

    writer.flush().map_err(io_error)
}

/// Reads a previously saved source JSON.
pub fn read_source(in_path: &Path) -> Result<SourceRecord, OutputError> {
    let in_file = File::open(in_path).map_err(|source| OutputError::Io {
        path: in_path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(in_file)).map_err(|source| OutputError::Json {
        path: in_path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{artifact_name, read_source, source_file_name, wind_file_name, write_json};
    use crate::converter::source::SourceRecord;

    #[test]
    fn names_with_date() {
        let record = SourceRecord {
            data_date: Some("2025111400".to_string()),
            forecast_hour: Some(6),
            ..SourceRecord::default()
        };

        assert_eq!(wind_file_name(&record, "wind.json"), "wind-2025111400-006.json");
        assert_eq!(source_file_name(&record, "source.json"), "source-2025111400-006.json");
    }

    #[test]
    fn names_without_date() {
        assert_eq!(artifact_name("wind", None, Some(84), "wind.json"), "wind.json");
        assert_eq!(
            artifact_name("wind", Some("2025111400"), None, "wind.json"),
            "wind-2025111400-000.json"
        );
        assert_eq!(
            artifact_name("wind", Some("2025111400"), Some(120), "wind.json"),
            "wind-2025111400-120.json"
        );
    }

    #[test]
    fn source_json_survives_saving() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.json");
        let record = SourceRecord {
            data_date: Some("2025111400".to_string()),
            forecast_hour: Some(12),
            ..SourceRecord::default()
        };

        write_json(&path, &record).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        assert!(text.contains("\n  \"dataDate\": \"2025111400\""));
        assert_eq!(read_source(&path).unwrap(), record);
    }
}
