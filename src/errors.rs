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

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConverterError {
    #[error("Error while reading configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Error while extracting GRIB2 data: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Error while writing output: {0}")]
    Output(#[from] OutputError),

    #[error("Error while downloading forecast files: {0}")]
    Download(#[from] DownloadError),

    #[error("Input file does not exist: {0}")]
    MissingInput(PathBuf),

    #[error("Download section is missing in the configuration")]
    NoDownloadConfig,

    #[error("{failed} of {total} files failed to convert")]
    BatchFailed { failed: usize, total: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot open configuration file: {0}")]
    CantOpenFile(#[from] std::io::Error),

    #[error("Cannot deserialize configuration file: {0}")]
    CantDeserialize(#[from] serde_yaml::Error),

    #[error("Configuration component is out of bounds {0}")]
    OutOfBounds(&'static str),
}

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{program} was not found on PATH.\n{hint}")]
    NotFound { program: String, hint: &'static str },

    #[error("Cannot start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} {args} exited with {status}: {stderr}")]
    Failed {
        program: String,
        args: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("{program} {args} printed output that is not UTF-8")]
    NotUtf8 { program: String, args: String },
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Decoder is not available: {0}")]
    DecoderMissing(#[source] ToolError),

    #[error("Cannot get grid description: {0}")]
    GridDescription(#[source] ToolError),

    #[error("Cannot list records: {0}")]
    Inventory(#[source] ToolError),
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot serialize JSON for {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded with status {0}")]
    Status(reqwest::StatusCode),

    #[error("Server sent an empty file")]
    EmptyBody,

    #[error("Cannot save downloaded file: {0}")]
    Io(#[from] std::io::Error),
}
