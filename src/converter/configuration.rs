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

//! Module responsible for parsing and checking the configuration file.
//!
//! The configuration file uses [YAML](https://en.wikipedia.org/wiki/YAML)
//! and `serde` to enforce strong typing and automatic type checking.
//! All sections are optional, so a file with only the sections of interest,
//! or no file at all, gives a working setup as long as `wgrib2` is on `PATH`.
//!
//! ```yaml
//! tool:
//!   program: /opt/wgrib2/bin/wgrib2
//! output:
//!   directory: ./output
//! download:
//!   url_template: https://example.org/wrf/M-A0064-${fff}.grb2
//!   directory: ./data
//! ```

use crate::constants::{DEFAULT_DECODER, FORECAST_HOUR_PLACEHOLDER};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Configuration file read when none is given explicitly.
pub const DEFAULT_CONFIG_FILE: &str = "gribwind.yaml";

/// _(Optional)_ Fields describing the external decoder.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default)]
pub struct Tool {
    /// Decoder program name, looked up on `PATH`, or a path to it.
    ///
    /// Defaults to `wgrib2`.
    pub program: String,
}

impl Default for Tool {
    fn default() -> Self {
        Tool {
            program: DEFAULT_DECODER.to_string(),
        }
    }
}

/// _(Optional)_ Fields describing where and how artifacts are written.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default)]
pub struct Output {
    /// Directory for the source and wind JSON files.
    /// Created when missing. Defaults to the working directory.
    pub directory: PathBuf,

    /// Wind JSON name used when the data date is unknown.
    pub fallback_wind_name: String,

    /// Source JSON name used when the data date is unknown.
    pub fallback_source_name: String,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            directory: PathBuf::from("."),
            fallback_wind_name: "wind.json".to_string(),
            fallback_source_name: "source.json".to_string(),
        }
    }
}

/// _(Optional)_ Fields describing the remote source of forecast files.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Download {
    /// URL of one forecast file with `${fff}` in place of
    /// the zero-padded three-digit forecast hour.
    pub url_template: String,

    /// First forecast hour to fetch. Defaults to `0`.
    #[serde(default)]
    pub first_hour: u32,

    /// Last forecast hour to fetch. Defaults to `84`.
    #[serde(default = "Download::default_last_hour")]
    pub last_hour: u32,

    /// Step between forecast hours. Defaults to `6`.
    #[serde(default = "Download::default_step")]
    pub step: u32,

    /// Directory where the files are saved. Defaults to `./data`.
    #[serde(default = "Download::default_directory")]
    pub directory: PathBuf,

    /// Timeout of a single request in seconds. Defaults to `300`.
    #[serde(default = "Download::default_timeout")]
    pub timeout_secs: u64,
}

impl Download {
    fn default_last_hour() -> u32 {
        84
    }

    fn default_step() -> u32 {
        6
    }

    fn default_directory() -> PathBuf {
        PathBuf::from("./data")
    }

    fn default_timeout() -> u64 {
        300
    }

    /// Checks if the download settings are usable.
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if !self.url_template.contains(FORECAST_HOUR_PLACEHOLDER) {
            return Err(ConfigError::OutOfBounds(
                "Download URL template must contain ${fff}",
            ));
        }

        if self.step < 1 {
            return Err(ConfigError::OutOfBounds(
                "Forecast hour step cannot be less than 1",
            ));
        }

        if self.last_hour < self.first_hour {
            return Err(ConfigError::OutOfBounds(
                "Last forecast hour cannot be before the first one",
            ));
        }

        if self.last_hour > 999 {
            return Err(ConfigError::OutOfBounds(
                "Forecast hour must fit in three digits",
            ));
        }

        if self.timeout_secs < 1 {
            return Err(ConfigError::OutOfBounds(
                "Download timeout cannot be less than 1 s",
            ));
        }

        Ok(())
    }
}

/// Main config structure representing the fields in
/// configuration file.
#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tool: Tool,

    #[serde(default)]
    pub output: Output,

    #[serde(default)]
    pub download: Option<Download>,
}

impl Config {
    /// Config structure constructor, responsible for
    /// deserializing configuration and checking it.
    pub fn new_from_file(file_path: &Path) -> Result<Config, ConfigError> {
        let data = fs::read(file_path)?;
        let config: Config = serde_yaml::from_slice(data.as_slice())?;

        config.check_bounds()?;

        Ok(config)
    }

    /// Reads the given file, or the default file when it exists,
    /// or falls back to built-in defaults.
    pub fn load(file_path: Option<&Path>) -> Result<Config, ConfigError> {
        match file_path {
            Some(file_path) => Config::new_from_file(file_path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Config::new_from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Config::default()),
        }
    }

    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if self.tool.program.trim().is_empty() {
            return Err(ConfigError::OutOfBounds("Decoder program cannot be empty"));
        }

        if self.output.fallback_wind_name.trim().is_empty()
            || self.output.fallback_source_name.trim().is_empty()
        {
            return Err(ConfigError::OutOfBounds(
                "Fallback output names cannot be empty",
            ));
        }

        if let Some(download) = &self.download {
            download.check_bounds()?;
        }

        Ok(())
    }
}
