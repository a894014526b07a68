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

//! GRIB2 Wind Converter (gribwind) turns GRIB2 forecast files
//! into the JSON wind-field format read by map-based wind
//! visualisation libraries.
//!
//! Decoding of the binary GRIB2 records is done by `wgrib2`,
//! which is invoked as a subprocess. This program parses the
//! text that `wgrib2` prints and reshapes it into either the legacy
//! lat-lon wind JSON or the Lambert Conformal wind JSON.

mod constants;
mod converter;
mod errors;

use env_logger::Env;
use log::{error, info};
use std::process;

type Float = f64;

/// The main program function.
/// Prepares the logger and calls the [`converter::main`].
///
/// The logger is initiated before anything else so that
/// errors from argument and configuration handling are
/// also reported in the same format.
fn main() {
    #[cfg(not(feature = "debug"))]
    let logger_env = Env::new().filter_or("GRIBWIND_LOG_LEVEL", "info");

    #[cfg(feature = "debug")]
    let logger_env = Env::new().filter_or("GRIBWIND_LOG_LEVEL", "debug");

    env_logger::Builder::from_env(logger_env)
        .format_timestamp_millis()
        .init();

    match converter::main() {
        Ok(_) => info!("Conversion finished. Check the output directory."),
        Err(err) => {
            error!("Conversion failed with error: {}", err);
            process::exit(1);
        }
    }
}
