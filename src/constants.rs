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

//! Module containing constants used by the converter.

use crate::Float;

/// Name of the external decoder program looked up on `PATH`
/// when nothing else is configured.
pub const DEFAULT_DECODER: &str = "wgrib2";

/// Installation hints shown when the decoder cannot be found.
pub const DECODER_INSTALL_HINT: &str = "Install wgrib2 first:
  macOS: brew install wgrib2
  Linux: apt-get install wgrib2 or yum install wgrib2
  Windows: download from https://www.cpc.ncep.noaa.gov/products/wesley/wgrib2/";

/// Metres per degree used to estimate the display extent of
/// Lambert Conformal grids. Flat-earth approximation, not geodetic.
pub const METERS_PER_DEGREE: Float = 111_000.0;

/// Grid projection tag of regular latitude-longitude grids.
pub const LAT_LON: &str = "lat-lon";

/// Grid projection tag of Lambert Conformal grids.
pub const LAMBERT_CONFORMAL: &str = "lambert-conformal";

/// GRIB2 parameter category of momentum fields.
pub const MOMENTUM_CATEGORY: i64 = 2;

/// GRIB2 parameter number of the U-component of wind.
pub const U_WIND_NUMBER: i64 = 2;

/// GRIB2 parameter number of the V-component of wind.
pub const V_WIND_NUMBER: i64 = 3;

/// Note stored with the inventory when the structured dump fails.
pub const STRUCTURED_DUMP_NOTE: &str = "structured dump unavailable";

/// Placeholder in the download URL template replaced with
/// the zero-padded forecast hour.
pub const FORECAST_HOUR_PLACEHOLDER: &str = "${fff}";
