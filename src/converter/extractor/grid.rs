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

//! Parser of the decoder's grid description text.
//!
//! The description is free-form diagnostic output, so every token
//! is searched for independently in the whitespace-normalised text.
//! Two layouts are recognised:
//!
//! ```text
//! lat-lon grid:(1440 x 721) units 1e-06 input WE:NS output WE:SN res 48
//! lat 90.000000 to -90.000000 by 0.250000
//! lon 0.000000 to 359.750000 by 0.250000 #points=1038240
//! ```
//!
//! ```text
//! Lambert Conformal: (1158 x 673) input WE:SN output WE:SN res 8
//! Lat1 14.022240 Lon1 105.250000 LoV 120.000000
//! LatD 10.000000 Latin1 10.000000 Latin2 40.000000
//! North Pole (1158 x 673) Dx 3000.000000 m Dy 3000.000000 m mode 8
//! ```

use crate::constants::METERS_PER_DEGREE;
use crate::converter::source::{GridDescriptor, ProjectionKind};
use crate::Float;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LAT_LON_HEADER: Regex =
        Regex::new(r"(?i)lat-lon grid:\s*\((\d+)\s*x\s*(\d+)\)").unwrap();
    static ref LAT_RANGE: Regex = Regex::new(r"(?i)lat\s+([\d.\-]+)\s+to\s+([\d.\-]+)").unwrap();
    static ref LON_RANGE: Regex = Regex::new(r"(?i)lon\s+([\d.\-]+)\s+to\s+([\d.\-]+)").unwrap();
    static ref LAMBERT_HEADER: Regex =
        Regex::new(r"(?i)Lambert Conformal:\s*\((\d+)\s*x\s*(\d+)\)").unwrap();
    static ref LAT1: Regex = Regex::new(r"(?i)Lat1\s+([\d.\-]+)").unwrap();
    static ref LON1: Regex = Regex::new(r"(?i)Lon1\s+([\d.\-]+)").unwrap();
    static ref LOV: Regex = Regex::new(r"(?i)LoV\s+([\d.\-]+)").unwrap();
    static ref LATIN1: Regex = Regex::new(r"(?i)Latin1\s+([\d.\-]+)").unwrap();
    static ref LATIN2: Regex = Regex::new(r"(?i)Latin2\s+([\d.\-]+)").unwrap();
    static ref DX_METERS: Regex = Regex::new(r"(?i)Dx\s+([\d.]+)\s+m").unwrap();
    static ref DY_METERS: Regex = Regex::new(r"(?i)Dy\s+([\d.]+)\s+m").unwrap();
}

/// Parses a grid description into a [`GridDescriptor`].
///
/// Never fails: an unrecognised description gives a descriptor
/// without projection, and missing tokens leave their fields empty.
/// When both headers are present the Lambert one is used.
pub fn parse_grid_description(text: &str) -> GridDescriptor {
    let text = normalize_whitespace(text);

    if let Some(size) = LAMBERT_HEADER.captures(&text) {
        parse_lambert(&text, capture_u32(&size, 1), capture_u32(&size, 2))
    } else if let Some(size) = LAT_LON_HEADER.captures(&text) {
        parse_lat_lon(&text, capture_u32(&size, 1), capture_u32(&size, 2))
    } else {
        GridDescriptor::default()
    }
}

fn parse_lat_lon(text: &str, nx: Option<u32>, ny: Option<u32>) -> GridDescriptor {
    let (la1, la2) = capture_range(&LAT_RANGE, text);
    let (lo1, lo2) = capture_range(&LON_RANGE, text);

    let dx = match (nx, lo1, lo2) {
        (Some(nx), Some(lo1), Some(lo2)) if nx > 1 => {
            Some(longitude_span(lo1, lo2) / Float::from(nx - 1))
        }
        _ => None,
    };

    let dy = match (ny, la1, la2) {
        (Some(ny), Some(la1), Some(la2)) if ny > 1 => Some((la1 - la2).abs() / Float::from(ny - 1)),
        _ => None,
    };

    GridDescriptor {
        projection: Some(ProjectionKind::LatLon),
        nx,
        ny,
        la1,
        la2,
        lo1,
        lo2,
        dx,
        dy,
        ..GridDescriptor::default()
    }
}

fn parse_lambert(text: &str, nx: Option<u32>, ny: Option<u32>) -> GridDescriptor {
    let la1 = capture_float(&LAT1, text);
    let lo1 = capture_float(&LON1, text);
    let dx = capture_float(&DX_METERS, text);
    let dy = capture_float(&DY_METERS, text);

    // display-only extent, latitude goes from north to south
    let lo2 = match (lo1, dx, nx) {
        (Some(lo1), Some(dx), Some(nx)) => {
            Some(lo1 + (dx / METERS_PER_DEGREE) * (Float::from(nx) - 1.0))
        }
        _ => None,
    };
    let la2 = match (la1, dy, ny) {
        (Some(la1), Some(dy), Some(ny)) => {
            Some(la1 - (dy / METERS_PER_DEGREE) * (Float::from(ny) - 1.0))
        }
        _ => None,
    };

    GridDescriptor {
        projection: Some(ProjectionKind::LambertConformal),
        nx,
        ny,
        la1,
        la2,
        lo1,
        lo2,
        dx,
        dy,
        lov: capture_float(&LOV, text),
        latin1: capture_float(&LATIN1, text),
        latin2: capture_float(&LATIN2, text),
    }
}

/// Longitude extent from `lo1` eastwards to `lo2`,
/// crossing the antimeridian when `lo2 < lo1`.
fn longitude_span(lo1: Float, lo2: Float) -> Float {
    if lo2 >= lo1 {
        lo2 - lo1
    } else {
        (360.0 + lo2) - lo1
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn capture_u32(captures: &regex::Captures, group: usize) -> Option<u32> {
    captures.get(group)?.as_str().parse().ok()
}

fn capture_float(regex: &Regex, text: &str) -> Option<Float> {
    regex.captures(text)?.get(1)?.as_str().parse().ok()
}

fn capture_range(regex: &Regex, text: &str) -> (Option<Float>, Option<Float>) {
    match regex.captures(text) {
        Some(captures) => (
            captures.get(1).and_then(|m| m.as_str().parse().ok()),
            captures.get(2).and_then(|m| m.as_str().parse().ok()),
        ),
        None => (None, None),
    }
}
