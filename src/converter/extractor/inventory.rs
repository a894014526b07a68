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

//! Parser of the decoder's record inventory.
//!
//! An inventory line looks like
//! `67:154320564:d=2025111400:UGRD:10 m above ground:84 hour fcst:`,
//! the leading integer being the record number used to address the record.

use crate::converter::source::WindComponent;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RECORD_ID: Regex = Regex::new(r"^(\d+):").unwrap();
    static ref DATA_DATE: Regex = Regex::new(r"d=(\d{10})").unwrap();
    static ref FORECAST_HOUR: Regex = Regex::new(r"(?i)(\d+)\s+hour\s+fcst").unwrap();
}

/// Level qualifier of near-surface wind, as it appears in an
/// uppercased line with and without the space before the unit.
const TEN_METRE_LEVELS: [&str; 2] = ["10 M ABOVE GROUND", "10M ABOVE GROUND"];

/// Splits the inventory listing into non-empty lines, keeping decoder order.
pub fn split_lines(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(String::from)
        .collect()
}

/// Record number at the start of an inventory line.
pub fn record_id(line: &str) -> Option<u32> {
    RECORD_ID.captures(line)?.get(1)?.as_str().parse().ok()
}

/// Finds the record holding the given wind component.
///
/// Wind at 10 m above ground is preferred, otherwise the first record
/// of the component at any level is taken. Returns the record number
/// and the matching line.
pub fn find_component_record(inventory: &[String], component: WindComponent) -> Option<(u32, &str)> {
    let ten_metre: Vec<String> = TEN_METRE_LEVELS
        .iter()
        .map(|level| format!("{}{}", component.marker(), level))
        .collect();

    let at_ten_metres = inventory.iter().find_map(|line| {
        let upper = line.to_uppercase();
        if ten_metre.iter().any(|token| upper.contains(token.as_str())) {
            record_id(line).map(|id| (id, line.as_str()))
        } else {
            None
        }
    });

    at_ten_metres.or_else(|| {
        inventory.iter().find_map(|line| {
            if line.to_uppercase().contains(component.marker()) {
                record_id(line).map(|id| (id, line.as_str()))
            } else {
                None
            }
        })
    })
}

/// Model run date (`YYYYMMDDHH`) from the first inventory line.
pub fn data_date(inventory: &[String]) -> Option<String> {
    let first = inventory.first()?;
    Some(DATA_DATE.captures(first)?.get(1)?.as_str().to_string())
}

/// Forecast hour from the first inventory line.
///
/// Analysis records carry no `hour fcst` token, they are hour 0.
pub fn forecast_hour(inventory: &[String]) -> u32 {
    inventory
        .first()
        .and_then(|first| FORECAST_HOUR.captures(first))
        .and_then(|captures| captures.get(1))
        .and_then(|hour| hour.as_str().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{data_date, find_component_record, forecast_hour, record_id, split_lines};
    use crate::converter::source::WindComponent::{U, V};

    fn inventory(listing: &str) -> Vec<String> {
        split_lines(listing)
    }

    const LISTING: &str = "1:0:d=2025111400:TMP:2 m above ground:84 hour fcst:
2:1024:d=2025111400:UGRD:850 mb:84 hour fcst:
3:2048:d=2025111400:VGRD:850 mb:84 hour fcst:
67:154320564:d=2025111400:UGRD:10 m above ground:84 hour fcst:
68:156320564:d=2025111400:VGRD:10 m above ground:84 hour fcst:

";

    #[test]
    fn lines_are_split() {
        let lines = inventory("1:0:a\r\n\n  \n2:5:b\n");

        assert_eq!(lines, vec!["1:0:a".to_string(), "2:5:b".to_string()]);
    }

    #[test]
    fn record_ids() {
        assert_eq!(record_id("67:154320564:d=2025111400:UGRD"), Some(67));
        assert_eq!(record_id("67.2:154320564:d=2025111400:UGRD"), None);
        assert_eq!(record_id("UGRD:10 m above ground"), None);
    }

    #[test]
    fn ten_metre_wind_is_preferred() {
        let lines = inventory(LISTING);

        assert_eq!(find_component_record(&lines, U).map(|r| r.0), Some(67));
        assert_eq!(find_component_record(&lines, V).map(|r| r.0), Some(68));
    }

    #[test]
    fn ten_metre_match_ignores_case_and_space() {
        let lines = inventory(
            "1:0:d=2025111400:ugrd:500 mb:anl:
2:9:d=2025111400:ugrd:10m above ground:anl:
3:18:d=2025111400:vgrd:10 M Above Ground:anl:",
        );

        assert_eq!(find_component_record(&lines, U).map(|r| r.0), Some(2));
        assert_eq!(find_component_record(&lines, V).map(|r| r.0), Some(3));
    }

    #[test]
    fn any_level_is_used_as_fallback() {
        let lines = inventory(
            "1:0:d=2025111400:UGRD:850 mb:6 hour fcst:
2:9:d=2025111400:UGRD:500 mb:6 hour fcst:
3:18:d=2025111400:VGRD:10 m above ground:6 hour fcst:",
        );

        let (id, line) = find_component_record(&lines, U).unwrap();
        assert_eq!(id, 1);
        assert!(line.contains("850 mb"));
        assert_eq!(find_component_record(&lines, V).map(|r| r.0), Some(3));
    }

    #[test]
    fn missing_component() {
        let lines = inventory("1:0:d=2025111400:TMP:2 m above ground:anl:");

        assert_eq!(find_component_record(&lines, U), None);
    }

    #[test]
    fn date_from_first_line() {
        assert_eq!(data_date(&inventory(LISTING)), Some("2025111400".to_string()));
        assert_eq!(data_date(&inventory("1:0:TMP:2 m above ground:anl:")), None);
        assert_eq!(data_date(&[]), None);
    }

    #[test]
    fn forecast_hour_defaults_to_analysis() {
        assert_eq!(forecast_hour(&inventory(LISTING)), 84);
        assert_eq!(
            forecast_hour(&inventory("1:0:d=2025111400:TMP:2 m above ground:anl:")),
            0
        );
        assert_eq!(forecast_hour(&inventory("1:0:d=2025111400:TMP:6 Hour Fcst:")), 6);
        assert_eq!(forecast_hour(&[]), 0);
    }
}
