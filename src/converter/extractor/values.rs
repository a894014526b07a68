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

//! Parsers of the per-record value listings produced by the decoder.

use crate::Float;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

lazy_static! {
    static ref GRID_SIZE_LINE: Regex = Regex::new(r"^\d+\s+\d+$").unwrap();
}

/// Parses `lon,lat,value` lines and returns the values in line order.
///
/// Lines with fewer than three columns or a non-numeric third column are skipped.
pub fn parse_csv_values(text: &str) -> Vec<Float> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut values = Vec::new();

    for record in reader.records() {
        match record {
            Ok(record) => {
                if let Some(value) = record.get(2).and_then(parse_value) {
                    values.push(value);
                }
            }
            Err(err) => debug!("Skipping unreadable CSV line: {}", err),
        }
    }

    values
}

/// Parses a text dump: an optional `nx ny` header line followed by
/// values, one or several per line.
///
/// Only the first line made of two integers is treated as the header.
/// Blank lines and lines starting with `#` are ignored.
pub fn parse_text_dump(text: &str) -> Vec<Float> {
    let mut values = Vec::new();
    let mut header_seen = false;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if !header_seen && GRID_SIZE_LINE.is_match(line) {
            header_seen = true;
            continue;
        }

        values.extend(line.split_whitespace().filter_map(parse_value));
    }

    values
}

/// Parses one finite number, the JSON output cannot carry the rest.
fn parse_value(token: &str) -> Option<Float> {
    token.parse::<Float>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::{parse_csv_values, parse_text_dump};

    #[test]
    fn csv_third_column() {
        let text = "105.25,14.02,1.5\n105.28,14.02,-2.25\n\n105.31,14.02,abc\n105.34,14.02\n105.37, 14.02 , 3e-1\n";

        assert_eq!(parse_csv_values(text), vec![1.5, -2.25, 0.3]);
    }

    #[test]
    fn csv_without_values() {
        assert!(parse_csv_values("").is_empty());
        assert!(parse_csv_values("\"2025-11-14 00:00:00\",\"2025-11-17 12:00:00\",\"UGRD\"\n").is_empty());
    }

    #[test]
    fn text_dump_with_header() {
        let text = "3 2\n1.0\n2.5\n# comment\n\n-3.0 4.0\n5 6\nnan 7.5\n";

        assert_eq!(parse_text_dump(text), vec![1.0, 2.5, -3.0, 4.0, 5.0, 6.0, 7.5]);
    }

    #[test]
    fn text_dump_header_is_found_later() {
        let text = "0.5\n2 2\n1.0 2.0\n";

        assert_eq!(parse_text_dump(text), vec![0.5, 1.0, 2.0]);
    }
}
