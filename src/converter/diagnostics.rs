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

//! Non-fatal findings of the extraction and mapping steps.
//!
//! Conversion functions return these next to their data instead of
//! printing them, [`report`] is the only place they are presented.

use crate::converter::source::WindComponent;
use log::warn;
use std::fmt;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Diagnostic {
    /// No inventory record holds the component.
    ComponentNotFound { component: WindComponent },

    /// The record was found but neither value listing could be read.
    ComponentExtractionFailed {
        component: WindComponent,
        record: u32,
        reason: String,
    },

    /// Values were read from the text dump after the CSV listing failed.
    CsvFallbackUsed {
        component: WindComponent,
        record: u32,
        reason: String,
    },

    /// The inventory was stored in place of the structured dump.
    StructuredDumpUnavailable { reason: String },

    /// An empty component was filled from the structured dump.
    ComponentFromStructuredDump { component: WindComponent },

    /// Required wind JSON fields that are absent.
    MissingFields { fields: Vec<&'static str> },

    /// Required fields of the `projection` object that are absent.
    MissingProjectionFields { fields: Vec<&'static str> },
}

impl Diagnostic {
    /// Whether the diagnostic means the wind JSON is incomplete.
    pub fn is_missing_fields(&self) -> bool {
        matches!(
            self,
            Diagnostic::MissingFields { .. } | Diagnostic::MissingProjectionFields { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ComponentNotFound { component } => {
                write!(f, "no {} wind component record found", component)
            }
            Diagnostic::ComponentExtractionFailed {
                component,
                record,
                reason,
            } => write!(
                f,
                "cannot extract {} wind component from record {}: {}",
                component, record, reason
            ),
            Diagnostic::CsvFallbackUsed {
                component,
                record,
                reason,
            } => write!(
                f,
                "{} wind component of record {} read from text dump ({})",
                component, record, reason
            ),
            Diagnostic::StructuredDumpUnavailable { reason } => {
                write!(f, "structured dump unavailable, keeping inventory: {}", reason)
            }
            Diagnostic::ComponentFromStructuredDump { component } => {
                write!(f, "{} wind component taken from structured dump", component)
            }
            Diagnostic::MissingFields { fields } => {
                write!(f, "wind JSON lacks required fields: {}", fields.join(", "))
            }
            Diagnostic::MissingProjectionFields { fields } => write!(
                f,
                "wind JSON projection object lacks fields: {}",
                fields.join(", ")
            ),
        }
    }
}

/// Logs diagnostics as warnings, prefixed with the file they concern.
pub fn report(context: &str, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        warn!("{}: {}", context, diagnostic);
    }

    if diagnostics.iter().any(Diagnostic::is_missing_fields) {
        warn!(
            "{}: wind JSON may not render correctly, check the source JSON for the data layout",
            context
        );
    }
}

#[cfg(test)]
mod tests {
    use super::Diagnostic;
    use crate::converter::source::WindComponent;

    #[test]
    fn messages_name_what_is_missing() {
        let diagnostic = Diagnostic::MissingFields {
            fields: vec!["dx", "u"],
        };
        assert_eq!(diagnostic.to_string(), "wind JSON lacks required fields: dx, u");
        assert!(diagnostic.is_missing_fields());

        let diagnostic = Diagnostic::ComponentNotFound {
            component: WindComponent::V,
        };
        assert_eq!(diagnostic.to_string(), "no V wind component record found");
        assert!(!diagnostic.is_missing_fields());
    }
}
