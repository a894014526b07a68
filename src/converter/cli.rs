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

//! Command-line interface of the converter.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Converts GRIB2 wind fields into wind JSON for map visualisation.
#[derive(Parser, Debug)]
#[command(name = "gribwind")]
#[command(version, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./gribwind.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output directory, overrides the configuration
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Decoder program, overrides the configuration
    #[arg(long, global = true)]
    pub wgrib2: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert GRIB2 files into source and wind JSON
    Convert {
        /// GRIB2 files, processed in the given order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Write the wind JSON for a saved source JSON
    Map {
        /// Source JSON written by an earlier conversion
        source: PathBuf,
    },
    /// Download the configured forecast files
    Download {
        /// Convert the downloaded files afterwards
        #[arg(long)]
        convert: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "gribwind",
            "convert",
            "a.grb2",
            "b.grb2",
            "--output",
            "out",
            "--wgrib2",
            "/opt/bin/wgrib2",
        ]);

        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert_eq!(cli.wgrib2.as_deref(), Some("/opt/bin/wgrib2"));
        match cli.command {
            Command::Convert { files } => {
                assert_eq!(files, vec![PathBuf::from("a.grb2"), PathBuf::from("b.grb2")])
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn convert_needs_files() {
        assert!(Cli::try_parse_from(["gribwind", "convert"]).is_err());
    }
}
