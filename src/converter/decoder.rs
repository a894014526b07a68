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

//! Module wrapping the external GRIB2 decoder.
//!
//! All binary decoding is delegated to `wgrib2`. The [`GribDecoder`]
//! trait lists the invocation forms used by the extractor so that the
//! text parsing can be exercised without the real program.

use crate::constants::DECODER_INSTALL_HINT;
use crate::errors::ToolError;
use log::debug;
use std::{
    env,
    ffi::{OsStr, OsString},
    path::Path,
    process::Command,
};

/// Invocation forms of the external decoder.
///
/// Each method corresponds to one command line and returns what
/// the program printed to standard output.
pub trait GribDecoder {
    /// Name recorded as the parser in the source metadata.
    fn name(&self) -> &str;

    /// Fails when the program cannot be run at all.
    fn check_available(&self) -> Result<(), ToolError>;

    /// `<tool> <file> -grid`
    fn describe_grid(&self, file: &Path) -> Result<String, ToolError>;

    /// `<tool> <file> -s`
    fn list_inventory(&self, file: &Path) -> Result<String, ToolError>;

    /// `<tool> <file> -json`
    fn dump_json(&self, file: &Path) -> Result<String, ToolError>;

    /// `<tool> <file> -d <record> -csv -`
    fn record_csv(&self, file: &Path, record: u32) -> Result<String, ToolError>;

    /// `<tool> <file> -d <record> -text <out>`
    fn record_text(&self, file: &Path, record: u32, out: &Path) -> Result<(), ToolError>;
}

/// The `wgrib2` program run as a blocking subprocess.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Wgrib2 {
    program: String,
}

impl Wgrib2 {
    pub fn new(program: impl Into<String>) -> Self {
        Wgrib2 {
            program: program.into(),
        }
    }

    /// Runs the program on `file` with extra arguments
    /// and collects its standard output.
    ///
    /// There is no timeout, the call blocks until the subprocess exits.
    fn run(&self, file: &Path, args: &[&OsStr]) -> Result<String, ToolError> {
        let args_str = describe_args(file, args);
        debug!("Executing {} {}", self.program, args_str);

        let output = Command::new(&self.program)
            .arg(file)
            .args(args)
            .output()
            .map_err(|source| ToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                program: self.program.clone(),
                args: args_str,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| ToolError::NotUtf8 {
            program: self.program.clone(),
            args: args_str,
        })
    }
}

impl GribDecoder for Wgrib2 {
    fn name(&self) -> &str {
        Path::new(&self.program)
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or(self.program.as_str())
    }

    fn check_available(&self) -> Result<(), ToolError> {
        if is_on_path(Path::new(&self.program)) {
            Ok(())
        } else {
            Err(ToolError::NotFound {
                program: self.program.clone(),
                hint: DECODER_INSTALL_HINT,
            })
        }
    }

    fn describe_grid(&self, file: &Path) -> Result<String, ToolError> {
        self.run(file, &["-grid".as_ref()])
    }

    fn list_inventory(&self, file: &Path) -> Result<String, ToolError> {
        self.run(file, &["-s".as_ref()])
    }

    fn dump_json(&self, file: &Path) -> Result<String, ToolError> {
        self.run(file, &["-json".as_ref()])
    }

    fn record_csv(&self, file: &Path, record: u32) -> Result<String, ToolError> {
        let record = record.to_string();
        self.run(
            file,
            &["-d".as_ref(), record.as_ref(), "-csv".as_ref(), "-".as_ref()],
        )
    }

    fn record_text(&self, file: &Path, record: u32, out: &Path) -> Result<(), ToolError> {
        let record = record.to_string();
        self.run(
            file,
            &["-d".as_ref(), record.as_ref(), "-text".as_ref(), out.as_os_str()],
        )?;

        Ok(())
    }
}

/// Checks whether `program` names an existing file, either directly
/// when it contains a directory part or in one of the `PATH` entries.
fn is_on_path(program: &Path) -> bool {
    if program.components().count() > 1 {
        return program.is_file();
    }

    let exe_name = {
        let mut name = OsString::from(program.as_os_str());
        name.push(env::consts::EXE_SUFFIX);
        name
    };

    env::var_os("PATH")
        .map(|paths| {
            env::split_paths(&paths)
                .any(|dir| dir.join(program).is_file() || dir.join(&exe_name).is_file())
        })
        .unwrap_or(false)
}

fn describe_args(file: &Path, args: &[&OsStr]) -> String {
    let mut described = format!("\"{}\"", file.display());

    for arg in args {
        described.push(' ');
        described.push_str(&arg.to_string_lossy());
    }

    described
}
