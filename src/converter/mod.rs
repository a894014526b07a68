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

//! Module containing the conversion pipeline.
//!
//! A conversion runs in two steps per file. The [`extractor`] invokes
//! the decoder and assembles a [`SourceRecord`], then the [`mapper`]
//! reshapes it into the wind JSON. Both artifacts are written to the
//! output directory. Files are converted one after another, a failed
//! file in a batch is logged and skipped.

mod cli;
mod configuration;
mod decoder;
mod diagnostics;
mod download;
mod extractor;
mod mapper;
mod output;
mod source;


use crate::converter::{
    cli::{Cli, Command},
    configuration::{Config, Output},
    decoder::{GribDecoder, Wgrib2},
    mapper::WindJsonOutput,
    source::SourceRecord,
};
use crate::errors::{ConverterError, ExtractionError};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::{
    ffi::OsStr,
    fmt::Display,
    path::{Path, PathBuf},
};

/// Main converter function, dispatching the requested command.
///
/// It reads the command line and configuration, then converts,
/// maps or downloads files.
pub fn main() -> Result<(), ConverterError> {
    let cli = Cli::parse();

    debug!("Reading configuration");
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(program) = cli.wgrib2 {
        config.tool.program = program;
    }
    if let Some(directory) = cli.output {
        config.output.directory = directory;
    }
    config.check_bounds()?;

    let decoder = Wgrib2::new(config.tool.program.clone());

    match cli.command {
        Command::Convert { files } => convert_files(&decoder, &files, &config.output),
        Command::Map { source } => {
            output::prepare_output_dir(&config.output.directory)?;
            map_source_file(&source, &config.output)?;
            Ok(())
        }
        Command::Download { convert } => {
            let download = config
                .download
                .as_ref()
                .ok_or(ConverterError::NoDownloadConfig)?;

            info!("Downloading forecast files");
            let report = download::download_all(download)?;

            if convert && !report.downloaded.is_empty() {
                convert_files(&decoder, &report.downloaded, &config.output)
            } else {
                Ok(())
            }
        }
    }
}

/// Converts files in the given order.
///
/// A single file propagates its error. In a batch every failure is
/// logged and counted, and the batch fails only after all files were tried.
/// A missing decoder stops the batch at once.
fn convert_files(
    decoder: &dyn GribDecoder,
    files: &[PathBuf],
    output: &Output,
) -> Result<(), ConverterError> {
    output::prepare_output_dir(&output.directory)?;

    if let [file] = files {
        convert_file(decoder, file, output)?;
        return Ok(());
    }

    info!("Converting {} files", files.len());
    let files_bar = progress_bar(files.len(), "Converted files");
    let mut failed = 0;

    for file in files {
        match convert_file(decoder, file, output) {
            Ok(_) => {}
            Err(err @ ConverterError::Extraction(ExtractionError::DecoderMissing(_))) => {
                return Err(err);
            }
            Err(err) => {
                error!("Skipping {}: {}", file.display(), err);
                failed += 1;
            }
        }
        files_bar.inc(1);
    }

    files_bar.finish_with_message("All files processed");
    info!("Converted {} of {} files", files.len() - failed, files.len());

    if failed > 0 {
        return Err(ConverterError::BatchFailed {
            failed,
            total: files.len(),
        });
    }

    Ok(())
}

/// Extracts one file and writes its source and wind JSON.
/// Returns the path of the wind JSON.
fn convert_file(
    decoder: &dyn GribDecoder,
    file: &Path,
    output: &Output,
) -> Result<PathBuf, ConverterError> {
    check_input(file)?;

    let extraction = extractor::parse_grib2(decoder, file)?;
    let context = file.display().to_string();
    diagnostics::report(&context, &extraction.diagnostics);

    let source_path = output.directory.join(output::source_file_name(
        &extraction.record,
        &output.fallback_source_name,
    ));
    output::write_json(&source_path, &extraction.record)?;
    info!("Saved {}", source_path.display());

    write_wind(&extraction.record, &context, output)
}

/// Writes the wind JSON for a source JSON saved earlier.
fn map_source_file(source: &Path, output: &Output) -> Result<PathBuf, ConverterError> {
    let record = output::read_source(source)?;
    write_wind(&record, &source.display().to_string(), output)
}

fn write_wind(
    record: &SourceRecord,
    context: &str,
    output: &Output,
) -> Result<PathBuf, ConverterError> {
    let mapping = mapper::build_wind_json(record);
    diagnostics::report(context, &mapping.diagnostics);

    if mapping.is_complete() {
        log_summary(&mapping.wind);
    }

    let wind_path = output
        .directory
        .join(output::wind_file_name(record, &output.fallback_wind_name));
    output::write_json(&wind_path, &mapping.wind)?;
    info!("Saved {}", wind_path.display());

    Ok(wind_path)
}

/// Checks that the input exists, a file name without the `.grb2`
/// extension is only warned about.
fn check_input(file: &Path) -> Result<(), ConverterError> {
    if !file.is_file() {
        return Err(ConverterError::MissingInput(file.to_path_buf()));
    }

    let is_grb2 = file
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case("grb2"))
        .unwrap_or(false);

    if !is_grb2 {
        warn!("{} does not have the .grb2 extension", file.display());
    }

    Ok(())
}

fn log_summary(wind: &WindJsonOutput) {
    match wind {
        WindJsonOutput::Lambert(wind) => {
            let projection = &wind.projection;
            info!("Grid size: {} x {}", show(wind.nx), show(wind.ny));
            info!("Projection: Lambert Conformal");
            info!(
                "Origin: lon {}°, lat {}°",
                show(projection.lo1),
                show(projection.la1)
            );
            info!("Central meridian: {}°", show(projection.lov));
            info!(
                "Standard parallels: {}°, {}°",
                show(projection.latin1),
                show(projection.latin2)
            );
            info!(
                "Grid spacing: dx={} m, dy={} m",
                show(projection.dx),
                show(projection.dy)
            );
            info!("U points: {}, V points: {}", wind.u.len(), wind.v.len());
        }
        WindJsonOutput::Legacy(wind) => {
            info!("Grid size: {} x {}", show(wind.nx), show(wind.ny));
            info!("Origin: lon {}°, lat {}°", show(wind.lo1), show(wind.la1));
            info!("Grid spacing: dx={}°, dy={}°", show(wind.dx), show(wind.dy));
            info!("U points: {}, V points: {}", wind.u.len(), wind.v.len());
        }
    }
}

fn show<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}

/// Progress bar in the style used for all sequential loops.
fn progress_bar(len: usize, prefix: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            .progress_chars("#>-"),
    );
    bar.set_prefix(prefix);

    bar
}
