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

//! Module fetching forecast files from the configured remote source.
//!
//! Files are fetched one at a time in forecast-hour order. A failed
//! file is counted and skipped, there are no retries.

use super::{configuration::Download, progress_bar};
use crate::constants::FORECAST_HOUR_PLACEHOLDER;
use crate::errors::DownloadError;
use log::{info, warn};
use reqwest::blocking::Client;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

/// Outcome of [`download_all`].
#[derive(Clone, PartialEq, Debug, Default)]
pub struct DownloadReport {
    pub downloaded: Vec<PathBuf>,
    pub failed: usize,
}

/// Forecast hours to fetch, from first to last inclusive.
pub fn forecast_hours(download: &Download) -> Vec<u32> {
    (download.first_hour..=download.last_hour)
        .step_by(download.step.max(1) as usize)
        .collect()
}

/// URL of the file for one forecast hour.
pub fn forecast_url(url_template: &str, hour: u32) -> String {
    url_template.replace(FORECAST_HOUR_PLACEHOLDER, &format!("{:03}", hour))
}

/// Local name of a downloaded file: the last URL path segment,
/// or a generated name when the URL has none.
pub fn local_file_name(url: &str, hour: u32) -> String {
    let path = url.split(|c| c == '?' || c == '#').next().unwrap_or(url);

    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("forecast-{:03}.grb2", hour),
    }
}

/// Downloads every configured forecast hour sequentially.
pub fn download_all(download: &Download) -> Result<DownloadReport, DownloadError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(download.timeout_secs))
        .build()?;

    fs::create_dir_all(&download.directory)?;

    let hours = forecast_hours(download);
    let bar = progress_bar(hours.len(), "Downloaded files");
    let mut report = DownloadReport::default();

    for hour in hours {
        let url = forecast_url(&download.url_template, hour);
        let out_path = download.directory.join(local_file_name(&url, hour));

        match download_file(&client, &url, &out_path) {
            Ok(size) => {
                info!("{} kB saved to {}", size / 1024, out_path.display());
                report.downloaded.push(out_path);
            }
            Err(err) => {
                warn!("Download of {} failed: {}", url, err);
                report.failed += 1;
            }
        }
        bar.inc(1);
    }

    bar.finish_with_message("All forecast hours requested");
    info!(
        "Downloaded {} files, {} failed",
        report.downloaded.len(),
        report.failed
    );

    Ok(report)
}

/// Fetches one file, writing it under a temporary name first
/// so that partial downloads never appear under the final name.
fn download_file(client: &Client, url: &str, out_path: &Path) -> Result<u64, DownloadError> {
    info!("Downloading {}", url);

    let response = client.get(url).send()?;

    if !response.status().is_success() {
        return Err(DownloadError::Status(response.status()));
    }

    let body = response.bytes()?;

    if body.is_empty() {
        return Err(DownloadError::EmptyBody);
    }

    let out_dir = out_path.parent().unwrap_or_else(|| Path::new("."));
    let mut out_file = tempfile::NamedTempFile::new_in(out_dir)?;
    out_file.write_all(&body)?;
    out_file.persist(out_path).map_err(|err| err.error)?;

    Ok(body.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::{download_file, forecast_hours, forecast_url, local_file_name};
    use crate::converter::configuration::Download;
    use crate::errors::DownloadError;
    use reqwest::blocking::Client;
    use std::{
        io::{BufRead, BufReader, Write},
        net::TcpListener,
        path::PathBuf,
        thread,
    };

    /// Answers a single HTTP request with `response` and returns the URL.
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        });

        format!("http://{}/wrf/M-A0064-006.grb2", addr)
    }

    fn client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    fn download() -> Download {
        Download {
            url_template: "https://example.org/wrf/M-A0064-${fff}.grb2".to_string(),
            first_hour: 0,
            last_hour: 84,
            step: 6,
            directory: PathBuf::from("./data"),
            timeout_secs: 300,
        }
    }

    #[test]
    fn every_sixth_hour() {
        let hours = forecast_hours(&download());

        assert_eq!(hours.len(), 15);
        assert_eq!(hours.first(), Some(&0));
        assert_eq!(hours[1], 6);
        assert_eq!(hours.last(), Some(&84));
    }

    #[test]
    fn urls_use_padded_hours() {
        assert_eq!(
            forecast_url(&download().url_template, 6),
            "https://example.org/wrf/M-A0064-006.grb2"
        );
        assert_eq!(
            forecast_url(&download().url_template, 84),
            "https://example.org/wrf/M-A0064-084.grb2"
        );
    }

    #[test]
    fn file_names_from_urls() {
        assert_eq!(
            local_file_name("https://example.org/wrf/M-A0064-006.grb2", 6),
            "M-A0064-006.grb2"
        );
        assert_eq!(
            local_file_name("https://example.org/get/M-A0064-012.grb2?key=abc", 12),
            "M-A0064-012.grb2"
        );
        assert_eq!(local_file_name("https://example.org/get/", 18), "forecast-018.grb2");
    }

    #[test]
    fn error_status_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("M-A0064-006.grb2");
        let url = serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");

        let err = download_file(&client(), &url, &out_path).unwrap_err();

        assert!(matches!(err, DownloadError::Status(status) if status.as_u16() == 404));
        assert!(!out_path.exists());
    }

    #[test]
    fn empty_body_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("M-A0064-006.grb2");
        let url = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");

        let err = download_file(&client(), &url, &out_path).unwrap_err();

        assert!(matches!(err, DownloadError::EmptyBody));
        assert!(!out_path.exists());
    }

    #[test]
    fn body_is_saved_under_final_name() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("M-A0064-006.grb2");
        let url = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nGRIB2");

        let size = download_file(&client(), &url, &out_path).unwrap();

        assert_eq!(size, 5);
        assert_eq!(std::fs::read(&out_path).unwrap(), b"GRIB2");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
