use crate::config::Config;
use crate::constants::{raw_file_name, DAY_STAMP_FORMAT};
use crate::csv_io::read_csv_path;
use crate::dataset::Dataset;
use crate::error::{EtlError, Result};
use chrono::Local;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

/// Outbound HTTP boundary
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpGetResult>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub body: String,
}

impl HttpGetResult {
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Blocking reqwest client with no request timeout
pub struct ReqwestHttp {
    client: reqwest::blocking::Client,
}

impl ReqwestHttp {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| EtlError::Network {
                url: String::new(),
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestHttp {
    fn get(&self, url: &str) -> Result<HttpGetResult> {
        let network = |e: reqwest::Error| EtlError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let resp = self.client.get(url).send().map_err(network)?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(network)?;
        tracing::debug!("HTTP response: status={}, size={} bytes", status, body.len());

        Ok(HttpGetResult { status, body })
    }
}

/// Fetches a configured source, keeps the raw body on disk, parses it.
pub struct Extractor<'a> {
    config: &'a Config,
    http: &'a dyn HttpClient,
}

impl<'a> Extractor<'a> {
    pub fn new(config: &'a Config, http: &'a dyn HttpClient) -> Self {
        Self { config, http }
    }

    /// `{raw_data}/{source}_{YYYYMMDD}.csv` for today
    pub fn raw_path(&self, source_name: &str) -> PathBuf {
        let day = Local::now().format(DAY_STAMP_FORMAT).to_string();
        self.config.paths.raw_data.join(raw_file_name(source_name, &day))
    }

    pub fn extract(&self, source_name: &str) -> Result<Dataset> {
        self.fetch_and_parse(source_name).map_err(|e| {
            error!("Error extracting data: {}", e);
            e
        })
    }

    fn fetch_and_parse(&self, source_name: &str) -> Result<Dataset> {
        let url = self.config.source_url(source_name)?;
        info!("Extracting data from {}", url);

        let response = self.http.get(url)?;
        if response.is_error() {
            return Err(EtlError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        // Keep the body as received for debugging and reprocessing
        let raw_path = self.raw_path(source_name);
        if let Some(parent) = raw_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&raw_path, &response.body)?;

        let dataset = read_csv_path(&raw_path)?;
        info!("Extracted {} rows from {}", dataset.height(), source_name);
        Ok(dataset)
    }
}
