use crate::config::Config;
use crate::constants::{processed_file_stem, RUN_STAMP_FORMAT};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::extract::{Extractor, HttpClient, ReqwestHttp};
use crate::load::{LoadedArtifacts, Loader};
use crate::logging::{init_logging, Logging};
use crate::transform::Transformer;
use chrono::Local;
use metrics::{counter, histogram};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, instrument};

/// Extract -> Transform -> Load for one configured source at a time
pub struct Pipeline {
    config: Config,
    http: Box<dyn HttpClient>,
    transformer: Transformer,
    loader: Loader,
    logging: Option<Logging>,
}

impl Pipeline {
    /// Load the config, start logging under `paths.logs`, use a real HTTP client.
    pub fn new(config_path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::load(config_path)?;
        let logging = init_logging(&config.paths.logs)?;
        let http = ReqwestHttp::new()?;

        let pipeline = Self::from_config(config, Box::new(http)).with_logging(logging);
        info!("Data Pipeline initialized");
        Ok(pipeline)
    }

    /// Build from an in-memory config and HTTP client. Logging is left to the caller.
    pub fn from_config(config: Config, http: Box<dyn HttpClient>) -> Self {
        let loader = Loader::new(config.paths.processed_data.clone());
        Self {
            config,
            http,
            transformer: Transformer::new(),
            loader,
            logging: None,
        }
    }

    pub fn with_logging(mut self, logging: Logging) -> Self {
        self.logging = Some(logging);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn logging(&self) -> Option<&Logging> {
        self.logging.as_ref()
    }

    pub fn extract(&self, source_name: &str) -> Result<Dataset> {
        Extractor::new(&self.config, self.http.as_ref()).extract(source_name)
    }

    pub fn transform(&self, dataset: Dataset) -> Result<Dataset> {
        self.transformer.transform(dataset)
    }

    pub fn load(&self, dataset: &Dataset, filename: &str) -> Result<LoadedArtifacts> {
        self.loader.load(dataset, filename)
    }

    /// Run every stage for `source_name` and return the cleaned dataset.
    /// Files written before a failing stage are left in place.
    #[instrument(skip(self))]
    pub fn run(&self, source_name: &str) -> Result<Dataset> {
        info!("Starting pipeline for {}", source_name);
        counter!("etl_pipeline_runs_total", "source" => source_name.to_string()).increment(1);
        let t_pipeline = Instant::now();

        let outcome = self.run_stages(source_name);
        histogram!("etl_pipeline_duration_seconds", "source" => source_name.to_string())
            .record(t_pipeline.elapsed().as_secs_f64());

        match outcome {
            Ok(dataset) => {
                counter!("etl_rows_processed_total", "source" => source_name.to_string())
                    .increment(dataset.height() as u64);
                info!("Pipeline completed successfully!");
                Ok(dataset)
            }
            Err(e) => {
                counter!("etl_pipeline_failures_total", "source" => source_name.to_string())
                    .increment(1);
                error!("Pipeline failed: {}", e);
                Err(e)
            }
        }
    }

    fn run_stages(&self, source_name: &str) -> Result<Dataset> {
        let raw = self.extract(source_name)?;
        let processed = self.transform(raw)?;

        let run_stamp = Local::now().format(RUN_STAMP_FORMAT).to_string();
        let output_filename = processed_file_stem(source_name, &run_stamp);
        self.load(&processed, &output_filename)?;

        Ok(processed)
    }
}
