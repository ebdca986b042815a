use crate::csv_io::write_csv_path;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::parquet_out::write_parquet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Paths of a successfully written output pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedArtifacts {
    pub parquet_path: PathBuf,
    pub csv_path: PathBuf,
}

/// Staging files that are removed on drop unless promoted
struct StagedFiles {
    staged: Vec<PathBuf>,
    promoted: Vec<PathBuf>,
    committed: bool,
}

impl StagedFiles {
    fn new() -> Self {
        Self { staged: Vec::new(), promoted: Vec::new(), committed: false }
    }

    fn stage(&mut self, path: PathBuf) -> PathBuf {
        self.staged.push(path.clone());
        path
    }

    /// Rename each staged file onto its target, in order
    fn commit(mut self, targets: &[&Path]) -> Result<()> {
        for (staged, target) in self.staged.iter().zip(targets) {
            fs::rename(staged, target)?;
            self.promoted.push(target.to_path_buf());
        }
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFiles {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for path in self.staged.iter().chain(self.promoted.iter()) {
            if path.exists() {
                if let Err(e) = fs::remove_file(path) {
                    warn!("Failed to remove partial output {}: {}", path.display(), e);
                }
            }
        }
    }
}

/// Writes the processed Parquet/CSV pair
pub struct Loader {
    processed_dir: PathBuf,
}

impl Loader {
    pub fn new(processed_dir: impl Into<PathBuf>) -> Self {
        Self { processed_dir: processed_dir.into() }
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    pub fn load(&self, dataset: &Dataset, filename: &str) -> Result<LoadedArtifacts> {
        self.write_pair(dataset, filename).map_err(|e| {
            error!("Error loading data: {}", e);
            e
        })
    }

    fn write_pair(&self, dataset: &Dataset, filename: &str) -> Result<LoadedArtifacts> {
        fs::create_dir_all(&self.processed_dir)?;

        let parquet_path = self.processed_dir.join(format!("{filename}.parquet"));
        let csv_path = self.processed_dir.join(format!("{filename}.csv"));

        // Both files land under hidden names first; neither target appears
        // unless both were written.
        let mut staged = StagedFiles::new();
        let parquet_tmp = staged.stage(self.processed_dir.join(format!(".{filename}.parquet.tmp")));
        write_parquet(dataset, &parquet_tmp)?;

        let csv_tmp = staged.stage(self.processed_dir.join(format!(".{filename}.csv.tmp")));
        write_csv_path(dataset, &csv_tmp)?;

        staged.commit(&[parquet_path.as_path(), csv_path.as_path()])?;

        info!("Data loaded successfully to {}", parquet_path.display());
        Ok(LoadedArtifacts { parquet_path, csv_path })
    }
}
