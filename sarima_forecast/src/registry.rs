//! Single-slot storage for the current best model

use crate::error::{ForecastError, Result};
use crate::models::SarimaModel;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Holds at most one fitted model; saving replaces it
pub trait ModelRegistry: Send + Sync {
    /// Replace the stored model
    fn save(&self, model: &SarimaModel) -> Result<()>;

    /// Load the stored model, [`ForecastError::ModelUnavailable`] if there is none
    fn load(&self) -> Result<SarimaModel>;
}

/// Registry keeping the model as one JSON document on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileModelRegistry {
    path: PathBuf,
}

impl FileModelRegistry {
    /// Create a registry backed by `path`
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Location of the model document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        self.path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }
}

impl ModelRegistry for FileModelRegistry {
    /// Write to a temporary file next to the target, then rename over it
    fn save(&self, model: &SarimaModel) -> Result<()> {
        let directory = self.directory();
        fs::create_dir_all(directory)?;

        let staged = NamedTempFile::new_in(directory)?;
        {
            let mut writer = BufWriter::new(staged.as_file());
            serde_json::to_writer_pretty(&mut writer, model)?;
            writer.flush()?;
        }
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|e| e.error)?;

        tracing::info!(path = %self.path.display(), order = %model.candidate(), "model saved");
        Ok(())
    }

    fn load(&self) -> Result<SarimaModel> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ForecastError::ModelUnavailable(format!(
                    "no model has been trained yet ({} does not exist)",
                    self.path.display()
                )))
            }
            Err(e) => return Err(e.into()),
        };

        let model: SarimaModel = serde_json::from_reader(BufReader::new(file))?;
        model.validate()?;
        Ok(model)
    }
}
