use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::FactorModel;

/// File-backed persistence for a fitted model.
///
/// The model is written as JSON next to its final path and renamed into
/// place, so readers never see a half-written file.
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Persists the model and returns the path it can be loaded from.
    pub fn save(&self, model: &FactorModel) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create model directory")?;
        }

        let json = serde_json::to_string(model).context("Failed to serialize model")?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, json).context("Failed to write model file")?;
        fs::rename(&temp_path, &self.path).context("Failed to move model file into place")?;

        info!("Saved model to {}", self.path.display());
        Ok(self.path.clone())
    }

    pub fn load(&self) -> Result<FactorModel> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read model file {}", self.path.display()))?;

        let model: FactorModel =
            serde_json::from_str(&json).context("Failed to deserialize model")?;
        model.validate()?;

        info!(
            "Loaded model from {} ({} users, {} items, k={})",
            self.path.display(),
            model.user_count(),
            model.item_count(),
            model.hyperparameters().factors
        );
        Ok(model)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
