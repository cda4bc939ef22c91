//! Persistence seam for finished output records.

use crate::output::StrategyOutput;
use campaign_core::error::CampaignResult;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Consumer of finished records. Invoked once per request.
pub trait StrategySink: Send + Sync {
    /// Store the record and return where it went.
    fn persist(&self, output: &StrategyOutput) -> CampaignResult<PathBuf>;
}

/// Writes `strategy_{YYYYmmdd_HHMMSS}.json` under a directory, creating it
/// on first use. Non-ASCII text is written as UTF-8, unescaped.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
    pretty: bool,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(output: &StrategyOutput) -> String {
        format!(
            "strategy_{}.json",
            output.metadata.generated_at.format("%Y%m%d_%H%M%S")
        )
    }
}

impl StrategySink for JsonFileSink {
    fn persist(&self, output: &StrategyOutput) -> CampaignResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(Self::file_name(output));
        fs::write(&path, output.to_json(self.pretty)?)?;
        info!(path = %path.display(), "Output saved");
        Ok(path)
    }
}
