use serde::Deserialize;
use std::path::Path;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_STRATEGIST__` and an optional TOML file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct KnowledgeConfig {
    /// Directory holding `knowledge_base/` and `templates/`. `None` uses the
    /// built-in reference dataset.
    #[serde(default)]
    pub base_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_generator_version")]
    pub generator_version: String,
    /// Upper bound on optimize → revalidate passes per request.
    #[serde(default = "default_max_optimization_passes")]
    pub max_optimization_passes: u32,
    /// Sizing guideline for the assembled context; not enforced by truncation.
    #[serde(default = "default_context_token_budget")]
    pub context_token_budget: usize,
    #[serde(default = "default_campaign_name_prefix")]
    pub campaign_name_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    #[serde(default = "default_persist")]
    pub persist: bool,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

// Default functions
fn default_generator_version() -> String {
    "2026Q1".to_string()
}
fn default_max_optimization_passes() -> u32 {
    1
}
fn default_context_token_budget() -> usize {
    8000
}
fn default_campaign_name_prefix() -> String {
    "DV360".to_string()
}
fn default_output_dir() -> String {
    "output".to_string()
}
fn default_persist() -> bool {
    true
}
fn default_pretty() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generator_version: default_generator_version(),
            max_optimization_passes: default_max_optimization_passes(),
            context_token_budget: default_context_token_budget(),
            campaign_name_prefix: default_campaign_name_prefix(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            persist: default_persist(),
            pretty: default_pretty(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and an optional config file.
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = match file {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name("campaign-strategist").required(false)),
        };

        let config = builder
            .add_source(
                config::Environment::with_prefix("CAMPAIGN_STRATEGIST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.knowledge.base_path.is_none());
        assert_eq!(config.pipeline.generator_version, "2026Q1");
        assert_eq!(config.pipeline.max_optimization_passes, 1);
        assert_eq!(config.pipeline.context_token_budget, 8000);
        assert_eq!(config.pipeline.campaign_name_prefix, "DV360");
        assert_eq!(config.output.dir, "output");
        assert!(config.output.persist);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"pipeline": {"max_optimization_passes": 3}}"#).unwrap();
        assert_eq!(config.pipeline.max_optimization_passes, 3);
        assert_eq!(config.pipeline.generator_version, "2026Q1");
        assert_eq!(config.output.dir, "output");
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strategist.toml");
        std::fs::write(
            &path,
            "[pipeline]\nmax_optimization_passes = 2\n\n[output]\npersist = false\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.pipeline.max_optimization_passes, 2);
        assert_eq!(config.pipeline.campaign_name_prefix, "DV360");
        assert!(!config.output.persist);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(dir.path().join("absent.toml").as_path())).is_err());
    }
}
