//! Campaign Strategist: turns a campaign brief into a graded DV360 campaign plan.
//!
//! Reads a brief from a JSON file, from interactive prompts, or falls back to
//! a built-in example, and prints the finished strategy as JSON.

use anyhow::Context;
use campaign_agents::{JsonFileSink, StrategyGenerator};
use campaign_core::config::AppConfig;
use campaign_knowledge::KnowledgeBase;
use clap::Parser;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-strategist")]
#[command(about = "DV360 campaign strategy generator")]
#[command(version)]
struct Cli {
    /// Path to a JSON brief
    #[arg(long, short = 'i', conflicts_with = "interactive")]
    input: Option<PathBuf>,

    /// Prompt for the brief on stdin
    #[arg(long, default_value_t = false)]
    interactive: bool,

    /// TOML configuration file
    #[arg(long, env = "CAMPAIGN_STRATEGIST_CONFIG")]
    config: Option<PathBuf>,

    /// Knowledge-base directory (overrides config)
    #[arg(long, env = "CAMPAIGN_STRATEGIST__KNOWLEDGE__BASE_PATH")]
    knowledge_base: Option<PathBuf>,

    /// Output directory for persisted strategies (overrides config)
    #[arg(long, env = "CAMPAIGN_STRATEGIST__OUTPUT__DIR")]
    output_dir: Option<PathBuf>,

    /// Do not write the strategy to disk
    #[arg(long, default_value_t = false)]
    no_persist: bool,

    /// Human-readable logs instead of JSON
    #[arg(long, default_value_t = false)]
    pretty_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "campaign_strategist=info,campaign_agents=info,campaign_knowledge=info".into()
    });
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if cli.pretty_logs {
        subscriber.init();
    } else {
        subscriber.json().init();
    }

    info!("Campaign Strategist starting up");

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(Some(path.as_path()))
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load(None).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }),
    };

    // Apply CLI overrides
    if let Some(dir) = &cli.knowledge_base {
        config.knowledge.base_path = Some(dir.display().to_string());
    }
    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.display().to_string();
    }
    if cli.no_persist {
        config.output.persist = false;
    }

    info!(
        knowledge_base = config.knowledge.base_path.as_deref().unwrap_or("built-in"),
        output_dir = %config.output.dir,
        persist = config.output.persist,
        version = %config.pipeline.generator_version,
        "Configuration loaded"
    );

    let kb = match &config.knowledge.base_path {
        Some(dir) => KnowledgeBase::load_dir(dir)
            .with_context(|| format!("failed to load knowledge base from {dir}"))?,
        None => KnowledgeBase::builtin()?,
    };

    let mut generator = StrategyGenerator::new(Arc::new(kb), config.pipeline.clone());
    if config.output.persist {
        let sink = JsonFileSink::new(&config.output.dir).with_pretty(config.output.pretty);
        generator = generator.with_sink(Box::new(sink));
    }

    let raw = if let Some(path) = &cli.input {
        read_input(path)?
    } else if cli.interactive {
        prompt_brief()?
    } else {
        info!("No input given, running the built-in example brief");
        example_brief()
    };

    let output = generator.generate(&raw)?;
    println!("{}", output.to_json(config.output.pretty)?);
    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

const PROMPTS: &[(&str, &str)] = &[
    ("industry", "업종 (예: 건강기능식품, 교육, 금융, 패션, 운세): "),
    ("product_service", "제품/서비스명: "),
    ("target_demographic", "타겟 연령대 (예: 20-50세): "),
    ("funnel_stage", "퍼널 단계 (인지/고려/전환): "),
    ("campaign_goal", "캠페인 목표 (Lead Generation/Purchase): "),
    ("budget", "월 예산 (원): "),
    ("duration_days", "캠페인 기간 (일): "),
    ("kpi_type", "KPI 유형 (CPA/ROAS): "),
    ("kpi_target", "KPI 목표값: "),
];

fn prompt_brief() -> anyhow::Result<Value> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stderr = io::stderr();
    let mut record = serde_json::Map::new();

    writeln!(stderr, "DV360 Campaign Strategy Generator - Interactive Mode")?;
    for (field, prompt) in PROMPTS {
        write!(stderr, "{prompt}")?;
        stderr.flush()?;
        let answer = lines.next().transpose()?.unwrap_or_default();
        record.insert(field.to_string(), Value::String(answer.trim().to_string()));
    }
    Ok(Value::Object(record))
}

fn example_brief() -> Value {
    json!({
        "industry": "서비스_운세상담",
        "product_service": "모두의운세 - 전화 운세 상담 플랫폼",
        "target_demographic": "20-50세 여성",
        "funnel_stage": "전환(Conversion)",
        "campaign_goal": "Lead Generation",
        "budget": 3000000,
        "duration_days": 30,
        "kpi_type": "ROAS",
        "kpi_target": 300,
        "geo_targets": ["대한민국 전역"],
        "first_party_data": {
            "site_visitors": true,
            "signup_abandoners": true
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::brief::InputParser;

    #[test]
    fn test_example_brief_carries_first_party_data() {
        let brief = InputParser::parse_brief(&example_brief()).unwrap();
        assert_eq!(brief.first_party_data.len(), 2);
        assert_eq!(brief.first_party_data.get("site_visitors"), Some(&Value::Bool(true)));
        assert_eq!(brief.first_party_data.get("signup_abandoners"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_example_brief_generates_compact_json() {
        let kb = Arc::new(KnowledgeBase::builtin().unwrap());
        let generator = StrategyGenerator::new(kb, AppConfig::default().pipeline);
        let output = generator.generate(&example_brief()).unwrap();

        let compact = output.to_json(false).unwrap();
        assert!(!compact.contains('\n'));
        assert!(output.to_json(true).unwrap().contains('\n'));
    }
}
