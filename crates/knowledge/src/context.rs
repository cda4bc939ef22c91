//! Context assembly in two phases.
//!
//! `gather` is the only phase that reads the knowledge base and always
//! produces a value per source. `glean` derives benchmarks, seasonality,
//! and the rule set from what was gathered without touching the knowledge
//! base again.

use crate::knowledge_base::KnowledgeBase;
use crate::model::{ChecklistCategory, Template, ValidationChecklist};
use crate::seasonality::Seasonality;
use campaign_core::brief::CampaignBrief;
use campaign_core::parsing;
use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Sizing guideline for an assembled context, in estimated tokens.
pub const DEFAULT_TOKEN_BUDGET: usize = 8000;

/// Raw retrieval results for one brief.
#[derive(Debug, Clone)]
pub struct Gathered<'kb> {
    pub template: Option<&'kb Template>,
    pub bidding_guide: &'kb str,
    pub targeting_guide: &'kb str,
    pub checklist: &'kb ValidationChecklist,
}

/// Benchmark figures taken from the matched template.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Benchmarks {
    pub industry: Option<String>,
    pub achieved_cpa: Option<String>,
    pub target_cpa: Option<String>,
    pub conversion_rate: Option<String>,
    pub roas: Option<String>,
    pub key_learnings: Vec<String>,
}

impl Benchmarks {
    pub fn from_template(template: &Template) -> Self {
        let metrics = &template.success_metrics;
        Self {
            industry: Some(template.industry.clone()),
            achieved_cpa: metrics.achieved_cpa.clone(),
            target_cpa: metrics.target_cpa.clone(),
            conversion_rate: metrics.conversion_rate.clone(),
            roas: metrics.roas.clone(),
            key_learnings: template.key_learnings.clone(),
        }
    }

    /// Achieved CPA as a number, if present and parseable.
    pub fn achieved_cpa_value(&self) -> Option<u64> {
        let raw = self.achieved_cpa.as_deref()?;
        let value = parsing::parse_currency(raw);
        if value.is_none() {
            warn!(achieved_cpa = %raw, "Unparseable CPA benchmark ignored");
        }
        value
    }
}

/// Per-request context handed to the agents. Discarded after the run.
#[derive(Debug, Clone)]
pub struct ContextBundle {
    pub brief: CampaignBrief,
    pub similar_template: Option<Template>,
    pub benchmarks: Benchmarks,
    pub seasonality: Seasonality,
    pub validation_rules: Vec<ChecklistCategory>,
    pub bidding_guide: String,
    pub targeting_guide: String,
    pub assembled_at: DateTime<Local>,
}

impl ContextBundle {
    /// Rough size of the bundle (~4 characters per token).
    pub fn estimated_tokens(&self) -> usize {
        let template_chars = self
            .similar_template
            .as_ref()
            .and_then(|t| serde_json::to_string(t).ok())
            .map_or(0, |s| s.len());
        let text_chars = self.bidding_guide.len() + self.targeting_guide.len() + template_chars;
        (text_chars + 3) / 4
    }
}

pub struct ContextAssembler<'kb> {
    kb: &'kb KnowledgeBase,
    token_budget: usize,
}

impl<'kb> ContextAssembler<'kb> {
    pub fn new(kb: &'kb KnowledgeBase) -> Self {
        Self {
            kb,
            token_budget: DEFAULT_TOKEN_BUDGET,
        }
    }

    pub fn with_token_budget(mut self, token_budget: usize) -> Self {
        self.token_budget = token_budget;
        self
    }

    pub fn assemble(&self, brief: &CampaignBrief) -> ContextBundle {
        self.assemble_at(brief, Local::now())
    }

    /// Assemble as of a fixed time; seasonality and naming use its month.
    pub fn assemble_at(&self, brief: &CampaignBrief, now: DateTime<Local>) -> ContextBundle {
        let gathered = self.gather(brief);
        let bundle = Self::glean(&gathered, brief, now);

        let estimated = bundle.estimated_tokens();
        if estimated > self.token_budget {
            debug!(estimated, budget = self.token_budget, "Context exceeds token guideline");
        }
        bundle
    }

    pub fn gather(&self, brief: &CampaignBrief) -> Gathered<'kb> {
        Gathered {
            template: self.kb.find_similar_template(brief).map(|m| m.template),
            bidding_guide: self.kb.get_bidding_guide(brief.kpi_type),
            targeting_guide: self.kb.get_targeting_guide("all"),
            checklist: self.kb.checklist(),
        }
    }

    pub fn glean(gathered: &Gathered<'_>, brief: &CampaignBrief, now: DateTime<Local>) -> ContextBundle {
        let benchmarks = gathered
            .template
            .map(Benchmarks::from_template)
            .unwrap_or_default();
        let seasonality = Seasonality::for_industry(&brief.industry, now.month());

        debug!(
            template = gathered.template.map(|t| t.template_id.as_str()).unwrap_or("none"),
            peak = seasonality.is_peak_season,
            rules = gathered.checklist.validation_categories.len(),
            "Context gleaned"
        );

        ContextBundle {
            brief: brief.clone(),
            similar_template: gathered.template.cloned(),
            benchmarks,
            seasonality,
            validation_rules: gathered.checklist.validation_categories.clone(),
            bidding_guide: gathered.bidding_guide.to_string(),
            targeting_guide: gathered.targeting_guide.to_string(),
            assembled_at: now,
        }
    }
}
