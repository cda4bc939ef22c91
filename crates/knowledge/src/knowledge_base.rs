//! In-memory knowledge base: static reference documents, the golden
//! template dataset, and the validation checklist.

use crate::loader::templates_from_records;
use crate::model::{Template, ValidationChecklist};
use crate::similarity::{similarity, SimilarityBreakdown};
use campaign_core::brief::{CampaignBrief, KpiKind};
use campaign_core::error::{CampaignError, CampaignResult};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Lookup name of the bidding-strategy reference document.
pub const BIDDING_GUIDE_TOPIC: &str = "dv360_bidding_strategies_2026Q1";
/// Lookup name of the targeting-options reference document.
pub const TARGETING_GUIDE_TOPIC: &str = "dv360_targeting_options_2026Q1";

const BUILTIN_GOLDEN_DATASET: &str = include_str!("../data/templates/golden_dataset.json");
const BUILTIN_CHECKLIST: &str = include_str!("../data/templates/validation_checklist.json");
const BUILTIN_BIDDING_GUIDE: &str =
    include_str!("../data/knowledge_base/dv360_bidding_strategies_2026Q1.md");
const BUILTIN_TARGETING_GUIDE: &str =
    include_str!("../data/knowledge_base/dv360_targeting_options_2026Q1.md");

/// Best template for a brief, with its score breakdown.
#[derive(Debug, Clone, Copy)]
pub struct TemplateMatch<'a> {
    pub template: &'a Template,
    pub breakdown: SimilarityBreakdown,
}

/// Read-only after construction; safe to share across requests.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    static_knowledge: BTreeMap<String, String>,
    golden_dataset: Vec<Template>,
    validation_checklist: ValidationChecklist,
}

impl KnowledgeBase {
    pub fn new(
        static_knowledge: BTreeMap<String, String>,
        golden_dataset: Vec<Template>,
        validation_checklist: ValidationChecklist,
    ) -> Self {
        Self {
            static_knowledge,
            golden_dataset,
            validation_checklist,
        }
    }

    /// Knowledge base compiled into the binary.
    pub fn builtin() -> CampaignResult<Self> {
        let records: Vec<serde_json::Value> = serde_json::from_str(BUILTIN_GOLDEN_DATASET)
            .map_err(|e| CampaignError::KnowledgeBase(format!("built-in golden dataset: {e}")))?;
        let golden_dataset = templates_from_records(records, "built-in golden dataset");
        let validation_checklist: ValidationChecklist = serde_json::from_str(BUILTIN_CHECKLIST)
            .map_err(|e| CampaignError::KnowledgeBase(format!("built-in checklist: {e}")))?;

        let static_knowledge = BTreeMap::from([
            (BIDDING_GUIDE_TOPIC.to_string(), BUILTIN_BIDDING_GUIDE.to_string()),
            (TARGETING_GUIDE_TOPIC.to_string(), BUILTIN_TARGETING_GUIDE.to_string()),
        ]);

        info!(
            templates = golden_dataset.len(),
            checklist_items = validation_checklist.item_count(),
            documents = static_knowledge.len(),
            "Built-in knowledge base loaded"
        );
        Ok(Self::new(static_knowledge, golden_dataset, validation_checklist))
    }

    pub fn templates(&self) -> &[Template] {
        &self.golden_dataset
    }

    pub fn checklist(&self) -> &ValidationChecklist {
        &self.validation_checklist
    }

    pub fn document(&self, topic: &str) -> Option<&str> {
        self.static_knowledge.get(topic).map(String::as_str)
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.static_knowledge.keys().map(String::as_str)
    }

    /// Highest-scoring template; the first one loaded wins ties. A template
    /// that shares nothing with the brief is never returned.
    pub fn find_similar_template(&self, brief: &CampaignBrief) -> Option<TemplateMatch<'_>> {
        let mut best: Option<TemplateMatch<'_>> = None;

        for template in &self.golden_dataset {
            let breakdown = similarity(brief, template);
            debug!(
                template_id = %template.template_id,
                points = breakdown.points(),
                "Template scored"
            );
            let current_best = best.map(|m| m.breakdown.points()).unwrap_or(0);
            if breakdown.points() > current_best {
                best = Some(TemplateMatch {
                    template,
                    breakdown,
                });
            }
        }

        match &best {
            Some(m) => {
                metrics::counter!("knowledge.template_matches").increment(1);
                info!(
                    template_id = %m.template.template_id,
                    score = m.breakdown.score(),
                    "Best template match"
                );
            }
            None => {
                metrics::counter!("knowledge.template_misses").increment(1);
                info!(industry = %brief.industry, "No template matched");
            }
        }
        best
    }

    /// Bidding guide, returned only when it covers the requested KPI.
    pub fn get_bidding_guide(&self, kpi: KpiKind) -> &str {
        match self.document(BIDDING_GUIDE_TOPIC) {
            Some(doc) if doc.to_lowercase().contains(&kpi.as_str().to_lowercase()) => doc,
            _ => "",
        }
    }

    /// Targeting guide. The audience tag does not narrow the document.
    pub fn get_targeting_guide(&self, _audience_tag: &str) -> &str {
        self.document(TARGETING_GUIDE_TOPIC).unwrap_or("")
    }
}
