//! Reference record shapes: golden-dataset templates and the validation
//! checklist. Loaded once, read-only afterwards.

use campaign_core::brief::FunnelStage;
use campaign_core::parsing;
use campaign_core::strategy::Pacing;
use campaign_core::validation::Severity;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A proven campaign setup from the golden dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub template_id: String,
    pub industry: String,
    pub funnel_stage: FunnelStage,
    #[serde(default)]
    pub target_demographic: String,
    /// Display range such as `"월 300만-1,000만원"`.
    #[serde(default)]
    pub budget_range: String,
    #[serde(default)]
    pub campaign_structure: Option<CampaignStructure>,
    #[serde(default)]
    pub success_metrics: SuccessMetrics,
    #[serde(default)]
    pub key_learnings: Vec<String>,
}

impl Template {
    /// Parsed budget range, `None` when the display string is malformed.
    pub fn budget_bounds(&self) -> Option<(u64, u64)> {
        parsing::parse_budget_range(&self.budget_range)
    }

    /// Insertion-order skeleton, if the template declares a non-empty one.
    pub fn insertion_orders(&self) -> Option<&[TemplateInsertionOrder]> {
        self.campaign_structure
            .as_ref()
            .map(|s| s.insertion_orders.as_slice())
            .filter(|ios| !ios.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CampaignStructure {
    #[serde(default)]
    pub insertion_orders: Vec<TemplateInsertionOrder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateInsertionOrder {
    #[serde(default)]
    pub io_name: Option<String>,
    /// Share of total budget, e.g. `"30%"`.
    #[serde(default)]
    pub budget_allocation: Option<String>,
    #[serde(default)]
    pub pacing: Option<Pacing>,
    #[serde(default)]
    pub line_items: Vec<TemplateLineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLineItem {
    #[serde(default)]
    pub li_name: Option<String>,
    #[serde(default)]
    pub targeting: Value,
    #[serde(default)]
    pub bidding: Value,
    #[serde(default)]
    pub frequency_cap: Option<String>,
    #[serde(default)]
    pub creative: Value,
}

/// Results the template campaign achieved, kept as display strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SuccessMetrics {
    #[serde(default)]
    pub achieved_cpa: Option<String>,
    #[serde(default)]
    pub target_cpa: Option<String>,
    #[serde(default)]
    pub conversion_rate: Option<String>,
    #[serde(default)]
    pub roas: Option<String>,
}

// ─── Validation checklist ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValidationChecklist {
    #[serde(default)]
    pub checklist_version: Option<String>,
    #[serde(default)]
    pub validation_categories: Vec<ChecklistCategory>,
    /// Grade letter → human description of the band.
    #[serde(default)]
    pub grading_system: BTreeMap<String, String>,
}

impl ValidationChecklist {
    pub fn item_count(&self) -> usize {
        self.validation_categories.iter().map(|c| c.items.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistCategory {
    pub category: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
}
