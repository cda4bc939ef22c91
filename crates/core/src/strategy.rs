//! Campaign plan tree: insertion orders, line items, and the summaries the
//! planner attaches. This is the one mutable artifact of a pipeline run.

use crate::brief::CampaignGoal;
use crate::validation::{Grade, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frequency cap applied when neither template nor planner sets one.
pub const DEFAULT_FREQUENCY_CAP: &str = "3회/일, 15회/주";

/// How an insertion order spends through its flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Pacing {
    #[serde(rename = "ASAP")]
    Asap,
    #[default]
    Even,
    Ahead,
}

/// A single line item. Targeting, bidding, and creative are free-form
/// placeholders cloned from templates or synthesized by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub li_name: String,
    #[serde(default)]
    pub targeting: Value,
    #[serde(default)]
    pub bidding: Value,
    pub frequency_cap: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub creative: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertionOrder {
    pub io_name: String,
    pub budget: u64,
    pub pacing: Pacing,
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetingSummary {
    pub primary_audience: String,
    pub geo_targets: Vec<String>,
    pub device_split: String,
    pub time_targeting: String,
    pub exclusions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiddingSummary {
    pub primary_strategy: String,
    pub target_value: String,
    pub phase_1: String,
    pub phase_2: String,
    pub seasonality_adjustment: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapPhase {
    pub phase: String,
    pub actions: Vec<String>,
    pub kpis: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionWindow {
    pub click: String,
    pub view: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodlightActivity {
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub counting_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution_window: Option<AttributionWindow>,
}

/// Remarketing list definition with its membership window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceList {
    pub name: String,
    pub retention_days: u32,
    #[serde(default)]
    pub exclusion: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodlightSetup {
    pub global_site_tag: String,
    pub activities: Vec<FloodlightActivity>,
    pub audience_lists: Vec<AudienceList>,
}

/// Generated campaign plan. Created by the planner, mutated in place only by
/// the optimizer, finalized by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignStrategy {
    pub campaign_name: String,
    pub campaign_goal: CampaignGoal,
    pub total_budget: u64,
    pub duration_days: u32,
    pub insertion_orders: Vec<InsertionOrder>,
    pub targeting_summary: TargetingSummary,
    pub bidding_summary: BiddingSummary,
    pub optimization_roadmap: Vec<RoadmapPhase>,
    pub floodlight_setup: FloodlightSetup,
    #[serde(default)]
    pub validation_results: Option<ValidationResult>,
    #[serde(default)]
    pub grade: Option<Grade>,
}

impl CampaignStrategy {
    /// Sum of insertion-order budgets.
    pub fn io_budget_total(&self) -> u64 {
        self.insertion_orders.iter().map(|io| io.budget).sum()
    }

    /// Absolute gap between the IO budget sum and the total budget.
    pub fn budget_discrepancy(&self) -> u64 {
        self.io_budget_total().abs_diff(self.total_budget)
    }

    pub fn line_items(&self) -> impl Iterator<Item = &LineItem> {
        self.insertion_orders.iter().flat_map(|io| io.line_items.iter())
    }

    /// Attach a validation pass, replacing any earlier one.
    pub fn record_validation(&mut self, result: ValidationResult) {
        self.grade = Some(result.grade);
        self.validation_results = Some(result);
    }
}
