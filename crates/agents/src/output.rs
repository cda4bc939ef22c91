//! Finished output record handed to callers and persistence.

use crate::optimizer::OptimizationReport;
use campaign_core::brief::CampaignGoal;
use campaign_core::error::{CampaignError, CampaignResult};
use campaign_core::strategy::{
    BiddingSummary, CampaignStrategy, FloodlightSetup, InsertionOrder, RoadmapPhase,
    TargetingSummary,
};
use campaign_core::validation::{Grade, ValidationResult};
use campaign_knowledge::{Benchmarks, ContextBundle, Seasonality};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputMetadata {
    pub request_id: Uuid,
    pub generated_at: DateTime<Local>,
    pub generator_version: String,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub name: String,
    pub goal: CampaignGoal,
    pub budget: u64,
    pub duration_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyOutput {
    pub metadata: OutputMetadata,
    pub campaign: CampaignSummary,
    pub insertion_orders: Vec<InsertionOrder>,
    pub targeting: TargetingSummary,
    pub bidding: BiddingSummary,
    pub optimization_roadmap: Vec<RoadmapPhase>,
    pub floodlight: FloodlightSetup,
    pub validation: ValidationResult,
    pub benchmarks: Benchmarks,
    pub seasonality: Seasonality,
    /// One entry per optimizer pass; absent when the optimizer never ran.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optimization: Vec<OptimizationReport>,
}

impl StrategyOutput {
    /// Assemble the record from a finalized plan. The grade and validation
    /// block come from the result last recorded on the plan.
    pub fn from_parts(
        mut plan: CampaignStrategy,
        context: &ContextBundle,
        optimization: Vec<OptimizationReport>,
        generator_version: &str,
        generated_at: DateTime<Local>,
    ) -> CampaignResult<Self> {
        let validation = plan.validation_results.take().ok_or_else(|| {
            CampaignError::Pipeline(format!("plan {} was never validated", plan.campaign_name))
        })?;

        Ok(Self {
            metadata: OutputMetadata {
                request_id: Uuid::new_v4(),
                generated_at,
                generator_version: generator_version.to_string(),
                grade: validation.grade,
            },
            campaign: CampaignSummary {
                name: plan.campaign_name,
                goal: plan.campaign_goal,
                budget: plan.total_budget,
                duration_days: plan.duration_days,
            },
            insertion_orders: plan.insertion_orders,
            targeting: plan.targeting_summary,
            bidding: plan.bidding_summary,
            optimization_roadmap: plan.optimization_roadmap,
            floodlight: plan.floodlight_setup,
            validation,
            benchmarks: context.benchmarks.clone(),
            seasonality: context.seasonality.clone(),
            optimization,
        })
    }

    pub fn grade(&self) -> Grade {
        self.metadata.grade
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critic::CriticAgent;
    use crate::planner::PlannerAgent;
    use campaign_core::brief::{CampaignBrief, FunnelStage, KpiKind};
    use campaign_knowledge::{ContextAssembler, KnowledgeBase};

    fn setup() -> (CampaignStrategy, ContextBundle) {
        let kb = KnowledgeBase::builtin().unwrap();
        let brief = CampaignBrief::new("자동차", FunnelStage::Conversion, 30_000_000, KpiKind::Cpa, 10_000.0);
        let context = ContextAssembler::new(&kb).assemble(&brief);
        (PlannerAgent::default().generate_strategy(&context), context)
    }

    #[test]
    fn test_output_uses_recorded_validation() {
        let (mut plan, context) = setup();
        plan.insertion_orders[0].budget -= 1_000;
        let result = CriticAgent::default().validate(&plan, &context);
        plan.record_validation(result.clone());

        let output = StrategyOutput::from_parts(plan, &context, Vec::new(), "1.0.0", Local::now()).unwrap();
        assert_eq!(output.validation, result);
        assert_eq!(output.grade(), Grade::C);
    }

    #[test]
    fn test_unvalidated_plan_is_rejected() {
        let (plan, context) = setup();
        let err = StrategyOutput::from_parts(plan, &context, Vec::new(), "1.0.0", Local::now()).unwrap_err();
        assert!(matches!(err, CampaignError::Pipeline(_)));
    }
}
