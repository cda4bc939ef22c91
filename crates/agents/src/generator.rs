//! Orchestrator: parse → assemble context → plan → validate → optimize
//! (bounded) → format → persist.

use crate::critic::CriticAgent;
use crate::optimizer::{OptimizationReport, OptimizerAgent};
use crate::output::StrategyOutput;
use crate::pipeline::{PipelineStage, PipelineStateMachine};
use crate::planner::PlannerAgent;
use crate::sink::StrategySink;
use campaign_core::brief::{CampaignBrief, InputParser};
use campaign_core::config::PipelineConfig;
use campaign_core::error::CampaignResult;
use campaign_knowledge::{ContextAssembler, KnowledgeBase};
use chrono::{DateTime, Local};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct StrategyGenerator {
    kb: Arc<KnowledgeBase>,
    config: PipelineConfig,
    planner: PlannerAgent,
    critic: CriticAgent,
    optimizer: OptimizerAgent,
    sink: Option<Box<dyn StrategySink>>,
}

impl StrategyGenerator {
    pub fn new(kb: Arc<KnowledgeBase>, config: PipelineConfig) -> Self {
        let planner = PlannerAgent::new(config.campaign_name_prefix.clone());
        info!(
            templates = kb.templates().len(),
            checklist_items = kb.checklist().item_count(),
            version = %config.generator_version,
            "Strategy generator initialized"
        );
        Self {
            kb,
            config,
            planner,
            critic: CriticAgent::default(),
            optimizer: OptimizerAgent::new(),
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn StrategySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_critic(mut self, critic: CriticAgent) -> Self {
        self.critic = critic;
        self
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn critic(&self) -> &CriticAgent {
        &self.critic
    }

    /// Run the full pipeline on a raw input record. Fails only when the
    /// record cannot be coerced into a brief.
    pub fn generate(&self, raw: &Value) -> CampaignResult<StrategyOutput> {
        self.generate_at(raw, Local::now())
    }

    pub fn generate_at(&self, raw: &Value, now: DateTime<Local>) -> CampaignResult<StrategyOutput> {
        metrics::counter!("strategy.requests").increment(1);
        let brief = InputParser::parse_brief(raw)?;
        info!(industry = %brief.industry, funnel = %brief.funnel_stage, "Input parsed");
        self.run(brief, now)
    }

    pub fn generate_from_brief(&self, brief: CampaignBrief) -> CampaignResult<StrategyOutput> {
        metrics::counter!("strategy.requests").increment(1);
        self.run(brief, Local::now())
    }

    fn run(&self, brief: CampaignBrief, now: DateTime<Local>) -> CampaignResult<StrategyOutput> {
        let mut sm = PipelineStateMachine::new();

        advance(&mut sm, PipelineStage::AssembleContext)?;
        let context = ContextAssembler::new(&self.kb)
            .with_token_budget(self.config.context_token_budget)
            .assemble_at(&brief, now);

        advance(&mut sm, PipelineStage::Plan)?;
        let mut plan = self.planner.generate_strategy(&context);

        advance(&mut sm, PipelineStage::Validate)?;
        let mut validation = self.critic.validate(&plan, &context);
        plan.record_validation(validation.clone());

        let mut reports: Vec<OptimizationReport> = Vec::new();
        let mut pass = 0;
        while validation.grade.needs_optimization() && pass < self.config.max_optimization_passes {
            pass += 1;
            advance(&mut sm, PipelineStage::Optimize)?;
            let report = self.optimizer.optimize(&mut plan, &validation, pass);
            metrics::counter!("strategy.optimization_passes").increment(1);
            reports.push(report);

            advance(&mut sm, PipelineStage::Revalidate)?;
            validation = self.critic.validate(&plan, &context);
            plan.record_validation(validation.clone());
            info!(pass, grade = %validation.grade, "Re-validation after optimization");
        }
        if validation.grade.needs_optimization() {
            info!(grade = %validation.grade, passes = pass, "Returning unconverged strategy");
        }

        advance(&mut sm, PipelineStage::FormatOutput)?;
        let output = StrategyOutput::from_parts(
            plan,
            &context,
            reports,
            &self.config.generator_version,
            now,
        )?;
        metrics::counter!("strategy.generated", "grade" => output.grade().as_str()).increment(1);
        metrics::histogram!("strategy.validation_score").record(output.validation.score);

        match &self.sink {
            Some(sink) => {
                advance(&mut sm, PipelineStage::Persist)?;
                match sink.persist(&output) {
                    Ok(path) => {
                        metrics::counter!("strategy.persisted").increment(1);
                        debug!(path = %path.display(), "Strategy persisted");
                    }
                    Err(e) => error!(error = %e, "Failed to persist strategy"),
                }
            }
            None => debug!("Persistence disabled"),
        }
        advance(&mut sm, PipelineStage::Complete)?;

        info!(
            request_id = %output.metadata.request_id,
            campaign = %output.campaign.name,
            grade = %output.grade(),
            "Strategy generation complete"
        );
        Ok(output)
    }
}

fn advance(sm: &mut PipelineStateMachine, to: PipelineStage) -> CampaignResult<()> {
    let trigger = sm.transition(to)?;
    debug!(stage = %to, trigger, "Pipeline stage");
    Ok(())
}
