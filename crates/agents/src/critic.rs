//! Critic agent: scores a plan against the assembled checklist.

use crate::checks::CheckRegistry;
use campaign_core::strategy::CampaignStrategy;
use campaign_core::validation::{CheckOutcome, ValidationResult};
use campaign_knowledge::model::ChecklistItem;
use campaign_knowledge::ContextBundle;
use tracing::{debug, info};

pub struct CriticAgent {
    registry: CheckRegistry,
}

impl CriticAgent {
    pub fn new(registry: CheckRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Run every checklist item in the context's rule set. Pure: the same
    /// plan and context always yield the same result.
    pub fn validate(&self, plan: &CampaignStrategy, context: &ContextBundle) -> ValidationResult {
        let outcomes: Vec<CheckOutcome> = context
            .validation_rules
            .iter()
            .flat_map(|category| category.items.iter())
            .map(|item| self.run_check(item, plan, context))
            .collect();

        let result = ValidationResult::from_outcomes(outcomes);
        info!(
            grade = %result.grade,
            score = result.score,
            critical = result.critical_failures.len(),
            warnings = result.warnings.len(),
            "Validation complete"
        );
        result
    }

    fn run_check(&self, item: &ChecklistItem, plan: &CampaignStrategy, context: &ContextBundle) -> CheckOutcome {
        let failure = self.registry.get(&item.id).and_then(|check| check(plan, context));
        if let Some(message) = &failure {
            debug!(check = %item.id, severity = ?item.severity, %message, "Check failed");
        }

        CheckOutcome {
            id: item.id.clone(),
            description: item.description.clone(),
            severity: item.severity,
            passed: failure.is_none(),
            message: failure.unwrap_or_default(),
        }
    }
}

impl Default for CriticAgent {
    fn default() -> Self {
        Self::new(CheckRegistry::builtin())
    }
}
