//! Optimizer agent: deterministic auto-fixes for critical failures and
//! advisory suggestions for warnings.

use campaign_core::strategy::CampaignStrategy;
use campaign_core::validation::ValidationResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Suggestion text per warning id. Never applied to the plan.
const SUGGESTIONS: &[(&str, &str)] = &[
    ("BV002", "일일 예산을 목표 CPA의 10배 이상으로 증액하거나, Line Item 수를 줄이세요."),
    ("TV001", "오디언스 중복을 줄이기 위해 Negative Targeting을 추가하세요."),
    ("TV004", "Frequency Cap을 일 7회, 주 35회 이하로 조정하세요."),
    ("BD001", "목표 CPA를 업종 벤치마크 기준으로 재설정하세요."),
];

pub fn suggestion_for(check_id: &str) -> Option<&'static str> {
    SUGGESTIONS
        .iter()
        .find(|(id, _)| *id == check_id)
        .map(|(_, text)| *text)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedFix {
    pub check_id: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub check_id: String,
    pub text: String,
}

/// What one optimization pass did.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub pass: u32,
    pub fixes_applied: Vec<AppliedFix>,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Default)]
pub struct OptimizerAgent;

impl OptimizerAgent {
    pub fn new() -> Self {
        Self
    }

    /// Apply fixes for critical failures in place and collect suggestions
    /// for warnings. Failures without a known fix are left as they are.
    pub fn optimize(
        &self,
        plan: &mut CampaignStrategy,
        validation: &ValidationResult,
        pass: u32,
    ) -> OptimizationReport {
        let mut report = OptimizationReport {
            pass,
            ..Default::default()
        };

        for failure in &validation.critical_failures {
            let applied = match failure.id.as_str() {
                "BV001" => redistribute_budget(plan),
                _ => None,
            };
            match applied {
                Some(description) => {
                    info!(pass, check = %failure.id, %description, "Auto-fix applied");
                    report.fixes_applied.push(AppliedFix {
                        check_id: failure.id.clone(),
                        description,
                    });
                }
                None => debug!(pass, check = %failure.id, "No auto-fix available"),
            }
        }

        for warning in &validation.warnings {
            if let Some(text) = suggestion_for(&warning.id) {
                info!(pass, check = %warning.id, suggestion = text, "Optimization suggestion");
                report.suggestions.push(Suggestion {
                    check_id: warning.id.clone(),
                    text: text.to_string(),
                });
            }
        }

        report
    }
}

/// Scale every IO budget by `total / io_sum`, truncating. When truncation
/// leaves the gap no smaller than before, the residual goes to the largest
/// IO so the discrepancy always shrinks. IOs that all carry zero split the
/// total evenly, the first IO taking the remainder.
fn redistribute_budget(plan: &mut CampaignStrategy) -> Option<String> {
    let io_total = plan.io_budget_total();
    let before = plan.budget_discrepancy();
    let io_count = plan.insertion_orders.len() as u64;
    if before == 0 || io_count == 0 {
        return None;
    }

    if io_total == 0 {
        let share = plan.total_budget / io_count;
        let remainder = plan.total_budget % io_count;
        for (i, io) in plan.insertion_orders.iter_mut().enumerate() {
            io.budget = if i == 0 { share + remainder } else { share };
        }
    } else {
        let total = u128::from(plan.total_budget);
        for io in &mut plan.insertion_orders {
            io.budget = (u128::from(io.budget) * total / u128::from(io_total)) as u64;
        }
    }

    if plan.budget_discrepancy() >= before {
        let shortfall = plan.total_budget.saturating_sub(plan.io_budget_total());
        if let Some(largest) = plan.insertion_orders.iter_mut().max_by_key(|io| io.budget) {
            largest.budget += shortfall;
        }
    }

    Some(format!(
        "IO 예산 비례 재분배: 불일치 {} → {}",
        before,
        plan.budget_discrepancy()
    ))
}
