//! Named checklist predicates.
//!
//! A check inspects a plan in its context and returns `Some(message)` when
//! it fails. Checklist items whose id has no registered predicate pass.

use campaign_core::brief::KpiKind;
use campaign_core::parsing::{format_amount, format_thousands};
use campaign_core::strategy::CampaignStrategy;
use campaign_knowledge::ContextBundle;
use std::collections::HashMap;

/// Predicate over (plan, context). `None` means pass.
pub type CheckFn = fn(&CampaignStrategy, &ContextBundle) -> Option<String>;

/// Marker that flags an uncapped frequency setting.
pub const UNLIMITED_MARKER: &str = "무제한";

/// Lookup table of check id → predicate.
#[derive(Clone)]
pub struct CheckRegistry {
    checks: HashMap<String, CheckFn>,
}

impl CheckRegistry {
    pub fn empty() -> Self {
        Self {
            checks: HashMap::new(),
        }
    }

    /// Registry with every built-in check.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("BV001", budget_sum);
        registry.register("BV002", daily_budget_adequacy);
        registry.register("TV002", geo_targets_declared);
        registry.register("TV003", converters_excluded);
        registry.register("TV004", frequency_cap_sanity);
        registry.register("SV001", structural_completeness);
        registry.register("MV001", conversion_activity);
        registry.register("MV002", remarketing_lists);
        registry
    }

    /// Add or replace the predicate for `id`.
    pub fn register(&mut self, id: impl Into<String>, check: CheckFn) {
        self.checks.insert(id.into(), check);
    }

    pub fn get(&self, id: &str) -> Option<CheckFn> {
        self.checks.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.checks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ─── Budget ───────────────────────────────────────────────────────────

fn budget_sum(plan: &CampaignStrategy, _ctx: &ContextBundle) -> Option<String> {
    let io_total = plan.io_budget_total();
    (io_total != plan.total_budget).then(|| {
        format!(
            "예산 불일치: IO 합계({}) ≠ 총예산({})",
            format_thousands(io_total),
            format_thousands(plan.total_budget)
        )
    })
}

/// CPA campaigns only: daily budget must cover ten conversions at target.
fn daily_budget_adequacy(plan: &CampaignStrategy, ctx: &ContextBundle) -> Option<String> {
    let brief = &ctx.brief;
    if brief.kpi_type != KpiKind::Cpa || brief.kpi_target <= 0.0 || plan.duration_days == 0 {
        return None;
    }
    let daily_budget = plan.total_budget as f64 / f64::from(plan.duration_days);
    (daily_budget < brief.kpi_target * 10.0).then(|| {
        format!(
            "일일 예산({})이 목표 CPA({})의 10배 미만",
            format_thousands(daily_budget.round() as u64),
            format_amount(brief.kpi_target)
        )
    })
}

// ─── Targeting ────────────────────────────────────────────────────────

fn geo_targets_declared(plan: &CampaignStrategy, _ctx: &ContextBundle) -> Option<String> {
    let declared = plan
        .targeting_summary
        .geo_targets
        .iter()
        .any(|geo| !geo.trim().is_empty());
    (!declared).then(|| "지역 타겟팅이 설정되지 않음".to_string())
}

fn converters_excluded(plan: &CampaignStrategy, _ctx: &ContextBundle) -> Option<String> {
    let excluded = plan
        .floodlight_setup
        .audience_lists
        .iter()
        .any(|list| list.exclusion);
    (!excluded).then(|| "전환 고객 제외 리스트가 없음".to_string())
}

fn frequency_cap_sanity(plan: &CampaignStrategy, _ctx: &ContextBundle) -> Option<String> {
    plan.line_items()
        .any(|li| li.frequency_cap.contains(UNLIMITED_MARKER))
        .then(|| "무제한 Frequency Cap 발견, 조정 권장".to_string())
}

// ─── Structure ────────────────────────────────────────────────────────

fn structural_completeness(plan: &CampaignStrategy, _ctx: &ContextBundle) -> Option<String> {
    if plan.insertion_orders.is_empty() {
        return Some("Insertion Order가 없음".to_string());
    }
    plan.insertion_orders
        .iter()
        .find(|io| io.line_items.is_empty())
        .map(|io| format!("{}에 Line Item이 없음", io.io_name))
}

// ─── Measurement ──────────────────────────────────────────────────────

fn conversion_activity(plan: &CampaignStrategy, _ctx: &ContextBundle) -> Option<String> {
    let tracked = plan
        .floodlight_setup
        .activities
        .iter()
        .any(|activity| activity.attribution_window.is_some());
    (!tracked).then(|| "어트리뷰션 윈도우가 있는 Floodlight 전환 활동이 없음".to_string())
}

fn remarketing_lists(plan: &CampaignStrategy, _ctx: &ContextBundle) -> Option<String> {
    plan.floodlight_setup
        .audience_lists
        .is_empty()
        .then(|| "리마케팅 오디언스 리스트가 없음".to_string())
}
