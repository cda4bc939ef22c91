//! Planner agent: turns an assembled context into a candidate campaign plan.
//!
//! Every rule here is deterministic. Budget splits come from the funnel
//! stage, or from the matched template's insertion-order skeleton when it
//! has one.

use campaign_core::brief::{CampaignBrief, FunnelStage, KpiKind};
use campaign_core::parsing;
use campaign_core::strategy::{
    AttributionWindow, AudienceList, BiddingSummary, CampaignStrategy, FloodlightActivity,
    FloodlightSetup, InsertionOrder, LineItem, Pacing, RoadmapPhase, TargetingSummary,
    DEFAULT_FREQUENCY_CAP,
};
use campaign_knowledge::context::{Benchmarks, ContextBundle};
use campaign_knowledge::model::TemplateInsertionOrder;
use campaign_knowledge::seasonality::Seasonality;
use serde_json::json;
use tracing::{debug, info, warn};

/// Share used when a template insertion order omits its allocation.
const DEFAULT_TEMPLATE_ALLOCATION: &str = "30%";

// ─── Budget allocation ────────────────────────────────────────────────

/// Audience bucket an insertion order is built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudienceBucket {
    Remarketing,
    ProspectingInmarket,
    ProspectingSimilar,
    ProspectingCustom,
    ProspectingAffinity,
}

impl AudienceBucket {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Remarketing => "remarketing",
            Self::ProspectingInmarket => "prospecting_inmarket",
            Self::ProspectingSimilar => "prospecting_similar",
            Self::ProspectingCustom => "prospecting_custom",
            Self::ProspectingAffinity => "prospecting_affinity",
        }
    }

    pub fn io_name(&self) -> &'static str {
        match self {
            Self::Remarketing => "IO_Remarketing",
            Self::ProspectingInmarket => "IO_Prospecting_Inmarket",
            Self::ProspectingSimilar => "IO_Prospecting_Similar",
            Self::ProspectingCustom => "IO_Prospecting_Custom",
            Self::ProspectingAffinity => "IO_Prospecting_Affinity",
        }
    }

    pub fn pacing(&self) -> Pacing {
        match self {
            Self::Remarketing => Pacing::Asap,
            _ => Pacing::Even,
        }
    }
}

/// Bucket and its whole-percent share of the total budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub bucket: AudienceBucket,
    pub percent: u64,
}

impl Allocation {
    const fn new(bucket: AudienceBucket, percent: u64) -> Self {
        Self { bucket, percent }
    }

    /// Share of `total`, truncated.
    pub fn amount(&self, total: u64) -> u64 {
        (u128::from(total) * u128::from(self.percent) / 100) as u64
    }
}

/// Funnel-stage split. Shares always add up to 100.
pub fn budget_allocation(stage: FunnelStage) -> [Allocation; 3] {
    use AudienceBucket::*;
    match stage {
        FunnelStage::Conversion => [
            Allocation::new(Remarketing, 50),
            Allocation::new(ProspectingInmarket, 30),
            Allocation::new(ProspectingSimilar, 20),
        ],
        FunnelStage::Consideration => [
            Allocation::new(Remarketing, 35),
            Allocation::new(ProspectingInmarket, 40),
            Allocation::new(ProspectingCustom, 25),
        ],
        FunnelStage::Awareness => [
            Allocation::new(ProspectingAffinity, 50),
            Allocation::new(ProspectingInmarket, 30),
            Allocation::new(Remarketing, 20),
        ],
    }
}

// ─── Benchmark comparison ─────────────────────────────────────────────

/// How the brief's KPI target compares to the template's achieved CPA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkVerdict {
    LikelyEasy,
    RaiseTarget,
    InLine,
    NoBenchmark,
}

impl BenchmarkVerdict {
    pub fn compare(target: f64, benchmark_cpa: Option<u64>) -> Self {
        let Some(benchmark) = benchmark_cpa else {
            return Self::NoBenchmark;
        };
        let benchmark = benchmark as f64;
        if target > benchmark * 1.5 {
            Self::LikelyEasy
        } else if target < benchmark * 0.7 {
            Self::RaiseTarget
        } else {
            Self::InLine
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::LikelyEasy => "목표 CPA가 벤치마크 대비 높음, 달성 가능성 높음",
            Self::RaiseTarget => "목표 CPA가 벤치마크 대비 낮음, 상향 조정 권장",
            Self::InLine => "목표 CPA가 벤치마크와 유사, 적절한 목표",
            Self::NoBenchmark => "벤치마크 데이터 없음, 2주 학습 후 조정 권장",
        }
    }
}

// ─── Planner ──────────────────────────────────────────────────────────

pub struct PlannerAgent {
    name_prefix: String,
}

impl PlannerAgent {
    pub fn new(name_prefix: impl Into<String>) -> Self {
        Self {
            name_prefix: name_prefix.into(),
        }
    }

    pub fn generate_strategy(&self, context: &ContextBundle) -> CampaignStrategy {
        let brief = &context.brief;
        info!(industry = %brief.industry, funnel = %brief.funnel_stage, "Generating strategy");

        let insertion_orders = match context
            .similar_template
            .as_ref()
            .and_then(|t| t.insertion_orders())
        {
            Some(skeleton) => clone_template_ios(skeleton, brief.budget),
            None => default_ios(brief),
        };
        debug!(ios = insertion_orders.len(), "Insertion orders built");

        let primary_audience = context
            .similar_template
            .as_ref()
            .map(|t| t.target_demographic.as_str())
            .filter(|demo| !demo.is_empty())
            .unwrap_or(&brief.target_demographic)
            .to_string();

        CampaignStrategy {
            campaign_name: format!(
                "{}_{}_{}",
                self.name_prefix,
                brief.industry,
                context.assembled_at.format("%Y%m")
            ),
            campaign_goal: brief.campaign_goal,
            total_budget: brief.budget,
            duration_days: brief.duration_days,
            insertion_orders,
            targeting_summary: targeting_summary(brief, primary_audience),
            bidding_summary: bidding_summary(brief, &context.benchmarks, &context.seasonality),
            optimization_roadmap: optimization_roadmap(brief.kpi_type),
            floodlight_setup: floodlight_setup(),
            validation_results: None,
            grade: None,
        }
    }
}

impl Default for PlannerAgent {
    fn default() -> Self {
        Self::new("DV360")
    }
}

fn clone_template_ios(skeleton: &[TemplateInsertionOrder], budget: u64) -> Vec<InsertionOrder> {
    skeleton
        .iter()
        .map(|tpl| {
            let allocation = tpl
                .budget_allocation
                .as_deref()
                .unwrap_or(DEFAULT_TEMPLATE_ALLOCATION);
            let io_budget = match parsing::parse_percent_value(allocation) {
                Some(percent) => (budget as f64 * percent / 100.0) as u64,
                None => {
                    warn!(
                        io = tpl.io_name.as_deref().unwrap_or("IO_Default"),
                        allocation, "Unparseable template allocation, budget set to 0"
                    );
                    0
                }
            };

            InsertionOrder {
                io_name: tpl.io_name.clone().unwrap_or_else(|| "IO_Default".to_string()),
                budget: io_budget,
                pacing: tpl.pacing.unwrap_or_default(),
                line_items: tpl
                    .line_items
                    .iter()
                    .map(|li| LineItem {
                        li_name: li.li_name.clone().unwrap_or_else(|| "LI_Default".to_string()),
                        targeting: li.targeting.clone(),
                        bidding: li.bidding.clone(),
                        frequency_cap: li
                            .frequency_cap
                            .clone()
                            .unwrap_or_else(|| DEFAULT_FREQUENCY_CAP.to_string()),
                        creative: li.creative.clone(),
                    })
                    .collect(),
            }
        })
        .collect()
}

fn default_ios(brief: &CampaignBrief) -> Vec<InsertionOrder> {
    budget_allocation(brief.funnel_stage)
        .iter()
        .map(|allocation| {
            let bucket = allocation.bucket;
            InsertionOrder {
                io_name: bucket.io_name().to_string(),
                budget: allocation.amount(brief.budget),
                pacing: bucket.pacing(),
                line_items: vec![LineItem {
                    li_name: format!("LI_{}_Main", bucket.tag()),
                    targeting: json!({ "audience": bucket.tag(), "geo": brief.geo_targets }),
                    bidding: json!({ "strategy": brief.kpi_type, "target": brief.kpi_target }),
                    frequency_cap: DEFAULT_FREQUENCY_CAP.to_string(),
                    creative: serde_json::Value::Null,
                }],
            }
        })
        .collect()
}

fn targeting_summary(brief: &CampaignBrief, primary_audience: String) -> TargetingSummary {
    TargetingSummary {
        primary_audience,
        geo_targets: brief.geo_targets.clone(),
        device_split: "Mobile 80% / Desktop 20%".to_string(),
        time_targeting: "전 시간대 (저녁 7-11시 입찰 상향)".to_string(),
        exclusions: vec!["기존 전환 고객".to_string(), "경쟁사 직원".to_string()],
    }
}

fn bidding_summary(
    brief: &CampaignBrief,
    benchmarks: &Benchmarks,
    seasonality: &Seasonality,
) -> BiddingSummary {
    let kpi = brief.kpi_type;
    let verdict = BenchmarkVerdict::compare(brief.kpi_target, benchmarks.achieved_cpa_value());

    BiddingSummary {
        primary_strategy: format!("Target {kpi}"),
        target_value: match kpi {
            KpiKind::Cpa => format!("{}원", parsing::format_amount(brief.kpi_target)),
            KpiKind::Roas => format!("{}%", parsing::format_amount(brief.kpi_target)),
        },
        phase_1: "Maximize Conversions (1-2주)".to_string(),
        phase_2: format!("Target {kpi} (2-4주)"),
        seasonality_adjustment: seasonality.cpm_adjustment,
        recommendation: verdict.recommendation().to_string(),
    }
}

fn optimization_roadmap(kpi: KpiKind) -> Vec<RoadmapPhase> {
    vec![
        RoadmapPhase {
            phase: "Phase 1: 학습 (Week 1-2)".to_string(),
            actions: vec![
                "Maximize Conversions 전략으로 시작".to_string(),
                "전체 예산의 70% 활용".to_string(),
                "A/B 테스트 셋업 (메시지/크리에이티브)".to_string(),
            ],
            kpis: vec!["전환 수".to_string(), "CPM".to_string(), "CTR".to_string()],
        },
        RoadmapPhase {
            phase: "Phase 2: 최적화 (Week 3-4)".to_string(),
            actions: vec![
                format!("Target {kpi} 전환"),
                "저성과 Line Item 예산 재배분".to_string(),
                "고성과 오디언스 확장".to_string(),
            ],
            kpis: vec![kpi.to_string(), "전환율".to_string(), "ROAS".to_string()],
        },
    ]
}

fn floodlight_setup() -> FloodlightSetup {
    let list = |name: &str, retention_days: u32, exclusion: bool| AudienceList {
        name: name.to_string(),
        retention_days,
        exclusion,
    };

    FloodlightSetup {
        global_site_tag: "gtag.js 설치 필요".to_string(),
        activities: vec![
            FloodlightActivity {
                name: "Purchase/Lead".to_string(),
                activity_type: "Counter".to_string(),
                counting_method: "Standard".to_string(),
                attribution_window: Some(AttributionWindow {
                    click: "30일".to_string(),
                    view: "1일".to_string(),
                }),
            },
            FloodlightActivity {
                name: "PageView".to_string(),
                activity_type: "Counter".to_string(),
                counting_method: "Per Session".to_string(),
                attribution_window: None,
            },
        ],
        audience_lists: vec![
            list("All Visitors", 30, false),
            list("Product Viewers", 14, false),
            list("Cart Abandoners", 7, false),
            list("Converters", 90, true),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::brief::industry;
    use campaign_knowledge::{ContextAssembler, KnowledgeBase};
    use chrono::{Local, TimeZone};

    fn context_for(brief: &CampaignBrief, kb: &KnowledgeBase) -> ContextBundle {
        let now = Local.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        ContextAssembler::new(kb).assemble_at(brief, now)
    }

    #[test]
    fn test_allocations_sum_to_100() {
        for stage in [FunnelStage::Awareness, FunnelStage::Consideration, FunnelStage::Conversion] {
            let total: u64 = budget_allocation(stage).iter().map(|a| a.percent).sum();
            assert_eq!(total, 100, "{stage:?}");
        }
    }

    #[test]
    fn test_template_skeleton_is_cloned_and_scaled() {
        let kb = KnowledgeBase::builtin().unwrap();
        let brief = CampaignBrief::new(industry::FORTUNE, FunnelStage::Conversion, 3_000_000, KpiKind::Roas, 300.0)
            .with_demographic("20-50세 여성");
        let strategy = PlannerAgent::default().generate_strategy(&context_for(&brief, &kb));

        let budgets: Vec<u64> = strategy.insertion_orders.iter().map(|io| io.budget).collect();
        assert_eq!(budgets, vec![1_500_000, 900_000, 600_000]);
        assert_eq!(strategy.io_budget_total(), 3_000_000);
        assert_eq!(strategy.insertion_orders[0].line_items.len(), 2);
        assert_eq!(strategy.insertion_orders[0].pacing, Pacing::Asap);
        assert_eq!(strategy.campaign_name, "DV360_서비스_운세상담_202606");
        assert_eq!(strategy.targeting_summary.primary_audience, "20-50세 여성");
    }

    #[test]
    fn test_default_ios_without_template() {
        let kb = KnowledgeBase::default();
        let brief = CampaignBrief::new("자동차", FunnelStage::Consideration, 10_000_000, KpiKind::Cpa, 20_000.0)
            .with_demographic("30-45세");
        let strategy = PlannerAgent::default().generate_strategy(&context_for(&brief, &kb));

        let names: Vec<&str> = strategy.insertion_orders.iter().map(|io| io.io_name.as_str()).collect();
        assert_eq!(names, vec!["IO_Remarketing", "IO_Prospecting_Inmarket", "IO_Prospecting_Custom"]);
        let budgets: Vec<u64> = strategy.insertion_orders.iter().map(|io| io.budget).collect();
        assert_eq!(budgets, vec![3_500_000, 4_000_000, 2_500_000]);
        assert_eq!(strategy.insertion_orders[0].pacing, Pacing::Asap);
        assert_eq!(strategy.insertion_orders[1].pacing, Pacing::Even);

        for io in &strategy.insertion_orders {
            assert_eq!(io.line_items.len(), 1);
            assert_eq!(io.line_items[0].frequency_cap, DEFAULT_FREQUENCY_CAP);
            assert_eq!(io.line_items[0].bidding["strategy"], "CPA");
        }
        assert_eq!(strategy.targeting_summary.primary_audience, "30-45세");
        assert_eq!(strategy.bidding_summary.recommendation, BenchmarkVerdict::NoBenchmark.recommendation());
        assert_eq!(strategy.bidding_summary.target_value, "20,000원");
    }

    #[test]
    fn test_awareness_split() {
        let kb = KnowledgeBase::default();
        let brief = CampaignBrief::new("자동차", FunnelStage::Awareness, 1_000_000, KpiKind::Cpa, 0.0);
        let strategy = PlannerAgent::default().generate_strategy(&context_for(&brief, &kb));
        assert_eq!(strategy.insertion_orders[0].io_name, "IO_Prospecting_Affinity");
        assert_eq!(strategy.insertion_orders[0].budget, 500_000);
        assert_eq!(strategy.insertion_orders[2].io_name, "IO_Remarketing");
        assert_eq!(strategy.insertion_orders[2].pacing, Pacing::Asap);
    }

    #[test]
    fn test_benchmark_verdicts() {
        assert_eq!(BenchmarkVerdict::compare(20_000.0, Some(10_000)), BenchmarkVerdict::LikelyEasy);
        assert_eq!(BenchmarkVerdict::compare(6_000.0, Some(10_000)), BenchmarkVerdict::RaiseTarget);
        assert_eq!(BenchmarkVerdict::compare(10_000.0, Some(10_000)), BenchmarkVerdict::InLine);
        assert_eq!(BenchmarkVerdict::compare(15_000.0, Some(10_000)), BenchmarkVerdict::InLine);
        assert_eq!(BenchmarkVerdict::compare(7_000.0, Some(10_000)), BenchmarkVerdict::InLine);
        assert_eq!(BenchmarkVerdict::compare(1.0, None), BenchmarkVerdict::NoBenchmark);
    }

    #[test]
    fn test_fixed_sections() {
        let kb = KnowledgeBase::default();
        let brief = CampaignBrief::new("자동차", FunnelStage::Conversion, 1_000_000, KpiKind::Roas, 250.0);
        let strategy = PlannerAgent::default().generate_strategy(&context_for(&brief, &kb));

        assert_eq!(strategy.bidding_summary.phase_2, "Target ROAS (2-4주)");
        assert_eq!(strategy.bidding_summary.target_value, "250%");
        assert_eq!(strategy.optimization_roadmap.len(), 2);
        assert_eq!(strategy.targeting_summary.exclusions.len(), 2);

        let retention: Vec<u32> = strategy
            .floodlight_setup
            .audience_lists
            .iter()
            .map(|l| l.retention_days)
            .collect();
        assert_eq!(retention, vec![30, 14, 7, 90]);
        assert_eq!(strategy.floodlight_setup.activities.len(), 2);
    }
}
