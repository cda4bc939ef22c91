//! Weighted-feature similarity between a brief and a golden template.
//!
//! Weights are kept as integer points out of 100 so that a full match is
//! exactly 1.0 after scaling.

use crate::model::Template;
use campaign_core::brief::CampaignBrief;
use serde::Serialize;
use tracing::debug;

pub const INDUSTRY_EXACT_POINTS: u32 = 40;
pub const INDUSTRY_PARTIAL_POINTS: u32 = 20;
pub const FUNNEL_POINTS: u32 = 30;
pub const BUDGET_POINTS: u32 = 20;
pub const DEMOGRAPHIC_POINTS: u32 = 10;

/// Per-component contribution to a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SimilarityBreakdown {
    pub industry: u32,
    pub funnel: u32,
    pub budget: u32,
    pub demographic: u32,
}

impl SimilarityBreakdown {
    pub fn points(&self) -> u32 {
        self.industry + self.funnel + self.budget + self.demographic
    }

    /// Score in `[0.0, 1.0]`.
    pub fn score(&self) -> f64 {
        f64::from(self.points()) / 100.0
    }
}

pub fn similarity(brief: &CampaignBrief, template: &Template) -> SimilarityBreakdown {
    SimilarityBreakdown {
        industry: industry_points(&brief.industry, &template.industry),
        funnel: if brief.funnel_stage == template.funnel_stage {
            FUNNEL_POINTS
        } else {
            0
        },
        budget: if budget_in_range(brief.budget, template) {
            BUDGET_POINTS
        } else {
            0
        },
        demographic: if demographics_overlap(&brief.target_demographic, &template.target_demographic)
        {
            DEMOGRAPHIC_POINTS
        } else {
            0
        },
    }
}

/// Exact match takes the full weight; otherwise the brief's industry
/// contained in the template's earns the partial weight.
fn industry_points(brief_industry: &str, template_industry: &str) -> u32 {
    if brief_industry == template_industry {
        INDUSTRY_EXACT_POINTS
    } else if !brief_industry.is_empty() && template_industry.contains(brief_industry) {
        INDUSTRY_PARTIAL_POINTS
    } else {
        0
    }
}

fn budget_in_range(budget: u64, template: &Template) -> bool {
    match template.budget_bounds() {
        Some((min, max)) => (min..=max).contains(&budget),
        None => {
            debug!(
                template_id = %template.template_id,
                budget_range = %template.budget_range,
                "Unparseable budget range treated as non-match"
            );
            false
        }
    }
}

/// Splits the brief demographic on `-` ("20-50세 여성" → "20", "50세 여성")
/// and matches if any piece occurs in the template demographic.
fn demographics_overlap(brief_demo: &str, template_demo: &str) -> bool {
    brief_demo
        .split('-')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .any(|token| template_demo.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::brief::{FunnelStage, KpiKind};

    fn template() -> Template {
        serde_json::from_value(serde_json::json!({
            "template_id": "T1",
            "industry": "서비스_운세상담",
            "funnel_stage": "전환(Conversion)",
            "target_demographic": "20-50세 여성",
            "budget_range": "월 300만-1,000만원"
        }))
        .unwrap()
    }

    fn brief() -> CampaignBrief {
        CampaignBrief::new("서비스_운세상담", FunnelStage::Conversion, 3_000_000, KpiKind::Roas, 300.0)
            .with_demographic("20-50세 여성")
    }

    #[test]
    fn test_full_match_scores_exactly_one() {
        let breakdown = similarity(&brief(), &template());
        assert_eq!(breakdown.points(), 100);
        assert_eq!(breakdown.score(), 1.0);
    }

    #[test]
    fn test_industry_exact_and_partial_are_exclusive() {
        assert_eq!(industry_points("교육", "교육"), INDUSTRY_EXACT_POINTS);
        assert_eq!(industry_points("패션", "이커머스_패션"), INDUSTRY_PARTIAL_POINTS);
        assert_eq!(industry_points("", "교육"), 0);
        assert_eq!(industry_points("금융", "교육"), 0);
    }

    #[test]
    fn test_each_component_is_monotonic() {
        let base = brief();
        let full = similarity(&base, &template()).points();

        let mut other_funnel = base.clone();
        other_funnel.funnel_stage = FunnelStage::Awareness;
        assert_eq!(similarity(&other_funnel, &template()).points(), full - FUNNEL_POINTS);

        let mut other_budget = base.clone();
        other_budget.budget = 50_000_000;
        assert_eq!(similarity(&other_budget, &template()).points(), full - BUDGET_POINTS);

        let mut other_demo = base.clone();
        other_demo.target_demographic = "60세 이상".to_string();
        assert_eq!(similarity(&other_demo, &template()).points(), full - DEMOGRAPHIC_POINTS);

        let mut partial_industry = base.clone();
        partial_industry.industry = "운세".to_string();
        assert_eq!(
            similarity(&partial_industry, &template()).points(),
            full - INDUSTRY_EXACT_POINTS + INDUSTRY_PARTIAL_POINTS
        );
    }

    #[test]
    fn test_budget_range_bounds_inclusive() {
        let t = template();
        assert!(budget_in_range(3_000_000, &t));
        assert!(budget_in_range(10_000_000, &t));
        assert!(!budget_in_range(2_999_999, &t));
        assert!(!budget_in_range(10_000_001, &t));
    }

    #[test]
    fn test_malformed_budget_range_is_non_match() {
        let mut t = template();
        t.budget_range = "월 5,000만-2억원".to_string();
        assert!(!budget_in_range(60_000_000, &t));
    }

    #[test]
    fn test_demographic_overlap() {
        assert!(demographics_overlap("20-50세 여성", "20-50세 여성"));
        assert!(demographics_overlap("40-60세", "40-60세"));
        assert!(!demographics_overlap("25-40세", "20-50세"));
        assert!(!demographics_overlap("", "20-50세"));
    }
}
