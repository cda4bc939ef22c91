//! Industry seasonality keyed by calendar month.

use campaign_core::brief::industry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    pub current_month: u32,
    pub is_peak_season: bool,
    /// Multiplier applied to expected CPM.
    pub cpm_adjustment: f64,
    pub notes: Vec<String>,
}

struct PeakRule {
    industry: &'static str,
    months: &'static [u32],
    cpm_adjustment: f64,
    note: &'static str,
}

const PEAK_RULES: &[PeakRule] = &[
    PeakRule {
        industry: industry::FORTUNE,
        months: &[12, 1],
        cpm_adjustment: 1.2,
        note: "신년 시즌: CPA 20% 감소 예상",
    },
    PeakRule {
        industry: industry::EDUCATION,
        months: &[2, 3, 8, 9],
        cpm_adjustment: 0.8,
        note: "신학기 시즌: CPA 40% 감소 예상",
    },
    PeakRule {
        industry: industry::FASHION,
        months: &[5, 11],
        cpm_adjustment: 1.3,
        note: "세일 시즌: 리타겟팅 빈도 확대 권장",
    },
];

impl Seasonality {
    /// Seasonality for a normalized industry in a given month (1–12).
    pub fn for_industry(industry: &str, month: u32) -> Self {
        match PEAK_RULES
            .iter()
            .find(|rule| rule.industry == industry && rule.months.contains(&month))
        {
            Some(rule) => Self {
                current_month: month,
                is_peak_season: true,
                cpm_adjustment: rule.cpm_adjustment,
                notes: vec![rule.note.to_string()],
            },
            None => Self {
                current_month: month,
                is_peak_season: false,
                cpm_adjustment: 1.0,
                notes: Vec::new(),
            },
        }
    }
}
