//! Campaign brief: the immutable request value every pipeline run starts from,
//! plus coercion from a raw, untyped JSON record.

use crate::error::{CampaignError, CampaignResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};

/// Geo target used when a brief declares none.
pub const DEFAULT_GEO_TARGET: &str = "대한민국 전역";

/// Default campaign length when the brief omits it.
pub const DEFAULT_DURATION_DAYS: u32 = 30;

/// Normalized industry categories referenced by rule tables.
pub mod industry {
    pub const HEALTH_SUPPLEMENT: &str = "건강기능식품";
    pub const EDUCATION: &str = "교육";
    pub const FINANCE: &str = "금융";
    pub const FASHION: &str = "이커머스_패션";
    pub const FORTUNE: &str = "서비스_운세상담";
}

/// Keyword → normalized industry. Order matters: first hit wins.
const INDUSTRY_KEYWORDS: &[(&str, &str)] = &[
    ("건강", industry::HEALTH_SUPPLEMENT),
    ("health", industry::HEALTH_SUPPLEMENT),
    ("supplement", industry::HEALTH_SUPPLEMENT),
    ("교육", industry::EDUCATION),
    ("education", industry::EDUCATION),
    ("금융", industry::FINANCE),
    ("finance", industry::FINANCE),
    ("패션", industry::FASHION),
    ("fashion", industry::FASHION),
    ("운세", industry::FORTUNE),
    ("fortune", industry::FORTUNE),
];

/// Map free-text industry to its normalized category, or return it unchanged.
pub fn normalize_industry(raw: &str) -> String {
    let lower = raw.to_lowercase();
    INDUSTRY_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, normalized)| normalized.to_string())
        .unwrap_or_else(|| raw.to_string())
}

// ─── Closed categories ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunnelStage {
    #[serde(rename = "인지(Awareness)", alias = "Awareness")]
    Awareness,
    #[serde(rename = "고려(Consideration)", alias = "Consideration")]
    Consideration,
    #[serde(rename = "전환(Conversion)", alias = "Conversion")]
    Conversion,
}

impl FunnelStage {
    /// Keyword parse; anything unrecognized is a conversion-stage brief.
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("인지") || lower.contains("awareness") {
            Self::Awareness
        } else if lower.contains("고려") || lower.contains("consideration") {
            Self::Consideration
        } else {
            Self::Conversion
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Awareness => "인지(Awareness)",
            Self::Consideration => "고려(Consideration)",
            Self::Conversion => "전환(Conversion)",
        }
    }
}

impl fmt::Display for FunnelStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignGoal {
    #[serde(rename = "Brand Awareness")]
    BrandAwareness,
    #[serde(rename = "Lead Generation")]
    LeadGeneration,
    #[serde(rename = "Purchase")]
    Purchase,
    #[serde(rename = "App Install")]
    AppInstall,
}

impl CampaignGoal {
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("brand") || lower.contains("인지") {
            Self::BrandAwareness
        } else if lower.contains("lead") || lower.contains("리드") {
            Self::LeadGeneration
        } else if lower.contains("purchase") || lower.contains("구매") {
            Self::Purchase
        } else if lower.contains("app") || lower.contains("앱") {
            Self::AppInstall
        } else {
            Self::LeadGeneration
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BrandAwareness => "Brand Awareness",
            Self::LeadGeneration => "Lead Generation",
            Self::Purchase => "Purchase",
            Self::AppInstall => "App Install",
        }
    }
}

impl fmt::Display for CampaignGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KpiKind {
    Cpa,
    Roas,
}

impl KpiKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpa => "CPA",
            Self::Roas => "ROAS",
        }
    }
}

impl fmt::Display for KpiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Brief ────────────────────────────────────────────────────────────

/// Structured campaign request. Built once by [`InputParser`], never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignBrief {
    pub industry: String,
    pub product_service: String,
    pub target_demographic: String,
    pub funnel_stage: FunnelStage,
    pub campaign_goal: CampaignGoal,
    /// Monthly budget in KRW.
    pub budget: u64,
    pub duration_days: u32,
    pub kpi_type: KpiKind,
    pub kpi_target: f64,
    pub geo_targets: Vec<String>,
    #[serde(default)]
    pub first_party_data: Map<String, Value>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

impl CampaignBrief {
    /// Minimal brief with defaults for everything but the four core fields.
    pub fn new(
        industry: impl Into<String>,
        funnel_stage: FunnelStage,
        budget: u64,
        kpi_type: KpiKind,
        kpi_target: f64,
    ) -> Self {
        Self {
            industry: normalize_industry(&industry.into()),
            product_service: String::new(),
            target_demographic: String::new(),
            funnel_stage,
            campaign_goal: CampaignGoal::LeadGeneration,
            budget,
            duration_days: DEFAULT_DURATION_DAYS,
            kpi_type,
            kpi_target,
            geo_targets: vec![DEFAULT_GEO_TARGET.to_string()],
            first_party_data: Map::new(),
            constraints: Vec::new(),
        }
    }

    pub fn with_demographic(mut self, demographic: impl Into<String>) -> Self {
        self.target_demographic = demographic.into();
        self
    }

    pub fn with_duration(mut self, days: u32) -> Self {
        self.duration_days = days;
        self
    }

    pub fn with_goal(mut self, goal: CampaignGoal) -> Self {
        self.campaign_goal = goal;
        self
    }

    /// Total budget spread evenly across the flight.
    pub fn daily_budget(&self) -> f64 {
        self.budget as f64 / self.duration_days.max(1) as f64
    }
}

// ─── Raw input coercion ───────────────────────────────────────────────

/// Coerces an arbitrary key/value record into a [`CampaignBrief`].
///
/// Missing fields are defaulted; present-but-uncoercible values are
/// rejected with [`CampaignError::InvalidInput`].
pub struct InputParser;

impl InputParser {
    pub fn parse_brief(raw: &Value) -> CampaignResult<CampaignBrief> {
        let record = match raw {
            Value::Object(map) => map,
            other => {
                return Err(CampaignError::invalid_input(
                    "brief",
                    format!("expected a JSON object, got {}", json_kind(other)),
                ))
            }
        };

        let industry = normalize_industry(&text_field(record, "industry")?);
        let funnel_stage = FunnelStage::parse(&text_field(record, "funnel_stage")?);
        let campaign_goal = CampaignGoal::parse(&text_field(record, "campaign_goal")?);
        let kpi_type = Self::parse_kpi_kind(&text_field(record, "kpi_type")?);

        let budget = unsigned_field(record, "budget")?.unwrap_or(0);
        let duration_days = match unsigned_field(record, "duration_days")? {
            None => DEFAULT_DURATION_DAYS,
            Some(0) => {
                return Err(CampaignError::invalid_input(
                    "duration_days",
                    "must be a positive number of days",
                ))
            }
            Some(days) => u32::try_from(days).map_err(|_| {
                CampaignError::invalid_input("duration_days", "out of range")
            })?,
        };
        let kpi_target = float_field(record, "kpi_target")?.unwrap_or(0.0);

        let brief = CampaignBrief {
            industry,
            product_service: text_field(record, "product_service")?,
            target_demographic: text_field(record, "target_demographic")?,
            funnel_stage,
            campaign_goal,
            budget,
            duration_days,
            kpi_type,
            kpi_target,
            geo_targets: geo_targets(record)?,
            first_party_data: match record.get("first_party_data") {
                Some(Value::Object(map)) => map.clone(),
                _ => Map::new(),
            },
            constraints: string_list(record, "constraints")?,
        };

        debug!(
            industry = %brief.industry,
            funnel = %brief.funnel_stage,
            budget = brief.budget,
            "Brief parsed"
        );
        Ok(brief)
    }

    fn parse_kpi_kind(raw: &str) -> KpiKind {
        let lower = raw.trim().to_lowercase();
        if lower.contains("roas") {
            KpiKind::Roas
        } else {
            if !lower.is_empty() && lower != "cpa" {
                warn!(kpi_type = %raw, "Unrecognized KPI type, defaulting to CPA");
            }
            KpiKind::Cpa
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn text_field(record: &Map<String, Value>, field: &str) -> CampaignResult<String> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(CampaignError::invalid_input(
            field,
            format!("expected text, got {}", json_kind(other)),
        )),
    }
}

fn float_field(record: &Map<String, Value>, field: &str) -> CampaignResult<Option<f64>> {
    let value = match record.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().replace(',', "").parse::<f64>().ok(),
        Some(other) => {
            return Err(CampaignError::invalid_input(
                field,
                format!("expected a number, got {}", json_kind(other)),
            ))
        }
    };
    match value {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(CampaignError::invalid_input(field, "not a finite number")),
    }
}

fn unsigned_field(record: &Map<String, Value>, field: &str) -> CampaignResult<Option<u64>> {
    match float_field(record, field)? {
        None => Ok(None),
        Some(v) if v < 0.0 => Err(CampaignError::invalid_input(field, "must not be negative")),
        Some(v) if v > u64::MAX as f64 => Err(CampaignError::invalid_input(field, "out of range")),
        Some(v) => Ok(Some(v.trunc() as u64)),
    }
}

fn string_list(record: &Map<String, Value>, field: &str) -> CampaignResult<Vec<String>> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.trim().to_string()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.trim().to_string()),
                other => Err(CampaignError::invalid_input(
                    field,
                    format!("expected a list of text, found {}", json_kind(other)),
                )),
            })
            .collect(),
        Some(other) => Err(CampaignError::invalid_input(
            field,
            format!("expected a list of text, got {}", json_kind(other)),
        )),
    }
}

fn geo_targets(record: &Map<String, Value>) -> CampaignResult<Vec<String>> {
    let mut geos = string_list(record, "geo_targets")?;
    geos.retain(|g| !g.is_empty());
    if geos.is_empty() {
        geos.push(DEFAULT_GEO_TARGET.to_string());
    }
    Ok(geos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_basic_input() {
        let raw = json!({
            "industry": "운세",
            "product_service": "모두의운세",
            "target_demographic": "20-50세",
            "funnel_stage": "전환",
            "campaign_goal": "Lead Generation",
            "budget": 3000000,
            "duration_days": 30,
            "kpi_type": "ROAS",
            "kpi_target": 300
        });

        let brief = InputParser::parse_brief(&raw).unwrap();
        assert_eq!(brief.industry, industry::FORTUNE);
        assert_eq!(brief.funnel_stage, FunnelStage::Conversion);
        assert_eq!(brief.campaign_goal, CampaignGoal::LeadGeneration);
        assert_eq!(brief.kpi_type, KpiKind::Roas);
        assert_eq!(brief.budget, 3_000_000);
        assert_eq!(brief.geo_targets, vec![DEFAULT_GEO_TARGET.to_string()]);
    }

    #[test]
    fn test_missing_fields_are_defaulted() {
        let brief = InputParser::parse_brief(&json!({})).unwrap();
        assert_eq!(brief.budget, 0);
        assert_eq!(brief.duration_days, DEFAULT_DURATION_DAYS);
        assert_eq!(brief.kpi_type, KpiKind::Cpa);
        assert_eq!(brief.kpi_target, 0.0);
        assert_eq!(brief.funnel_stage, FunnelStage::Conversion);
        assert_eq!(brief.campaign_goal, CampaignGoal::LeadGeneration);
        assert_eq!(brief.geo_targets, vec![DEFAULT_GEO_TARGET.to_string()]);
        assert!(brief.first_party_data.is_empty());
        assert!(brief.constraints.is_empty());
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let raw = json!({ "budget": "3,000,000", "duration_days": "14", "kpi_target": "15000" });
        let brief = InputParser::parse_brief(&raw).unwrap();
        assert_eq!(brief.budget, 3_000_000);
        assert_eq!(brief.duration_days, 14);
        assert_eq!(brief.kpi_target, 15_000.0);
    }

    #[test]
    fn test_uncoercible_values_are_typed_errors() {
        let err = InputParser::parse_brief(&json!({ "budget": "lots" })).unwrap_err();
        assert!(matches!(err, CampaignError::InvalidInput { ref field, .. } if field == "budget"));

        let err = InputParser::parse_brief(&json!({ "duration_days": 0 })).unwrap_err();
        assert!(matches!(err, CampaignError::InvalidInput { ref field, .. } if field == "duration_days"));

        let err = InputParser::parse_brief(&json!({ "budget": -10 })).unwrap_err();
        assert!(matches!(err, CampaignError::InvalidInput { .. }));

        assert!(InputParser::parse_brief(&json!(["not", "a", "record"])).is_err());
    }

    #[test]
    fn test_industry_normalization() {
        let cases = [
            ("건강", industry::HEALTH_SUPPLEMENT),
            ("health", industry::HEALTH_SUPPLEMENT),
            ("Supplement Store", industry::HEALTH_SUPPLEMENT),
            ("교육", industry::EDUCATION),
            ("금융", industry::FINANCE),
            ("패션", industry::FASHION),
            ("운세", industry::FORTUNE),
            ("Fortune Telling", industry::FORTUNE),
            ("자동차", "자동차"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_industry(input), expected, "failed for {input}");
        }
    }

    #[test]
    fn test_industry_normalization_is_idempotent() {
        for input in ["운세", "fashion", "건강", "education", "finance", "자동차", ""] {
            let once = normalize_industry(input);
            assert_eq!(normalize_industry(&once), once);
        }
    }

    #[test]
    fn test_funnel_stage_parsing() {
        let cases = [
            ("인지", FunnelStage::Awareness),
            ("awareness", FunnelStage::Awareness),
            ("고려", FunnelStage::Consideration),
            ("Consideration", FunnelStage::Consideration),
            ("전환", FunnelStage::Conversion),
            ("conversion", FunnelStage::Conversion),
            ("전환(Conversion)", FunnelStage::Conversion),
            ("", FunnelStage::Conversion),
        ];
        for (input, expected) in cases {
            assert_eq!(FunnelStage::parse(input), expected, "failed for {input}");
        }
    }

    #[test]
    fn test_goal_parsing() {
        assert_eq!(CampaignGoal::parse("Brand lift"), CampaignGoal::BrandAwareness);
        assert_eq!(CampaignGoal::parse("리드 확보"), CampaignGoal::LeadGeneration);
        assert_eq!(CampaignGoal::parse("구매"), CampaignGoal::Purchase);
        assert_eq!(CampaignGoal::parse("App Install"), CampaignGoal::AppInstall);
        assert_eq!(CampaignGoal::parse("whatever"), CampaignGoal::LeadGeneration);
    }

    #[test]
    fn test_geo_targets_accept_single_string() {
        let brief = InputParser::parse_brief(&json!({ "geo_targets": "서울" })).unwrap();
        assert_eq!(brief.geo_targets, vec!["서울".to_string()]);

        let brief = InputParser::parse_brief(&json!({ "geo_targets": [] })).unwrap();
        assert_eq!(brief.geo_targets, vec![DEFAULT_GEO_TARGET.to_string()]);
    }

    #[test]
    fn test_funnel_stage_serializes_with_label() {
        let json = serde_json::to_string(&FunnelStage::Conversion).unwrap();
        assert_eq!(json, "\"전환(Conversion)\"");
        let parsed: FunnelStage = serde_json::from_str("\"Awareness\"").unwrap();
        assert_eq!(parsed, FunnelStage::Awareness);
    }
}
