//! Shared data model for the campaign strategist: briefs, plans, validation
//! results, configuration, and the error type.

pub mod brief;
pub mod config;
pub mod error;
pub mod parsing;
pub mod strategy;
pub mod validation;

pub use brief::{CampaignBrief, CampaignGoal, FunnelStage, InputParser, KpiKind};
pub use config::AppConfig;
pub use error::{CampaignError, CampaignResult};
pub use strategy::CampaignStrategy;
pub use validation::{CheckOutcome, Grade, Severity, ValidationResult};
