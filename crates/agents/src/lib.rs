//! Planning agents and the orchestrator that chains them: planner, critic,
//! optimizer, pipeline state machine, output record, and persistence.

pub mod checks;
pub mod critic;
pub mod generator;
pub mod optimizer;
pub mod output;
pub mod pipeline;
pub mod planner;
pub mod sink;

pub use checks::CheckRegistry;
pub use critic::CriticAgent;
pub use generator::StrategyGenerator;
pub use optimizer::{OptimizationReport, OptimizerAgent};
pub use output::StrategyOutput;
pub use pipeline::{PipelineStage, PipelineStateMachine};
pub use planner::PlannerAgent;
pub use sink::{JsonFileSink, StrategySink};
