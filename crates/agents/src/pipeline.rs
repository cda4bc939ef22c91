use campaign_core::error::{CampaignError, CampaignResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of one strategy-generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    ParseInput,
    AssembleContext,
    Plan,
    Validate,
    Optimize,
    Revalidate,
    FormatOutput,
    Persist,
    Complete,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParseInput => "parse_input",
            Self::AssembleContext => "assemble_context",
            Self::Plan => "plan",
            Self::Validate => "validate",
            Self::Optimize => "optimize",
            Self::Revalidate => "revalidate",
            Self::FormatOutput => "format_output",
            Self::Persist => "persist",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single valid stage transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTransition {
    pub from: PipelineStage,
    pub to: PipelineStage,
    pub trigger: String,
}

/// Guards stage order for one run. Starts in `ParseInput`.
#[derive(Debug, Clone)]
pub struct PipelineStateMachine {
    pub stage: PipelineStage,
    pub transitions: Vec<StageTransition>,
    history: Vec<PipelineStage>,
}

impl PipelineStateMachine {
    pub fn new() -> Self {
        use PipelineStage::*;
        let edge = |from, to, trigger: &str| StageTransition {
            from,
            to,
            trigger: trigger.to_string(),
        };

        let transitions = vec![
            edge(ParseInput, AssembleContext, "brief_parsed"),
            edge(AssembleContext, Plan, "context_ready"),
            edge(Plan, Validate, "plan_generated"),
            // Validate ->
            edge(Validate, Optimize, "grade_needs_optimization"),
            edge(Validate, FormatOutput, "grade_accepted"),
            edge(Optimize, Revalidate, "fixes_applied"),
            // Revalidate ->
            edge(Revalidate, Optimize, "another_pass"),
            edge(Revalidate, FormatOutput, "optimization_finished"),
            // FormatOutput ->
            edge(FormatOutput, Persist, "persist_requested"),
            edge(FormatOutput, Complete, "persist_skipped"),
            edge(Persist, Complete, "persisted"),
        ];

        Self {
            stage: ParseInput,
            transitions,
            history: vec![ParseInput],
        }
    }

    pub fn can_transition(&self, to: PipelineStage) -> bool {
        self.transitions
            .iter()
            .any(|t| t.from == self.stage && t.to == to)
    }

    /// Move to `to`, returning the trigger name of the edge taken.
    pub fn transition(&mut self, to: PipelineStage) -> CampaignResult<&str> {
        let from = self.stage;
        let edge = self
            .transitions
            .iter()
            .find(|t| t.from == from && t.to == to)
            .ok_or_else(|| {
                CampaignError::Pipeline(format!("invalid stage transition from {from} to {to}"))
            })?;
        self.stage = to;
        self.history.push(to);
        Ok(edge.trigger.as_str())
    }

    /// Stages visited so far, in order.
    pub fn history(&self) -> &[PipelineStage] {
        &self.history
    }

    pub fn is_complete(&self) -> bool {
        self.stage == PipelineStage::Complete
    }
}

impl Default for PipelineStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineStage::*;

    #[test]
    fn test_happy_path_without_optimization() {
        let mut sm = PipelineStateMachine::new();
        for stage in [AssembleContext, Plan, Validate, FormatOutput, Persist, Complete] {
            sm.transition(stage).unwrap();
        }
        assert!(sm.is_complete());
        assert_eq!(sm.history().len(), 7);
    }

    #[test]
    fn test_optimize_loop() {
        let mut sm = PipelineStateMachine::new();
        for stage in [AssembleContext, Plan, Validate, Optimize, Revalidate, Optimize, Revalidate, FormatOutput] {
            sm.transition(stage).unwrap();
        }
        assert_eq!(sm.stage, FormatOutput);
        assert_eq!(sm.transition(Complete).unwrap(), "persist_skipped");
    }

    #[test]
    fn test_invalid_transitions() {
        let mut sm = PipelineStateMachine::new();
        assert!(!sm.can_transition(Plan));
        let err = sm.transition(Validate).unwrap_err();
        assert!(matches!(err, CampaignError::Pipeline(_)));
        assert_eq!(sm.stage, ParseInput);

        sm.transition(AssembleContext).unwrap();
        sm.transition(Plan).unwrap();
        assert!(sm.transition(Optimize).is_err());
    }
}
