//! Lifecycle states for categories and the assessment as a whole.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Progress of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    #[default]
    NotStarted,
    InProgress,
    Scored,
    Enriched,
}

impl CategoryStatus {
    /// Returns true if the category holds a deterministic score.
    pub fn is_scored(&self) -> bool {
        matches!(self, CategoryStatus::Scored | CategoryStatus::Enriched)
    }
}

impl StateMachine for CategoryStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CategoryStatus::*;
        matches!(
            (self, target),
            (NotStarted, InProgress) |
            (InProgress, Scored) |
            (Scored, Enriched) |
            // Revision
            (Scored, InProgress) |
            (Enriched, InProgress)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CategoryStatus::*;
        match self {
            NotStarted => vec![InProgress],
            InProgress => vec![Scored],
            Scored => vec![Enriched, InProgress],
            Enriched => vec![InProgress],
        }
    }
}

impl fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CategoryStatus::NotStarted => "Not Started",
            CategoryStatus::InProgress => "In Progress",
            CategoryStatus::Scored => "Scored",
            CategoryStatus::Enriched => "Enriched",
        };
        write!(f, "{}", s)
    }
}

/// Progress of the whole assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    #[default]
    Collecting,
    AllScored,
    FinalReportGenerated,
}

impl StateMachine for AssessmentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use AssessmentStatus::*;
        matches!(
            (self, target),
            (Collecting, AllScored) |
            (AllScored, FinalReportGenerated) |
            // Partial report
            (Collecting, FinalReportGenerated) |
            // Revision
            (AllScored, Collecting) |
            (FinalReportGenerated, Collecting) |
            (FinalReportGenerated, AllScored)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use AssessmentStatus::*;
        match self {
            Collecting => vec![AllScored, FinalReportGenerated],
            AllScored => vec![FinalReportGenerated, Collecting],
            FinalReportGenerated => vec![Collecting, AllScored],
        }
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssessmentStatus::Collecting => "Collecting",
            AssessmentStatus::AllScored => "All Scored",
            AssessmentStatus::FinalReportGenerated => "Final Report Generated",
        };
        write!(f, "{}", s)
    }
}
