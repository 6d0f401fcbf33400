//! Trainee testing, club applications, and final-club commitment.
//!
//! Scoring (`scoring`, `position`) is pure. The workflow (`service`) runs every
//! check-then-write step as one atomic `RecruitmentStore` call so concurrent callers cannot
//! both win a stale precondition.

pub mod domain;
pub mod memory;
pub mod position;
pub mod projection;
pub mod router;
pub mod scoring;
pub mod service;
pub mod status;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationView, Attribute, AttributeCategory,
    Club, ClubId, ClubProfile, DecisionOutcome, SkillAttributes, StatusView, SubmitterId,
    TestResult, TestResultId, Trainee, TraineeId, TraineeProfile, TraineeStatus,
    SUPERSEDED_FEEDBACK,
};
pub use memory::MemoryStore;
pub use position::{Position, PositionFit, PositionScore};
pub use projection::{ApplicationCounts, DashboardSummary, Viewer};
pub use router::recruitment_router;
pub use scoring::{AttributeError, CategoryScores, ScoringConfig};
pub use service::{FinalSelection, RecruitmentError, RecruitmentService, TraineeReport};
pub use status::Ineligibility;
pub use store::{FinalClubCommit, RecruitmentStore, StoreError};
