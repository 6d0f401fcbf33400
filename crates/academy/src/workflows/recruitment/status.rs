use serde::Serialize;

use super::domain::{ClubId, Trainee, TraineeStatus};

impl TraineeStatus {
    /// Any stored test completes testing; the pass threshold never gates this field.
    pub const fn after_test_submission(self) -> TraineeStatus {
        TraineeStatus::TestCompleted
    }

    pub const fn is_test_completed(self) -> bool {
        matches!(self, TraineeStatus::TestCompleted)
    }
}

/// Why a trainee may not take the requested step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Ineligibility {
    #[error("trainee has not completed a skill test")]
    TestPending,
    #[error("trainee has never reached the pass threshold of {threshold}")]
    TestNotPassed { threshold: u8 },
    #[error("trainee already committed to club {club_id}")]
    FinalClubChosen { club_id: ClubId },
    #[error("no accepted application for club {club_id}")]
    NoAcceptedApplication { club_id: ClubId },
}

/// Guard for creating an application.
pub(crate) fn check_can_apply(
    trainee: &Trainee,
    has_passed: bool,
    pass_threshold: u8,
) -> Result<(), Ineligibility> {
    if !trainee.status.is_test_completed() {
        return Err(Ineligibility::TestPending);
    }
    if !has_passed {
        return Err(Ineligibility::TestNotPassed {
            threshold: pass_threshold,
        });
    }
    check_uncommitted(trainee)
}

/// Guard shared by acceptance and finalization: the final club is immutable once set.
pub(crate) fn check_uncommitted(trainee: &Trainee) -> Result<(), Ineligibility> {
    match &trainee.final_club_id {
        Some(club_id) => Err(Ineligibility::FinalClubChosen {
            club_id: club_id.clone(),
        }),
        None => Ok(()),
    }
}
