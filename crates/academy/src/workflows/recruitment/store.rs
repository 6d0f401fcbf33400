use chrono::{DateTime, Utc};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, Club, ClubId, SubmitterId, TestResult, Trainee,
    TraineeId,
};

/// Storage abstraction over the relational store.
///
/// Every method is one atomic unit: implementations must run the check and the write of a
/// conditional method under the same transaction (or equivalent lock) so that concurrent callers
/// cannot both satisfy a stale precondition.
pub trait RecruitmentStore: Send + Sync {
    fn insert_trainee(&self, trainee: Trainee) -> Result<Trainee, StoreError>;
    fn fetch_trainee(&self, id: &TraineeId) -> Result<Option<Trainee>, StoreError>;
    fn trainees(&self) -> Result<Vec<Trainee>, StoreError>;

    fn insert_club(&self, club: Club) -> Result<Club, StoreError>;
    fn fetch_club(&self, id: &ClubId) -> Result<Option<Club>, StoreError>;

    /// Persist the result and move the owning trainee to its post-submission status.
    /// `NotFound` when the trainee does not exist.
    fn record_test_result(&self, result: TestResult) -> Result<Trainee, StoreError>;
    /// Results for a trainee, oldest first.
    fn test_results(&self, trainee_id: &TraineeId) -> Result<Vec<TestResult>, StoreError>;
    fn test_results_by_submitter(
        &self,
        submitter_id: &SubmitterId,
    ) -> Result<Vec<TestResult>, StoreError>;

    /// `Conflict` when any application already exists for the (trainee, club) pair;
    /// `Committed` when the trainee already holds a final club.
    fn insert_application(&self, application: Application) -> Result<Application, StoreError>;
    fn fetch_application(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError>;
    fn applications_for_trainee(
        &self,
        trainee_id: &TraineeId,
    ) -> Result<Vec<Application>, StoreError>;
    fn applications_for_club(&self, club_id: &ClubId) -> Result<Vec<Application>, StoreError>;
    fn applications(&self) -> Result<Vec<Application>, StoreError>;

    /// Compare-and-set: replaces the stored row only while its status still equals `expected`,
    /// otherwise `Conflict`. With `require_uncommitted`, also `Committed` when the owning trainee
    /// already holds a final club.
    fn update_application(
        &self,
        application: Application,
        expected: ApplicationStatus,
        require_uncommitted: bool,
    ) -> Result<Application, StoreError>;

    /// Guarded multi-row commit. Sets the trainee's final club and rejects every other accepted
    /// application of the trainee with `feedback`, all or nothing. `Conflict` when the trainee
    /// already holds a final club or the pair's application is no longer accepted.
    fn commit_final_club(
        &self,
        trainee_id: &TraineeId,
        club_id: &ClubId,
        feedback: &str,
        decided_at: DateTime<Utc>,
    ) -> Result<FinalClubCommit, StoreError>;
}

/// Rows written by [`RecruitmentStore::commit_final_club`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalClubCommit {
    pub trainee: Trainee,
    pub superseded: Vec<Application>,
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record conflicts with existing state")]
    Conflict,
    #[error("trainee already committed to a final club")]
    Committed,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The write may or may not have landed; re-read before retrying.
    #[error("store call timed out; outcome unknown")]
    Timeout,
}
