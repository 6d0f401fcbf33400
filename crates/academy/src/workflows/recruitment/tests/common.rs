use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::workflows::recruitment::domain::{
    Application, ApplicationId, ApplicationStatus, Attribute, Club, ClubId, ClubProfile,
    SkillAttributes, SubmitterId, TestResult, TestResultId, Trainee, TraineeId, TraineeProfile,
};
use crate::workflows::recruitment::memory::MemoryStore;
use crate::workflows::recruitment::scoring::ScoringConfig;
use crate::workflows::recruitment::service::RecruitmentService;
use crate::workflows::recruitment::store::{FinalClubCommit, RecruitmentStore, StoreError};
use crate::workflows::recruitment::router::recruitment_router;

pub(super) fn scoring_config() -> ScoringConfig {
    ScoringConfig { pass_threshold: 60 }
}

pub(super) fn build_service() -> (RecruitmentService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = RecruitmentService::new(store.clone(), scoring_config());
    (service, store)
}

pub(super) fn profile(name: &str) -> TraineeProfile {
    TraineeProfile {
        name: name.to_string(),
        birth_date: None,
        preferred_position: None,
        email: Some(format!("{}@example.org", name.to_lowercase().replace(' ', "."))),
        phone: None,
    }
}

pub(super) fn club_profile(name: &str) -> ClubProfile {
    ClubProfile {
        name: name.to_string(),
        city: Some("Leeds".to_string()),
    }
}

pub(super) fn scout() -> SubmitterId {
    SubmitterId("scout-7".to_string())
}

/// Quick but otherwise raw: overall mean of about 42.
pub(super) fn failing_sheet() -> SkillAttributes {
    SkillAttributes::uniform(40)
        .with(Attribute::Pace, 70)
        .with(Attribute::Stamina, 70)
}

/// Trainee with a passing test, ready to apply.
pub(super) fn tested_trainee(service: &RecruitmentService<MemoryStore>, name: &str) -> Trainee {
    let trainee = service.register_trainee(profile(name)).expect("registers");
    service
        .submit_test(&trainee.id, scout(), SkillAttributes::uniform(80), None)
        .expect("test accepted");
    trainee
}

pub(super) fn test_result(
    trainee: &str,
    attributes: SkillAttributes,
    created_at: DateTime<Utc>,
) -> TestResult {
    TestResult {
        id: TestResultId(format!("tst-{trainee}-{}", created_at.timestamp_millis())),
        trainee_id: TraineeId(trainee.to_string()),
        submitter_id: scout(),
        attributes,
        notes: None,
        created_at,
    }
}

pub(super) fn application_router_with_service(
    service: RecruitmentService<MemoryStore>,
) -> axum::Router {
    recruitment_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose every call fails as if the database were unreachable.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("database offline".to_string()))
}

impl RecruitmentStore for UnavailableStore {
    fn insert_trainee(&self, _trainee: Trainee) -> Result<Trainee, StoreError> {
        offline()
    }
    fn fetch_trainee(&self, _id: &TraineeId) -> Result<Option<Trainee>, StoreError> {
        offline()
    }
    fn trainees(&self) -> Result<Vec<Trainee>, StoreError> {
        offline()
    }
    fn insert_club(&self, _club: Club) -> Result<Club, StoreError> {
        offline()
    }
    fn fetch_club(&self, _id: &ClubId) -> Result<Option<Club>, StoreError> {
        offline()
    }
    fn record_test_result(&self, _result: TestResult) -> Result<Trainee, StoreError> {
        offline()
    }
    fn test_results(&self, _trainee_id: &TraineeId) -> Result<Vec<TestResult>, StoreError> {
        offline()
    }
    fn test_results_by_submitter(
        &self,
        _submitter_id: &SubmitterId,
    ) -> Result<Vec<TestResult>, StoreError> {
        offline()
    }
    fn insert_application(&self, _application: Application) -> Result<Application, StoreError> {
        offline()
    }
    fn fetch_application(&self, _id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        offline()
    }
    fn applications_for_trainee(
        &self,
        _trainee_id: &TraineeId,
    ) -> Result<Vec<Application>, StoreError> {
        offline()
    }
    fn applications_for_club(&self, _club_id: &ClubId) -> Result<Vec<Application>, StoreError> {
        offline()
    }
    fn applications(&self) -> Result<Vec<Application>, StoreError> {
        offline()
    }
    fn update_application(
        &self,
        _application: Application,
        _expected: ApplicationStatus,
        _require_uncommitted: bool,
    ) -> Result<Application, StoreError> {
        offline()
    }
    fn commit_final_club(
        &self,
        _trainee_id: &TraineeId,
        _club_id: &ClubId,
        _feedback: &str,
        _decided_at: DateTime<Utc>,
    ) -> Result<FinalClubCommit, StoreError> {
        offline()
    }
}
