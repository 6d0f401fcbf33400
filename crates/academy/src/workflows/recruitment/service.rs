use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationView, Club, ClubId, ClubProfile,
    DecisionOutcome, SkillAttributes, StatusView, SubmitterId, TestResult, TestResultId, Trainee,
    TraineeId, TraineeProfile, TraineeStatus, SUPERSEDED_FEEDBACK,
};
use super::position::{position_fit, PositionFit};
use super::projection::{self, DashboardSummary, ProjectionInput, Viewer};
use super::scoring::{self, AttributeError, CategoryScores, ScoringConfig};
use super::status::{self, Ineligibility};
use super::store::{RecruitmentStore, StoreError};

static TRAINEE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static CLUB_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static TEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_id(sequence: &AtomicU64, prefix: &str) -> String {
    let id = sequence.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:06}")
}

/// Service composing the store with the scoring rules and the workflow state machines.
///
/// Caller identity is always explicit: every operation names the trainee, club, or submitter it
/// acts for.
pub struct RecruitmentService<S> {
    store: Arc<S>,
    config: ScoringConfig,
}

impl<S> RecruitmentService<S>
where
    S: RecruitmentStore + 'static,
{
    pub fn new(store: Arc<S>, config: ScoringConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn register_trainee(&self, profile: TraineeProfile) -> Result<Trainee, RecruitmentError> {
        if profile.name.trim().is_empty() {
            return Err(RecruitmentError::Validation(
                "trainee name must not be blank".to_string(),
            ));
        }

        let trainee = Trainee {
            id: TraineeId(next_id(&TRAINEE_SEQUENCE, "trn")),
            profile,
            status: TraineeStatus::PendingTest,
            final_club_id: None,
            registered_at: Utc::now(),
        };
        let stored = self.store.insert_trainee(trainee)?;
        info!(trainee_id = %stored.id, "trainee registered");
        Ok(stored)
    }

    pub fn register_club(&self, profile: ClubProfile) -> Result<Club, RecruitmentError> {
        if profile.name.trim().is_empty() {
            return Err(RecruitmentError::Validation(
                "club name must not be blank".to_string(),
            ));
        }

        let club = Club {
            id: ClubId(next_id(&CLUB_SEQUENCE, "club")),
            profile,
            registered_at: Utc::now(),
        };
        let stored = self.store.insert_club(club)?;
        info!(club_id = %stored.id, "club registered");
        Ok(stored)
    }

    /// Store an evaluator's attribute sheet and complete the trainee's testing.
    pub fn submit_test(
        &self,
        trainee_id: &TraineeId,
        submitter_id: SubmitterId,
        attributes: SkillAttributes,
        notes: Option<String>,
    ) -> Result<TestResult, RecruitmentError> {
        if submitter_id.0.trim().is_empty() {
            return Err(RecruitmentError::Validation(
                "submitter id must not be blank".to_string(),
            ));
        }
        scoring::validate(&attributes)?;
        let previous = self.trainee(trainee_id)?.status;

        let result = TestResult {
            id: TestResultId(next_id(&TEST_SEQUENCE, "tst")),
            trainee_id: trainee_id.clone(),
            submitter_id,
            attributes,
            notes: notes.filter(|text| !text.trim().is_empty()),
            created_at: Utc::now(),
        };

        let trainee = self
            .store
            .record_test_result(result.clone())
            .map_err(|err| match err {
                StoreError::NotFound => RecruitmentError::TraineeNotFound(trainee_id.clone()),
                other => other.into(),
            })?;

        if previous != trainee.status {
            info!(
                trainee_id = %trainee.id,
                from = previous.label(),
                to = trainee.status.label(),
                "trainee status transitioned"
            );
        }
        info!(trainee_id = %trainee.id, test_id = %result.id.0, "test result recorded");
        Ok(result)
    }

    pub fn status(&self, trainee_id: &TraineeId) -> Result<StatusView, RecruitmentError> {
        Ok(self.trainee(trainee_id)?.status_view())
    }

    /// Create a pending application for the pair.
    pub fn apply(
        &self,
        trainee_id: &TraineeId,
        club_id: &ClubId,
    ) -> Result<Application, RecruitmentError> {
        let trainee = self.trainee(trainee_id)?;
        self.club(club_id)?;

        // A row for the pair blocks reapplication whatever its status, so this check runs
        // before eligibility.
        let existing = self.store.applications_for_trainee(trainee_id)?;
        if existing
            .iter()
            .any(|application| application.club_id == *club_id)
        {
            return Err(self.already_applied(trainee_id, club_id));
        }

        let results = self.store.test_results(trainee_id)?;
        let has_passed = scoring::has_ever_passed(&results, &self.config)?;
        if let Err(reason) =
            status::check_can_apply(&trainee, has_passed, self.config.pass_threshold)
        {
            return Err(self.not_eligible(trainee_id, reason));
        }

        let application = Application {
            id: ApplicationId(next_id(&APPLICATION_SEQUENCE, "app")),
            trainee_id: trainee_id.clone(),
            club_id: club_id.clone(),
            status: ApplicationStatus::Pending,
            submitted_at: Utc::now(),
            decided_at: None,
            feedback: None,
        };

        match self.store.insert_application(application) {
            Ok(stored) => {
                info!(
                    trainee_id = %trainee_id,
                    club_id = %club_id,
                    application_id = %stored.id,
                    "application submitted"
                );
                Ok(stored)
            }
            Err(StoreError::Conflict) => Err(self.already_applied(trainee_id, club_id)),
            Err(StoreError::Committed) => Err(self.committed_elsewhere(trainee_id)),
            Err(other) => Err(other.into()),
        }
    }

    /// Record a club's decision on a pending application.
    pub fn decide(
        &self,
        application_id: &ApplicationId,
        outcome: DecisionOutcome,
        feedback: Option<String>,
    ) -> Result<Application, RecruitmentError> {
        let current = self
            .store
            .fetch_application(application_id)?
            .ok_or_else(|| RecruitmentError::ApplicationNotFound(application_id.clone()))?;
        let target = ApplicationStatus::from(outcome);

        if current.status != ApplicationStatus::Pending {
            return Err(self.invalid_transition(&current, target));
        }

        if target == ApplicationStatus::Accepted {
            let trainee = self.trainee(&current.trainee_id)?;
            if let Err(reason) = status::check_uncommitted(&trainee) {
                return Err(self.not_eligible(&current.trainee_id, reason));
            }
        }

        let decided = Application {
            status: target,
            decided_at: Some(Utc::now()),
            feedback: feedback.filter(|text| !text.trim().is_empty()),
            ..current.clone()
        };

        let require_uncommitted = target == ApplicationStatus::Accepted;
        match self
            .store
            .update_application(decided, ApplicationStatus::Pending, require_uncommitted)
        {
            Ok(stored) => {
                info!(
                    application_id = %stored.id,
                    trainee_id = %stored.trainee_id,
                    club_id = %stored.club_id,
                    status = stored.status.label(),
                    "application decided"
                );
                Ok(stored)
            }
            Err(StoreError::Conflict) => {
                // Another decision landed first; report against what is stored now.
                let latest = self
                    .store
                    .fetch_application(application_id)?
                    .unwrap_or(current);
                Err(self.invalid_transition(&latest, target))
            }
            Err(StoreError::Committed) => Err(self.committed_elsewhere(&current.trainee_id)),
            Err(StoreError::NotFound) => Err(RecruitmentError::ApplicationNotFound(
                application_id.clone(),
            )),
            Err(other) => Err(other.into()),
        }
    }

    /// Commit the trainee to one of the clubs that accepted them.
    pub fn finalize(
        &self,
        trainee_id: &TraineeId,
        club_id: &ClubId,
    ) -> Result<FinalSelection, RecruitmentError> {
        let trainee = self.trainee(trainee_id)?;
        if let Err(reason) = status::check_uncommitted(&trainee) {
            return Err(self.not_eligible(trainee_id, reason));
        }

        let accepted = self
            .store
            .applications_for_trainee(trainee_id)?
            .into_iter()
            .any(|application| {
                application.club_id == *club_id && application.status == ApplicationStatus::Accepted
            });
        if !accepted {
            return Err(self.not_eligible(
                trainee_id,
                Ineligibility::NoAcceptedApplication {
                    club_id: club_id.clone(),
                },
            ));
        }

        match self
            .store
            .commit_final_club(trainee_id, club_id, SUPERSEDED_FEEDBACK, Utc::now())
        {
            Ok(commit) => {
                info!(
                    trainee_id = %trainee_id,
                    club_id = %club_id,
                    superseded = commit.superseded.len(),
                    "final club committed"
                );
                Ok(FinalSelection {
                    trainee_id: trainee_id.clone(),
                    final_club_id: club_id.clone(),
                    superseded: commit
                        .superseded
                        .into_iter()
                        .map(|application| application.id)
                        .collect(),
                })
            }
            Err(StoreError::Conflict) => {
                // Lost a race: either a concurrent finalize won or the acceptance vanished.
                let reason = match self.trainee(trainee_id)?.final_club_id {
                    Some(club_id) => Ineligibility::FinalClubChosen { club_id },
                    None => Ineligibility::NoAcceptedApplication {
                        club_id: club_id.clone(),
                    },
                };
                Err(self.not_eligible(trainee_id, reason))
            }
            Err(StoreError::NotFound) => Err(RecruitmentError::TraineeNotFound(trainee_id.clone())),
            Err(other) => Err(other.into()),
        }
    }

    /// Category averages of the latest result; zeros before any test.
    pub fn category_scores(
        &self,
        trainee_id: &TraineeId,
    ) -> Result<CategoryScores, RecruitmentError> {
        self.trainee(trainee_id)?;
        let results = self.store.test_results(trainee_id)?;
        Ok(scoring::category_scores(scoring::latest(&results))?)
    }

    pub fn position_fit(&self, trainee_id: &TraineeId) -> Result<PositionFit, RecruitmentError> {
        self.trainee(trainee_id)?;
        let results = self.store.test_results(trainee_id)?;
        let latest = scoring::latest(&results)
            .ok_or_else(|| RecruitmentError::TestResultMissing(trainee_id.clone()))?;
        Ok(position_fit(&latest.attributes))
    }

    pub fn applications_for_trainee(
        &self,
        trainee_id: &TraineeId,
    ) -> Result<Vec<ApplicationView>, RecruitmentError> {
        let trainee = self.trainee(trainee_id)?;
        let applications = self.store.applications_for_trainee(trainee_id)?;
        Ok(applications
            .iter()
            .map(|application| application.view(trainee.final_club_id.as_ref()))
            .collect())
    }

    pub fn applications_for_club(
        &self,
        club_id: &ClubId,
    ) -> Result<Vec<ApplicationView>, RecruitmentError> {
        self.club(club_id)?;
        let applications = self.store.applications_for_club(club_id)?;
        let mut views = Vec::with_capacity(applications.len());
        for application in &applications {
            let final_club = self
                .store
                .fetch_trainee(&application.trainee_id)?
                .and_then(|trainee| trainee.final_club_id);
            views.push(application.view(final_club.as_ref()));
        }
        Ok(views)
    }

    /// Trainees whose final club is `club_id`.
    pub fn team(&self, club_id: &ClubId) -> Result<Vec<Trainee>, RecruitmentError> {
        self.club(club_id)?;
        Ok(self
            .store
            .trainees()?
            .into_iter()
            .filter(|trainee| trainee.final_club_id.as_ref() == Some(club_id))
            .collect())
    }

    /// Everything a trainee report page shows, in one read.
    pub fn trainee_report(&self, trainee_id: &TraineeId) -> Result<TraineeReport, RecruitmentError> {
        let trainee = self.trainee(trainee_id)?;
        let results = self.store.test_results(trainee_id)?;
        let latest = scoring::latest(&results);
        let scores = scoring::category_scores(latest)?;
        let overall_average = match latest {
            Some(result) => scoring::overall_average(&result.attributes)?,
            None => 0,
        };
        let passed = scoring::has_ever_passed(&results, &self.config)?;
        let applications = self
            .store
            .applications_for_trainee(trainee_id)?
            .iter()
            .map(|application| application.view(trainee.final_club_id.as_ref()))
            .collect();

        Ok(TraineeReport {
            trainee_id: trainee.id.clone(),
            name: trainee.profile.name.clone(),
            status: trainee.status,
            final_club_id: trainee.final_club_id.clone(),
            tests_taken: results.len(),
            scores,
            overall_average,
            passed,
            position_fit: latest.map(|result| position_fit(&result.attributes)),
            applications,
        })
    }

    /// Viewer-scoped counts over the current rows.
    pub fn dashboard(&self, viewer: &Viewer) -> Result<DashboardSummary, RecruitmentError> {
        let trainees = self.store.trainees()?;
        let applications = self.store.applications()?;
        let tested_by = match viewer {
            Viewer::Scout(submitter_id) => self.store.test_results_by_submitter(submitter_id)?,
            _ => Vec::new(),
        };

        Ok(projection::summarize(
            viewer,
            &ProjectionInput {
                trainees: &trainees,
                applications: &applications,
                tested_by: &tested_by,
            },
        ))
    }

    fn trainee(&self, trainee_id: &TraineeId) -> Result<Trainee, RecruitmentError> {
        self.store
            .fetch_trainee(trainee_id)?
            .ok_or_else(|| RecruitmentError::TraineeNotFound(trainee_id.clone()))
    }

    fn club(&self, club_id: &ClubId) -> Result<Club, RecruitmentError> {
        self.store
            .fetch_club(club_id)?
            .ok_or_else(|| RecruitmentError::ClubNotFound(club_id.clone()))
    }

    fn already_applied(&self, trainee_id: &TraineeId, club_id: &ClubId) -> RecruitmentError {
        warn!(trainee_id = %trainee_id, club_id = %club_id, "duplicate application rejected");
        RecruitmentError::AlreadyApplied {
            trainee_id: trainee_id.clone(),
            club_id: club_id.clone(),
        }
    }

    fn not_eligible(&self, trainee_id: &TraineeId, reason: Ineligibility) -> RecruitmentError {
        warn!(trainee_id = %trainee_id, %reason, "workflow step rejected");
        RecruitmentError::NotEligible(reason)
    }

    /// The store refused a write because the trainee committed in the meantime.
    fn committed_elsewhere(&self, trainee_id: &TraineeId) -> RecruitmentError {
        match self.trainee(trainee_id) {
            Ok(Trainee {
                final_club_id: Some(club_id),
                ..
            }) => self.not_eligible(trainee_id, Ineligibility::FinalClubChosen { club_id }),
            Ok(_) => StoreError::Committed.into(),
            Err(err) => err,
        }
    }

    fn invalid_transition(
        &self,
        application: &Application,
        target: ApplicationStatus,
    ) -> RecruitmentError {
        warn!(
            application_id = %application.id,
            from = application.status.label(),
            to = target.label(),
            "invalid application transition"
        );
        RecruitmentError::InvalidTransition {
            application_id: application.id.clone(),
            from: application.status,
            to: target,
        }
    }
}

/// Result of a successful finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalSelection {
    pub trainee_id: TraineeId,
    pub final_club_id: ClubId,
    /// Applications moved from accepted to rejected by this commit.
    pub superseded: Vec<ApplicationId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraineeReport {
    pub trainee_id: TraineeId,
    pub name: String,
    pub status: TraineeStatus,
    pub final_club_id: Option<ClubId>,
    pub tests_taken: usize,
    pub scores: CategoryScores,
    pub overall_average: u8,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_fit: Option<PositionFit>,
    pub applications: Vec<ApplicationView>,
}

/// Error raised by the recruitment service.
#[derive(Debug, thiserror::Error)]
pub enum RecruitmentError {
    #[error(transparent)]
    InvalidAttributeData(#[from] AttributeError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("trainee {trainee_id} already applied to club {club_id}")]
    AlreadyApplied {
        trainee_id: TraineeId,
        club_id: ClubId,
    },
    #[error("not eligible: {0}")]
    NotEligible(Ineligibility),
    #[error("application {application_id} cannot move from {} to {}", .from.label(), .to.label())]
    InvalidTransition {
        application_id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("trainee {0} not found")]
    TraineeNotFound(TraineeId),
    #[error("club {0} not found")]
    ClubNotFound(ClubId),
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("trainee {0} has no test result")]
    TestResultMissing(TraineeId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RecruitmentError {
    /// Stable reason code for API payloads.
    pub const fn code(&self) -> &'static str {
        match self {
            RecruitmentError::InvalidAttributeData(_) => "invalid_attribute_data",
            RecruitmentError::Validation(_) => "validation_failed",
            RecruitmentError::AlreadyApplied { .. } => "already_applied",
            RecruitmentError::NotEligible(_) => "not_eligible",
            RecruitmentError::InvalidTransition { .. } => "invalid_transition",
            RecruitmentError::TraineeNotFound(_) => "trainee_not_found",
            RecruitmentError::ClubNotFound(_) => "club_not_found",
            RecruitmentError::ApplicationNotFound(_) => "application_not_found",
            RecruitmentError::TestResultMissing(_) => "test_result_missing",
            RecruitmentError::Store(StoreError::Timeout) => "store_timeout",
            RecruitmentError::Store(_) => "store_error",
        }
    }
}
