use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, Club, ClubId, SubmitterId, TestResult, Trainee,
    TraineeId,
};
use super::store::{FinalClubCommit, RecruitmentStore, StoreError};

/// In-process store. A single mutex serializes every call, which gives each trait method the
/// transactional behavior the workflow relies on.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    trainees: HashMap<TraineeId, Trainee>,
    clubs: HashMap<ClubId, Club>,
    test_results: Vec<TestResult>,
    applications: Vec<Application>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl MemoryState {
    fn is_committed(&self, trainee_id: &TraineeId) -> bool {
        self.trainees
            .get(trainee_id)
            .is_some_and(|trainee| trainee.final_club_id.is_some())
    }
}

impl RecruitmentStore for MemoryStore {
    fn insert_trainee(&self, trainee: Trainee) -> Result<Trainee, StoreError> {
        let mut state = self.state()?;
        if state.trainees.contains_key(&trainee.id) {
            return Err(StoreError::Conflict);
        }
        state.trainees.insert(trainee.id.clone(), trainee.clone());
        Ok(trainee)
    }

    fn fetch_trainee(&self, id: &TraineeId) -> Result<Option<Trainee>, StoreError> {
        Ok(self.state()?.trainees.get(id).cloned())
    }

    fn trainees(&self) -> Result<Vec<Trainee>, StoreError> {
        let state = self.state()?;
        let mut trainees: Vec<Trainee> = state.trainees.values().cloned().collect();
        trainees.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(trainees)
    }

    fn insert_club(&self, club: Club) -> Result<Club, StoreError> {
        let mut state = self.state()?;
        if state.clubs.contains_key(&club.id) {
            return Err(StoreError::Conflict);
        }
        state.clubs.insert(club.id.clone(), club.clone());
        Ok(club)
    }

    fn fetch_club(&self, id: &ClubId) -> Result<Option<Club>, StoreError> {
        Ok(self.state()?.clubs.get(id).cloned())
    }

    fn record_test_result(&self, result: TestResult) -> Result<Trainee, StoreError> {
        let mut state = self.state()?;
        let trainee = state
            .trainees
            .get_mut(&result.trainee_id)
            .ok_or(StoreError::NotFound)?;
        trainee.status = trainee.status.after_test_submission();
        let updated = trainee.clone();
        state.test_results.push(result);
        Ok(updated)
    }

    fn test_results(&self, trainee_id: &TraineeId) -> Result<Vec<TestResult>, StoreError> {
        let state = self.state()?;
        Ok(state
            .test_results
            .iter()
            .filter(|result| result.trainee_id == *trainee_id)
            .cloned()
            .collect())
    }

    fn test_results_by_submitter(
        &self,
        submitter_id: &SubmitterId,
    ) -> Result<Vec<TestResult>, StoreError> {
        let state = self.state()?;
        Ok(state
            .test_results
            .iter()
            .filter(|result| result.submitter_id == *submitter_id)
            .cloned()
            .collect())
    }

    fn insert_application(&self, application: Application) -> Result<Application, StoreError> {
        let mut state = self.state()?;
        let duplicate = state.applications.iter().any(|existing| {
            existing.id == application.id
                || (existing.trainee_id == application.trainee_id
                    && existing.club_id == application.club_id)
        });
        if duplicate {
            return Err(StoreError::Conflict);
        }
        if state.is_committed(&application.trainee_id) {
            return Err(StoreError::Committed);
        }
        state.applications.push(application.clone());
        Ok(application)
    }

    fn fetch_application(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        let state = self.state()?;
        Ok(state
            .applications
            .iter()
            .find(|application| application.id == *id)
            .cloned())
    }

    fn applications_for_trainee(
        &self,
        trainee_id: &TraineeId,
    ) -> Result<Vec<Application>, StoreError> {
        let state = self.state()?;
        Ok(state
            .applications
            .iter()
            .filter(|application| application.trainee_id == *trainee_id)
            .cloned()
            .collect())
    }

    fn applications_for_club(&self, club_id: &ClubId) -> Result<Vec<Application>, StoreError> {
        let state = self.state()?;
        Ok(state
            .applications
            .iter()
            .filter(|application| application.club_id == *club_id)
            .cloned()
            .collect())
    }

    fn applications(&self) -> Result<Vec<Application>, StoreError> {
        Ok(self.state()?.applications.clone())
    }

    fn update_application(
        &self,
        application: Application,
        expected: ApplicationStatus,
        require_uncommitted: bool,
    ) -> Result<Application, StoreError> {
        let mut state = self.state()?;
        let index = state
            .applications
            .iter()
            .position(|existing| existing.id == application.id)
            .ok_or(StoreError::NotFound)?;
        let stored = &state.applications[index];
        if stored.status != expected {
            return Err(StoreError::Conflict);
        }
        if require_uncommitted && state.is_committed(&stored.trainee_id) {
            return Err(StoreError::Committed);
        }
        state.applications[index] = application.clone();
        Ok(application)
    }

    fn commit_final_club(
        &self,
        trainee_id: &TraineeId,
        club_id: &ClubId,
        feedback: &str,
        decided_at: DateTime<Utc>,
    ) -> Result<FinalClubCommit, StoreError> {
        let mut state = self.state()?;
        let MemoryState {
            trainees,
            applications,
            ..
        } = &mut *state;

        let trainee = trainees.get_mut(trainee_id).ok_or(StoreError::NotFound)?;
        if trainee.final_club_id.is_some() {
            return Err(StoreError::Conflict);
        }
        let accepted = applications.iter().any(|application| {
            application.trainee_id == *trainee_id
                && application.club_id == *club_id
                && application.status == ApplicationStatus::Accepted
        });
        if !accepted {
            return Err(StoreError::Conflict);
        }

        // Every check passed; nothing below can fail, so the commit is all or nothing.
        trainee.final_club_id = Some(club_id.clone());
        let mut superseded = Vec::new();
        for application in applications.iter_mut().filter(|application| {
            application.trainee_id == *trainee_id
                && application.club_id != *club_id
                && application.status == ApplicationStatus::Accepted
        }) {
            application.status = ApplicationStatus::Rejected;
            application.feedback = Some(feedback.to_string());
            application.decided_at = Some(decided_at);
            superseded.push(application.clone());
        }

        Ok(FinalClubCommit {
            trainee: trainee.clone(),
            superseded,
        })
    }
}
