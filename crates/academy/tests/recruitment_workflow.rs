//! End-to-end scenarios through the public service facade, including concurrent callers racing
//! the same precondition.

mod common {
    use std::sync::Arc;

    use academy::workflows::recruitment::{
        Club, ClubProfile, MemoryStore, RecruitmentService, ScoringConfig, SkillAttributes,
        SubmitterId, Trainee, TraineeProfile,
    };

    pub(super) type Service = RecruitmentService<MemoryStore>;

    pub(super) fn build_service() -> (Arc<Service>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = Arc::new(RecruitmentService::new(
            store.clone(),
            ScoringConfig::default(),
        ));
        (service, store)
    }

    pub(super) fn trainee(service: &Service, name: &str) -> Trainee {
        service
            .register_trainee(TraineeProfile {
                name: name.to_string(),
                birth_date: None,
                preferred_position: None,
                email: None,
                phone: None,
            })
            .expect("trainee registers")
    }

    pub(super) fn club(service: &Service, name: &str) -> Club {
        service
            .register_club(ClubProfile {
                name: name.to_string(),
                city: None,
            })
            .expect("club registers")
    }

    pub(super) fn tested(service: &Service, name: &str, score: i32) -> Trainee {
        let trainee = trainee(service, name);
        service
            .submit_test(
                &trainee.id,
                SubmitterId("scout-1".to_string()),
                SkillAttributes::uniform(score),
                None,
            )
            .expect("test recorded");
        trainee
    }
}

mod workflow {
    use super::common::*;
    use academy::workflows::recruitment::{
        ApplicationStatus, DecisionOutcome, Ineligibility, RecruitmentError, RecruitmentStore,
        TraineeStatus, SUPERSEDED_FEEDBACK,
    };

    #[test]
    fn trainee_moves_from_test_to_final_club() {
        let (service, store) = build_service();
        let ada = tested(&service, "Ada Mensah", 80);
        assert_eq!(
            service.status(&ada.id).expect("status").status,
            TraineeStatus::TestCompleted
        );

        let harbour = club(&service, "Harbour FC");
        let northgate = club(&service, "Northgate United");
        let first = service.apply(&ada.id, &harbour.id).expect("apply harbour");
        let second = service.apply(&ada.id, &northgate.id).expect("apply northgate");
        assert_eq!(first.status, ApplicationStatus::Pending);
        assert_eq!(second.status, ApplicationStatus::Pending);

        service
            .decide(&first.id, DecisionOutcome::Accepted, None)
            .expect("harbour accepts");
        service
            .decide(&second.id, DecisionOutcome::Accepted, None)
            .expect("northgate accepts");

        service.finalize(&ada.id, &harbour.id).expect("finalize");
        let northgate_row = store
            .fetch_application(&second.id)
            .expect("fetch")
            .expect("row exists");
        assert_eq!(northgate_row.status, ApplicationStatus::Rejected);
        assert_eq!(northgate_row.feedback.as_deref(), Some(SUPERSEDED_FEEDBACK));

        assert!(matches!(
            service.finalize(&ada.id, &northgate.id),
            Err(RecruitmentError::NotEligible(
                Ineligibility::FinalClubChosen { .. }
            ))
        ));

        let report = service.trainee_report(&ada.id).expect("report");
        assert_eq!(report.final_club_id, Some(harbour.id.clone()));
        assert_eq!(report.tests_taken, 1);
        assert!(report.position_fit.is_some());
        assert_eq!(report.applications.len(), 2);
    }

    #[test]
    fn rejected_trainee_cannot_reapply() {
        let (service, _) = build_service();
        let ben = tested(&service, "Ben Kane", 72);
        let harbour = club(&service, "Harbour FC");

        let application = service.apply(&ben.id, &harbour.id).expect("apply");
        service
            .decide(&application.id, DecisionOutcome::Rejected, None)
            .expect("reject");

        assert!(matches!(
            service.apply(&ben.id, &harbour.id),
            Err(RecruitmentError::AlreadyApplied { .. })
        ));
    }
}

mod concurrency {
    use super::common::*;
    use academy::workflows::recruitment::{
        ApplicationStatus, DecisionOutcome, RecruitmentError, RecruitmentStore,
    };
    use std::sync::{Arc, Barrier};
    use std::thread;

    const RACERS: usize = 8;

    #[test]
    fn concurrent_applies_create_exactly_one_row() {
        let (service, store) = build_service();
        let ada = tested(&service, "Ada Mensah", 80);
        let harbour = club(&service, "Harbour FC");
        let barrier = Arc::new(Barrier::new(RACERS));

        let handles: Vec<_> = (0..RACERS)
            .map(|_| {
                let service = service.clone();
                let barrier = barrier.clone();
                let trainee_id = ada.id.clone();
                let club_id = harbour.id.clone();
                thread::spawn(move || {
                    barrier.wait();
                    service.apply(&trainee_id, &club_id)
                })
            })
            .collect();

        let outcomes: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect();

        let created = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
        let duplicates = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, Err(RecruitmentError::AlreadyApplied { .. })))
            .count();
        assert_eq!(created, 1);
        assert_eq!(duplicates, RACERS - 1);
        assert_eq!(
            store
                .applications_for_trainee(&ada.id)
                .expect("applications")
                .len(),
            1
        );
    }

    #[test]
    fn concurrent_finalizes_commit_once() {
        let (service, store) = build_service();
        let ada = tested(&service, "Ada Mensah", 80);
        let clubs: Vec<_> = (0..RACERS)
            .map(|index| club(&service, &format!("Club {index}")))
            .collect();
        for club in &clubs {
            let application = service.apply(&ada.id, &club.id).expect("apply");
            service
                .decide(&application.id, DecisionOutcome::Accepted, None)
                .expect("accept");
        }

        let barrier = Arc::new(Barrier::new(RACERS));
        let handles: Vec<_> = clubs
            .iter()
            .map(|club| {
                let service = service.clone();
                let barrier = barrier.clone();
                let trainee_id = ada.id.clone();
                let club_id = club.id.clone();
                thread::spawn(move || {
                    barrier.wait();
                    service.finalize(&trainee_id, &club_id)
                })
            })
            .collect();

        let outcomes: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect();

        let winners: Vec<_> = outcomes.iter().filter_map(|outcome| outcome.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);
        assert!(outcomes
            .iter()
            .filter(|outcome| outcome.is_err())
            .all(|outcome| matches!(outcome, Err(RecruitmentError::NotEligible(_)))));

        let final_club = service
            .status(&ada.id)
            .expect("status")
            .final_club_id
            .expect("final club set");
        assert_eq!(final_club, winners[0].final_club_id);

        let accepted: Vec<_> = store
            .applications_for_trainee(&ada.id)
            .expect("applications")
            .into_iter()
            .filter(|application| application.status == ApplicationStatus::Accepted)
            .collect();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].club_id, final_club);
    }

    #[test]
    fn concurrent_decisions_leave_one_winner() {
        let (service, _) = build_service();
        let ada = tested(&service, "Ada Mensah", 80);
        let harbour = club(&service, "Harbour FC");
        let application = service.apply(&ada.id, &harbour.id).expect("apply");
        let barrier = Arc::new(Barrier::new(RACERS));

        let handles: Vec<_> = (0..RACERS)
            .map(|index| {
                let service = service.clone();
                let barrier = barrier.clone();
                let application_id = application.id.clone();
                let outcome = if index % 2 == 0 {
                    DecisionOutcome::Accepted
                } else {
                    DecisionOutcome::Rejected
                };
                thread::spawn(move || {
                    barrier.wait();
                    service.decide(&application_id, outcome, None)
                })
            })
            .collect();

        let outcomes: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect();
        assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .filter(|outcome| outcome.is_err())
            .all(|outcome| matches!(outcome, Err(RecruitmentError::InvalidTransition { .. }))));
    }
}

mod interleaving {
    use std::sync::{Arc, Barrier, Mutex};
    use std::thread;

    use academy::workflows::recruitment::{
        Application, ApplicationId, ApplicationStatus, Club, ClubId, ClubProfile, DecisionOutcome,
        FinalClubCommit, Ineligibility, MemoryStore, RecruitmentError, RecruitmentService,
        RecruitmentStore, ScoringConfig, SkillAttributes, StoreError, SubmitterId, TestResult,
        Trainee, TraineeId, TraineeProfile, SUPERSEDED_FEEDBACK,
    };
    use chrono::{DateTime, Utc};

    use super::common::{build_service, club, tested};

    /// Commits a queued final club just before the next application write reaches the store.
    #[derive(Default)]
    struct FinalizeBeforeWrite {
        inner: MemoryStore,
        queued: Mutex<Option<(TraineeId, ClubId)>>,
    }

    impl FinalizeBeforeWrite {
        fn queue(&self, trainee_id: &TraineeId, club_id: &ClubId) {
            *self.queued.lock().expect("queue lock") = Some((trainee_id.clone(), club_id.clone()));
        }

        fn commit_queued(&self) -> Result<(), StoreError> {
            let queued = self.queued.lock().expect("queue lock").take();
            if let Some((trainee_id, club_id)) = queued {
                self.inner
                    .commit_final_club(&trainee_id, &club_id, SUPERSEDED_FEEDBACK, Utc::now())?;
            }
            Ok(())
        }
    }

    impl RecruitmentStore for FinalizeBeforeWrite {
        fn insert_trainee(&self, trainee: Trainee) -> Result<Trainee, StoreError> {
            self.inner.insert_trainee(trainee)
        }
        fn fetch_trainee(&self, id: &TraineeId) -> Result<Option<Trainee>, StoreError> {
            self.inner.fetch_trainee(id)
        }
        fn trainees(&self) -> Result<Vec<Trainee>, StoreError> {
            self.inner.trainees()
        }
        fn insert_club(&self, club: Club) -> Result<Club, StoreError> {
            self.inner.insert_club(club)
        }
        fn fetch_club(&self, id: &ClubId) -> Result<Option<Club>, StoreError> {
            self.inner.fetch_club(id)
        }
        fn record_test_result(&self, result: TestResult) -> Result<Trainee, StoreError> {
            self.inner.record_test_result(result)
        }
        fn test_results(&self, trainee_id: &TraineeId) -> Result<Vec<TestResult>, StoreError> {
            self.inner.test_results(trainee_id)
        }
        fn test_results_by_submitter(
            &self,
            submitter_id: &SubmitterId,
        ) -> Result<Vec<TestResult>, StoreError> {
            self.inner.test_results_by_submitter(submitter_id)
        }
        fn insert_application(&self, application: Application) -> Result<Application, StoreError> {
            self.commit_queued()?;
            self.inner.insert_application(application)
        }
        fn fetch_application(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
            self.inner.fetch_application(id)
        }
        fn applications_for_trainee(
            &self,
            trainee_id: &TraineeId,
        ) -> Result<Vec<Application>, StoreError> {
            self.inner.applications_for_trainee(trainee_id)
        }
        fn applications_for_club(&self, club_id: &ClubId) -> Result<Vec<Application>, StoreError> {
            self.inner.applications_for_club(club_id)
        }
        fn applications(&self) -> Result<Vec<Application>, StoreError> {
            self.inner.applications()
        }
        fn update_application(
            &self,
            application: Application,
            expected: ApplicationStatus,
            require_uncommitted: bool,
        ) -> Result<Application, StoreError> {
            self.commit_queued()?;
            self.inner
                .update_application(application, expected, require_uncommitted)
        }
        fn commit_final_club(
            &self,
            trainee_id: &TraineeId,
            club_id: &ClubId,
            feedback: &str,
            decided_at: DateTime<Utc>,
        ) -> Result<FinalClubCommit, StoreError> {
            self.inner
                .commit_final_club(trainee_id, club_id, feedback, decided_at)
        }
    }

    type Interleaved = RecruitmentService<FinalizeBeforeWrite>;

    fn interleaved_service() -> (Interleaved, Arc<FinalizeBeforeWrite>) {
        let store = Arc::new(FinalizeBeforeWrite::default());
        let service = RecruitmentService::new(store.clone(), ScoringConfig::default());
        (service, store)
    }

    fn passed_trainee(service: &Interleaved) -> Trainee {
        let trainee = service
            .register_trainee(TraineeProfile {
                name: "Ada Mensah".to_string(),
                birth_date: None,
                preferred_position: None,
                email: None,
                phone: None,
            })
            .expect("trainee registers");
        service
            .submit_test(
                &trainee.id,
                SubmitterId("scout-1".to_string()),
                SkillAttributes::uniform(80),
                None,
            )
            .expect("test recorded");
        trainee
    }

    fn new_club(service: &Interleaved, name: &str) -> Club {
        service
            .register_club(ClubProfile {
                name: name.to_string(),
                city: None,
            })
            .expect("club registers")
    }

    #[test]
    fn accept_landing_after_finalize_is_refused() {
        let (service, store) = interleaved_service();
        let trainee = passed_trainee(&service);
        let harbour = new_club(&service, "Harbour FC");
        let northgate = new_club(&service, "Northgate United");
        let first = service.apply(&trainee.id, &harbour.id).expect("apply harbour");
        let second = service.apply(&trainee.id, &northgate.id).expect("apply northgate");
        service
            .decide(&first.id, DecisionOutcome::Accepted, None)
            .expect("harbour accepts");

        store.queue(&trainee.id, &harbour.id);
        let outcome = service.decide(&second.id, DecisionOutcome::Accepted, None);

        match outcome {
            Err(RecruitmentError::NotEligible(Ineligibility::FinalClubChosen { club_id })) => {
                assert_eq!(club_id, harbour.id)
            }
            other => panic!("expected final club refusal, got {other:?}"),
        }
        let stored = store
            .fetch_application(&second.id)
            .expect("fetch")
            .expect("row exists");
        assert_eq!(stored.status, ApplicationStatus::Pending);
        assert_eq!(
            service.status(&trainee.id).expect("status").final_club_id,
            Some(harbour.id)
        );
    }

    #[test]
    fn reject_landing_after_finalize_still_applies() {
        let (service, store) = interleaved_service();
        let trainee = passed_trainee(&service);
        let harbour = new_club(&service, "Harbour FC");
        let northgate = new_club(&service, "Northgate United");
        let first = service.apply(&trainee.id, &harbour.id).expect("apply harbour");
        let second = service.apply(&trainee.id, &northgate.id).expect("apply northgate");
        service
            .decide(&first.id, DecisionOutcome::Accepted, None)
            .expect("harbour accepts");

        store.queue(&trainee.id, &harbour.id);
        let rejected = service
            .decide(&second.id, DecisionOutcome::Rejected, None)
            .expect("rejection is always allowed");
        assert_eq!(rejected.status, ApplicationStatus::Rejected);
    }

    #[test]
    fn apply_landing_after_finalize_is_refused() {
        let (service, store) = interleaved_service();
        let trainee = passed_trainee(&service);
        let harbour = new_club(&service, "Harbour FC");
        let northgate = new_club(&service, "Northgate United");
        let first = service.apply(&trainee.id, &harbour.id).expect("apply harbour");
        service
            .decide(&first.id, DecisionOutcome::Accepted, None)
            .expect("harbour accepts");

        store.queue(&trainee.id, &harbour.id);
        let outcome = service.apply(&trainee.id, &northgate.id);

        assert!(matches!(
            outcome,
            Err(RecruitmentError::NotEligible(
                Ineligibility::FinalClubChosen { .. }
            ))
        ));
        let rows = store
            .applications_for_trainee(&trainee.id)
            .expect("applications");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].club_id, harbour.id);
    }

    #[test]
    fn racing_accept_and_finalize_leave_one_accepted_row() {
        for _ in 0..50 {
            let (service, store) = build_service();
            let ada = tested(&service, "Ada Mensah", 80);
            let harbour = club(&service, "Harbour FC");
            let northgate = club(&service, "Northgate United");
            let first = service.apply(&ada.id, &harbour.id).expect("apply harbour");
            let second = service.apply(&ada.id, &northgate.id).expect("apply northgate");
            service
                .decide(&first.id, DecisionOutcome::Accepted, None)
                .expect("harbour accepts");

            let barrier = Arc::new(Barrier::new(2));
            let finalizer = {
                let service = service.clone();
                let barrier = barrier.clone();
                let trainee_id = ada.id.clone();
                let club_id = harbour.id.clone();
                thread::spawn(move || {
                    barrier.wait();
                    service.finalize(&trainee_id, &club_id)
                })
            };
            let acceptor = {
                let service = service.clone();
                let barrier = barrier.clone();
                let application_id = second.id.clone();
                thread::spawn(move || {
                    barrier.wait();
                    service.decide(&application_id, DecisionOutcome::Accepted, None)
                })
            };

            finalizer
                .join()
                .expect("thread completes")
                .expect("finalize wins its own club");
            match acceptor.join().expect("thread completes") {
                Ok(_) | Err(RecruitmentError::NotEligible(Ineligibility::FinalClubChosen { .. })) => {}
                Err(other) => panic!("unexpected decide error: {other:?}"),
            }

            let accepted: Vec<_> = store
                .applications_for_trainee(&ada.id)
                .expect("applications")
                .into_iter()
                .filter(|application| application.status == ApplicationStatus::Accepted)
                .collect();
            assert_eq!(accepted.len(), 1);
            assert_eq!(accepted[0].club_id, harbour.id);
        }
    }
}
