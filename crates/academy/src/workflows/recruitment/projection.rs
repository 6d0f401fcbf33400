//! Read-only dashboard counts, scoped by who is looking.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::domain::{
    Application, ApplicationStatus, ClubId, SubmitterId, TestResult, Trainee, TraineeId,
    TraineeStatus,
};

/// Capability the projection is computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum Viewer {
    Trainee(TraineeId),
    Club(ClubId),
    Scout(SubmitterId),
    Admin,
}

impl Viewer {
    /// Parse the `role`/`id` pair carried by API queries.
    pub fn from_parts(role: &str, id: Option<&str>) -> Option<Self> {
        let id = id.map(str::trim).filter(|value| !value.is_empty());
        match (role.trim().to_ascii_lowercase().as_str(), id) {
            ("trainee", Some(id)) => Some(Viewer::Trainee(TraineeId(id.to_string()))),
            ("club", Some(id)) => Some(Viewer::Club(ClubId(id.to_string()))),
            ("scout" | "scouter" | "evaluator", Some(id)) => {
                Some(Viewer::Scout(SubmitterId(id.to_string())))
            }
            ("admin", _) => Some(Viewer::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationCounts {
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub viewer: Viewer,
    pub trainees: usize,
    pub tested_trainees: usize,
    /// Share of visible trainees with a completed test, 0 to 100 with one decimal.
    pub completion_pct: f32,
    pub applications: ApplicationCounts,
    pub team_members: usize,
}

/// Rows the projection scans. `tested_by` only matters for scout viewers.
pub struct ProjectionInput<'a> {
    pub trainees: &'a [Trainee],
    pub applications: &'a [Application],
    pub tested_by: &'a [TestResult],
}

pub fn summarize(viewer: &Viewer, input: &ProjectionInput<'_>) -> DashboardSummary {
    let visible: Vec<&Trainee> = match viewer {
        Viewer::Admin => input.trainees.iter().collect(),
        Viewer::Trainee(id) => input
            .trainees
            .iter()
            .filter(|trainee| trainee.id == *id)
            .collect(),
        Viewer::Club(club_id) => {
            let applicants: HashSet<&TraineeId> = input
                .applications
                .iter()
                .filter(|application| application.club_id == *club_id)
                .map(|application| &application.trainee_id)
                .collect();
            input
                .trainees
                .iter()
                .filter(|trainee| {
                    applicants.contains(&trainee.id)
                        || trainee.final_club_id.as_ref() == Some(club_id)
                })
                .collect()
        }
        Viewer::Scout(submitter_id) => {
            let tested: HashSet<&TraineeId> = input
                .tested_by
                .iter()
                .filter(|result| result.submitter_id == *submitter_id)
                .map(|result| &result.trainee_id)
                .collect();
            input
                .trainees
                .iter()
                .filter(|trainee| tested.contains(&trainee.id))
                .collect()
        }
    };

    let visible_ids: HashSet<&TraineeId> = visible.iter().map(|trainee| &trainee.id).collect();
    let tested_trainees = visible
        .iter()
        .filter(|trainee| trainee.status == TraineeStatus::TestCompleted)
        .count();

    let final_clubs: HashMap<&TraineeId, Option<&ClubId>> = input
        .trainees
        .iter()
        .map(|trainee| (&trainee.id, trainee.final_club_id.as_ref()))
        .collect();

    let mut applications = ApplicationCounts::default();
    for application in input.applications {
        let in_scope = match viewer {
            Viewer::Club(club_id) => application.club_id == *club_id,
            _ => visible_ids.contains(&application.trainee_id),
        };
        if !in_scope {
            continue;
        }
        let final_club = final_clubs
            .get(&application.trainee_id)
            .copied()
            .flatten();
        applications.total += 1;
        match application.effective_status(final_club) {
            ApplicationStatus::Pending => applications.pending += 1,
            ApplicationStatus::Accepted => applications.accepted += 1,
            ApplicationStatus::Rejected => applications.rejected += 1,
        }
    }

    let team_members = match viewer {
        Viewer::Club(club_id) => visible
            .iter()
            .filter(|trainee| trainee.final_club_id.as_ref() == Some(club_id))
            .count(),
        _ => visible
            .iter()
            .filter(|trainee| trainee.final_club_id.is_some())
            .count(),
    };

    DashboardSummary {
        viewer: viewer.clone(),
        trainees: visible.len(),
        tested_trainees,
        completion_pct: percentage(tested_trainees, visible.len()),
        applications,
        team_members,
    }
}

fn percentage(part: usize, whole: usize) -> f32 {
    if whole == 0 {
        return 0.0;
    }
    ((part as f32 / whole as f32) * 1000.0).round() / 10.0
}
