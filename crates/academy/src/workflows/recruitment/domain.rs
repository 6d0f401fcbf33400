use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::position::Position;

/// Feedback written onto accepted applications that lose out to the trainee's final club.
pub const SUPERSEDED_FEEDBACK: &str = "superseded by trainee's final selection";

/// Identifier wrapper for registered trainees.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TraineeId(pub String);

/// Identifier wrapper for recruiting clubs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClubId(pub String);

/// Identifier wrapper for trainee → club applications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for stored test results.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TestResultId(pub String);

/// Opaque identity of the scout/evaluator as handed over by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubmitterId(pub String);

impl std::fmt::Display for TraineeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for ClubId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Profile captured at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraineeProfile {
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub preferred_position: Option<Position>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Coarse lifecycle state of a trainee. There is no path back to `PendingTest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraineeStatus {
    PendingTest,
    TestCompleted,
}

impl TraineeStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TraineeStatus::PendingTest => "pending_test",
            TraineeStatus::TestCompleted => "test_completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainee {
    pub id: TraineeId,
    pub profile: TraineeProfile,
    pub status: TraineeStatus,
    /// Set at most once, by finalization.
    pub final_club_id: Option<ClubId>,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubProfile {
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub id: ClubId,
    pub profile: ClubProfile,
    pub registered_at: DateTime<Utc>,
}

/// Grouping used by the category averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeCategory {
    Physical,
    Mental,
    Technical,
    Goalkeeper,
}

impl AttributeCategory {
    pub const ALL: [AttributeCategory; 4] = [
        AttributeCategory::Physical,
        AttributeCategory::Mental,
        AttributeCategory::Technical,
        AttributeCategory::Goalkeeper,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            AttributeCategory::Physical => "Physical",
            AttributeCategory::Mental => "Mental",
            AttributeCategory::Technical => "Technical",
            AttributeCategory::Goalkeeper => "Goalkeeper",
        }
    }

    pub fn attributes(self) -> impl Iterator<Item = Attribute> {
        Attribute::ALL
            .into_iter()
            .filter(move |attribute| attribute.category() == self)
    }
}

/// Every raw skill attribute recorded by an evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Acceleration,
    Agility,
    Balance,
    JumpingReach,
    NaturalFitness,
    Pace,
    Stamina,
    Strength,
    Aggression,
    Anticipation,
    Composure,
    Concentration,
    Vision,
    Corners,
    Crossing,
    Dribbling,
    Finishing,
    FirstTouch,
    FreeKickTaking,
    Heading,
    LongShots,
    LongThrows,
    Marking,
    Passing,
    PenaltyTaking,
    Tackling,
    Technique,
    OffTheBall,
    Positioning,
    GkDiving,
    GkHandling,
    GkKicking,
    GkPositioning,
    GkReflexes,
}

impl Attribute {
    pub const ALL: [Attribute; 34] = [
        Attribute::Acceleration,
        Attribute::Agility,
        Attribute::Balance,
        Attribute::JumpingReach,
        Attribute::NaturalFitness,
        Attribute::Pace,
        Attribute::Stamina,
        Attribute::Strength,
        Attribute::Aggression,
        Attribute::Anticipation,
        Attribute::Composure,
        Attribute::Concentration,
        Attribute::Vision,
        Attribute::Corners,
        Attribute::Crossing,
        Attribute::Dribbling,
        Attribute::Finishing,
        Attribute::FirstTouch,
        Attribute::FreeKickTaking,
        Attribute::Heading,
        Attribute::LongShots,
        Attribute::LongThrows,
        Attribute::Marking,
        Attribute::Passing,
        Attribute::PenaltyTaking,
        Attribute::Tackling,
        Attribute::Technique,
        Attribute::OffTheBall,
        Attribute::Positioning,
        Attribute::GkDiving,
        Attribute::GkHandling,
        Attribute::GkKicking,
        Attribute::GkPositioning,
        Attribute::GkReflexes,
    ];

    pub const fn category(self) -> AttributeCategory {
        use Attribute::*;
        match self {
            Acceleration | Agility | Balance | JumpingReach | NaturalFitness | Pace | Stamina
            | Strength => AttributeCategory::Physical,
            Aggression | Anticipation | Composure | Concentration | Vision => {
                AttributeCategory::Mental
            }
            GkDiving | GkHandling | GkKicking | GkPositioning | GkReflexes => {
                AttributeCategory::Goalkeeper
            }
            _ => AttributeCategory::Technical,
        }
    }

    pub const fn key(self) -> &'static str {
        use Attribute::*;
        match self {
            Acceleration => "acceleration",
            Agility => "agility",
            Balance => "balance",
            JumpingReach => "jumping_reach",
            NaturalFitness => "natural_fitness",
            Pace => "pace",
            Stamina => "stamina",
            Strength => "strength",
            Aggression => "aggression",
            Anticipation => "anticipation",
            Composure => "composure",
            Concentration => "concentration",
            Vision => "vision",
            Corners => "corners",
            Crossing => "crossing",
            Dribbling => "dribbling",
            Finishing => "finishing",
            FirstTouch => "first_touch",
            FreeKickTaking => "free_kick_taking",
            Heading => "heading",
            LongShots => "long_shots",
            LongThrows => "long_throws",
            Marking => "marking",
            Passing => "passing",
            PenaltyTaking => "penalty_taking",
            Tackling => "tackling",
            Technique => "technique",
            OffTheBall => "off_the_ball",
            Positioning => "positioning",
            GkDiving => "gk_diving",
            GkHandling => "gk_handling",
            GkKicking => "gk_kicking",
            GkPositioning => "gk_positioning",
            GkReflexes => "gk_reflexes",
        }
    }
}

/// Raw attribute sheet as submitted. Values are validated to 1..=99 before anything is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillAttributes {
    pub acceleration: i32,
    pub agility: i32,
    pub balance: i32,
    pub jumping_reach: i32,
    pub natural_fitness: i32,
    pub pace: i32,
    pub stamina: i32,
    pub strength: i32,
    pub aggression: i32,
    pub anticipation: i32,
    pub composure: i32,
    pub concentration: i32,
    pub vision: i32,
    pub corners: i32,
    pub crossing: i32,
    pub dribbling: i32,
    pub finishing: i32,
    pub first_touch: i32,
    pub free_kick_taking: i32,
    pub heading: i32,
    pub long_shots: i32,
    pub long_throws: i32,
    pub marking: i32,
    pub passing: i32,
    pub penalty_taking: i32,
    pub tackling: i32,
    pub technique: i32,
    pub off_the_ball: i32,
    pub positioning: i32,
    pub gk_diving: i32,
    pub gk_handling: i32,
    pub gk_kicking: i32,
    pub gk_positioning: i32,
    pub gk_reflexes: i32,
}

impl SkillAttributes {
    /// Sheet with every attribute set to the same value.
    pub fn uniform(value: i32) -> Self {
        Self {
            acceleration: value,
            agility: value,
            balance: value,
            jumping_reach: value,
            natural_fitness: value,
            pace: value,
            stamina: value,
            strength: value,
            aggression: value,
            anticipation: value,
            composure: value,
            concentration: value,
            vision: value,
            corners: value,
            crossing: value,
            dribbling: value,
            finishing: value,
            first_touch: value,
            free_kick_taking: value,
            heading: value,
            long_shots: value,
            long_throws: value,
            marking: value,
            passing: value,
            penalty_taking: value,
            tackling: value,
            technique: value,
            off_the_ball: value,
            positioning: value,
            gk_diving: value,
            gk_handling: value,
            gk_kicking: value,
            gk_positioning: value,
            gk_reflexes: value,
        }
    }

    pub fn value(&self, attribute: Attribute) -> i32 {
        *self.slot(attribute)
    }

    pub fn set(&mut self, attribute: Attribute, value: i32) {
        *self.slot_mut(attribute) = value;
    }

    /// Builder-style variant of [`SkillAttributes::set`].
    pub fn with(mut self, attribute: Attribute, value: i32) -> Self {
        self.set(attribute, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, i32)> + '_ {
        Attribute::ALL
            .into_iter()
            .map(move |attribute| (attribute, self.value(attribute)))
    }

    fn slot(&self, attribute: Attribute) -> &i32 {
        use Attribute::*;
        match attribute {
            Acceleration => &self.acceleration,
            Agility => &self.agility,
            Balance => &self.balance,
            JumpingReach => &self.jumping_reach,
            NaturalFitness => &self.natural_fitness,
            Pace => &self.pace,
            Stamina => &self.stamina,
            Strength => &self.strength,
            Aggression => &self.aggression,
            Anticipation => &self.anticipation,
            Composure => &self.composure,
            Concentration => &self.concentration,
            Vision => &self.vision,
            Corners => &self.corners,
            Crossing => &self.crossing,
            Dribbling => &self.dribbling,
            Finishing => &self.finishing,
            FirstTouch => &self.first_touch,
            FreeKickTaking => &self.free_kick_taking,
            Heading => &self.heading,
            LongShots => &self.long_shots,
            LongThrows => &self.long_throws,
            Marking => &self.marking,
            Passing => &self.passing,
            PenaltyTaking => &self.penalty_taking,
            Tackling => &self.tackling,
            Technique => &self.technique,
            OffTheBall => &self.off_the_ball,
            Positioning => &self.positioning,
            GkDiving => &self.gk_diving,
            GkHandling => &self.gk_handling,
            GkKicking => &self.gk_kicking,
            GkPositioning => &self.gk_positioning,
            GkReflexes => &self.gk_reflexes,
        }
    }

    fn slot_mut(&mut self, attribute: Attribute) -> &mut i32 {
        use Attribute::*;
        match attribute {
            Acceleration => &mut self.acceleration,
            Agility => &mut self.agility,
            Balance => &mut self.balance,
            JumpingReach => &mut self.jumping_reach,
            NaturalFitness => &mut self.natural_fitness,
            Pace => &mut self.pace,
            Stamina => &mut self.stamina,
            Strength => &mut self.strength,
            Aggression => &mut self.aggression,
            Anticipation => &mut self.anticipation,
            Composure => &mut self.composure,
            Concentration => &mut self.concentration,
            Vision => &mut self.vision,
            Corners => &mut self.corners,
            Crossing => &mut self.crossing,
            Dribbling => &mut self.dribbling,
            Finishing => &mut self.finishing,
            FirstTouch => &mut self.first_touch,
            FreeKickTaking => &mut self.free_kick_taking,
            Heading => &mut self.heading,
            LongShots => &mut self.long_shots,
            LongThrows => &mut self.long_throws,
            Marking => &mut self.marking,
            Passing => &mut self.passing,
            PenaltyTaking => &mut self.penalty_taking,
            Tackling => &mut self.tackling,
            Technique => &mut self.technique,
            OffTheBall => &mut self.off_the_ball,
            Positioning => &mut self.positioning,
            GkDiving => &mut self.gk_diving,
            GkHandling => &mut self.gk_handling,
            GkKicking => &mut self.gk_kicking,
            GkPositioning => &mut self.gk_positioning,
            GkReflexes => &mut self.gk_reflexes,
        }
    }
}

/// A stored evaluation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: TestResultId,
    pub trainee_id: TraineeId,
    pub submitter_id: SubmitterId,
    pub attributes: SkillAttributes,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-application status machine: `Pending` → `Accepted` | `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// Outcome a club may record against a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    Accepted,
    Rejected,
}

impl From<DecisionOutcome> for ApplicationStatus {
    fn from(value: DecisionOutcome) -> Self {
        match value {
            DecisionOutcome::Accepted => ApplicationStatus::Accepted,
            DecisionOutcome::Rejected => ApplicationStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub trainee_id: TraineeId,
    pub club_id: ClubId,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub feedback: Option<String>,
}

impl Application {
    /// Status as consumers must read it. Once the trainee holds a final club, an `Accepted` row
    /// for any other club counts as rejected even if finalization never rewrote it.
    pub fn effective_status(&self, final_club_id: Option<&ClubId>) -> ApplicationStatus {
        match (self.status, final_club_id) {
            (ApplicationStatus::Accepted, Some(final_club)) if *final_club != self.club_id => {
                ApplicationStatus::Rejected
            }
            (status, _) => status,
        }
    }

    pub fn view(&self, final_club_id: Option<&ClubId>) -> ApplicationView {
        ApplicationView {
            application_id: self.id.clone(),
            trainee_id: self.trainee_id.clone(),
            club_id: self.club_id.clone(),
            status: self.effective_status(final_club_id).label(),
            feedback: self.feedback.clone(),
            submitted_at: self.submitted_at,
            decided_at: self.decided_at,
        }
    }
}

/// Public representation of an application with the compensating read applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationView {
    pub application_id: ApplicationId,
    pub trainee_id: TraineeId,
    pub club_id: ClubId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

/// Response shape for `status` lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub trainee_id: TraineeId,
    pub status: TraineeStatus,
    pub final_club_id: Option<ClubId>,
}

impl Trainee {
    pub fn status_view(&self) -> StatusView {
        StatusView {
            trainee_id: self.id.clone(),
            status: self.status,
            final_club_id: self.final_club_id.clone(),
        }
    }
}
