use serde::{Deserialize, Serialize};

use super::domain::{Attribute, SkillAttributes};

/// Pitch positions in tie-break priority order: earlier entries win equal scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Striker,
    LeftWinger,
    RightWinger,
    AttackingMidfielder,
    CentralMidfielder,
    DefensiveMidfielder,
    LeftBack,
    RightBack,
    CentreBack,
    Goalkeeper,
}

impl Position {
    pub const ALL: [Position; 10] = [
        Position::Striker,
        Position::LeftWinger,
        Position::RightWinger,
        Position::AttackingMidfielder,
        Position::CentralMidfielder,
        Position::DefensiveMidfielder,
        Position::LeftBack,
        Position::RightBack,
        Position::CentreBack,
        Position::Goalkeeper,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Position::Striker => "Striker",
            Position::LeftWinger => "Left Winger",
            Position::RightWinger => "Right Winger",
            Position::AttackingMidfielder => "Attacking Midfielder",
            Position::CentralMidfielder => "Central Midfielder",
            Position::DefensiveMidfielder => "Defensive Midfielder",
            Position::LeftBack => "Left Back",
            Position::RightBack => "Right Back",
            Position::CentreBack => "Centre Back",
            Position::Goalkeeper => "Goalkeeper",
        }
    }

    /// Attribute weights for the archetype.
    pub const fn weights(self) -> &'static [(Attribute, u32)] {
        use Attribute::*;
        match self {
            Position::Striker => &[
                (Finishing, 5),
                (OffTheBall, 3),
                (Composure, 3),
                (Pace, 3),
                (Acceleration, 2),
                (Strength, 2),
                (Heading, 2),
                (FirstTouch, 2),
                (Dribbling, 1),
                (Technique, 1),
            ],
            Position::LeftWinger => &[
                (Crossing, 4),
                (Pace, 4),
                (Dribbling, 3),
                (Acceleration, 3),
                (Agility, 2),
                (Stamina, 2),
                (FirstTouch, 1),
                (Technique, 1),
            ],
            Position::RightWinger => &[
                (Dribbling, 4),
                (Pace, 4),
                (Crossing, 3),
                (Acceleration, 3),
                (Agility, 2),
                (Technique, 2),
                (OffTheBall, 1),
                (Finishing, 1),
            ],
            Position::AttackingMidfielder => &[
                (Passing, 4),
                (Vision, 4),
                (Technique, 3),
                (FirstTouch, 3),
                (Dribbling, 2),
                (LongShots, 2),
                (OffTheBall, 2),
                (Composure, 2),
                (Anticipation, 1),
            ],
            Position::CentralMidfielder => &[
                (Passing, 4),
                (Stamina, 3),
                (Vision, 3),
                (FirstTouch, 2),
                (Tackling, 2),
                (Concentration, 2),
                (Composure, 2),
                (Technique, 2),
                (Positioning, 1),
            ],
            Position::DefensiveMidfielder => &[
                (Tackling, 4),
                (Positioning, 4),
                (Anticipation, 3),
                (Concentration, 3),
                (Marking, 3),
                (Passing, 2),
                (Strength, 2),
                (Stamina, 2),
                (Aggression, 1),
            ],
            Position::LeftBack => &[
                (Tackling, 3),
                (Marking, 3),
                (Pace, 3),
                (Stamina, 3),
                (Crossing, 3),
                (Positioning, 2),
                (Acceleration, 2),
                (Concentration, 1),
            ],
            Position::RightBack => &[
                (Tackling, 3),
                (Marking, 3),
                (Pace, 3),
                (Stamina, 3),
                (Crossing, 2),
                (Positioning, 2),
                (Acceleration, 2),
                (Anticipation, 1),
                (LongThrows, 1),
            ],
            Position::CentreBack => &[
                (Marking, 5),
                (Tackling, 4),
                (Heading, 4),
                (Positioning, 4),
                (Strength, 3),
                (JumpingReach, 3),
                (Aggression, 2),
                (Concentration, 2),
                (Anticipation, 2),
                (Composure, 1),
            ],
            Position::Goalkeeper => &[
                (GkReflexes, 5),
                (GkHandling, 4),
                (GkPositioning, 4),
                (GkDiving, 3),
                (GkKicking, 2),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionScore {
    pub position: Position,
    pub label: &'static str,
    pub score: u8,
}

/// Suitability per position plus the winning label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionFit {
    pub scores: Vec<PositionScore>,
    pub best_position: Position,
    pub best_position_label: &'static str,
}

impl PositionFit {
    pub fn score(&self, position: Position) -> u8 {
        self.scores
            .iter()
            .find(|entry| entry.position == position)
            .map(|entry| entry.score)
            .unwrap_or(0)
    }
}

/// Total over any sheet: out-of-range inputs are clamped into 0..=99 rather than rejected.
pub fn position_fit(attributes: &SkillAttributes) -> PositionFit {
    let scores: Vec<PositionScore> = Position::ALL
        .into_iter()
        .map(|position| PositionScore {
            position,
            label: position.label(),
            score: weighted_score(attributes, position.weights()),
        })
        .collect();

    // Strict comparison keeps the earliest position on ties.
    let mut best = scores[0];
    for entry in &scores[1..] {
        if entry.score > best.score {
            best = *entry;
        }
    }

    PositionFit {
        best_position: best.position,
        best_position_label: best.label,
        scores,
    }
}

fn weighted_score(attributes: &SkillAttributes, weights: &[(Attribute, u32)]) -> u8 {
    let (weighted, total_weight) =
        weights
            .iter()
            .fold((0i64, 0i64), |(weighted, total), (attribute, weight)| {
                let weight = i64::from(*weight);
                (
                    weighted + i64::from(attributes.value(*attribute)) * weight,
                    total + weight,
                )
            });
    if total_weight == 0 {
        return 0;
    }
    let score = (weighted * 2 + total_weight).div_euclid(total_weight * 2);
    score.clamp(0, 99) as u8
}
