//! Promotion and relegation between divisions ("ascensos / descensos").
//!
//! Divisions are ordered by `level`, where the smallest level is the top
//! division. At the end of a stage the best-ranked eligible players of each
//! division move up one division and the worst-ranked move down one.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::standings::StandingRow;
use crate::types::DbId;

pub const QUOTA_MODE_FIXED: &str = "fixed";
pub const QUOTA_MODE_PERCENTAGE: &str = "percentage";

/// All valid quota modes.
pub const VALID_QUOTA_MODES: &[&str] = &[QUOTA_MODE_FIXED, QUOTA_MODE_PERCENTAGE];

/// How a stage's promotion/relegation numbers are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaMode {
    /// The numbers are player counts per division.
    Fixed,
    /// The numbers are percentages of each division's size.
    Percentage,
}

impl QuotaMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => QUOTA_MODE_FIXED,
            Self::Percentage => QUOTA_MODE_PERCENTAGE,
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            QUOTA_MODE_FIXED => Ok(Self::Fixed),
            QUOTA_MODE_PERCENTAGE => Ok(Self::Percentage),
            other => Err(CoreError::Validation(format!(
                "Invalid quota_mode '{other}'. Must be one of: {}",
                VALID_QUOTA_MODES.join(", ")
            ))),
        }
    }
}

/// Validate a stage's quota configuration.
pub fn validate_quota_config(
    mode: QuotaMode,
    promotion: i32,
    relegation: i32,
) -> Result<(), CoreError> {
    if promotion < 0 || relegation < 0 {
        return Err(CoreError::Validation(
            "promotion_quota and relegation_quota must be non-negative".into(),
        ));
    }
    if mode == QuotaMode::Percentage && (promotion > 100 || relegation > 100) {
        return Err(CoreError::Validation(
            "Percentage quotas must be between 0 and 100".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Quotas
// ---------------------------------------------------------------------------

/// Number of players moving up and down from one division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quotas {
    pub promote: usize,
    pub relegate: usize,
}

fn resolve(mode: QuotaMode, value: i32, size: usize) -> usize {
    let value = value.max(0) as usize;
    match mode {
        QuotaMode::Fixed => value,
        QuotaMode::Percentage => {
            if value == 0 || size == 0 {
                return 0;
            }
            // Half-up rounding, never below one player.
            ((size * value + 50) / 100).max(1)
        }
    }
}

/// Compute the quotas of one division.
///
/// The top division never promotes and the bottom never relegates. Both
/// quotas together never exceed the division size; relegation gives way first.
pub fn quotas(
    mode: QuotaMode,
    promotion: i32,
    relegation: i32,
    size: usize,
    is_top: bool,
    is_bottom: bool,
) -> Quotas {
    let promote = if is_top {
        0
    } else {
        resolve(mode, promotion, size).min(size)
    };
    let relegate = if is_bottom {
        0
    } else {
        resolve(mode, relegation, size).min(size - promote)
    };
    Quotas { promote, relegate }
}

// ---------------------------------------------------------------------------
// Movements
// ---------------------------------------------------------------------------

/// Direction of a player's move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Promotion,
    Relegation,
    Stay,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Promotion => "promotion",
            Self::Relegation => "relegation",
            Self::Stay => "stay",
        }
    }
}

/// Ranked standings of one division.
#[derive(Debug, Clone)]
pub struct DivisionStanding {
    pub division_id: DbId,
    pub level: i32,
    /// Rows in ranking order (see [`crate::standings::rank`]).
    pub rows: Vec<StandingRow>,
}

/// The computed move of one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedMovement {
    pub enrollment_id: DbId,
    pub player_id: DbId,
    pub player_name: String,
    pub from_division_id: DbId,
    pub from_level: i32,
    pub to_level: i32,
    pub position: u32,
    pub kind: MovementKind,
}

/// Full promotion/relegation plan for a stage.
#[derive(Debug, Clone, Serialize)]
pub struct MovementPlan {
    pub quotas: Vec<DivisionQuota>,
    pub movements: Vec<PlannedMovement>,
}

/// Quotas applied to one division, reported alongside the plan.
#[derive(Debug, Clone, Serialize)]
pub struct DivisionQuota {
    pub division_id: DbId,
    pub level: i32,
    pub size: usize,
    pub promote: usize,
    pub relegate: usize,
}

/// Plan the movements of every ranked player in a stage.
///
/// Only eligible players can be promoted, so a division with fewer eligible
/// players than its promotion quota promotes fewer. Relegation always takes
/// the last positions. Moves go to the adjacent existing level, so gaps in
/// level numbering are tolerated.
pub fn plan_movements(
    mode: QuotaMode,
    promotion: i32,
    relegation: i32,
    divisions: &[DivisionStanding],
) -> MovementPlan {
    let mut levels: Vec<i32> = divisions.iter().map(|d| d.level).collect();
    levels.sort_unstable();
    levels.dedup();

    let mut quota_report = Vec::with_capacity(divisions.len());
    let mut movements = Vec::new();

    for division in divisions {
        let idx = levels
            .iter()
            .position(|l| *l == division.level)
            .unwrap_or_default();
        let upper = idx.checked_sub(1).map(|i| levels[i]);
        let lower = levels.get(idx + 1).copied();

        let size = division.rows.len();
        let q = quotas(
            mode,
            promotion,
            relegation,
            size,
            upper.is_none(),
            lower.is_none(),
        );
        quota_report.push(DivisionQuota {
            division_id: division.division_id,
            level: division.level,
            size,
            promote: q.promote,
            relegate: q.relegate,
        });

        for (i, row) in division.rows.iter().enumerate() {
            let promoted = i < q.promote && row.eligible;
            let relegated = i >= size - q.relegate;

            let (kind, to_level) = match (promoted, relegated, upper, lower) {
                (true, _, Some(up), _) => (MovementKind::Promotion, up),
                (false, true, _, Some(down)) => (MovementKind::Relegation, down),
                _ => (MovementKind::Stay, division.level),
            };

            movements.push(PlannedMovement {
                enrollment_id: row.enrollment_id,
                player_id: row.player_id,
                player_name: row.player_name.clone(),
                from_division_id: division.division_id,
                from_level: division.level,
                to_level,
                position: row.position,
                kind,
            });
        }
    }

    MovementPlan {
        quotas: quota_report,
        movements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: DbId, position: u32, eligible: bool) -> StandingRow {
        StandingRow {
            position,
            enrollment_id: id,
            player_id: id,
            player_name: format!("P{id}"),
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            points: 0,
            games_for: 0,
            games_against: 0,
            game_difference: 0,
            average: 0.0,
            eligible,
        }
    }

    fn division(id: DbId, level: i32, first_enrollment: DbId, size: u32) -> DivisionStanding {
        DivisionStanding {
            division_id: id,
            level,
            rows: (0..size)
                .map(|i| row(first_enrollment + DbId::from(i), i + 1, true))
                .collect(),
        }
    }

    fn kinds(plan: &MovementPlan, division_id: DbId) -> Vec<MovementKind> {
        plan.movements
            .iter()
            .filter(|m| m.from_division_id == division_id)
            .map(|m| m.kind)
            .collect()
    }

    #[test]
    fn fixed_quotas_respect_top_and_bottom() {
        assert_eq!(
            quotas(QuotaMode::Fixed, 2, 2, 8, true, false),
            Quotas { promote: 0, relegate: 2 }
        );
        assert_eq!(
            quotas(QuotaMode::Fixed, 2, 2, 8, false, true),
            Quotas { promote: 2, relegate: 0 }
        );
    }

    #[test]
    fn percentage_rounds_half_up_with_minimum_one() {
        // 25% of 10 = 2.5 -> 3
        assert_eq!(resolve(QuotaMode::Percentage, 25, 10), 3);
        // 5% of 8 = 0.4 -> at least 1
        assert_eq!(resolve(QuotaMode::Percentage, 5, 8), 1);
        assert_eq!(resolve(QuotaMode::Percentage, 0, 8), 0);
        assert_eq!(resolve(QuotaMode::Percentage, 50, 0), 0);
    }

    #[test]
    fn quotas_never_exceed_division_size() {
        let q = quotas(QuotaMode::Fixed, 3, 3, 4, false, false);
        assert_eq!(q, Quotas { promote: 3, relegate: 1 });
        assert!(q.promote + q.relegate <= 4);
    }

    #[test]
    fn invalid_configs_rejected() {
        assert!(validate_quota_config(QuotaMode::Fixed, -1, 0).is_err());
        assert!(validate_quota_config(QuotaMode::Percentage, 101, 0).is_err());
        assert!(validate_quota_config(QuotaMode::Percentage, 20, 20).is_ok());
    }

    #[test]
    fn three_division_plan() {
        let divisions = vec![
            division(1, 1, 100, 4),
            division(2, 2, 200, 4),
            division(3, 3, 300, 4),
        ];
        let plan = plan_movements(QuotaMode::Fixed, 1, 1, &divisions);

        use MovementKind::*;
        assert_eq!(kinds(&plan, 1), vec![Stay, Stay, Stay, Relegation]);
        assert_eq!(kinds(&plan, 2), vec![Promotion, Stay, Stay, Relegation]);
        assert_eq!(kinds(&plan, 3), vec![Promotion, Stay, Stay, Stay]);

        let promoted = plan
            .movements
            .iter()
            .find(|m| m.enrollment_id == 300)
            .unwrap();
        assert_eq!(promoted.to_level, 2);
        let relegated = plan
            .movements
            .iter()
            .find(|m| m.enrollment_id == 103)
            .unwrap();
        assert_eq!(relegated.to_level, 2);
    }

    #[test]
    fn ineligible_players_are_not_promoted() {
        let mut lower = division(2, 2, 200, 4);
        lower.rows[0].eligible = false;
        let plan = plan_movements(QuotaMode::Fixed, 1, 0, &[division(1, 1, 100, 4), lower]);

        assert!(plan
            .movements
            .iter()
            .all(|m| m.kind != MovementKind::Promotion));
    }

    #[test]
    fn level_gaps_move_to_adjacent_existing_level() {
        let plan = plan_movements(
            QuotaMode::Fixed,
            1,
            1,
            &[division(1, 1, 100, 2), division(5, 5, 500, 2)],
        );
        let up = plan.movements.iter().find(|m| m.enrollment_id == 500).unwrap();
        assert_eq!(up.to_level, 1);
        let down = plan.movements.iter().find(|m| m.enrollment_id == 101).unwrap();
        assert_eq!(down.to_level, 5);
    }

    #[test]
    fn single_division_has_no_movements() {
        let plan = plan_movements(QuotaMode::Fixed, 2, 2, &[division(1, 1, 100, 6)]);
        assert!(plan.movements.iter().all(|m| m.kind == MovementKind::Stay));
        assert_eq!(plan.quotas[0].promote, 0);
        assert_eq!(plan.quotas[0].relegate, 0);
    }

    #[test]
    fn quota_mode_parse() {
        assert_eq!(QuotaMode::parse("fixed").unwrap(), QuotaMode::Fixed);
        assert_eq!(
            QuotaMode::parse(QuotaMode::Percentage.as_str()).unwrap(),
            QuotaMode::Percentage
        );
        assert!(QuotaMode::parse("elo").is_err());
    }
}
