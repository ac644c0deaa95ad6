//! Domain types shared by the local and remote stores.
//!
//! Everything serializes camelCase so the export format, the local blobs
//! and the remote documents all read the same on the wire.

mod catalog;

pub use catalog::{CATEGORIES, default_exercise_templates};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::DataError;

pub const MAX_REPS: i32 = 100;
pub const MAX_WEIGHT_KG: f64 = 1000.0;

/// One performed set: reps at a weight, optionally followed by a rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    pub id: String,
    pub reps: i32,
    /// Weight in kg. Display conversion to lbs happens at the edge.
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_time: Option<i32>,
}

impl WorkoutSet {
    pub fn new(reps: i32, weight: f64) -> Result<Self, DataError> {
        validate_reps(reps)?;
        validate_weight(weight)?;
        Ok(Self {
            id: generate_id(),
            reps,
            weight,
            rest_time: None,
        })
    }

    pub fn volume(&self) -> f64 {
        self.weight * self.reps as f64
    }
}

impl fmt::Display for WorkoutSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}kg x {} reps", self.weight, self.reps)
    }
}

/// An exercise as performed inside one session. Name and category are
/// denormalized copies of the template fields; deleting a template never
/// rewrites history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub category: String,
    pub sets: Vec<WorkoutSet>,
}

impl Exercise {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            category: category.into(),
            sets: Vec::new(),
        }
    }

    pub fn volume(&self) -> f64 {
        self.sets.iter().map(WorkoutSet::volume).sum()
    }
}

/// One workout on a calendar day. Owns its exercises and their sets;
/// deleting the session deletes everything under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub date: NaiveDate,
    pub exercises: Vec<Exercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Workout duration in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkoutSession {
    /// Start a new session: empty exercise list, client-generated id.
    /// The remote store replaces the id with a server-assigned one on
    /// first create.
    pub fn start(date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            date,
            exercises: Vec::new(),
            notes: None,
            duration: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn total_volume(&self) -> f64 {
        self.exercises.iter().map(Exercise::volume).sum()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Rep target used when suggesting this exercise.
    pub fn suggested_reps(self) -> i32 {
        match self {
            Difficulty::Beginner => 12,
            Difficulty::Intermediate => 10,
            Difficulty::Advanced => 8,
        }
    }
}

/// Catalog entry describing a named exercise, independent of any session.
/// name+category acts as a soft natural key for suggestion matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseTemplate {
    pub id: String,
    pub name: String,
    pub category: String,
    pub target_muscles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Lbs,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Kg => write!(f, "kg"),
            Unit::Lbs => write!(f, "lbs"),
        }
    }
}

/// Singleton per device. Defaults are returned (not persisted) until the
/// user explicitly saves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub preferred_units: Unit,
    /// Default rest between sets, seconds.
    pub rest_timer_default: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_goal: Option<i32>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            name: None,
            preferred_units: Unit::Kg,
            rest_timer_default: 90,
            weekly_goal: Some(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Read-side aggregate for one exercise name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseStats {
    pub exercise_name: String,
    pub category: String,
    pub max_weight: f64,
    pub total_volume: f64,
    pub last_performed: NaiveDate,
    pub progress_trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSuggestion {
    pub exercise: ExerciseTemplate,
    pub reason: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_reps: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub total_workouts: usize,
    pub total_volume: f64,
    pub most_trained_category: Option<String>,
    /// Consecutive training days counted backward from today.
    pub streak: u32,
}

/// The symmetric export/import document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub workout_sessions: Vec<WorkoutSession>,
    pub exercise_templates: Vec<ExerciseTemplate>,
    pub user_settings: UserSettings,
    pub export_date: DateTime<Utc>,
}

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn validate_reps(reps: i32) -> Result<(), DataError> {
    if reps > 0 && reps <= MAX_REPS {
        Ok(())
    } else {
        Err(DataError::Validation {
            field: "reps",
            message: format!("{reps} is outside 1..={MAX_REPS}"),
        })
    }
}

pub fn validate_weight(weight: f64) -> Result<(), DataError> {
    if weight > 0.0 && weight <= MAX_WEIGHT_KG {
        Ok(())
    } else {
        Err(DataError::Validation {
            field: "weight",
            message: format!("{weight} is outside (0, {MAX_WEIGHT_KG}]"),
        })
    }
}

/// Validate every set in a session before it is allowed near a store.
pub fn validate_session(session: &WorkoutSession) -> Result<(), DataError> {
    for exercise in &session.exercises {
        for set in &exercise.sets {
            validate_reps(set.reps)?;
            validate_weight(set.weight)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reps_and_weight_bounds() {
        assert!(validate_reps(1).is_ok());
        assert!(validate_reps(100).is_ok());
        assert!(validate_reps(0).is_err());
        assert!(validate_reps(101).is_err());

        assert!(validate_weight(0.1).is_ok());
        assert!(validate_weight(1000.0).is_ok());
        assert!(validate_weight(0.0).is_err());
        assert!(validate_weight(1000.5).is_err());
        assert!(validate_weight(-5.0).is_err());
    }

    #[test]
    fn set_constructor_rejects_out_of_range() {
        assert!(WorkoutSet::new(5, 100.0).is_ok());
        assert!(matches!(
            WorkoutSet::new(0, 100.0),
            Err(DataError::Validation { field: "reps", .. })
        ));
        assert!(matches!(
            WorkoutSet::new(5, 1200.0),
            Err(DataError::Validation { field: "weight", .. })
        ));
    }

    #[test]
    fn session_volume_sums_all_sets() {
        let mut session = WorkoutSession::start(NaiveDate::from_ymd_opt(2026, 8, 20).unwrap());
        let mut bench = Exercise::new("Bench Press", "Chest");
        bench.sets.push(WorkoutSet::new(5, 100.0).unwrap());
        bench.sets.push(WorkoutSet::new(5, 100.0).unwrap());
        session.exercises.push(bench);
        assert_eq!(session.total_volume(), 1000.0);
    }

    #[test]
    fn session_json_uses_camel_case_and_iso_dates() {
        let session = WorkoutSession::start(NaiveDate::from_ymd_opt(2026, 8, 20).unwrap());
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["date"], "2026-08-20");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        let back: WorkoutSession = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn default_settings_match_fixed_defaults() {
        let settings = UserSettings::default();
        assert_eq!(settings.preferred_units, Unit::Kg);
        assert_eq!(settings.rest_timer_default, 90);
        assert_eq!(settings.weekly_goal, Some(3));
    }

    #[test]
    fn priority_orders_high_first_when_sorted_desc() {
        let mut priorities = vec![Priority::Medium, Priority::High, Priority::Low];
        priorities.sort_by(|a, b| b.cmp(a));
        assert_eq!(
            priorities,
            vec![Priority::High, Priority::Medium, Priority::Low]
        );
    }
}
