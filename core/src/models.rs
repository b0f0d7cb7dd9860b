use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

// --- Enumerations ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
    Strength,
    Cardio,
    Flexibility,
}

impl WorkoutType {
    pub const ALL: [WorkoutType; 3] = [Self::Strength, Self::Cardio, Self::Flexibility];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Cardio => "cardio",
            Self::Flexibility => "flexibility",
        }
    }

    /// Weight applied to a workout's duration when computing the weekly intensity score.
    #[must_use]
    pub fn intensity_weight(self) -> f64 {
        match self {
            Self::Strength => 2.0,
            Self::Cardio => 1.5,
            Self::Flexibility => 1.0,
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lower)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::Snack];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lower)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    WeightKg,
    SleepHours,
    WaterL,
    Mood,
    WaistCm,
    ChestCm,
}

impl MetricType {
    pub const ALL: [MetricType; 6] = [
        Self::WeightKg,
        Self::SleepHours,
        Self::WaterL,
        Self::Mood,
        Self::WaistCm,
        Self::ChestCm,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WeightKg => "weight_kg",
            Self::SleepHours => "sleep_hours",
            Self::WaterL => "water_l",
            Self::Mood => "mood",
            Self::WaistCm => "waist_cm",
            Self::ChestCm => "chest_cm",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lower)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Low,
    Moderate,
    High,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 3] = [Self::Low, Self::Moderate, Self::High];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lower)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    WeightLoss,
    MuscleGain,
    Endurance,
    Maintenance,
}

impl GoalType {
    pub const ALL: [GoalType; 4] = [
        Self::WeightLoss,
        Self::MuscleGain,
        Self::Endurance,
        Self::Maintenance,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WeightLoss => "weight_loss",
            Self::MuscleGain => "muscle_gain",
            Self::Endurance => "endurance",
            Self::Maintenance => "maintenance",
        }
    }

    /// Only weight-based goals carry a meaningful target weight.
    #[must_use]
    pub fn is_weight_based(self) -> bool {
        matches!(self, Self::WeightLoss | Self::MuscleGain)
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lower)
    }
}

// --- Users ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub target_weight_kg: Option<f64>,
    pub daily_calorie_goal: Option<f64>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl Goal {
    #[must_use]
    pub fn maintenance(start_date: NaiveDate) -> Self {
        Self {
            goal_type: GoalType::Maintenance,
            target_weight_kg: None,
            daily_calorie_goal: None,
            start_date,
            end_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub pin: String,
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub pin: String,
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    /// Defaults to `moderate` when absent.
    pub activity_level: Option<String>,
}

/// Fields to change on a user's goal; unset fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct GoalUpdate {
    pub goal_type: Option<String>,
    pub target_weight_kg: Option<f64>,
    pub daily_calorie_goal: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

// --- Workouts ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    #[serde(flatten)]
    pub detail: ExerciseDetail,
}

/// Shape of an exercise depends on the workout type it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExerciseDetail {
    Strength {
        sets: u32,
        reps: u32,
        weight_kg: f64,
    },
    Cardio {
        distance_km: f64,
        time_min: f64,
    },
    Flexibility {
        minutes: f64,
    },
}

impl Exercise {
    #[must_use]
    pub fn strength(name: &str, sets: u32, reps: u32, weight_kg: f64) -> Self {
        Self {
            name: name.to_string(),
            detail: ExerciseDetail::Strength {
                sets,
                reps,
                weight_kg,
            },
        }
    }

    #[must_use]
    pub fn cardio(name: &str, distance_km: f64, time_min: f64) -> Self {
        Self {
            name: name.to_string(),
            detail: ExerciseDetail::Cardio {
                distance_km,
                time_min,
            },
        }
    }

    #[must_use]
    pub fn flexibility(name: &str, minutes: f64) -> Self {
        Self {
            name: name.to_string(),
            detail: ExerciseDetail::Flexibility { minutes },
        }
    }

    #[must_use]
    pub fn lifted_kg(&self) -> Option<f64> {
        match self.detail {
            ExerciseDetail::Strength { weight_kg, .. } => Some(weight_kg),
            _ => None,
        }
    }

    /// Minutes per kilometre; only defined when both distance and time are positive.
    #[must_use]
    pub fn pace_min_per_km(&self) -> Option<f64> {
        match self.detail {
            ExerciseDetail::Cardio {
                distance_km,
                time_min,
            } if distance_km > 0.0 && time_min > 0.0 => Some(time_min / distance_km),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    pub duration_min: f64,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub allow_future: bool,
    #[serde(default)]
    pub pr_flags: Vec<String>,
}

/// Raw workout candidate as entered by a caller, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkoutDraft {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub workout_type: Option<String>,
    pub duration_min: Option<f64>,
    pub exercises: Option<Vec<Exercise>>,
    pub notes: Option<String>,
    #[serde(default)]
    pub allow_future: bool,
}

/// A validated workout, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
    pub id: Option<String>,
    pub user_id: String,
    pub date: NaiveDate,
    pub workout_type: WorkoutType,
    pub duration_min: f64,
    pub exercises: Vec<Exercise>,
    pub notes: String,
    pub allow_future: bool,
}

#[derive(Debug, Clone, Default)]
pub struct WorkoutUpdate {
    pub date: Option<NaiveDate>,
    pub workout_type: Option<WorkoutType>,
    pub duration_min: Option<f64>,
    pub notes: Option<String>,
}

// --- Meals ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub grams: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Macros {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    pub user_id: String,
    #[serde(with = "minute_timestamp")]
    pub timestamp: NaiveDateTime,
    pub meal_type: MealType,
    #[serde(default)]
    pub items: Vec<FoodItem>,
    pub calories: f64,
    pub macros: Macros,
    #[serde(default)]
    pub allow_future: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MacrosDraft {
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
}

impl From<Macros> for MacrosDraft {
    fn from(m: Macros) -> Self {
        Self {
            protein_g: Some(m.protein_g),
            carbs_g: Some(m.carbs_g),
            fat_g: Some(m.fat_g),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MealDraft {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub timestamp: Option<String>,
    pub meal_type: Option<String>,
    pub items: Option<Vec<FoodItem>>,
    pub calories: Option<f64>,
    pub macros: Option<MacrosDraft>,
    #[serde(default)]
    pub allow_future: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMeal {
    pub id: Option<String>,
    pub user_id: String,
    pub timestamp: NaiveDateTime,
    pub meal_type: MealType,
    pub items: Vec<FoodItem>,
    pub calories: f64,
    pub macros: Macros,
    pub allow_future: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MealUpdate {
    pub timestamp: Option<NaiveDateTime>,
    pub meal_type: Option<MealType>,
    pub calories: Option<f64>,
}

// --- Body metrics ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub value: f64,
    #[serde(default)]
    pub allow_future: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricDraft {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub metric_type: Option<String>,
    pub value: Option<f64>,
    #[serde(default)]
    pub allow_future: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMetric {
    pub id: Option<String>,
    pub user_id: String,
    pub date: NaiveDate,
    pub metric_type: MetricType,
    pub value: f64,
    pub allow_future: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MetricUpdate {
    pub date: Option<NaiveDate>,
    pub value: Option<f64>,
}

// --- Summary types ---

#[derive(Debug, Clone, Serialize)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_workouts: usize,
    pub total_minutes: f64,
    pub intensity_score: f64,
    pub by_type: BTreeMap<WorkoutType, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestCardio {
    pub name: String,
    pub distance_km: f64,
    pub time_min: f64,
    pub pace_min_per_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalRecords {
    pub max_lift_kg: Option<f64>,
    pub max_lift_exercise: Option<String>,
    pub best_cardio: Option<BestCardio>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyCalories {
    pub date: NaiveDate,
    pub total_calories: f64,
    pub by_meal_type: BTreeMap<MealType, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MacroBreakdown {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub protein_pct: f64,
    pub carbs_pct: f64,
    pub fat_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricSummary {
    pub metric_type: MetricType,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub values: Vec<MetricPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GoalProgress {
    /// No weight metrics logged yet.
    NoData { goal_type: GoalType },
    /// Goal is not weight-based, or has no target weight.
    NotApplicable { goal_type: GoalType },
    Tracking {
        goal_type: GoalType,
        start_weight_kg: f64,
        current_weight_kg: f64,
        target_weight_kg: f64,
        progress_pct: f64,
        projected_end_date: Option<NaiveDate>,
    },
}

impl GoalProgress {
    #[must_use]
    pub fn progress_pct(&self) -> Option<f64> {
        match self {
            Self::Tracking { progress_pct, .. } => Some(*progress_pct),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightTrend {
    pub values: Vec<f64>,
    pub moving_average: Vec<f64>,
    pub window: usize,
    pub chart: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub user_name: String,
    pub date: NaiveDate,
    pub workouts_today: Vec<Workout>,
    pub days_since_last_workout: Option<i64>,
    pub calories_today: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calorie_goal: Option<f64>,
    /// Calories eaten minus the daily goal; positive is a surplus.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calorie_balance: Option<f64>,
    pub goal_progress: GoalProgress,
}

/// Days without a workout before the dashboard nags.
pub const REMINDER_AFTER_DAYS: i64 = 3;

impl Dashboard {
    /// No workout today and none in the last [`REMINDER_AFTER_DAYS`] days (or ever).
    #[must_use]
    pub fn needs_workout_reminder(&self) -> bool {
        self.workouts_today.is_empty()
            && self
                .days_since_last_workout
                .is_none_or(|d| d >= REMINDER_AFTER_DAYS)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserEntries {
    pub workouts: Vec<Workout>,
    pub meals: Vec<Meal>,
    pub metrics: Vec<Metric>,
}

#[must_use]
pub(crate) fn round_dp(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Serde adapter for meal timestamps stored at minute granularity.
pub mod minute_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_parse_is_case_insensitive() {
        assert_eq!(WorkoutType::parse("Strength"), Some(WorkoutType::Strength));
        assert_eq!(MealType::parse(" snack "), Some(MealType::Snack));
        assert_eq!(MetricType::parse("WEIGHT_KG"), Some(MetricType::WeightKg));
        assert_eq!(GoalType::parse("muscle_gain"), Some(GoalType::MuscleGain));
        assert_eq!(ActivityLevel::parse("extreme"), None);
        assert_eq!(WorkoutType::parse("yoga"), None);
    }

    #[test]
    fn test_workout_json_field_names() {
        let json = r#"{
            "id": "w1",
            "user_id": "u1",
            "date": "2025-01-01",
            "type": "strength",
            "duration_min": 45,
            "exercises": [{"name": "Bench Press", "sets": 3, "reps": 5, "weight_kg": 60}]
        }"#;
        let w: Workout = serde_json::from_str(json).unwrap();
        assert_eq!(w.workout_type, WorkoutType::Strength);
        assert_eq!(w.exercises[0].lifted_kg(), Some(60.0));
        assert!(w.notes.is_empty());
        assert!(w.pr_flags.is_empty());

        let out = serde_json::to_value(&w).unwrap();
        assert_eq!(out["type"], "strength");
        assert_eq!(out["exercises"][0]["weight_kg"], 60.0);
        assert_eq!(out["exercises"][0]["name"], "Bench Press");
    }

    #[test]
    fn test_exercise_shapes_deserialize() {
        let cardio: Exercise =
            serde_json::from_str(r#"{"name": "Run", "distance_km": 5, "time_min": 25}"#).unwrap();
        assert_eq!(cardio.pace_min_per_km(), Some(5.0));
        assert_eq!(cardio.lifted_kg(), None);

        let stretch: Exercise =
            serde_json::from_str(r#"{"name": "Hamstrings", "minutes": 10}"#).unwrap();
        assert_eq!(stretch.detail, ExerciseDetail::Flexibility { minutes: 10.0 });
    }

    #[test]
    fn test_pace_requires_positive_distance_and_time() {
        assert_eq!(Exercise::cardio("Row", 0.0, 10.0).pace_min_per_km(), None);
        assert_eq!(Exercise::cardio("Row", 2.0, 0.0).pace_min_per_km(), None);
    }

    #[test]
    fn test_meal_timestamp_format() {
        let json = r#"{
            "id": "m1",
            "user_id": "u1",
            "timestamp": "2025-01-01 08:00",
            "meal_type": "breakfast",
            "items": [{"name": "Oats", "grams": 80}],
            "calories": 300,
            "macros": {"protein_g": 10, "carbs_g": 50, "fat_g": 5}
        }"#;
        let m: Meal = serde_json::from_str(json).unwrap();
        assert_eq!(m.timestamp.format("%H:%M").to_string(), "08:00");
        let out = serde_json::to_value(&m).unwrap();
        assert_eq!(out["timestamp"], "2025-01-01 08:00");
    }

    #[test]
    fn test_meal_timestamp_rejects_seconds() {
        let json = r#"{
            "id": "m1", "user_id": "u1", "timestamp": "2025-01-01 08:00:00",
            "meal_type": "breakfast", "calories": 1,
            "macros": {"protein_g": 0, "carbs_g": 0, "fat_g": 0}
        }"#;
        assert!(serde_json::from_str::<Meal>(json).is_err());
    }

    #[test]
    fn test_goal_progress_serializes_with_status_tag() {
        let gp = GoalProgress::NotApplicable {
            goal_type: GoalType::Endurance,
        };
        let v = serde_json::to_value(&gp).unwrap();
        assert_eq!(v["status"], "not_applicable");
        assert_eq!(v["goal_type"], "endurance");
        assert!(gp.progress_pct().is_none());
    }

    #[test]
    fn test_round_dp() {
        assert!((round_dp(15.384_615, 2) - 15.38).abs() < f64::EPSILON);
        assert!((round_dp(899.96, 1) - 900.0).abs() < f64::EPSILON);
    }
}
