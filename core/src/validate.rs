//! Entry validation.
//!
//! Each validator turns a raw draft into its typed, storable form or reports the
//! first rule the draft breaks. Nothing here panics or touches storage; callers
//! decide how to report a rejected entry.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::models::{
    DATE_FORMAT, Macros, MealDraft, MealType, MealUpdate, MetricDraft, MetricType, MetricUpdate,
    NewMeal, NewMetric, NewWorkout, TIMESTAMP_FORMAT, WorkoutDraft, WorkoutType, WorkoutUpdate,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid date '{0}'. Use YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid timestamp '{0}'. Use YYYY-MM-DD HH:MM")]
    InvalidTimestamp(String),

    #[error("Date {0} is in the future")]
    FutureDate(NaiveDate),

    #[error("Invalid workout type '{0}'. Must be one of: strength, cardio, flexibility")]
    UnknownWorkoutType(String),

    #[error("Invalid meal type '{0}'. Must be one of: breakfast, lunch, dinner, snack")]
    UnknownMealType(String),

    #[error(
        "Invalid metric type '{0}'. Must be one of: weight_kg, sleep_hours, water_l, mood, waist_cm, chest_cm"
    )]
    UnknownMetricType(String),

    #[error("Field '{0}' must be a number")]
    NotANumber(&'static str),

    #[error("Duration must be greater than 0 (got {0})")]
    NonPositiveDuration(f64),

    #[error("Calories must not be negative (got {0})")]
    NegativeCalories(f64),

    #[error("{name} must not be negative (got {value})")]
    NegativeMacro { name: &'static str, value: f64 },

    #[error("Mood must be between 1 and 10 (got {0})")]
    MoodOutOfRange(f64),

    #[error("Value must be greater than 0 (got {0})")]
    NonPositiveValue(f64),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a workout draft against `today`.
pub fn validate_workout(draft: &WorkoutDraft, today: NaiveDate) -> ValidationResult<NewWorkout> {
    let id = check_id(draft.id.as_deref())?;
    let user_id = required(draft.user_id.as_ref(), "user_id")?;
    let date_str = required(draft.date.as_ref(), "date")?;
    let type_str = required(draft.workout_type.as_ref(), "type")?;
    let duration_min = *required(draft.duration_min.as_ref(), "duration_min")?;
    let exercises = required(draft.exercises.as_ref(), "exercises")?;

    let date = parse_date(date_str)?;
    check_not_future(date, today, draft.allow_future)?;

    let duration_min = finite(duration_min, "duration_min")?;
    if duration_min <= 0.0 {
        return Err(ValidationError::NonPositiveDuration(duration_min));
    }

    let workout_type = WorkoutType::parse(type_str)
        .ok_or_else(|| ValidationError::UnknownWorkoutType(type_str.clone()))?;

    Ok(NewWorkout {
        id,
        user_id: user_id.clone(),
        date,
        workout_type,
        duration_min,
        exercises: exercises.clone(),
        notes: draft.notes.clone().unwrap_or_default(),
        allow_future: draft.allow_future,
    })
}

/// Validate a meal draft against `today`.
pub fn validate_meal(draft: &MealDraft, today: NaiveDate) -> ValidationResult<NewMeal> {
    let id = check_id(draft.id.as_deref())?;
    let user_id = required(draft.user_id.as_ref(), "user_id")?;
    let ts_str = required(draft.timestamp.as_ref(), "timestamp")?;
    let type_str = required(draft.meal_type.as_ref(), "meal_type")?;
    let items = required(draft.items.as_ref(), "items")?;
    let calories = *required(draft.calories.as_ref(), "calories")?;
    let macros = required(draft.macros.as_ref(), "macros")?;

    let timestamp = NaiveDateTime::parse_from_str(ts_str.trim(), TIMESTAMP_FORMAT)
        .map_err(|_| ValidationError::InvalidTimestamp(ts_str.clone()))?;
    check_not_future(timestamp.date(), today, draft.allow_future)?;

    let calories = finite(calories, "calories")?;
    if calories < 0.0 {
        return Err(ValidationError::NegativeCalories(calories));
    }

    let macros = Macros {
        protein_g: macro_grams(macros.protein_g, "protein_g")?,
        carbs_g: macro_grams(macros.carbs_g, "carbs_g")?,
        fat_g: macro_grams(macros.fat_g, "fat_g")?,
    };

    let meal_type = MealType::parse(type_str)
        .ok_or_else(|| ValidationError::UnknownMealType(type_str.clone()))?;

    Ok(NewMeal {
        id,
        user_id: user_id.clone(),
        timestamp,
        meal_type,
        items: items.clone(),
        calories,
        macros,
        allow_future: draft.allow_future,
    })
}

/// Validate a body-metric draft against `today`.
pub fn validate_metric(draft: &MetricDraft, today: NaiveDate) -> ValidationResult<NewMetric> {
    let id = check_id(draft.id.as_deref())?;
    let user_id = required(draft.user_id.as_ref(), "user_id")?;
    let date_str = required(draft.date.as_ref(), "date")?;
    let type_str = required(draft.metric_type.as_ref(), "type")?;
    let value = *required(draft.value.as_ref(), "value")?;

    let date = parse_date(date_str)?;
    check_not_future(date, today, draft.allow_future)?;

    let metric_type = MetricType::parse(type_str)
        .ok_or_else(|| ValidationError::UnknownMetricType(type_str.clone()))?;

    let value = finite(value, "value")?;
    if metric_type == MetricType::Mood {
        if !(1.0..=10.0).contains(&value) {
            return Err(ValidationError::MoodOutOfRange(value));
        }
    } else if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue(value));
    }

    Ok(NewMetric {
        id,
        user_id: user_id.clone(),
        date,
        metric_type,
        value,
        allow_future: draft.allow_future,
    })
}

/// Updates skip the range rules but must still carry numbers JSON can hold.
pub fn check_workout_update(update: &WorkoutUpdate) -> ValidationResult<()> {
    finite_opt(update.duration_min, "duration_min")
}

pub fn check_meal_update(update: &MealUpdate) -> ValidationResult<()> {
    finite_opt(update.calories, "calories")
}

pub fn check_metric_update(update: &MetricUpdate) -> ValidationResult<()> {
    finite_opt(update.value, "value")
}

pub fn parse_date(s: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

fn required<'a, T>(value: Option<&'a T>, field: &'static str) -> ValidationResult<&'a T> {
    value.ok_or(ValidationError::MissingField(field))
}

fn check_id(id: Option<&str>) -> ValidationResult<Option<String>> {
    match id {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Err(ValidationError::MissingField("id")),
        Some(s) => Ok(Some(s.to_string())),
    }
}

fn check_not_future(date: NaiveDate, today: NaiveDate, allow_future: bool) -> ValidationResult<()> {
    if date > today && !allow_future {
        return Err(ValidationError::FutureDate(date));
    }
    Ok(())
}

fn finite(value: f64, field: &'static str) -> ValidationResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotANumber(field))
    }
}

fn finite_opt(value: Option<f64>, field: &'static str) -> ValidationResult<()> {
    value.map_or(Ok(()), |v| finite(v, field).map(|_| ()))
}

fn macro_grams(value: Option<f64>, name: &'static str) -> ValidationResult<f64> {
    let value = finite(value.ok_or(ValidationError::MissingField(name))?, name)?;
    if value < 0.0 {
        return Err(ValidationError::NegativeMacro { name, value });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Exercise, FoodItem, MacrosDraft};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn workout_draft() -> WorkoutDraft {
        WorkoutDraft {
            id: None,
            user_id: Some("u1".to_string()),
            date: Some("2025-01-10".to_string()),
            workout_type: Some("strength".to_string()),
            duration_min: Some(45.0),
            exercises: Some(vec![Exercise::strength("Bench Press", 3, 5, 60.0)]),
            notes: None,
            allow_future: false,
        }
    }

    fn meal_draft() -> MealDraft {
        MealDraft {
            id: None,
            user_id: Some("u1".to_string()),
            timestamp: Some("2025-01-15 08:00".to_string()),
            meal_type: Some("breakfast".to_string()),
            items: Some(vec![FoodItem {
                name: "Oats".to_string(),
                grams: 80.0,
            }]),
            calories: Some(300.0),
            macros: Some(MacrosDraft {
                protein_g: Some(10.0),
                carbs_g: Some(50.0),
                fat_g: Some(5.0),
            }),
            allow_future: false,
        }
    }

    fn metric_draft(metric_type: &str, value: f64) -> MetricDraft {
        MetricDraft {
            id: None,
            user_id: Some("u1".to_string()),
            date: Some("2025-01-15".to_string()),
            metric_type: Some(metric_type.to_string()),
            value: Some(value),
            allow_future: false,
        }
    }

    #[test]
    fn test_valid_workout() {
        let w = validate_workout(&workout_draft(), today()).unwrap();
        assert_eq!(w.workout_type, WorkoutType::Strength);
        assert_eq!(w.date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        assert!(w.notes.is_empty());
        assert!(w.id.is_none());
    }

    #[test]
    fn test_workout_dated_today_passes() {
        let mut draft = workout_draft();
        draft.date = Some("2025-01-15".to_string());
        assert!(validate_workout(&draft, today()).is_ok());
    }

    #[test]
    fn test_workout_future_date_rejected_without_override() {
        let mut draft = workout_draft();
        draft.date = Some("2025-01-16".to_string());
        assert_eq!(
            validate_workout(&draft, today()),
            Err(ValidationError::FutureDate(
                NaiveDate::from_ymd_opt(2025, 1, 16).unwrap()
            ))
        );

        draft.allow_future = true;
        assert!(validate_workout(&draft, today()).is_ok());
    }

    #[test]
    fn test_workout_missing_fields() {
        let mut draft = workout_draft();
        draft.exercises = None;
        assert_eq!(
            validate_workout(&draft, today()),
            Err(ValidationError::MissingField("exercises"))
        );

        let mut draft = workout_draft();
        draft.user_id = None;
        assert_eq!(
            validate_workout(&draft, today()),
            Err(ValidationError::MissingField("user_id"))
        );
    }

    #[test]
    fn test_workout_blank_id_rejected() {
        let mut draft = workout_draft();
        draft.id = Some("  ".to_string());
        assert_eq!(
            validate_workout(&draft, today()),
            Err(ValidationError::MissingField("id"))
        );
    }

    #[test]
    fn test_workout_empty_exercise_list_is_fine() {
        let mut draft = workout_draft();
        draft.exercises = Some(vec![]);
        assert!(validate_workout(&draft, today()).is_ok());
    }

    #[test]
    fn test_workout_bad_values() {
        let mut draft = workout_draft();
        draft.date = Some("2025-13-01".to_string());
        assert!(matches!(
            validate_workout(&draft, today()),
            Err(ValidationError::InvalidDate(_))
        ));

        let mut draft = workout_draft();
        draft.duration_min = Some(0.0);
        assert_eq!(
            validate_workout(&draft, today()),
            Err(ValidationError::NonPositiveDuration(0.0))
        );

        let mut draft = workout_draft();
        draft.duration_min = Some(f64::NAN);
        assert_eq!(
            validate_workout(&draft, today()),
            Err(ValidationError::NotANumber("duration_min"))
        );

        let mut draft = workout_draft();
        draft.workout_type = Some("yoga".to_string());
        assert_eq!(
            validate_workout(&draft, today()),
            Err(ValidationError::UnknownWorkoutType("yoga".to_string()))
        );
    }

    #[test]
    fn test_valid_meal() {
        let m = validate_meal(&meal_draft(), today()).unwrap();
        assert_eq!(m.meal_type, MealType::Breakfast);
        assert!((m.macros.carbs_g - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_meal_timestamp_rules() {
        let mut draft = meal_draft();
        draft.timestamp = Some("2025-01-15".to_string());
        assert!(matches!(
            validate_meal(&draft, today()),
            Err(ValidationError::InvalidTimestamp(_))
        ));

        let mut draft = meal_draft();
        draft.timestamp = Some("2025-01-16 00:01".to_string());
        assert!(matches!(
            validate_meal(&draft, today()),
            Err(ValidationError::FutureDate(_))
        ));

        // Late on the current day is still today.
        let mut draft = meal_draft();
        draft.timestamp = Some("2025-01-15 23:59".to_string());
        assert!(validate_meal(&draft, today()).is_ok());
    }

    #[test]
    fn test_meal_zero_calories_allowed() {
        let mut draft = meal_draft();
        draft.calories = Some(0.0);
        assert!(validate_meal(&draft, today()).is_ok());

        draft.calories = Some(-1.0);
        assert_eq!(
            validate_meal(&draft, today()),
            Err(ValidationError::NegativeCalories(-1.0))
        );
    }

    #[test]
    fn test_meal_macro_rules() {
        let mut draft = meal_draft();
        draft.macros = Some(MacrosDraft {
            protein_g: Some(10.0),
            carbs_g: None,
            fat_g: Some(5.0),
        });
        assert_eq!(
            validate_meal(&draft, today()),
            Err(ValidationError::MissingField("carbs_g"))
        );

        let mut draft = meal_draft();
        draft.macros = Some(MacrosDraft {
            protein_g: Some(10.0),
            carbs_g: Some(5.0),
            fat_g: Some(-2.0),
        });
        assert_eq!(
            validate_meal(&draft, today()),
            Err(ValidationError::NegativeMacro {
                name: "fat_g",
                value: -2.0
            })
        );
    }

    #[test]
    fn test_meal_unknown_type() {
        let mut draft = meal_draft();
        draft.meal_type = Some("brunch".to_string());
        assert_eq!(
            validate_meal(&draft, today()),
            Err(ValidationError::UnknownMealType("brunch".to_string()))
        );
    }

    #[test]
    fn test_metric_mood_range() {
        assert!(validate_metric(&metric_draft("mood", 1.0), today()).is_ok());
        assert!(validate_metric(&metric_draft("mood", 10.0), today()).is_ok());
        assert_eq!(
            validate_metric(&metric_draft("mood", 0.5), today()),
            Err(ValidationError::MoodOutOfRange(0.5))
        );
        assert_eq!(
            validate_metric(&metric_draft("mood", 11.0), today()),
            Err(ValidationError::MoodOutOfRange(11.0))
        );
    }

    #[test]
    fn test_metric_positive_values() {
        assert!(validate_metric(&metric_draft("weight_kg", 80.0), today()).is_ok());
        assert_eq!(
            validate_metric(&metric_draft("sleep_hours", 0.0), today()),
            Err(ValidationError::NonPositiveValue(0.0))
        );
        assert_eq!(
            validate_metric(&metric_draft("steps", 1000.0), today()),
            Err(ValidationError::UnknownMetricType("steps".to_string()))
        );
    }

    #[test]
    fn test_metric_future_date() {
        let mut draft = metric_draft("water_l", 2.0);
        draft.date = Some("2025-02-01".to_string());
        assert!(matches!(
            validate_metric(&draft, today()),
            Err(ValidationError::FutureDate(_))
        ));
        draft.allow_future = true;
        assert!(validate_metric(&draft, today()).is_ok());
    }

    #[test]
    fn test_update_checks_reject_non_finite_numbers() {
        assert_eq!(
            check_metric_update(&MetricUpdate {
                value: Some(f64::NAN),
                ..Default::default()
            }),
            Err(ValidationError::NotANumber("value"))
        );
        assert_eq!(
            check_workout_update(&WorkoutUpdate {
                duration_min: Some(f64::INFINITY),
                ..Default::default()
            }),
            Err(ValidationError::NotANumber("duration_min"))
        );
        assert_eq!(
            check_meal_update(&MealUpdate {
                calories: Some(f64::NAN),
                ..Default::default()
            }),
            Err(ValidationError::NotANumber("calories"))
        );
        // Range rules are not applied to updates.
        assert!(
            check_metric_update(&MetricUpdate {
                value: Some(-3.0),
                ..Default::default()
            })
            .is_ok()
        );
        assert!(check_workout_update(&WorkoutUpdate::default()).is_ok());
    }
}
