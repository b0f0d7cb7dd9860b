use anyhow::{Context, Result, bail};
use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::Serialize;
use std::process;

use stride_core::models::{DATE_FORMAT, Exercise, FoodItem, TIMESTAMP_FORMAT, WorkoutType};

/// Expand today/yesterday/tomorrow (default: today). Anything else is passed through
/// untouched so validation can report it.
pub(crate) fn resolve_date(date_str: Option<&str>, today: NaiveDate) -> String {
    let date = match date_str.map(str::trim) {
        None | Some("today") => today,
        Some("yesterday") => today - Duration::days(1),
        Some("tomorrow") => today + Duration::days(1),
        Some(s) => return s.to_string(),
    };
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(date_str: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    let s = resolve_date(date_str, today);
    NaiveDate::parse_from_str(&s, DATE_FORMAT)
        .with_context(|| format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow"))
}

pub(crate) fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Monday of the week containing `date`.
pub(crate) fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Parse an exercise in the shape `workout_type` calls for: "name,sets,reps,kg" for
/// strength, "name,km,min" for cardio, "name,minutes" for flexibility.
pub(crate) fn parse_exercise(workout_type: WorkoutType, s: &str) -> Result<Exercise> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let name = parts[0];
    if name.is_empty() {
        bail!("Exercise '{s}' has no name");
    }
    let num = |v: &str| -> Result<f64> {
        v.parse::<f64>()
            .with_context(|| format!("Invalid number '{v}' in exercise '{s}'"))
    };
    let count = |v: &str| -> Result<u32> {
        v.parse::<u32>()
            .with_context(|| format!("Invalid count '{v}' in exercise '{s}'"))
    };

    match (workout_type, parts.as_slice()) {
        (WorkoutType::Strength, [_, sets, reps, kg]) => Ok(Exercise::strength(
            name,
            count(sets)?,
            count(reps)?,
            num(kg)?,
        )),
        (WorkoutType::Cardio, [_, km, min]) => Ok(Exercise::cardio(name, num(km)?, num(min)?)),
        (WorkoutType::Flexibility, [_, minutes]) => {
            Ok(Exercise::flexibility(name, num(minutes)?))
        }
        (WorkoutType::Strength, _) => {
            bail!("Invalid strength exercise '{s}'. Use 'name,sets,reps,kg'")
        }
        (WorkoutType::Cardio, _) => bail!("Invalid cardio exercise '{s}'. Use 'name,km,min'"),
        (WorkoutType::Flexibility, _) => {
            bail!("Invalid flexibility exercise '{s}'. Use 'name,minutes'")
        }
    }
}

/// Parse a food item as "name:grams".
pub(crate) fn parse_food_item(s: &str) -> Result<FoodItem> {
    let Some((name, grams)) = s.rsplit_once(':') else {
        bail!("Invalid food item '{s}'. Use 'name:grams'");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("Food item '{s}' has no name");
    }
    let grams: f64 = grams
        .trim()
        .trim_end_matches('g')
        .parse()
        .with_context(|| format!("Invalid grams in food item '{s}'"))?;
    if grams < 0.0 {
        bail!("Grams must not be negative in food item '{s}'");
    }
    Ok(FoodItem {
        name: name.to_string(),
        grams,
    })
}

/// Unwrap a tracker result, exiting with status 2 when the entry or user does not exist.
pub(crate) fn or_not_found<T>(result: stride_core::Result<T>, json: bool) -> Result<T> {
    match result {
        Ok(v) => Ok(v),
        Err(e) if e.is_not_found() => {
            if json {
                println!("{}", json_error(&e.to_string()));
            } else {
                eprintln!("{e}");
            }
            process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn fmt_opt(v: Option<f64>, precision: usize) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{:.*}", precision, no_neg_zero(v)))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
