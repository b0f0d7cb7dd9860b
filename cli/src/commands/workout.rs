use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use stride_core::models::{Workout, WorkoutDraft, WorkoutType, WorkoutUpdate};
use stride_core::validate::{ValidationError, parse_date as parse_entry_date};

use super::Session;
use super::helpers::{
    fmt_opt, no_neg_zero, or_not_found, parse_date, parse_exercise, resolve_date, truncate,
    week_start,
};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_workout_log(
    session: &mut Session,
    workout_type: String,
    duration_min: f64,
    exercises: &[String],
    date: Option<String>,
    notes: Option<String>,
    allow_future: bool,
    json: bool,
) -> Result<()> {
    let user_id = session.user_id()?;
    let today = session.today();
    let parsed_type = WorkoutType::parse(&workout_type)
        .ok_or_else(|| ValidationError::UnknownWorkoutType(workout_type.clone()))?;
    let exercises = exercises
        .iter()
        .map(|e| parse_exercise(parsed_type, e))
        .collect::<Result<Vec<_>>>()?;

    let draft = WorkoutDraft {
        id: None,
        user_id: Some(user_id),
        date: Some(resolve_date(date.as_deref(), today)),
        workout_type: Some(workout_type),
        duration_min: Some(duration_min),
        exercises: Some(exercises),
        notes,
        allow_future,
    };
    let workout = session.tracker.log_workout(&draft, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&workout)?);
    } else {
        println!(
            "Logged {} workout on {}: {:.0} min, {} exercise(s) [{}]",
            workout.workout_type.as_str(),
            workout.date,
            workout.duration_min,
            workout.exercises.len(),
            workout.id
        );
        if !workout.pr_flags.is_empty() {
            println!("PRs detected:");
            for flag in &workout.pr_flags {
                println!("  - {flag}");
            }
        }
    }

    Ok(())
}

pub(crate) fn cmd_workout_update(
    session: &mut Session,
    id: &str,
    date: Option<String>,
    workout_type: Option<&str>,
    duration_min: Option<f64>,
    notes: Option<String>,
    json: bool,
) -> Result<()> {
    let user_id = session.user_id()?;
    let today = session.today();

    let date = date
        .map(|d| parse_entry_date(&resolve_date(Some(&d), today)))
        .transpose()?;
    let workout_type = workout_type
        .map(|t| {
            WorkoutType::parse(t).ok_or_else(|| ValidationError::UnknownWorkoutType(t.to_string()))
        })
        .transpose()?;

    let update = WorkoutUpdate {
        date,
        workout_type,
        duration_min,
        notes,
    };
    let workout = or_not_found(session.tracker.update_workout(&user_id, id, update), json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&workout)?);
    } else {
        println!("Updated workout {}", workout.id);
        print_workouts(std::slice::from_ref(&workout));
    }

    Ok(())
}

pub(crate) fn cmd_workout_delete(session: &mut Session, id: &str, json: bool) -> Result<()> {
    let user_id = session.user_id()?;
    let workout = or_not_found(session.tracker.delete_workout(&user_id, id), json)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": workout.id }));
    } else {
        println!(
            "Deleted {} workout on {} [{}]",
            workout.workout_type.as_str(),
            workout.date,
            workout.id
        );
    }

    Ok(())
}

pub(crate) fn cmd_workout_week(session: &Session, start: Option<String>, json: bool) -> Result<()> {
    let user_id = session.user_id()?;
    let start = match start {
        Some(s) => parse_date(Some(&s), session.today())?,
        None => week_start(session.today()),
    };
    let summary = session.tracker.weekly_summary(&user_id, start);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("=== {} to {} ===\n", summary.week_start, summary.week_end);
    println!("  Workouts:  {}", summary.total_workouts);
    println!("  Minutes:   {:.1}", no_neg_zero(summary.total_minutes));
    println!("  Intensity: {:.1}", no_neg_zero(summary.intensity_score));
    for (workout_type, count) in &summary.by_type {
        println!("    {:<12} {count}", workout_type.as_str());
    }

    Ok(())
}

pub(crate) fn cmd_workout_records(session: &Session, json: bool) -> Result<()> {
    let user_id = session.user_id()?;
    let records = session.tracker.personal_records(&user_id);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    match (&records.max_lift_exercise, records.max_lift_kg) {
        (Some(name), Some(kg)) => println!("Heaviest lift: {kg:.1} kg ({name})"),
        _ => println!("Heaviest lift: -"),
    }
    match &records.best_cardio {
        Some(c) => println!(
            "Fastest pace:  {} {}km in {}min ({} min/km)",
            c.name,
            c.distance_km,
            c.time_min,
            fmt_opt(Some(c.pace_min_per_km), 2)
        ),
        None => println!("Fastest pace:  -"),
    }

    Ok(())
}

pub(super) fn print_workouts(workouts: &[Workout]) {
    #[derive(Tabled)]
    struct WorkoutRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Type")]
        workout_type: &'static str,
        #[tabled(rename = "Minutes")]
        minutes: String,
        #[tabled(rename = "Exercises")]
        exercises: usize,
        #[tabled(rename = "PRs")]
        prs: usize,
        #[tabled(rename = "Notes")]
        notes: String,
    }

    let rows: Vec<WorkoutRow> = workouts
        .iter()
        .map(|w| WorkoutRow {
            id: w.id.clone(),
            date: w.date.to_string(),
            workout_type: w.workout_type.as_str(),
            minutes: format!("{:.0}", w.duration_min),
            exercises: w.exercises.len(),
            prs: w.pr_flags.len(),
            notes: truncate(&w.notes, 30),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}
