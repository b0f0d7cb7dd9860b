use anyhow::Result;

use super::Session;
use super::helpers::{fmt_opt, no_neg_zero, or_not_found};
use super::meal::print_meals;
use super::metric::print_metrics;
use super::profile::print_progress;
use super::workout::print_workouts;

pub(crate) fn cmd_dashboard(session: &Session, json: bool) -> Result<()> {
    let user_id = session.user_id()?;
    let dash = or_not_found(session.tracker.dashboard(&user_id, session.today()), json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dash)?);
        return Ok(());
    }

    println!("=== Dashboard: {} ({}) ===\n", dash.user_name, dash.date);

    println!("Workouts today: {}", dash.workouts_today.len());
    for w in &dash.workouts_today {
        println!(
            "  - {} {:.0} min | PRs: {}",
            w.workout_type.as_str(),
            w.duration_min,
            w.pr_flags.len()
        );
    }
    if dash.needs_workout_reminder() {
        match dash.days_since_last_workout {
            Some(days) => println!("Reminder: no workout recorded for {days} days."),
            None => println!("Reminder: no workouts logged yet."),
        }
    }

    println!("Calories today: {:.1}", no_neg_zero(dash.calories_today));
    if let (Some(goal), Some(balance)) = (dash.calorie_goal, dash.calorie_balance) {
        let status = if balance > 0.0 { "surplus" } else { "deficit" };
        println!(
            "Calorie goal: {} -> {:.1} {status}",
            fmt_opt(Some(goal), 0),
            no_neg_zero(balance.abs())
        );
    }

    print_progress(&dash.goal_progress);
    Ok(())
}

pub(crate) fn cmd_entries(session: &Session, json: bool) -> Result<()> {
    let user_id = session.user_id()?;
    let entries = session.tracker.entries(&user_id);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Workouts:");
    if entries.workouts.is_empty() {
        println!("  (none)");
    } else {
        print_workouts(&entries.workouts);
    }
    println!("Meals:");
    if entries.meals.is_empty() {
        println!("  (none)");
    } else {
        print_meals(&entries.meals);
    }
    println!("Metrics:");
    if entries.metrics.is_empty() {
        println!("  (none)");
    } else {
        print_metrics(&entries.metrics);
    }

    Ok(())
}
