use anyhow::{Context, Result};
use serde::Serialize;

use stride_core::models::{Goal, GoalProgress, GoalUpdate, RegisterUser};

use super::Session;
use super::helpers::{fmt_opt, or_not_found};

pub(crate) fn cmd_register(
    session: &mut Session,
    name: String,
    age: u32,
    height_cm: f64,
    weight_kg: f64,
    activity_level: Option<String>,
    json: bool,
) -> Result<()> {
    let email = session
        .email()
        .context("Registering needs --email (or STRIDE_EMAIL)")?
        .to_string();
    let pin = session
        .pin()
        .context("Registering needs --pin (or STRIDE_PIN)")?
        .to_string();

    let today = session.today();
    let user = session.tracker.register(
        RegisterUser {
            name,
            email,
            pin,
            age,
            height_cm,
            weight_kg,
            activity_level,
        },
        today,
    )?;

    if json {
        #[derive(Serialize)]
        struct Registered<'a> {
            id: &'a str,
            name: &'a str,
            email: &'a str,
        }
        let out = Registered {
            id: &user.id,
            name: &user.name,
            email: &user.email,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Registered {} <{}>", user.name, user.email);
        println!("  Activity: {}", user.activity_level.as_str());
        println!("  Goal: {} (since {})", user.goal.goal_type.as_str(), user.goal.start_date);
    }

    Ok(())
}

pub(crate) fn cmd_goal_set(
    session: &mut Session,
    goal_type: Option<String>,
    target_weight_kg: Option<f64>,
    daily_calorie_goal: Option<f64>,
    start_date: Option<String>,
    end_date: Option<String>,
    json: bool,
) -> Result<()> {
    let user_id = session.user_id()?;
    let user = or_not_found(
        session.tracker.update_goal(
            &user_id,
            GoalUpdate {
                goal_type,
                target_weight_kg,
                daily_calorie_goal,
                start_date,
                end_date,
            },
        ),
        json,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user.goal)?);
    } else {
        println!("Goal updated.");
        print_goal(&user.goal);
    }

    Ok(())
}

pub(crate) fn cmd_goal_show(session: &Session, json: bool) -> Result<()> {
    let user = session.user()?;
    let progress = or_not_found(session.tracker.goal_progress(&user.id), json)?;

    if json {
        #[derive(Serialize)]
        struct GoalView<'a> {
            goal: &'a Goal,
            progress: &'a GoalProgress,
        }
        let view = GoalView {
            goal: &user.goal,
            progress: &progress,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_goal(&user.goal);
        print_progress(&progress);
    }

    Ok(())
}

fn print_goal(goal: &Goal) {
    println!("  Type:          {}", goal.goal_type.as_str());
    println!("  Target weight: {} kg", fmt_opt(goal.target_weight_kg, 1));
    println!("  Calorie goal:  {} kcal", fmt_opt(goal.daily_calorie_goal, 0));
    let end = goal
        .end_date
        .map_or_else(|| "open".to_string(), |d| d.to_string());
    println!("  Period:        {} to {end}", goal.start_date);
}

pub(super) fn print_progress(progress: &GoalProgress) {
    match progress {
        GoalProgress::NoData { .. } => println!("Goal progress: no weight data yet"),
        GoalProgress::NotApplicable { goal_type } => {
            println!("Goal progress: N/A ({})", goal_type.as_str());
        }
        GoalProgress::Tracking {
            start_weight_kg,
            current_weight_kg,
            target_weight_kg,
            progress_pct,
            projected_end_date,
            ..
        } => {
            println!(
                "Goal progress: {progress_pct:.1}% ({start_weight_kg:.1} -> {current_weight_kg:.1} kg, target {target_weight_kg:.1} kg)"
            );
            if let Some(date) = projected_end_date {
                println!("Projected completion: {date}");
            }
        }
    }
}
