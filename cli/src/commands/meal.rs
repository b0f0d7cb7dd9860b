use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use stride_core::models::{MacrosDraft, Meal, MealDraft, MealType, MealUpdate, TIMESTAMP_FORMAT};
use stride_core::validate::ValidationError;

use super::Session;
use super::helpers::{no_neg_zero, now_timestamp, or_not_found, parse_date, parse_food_item};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_meal_log(
    session: &mut Session,
    meal_type: String,
    calories: f64,
    (protein_g, carbs_g, fat_g): (f64, f64, f64),
    items: &[String],
    at: Option<String>,
    allow_future: bool,
    json: bool,
) -> Result<()> {
    let user_id = session.user_id()?;
    let today = session.today();
    let items = items
        .iter()
        .map(|i| parse_food_item(i))
        .collect::<Result<Vec<_>>>()?;

    let draft = MealDraft {
        id: None,
        user_id: Some(user_id),
        timestamp: Some(at.unwrap_or_else(now_timestamp)),
        meal_type: Some(meal_type),
        items: Some(items),
        calories: Some(calories),
        macros: Some(MacrosDraft {
            protein_g: Some(protein_g),
            carbs_g: Some(carbs_g),
            fat_g: Some(fat_g),
        }),
        allow_future,
    };
    let meal = session.tracker.log_meal(&draft, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&meal)?);
    } else {
        println!(
            "Logged {} at {}: {:.0} kcal | P:{:.0}g C:{:.0}g F:{:.0}g [{}]",
            meal.meal_type.as_str(),
            meal.timestamp.format(TIMESTAMP_FORMAT),
            meal.calories,
            meal.macros.protein_g,
            meal.macros.carbs_g,
            meal.macros.fat_g,
            meal.id
        );
        for item in &meal.items {
            println!("  - {} ({:.0}g)", item.name, item.grams);
        }
    }

    Ok(())
}

pub(crate) fn cmd_meal_update(
    session: &mut Session,
    id: &str,
    at: Option<&str>,
    meal_type: Option<&str>,
    calories: Option<f64>,
    json: bool,
) -> Result<()> {
    let user_id = session.user_id()?;

    let timestamp = at
        .map(|s| {
            NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
                .with_context(|| format!("Invalid timestamp '{s}'. Use YYYY-MM-DD HH:MM"))
        })
        .transpose()?;
    let meal_type = meal_type
        .map(|t| MealType::parse(t).ok_or_else(|| ValidationError::UnknownMealType(t.to_string())))
        .transpose()?;

    let update = MealUpdate {
        timestamp,
        meal_type,
        calories,
    };
    let meal = or_not_found(session.tracker.update_meal(&user_id, id, update), json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&meal)?);
    } else {
        println!("Updated meal {}", meal.id);
        print_meals(std::slice::from_ref(&meal));
    }

    Ok(())
}

pub(crate) fn cmd_meal_delete(session: &mut Session, id: &str, json: bool) -> Result<()> {
    let user_id = session.user_id()?;
    let meal = or_not_found(session.tracker.delete_meal(&user_id, id), json)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": meal.id }));
    } else {
        println!(
            "Deleted {} at {} [{}]",
            meal.meal_type.as_str(),
            meal.timestamp.format(TIMESTAMP_FORMAT),
            meal.id
        );
    }

    Ok(())
}

pub(crate) fn cmd_meal_day(session: &Session, date: Option<String>, json: bool) -> Result<()> {
    let user = session.user()?;
    let date = parse_date(date.as_deref(), session.today())?;
    let summary = session.tracker.daily_calories(&user.id, date);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("=== {} ===\n", summary.date);
    for (meal_type, calories) in &summary.by_meal_type {
        println!("  {:<10} {:>7.0} kcal", meal_type.as_str(), no_neg_zero(*calories));
    }
    println!("  {:<10} {:>7.0} kcal", "TOTAL", no_neg_zero(summary.total_calories));

    if let Some(goal) = user.goal.daily_calorie_goal {
        let remaining = goal - summary.total_calories;
        println!("  {:<10} {:>7.0} kcal", "GOAL", goal);
        println!("  {:<10} {:>7.0} kcal", "REMAINING", no_neg_zero(remaining));
    }

    Ok(())
}

pub(crate) fn cmd_meal_macros(
    session: &Session,
    from: Option<String>,
    to: Option<String>,
    json: bool,
) -> Result<()> {
    let user_id = session.user_id()?;
    let today = session.today();
    let end = parse_date(to.as_deref(), today)?;
    let start = match from {
        Some(s) => parse_date(Some(&s), today)?,
        None => end - Duration::days(6),
    };
    let b = session.tracker.macro_breakdown(&user_id, start, end);

    if json {
        println!("{}", serde_json::to_string_pretty(&b)?);
        return Ok(());
    }

    println!("=== {} to {} ===\n", b.start, b.end);
    println!("  Calories: {:.0} kcal", no_neg_zero(b.calories));
    println!("  Protein:  {:>6.1}g ({:.1}%)", b.protein_g, b.protein_pct);
    println!("  Carbs:    {:>6.1}g ({:.1}%)", b.carbs_g, b.carbs_pct);
    println!("  Fat:      {:>6.1}g ({:.1}%)", b.fat_g, b.fat_pct);

    Ok(())
}

pub(super) fn print_meals(meals: &[Meal]) {
    #[derive(Tabled)]
    struct MealRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Meal")]
        meal_type: &'static str,
        #[tabled(rename = "kcal")]
        calories: String,
        #[tabled(rename = "P")]
        protein: String,
        #[tabled(rename = "C")]
        carbs: String,
        #[tabled(rename = "F")]
        fat: String,
    }

    let rows: Vec<MealRow> = meals
        .iter()
        .map(|m| MealRow {
            id: m.id.clone(),
            time: m.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            meal_type: m.meal_type.as_str(),
            calories: format!("{:.0}", m.calories),
            protein: format!("{:.1}", m.macros.protein_g),
            carbs: format!("{:.1}", m.macros.carbs_g),
            fat: format!("{:.1}", m.macros.fat_g),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..7)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}
