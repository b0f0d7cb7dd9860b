use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{DailyCalories, MacroBreakdown, Meal, MealType, round_dp};

/// Calories eaten on `date`, in total and per meal type.
#[must_use]
pub fn daily_calorie_summary(meals: &[Meal], user_id: &str, date: NaiveDate) -> DailyCalories {
    let mut by_meal_type: BTreeMap<MealType, f64> =
        MealType::ALL.into_iter().map(|t| (t, 0.0)).collect();
    let mut total = 0.0;

    for m in meals
        .iter()
        .filter(|m| m.user_id == user_id && m.timestamp.date() == date)
    {
        total += m.calories;
        *by_meal_type.entry(m.meal_type).or_default() += m.calories;
    }

    for v in by_meal_type.values_mut() {
        *v = round_dp(*v, 1);
    }

    DailyCalories {
        date,
        total_calories: round_dp(total, 1),
        by_meal_type,
    }
}

/// Calorie and macro totals over `start..=end`, with each macro's share of total macro grams.
#[must_use]
pub fn macro_breakdown(
    meals: &[Meal],
    user_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> MacroBreakdown {
    let (mut calories, mut protein, mut carbs, mut fat) = (0.0, 0.0, 0.0, 0.0);

    for m in meals.iter().filter(|m| {
        let d = m.timestamp.date();
        m.user_id == user_id && d >= start && d <= end
    }) {
        calories += m.calories;
        protein += m.macros.protein_g;
        carbs += m.macros.carbs_g;
        fat += m.macros.fat_g;
    }

    let total_macros = protein + carbs + fat;
    let pct = |grams: f64| {
        if total_macros > 0.0 {
            round_dp(grams / total_macros * 100.0, 2)
        } else {
            0.0
        }
    };

    MacroBreakdown {
        start,
        end,
        calories: round_dp(calories, 1),
        protein_g: round_dp(protein, 1),
        carbs_g: round_dp(carbs, 1),
        fat_g: round_dp(fat, 1),
        protein_pct: pct(protein),
        carbs_pct: pct(carbs),
        fat_pct: pct(fat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Macros;

    fn meal(user: &str, ts: &str, meal_type: MealType, calories: f64, macros: Macros) -> Meal {
        Meal {
            id: format!("{user}-{ts}"),
            user_id: user.to_string(),
            timestamp: chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap(),
            meal_type,
            items: vec![],
            calories,
            macros,
            allow_future: false,
        }
    }

    fn macros(protein_g: f64, carbs_g: f64, fat_g: f64) -> Macros {
        Macros {
            protein_g,
            carbs_g,
            fat_g,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_calorie_summary() {
        let meals = vec![
            meal(
                "u1",
                "2025-01-01 08:00",
                MealType::Breakfast,
                300.0,
                macros(10.0, 50.0, 5.0),
            ),
            meal(
                "u1",
                "2025-01-01 13:00",
                MealType::Lunch,
                600.0,
                macros(45.0, 10.0, 20.0),
            ),
            meal(
                "u1",
                "2025-01-02 08:00",
                MealType::Breakfast,
                450.0,
                macros(0.0, 0.0, 0.0),
            ),
            meal(
                "u2",
                "2025-01-01 19:00",
                MealType::Dinner,
                800.0,
                macros(0.0, 0.0, 0.0),
            ),
        ];

        let s = daily_calorie_summary(&meals, "u1", date(2025, 1, 1));
        assert!((s.total_calories - 900.0).abs() < f64::EPSILON);
        assert!((s.by_meal_type[&MealType::Breakfast] - 300.0).abs() < f64::EPSILON);
        assert!((s.by_meal_type[&MealType::Lunch] - 600.0).abs() < f64::EPSILON);
        assert!(s.by_meal_type[&MealType::Dinner].abs() < f64::EPSILON);
        assert!(s.by_meal_type[&MealType::Snack].abs() < f64::EPSILON);
    }

    #[test]
    fn test_macro_breakdown_percentages() {
        let meals = vec![meal(
            "u1",
            "2025-01-01 08:00",
            MealType::Breakfast,
            300.0,
            macros(10.0, 50.0, 5.0),
        )];
        let b = macro_breakdown(&meals, "u1", date(2025, 1, 1), date(2025, 1, 7));
        assert!((b.protein_pct - 15.38).abs() < 0.01);
        assert!((b.carbs_pct - 76.92).abs() < 0.01);
        assert!((b.fat_pct - 7.69).abs() < 0.01);
        assert!((b.protein_pct + b.carbs_pct + b.fat_pct - 100.0).abs() < 0.05);
        assert!((b.calories - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_macro_breakdown_range_is_inclusive() {
        let meals = vec![
            meal(
                "u1",
                "2025-01-01 00:00",
                MealType::Snack,
                100.0,
                macros(1.0, 1.0, 1.0),
            ),
            meal(
                "u1",
                "2025-01-07 23:59",
                MealType::Snack,
                100.0,
                macros(1.0, 1.0, 1.0),
            ),
            meal(
                "u1",
                "2025-01-08 00:00",
                MealType::Snack,
                100.0,
                macros(1.0, 1.0, 1.0),
            ),
        ];
        let b = macro_breakdown(&meals, "u1", date(2025, 1, 1), date(2025, 1, 7));
        assert!((b.calories - 200.0).abs() < f64::EPSILON);
        assert!((b.protein_g - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_macro_breakdown_without_macros() {
        let meals = vec![meal(
            "u1",
            "2025-01-01 08:00",
            MealType::Breakfast,
            120.0,
            macros(0.0, 0.0, 0.0),
        )];
        let b = macro_breakdown(&meals, "u1", date(2025, 1, 1), date(2025, 1, 1));
        assert!(b.protein_pct.abs() < f64::EPSILON);
        assert!(b.carbs_pct.abs() < f64::EPSILON);
        assert!(b.fat_pct.abs() < f64::EPSILON);
    }
}
