use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::models::{
    BestCardio, Exercise, ExerciseDetail, PersonalRecords, WeeklySummary, Workout, WorkoutType,
    round_dp,
};

/// Compute personal-record flags for `new` against the rest of its user's history.
///
/// The history may contain `new` itself; it is skipped by id, so running this twice
/// on the same workout yields the same flags.
#[must_use]
pub fn detect_prs(history: &[Workout], new: &Workout) -> Vec<String> {
    let prior: Vec<&Workout> = history
        .iter()
        .filter(|w| {
            w.user_id == new.user_id && w.id != new.id && w.workout_type == new.workout_type
        })
        .collect();

    let mut flags = Vec::new();

    match new.workout_type {
        WorkoutType::Strength => {
            let prev_max = prior
                .iter()
                .flat_map(|w| w.exercises.iter())
                .filter_map(Exercise::lifted_kg)
                .fold(0.0_f64, f64::max);

            if let Some((name, kg)) = heaviest_lift(new) {
                if kg > prev_max {
                    flags.push(format!("PR: Heaviest lift {kg:.1} kg ({name})"));
                }
            }
        }
        WorkoutType::Cardio => {
            let prev_best = prior
                .iter()
                .filter_map(|w| fastest_pace(w))
                .map(|(_, pace)| pace)
                .reduce(f64::min);

            if let Some((ex, pace)) = fastest_pace(new) {
                if prev_best.is_none_or(|best| pace < best) {
                    if let ExerciseDetail::Cardio {
                        distance_km,
                        time_min,
                    } = ex.detail
                    {
                        flags.push(format!(
                            "PR: Fastest pace {} {distance_km}km in {time_min}min ({pace:.2} min/km)",
                            ex.name
                        ));
                    }
                }
            }
        }
        WorkoutType::Flexibility => {}
    }

    flags
}

/// Heaviest strictly-positive lift in a workout; the first exercise wins ties.
fn heaviest_lift(workout: &Workout) -> Option<(&str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for ex in &workout.exercises {
        if let Some(kg) = ex.lifted_kg() {
            if kg > best.map_or(0.0, |(_, b)| b) {
                best = Some((&ex.name, kg));
            }
        }
    }
    best
}

fn fastest_pace(workout: &Workout) -> Option<(&Exercise, f64)> {
    let mut best: Option<(&Exercise, f64)> = None;
    for ex in &workout.exercises {
        if let Some(pace) = ex.pace_min_per_km() {
            if best.is_none_or(|(_, b)| pace < b) {
                best = Some((ex, pace));
            }
        }
    }
    best
}

/// Totals for the seven days starting at `week_start`.
#[must_use]
pub fn weekly_summary(workouts: &[Workout], user_id: &str, week_start: NaiveDate) -> WeeklySummary {
    let end = week_start + Duration::days(7);
    let in_week: Vec<&Workout> = workouts
        .iter()
        .filter(|w| w.user_id == user_id && w.date >= week_start && w.date < end)
        .collect();

    let total_minutes: f64 = in_week.iter().map(|w| w.duration_min).sum();
    let intensity_score: f64 = in_week
        .iter()
        .map(|w| w.workout_type.intensity_weight() * w.duration_min)
        .sum();

    let mut by_type: BTreeMap<WorkoutType, usize> =
        WorkoutType::ALL.into_iter().map(|t| (t, 0)).collect();
    for w in &in_week {
        *by_type.entry(w.workout_type).or_default() += 1;
    }

    WeeklySummary {
        week_start,
        week_end: end - Duration::days(1),
        total_workouts: in_week.len(),
        total_minutes: round_dp(total_minutes, 1),
        intensity_score: round_dp(intensity_score, 1),
        by_type,
    }
}

/// All-time heaviest lift and fastest cardio pace for a user.
#[must_use]
pub fn personal_records(workouts: &[Workout], user_id: &str) -> PersonalRecords {
    let mut max_lift: Option<(&str, f64)> = None;
    let mut best_cardio: Option<(&Exercise, f64)> = None;

    for w in workouts.iter().filter(|w| w.user_id == user_id) {
        match w.workout_type {
            WorkoutType::Strength => {
                if let Some((name, kg)) = heaviest_lift(w) {
                    if kg > max_lift.map_or(0.0, |(_, b)| b) {
                        max_lift = Some((name, kg));
                    }
                }
            }
            WorkoutType::Cardio => {
                if let Some((ex, pace)) = fastest_pace(w) {
                    if best_cardio.is_none_or(|(_, b)| pace < b) {
                        best_cardio = Some((ex, pace));
                    }
                }
            }
            WorkoutType::Flexibility => {}
        }
    }

    let best_cardio = best_cardio.and_then(|(ex, pace)| match ex.detail {
        ExerciseDetail::Cardio {
            distance_km,
            time_min,
        } => Some(BestCardio {
            name: ex.name.clone(),
            distance_km: round_dp(distance_km, 2),
            time_min: round_dp(time_min, 1),
            pace_min_per_km: round_dp(pace, 2),
        }),
        _ => None,
    });

    PersonalRecords {
        max_lift_kg: max_lift.map(|(_, kg)| round_dp(kg, 1)),
        max_lift_exercise: max_lift.map(|(name, _)| name.to_string()),
        best_cardio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn workout(
        id: &str,
        day: NaiveDate,
        workout_type: WorkoutType,
        duration: f64,
        exercises: Vec<Exercise>,
    ) -> Workout {
        Workout {
            id: id.to_string(),
            user_id: "u1".to_string(),
            date: day,
            workout_type,
            duration_min: duration,
            exercises,
            notes: String::new(),
            allow_future: false,
            pr_flags: vec![],
        }
    }

    #[test]
    fn test_first_strength_workout_is_a_pr() {
        let w1 = workout(
            "w1",
            date(2025, 1, 1),
            WorkoutType::Strength,
            45.0,
            vec![Exercise::strength("Bench Press", 3, 5, 60.0)],
        );
        let history = vec![w1.clone()];
        let flags = detect_prs(&history, &w1);
        assert_eq!(flags, vec!["PR: Heaviest lift 60.0 kg (Bench Press)"]);
    }

    #[test]
    fn test_lighter_lift_is_not_a_pr() {
        let w1 = workout(
            "w1",
            date(2025, 1, 1),
            WorkoutType::Strength,
            45.0,
            vec![Exercise::strength("Bench Press", 3, 5, 60.0)],
        );
        let w2 = workout(
            "w2",
            date(2025, 1, 8),
            WorkoutType::Strength,
            45.0,
            vec![Exercise::strength("Bench Press", 3, 5, 55.0)],
        );
        let history = vec![w1, w2.clone()];
        assert!(detect_prs(&history, &w2).is_empty());

        let prs = personal_records(&history, "u1");
        assert_eq!(prs.max_lift_kg, Some(60.0));
        assert_eq!(prs.max_lift_exercise.as_deref(), Some("Bench Press"));
    }

    #[test]
    fn test_tied_lift_is_not_a_pr() {
        let w1 = workout(
            "w1",
            date(2025, 1, 1),
            WorkoutType::Strength,
            45.0,
            vec![Exercise::strength("Squat", 5, 5, 100.0)],
        );
        let w2 = workout(
            "w2",
            date(2025, 1, 3),
            WorkoutType::Strength,
            45.0,
            vec![Exercise::strength("Deadlift", 1, 1, 100.0)],
        );
        assert!(detect_prs(&[w1, w2.clone()], &w2).is_empty());
    }

    #[test]
    fn test_other_users_history_is_ignored() {
        let mut other = workout(
            "x1",
            date(2025, 1, 1),
            WorkoutType::Strength,
            45.0,
            vec![Exercise::strength("Squat", 5, 5, 200.0)],
        );
        other.user_id = "u2".to_string();
        let mine = workout(
            "w1",
            date(2025, 1, 2),
            WorkoutType::Strength,
            45.0,
            vec![Exercise::strength("Squat", 5, 5, 80.0)],
        );
        assert_eq!(detect_prs(&[other, mine.clone()], &mine).len(), 1);
    }

    #[test]
    fn test_pr_detection_is_idempotent() {
        let w1 = workout(
            "w1",
            date(2025, 1, 1),
            WorkoutType::Cardio,
            30.0,
            vec![Exercise::cardio("Run", 5.0, 30.0)],
        );
        let mut w2 = workout(
            "w2",
            date(2025, 1, 2),
            WorkoutType::Cardio,
            30.0,
            vec![Exercise::cardio("Run", 5.0, 25.0)],
        );
        let history = vec![w1, w2.clone()];
        let first = detect_prs(&history, &w2);
        w2.pr_flags.clone_from(&first);
        let second = detect_prs(&history, &w2);
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_cardio_pace_pr() {
        let w1 = workout(
            "w1",
            date(2025, 1, 1),
            WorkoutType::Cardio,
            30.0,
            vec![Exercise::cardio("Run", 5.0, 30.0)],
        );
        let faster = workout(
            "w2",
            date(2025, 1, 2),
            WorkoutType::Cardio,
            25.0,
            vec![Exercise::cardio("Run", 5.0, 25.0)],
        );
        let flags = detect_prs(&[w1.clone(), faster.clone()], &faster);
        assert_eq!(flags, vec!["PR: Fastest pace Run 5km in 25min (5.00 min/km)"]);

        let slower = workout(
            "w3",
            date(2025, 1, 3),
            WorkoutType::Cardio,
            35.0,
            vec![Exercise::cardio("Run", 5.0, 35.0)],
        );
        assert!(detect_prs(&[w1, faster, slower.clone()], &slower).is_empty());
    }

    #[test]
    fn test_cardio_without_valid_pace_has_no_pr() {
        let w = workout(
            "w1",
            date(2025, 1, 1),
            WorkoutType::Cardio,
            30.0,
            vec![Exercise::cardio("Bike", 0.0, 30.0)],
        );
        assert!(detect_prs(&[w.clone()], &w).is_empty());
    }

    #[test]
    fn test_weekly_summary() {
        let start = date(2025, 1, 6);
        let workouts = vec![
            workout("a", start, WorkoutType::Strength, 60.0, vec![]),
            workout("b", date(2025, 1, 8), WorkoutType::Cardio, 30.0, vec![]),
            workout("c", date(2025, 1, 12), WorkoutType::Flexibility, 20.0, vec![]),
            // Next Monday falls outside the week.
            workout("d", date(2025, 1, 13), WorkoutType::Cardio, 45.0, vec![]),
            workout("e", date(2025, 1, 5), WorkoutType::Cardio, 45.0, vec![]),
        ];
        let s = weekly_summary(&workouts, "u1", start);
        assert_eq!(s.week_end, date(2025, 1, 12));
        assert_eq!(s.total_workouts, 3);
        assert!((s.total_minutes - 110.0).abs() < f64::EPSILON);
        // 60*2.0 + 30*1.5 + 20*1.0
        assert!((s.intensity_score - 185.0).abs() < f64::EPSILON);
        assert_eq!(s.by_type[&WorkoutType::Strength], 1);
        assert_eq!(s.by_type[&WorkoutType::Cardio], 1);
        assert_eq!(s.by_type[&WorkoutType::Flexibility], 1);
    }

    #[test]
    fn test_weekly_summary_empty_week_lists_all_types() {
        let s = weekly_summary(&[], "u1", date(2025, 1, 6));
        assert_eq!(s.total_workouts, 0);
        assert_eq!(s.by_type.len(), 3);
        assert!(s.by_type.values().all(|&n| n == 0));
    }

    #[test]
    fn test_personal_records_best_cardio() {
        let workouts = vec![
            workout(
                "a",
                date(2025, 1, 1),
                WorkoutType::Cardio,
                30.0,
                vec![
                    Exercise::cardio("Run", 5.0, 27.5),
                    Exercise::cardio("Sprint", 1.0, 4.0),
                ],
            ),
            workout(
                "b",
                date(2025, 1, 2),
                WorkoutType::Cardio,
                60.0,
                vec![Exercise::cardio("Long run", 10.0, 60.0)],
            ),
        ];
        let prs = personal_records(&workouts, "u1");
        let best = prs.best_cardio.unwrap();
        assert_eq!(best.name, "Sprint");
        assert!((best.pace_min_per_km - 4.0).abs() < f64::EPSILON);
        assert!(prs.max_lift_kg.is_none());
        assert!(prs.max_lift_exercise.is_none());
    }
}
