use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::dedup::{MEAL_KEY, METRIC_KEY, WORKOUT_KEY, is_duplicate};
use crate::error::{Error, Result};
use crate::metrics::{self, goal_progress, moving_average, sparkline, weight_series};
use crate::models::{
    DailyCalories, Dashboard, GoalProgress, GoalUpdate, MacroBreakdown, Meal, MealDraft,
    MealUpdate, Metric, MetricDraft, MetricSummary, MetricType, MetricUpdate, PersonalRecords,
    RegisterUser, User, UserEntries, WeeklySummary, WeightTrend, Workout, WorkoutDraft,
    WorkoutUpdate, round_dp,
};
use crate::nutrition::{daily_calorie_summary, macro_breakdown};
use crate::profiles::{self, ProfileError};
use crate::storage::{State, Storage};
use crate::store::{Collection, Entry, Patch};
use crate::validate::{
    check_meal_update, check_metric_update, check_workout_update, validate_meal,
    validate_metric, validate_workout,
};
use crate::workouts::{detect_prs, personal_records, weekly_summary};

/// Most recent weight values shown in a trend.
pub const TREND_POINTS: usize = 21;

/// One session over the persisted state: every operation runs against the
/// in-memory collections, and nothing reaches disk until [`Tracker::save`].
pub struct Tracker {
    storage: Storage,
    state: State,
    dirty: bool,
}

impl Tracker {
    /// Load the state stored under `base_dir`.
    pub fn open(base_dir: &Path) -> Result<Self> {
        let storage = Storage::new(base_dir);
        let state = storage.load()?;
        Ok(Self {
            storage,
            state,
            dirty: false,
        })
    }

    /// True when there are changes that have not been saved.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    // --- Users ---

    pub fn register(&mut self, profile: RegisterUser, today: NaiveDate) -> Result<&User> {
        let user = profiles::register_user(&mut self.state.users, profile, today)?;
        self.dirty = true;
        Ok(user)
    }

    /// Log in. A wrong email or PIN is [`Error::Unauthorized`].
    pub fn authenticate(&self, email: &str, pin: &str) -> Result<&User> {
        profiles::authenticate(&self.state.users, email, pin).ok_or(Error::Unauthorized)
    }

    pub fn user(&self, user_id: &str) -> Result<&User> {
        self.state
            .users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| ProfileError::UserNotFound(user_id.to_string()).into())
    }

    pub fn update_goal(&mut self, user_id: &str, update: GoalUpdate) -> Result<&User> {
        let user = profiles::update_goal(&mut self.state.users, user_id, update)?;
        self.dirty = true;
        Ok(user)
    }

    // --- Workouts ---

    /// Validate, reject duplicates, store, then flag any personal records.
    pub fn log_workout(&mut self, draft: &WorkoutDraft, today: NaiveDate) -> Result<Workout> {
        let new = validate_workout(draft, today)?;
        if is_duplicate(self.state.workouts.as_slice(), WORKOUT_KEY, &new) {
            return Err(Error::Duplicate(Workout::KIND));
        }

        let mut workout = self.state.workouts.create(new).clone();
        workout.pr_flags = detect_prs(self.state.workouts.as_slice(), &workout);
        if let Some(stored) = self.state.workouts.get_mut(&workout.id) {
            stored.pr_flags.clone_from(&workout.pr_flags);
        }
        if !workout.pr_flags.is_empty() {
            tracing::info!(id = %workout.id, prs = workout.pr_flags.len(), "Personal records set");
        }
        self.dirty = true;
        Ok(workout)
    }

    pub fn update_workout(
        &mut self,
        user_id: &str,
        id: &str,
        update: WorkoutUpdate,
    ) -> Result<Workout> {
        check_workout_update(&update)?;
        let workout = update_owned(&mut self.state.workouts, user_id, id, update)?;
        self.dirty = true;
        Ok(workout)
    }

    pub fn delete_workout(&mut self, user_id: &str, id: &str) -> Result<Workout> {
        let workout = delete_owned(&mut self.state.workouts, user_id, id)?;
        self.dirty = true;
        Ok(workout)
    }

    #[must_use]
    pub fn weekly_summary(&self, user_id: &str, week_start: NaiveDate) -> WeeklySummary {
        weekly_summary(self.state.workouts.as_slice(), user_id, week_start)
    }

    #[must_use]
    pub fn personal_records(&self, user_id: &str) -> PersonalRecords {
        personal_records(self.state.workouts.as_slice(), user_id)
    }

    // --- Meals ---

    pub fn log_meal(&mut self, draft: &MealDraft, today: NaiveDate) -> Result<Meal> {
        let new = validate_meal(draft, today)?;
        if is_duplicate(self.state.meals.as_slice(), MEAL_KEY, &new) {
            return Err(Error::Duplicate(Meal::KIND));
        }
        let meal = self.state.meals.create(new).clone();
        self.dirty = true;
        Ok(meal)
    }

    pub fn update_meal(&mut self, user_id: &str, id: &str, update: MealUpdate) -> Result<Meal> {
        check_meal_update(&update)?;
        let meal = update_owned(&mut self.state.meals, user_id, id, update)?;
        self.dirty = true;
        Ok(meal)
    }

    pub fn delete_meal(&mut self, user_id: &str, id: &str) -> Result<Meal> {
        let meal = delete_owned(&mut self.state.meals, user_id, id)?;
        self.dirty = true;
        Ok(meal)
    }

    #[must_use]
    pub fn daily_calories(&self, user_id: &str, date: NaiveDate) -> DailyCalories {
        daily_calorie_summary(self.state.meals.as_slice(), user_id, date)
    }

    #[must_use]
    pub fn macro_breakdown(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> MacroBreakdown {
        macro_breakdown(self.state.meals.as_slice(), user_id, start, end)
    }

    // --- Metrics ---

    pub fn log_metric(&mut self, draft: &MetricDraft, today: NaiveDate) -> Result<Metric> {
        let new = validate_metric(draft, today)?;
        if is_duplicate(self.state.metrics.as_slice(), METRIC_KEY, &new) {
            return Err(Error::Duplicate(Metric::KIND));
        }
        let metric = self.state.metrics.create(new).clone();
        self.dirty = true;
        Ok(metric)
    }

    pub fn update_metric(
        &mut self,
        user_id: &str,
        id: &str,
        update: MetricUpdate,
    ) -> Result<Metric> {
        check_metric_update(&update)?;
        let metric = update_owned(&mut self.state.metrics, user_id, id, update)?;
        self.dirty = true;
        Ok(metric)
    }

    pub fn delete_metric(&mut self, user_id: &str, id: &str) -> Result<Metric> {
        let metric = delete_owned(&mut self.state.metrics, user_id, id)?;
        self.dirty = true;
        Ok(metric)
    }

    #[must_use]
    pub fn metric_summary(
        &self,
        user_id: &str,
        metric_type: MetricType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> MetricSummary {
        metrics::metric_summary(self.state.metrics.as_slice(), user_id, metric_type, start, end)
    }

    pub fn goal_progress(&self, user_id: &str) -> Result<GoalProgress> {
        let user = self.user(user_id)?;
        let weights = weight_series(self.state.metrics.as_slice(), user_id);
        Ok(goal_progress(&user.goal, &weights))
    }

    /// The latest weigh-ins with their moving average and a chart of the average.
    #[must_use]
    pub fn weight_trend(&self, user_id: &str, window: usize) -> WeightTrend {
        let weights = weight_series(self.state.metrics.as_slice(), user_id);
        let skip = weights.len().saturating_sub(TREND_POINTS);
        let values: Vec<f64> = weights[skip..].iter().map(|&(_, v)| round_dp(v, 2)).collect();
        let average: Vec<f64> = moving_average(&values, window)
            .into_iter()
            .map(|v| round_dp(v, 2))
            .collect();
        let chart = sparkline(&average);
        WeightTrend {
            values,
            moving_average: average,
            window,
            chart,
        }
    }

    // --- Overview ---

    pub fn dashboard(&self, user_id: &str, today: NaiveDate) -> Result<Dashboard> {
        let user = self.user(user_id)?;

        let workouts_today: Vec<Workout> = self
            .state
            .workouts
            .for_user(user_id)
            .filter(|w| w.date == today)
            .cloned()
            .collect();
        let days_since_last_workout = self
            .state
            .workouts
            .for_user(user_id)
            .map(|w| w.date)
            .max()
            .map(|last| (today - last).num_days());

        let calories_today = self.daily_calories(user_id, today).total_calories;
        let calorie_goal = user.goal.daily_calorie_goal;
        let calorie_balance = calorie_goal.map(|goal| round_dp(calories_today - goal, 1));

        Ok(Dashboard {
            user_name: user.name.clone(),
            date: today,
            workouts_today,
            days_since_last_workout,
            calories_today,
            calorie_goal,
            calorie_balance,
            goal_progress: self.goal_progress(user_id)?,
        })
    }

    /// Everything the user has logged, for picking ids to update or delete.
    #[must_use]
    pub fn entries(&self, user_id: &str) -> UserEntries {
        UserEntries {
            workouts: self.state.workouts.for_user(user_id).cloned().collect(),
            meals: self.state.meals.for_user(user_id).cloned().collect(),
            metrics: self.state.metrics.for_user(user_id).cloned().collect(),
        }
    }

    // --- Persistence ---

    /// Write all collections (backing up the previous files first).
    pub fn save(&mut self) -> Result<()> {
        self.storage.save(&self.state)?;
        self.dirty = false;
        Ok(())
    }

    pub fn backup(&self) -> Result<Vec<PathBuf>> {
        Ok(self.storage.backup()?)
    }

    /// Restore the newest backups and reload them, discarding unsaved changes.
    pub fn restore_latest(&mut self) -> Result<bool> {
        let restored = self.storage.restore_latest()?;
        if restored {
            self.state = self.storage.load()?;
            self.dirty = false;
        }
        Ok(restored)
    }
}

fn check_owner<T: Entry>(entries: &Collection<T>, user_id: &str, id: &str) -> Result<()> {
    match entries.get(id) {
        Some(entry) if entry.user_id() != user_id => Err(Error::Unauthorized),
        _ => Ok(()),
    }
}

fn update_owned<T, P>(entries: &mut Collection<T>, user_id: &str, id: &str, patch: P) -> Result<T>
where
    T: Entry + Clone,
    P: Patch<T>,
{
    check_owner(entries, user_id, id)?;
    Ok(entries.update(id, patch)?.clone())
}

fn delete_owned<T: Entry>(entries: &mut Collection<T>, user_id: &str, id: &str) -> Result<T> {
    check_owner(entries, user_id, id)?;
    Ok(entries.delete(id)?)
}
