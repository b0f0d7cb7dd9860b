//! In-memory entry collections with create/read/update/delete by id.

use thiserror::Error;
use uuid::Uuid;

use crate::dedup::KeyFields;
use crate::models::{
    Meal, MealUpdate, Metric, MetricUpdate, NewMeal, NewMetric, NewWorkout, Workout, WorkoutUpdate,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
}

/// A record kept in a [`Collection`].
pub trait Entry: KeyFields + Sized {
    /// Human-readable name used in messages and logs.
    const KIND: &'static str;

    /// Validated input the entry is created from.
    type New;

    fn id(&self) -> &str;
    fn user_id(&self) -> &str;
    fn requested_id(new: &Self::New) -> Option<&str>;
    fn from_new(id: String, new: Self::New) -> Self;
}

/// Field changes merged into an existing entry.
pub trait Patch<T> {
    fn apply(self, entry: &mut T);
}

/// Ordered collection of entries of one kind.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    entries: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Entry> Collection<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_vec(entries: Vec<T>) -> Self {
        Self { entries }
    }

    /// Append a new entry. Keeps the caller's id when one was given and is free,
    /// otherwise generates one.
    pub fn create(&mut self, new: T::New) -> &T {
        let id = match T::requested_id(&new) {
            Some(id) if self.get(id).is_none() => id.to_string(),
            Some(id) => {
                tracing::warn!(
                    kind = T::KIND,
                    id,
                    "Requested id already in use, generating a new one"
                );
                Uuid::new_v4().to_string()
            }
            None => Uuid::new_v4().to_string(),
        };
        let entry = T::from_new(id, new);
        tracing::debug!(kind = T::KIND, id = entry.id(), "Created entry");
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.entries.iter_mut().find(|e| e.id() == id)
    }

    /// Merge `patch` into the entry with `id`. The merged entry is not re-validated.
    pub fn update<P: Patch<T>>(&mut self, id: &str, patch: P) -> Result<&T, StoreError> {
        let entry = self.get_mut(id).ok_or_else(|| not_found::<T>(id))?;
        patch.apply(entry);
        tracing::debug!(kind = T::KIND, id, "Updated entry");
        Ok(entry)
    }

    /// Remove and return the entry with `id`.
    pub fn delete(&mut self, id: &str) -> Result<T, StoreError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| not_found::<T>(id))?;
        tracing::debug!(kind = T::KIND, id, "Deleted entry");
        Ok(self.entries.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn for_user<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a T> {
        self.entries.iter().filter(move |e| e.user_id() == user_id)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn not_found<T: Entry>(id: &str) -> StoreError {
    StoreError::NotFound {
        kind: T::KIND,
        id: id.to_string(),
    }
}

impl Entry for Workout {
    const KIND: &'static str = "Workout";
    type New = NewWorkout;

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn requested_id(new: &NewWorkout) -> Option<&str> {
        new.id.as_deref()
    }

    fn from_new(id: String, new: NewWorkout) -> Self {
        Self {
            id,
            user_id: new.user_id,
            date: new.date,
            workout_type: new.workout_type,
            duration_min: new.duration_min,
            exercises: new.exercises,
            notes: new.notes,
            allow_future: new.allow_future,
            pr_flags: Vec::new(),
        }
    }
}

impl Entry for Meal {
    const KIND: &'static str = "Meal";
    type New = NewMeal;

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn requested_id(new: &NewMeal) -> Option<&str> {
        new.id.as_deref()
    }

    fn from_new(id: String, new: NewMeal) -> Self {
        Self {
            id,
            user_id: new.user_id,
            timestamp: new.timestamp,
            meal_type: new.meal_type,
            items: new.items,
            calories: new.calories,
            macros: new.macros,
            allow_future: new.allow_future,
        }
    }
}

impl Entry for Metric {
    const KIND: &'static str = "Metric";
    type New = NewMetric;

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn requested_id(new: &NewMetric) -> Option<&str> {
        new.id.as_deref()
    }

    fn from_new(id: String, new: NewMetric) -> Self {
        Self {
            id,
            user_id: new.user_id,
            date: new.date,
            metric_type: new.metric_type,
            value: new.value,
            allow_future: new.allow_future,
        }
    }
}

impl Patch<Workout> for WorkoutUpdate {
    fn apply(self, entry: &mut Workout) {
        if let Some(date) = self.date {
            entry.date = date;
        }
        if let Some(t) = self.workout_type {
            entry.workout_type = t;
        }
        if let Some(d) = self.duration_min {
            entry.duration_min = d;
        }
        if let Some(notes) = self.notes {
            entry.notes = notes;
        }
    }
}

impl Patch<Meal> for MealUpdate {
    fn apply(self, entry: &mut Meal) {
        if let Some(ts) = self.timestamp {
            entry.timestamp = ts;
        }
        if let Some(t) = self.meal_type {
            entry.meal_type = t;
        }
        if let Some(c) = self.calories {
            entry.calories = c;
        }
    }
}

impl Patch<Metric> for MetricUpdate {
    fn apply(self, entry: &mut Metric) {
        if let Some(date) = self.date {
            entry.date = date;
        }
        if let Some(v) = self.value {
            entry.value = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::{Exercise, MetricType, WorkoutType};

    fn new_workout(id: Option<&str>) -> NewWorkout {
        NewWorkout {
            id: id.map(str::to_string),
            user_id: "u1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            workout_type: WorkoutType::Strength,
            duration_min: 45.0,
            exercises: vec![Exercise::strength("Squat", 5, 5, 100.0)],
            notes: String::new(),
            allow_future: false,
        }
    }

    #[test]
    fn test_create_generates_unique_ids() {
        let mut workouts: Collection<Workout> = Collection::new();
        let a = workouts.create(new_workout(None)).id.clone();
        let b = workouts.create(new_workout(None)).id.clone();
        assert_ne!(a, b);
        assert_eq!(workouts.len(), 2);
        assert!(workouts.get(&a).unwrap().pr_flags.is_empty());
    }

    #[test]
    fn test_create_keeps_requested_id() {
        let mut workouts: Collection<Workout> = Collection::new();
        let w = workouts.create(new_workout(Some("w-1")));
        assert_eq!(w.id, "w-1");
    }

    #[test]
    fn test_create_replaces_taken_id() {
        let mut workouts: Collection<Workout> = Collection::new();
        workouts.create(new_workout(Some("w-1")));
        let second = workouts.create(new_workout(Some("w-1"))).id.clone();
        assert_ne!(second, "w-1");
        assert_eq!(workouts.len(), 2);
    }

    #[test]
    fn test_update_merges_fields() {
        let mut workouts: Collection<Workout> = Collection::new();
        let id = workouts.create(new_workout(None)).id.clone();

        let updated = workouts
            .update(
                &id,
                WorkoutUpdate {
                    duration_min: Some(60.0),
                    notes: Some("felt strong".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!((updated.duration_min - 60.0).abs() < f64::EPSILON);
        assert_eq!(updated.notes, "felt strong");
        assert_eq!(updated.workout_type, WorkoutType::Strength);
    }

    #[test]
    fn test_update_does_not_revalidate() {
        let mut workouts: Collection<Workout> = Collection::new();
        let id = workouts.create(new_workout(None)).id.clone();
        let updated = workouts
            .update(
                &id,
                WorkoutUpdate {
                    duration_min: Some(-5.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!((updated.duration_min + 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_not_found() {
        let mut workouts: Collection<Workout> = Collection::new();
        let err = workouts
            .update("missing", WorkoutUpdate::default())
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                kind: "Workout",
                id: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_delete() {
        let mut workouts: Collection<Workout> = Collection::new();
        let id = workouts.create(new_workout(None)).id.clone();

        let removed = workouts.delete(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(workouts.is_empty());

        // Deleting again reports the same not-found error as update.
        assert!(matches!(
            workouts.delete(&id),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_for_user_filters() {
        let mut metrics: Collection<Metric> = Collection::new();
        for user in ["u1", "u2", "u1"] {
            metrics.create(NewMetric {
                id: None,
                user_id: user.to_string(),
                date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                metric_type: MetricType::WaterL,
                value: 2.0,
                allow_future: false,
            });
        }
        assert_eq!(metrics.for_user("u1").count(), 2);
        assert_eq!(metrics.for_user("u3").count(), 0);
    }
}
