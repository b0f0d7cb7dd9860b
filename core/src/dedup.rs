use crate::models::{
    DATE_FORMAT, Meal, Metric, NewMeal, NewMetric, NewWorkout, TIMESTAMP_FORMAT, Workout,
};

/// A field that can take part in an entry's natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyField {
    UserId,
    Date,
    Timestamp,
    Type,
}

pub const WORKOUT_KEY: &[KeyField] = &[KeyField::UserId, KeyField::Date, KeyField::Type];
pub const MEAL_KEY: &[KeyField] = &[KeyField::UserId, KeyField::Timestamp, KeyField::Type];
pub const METRIC_KEY: &[KeyField] = &[KeyField::UserId, KeyField::Date, KeyField::Type];

/// Exposes key field values in their persisted string form.
/// Fields an entry does not have yield `None`.
pub trait KeyFields {
    fn key_value(&self, field: KeyField) -> Option<String>;
}

/// True when some entry equals `candidate` on every field in `keys`.
///
/// Exact comparison of the persisted values, no normalization. A field absent on
/// both sides compares equal.
pub fn is_duplicate<E, C>(entries: &[E], keys: &[KeyField], candidate: &C) -> bool
where
    E: KeyFields,
    C: KeyFields + ?Sized,
{
    entries.iter().any(|e| {
        keys.iter()
            .all(|&k| e.key_value(k) == candidate.key_value(k))
    })
}

impl KeyFields for Workout {
    fn key_value(&self, field: KeyField) -> Option<String> {
        match field {
            KeyField::UserId => Some(self.user_id.clone()),
            KeyField::Date => Some(self.date.format(DATE_FORMAT).to_string()),
            KeyField::Type => Some(self.workout_type.as_str().to_string()),
            KeyField::Timestamp => None,
        }
    }
}

impl KeyFields for NewWorkout {
    fn key_value(&self, field: KeyField) -> Option<String> {
        match field {
            KeyField::UserId => Some(self.user_id.clone()),
            KeyField::Date => Some(self.date.format(DATE_FORMAT).to_string()),
            KeyField::Type => Some(self.workout_type.as_str().to_string()),
            KeyField::Timestamp => None,
        }
    }
}

impl KeyFields for Meal {
    fn key_value(&self, field: KeyField) -> Option<String> {
        match field {
            KeyField::UserId => Some(self.user_id.clone()),
            KeyField::Timestamp => Some(self.timestamp.format(TIMESTAMP_FORMAT).to_string()),
            KeyField::Type => Some(self.meal_type.as_str().to_string()),
            KeyField::Date => None,
        }
    }
}

impl KeyFields for NewMeal {
    fn key_value(&self, field: KeyField) -> Option<String> {
        match field {
            KeyField::UserId => Some(self.user_id.clone()),
            KeyField::Timestamp => Some(self.timestamp.format(TIMESTAMP_FORMAT).to_string()),
            KeyField::Type => Some(self.meal_type.as_str().to_string()),
            KeyField::Date => None,
        }
    }
}

impl KeyFields for Metric {
    fn key_value(&self, field: KeyField) -> Option<String> {
        match field {
            KeyField::UserId => Some(self.user_id.clone()),
            KeyField::Date => Some(self.date.format(DATE_FORMAT).to_string()),
            KeyField::Type => Some(self.metric_type.as_str().to_string()),
            KeyField::Timestamp => None,
        }
    }
}

impl KeyFields for NewMetric {
    fn key_value(&self, field: KeyField) -> Option<String> {
        match field {
            KeyField::UserId => Some(self.user_id.clone()),
            KeyField::Date => Some(self.date.format(DATE_FORMAT).to_string()),
            KeyField::Type => Some(self.metric_type.as_str().to_string()),
            KeyField::Timestamp => None,
        }
    }
}
