//! User registration, login, and goal management.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ActivityLevel, Goal, GoalType, GoalUpdate, RegisterUser, User};
use crate::validate::parse_date;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("invalid email: {0:?}")]
    InvalidEmail(String),
    #[error("email already registered: {0}")]
    EmailTaken(String),
    #[error("PIN must be 4-6 digits")]
    InvalidPin,
    #[error("{field} must be > 0")]
    NonPositive { field: &'static str },
    #[error("activity level must be one of low/moderate/high, got {0:?}")]
    InvalidActivityLevel(String),
    #[error("invalid goal type: {0:?}")]
    InvalidGoalType(String),
    #[error("dates must be YYYY-MM-DD, got {0:?}")]
    InvalidDate(String),
    #[error("target weight must be > 0")]
    NonPositiveTarget,
    #[error("daily calorie goal must be > 0")]
    NonPositiveCalorieGoal,
    #[error("user {0} not found")]
    UserNotFound(String),
}

pub type ProfileResult<T> = Result<T, ProfileError>;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn positive(value: f64, field: &'static str) -> ProfileResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ProfileError::NonPositive { field })
    }
}

/// Create a user with a maintenance goal starting `today` and append it to `users`.
pub fn register_user(
    users: &mut Vec<User>,
    profile: RegisterUser,
    today: NaiveDate,
) -> ProfileResult<&User> {
    let email = normalize_email(&profile.email);
    if email.is_empty() || !email.contains('@') {
        return Err(ProfileError::InvalidEmail(profile.email));
    }
    if users.iter().any(|u| u.email == email) {
        return Err(ProfileError::EmailTaken(email));
    }

    let pin = profile.pin.trim().to_string();
    if !(4..=6).contains(&pin.len()) || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProfileError::InvalidPin);
    }

    if profile.age == 0 {
        return Err(ProfileError::NonPositive { field: "age" });
    }
    let height_cm = positive(profile.height_cm, "height_cm")?;
    let weight_kg = positive(profile.weight_kg, "weight_kg")?;

    let activity_level = match profile.activity_level.as_deref().map(str::trim) {
        None | Some("") => ActivityLevel::Moderate,
        Some(s) => ActivityLevel::parse(s)
            .ok_or_else(|| ProfileError::InvalidActivityLevel(s.to_string()))?,
    };

    let name = title_case(&profile.name);
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: if name.is_empty() { "User".to_string() } else { name },
        email,
        pin,
        age: profile.age,
        height_cm,
        weight_kg,
        activity_level,
        goal: Goal::maintenance(today),
    };
    tracing::info!(user_id = %user.id, "Registered user");
    users.push(user);
    Ok(&users[users.len() - 1])
}

/// Find the user with this email and PIN.
#[must_use]
pub fn authenticate<'a>(users: &'a [User], email: &str, pin: &str) -> Option<&'a User> {
    let email = normalize_email(email);
    let pin = pin.trim();
    users.iter().find(|u| u.email == email && u.pin == pin)
}

/// Merge `update` over the user's current goal and replace it.
pub fn update_goal<'a>(
    users: &'a mut [User],
    user_id: &str,
    update: GoalUpdate,
) -> ProfileResult<&'a User> {
    let user = users
        .iter_mut()
        .find(|u| u.id == user_id)
        .ok_or_else(|| ProfileError::UserNotFound(user_id.to_string()))?;
    let current = &user.goal;

    let goal_type = match update.goal_type {
        Some(s) => GoalType::parse(&s).ok_or(ProfileError::InvalidGoalType(s))?,
        None => current.goal_type,
    };

    let parse = |s: String| parse_date(&s).map_err(|_| ProfileError::InvalidDate(s));
    let start_date = match update.start_date {
        Some(s) => parse(s)?,
        None => current.start_date,
    };
    let end_date = match update.end_date {
        Some(s) if s.trim().is_empty() => None,
        Some(s) => Some(parse(s)?),
        None => current.end_date,
    };

    let target_weight_kg = match update.target_weight_kg.or(current.target_weight_kg) {
        Some(t) if t.is_nan() || t <= 0.0 => return Err(ProfileError::NonPositiveTarget),
        other => other,
    };
    let daily_calorie_goal = match update.daily_calorie_goal.or(current.daily_calorie_goal) {
        Some(c) if c.is_nan() || c <= 0.0 => return Err(ProfileError::NonPositiveCalorieGoal),
        other => other,
    };

    user.goal = Goal {
        goal_type,
        target_weight_kg,
        daily_calorie_goal,
        start_date,
        end_date,
    };
    tracing::info!(user_id, goal = goal_type.as_str(), "Updated goal");
    Ok(user)
}
