mod backup;
mod helpers;
mod meal;
mod metric;
mod overview;
mod profile;
mod workout;

use anyhow::{Result, anyhow, bail};
use chrono::{Local, NaiveDate};

use stride_core::Tracker;
use stride_core::models::User;

pub(crate) use backup::{cmd_backup, cmd_restore};
pub(crate) use meal::{
    cmd_meal_day, cmd_meal_delete, cmd_meal_log, cmd_meal_macros, cmd_meal_update,
};
pub(crate) use metric::{
    cmd_metric_delete, cmd_metric_log, cmd_metric_summary, cmd_metric_trend, cmd_metric_update,
};
pub(crate) use overview::{cmd_dashboard, cmd_entries};
pub(crate) use profile::{cmd_goal_set, cmd_goal_show, cmd_register};
pub(crate) use workout::{
    cmd_workout_delete, cmd_workout_log, cmd_workout_records, cmd_workout_update, cmd_workout_week,
};

/// The open data directory plus the credentials given on the command line.
pub(crate) struct Session {
    pub tracker: Tracker,
    email: Option<String>,
    pin: Option<String>,
    today: NaiveDate,
}

impl Session {
    pub fn new(tracker: Tracker, email: Option<String>, pin: Option<String>) -> Self {
        Self {
            tracker,
            email,
            pin,
            today: Local::now().date_naive(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn pin(&self) -> Option<&str> {
        self.pin.as_deref()
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        match (self.email.as_deref(), self.pin.as_deref()) {
            (Some(email), Some(pin)) => Ok((email, pin)),
            _ => bail!("Not logged in. Pass --email and --pin (or set STRIDE_EMAIL and STRIDE_PIN)"),
        }
    }

    /// The logged-in user.
    pub fn user(&self) -> Result<&User> {
        let (email, pin) = self.credentials()?;
        self.tracker
            .authenticate(email, pin)
            .map_err(|_| anyhow!("Invalid email or PIN"))
    }

    pub fn user_id(&self) -> Result<String> {
        Ok(self.user()?.id.clone())
    }
}
