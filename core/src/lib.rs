pub mod dedup;
pub mod error;
pub mod metrics;
pub mod models;
pub mod nutrition;
pub mod profiles;
pub mod service;
pub mod storage;
pub mod store;
pub mod validate;
pub mod workouts;

pub use error::{Error, Result};
pub use service::Tracker;
