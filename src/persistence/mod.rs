use crate::Schedule;
use crate::error::ParseError;
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid stored expression: {0}")]
    Parse(#[from] ParseError),
    #[error("no schedule stored")]
    NotFound,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Somewhere a schedule can be written to and read back from, as canonical
/// expression text.
pub trait ScheduleStore {
    fn save_schedule(&self, schedule: &Schedule) -> PersistenceResult<()>;
    fn load_schedule(&self) -> PersistenceResult<Option<Schedule>>;
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_schedule_from_json, load_schedule_from_text, save_schedule_to_json, save_schedule_to_text,
};
