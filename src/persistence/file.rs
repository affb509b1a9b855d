use super::{PersistenceError, PersistenceResult};
use crate::{Expression, Schedule};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct ScheduleSnapshot {
    expressions: Vec<Expression>,
}

impl ScheduleSnapshot {
    fn from_schedule(schedule: &Schedule) -> Self {
        Self {
            expressions: schedule.expressions().to_vec(),
        }
    }

    fn into_schedule(self) -> Schedule {
        Schedule::new(self.expressions)
    }
}

pub fn save_schedule_to_json<P: AsRef<Path>>(
    schedule: &Schedule,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = ScheduleSnapshot::from_schedule(schedule);
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    debug!(path = %path.as_ref().display(), count = schedule.len(), "schedule saved as json");
    Ok(())
}

pub fn load_schedule_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Schedule> {
    let file = File::open(path.as_ref())?;
    let snapshot: ScheduleSnapshot = serde_json::from_reader(file)?;
    debug!(path = %path.as_ref().display(), count = snapshot.expressions.len(), "schedule loaded from json");
    Ok(snapshot.into_schedule())
}

/// Writes one canonical expression per line.
pub fn save_schedule_to_text<P: AsRef<Path>>(
    schedule: &Schedule,
    path: P,
) -> PersistenceResult<()> {
    let mut text = schedule.to_string();
    text.push('\n');
    fs::write(path.as_ref(), text)?;
    debug!(path = %path.as_ref().display(), count = schedule.len(), "schedule saved as text");
    Ok(())
}

pub fn load_schedule_from_text<P: AsRef<Path>>(path: P) -> PersistenceResult<Schedule> {
    let text = fs::read_to_string(path.as_ref())?;
    let schedule = Schedule::parse(&text).map_err(PersistenceError::Parse)?;
    debug!(path = %path.as_ref().display(), count = schedule.len(), "schedule loaded from text");
    Ok(schedule)
}
