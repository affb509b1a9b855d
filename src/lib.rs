//! Recurring calendar expressions: `[weekdays] [date] [time] [timezone]`,
//! parsed into an [`Expression`] and evaluated to the next matching instant.
//!
//! ```
//! use calendar_events::Expression;
//! use chrono::{TimeZone, Utc};
//!
//! let expression: Expression = "Mon..Fri *-*-* 09:30 UTC".parse().unwrap();
//! let from = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(); // a Friday
//! let next = expression.next(&from).unwrap();
//! assert_eq!(next.to_rfc3339(), "2024-03-04T09:30:00+00:00");
//! ```

pub mod component;
pub mod error;
pub mod expression;
pub mod field;
pub mod next;
pub mod persistence;
pub mod schedule;
pub mod timezone;
pub mod weekday;

pub use component::{Component, ComponentSet, NextValue};
pub use error::{ParseError, Result};
pub use expression::Expression;
pub use field::Field;
pub use next::{Occurrences, RolloverConfig};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteScheduleStore;
pub use persistence::{
    PersistenceError, ScheduleStore, load_schedule_from_json, load_schedule_from_text,
    save_schedule_to_json, save_schedule_to_text,
};
pub use schedule::{Schedule, ScheduleOccurrences};
pub use timezone::Timezone;
pub use weekday::{WeekdayComponent, WeekdaySet};
