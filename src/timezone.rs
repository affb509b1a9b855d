use crate::error::{ParseError, Result};
use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;
use std::fmt;

/// The zone an expression is evaluated in.
///
/// `Named` holds a handle into the static tz database, so any number of
/// expressions can point at the same zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timezone {
    #[default]
    Local,
    Named(Tz),
}

impl Timezone {
    pub const UTC: Timezone = Timezone::Named(Tz::UTC);

    /// Resolves an IANA name (`Europe/Paris`), an alias without region
    /// (`UTC`, `Zulu`, `EST`), or `Local`.
    pub fn resolve(name: &str) -> Result<Self> {
        if name == "Local" {
            return Ok(Timezone::Local);
        }
        name.parse::<Tz>()
            .map(Timezone::Named)
            .map_err(|_| ParseError::InvalidTimezoneName(name.to_string()))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Timezone::Local)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Timezone::Local => "Local",
            Timezone::Named(tz) => tz.name(),
        }
    }

    /// Wall-clock reading of `instant` in this zone.
    pub fn wall_clock<Z: TimeZone>(&self, instant: &DateTime<Z>) -> NaiveDateTime {
        match self {
            Timezone::Local => instant.with_timezone(&Local).naive_local(),
            Timezone::Named(tz) => instant.with_timezone(tz).naive_local(),
        }
    }

    /// Maps a wall-clock time back to an instant, keeping only mappings that
    /// fall strictly after `after`.
    ///
    /// Repeated wall-clock times (clocks turned back) yield the earliest
    /// qualifying mapping. Skipped wall-clock times (clocks turned forward)
    /// are read with the offset in effect before the jump.
    pub fn instant_after(
        &self,
        wall_clock: NaiveDateTime,
        after: &DateTime<Utc>,
    ) -> Option<DateTime<FixedOffset>> {
        match self {
            Timezone::Local => first_mapping_after(&Local, wall_clock, after),
            Timezone::Named(tz) => first_mapping_after(tz, wall_clock, after),
        }
    }
}

fn first_mapping_after<Z: TimeZone>(
    zone: &Z,
    wall_clock: NaiveDateTime,
    after: &DateTime<Utc>,
) -> Option<DateTime<FixedOffset>> {
    let candidates = match zone.from_local_datetime(&wall_clock) {
        LocalResult::Single(instant) => vec![instant],
        LocalResult::Ambiguous(earliest, latest) => vec![earliest, latest],
        LocalResult::None => {
            let before_gap = zone
                .offset_from_utc_datetime(&(wall_clock - TimeDelta::days(1)))
                .fix();
            let utc = wall_clock - TimeDelta::seconds(i64::from(before_gap.local_minus_utc()));
            vec![zone.from_utc_datetime(&utc)]
        }
    };
    candidates
        .into_iter()
        .map(|instant| instant.fixed_offset())
        .filter(|instant| instant.with_timezone(&Utc) > *after)
        .min()
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Tz> for Timezone {
    fn from(tz: Tz) -> Self {
        Timezone::Named(tz)
    }
}
