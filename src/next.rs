use crate::expression::Expression;
use crate::field::{Field, MAX_YEAR};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

pub const DEFAULT_MAX_PASSES: u32 = 500;

/// Limits applied while searching for the next occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolloverConfig {
    /// Number of restarts after which the search gives up and reports that
    /// no occurrence was found.
    pub max_passes: u32,
}

impl Default for RolloverConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Year,
    Month,
    Day,
    Weekday,
    Hour,
    Minute,
    Second,
}

enum Step {
    Continue(Stage),
    Restart,
    Matched,
    Exhausted,
}

/// Working wall-clock values. Any unit may temporarily overflow (second 60,
/// day 32, month 13); the next pass folds the overflow into the coarser unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    year: u32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
}

impl Cursor {
    fn seeded(wall_clock: NaiveDateTime) -> Self {
        Self {
            year: u32::try_from(wall_clock.year()).unwrap_or(0),
            month: wall_clock.month(),
            day: wall_clock.day(),
            hour: wall_clock.hour(),
            minute: wall_clock.minute(),
            second: wall_clock.second() + 1,
        }
    }

    /// Resets every unit finer than `stage` to its minimum.
    fn reset_below(&mut self, stage: Stage) {
        if stage == Stage::Year {
            self.month = Field::Months.min();
        }
        if matches!(stage, Stage::Year | Stage::Month) {
            self.day = Field::Days.min();
        }
        if matches!(stage, Stage::Year | Stage::Month | Stage::Day | Stage::Weekday) {
            self.hour = Field::Hours.min();
        }
        if stage != Stage::Minute && stage != Stage::Second {
            self.minute = Field::Minutes.min();
        }
        if stage != Stage::Second {
            self.second = Field::Seconds.min();
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(i32::try_from(self.year).ok()?, self.month, self.day)
    }

    fn wall_clock(&self) -> Option<NaiveDateTime> {
        self.date()?.and_hms_opt(self.hour, self.minute, self.second)
    }
}

pub fn days_in_month(year: u32, month: u32) -> u32 {
    let Ok(year) = i32::try_from(year) else {
        return 0;
    };
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(0, |last| last.day())
}

/// Carry/reset state machine looking for the first wall-clock time, strictly
/// after a starting instant, that satisfies every field of an expression.
struct Rollover<'a> {
    expression: &'a Expression,
    cursor: Cursor,
    passes: u32,
    max_passes: u32,
}

impl<'a> Rollover<'a> {
    fn new(expression: &'a Expression, from: &DateTime<Utc>, config: &RolloverConfig) -> Self {
        let wall_clock = expression.timezone().wall_clock(from);
        Self {
            expression,
            cursor: Cursor::seeded(wall_clock),
            passes: 0,
            max_passes: config.max_passes,
        }
    }

    fn run(mut self, from: &DateTime<Utc>) -> Option<DateTime<FixedOffset>> {
        let mut stage = Stage::Year;
        loop {
            match self.step(stage) {
                Step::Continue(next) => stage = next,
                Step::Restart => {
                    self.restart(stage)?;
                    stage = Stage::Year;
                }
                Step::Matched => {
                    let wall_clock = self.cursor.wall_clock()?;
                    if let Some(found) = self.expression.timezone().instant_after(wall_clock, from)
                    {
                        return Some(found);
                    }
                    // Every mapping of this wall-clock time is at or before
                    // the starting instant (clocks turned back).
                    self.cursor.second += 1;
                    self.restart(stage)?;
                    stage = Stage::Year;
                }
                Step::Exhausted => return None,
            }
        }
    }

    fn restart(&mut self, stage: Stage) -> Option<()> {
        self.passes += 1;
        trace!(?stage, cursor = ?self.cursor, passes = self.passes, "rollover restart");
        if self.passes >= self.max_passes {
            warn!(
                expression = %self.expression,
                passes = self.passes,
                "giving up on next occurrence after too many restarts"
            );
            return None;
        }
        Some(())
    }

    fn step(&mut self, stage: Stage) -> Step {
        let expression = self.expression;
        let cursor = &mut self.cursor;
        match stage {
            Stage::Year => {
                let Some(next) = expression.years().next(cursor.year, MAX_YEAR) else {
                    return Step::Exhausted;
                };
                // There is no cycle above years to wrap into.
                if next.wrapped() {
                    return Step::Exhausted;
                }
                cursor.year = next.value;
                if next.advanced() {
                    cursor.reset_below(Stage::Year);
                }
                Step::Continue(Stage::Month)
            }
            Stage::Month => {
                let Some(next) = expression.months().next(cursor.month, Field::Months.max()) else {
                    return Step::Exhausted;
                };
                cursor.month = next.value;
                if next.wrapped() {
                    cursor.year += 1;
                    cursor.reset_below(Stage::Month);
                    return Step::Restart;
                }
                if next.advanced() {
                    cursor.reset_below(Stage::Month);
                }
                Step::Continue(Stage::Day)
            }
            Stage::Day => {
                let last_day = days_in_month(cursor.year, cursor.month);
                let Some(next) = expression.days().next(cursor.day, last_day) else {
                    // Only days past the end of this month, e.g. the 31st in April.
                    if expression.days().values(Field::Days.max()).is_empty() {
                        return Step::Exhausted;
                    }
                    cursor.month += 1;
                    cursor.day = Field::Days.min();
                    cursor.reset_below(Stage::Day);
                    return Step::Restart;
                };
                cursor.day = next.value;
                if next.wrapped() {
                    cursor.month += 1;
                    cursor.reset_below(Stage::Day);
                    return Step::Restart;
                }
                if next.advanced() {
                    cursor.reset_below(Stage::Day);
                }
                Step::Continue(Stage::Weekday)
            }
            Stage::Weekday => {
                let Some(date) = cursor.date() else {
                    return Step::Exhausted;
                };
                if !expression.weekdays().contains_weekday(date.weekday()) {
                    cursor.day += 1;
                    cursor.reset_below(Stage::Weekday);
                    return Step::Restart;
                }
                Step::Continue(Stage::Hour)
            }
            Stage::Hour => {
                let Some(next) = expression.hours().next(cursor.hour, Field::Hours.max()) else {
                    return Step::Exhausted;
                };
                cursor.hour = next.value;
                if next.wrapped() {
                    cursor.day += 1;
                    cursor.reset_below(Stage::Hour);
                    return Step::Restart;
                }
                if next.advanced() {
                    cursor.reset_below(Stage::Hour);
                }
                Step::Continue(Stage::Minute)
            }
            Stage::Minute => {
                let Some(next) = expression.minutes().next(cursor.minute, Field::Minutes.max())
                else {
                    return Step::Exhausted;
                };
                cursor.minute = next.value;
                if next.wrapped() {
                    cursor.hour += 1;
                    cursor.reset_below(Stage::Minute);
                    return Step::Restart;
                }
                if next.advanced() {
                    cursor.reset_below(Stage::Minute);
                }
                Step::Continue(Stage::Second)
            }
            Stage::Second => {
                let Some(next) = expression.seconds().next(cursor.second, Field::Seconds.max())
                else {
                    return Step::Exhausted;
                };
                cursor.second = next.value;
                if next.wrapped() {
                    cursor.minute += 1;
                    return Step::Restart;
                }
                Step::Matched
            }
        }
    }
}

impl Expression {
    /// The first instant strictly after `from` matching the expression, or
    /// `None` when there is none up to the last supported year.
    pub fn next<Z: TimeZone>(&self, from: &DateTime<Z>) -> Option<DateTime<FixedOffset>> {
        self.next_with(&RolloverConfig::default(), from)
    }

    pub fn next_with<Z: TimeZone>(
        &self,
        config: &RolloverConfig,
        from: &DateTime<Z>,
    ) -> Option<DateTime<FixedOffset>> {
        let from = from.with_timezone(&Utc);
        Rollover::new(self, &from, config).run(&from)
    }

    /// Successive occurrences strictly after `from`.
    pub fn occurrences<Z: TimeZone>(&self, from: &DateTime<Z>) -> Occurrences<'_> {
        Occurrences {
            expression: self,
            config: RolloverConfig::default(),
            cursor: Some(from.fixed_offset()),
        }
    }
}

/// Iterator returned by [`Expression::occurrences`].
pub struct Occurrences<'a> {
    expression: &'a Expression,
    config: RolloverConfig,
    cursor: Option<DateTime<FixedOffset>>,
}

impl Occurrences<'_> {
    pub fn with_config(mut self, config: RolloverConfig) -> Self {
        self.config = config;
        self
    }
}

impl Iterator for Occurrences<'_> {
    type Item = DateTime<FixedOffset>;

    fn next(&mut self) -> Option<Self::Item> {
        let from = self.cursor.take()?;
        let found = self.expression.next_with(&self.config, &from)?;
        self.cursor = Some(found);
        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_below_day_keeps_the_date() {
        let mut cursor = Cursor {
            year: 2024,
            month: 2,
            day: 29,
            hour: 13,
            minute: 14,
            second: 15,
        };
        cursor.reset_below(Stage::Day);
        assert_eq!((cursor.year, cursor.month, cursor.day), (2024, 2, 29));
        assert_eq!((cursor.hour, cursor.minute, cursor.second), (0, 0, 0));
    }

    #[test]
    fn reset_below_minute_only_clears_seconds() {
        let mut cursor = Cursor {
            year: 2024,
            month: 2,
            day: 29,
            hour: 13,
            minute: 14,
            second: 15,
        };
        cursor.reset_below(Stage::Minute);
        assert_eq!((cursor.hour, cursor.minute, cursor.second), (13, 14, 0));
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2100, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2023, 12), 31);
        assert_eq!(days_in_month(2023, 4), 30);
        assert_eq!(days_in_month(2023, 13), 0);
    }

    #[test]
    fn restart_ceiling_reports_not_found() {
        // Feb 30th never exists; the search carries forever without a ceiling.
        let expression = Expression::parse_or_abort("*-02-30 00:00:00 UTC");
        let from = Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap();
        let config = RolloverConfig { max_passes: 10 };
        assert_eq!(expression.next_with(&config, &from), None);
    }
}
