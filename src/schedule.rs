use crate::error::{ParseError, Result};
use crate::expression::Expression;
use crate::next::RolloverConfig;
use chrono::{DateTime, FixedOffset, TimeZone};
use rayon::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Independent calendar expressions fired as one: the next occurrence of the
/// schedule is the earliest next occurrence of any member.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schedule {
    expressions: Vec<Expression>,
}

impl Schedule {
    pub fn new(expressions: Vec<Expression>) -> Self {
        Self { expressions }
    }

    /// Parses one expression per line. Blank lines are ignored; a failing
    /// line is reported with its zero-based line number.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut expressions = Vec::new();
        for (index, line) in raw.split('\n').enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let expression = Expression::parse(line).map_err(|err| err.in_member(index))?;
            expressions.push(expression);
        }
        debug!(count = expressions.len(), "parsed schedule");
        Ok(Self { expressions })
    }

    /// Parses `raw`, panicking with the parse error when it is invalid.
    pub fn parse_or_abort(raw: &str) -> Self {
        match Self::parse(raw) {
            Ok(schedule) => schedule,
            Err(err) => panic!("invalid schedule: {err}"),
        }
    }

    pub fn push(&mut self, expression: Expression) {
        self.expressions.push(expression);
    }

    pub fn remove(&mut self, index: usize) -> Option<Expression> {
        (index < self.expressions.len()).then(|| self.expressions.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&Expression> {
        self.expressions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expression> {
        self.expressions.iter()
    }

    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    /// The earliest instant strictly after `from` matched by any member.
    pub fn next<Z: TimeZone>(&self, from: &DateTime<Z>) -> Option<DateTime<FixedOffset>> {
        self.next_with(&RolloverConfig::default(), from)
    }

    pub fn next_with<Z: TimeZone>(
        &self,
        config: &RolloverConfig,
        from: &DateTime<Z>,
    ) -> Option<DateTime<FixedOffset>> {
        let from = from.fixed_offset();
        self.expressions
            .par_iter()
            .filter_map(|expression| expression.next_with(config, &from))
            .min()
    }

    /// Successive occurrences of the schedule strictly after `from`.
    pub fn occurrences<Z: TimeZone>(&self, from: &DateTime<Z>) -> ScheduleOccurrences<'_> {
        ScheduleOccurrences {
            schedule: self,
            cursor: Some(from.fixed_offset()),
        }
    }
}

/// Iterator returned by [`Schedule::occurrences`].
pub struct ScheduleOccurrences<'a> {
    schedule: &'a Schedule,
    cursor: Option<DateTime<FixedOffset>>,
}

impl Iterator for ScheduleOccurrences<'_> {
    type Item = DateTime<FixedOffset>;

    fn next(&mut self) -> Option<Self::Item> {
        let from = self.cursor.take()?;
        let found = self.schedule.next(&from)?;
        self.cursor = Some(found);
        Some(found)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Expression;
    type IntoIter = std::slice::Iter<'a, Expression>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Expression> for Schedule {
    fn from_iter<I: IntoIterator<Item = Expression>>(iter: I) -> Self {
        Self {
            expressions: iter.into_iter().collect(),
        }
    }
}

impl FromStr for Schedule {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// One canonical expression per line.
impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, expression) in self.expressions.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{expression}")?;
        }
        Ok(())
    }
}

impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
