use crate::component::ComponentSet;
use crate::error::{ParseError, Result};
use crate::field::Field;
use crate::timezone::Timezone;
use crate::weekday::WeekdaySet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const WILDCARD: &str = "*";
const MAX_CHUNKS: usize = 4;

/// A parsed calendar event such as `Mon..Fri *-*-* 08:30 Europe/Paris`.
///
/// The grammar is `[weekdays] [[year-]month-day] [hour:minute[:second]] [timezone]`,
/// every part optional but at least one present. Expressions are immutable
/// once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    weekdays: WeekdaySet,
    years: ComponentSet,
    months: ComponentSet,
    days: ComponentSet,
    hours: ComponentSet,
    minutes: ComponentSet,
    seconds: ComponentSet,
    timezone: Timezone,
}

impl Expression {
    pub fn parse(raw: &str) -> Result<Self> {
        Parser::new(raw).parse().inspect_err(|err| {
            debug!(expression = raw, error = %err, "failed to parse calendar expression");
        })
    }

    /// Parses `raw`, panicking with the parse error when it is invalid.
    pub fn parse_or_abort(raw: &str) -> Self {
        match Self::parse(raw) {
            Ok(expression) => expression,
            Err(err) => panic!("invalid calendar expression {raw:?}: {err}"),
        }
    }

    pub fn weekdays(&self) -> &WeekdaySet {
        &self.weekdays
    }

    pub fn years(&self) -> &ComponentSet {
        &self.years
    }

    pub fn months(&self) -> &ComponentSet {
        &self.months
    }

    pub fn days(&self) -> &ComponentSet {
        &self.days
    }

    pub fn hours(&self) -> &ComponentSet {
        &self.hours
    }

    pub fn minutes(&self) -> &ComponentSet {
        &self.minutes
    }

    pub fn seconds(&self) -> &ComponentSet {
        &self.seconds
    }

    pub fn timezone(&self) -> &Timezone {
        &self.timezone
    }

    /// The component set of a numeric field.
    ///
    /// `Field::Weekdays` has its own type, see [`Expression::weekdays`];
    /// asking for it here returns the years set.
    pub fn field(&self, field: Field) -> &ComponentSet {
        match field {
            Field::Months => &self.months,
            Field::Days => &self.days,
            Field::Hours => &self.hours,
            Field::Minutes => &self.minutes,
            Field::Seconds => &self.seconds,
            Field::Years | Field::Weekdays => &self.years,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut ComponentSet {
        match field {
            Field::Months => &mut self.months,
            Field::Days => &mut self.days,
            Field::Hours => &mut self.hours,
            Field::Minutes => &mut self.minutes,
            Field::Seconds => &mut self.seconds,
            Field::Years | Field::Weekdays => &mut self.years,
        }
    }

    fn with_defaults() -> Self {
        Self {
            weekdays: WeekdaySet::match_all(),
            years: ComponentSet::omitted(Field::Years),
            months: ComponentSet::omitted(Field::Months),
            days: ComponentSet::omitted(Field::Days),
            hours: ComponentSet::omitted(Field::Hours),
            minutes: ComponentSet::omitted(Field::Minutes),
            seconds: ComponentSet::omitted(Field::Seconds),
            timezone: Timezone::Local,
        }
    }

    fn write_field(&self, f: &mut fmt::Formatter<'_>, field: Field) -> fmt::Result {
        let set = self.field(field);
        if *set == ComponentSet::match_all(field) {
            f.write_str(WILDCARD)
        } else {
            write!(f, "{set}")
        }
    }
}

/// Consumes the whitespace-separated chunks of an expression left to right.
struct Parser<'a> {
    chunks: Vec<&'a str>,
    position: usize,
    expression: Expression,
}

impl<'a> Parser<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            chunks: raw.split_whitespace().collect(),
            position: 0,
            expression: Expression::with_defaults(),
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.chunks.get(self.position).copied()
    }

    fn take_if(&mut self, accept: impl Fn(&str) -> bool) -> Option<&'a str> {
        let chunk = self.peek().filter(|chunk| accept(chunk))?;
        self.position += 1;
        Some(chunk)
    }

    fn parse(mut self) -> Result<Expression> {
        match self.chunks.len() {
            0 => return Err(ParseError::EmptyExpression),
            count if count > MAX_CHUNKS => return Err(ParseError::TooManyChunks { count }),
            _ => {}
        }

        // Neither a date nor a time, and a timezone never comes first.
        if let Some(chunk) = self.take_if(|chunk| !chunk.contains(['-', ':'])) {
            self.expression.weekdays =
                WeekdaySet::parse(chunk).map_err(|err| err.in_field(Field::Weekdays))?;
        }

        if let Some(chunk) = self.take_if(|chunk| chunk.contains('-')) {
            self.parse_date(chunk)?;
        }

        if let Some(chunk) = self.take_if(|chunk| chunk.contains(':')) {
            self.parse_time(chunk)?;
        }

        if let Some(chunk) = self.take_if(|_| true) {
            self.expression.timezone = Timezone::resolve(chunk)?;
        }

        if let Some(chunk) = self.peek() {
            return Err(ParseError::UnconsumedChunk(chunk.to_string()));
        }

        Ok(self.expression)
    }

    fn parse_date(&mut self, chunk: &str) -> Result<()> {
        let mut parts: Vec<&str> = chunk.split('-').collect();
        if parts.len() > 3 {
            return Err(ParseError::TooManyParts {
                chunk: "date",
                count: parts.len(),
            });
        }
        if parts.len() == 2 {
            parts.insert(0, WILDCARD);
        }
        self.parse_parts(&Field::DATE, &parts)
    }

    fn parse_time(&mut self, chunk: &str) -> Result<()> {
        let mut parts: Vec<&str> = chunk.split(':').collect();
        if parts.len() > 3 {
            return Err(ParseError::TooManyParts {
                chunk: "time",
                count: parts.len(),
            });
        }
        if parts.len() == 2 {
            parts.push("00");
        }
        self.parse_parts(&Field::TIME, &parts)
    }

    fn parse_parts(&mut self, fields: &[Field; 3], parts: &[&str]) -> Result<()> {
        for (field, part) in fields.iter().copied().zip(parts) {
            let set = if *part == WILDCARD {
                ComponentSet::match_all(field)
            } else {
                ComponentSet::parse_for(field, part).map_err(|err| err.in_field(field))?
            };
            *self.expression.field_mut(field) = set;
        }
        Ok(())
    }
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Canonical rendering: parsing it back yields an equal expression.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weekdays != WeekdaySet::match_all() {
            write!(f, "{} ", self.weekdays)?;
        }

        self.write_field(f, Field::Years)?;
        f.write_str("-")?;
        self.write_field(f, Field::Months)?;
        f.write_str("-")?;
        self.write_field(f, Field::Days)?;
        f.write_str(" ")?;

        self.write_field(f, Field::Hours)?;
        f.write_str(":")?;
        self.write_field(f, Field::Minutes)?;
        f.write_str(":")?;
        self.write_field(f, Field::Seconds)?;

        if !self.timezone.is_local() {
            write!(f, " {}", self.timezone)?;
        }
        Ok(())
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
