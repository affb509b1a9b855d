use crate::error::{ParseError, Result};
use chrono::Weekday;
use std::collections::BTreeSet;
use std::fmt;

/// Accepted spellings, matched case-insensitively. Monday is day 1.
const WEEKDAY_NAMES: [(&str, u32); 14] = [
    ("monday", 1),
    ("mon", 1),
    ("tuesday", 2),
    ("tue", 2),
    ("wednesday", 3),
    ("wed", 3),
    ("thursday", 4),
    ("thu", 4),
    ("friday", 5),
    ("fri", 5),
    ("saturday", 6),
    ("sat", 6),
    ("sunday", 7),
    ("sun", 7),
];

const WEEKDAY_ABBREVIATIONS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn weekday_number(name: &str) -> Option<u32> {
    WEEKDAY_NAMES
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, number)| *number)
}

fn weekday_abbreviation(number: u32) -> &'static str {
    number
        .checked_sub(1)
        .and_then(|index| WEEKDAY_ABBREVIATIONS.get(index as usize))
        .copied()
        .unwrap_or("?")
}

/// A single weekday or a range of weekdays that does not wrap past Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdayComponent {
    pub from: u32,
    pub to: Option<u32>,
}

impl WeekdayComponent {
    pub fn single(day: Weekday) -> Self {
        Self {
            from: day.number_from_monday(),
            to: None,
        }
    }

    pub fn range(from: Weekday, to: Weekday) -> Result<Self> {
        let (from, to) = (from.number_from_monday(), to.number_from_monday());
        if from >= to {
            return Err(ParseError::InvalidWeekdayRange(format!(
                "{}..{}",
                weekday_abbreviation(from),
                weekday_abbreviation(to)
            )));
        }
        Ok(Self { from, to: Some(to) })
    }

    pub fn parse_value(raw: &str) -> Result<Self> {
        let from =
            weekday_number(raw).ok_or_else(|| ParseError::InvalidWeekdayName(raw.to_string()))?;
        Ok(Self { from, to: None })
    }

    pub fn parse_range(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split("..").collect();
        let [lower, upper] = parts.as_slice() else {
            return Err(ParseError::InvalidWeekdayRange(raw.to_string()));
        };
        let from =
            weekday_number(lower).ok_or_else(|| ParseError::InvalidWeekdayName(lower.to_string()))?;
        let to =
            weekday_number(upper).ok_or_else(|| ParseError::InvalidWeekdayName(upper.to_string()))?;
        if from >= to {
            return Err(ParseError::InvalidWeekdayRange(raw.to_string()));
        }
        Ok(Self { from, to: Some(to) })
    }
}

impl fmt::Display for WeekdayComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(weekday_abbreviation(self.from))?;
        if let Some(to) = self.to {
            write!(f, "..{}", weekday_abbreviation(to))?;
        }
        Ok(())
    }
}

/// Comma-separated list of weekdays and weekday ranges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct WeekdaySet(Vec<WeekdayComponent>);

impl WeekdaySet {
    pub fn new(components: Vec<WeekdayComponent>) -> Self {
        Self(components)
    }

    pub fn match_all() -> Self {
        Self(vec![WeekdayComponent {
            from: 1,
            to: Some(7),
        }])
    }

    pub fn parse(raw: &str) -> Result<Self> {
        raw.split(',')
            .enumerate()
            .map(|(index, chunk)| {
                let parsed = if chunk.contains("..") {
                    WeekdayComponent::parse_range(chunk)
                } else {
                    WeekdayComponent::parse_value(chunk)
                };
                parsed.map_err(|err| err.at_element(index))
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    pub fn components(&self) -> &[WeekdayComponent] {
        &self.0
    }

    /// Weekday numbers in the set, ascending, Monday = 1.
    pub fn values(&self) -> Vec<u32> {
        let mut seen = BTreeSet::new();
        for component in &self.0 {
            match component.to {
                None => {
                    seen.insert(component.from);
                }
                Some(to) => seen.extend(component.from..=to.min(7)),
            }
        }
        seen.into_iter().filter(|day| *day <= 7).collect()
    }

    pub fn contains(&self, day: u32) -> bool {
        self.0.iter().any(|component| match component.to {
            None => component.from == day,
            Some(to) => (component.from..=to.min(7)).contains(&day),
        })
    }

    pub fn contains_weekday(&self, day: Weekday) -> bool {
        self.contains(day.number_from_monday())
    }
}

impl From<Vec<WeekdayComponent>> for WeekdaySet {
    fn from(components: Vec<WeekdayComponent>) -> Self {
        Self(components)
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, component) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}
