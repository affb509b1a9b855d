use crate::error::{ParseError, Result};
use crate::field::Field;
use std::collections::BTreeSet;
use std::fmt;

/// A single value or inclusive range of one time unit, optionally repeating
/// every `repeat` units starting at `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Component {
    pub from: u32,
    pub to: Option<u32>,
    pub repeat: Option<u32>,
}

impl Component {
    pub const fn single(value: u32) -> Self {
        Self {
            from: value,
            to: None,
            repeat: None,
        }
    }

    pub fn range(from: u32, to: u32) -> Result<Self> {
        if from >= to {
            return Err(ParseError::InvalidBounds { from, to });
        }
        Ok(Self {
            from,
            to: Some(to),
            repeat: None,
        })
    }

    /// Returns a copy repeating every `step` units. A zero step means no
    /// repetition.
    pub fn every(self, step: u32) -> Self {
        Self {
            repeat: (step > 0).then_some(step),
            ..self
        }
    }

    /// Parses `<uint>[/<uint>]`.
    pub fn parse_value(raw: &str) -> Result<Self> {
        let (value, repeat) = split_repeat(raw)?;
        Ok(Self {
            from: parse_uint(value)?,
            to: None,
            repeat,
        })
    }

    /// Parses `<uint>..<uint>[/<uint>]`.
    pub fn parse_range(raw: &str) -> Result<Self> {
        let (bounds, repeat) = split_repeat(raw)?;
        let parts: Vec<&str> = bounds.split("..").collect();
        let [lower, upper] = parts.as_slice() else {
            return Err(ParseError::InvalidRange(raw.to_string()));
        };
        let component = Self::range(parse_uint(lower)?, parse_uint(upper)?)?;
        Ok(Self {
            repeat,
            ..component
        })
    }

    fn check_bounds(&self, field: Field) -> Result<()> {
        let (min, max) = field.bounds();
        for value in std::iter::once(self.from).chain(self.to) {
            if value < min || value > max {
                return Err(ParseError::ValueOutOfRange { value, min, max });
            }
        }
        Ok(())
    }

    fn expand_into(&self, max: u32, seen: &mut BTreeSet<u32>) {
        let mut from = self.from;
        let mut to = self.to;
        loop {
            if from > max {
                break;
            }
            match to {
                None => {
                    seen.insert(from);
                }
                Some(to) => seen.extend(from..=to.min(max)),
            }

            let Some(step) = self.repeat.filter(|step| *step > 0) else {
                break;
            };
            let Some(shifted) = from.checked_add(step) else {
                break;
            };
            from = shifted;
            to = to.map(|to| to.saturating_add(step));
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.from)?;
        if let Some(to) = self.to {
            write!(f, "..{:02}", to)?;
        }
        if let Some(repeat) = self.repeat {
            write!(f, "/{}", repeat)?;
        }
        Ok(())
    }
}

/// Splits an optional `/repeat` suffix off `raw`. A repeat of zero is folded
/// into "no repeat".
fn split_repeat(raw: &str) -> Result<(&str, Option<u32>)> {
    let Some((value, repeat)) = raw.split_once('/') else {
        return Ok((raw, None));
    };
    let step = repeat
        .parse::<i64>()
        .ok()
        .and_then(|step| u32::try_from(step).ok())
        .ok_or_else(|| ParseError::InvalidRepeat(repeat.to_string()))?;
    Ok((value, (step > 0).then_some(step)))
}

fn parse_uint(raw: &str) -> Result<u32> {
    raw.parse::<i64>()
        .ok()
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| ParseError::InvalidComponentValue(raw.to_string()))
}

/// Result of [`ComponentSet::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextValue {
    pub value: u32,
    /// `value - current`; negative when the search wrapped around.
    pub diff: i64,
}

impl NextValue {
    /// The set had nothing at or above the current value, so the next
    /// coarser unit has to be incremented.
    pub fn wrapped(&self) -> bool {
        self.diff < 0
    }

    /// The value moved forward, so every finer unit restarts at its minimum.
    pub fn advanced(&self) -> bool {
        self.diff > 0
    }
}

/// Comma-separated list of [`Component`]s making up one field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ComponentSet(Vec<Component>);

impl ComponentSet {
    pub fn new(components: Vec<Component>) -> Self {
        Self(components)
    }

    /// The set rendered as `*`: every value the field accepts.
    pub fn match_all(field: Field) -> Self {
        let (min, max) = field.bounds();
        Self(vec![Component {
            from: min,
            to: Some(max),
            repeat: None,
        }])
    }

    /// The set a field takes when the expression leaves it out.
    pub fn omitted(field: Field) -> Self {
        if field.omitted_matches_everything() {
            Self::match_all(field)
        } else {
            Self(vec![Component::single(field.min())])
        }
    }

    /// Parses a comma-separated list of values and ranges.
    pub fn parse(raw: &str) -> Result<Self> {
        raw.split(',')
            .enumerate()
            .map(|(index, chunk)| {
                let parsed = if chunk.contains("..") {
                    Component::parse_range(chunk)
                } else {
                    Component::parse_value(chunk)
                };
                parsed.map_err(|err| err.at_element(index))
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Parses a list and checks every bound against the field's limits.
    pub fn parse_for(field: Field, raw: &str) -> Result<Self> {
        let set = Self::parse(raw)?;
        for (index, component) in set.0.iter().enumerate() {
            component
                .check_bounds(field)
                .map_err(|err| err.at_element(index))?;
        }
        Ok(set)
    }

    pub fn components(&self) -> &[Component] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every distinct value described by the set that is at most `max`, in
    /// ascending order.
    pub fn values(&self, max: u32) -> Vec<u32> {
        let mut seen = BTreeSet::new();
        for component in &self.0 {
            component.expand_into(max, &mut seen);
        }
        seen.into_iter().collect()
    }

    /// The smallest value at or above `current`, wrapping to the smallest
    /// value overall when there is none. `None` when no value fits under
    /// `max`.
    pub fn next(&self, current: u32, max: u32) -> Option<NextValue> {
        let values = self.values(max);
        let value = values
            .iter()
            .copied()
            .find(|value| *value >= current)
            .or_else(|| values.first().copied())?;
        Some(NextValue {
            value,
            diff: i64::from(value) - i64::from(current),
        })
    }
}

impl From<Vec<Component>> for ComponentSet {
    fn from(components: Vec<Component>) -> Self {
        Self(components)
    }
}

impl fmt::Display for ComponentSet {
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
