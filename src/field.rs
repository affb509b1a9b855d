use std::fmt;

pub const MIN_YEAR: u32 = 1970;
pub const MAX_YEAR: u32 = 2199;

/// One of the seven time units an expression constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Weekdays,
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl Field {
    pub const DATE: [Field; 3] = [Field::Years, Field::Months, Field::Days];
    pub const TIME: [Field; 3] = [Field::Hours, Field::Minutes, Field::Seconds];

    /// Inclusive bounds of the values this field accepts.
    ///
    /// Days are further limited by the length of the month when an
    /// expression is evaluated.
    pub fn bounds(self) -> (u32, u32) {
        match self {
            Field::Weekdays => (1, 7),
            Field::Years => (MIN_YEAR, MAX_YEAR),
            Field::Months => (1, 12),
            Field::Days => (1, 31),
            Field::Hours => (0, 23),
            Field::Minutes | Field::Seconds => (0, 59),
        }
    }

    pub fn min(self) -> u32 {
        self.bounds().0
    }

    pub fn max(self) -> u32 {
        self.bounds().1
    }

    /// Whether leaving the field out of an expression means "any value".
    ///
    /// Time fields fall back to zero instead, so `Mon 2024-*-*` fires at
    /// midnight.
    pub fn omitted_matches_everything(self) -> bool {
        !matches!(self, Field::Hours | Field::Minutes | Field::Seconds)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Weekdays => "weekdays",
            Field::Years => "years",
            Field::Months => "months",
            Field::Days => "days",
            Field::Hours => "hours",
            Field::Minutes => "minutes",
            Field::Seconds => "seconds",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
