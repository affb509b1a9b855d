use crate::field::Field;
use thiserror::Error;

/// Errors raised while turning text into an [`Expression`](crate::Expression)
/// or a [`Schedule`](crate::Schedule).
///
/// Leaf variants describe what was wrong; `Element`, `Field` and
/// `ScheduleMember` wrap a leaf with the position it was found at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty expression")]
    EmptyExpression,

    #[error("too many chunks: expected at most 4, got {count}")]
    TooManyChunks { count: usize },

    #[error("invalid chunk {0}")]
    UnconsumedChunk(String),

    #[error("invalid value '{0}'")]
    InvalidComponentValue(String),

    #[error("invalid range '{0}'")]
    InvalidRange(String),

    #[error("invalid bounds: {from} must be lower than {to}")]
    InvalidBounds { from: u32, to: u32 },

    #[error("invalid repeat '{0}'")]
    InvalidRepeat(String),

    #[error("value {value} outside of {min}..{max}")]
    ValueOutOfRange { value: u32, min: u32, max: u32 },

    #[error("invalid {chunk} chunk: expected at most 3 parts, got {count}")]
    TooManyParts { chunk: &'static str, count: usize },

    #[error("invalid weekday '{0}'")]
    InvalidWeekdayName(String),

    #[error("invalid weekday range '{0}'")]
    InvalidWeekdayRange(String),

    #[error("unknown timezone '{0}'")]
    InvalidTimezoneName(String),

    #[error("parsing element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<ParseError>,
    },

    #[error("parsing {field}: {source}")]
    Field {
        field: Field,
        #[source]
        source: Box<ParseError>,
    },

    #[error("parsing expression {index}: {source}")]
    ScheduleMember {
        index: usize,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    pub(crate) fn at_element(self, index: usize) -> Self {
        ParseError::Element {
            index,
            source: Box::new(self),
        }
    }

    pub(crate) fn in_field(self, field: Field) -> Self {
        ParseError::Field {
            field,
            source: Box::new(self),
        }
    }

    pub(crate) fn in_member(self, index: usize) -> Self {
        ParseError::ScheduleMember {
            index,
            source: Box::new(self),
        }
    }

    /// The innermost error, with every positional wrapper removed.
    pub fn root_cause(&self) -> &ParseError {
        match self {
            ParseError::Element { source, .. }
            | ParseError::Field { source, .. }
            | ParseError::ScheduleMember { source, .. } => source.root_cause(),
            leaf => leaf,
        }
    }

    /// The field the error was raised in, if any.
    pub fn field(&self) -> Option<Field> {
        match self {
            ParseError::Field { field, .. } => Some(*field),
            ParseError::Element { source, .. } | ParseError::ScheduleMember { source, .. } => {
                source.field()
            }
            _ => None,
        }
    }
}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;
