use thiserror::Error;

use crate::schema::Field;

/// Input rows that do not fit the fixed roster schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("line {line}: row has {len} fields, '{field}' needs index {index}")]
    RowTooShort {
        line: usize,
        field: Field,
        index: usize,
        len: usize,
    },
    #[error("unknown roster field '{0}'")]
    UnknownField(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown party code '{0}' (expected R, D or I)")]
pub struct PartyError(pub String);

/// Failures of the underlying address tagger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaggerError {
    #[error("address has {count} tokens, limit is {limit}")]
    TooManyTokens { count: usize, limit: usize },
    #[error("address contains control character {0:?}")]
    ControlCharacter(char),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("could not segment address '{address}': {source}")]
pub struct AddressParseError {
    pub address: String,
    #[source]
    pub source: TaggerError,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordBuildError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("line {line}: {source}")]
    UnknownParty {
        line: usize,
        #[source]
        source: PartyError,
    },
}

impl RecordBuildError {
    /// Schema violations mean the input format itself is wrong.
    pub fn is_schema(&self) -> bool {
        matches!(self, RecordBuildError::Schema(_))
    }
}

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("malformed roster row: {0}")]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Record(RecordBuildError),
}

impl From<RecordBuildError> for AggregateError {
    fn from(err: RecordBuildError) -> Self {
        match err {
            RecordBuildError::Schema(e) => AggregateError::Schema(e),
            other => AggregateError::Record(other),
        }
    }
}
