use shared::domain::OptionValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("control {0} is not managed by this engine")]
    UnknownControl(String),
    #[error("value {value} is already selected in another control")]
    DuplicateSelection { value: OptionValue },
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("host lists {host} live controls, engine tracks {tracked}")]
    LiveControlsMismatch { host: usize, tracked: usize },
    #[error("value {value} is selected in more than one control")]
    DuplicateSelection { value: OptionValue },
    #[error("expected a single trailing empty control, found {empty} empty (last empty: {last_is_empty})")]
    TrailingControl { empty: usize, last_is_empty: bool },
    #[error("pool is exhausted but {empty} empty controls remain")]
    EmptyAfterExhaustion { empty: usize },
    #[error("control {position} offers value {value} twice")]
    DuplicateOption { position: usize, value: OptionValue },
    #[error("control {position} is missing {missing:?} and should not offer {unexpected:?}")]
    OptionMismatch {
        position: usize,
        missing: Vec<OptionValue>,
        unexpected: Vec<OptionValue>,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
