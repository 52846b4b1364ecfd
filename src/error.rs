use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvError {
    #[error("invalid odds {value}: {reason}")]
    InvalidOdds { value: f64, reason: &'static str },

    #[error("invalid line value {0}: must be finite")]
    InvalidLineValue(f64),

    #[error("invalid over/under {0:?}: expected \"over\" or \"under\"")]
    InvalidOverUnder(String),

    #[error("invalid stake {0}: must be finite and positive")]
    InvalidStake(f64),

    #[error("invalid event date {0:?}")]
    InvalidEventDate(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unknown platform {0:?}")]
    UnknownPlatform(String),
}

pub type Result<T> = std::result::Result<T, EvError>;
