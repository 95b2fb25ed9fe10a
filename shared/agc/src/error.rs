use thiserror::Error;

pub type AgcResult<T> = Result<T, AgcError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgcError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}
