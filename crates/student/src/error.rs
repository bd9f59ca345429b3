use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvError {
    #[error("invalid action: {field} = {value} is outside 0..{bound}")]
    InvalidAction {
        field: &'static str,
        value: usize,
        bound: usize,
    },
    #[error("invalid action arity: expected {expected} components, got {got}")]
    InvalidArity { expected: usize, got: usize },
    #[error("invalid environment shape: {0}")]
    InvalidShape(&'static str),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
