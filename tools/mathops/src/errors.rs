use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Cannot divide by zero")]
    DivisionByZero,
    #[error("Cannot calculate square root of negative number")]
    NegativeSquareRoot,
    #[error("Cannot calculate factorial of negative number")]
    NegativeFactorial,
}

#[derive(Debug, Error)]
pub enum MathOpsError {
    #[error("io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("cli error: {0}")]
    Cli(String),
    #[error("serialize error: {0}")]
    Serialize(String),
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}
