#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Missing '=' between key and value")]
    MissingSeparator,
    #[error("Key is empty")]
    EmptyKey,
}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;
