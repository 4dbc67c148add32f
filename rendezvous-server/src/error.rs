use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A join request without a usable room or display name. Nothing was mutated.
    #[error("malformed join: {field} must not be empty")]
    MalformedJoin { field: &'static str },
}
