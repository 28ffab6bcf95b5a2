//! ID generator port for producing unique identifiers.

/// Generates unique identifiers.
///
/// Used to disambiguate run identifiers created within the same clock tick.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
