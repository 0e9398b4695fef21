//! Accessor configuration
//!
//! Policies for the two situations where a silent default would hide a
//! mistake. Both default to the behaviour the façade functions rely on.

/// How the registry builder treats two properties whose names differ only
/// by case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollisionPolicy {
    /// Fail the build with `AccessorError::DuplicateProperty`
    #[default]
    Reject,
    /// Keep the later descriptor at the earlier one's position
    LastWins,
}

/// How positional writes treat a name absent from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MissingPropertyPolicy {
    /// Skip that position, like `set_many`
    #[default]
    Skip,
    /// Fail with `AccessorError::UnknownProperty` before writing anything
    Fail,
}

/// Options for creating accessors and mappers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccessorConfig {
    /// Registry build policy for case-insensitive name collisions
    pub collision: CollisionPolicy,

    /// Policy for unknown names in `set_positional`, `set_all` and `map_to`
    pub missing_positional: MissingPropertyPolicy,
}

impl AccessorConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collision policy
    pub fn with_collision(mut self, policy: CollisionPolicy) -> Self {
        self.collision = policy;
        self
    }

    /// Set the positional missing-name policy
    pub fn with_missing_positional(mut self, policy: MissingPropertyPolicy) -> Self {
        self.missing_positional = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AccessorConfig::new();
        assert_eq!(config.collision, CollisionPolicy::Reject);
        assert_eq!(config.missing_positional, MissingPropertyPolicy::Skip);
    }

    #[test]
    fn test_builder_setters() {
        let config = AccessorConfig::new()
            .with_collision(CollisionPolicy::LastWins)
            .with_missing_positional(MissingPropertyPolicy::Fail);
        assert_eq!(config.collision, CollisionPolicy::LastWins);
        assert_eq!(config.missing_positional, MissingPropertyPolicy::Fail);
    }
}
