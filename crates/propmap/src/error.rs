//! Error types for property access and mapping

/// Result type for accessor and mapper calls
pub type AccessorResult<T> = Result<T, AccessorError>;

/// Value conversion errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    /// The value has a different shape than the target type
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual value kind
        got: String,
    },

    /// Numeric value does not fit the target type
    #[error("Value {value} out of range for {target}")]
    OutOfRange {
        /// Offending value, formatted
        value: String,
        /// Target type name
        target: String,
    },
}

impl ValueError {
    pub(crate) fn mismatch(expected: &str, got: &str) -> Self {
        ValueError::TypeMismatch {
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }
}

/// Accessor and mapper error types
///
/// Only contract violations surface here. Unknown properties, read-only
/// targets and failed narrowing are absorbed by the soft-miss operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AccessorError {
    /// Two properties normalize to the same lookup key
    #[error("Type '{type_name}' declares '{first}' and '{second}', which collide case-insensitively")]
    DuplicateProperty {
        /// Type being registered
        type_name: String,
        /// Property declared first
        first: String,
        /// Property declared later
        second: String,
    },

    /// Paired arrays passed to a positional operation differ in length
    #[error("{operation}: expected {expected} values, got {got}")]
    LengthMismatch {
        /// Operation that was called
        operation: &'static str,
        /// Required length
        expected: usize,
        /// Supplied length
        got: usize,
    },

    /// A positional write named a property the registry does not know
    #[error("Property '{name}' not found in type '{type_name}'")]
    UnknownProperty {
        /// Type the accessor was built for
        type_name: String,
        /// Requested property name
        name: String,
    },

    /// The two values have no default ordering
    #[error("Cannot compare {left} with {right}")]
    Incomparable {
        /// Left value kind
        left: String,
        /// Right value kind
        right: String,
    },

    /// A value could not be converted into the property's declared type
    #[error("Property '{property}': {source}")]
    Conversion {
        /// Property being written
        property: String,
        /// Underlying conversion failure
        #[source]
        source: ValueError,
    },
}
