//! Static property metadata
//!
//! These are the compile-time facts `#[derive(Properties)]` emits for each
//! property: its display name, read/write capability and declared type. The
//! registry builder turns a slice of `PropertyDef` into a lookup table.

use std::fmt;

/// Simplified type classification used for defaulting and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveCategory {
    /// Strings and characters
    Text,
    /// Integers and floats
    Numeric,
    /// Booleans
    Logical,
    /// Dates and date-times
    Temporal,
    /// Everything else
    Object,
}

/// Declared type of a property.
///
/// `name` is the carried type's name; `nullable` marks an `Option<_>`
/// wrapper around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclaredType {
    /// Carried type name, e.g. `"i32"`
    pub name: &'static str,
    /// Category of the carried type
    pub category: PrimitiveCategory,
    /// Whether the property is an optional wrapper
    pub nullable: bool,
}

impl DeclaredType {
    /// Non-optional type of the given category
    pub const fn new(name: &'static str, category: PrimitiveCategory) -> Self {
        Self {
            name,
            category,
            nullable: false,
        }
    }

    /// Non-optional object-shaped type
    pub const fn object(name: &'static str) -> Self {
        Self::new(name, PrimitiveCategory::Object)
    }

    /// Optional wrapper around `inner`
    pub const fn nullable(inner: DeclaredType) -> Self {
        Self {
            nullable: true,
            ..inner
        }
    }

    /// The carried type with any optional wrapper removed
    pub const fn underlying(self) -> Self {
        Self {
            nullable: false,
            ..self
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "Option<{}>", self.name)
        } else {
            f.write_str(self.name)
        }
    }
}

/// Read/write capability of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Access {
    /// Readable and writable
    #[default]
    ReadWrite,
    /// Readable only
    ReadOnly,
    /// Writable only
    WriteOnly,
}

impl Access {
    /// Whether the property can be read
    pub const fn can_read(self) -> bool {
        matches!(self, Access::ReadWrite | Access::ReadOnly)
    }

    /// Whether the property can be written
    pub const fn can_write(self) -> bool {
        matches!(self, Access::ReadWrite | Access::WriteOnly)
    }
}

/// Compile-time description of one property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDef {
    /// Display name, case preserved
    pub name: &'static str,
    /// Read/write capability
    pub access: Access,
    /// Declared type
    pub declared: DeclaredType,
}

impl PropertyDef {
    /// Create a property definition
    pub const fn new(name: &'static str, access: Access, declared: DeclaredType) -> Self {
        Self {
            name,
            access,
            declared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_flags() {
        assert!(Access::ReadWrite.can_read());
        assert!(Access::ReadWrite.can_write());
        assert!(Access::ReadOnly.can_read());
        assert!(!Access::ReadOnly.can_write());
        assert!(!Access::WriteOnly.can_read());
        assert!(Access::WriteOnly.can_write());
    }

    #[test]
    fn test_nullable_roundtrip() {
        let int = DeclaredType::new("i32", PrimitiveCategory::Numeric);
        let opt = DeclaredType::nullable(int);

        assert!(opt.nullable);
        assert_eq!(opt.underlying(), int);
        assert_eq!(opt.to_string(), "Option<i32>");
        assert_eq!(int.to_string(), "i32");
    }
}
