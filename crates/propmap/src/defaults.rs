//! Type resolvers consumed by null normalization.

use crate::types::{DeclaredType, PrimitiveCategory};
use crate::value::Value;

/// Strip an optional wrapper; identity for non-optional types
pub fn underlying_type(declared: &DeclaredType) -> DeclaredType {
    declared.underlying()
}

/// Canonical zero value for a declared type's category.
///
/// Text is `""`, numeric is `0`, logical is `false`. A `char` is text but
/// cannot hold `""`, so it gets `'\0'`. Temporal and object types have no
/// well-defined zero and resolve to `None`.
pub fn default_for(declared: &DeclaredType) -> Option<Value> {
    match declared.category {
        PrimitiveCategory::Text if declared.name == "char" => Some(Value::Char('\0')),
        PrimitiveCategory::Text => Some(Value::Text(String::new())),
        PrimitiveCategory::Numeric => Some(Value::Int(0)),
        PrimitiveCategory::Logical => Some(Value::Bool(false)),
        PrimitiveCategory::Temporal | PrimitiveCategory::Object => None,
    }
}

/// Category of a runtime value; null counts as object
pub fn category_of(value: &Value) -> PrimitiveCategory {
    value.category().unwrap_or(PrimitiveCategory::Object)
}

/// Whether the declared type is numeric
pub fn is_numeric(declared: &DeclaredType) -> bool {
    declared.underlying().category == PrimitiveCategory::Numeric
}
