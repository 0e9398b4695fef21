//! Value - dynamic property value
//!
//! Every property read or written through an accessor travels as a `Value`.
//! The variants mirror the primitive categories a property can declare:
//!
//! ```text
//! Text:      Text, Char
//! Numeric:   Int (signed), UInt (unsigned), Float
//! Logical:   Bool
//! Temporal:  Date, DateTime
//! Object:    Object (type-erased, structurally comparable)
//! ```
//!
//! `Null` is the absent value: unset optional fields, unknown properties and
//! unbound accessors all read as `Null`.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::types::PrimitiveCategory;

/// Dynamic value of a single property.
///
/// Equality is per variant. Unlike `f64`, `Float(NaN)` equals itself so a
/// value always equals its own clone; ordering via [`Value::compare`] still
/// treats NaN as incomparable.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Floating point number
    Float(f64),
    /// Single character
    Char(char),
    /// Owned string
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time without zone
    DateTime(NaiveDateTime),
    /// Any other value, compared structurally
    Object(ObjectValue),
}

impl Value {
    /// Check if value is null
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract signed integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract unsigned integer value
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(u) => Some(*u),
            _ => None,
        }
    }

    /// Extract float value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Extract date value
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Extract date-time value
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Borrow the object payload
    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Primitive category of the carried value, `None` for null
    pub fn category(&self) -> Option<PrimitiveCategory> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(PrimitiveCategory::Logical),
            Value::Int(_) | Value::UInt(_) | Value::Float(_) => Some(PrimitiveCategory::Numeric),
            Value::Char(_) | Value::Text(_) => Some(PrimitiveCategory::Text),
            Value::Date(_) | Value::DateTime(_) => Some(PrimitiveCategory::Temporal),
            Value::Object(_) => Some(PrimitiveCategory::Object),
        }
    }

    /// Get type name for debugging and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Object(o) => o.type_name(),
        }
    }

    /// Default ordering between two values.
    ///
    /// Null sorts before every other value. Signed and unsigned integers
    /// compare numerically. Returns `None` for NaN, objects, and values of
    /// different kinds.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Null, _) => Some(Ordering::Less),
            (_, Value::Null) => Some(Ordering::Greater),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::UInt(a), Value::UInt(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::UInt(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (Value::UInt(a), Value::Int(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($variant:ident: $($ty:ty => $conv:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant($conv(v))
                }
            }
        )*
    };
}

value_from!(Int: i8 => i64::from, i16 => i64::from, i32 => i64::from, i64 => i64::from);
value_from!(UInt: u8 => u64::from, u16 => u64::from, u32 => u64::from, u64 => u64::from);
value_from!(Float: f32 => f64::from, f64 => f64::from);
value_from!(Bool: bool => bool::from);
value_from!(Char: char => char::from);
value_from!(Text: String => String::from, &str => String::from);
value_from!(Date: NaiveDate => NaiveDate::from);
value_from!(DateTime: NaiveDateTime => NaiveDateTime::from);

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Value::from)
    }
}

// ============================================================================
// ObjectValue
// ============================================================================

type ErasedEq = fn(&(dyn Any + Send + Sync), &(dyn Any + Send + Sync)) -> bool;

/// Type-erased payload for object-shaped properties.
///
/// Cloning is a reference-count bump. Equality first checks identity, then
/// falls back to the payload type's `PartialEq`, so a cloned struct compares
/// equal to its source.
#[derive(Clone)]
pub struct ObjectValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    eq: ErasedEq,
}

fn erased_eq<T: Any + PartialEq>(a: &(dyn Any + Send + Sync), b: &(dyn Any + Send + Sync)) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

impl ObjectValue {
    /// Wrap a value
    pub fn new<T>(value: T) -> Self
    where
        T: Any + PartialEq + Send + Sync,
    {
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
            eq: erased_eq::<T>,
        }
    }

    /// Borrow the payload as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.inner).downcast_ref::<T>()
    }

    /// Rust type name of the payload
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check whether both handles share the same allocation
    pub fn ptr_eq(&self, other: &ObjectValue) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for ObjectValue {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.eq)(&*self.inner, &*other.inner)
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug)]
    struct Address {
        city: String,
    }

    #[test]
    fn test_null_is_default() {
        let v = Value::default();
        assert!(v.is_null());
        assert_eq!(v.category(), None);
        assert_eq!(v.type_name(), "null");
    }

    #[test]
    fn test_extractors() {
        assert_eq!(Value::from(42i32).as_i64(), Some(42));
        assert_eq!(Value::from(7u8).as_u64(), Some(7));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(Value::from(1.5f64).as_f64(), Some(1.5));
        assert_eq!(Value::from(1.5f64).as_i64(), None);
    }

    #[test]
    fn test_from_option() {
        assert!(Value::from(None::<i32>).is_null());
        assert_eq!(Value::from(Some(3i32)), Value::Int(3));
    }

    #[test]
    fn test_categories() {
        assert_eq!(Value::Int(1).category(), Some(PrimitiveCategory::Numeric));
        assert_eq!(Value::Char('x').category(), Some(PrimitiveCategory::Text));
        let date = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
        assert_eq!(Value::Date(date).category(), Some(PrimitiveCategory::Temporal));
        assert_eq!(
            Value::Object(ObjectValue::new(1u8)).category(),
            Some(PrimitiveCategory::Object)
        );
    }

    #[test]
    fn test_compare_null_first() {
        assert_eq!(Value::Null.compare(&Value::Int(0)), Some(Ordering::Less));
        assert_eq!(Value::Text("a".into()).compare(&Value::Null), Some(Ordering::Greater));
        assert_eq!(Value::Null.compare(&Value::Null), Some(Ordering::Equal));
    }

    #[test]
    fn test_compare_mixed_integers() {
        assert_eq!(Value::Int(-1).compare(&Value::UInt(1)), Some(Ordering::Less));
        assert_eq!(Value::UInt(5).compare(&Value::Int(5)), Some(Ordering::Equal));
    }

    #[test]
    fn test_compare_incomparable() {
        assert_eq!(Value::Int(1).compare(&Value::Text("1".into())), None);
        assert_eq!(Value::Float(f64::NAN).compare(&Value::Float(1.0)), None);
        let obj = Value::Object(ObjectValue::new(1u8));
        assert_eq!(obj.compare(&obj), None);
    }

    #[test]
    fn test_float_nan_equals_itself() {
        let nan = Value::Float(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_eq!(Value::Float(0.0), Value::Float(-0.0));
        assert_ne!(nan, Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::UInt(1));
        assert_eq!(nan.compare(&nan), None);
    }

    #[test]
    fn test_object_structural_equality() {
        let a = ObjectValue::new(Address { city: "Taipei".into() });
        let b = ObjectValue::new(Address { city: "Taipei".into() });
        let c = ObjectValue::new(Address { city: "Tainan".into() });

        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.downcast_ref::<Address>().map(|x| x.city.as_str()), Some("Taipei"));
        assert!(a.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_object_different_payload_types() {
        let a = ObjectValue::new(1u32);
        let b = ObjectValue::new(1u64);
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_format() {
        let s = format!("{:?}", Value::Int(42));
        assert!(s.contains("42"));
        let o = format!("{:?}", ObjectValue::new(Address { city: String::new() }));
        assert!(o.contains("Address"));
    }
}
