//! Conversion between Rust field types and `Value`.
//!
//! `ToValue`/`FromValue` move a field across the type-erased boundary;
//! `PropertyType` adds the declared type the registry records. The derive
//! macro calls these for every field not marked `#[property(object)]`.
//!
//! Conversions into integers are range-checked. Floats also accept integer
//! values, so the numeric zero produced by `defaults::default_for` lands in
//! any numeric field.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ValueError;
use crate::types::{DeclaredType, PrimitiveCategory};
use crate::value::Value;

/// Convert a field into a `Value`.
pub trait ToValue {
    /// Produce an owned value from a borrowed field
    fn to_value(&self) -> Value;
}

/// Convert a `Value` back into a field.
pub trait FromValue: Sized {
    /// Convert, returning an error if the value doesn't fit
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

/// A field type usable as a property.
pub trait PropertyType: ToValue + FromValue {
    /// Declared type recorded in the registry
    const DECLARED: DeclaredType;
}

fn out_of_range(value: impl ToString, target: &str) -> ValueError {
    ValueError::OutOfRange {
        value: value.to_string(),
        target: target.to_string(),
    }
}

// ============================================================================
// Numeric Implementations
// ============================================================================

macro_rules! integer_property {
    ($variant:ident as $wide:ty: $($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::$variant(*self as $wide)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(i)
                            .map_err(|_| out_of_range(i, stringify!($ty))),
                        Value::UInt(u) => <$ty>::try_from(u)
                            .map_err(|_| out_of_range(u, stringify!($ty))),
                        other => Err(ValueError::mismatch(stringify!($ty), other.type_name())),
                    }
                }
            }

            impl PropertyType for $ty {
                const DECLARED: DeclaredType =
                    DeclaredType::new(stringify!($ty), PrimitiveCategory::Numeric);
            }
        )*
    };
}

integer_property!(Int as i64: i8, i16, i32, i64, isize);
integer_property!(UInt as u64: u8, u16, u32, u64, usize);

macro_rules! float_property {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Float(f64::from(*self))
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Float(f) => Ok(f as $ty),
                        Value::Int(i) => Ok(i as $ty),
                        Value::UInt(u) => Ok(u as $ty),
                        other => Err(ValueError::mismatch(stringify!($ty), other.type_name())),
                    }
                }
            }

            impl PropertyType for $ty {
                const DECLARED: DeclaredType =
                    DeclaredType::new(stringify!($ty), PrimitiveCategory::Numeric);
            }
        )*
    };
}

float_property!(f32, f64);

// ============================================================================
// Logical / Text / Temporal Implementations
// ============================================================================

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        value
            .as_bool()
            .ok_or_else(|| ValueError::mismatch("bool", value.type_name()))
    }
}

impl PropertyType for bool {
    const DECLARED: DeclaredType = DeclaredType::new("bool", PrimitiveCategory::Logical);
}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::Char(*self)
    }
}

impl FromValue for char {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Char(c) => Ok(c),
            Value::Text(ref s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(ValueError::mismatch("char", "text")),
                }
            }
            other => Err(ValueError::mismatch("char", other.type_name())),
        }
    }
}

impl PropertyType for char {
    const DECLARED: DeclaredType = DeclaredType::new("char", PrimitiveCategory::Text);
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Char(c) => Ok(c.to_string()),
            other => Err(ValueError::mismatch("String", other.type_name())),
        }
    }
}

impl PropertyType for String {
    const DECLARED: DeclaredType = DeclaredType::new("String", PrimitiveCategory::Text);
}

impl ToValue for NaiveDate {
    fn to_value(&self) -> Value {
        Value::Date(*self)
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        value
            .as_date()
            .ok_or_else(|| ValueError::mismatch("NaiveDate", value.type_name()))
    }
}

impl PropertyType for NaiveDate {
    const DECLARED: DeclaredType = DeclaredType::new("NaiveDate", PrimitiveCategory::Temporal);
}

impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        value
            .as_datetime()
            .ok_or_else(|| ValueError::mismatch("NaiveDateTime", value.type_name()))
    }
}

impl PropertyType for NaiveDateTime {
    const DECLARED: DeclaredType =
        DeclaredType::new("NaiveDateTime", PrimitiveCategory::Temporal);
}

// ============================================================================
// Optional Wrapper
// ============================================================================

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToValue::to_value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl<T: PropertyType> PropertyType for Option<T> {
    const DECLARED: DeclaredType = DeclaredType::nullable(T::DECLARED);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_conversions() {
        assert_eq!(i32::from_value(Value::Int(42)).unwrap(), 42);
        assert_eq!(u8::from_value(Value::Int(7)).unwrap(), 7);
        assert_eq!(i64::from_value(Value::UInt(9)).unwrap(), 9);
        assert_eq!(42i16.to_value(), Value::Int(42));
        assert_eq!(42usize.to_value(), Value::UInt(42));
    }

    #[test]
    fn test_integer_out_of_range() {
        let err = u8::from_value(Value::Int(300)).unwrap_err();
        assert!(matches!(err, ValueError::OutOfRange { .. }));
        assert!(u32::from_value(Value::Int(-1)).is_err());
    }

    #[test]
    fn test_integer_rejects_other_kinds() {
        let err = i32::from_value(Value::Text("1".into())).unwrap_err();
        assert_eq!(
            err,
            ValueError::TypeMismatch {
                expected: "i32".to_string(),
                got: "text".to_string(),
            }
        );
        assert!(i32::from_value(Value::Float(1.0)).is_err());
        assert!(i32::from_value(Value::Null).is_err());
    }

    #[test]
    fn test_float_accepts_integers() {
        assert_eq!(f64::from_value(Value::Int(0)).unwrap(), 0.0);
        assert!((f32::from_value(Value::Float(2.5)).unwrap() - 2.5).abs() < 1e-6);
        assert_eq!(1.5f32.to_value(), Value::Float(1.5));
    }

    #[test]
    fn test_text_conversions() {
        assert_eq!(String::from_value(Value::Char('x')).unwrap(), "x");
        assert_eq!(char::from_value(Value::Text("y".into())).unwrap(), 'y');
        assert!(char::from_value(Value::Text("yz".into())).is_err());
        assert_eq!("abc".to_string().to_value(), Value::Text("abc".into()));
    }

    #[test]
    fn test_option_conversions() {
        assert_eq!(Option::<i32>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::from_value(Value::Int(5)).unwrap(), Some(5));
        assert!(Option::<i32>::from_value(Value::Bool(true)).is_err());
        assert!(None::<String>.to_value().is_null());
    }

    #[test]
    fn test_declared_types() {
        assert_eq!(<i32 as PropertyType>::DECLARED.category, PrimitiveCategory::Numeric);
        assert_eq!(<String as PropertyType>::DECLARED.name, "String");

        let opt = <Option<NaiveDate> as PropertyType>::DECLARED;
        assert!(opt.nullable);
        assert_eq!(opt.category, PrimitiveCategory::Temporal);
        assert_eq!(opt.name, "NaiveDate");
    }
}
