//! Conversion helpers for `#[property(object)]` fields.
//!
//! Object-shaped fields (nested structs, collections, anything without a
//! `PropertyType` impl) are carried as `Value::Object`. The derive macro
//! picks the `optional_*` pair when the field type is `Option<_>`.

use std::any::Any;

use crate::error::ValueError;
use crate::value::{ObjectValue, Value};

/// Wrap a clone of `field` as an object value
pub fn to_value<T>(field: &T) -> Value
where
    T: Any + Clone + PartialEq + Send + Sync,
{
    Value::Object(ObjectValue::new(field.clone()))
}

/// Unwrap an object value into `T`
pub fn from_value<T>(value: Value) -> Result<T, ValueError>
where
    T: Any + Clone + PartialEq + Send + Sync,
{
    match value {
        Value::Object(obj) => obj.downcast_ref::<T>().cloned().ok_or_else(|| {
            ValueError::mismatch(std::any::type_name::<T>(), obj.type_name())
        }),
        other => Err(ValueError::mismatch(
            std::any::type_name::<T>(),
            other.type_name(),
        )),
    }
}

/// Wrap an optional object field; `None` becomes `Null`
pub fn optional_to_value<T>(field: &Option<T>) -> Value
where
    T: Any + Clone + PartialEq + Send + Sync,
{
    field.as_ref().map_or(Value::Null, to_value)
}

/// Unwrap into an optional object field; `Null` becomes `None`
pub fn optional_from_value<T>(value: Value) -> Result<Option<T>, ValueError>
where
    T: Any + Clone + PartialEq + Send + Sync,
{
    if value.is_null() {
        Ok(None)
    } else {
        from_value(value).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag(String);

    #[test]
    fn test_object_roundtrip() {
        let tag = Tag("vip".into());
        let value = to_value(&tag);
        assert_eq!(from_value::<Tag>(value).unwrap(), tag);
    }

    #[test]
    fn test_object_wrong_payload() {
        let value = to_value(&5u32);
        assert!(from_value::<Tag>(value).is_err());
        assert!(from_value::<Tag>(Value::Int(5)).is_err());
    }

    #[test]
    fn test_optional_object() {
        assert!(optional_to_value::<Tag>(&None).is_null());
        assert_eq!(optional_from_value::<Tag>(Value::Null).unwrap(), None);

        let value = optional_to_value(&Some(Tag("a".into())));
        assert_eq!(
            optional_from_value::<Tag>(value).unwrap(),
            Some(Tag("a".into()))
        );
    }

    #[test]
    fn test_vec_as_object() {
        let list = vec![1, 2, 3];
        let value = to_value(&list);
        assert_eq!(value, to_value(&vec![1, 2, 3]));
        assert_eq!(from_value::<Vec<i32>>(value).unwrap(), list);
    }
}
