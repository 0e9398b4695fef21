//! Traits connecting a struct to the accessor machinery.
//!
//! `#[derive(Properties)]` implements both traits. A manual implementation
//! looks like this:
//!
//! ```ignore
//! use propmap::{Access, FromValue, PropertyDef, PropertyType, Properties, Reflect, ToValue, Value, ValueError};
//! use std::any::{Any, TypeId};
//!
//! #[derive(Default)]
//! struct Point { x: i32, y: i32 }
//!
//! impl Properties for Point {
//!     const TYPE_NAME: &'static str = "Point";
//!     const PROPERTIES: &'static [PropertyDef] = &[
//!         PropertyDef::new("X", Access::ReadWrite, <i32 as PropertyType>::DECLARED),
//!         PropertyDef::new("Y", Access::ReadWrite, <i32 as PropertyType>::DECLARED),
//!     ];
//! }
//!
//! impl Reflect for Point {
//!     fn type_name(&self) -> &'static str { Self::TYPE_NAME }
//!     fn reflect_type_id(&self) -> TypeId { TypeId::of::<Self>() }
//!     fn property_defs(&self) -> &'static [PropertyDef] { Self::PROPERTIES }
//!     fn get_property(&self, name: &str) -> Option<Value> {
//!         match name {
//!             "X" => Some(self.x.to_value()),
//!             "Y" => Some(self.y.to_value()),
//!             _ => None,
//!         }
//!     }
//!     fn set_property(&mut self, name: &str, value: Value) -> Result<bool, ValueError> {
//!         match name {
//!             "X" => { self.x = i32::from_value(value)?; Ok(true) }
//!             "Y" => { self.y = i32::from_value(value)?; Ok(true) }
//!             _ => Ok(false),
//!         }
//!     }
//!     fn as_any(&self) -> &dyn Any { self }
//! }
//! ```

use std::any::{Any, TypeId};

use crate::error::ValueError;
use crate::types::PropertyDef;
use crate::value::Value;

/// Object-safe, name-addressed access to a value's properties.
///
/// Property names passed to `get_property`/`set_property` are the exact
/// display names from `property_defs`; case folding happens in the registry.
pub trait Reflect: Any + Send + Sync {
    /// Name of the concrete type
    fn type_name(&self) -> &'static str;

    /// `TypeId` of the concrete type behind the trait object
    fn reflect_type_id(&self) -> TypeId;

    /// Property table of the concrete type
    fn property_defs(&self) -> &'static [PropertyDef];

    /// Read a readable property; `None` if this type has no such property
    fn get_property(&self, name: &str) -> Option<Value>;

    /// Write a writable property.
    ///
    /// Returns `Ok(false)` if this type has no such writable property and an
    /// error if `value` cannot be converted into the field's type.
    fn set_property(&mut self, name: &str, value: Value) -> Result<bool, ValueError>;

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;
}

/// Statically known property table, available without an instance.
pub trait Properties: Reflect + Sized {
    /// Name of the type
    const TYPE_NAME: &'static str;

    /// Properties in declaration order
    const PROPERTIES: &'static [PropertyDef];
}
