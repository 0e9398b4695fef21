//! propmap - Name-indexed property access for Rust structs
//!
//! `#[derive(Properties)]` records a struct's public fields as named
//! properties. At runtime a cached, case-insensitive `TypeRegistry` maps each
//! name to its capability and declared type, and a `PropertyAccessor` reads
//! and writes the fields of a bound instance through that registry. The
//! `mapper` functions compose two accessors into cloning, intersection
//! mapping and value equality.
//!
//! # Example
//!
//! ```ignore
//! use propmap::{Properties, PropertyAccessor, Value};
//!
//! #[derive(Debug, Default, Properties)]
//! struct Cust {
//!     #[property(rename = "ID")]
//!     pub id: String,
//!     #[property(rename = "Name")]
//!     pub name: String,
//! }
//!
//! #[derive(Debug, Default, Properties)]
//! struct Emp {
//!     #[property(rename = "EmployeeID")]
//!     pub employee_id: String,
//!     #[property(rename = "EmployeeName")]
//!     pub employee_name: String,
//! }
//!
//! let cust = Cust { id: "C001".into(), name: "A".into() };
//! let accessor = PropertyAccessor::new(&cust)?;
//! assert_eq!(accessor.get("id"), Value::from("C001"));
//!
//! let mut emp = Emp::default();
//! propmap::map_to(&cust, &["ID", "Name"], &mut emp, &["EmployeeID", "EmployeeName"])?;
//! assert_eq!(emp.employee_id, "C001");
//! ```

#![warn(missing_docs)]

// Lets the derive's `::propmap::` paths resolve inside this crate's tests
extern crate self as propmap;

pub mod accessor;
pub mod config;
pub mod convert;
pub mod defaults;
pub mod error;
pub mod mapper;
pub mod object;
pub mod reflect;
pub mod registry;
pub mod types;
pub mod value;

pub use accessor::PropertyAccessor;
pub use config::{AccessorConfig, CollisionPolicy, MissingPropertyPolicy};
pub use convert::{FromValue, PropertyType, ToValue};
pub use error::{AccessorError, AccessorResult, ValueError};
pub use mapper::{
    auto_clone_many, auto_map, clone, clone_into, clone_many, is_many_value_equal,
    is_value_equal, map_to, AutoCloneMany, Mapper,
};
pub use reflect::{Properties, Reflect};
pub use registry::{PropertyDescriptor, TypeRegistry};
pub use types::{Access, DeclaredType, PrimitiveCategory, PropertyDef};
pub use value::{ObjectValue, Value};

pub use propmap_derive::Properties;
