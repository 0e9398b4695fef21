// propmap-derive: property tables for propmap
//
// Provides the #[derive(Properties)] macro, which implements
// propmap::Reflect and propmap::Properties for a struct with named fields.
//
// Example:
// ```
// #[derive(Default, Properties)]
// struct Cust {
//     #[property(rename = "ID")]
//     pub id: String,
//     pub name: String,
//     #[property(readonly)]
//     pub created: Option<NaiveDate>,
// }
// ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod attrs;
mod properties;

/// Derives `propmap::Reflect` and `propmap::Properties`.
///
/// Every `pub` named field becomes a property, in declaration order. Field
/// types must implement `propmap::PropertyType` unless marked `object`.
///
/// Field attributes:
/// - `#[property(rename = "Name")]` - property name (default: field name)
/// - `#[property(readonly)]` / `#[property(writeonly)]` - restrict access
/// - `#[property(skip)]` - leave a `pub` field out
/// - `#[property(object)]` - carry any `Clone + PartialEq + Send + Sync`
///   type (or `Option` of one) as `Value::Object`
///
/// Two property names that differ only by case are rejected.
///
/// # Example
///
/// ```ignore
/// #[derive(Default, Properties)]
/// struct Order {
///     pub id: u64,
///     #[property(object)]
///     pub lines: Vec<Line>,
///     internal: u32, // not a property
/// }
/// ```
#[proc_macro_derive(Properties, attributes(property))]
pub fn derive_properties(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    properties::expand_properties(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
