//! Property accessor: a type registry bound to a live instance.
//!
//! The registry is shared and immutable; the bound source is a swappable
//! slot. Rebinding never rebuilds the registry, which lets one accessor
//! walk many instances of the same type:
//!
//! ```ignore
//! let mut reader = PropertyAccessor::for_type::<Cust>()?;
//! for cust in &customers {
//!     reader.rebind(cust);
//!     println!("{:?}", reader.get("name"));
//! }
//! ```
//!
//! Reads and single writes are fail-soft: an unknown name, a read-only
//! target, an unbound accessor or an unconvertible value never raise.
//! Positional bulk writes check their length contract and return errors.

use std::cmp::Ordering;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::config::{AccessorConfig, MissingPropertyPolicy};
use crate::convert::FromValue;
use crate::defaults::{default_for, underlying_type};
use crate::error::{AccessorError, AccessorResult};
use crate::reflect::{Properties, Reflect};
use crate::registry::{registry_for, registry_for_dyn, PropertyDescriptor, TypeRegistry};
use crate::value::Value;

/// Current source of an accessor
enum Binding<'a> {
    Unbound,
    /// Read-only binding; writes are skipped
    Shared(&'a dyn Reflect),
    Exclusive(&'a mut dyn Reflect),
}

impl Binding<'_> {
    fn reader(&self) -> Option<&dyn Reflect> {
        match self {
            Binding::Unbound => None,
            Binding::Shared(source) => Some(*source),
            Binding::Exclusive(source) => Some(&**source),
        }
    }

    fn writer(&mut self) -> Option<&mut dyn Reflect> {
        match self {
            Binding::Exclusive(source) => Some(&mut **source),
            _ => None,
        }
    }
}

/// Name-indexed access to the properties of a bound instance.
pub struct PropertyAccessor<'a> {
    registry: Arc<TypeRegistry>,
    source: Binding<'a>,
    config: AccessorConfig,
}

impl<'a> PropertyAccessor<'a> {
    // ========================================================================
    // Construction and binding
    // ========================================================================

    /// Create an unbound accessor for `T`
    pub fn for_type<T: Properties>() -> AccessorResult<Self> {
        Self::for_type_with_config::<T>(AccessorConfig::default())
    }

    /// Create an unbound accessor for `T` with specific options
    pub fn for_type_with_config<T: Properties>(config: AccessorConfig) -> AccessorResult<Self> {
        let registry = registry_for::<T>(config.collision)?;
        Ok(Self::from_registry(registry, config))
    }

    /// Create an unbound accessor over an existing registry
    pub fn from_registry(registry: Arc<TypeRegistry>, config: AccessorConfig) -> Self {
        Self {
            registry,
            source: Binding::Unbound,
            config,
        }
    }

    /// Create a read-only accessor bound to `source`.
    ///
    /// The registry is derived from the runtime type behind `source`.
    pub fn new(source: &'a dyn Reflect) -> AccessorResult<Self> {
        Self::with_config(source, AccessorConfig::default())
    }

    /// Create a read-only accessor with specific options
    pub fn with_config(source: &'a dyn Reflect, config: AccessorConfig) -> AccessorResult<Self> {
        let registry = registry_for_dyn(source, config.collision)?;
        Ok(Self {
            registry,
            source: Binding::Shared(source),
            config,
        })
    }

    /// Create a read-write accessor bound to `source`
    pub fn new_mut(source: &'a mut dyn Reflect) -> AccessorResult<Self> {
        Self::new_mut_with_config(source, AccessorConfig::default())
    }

    /// Create a read-write accessor with specific options
    pub fn new_mut_with_config(
        source: &'a mut dyn Reflect,
        config: AccessorConfig,
    ) -> AccessorResult<Self> {
        let registry = registry_for_dyn(&*source, config.collision)?;
        Ok(Self {
            registry,
            source: Binding::Exclusive(source),
            config,
        })
    }

    /// Bind to another instance for reading.
    ///
    /// The registry is kept as is; no shape check is made. Properties the
    /// new source lacks read as `Null`.
    pub fn rebind(&mut self, source: &'a dyn Reflect) -> &mut Self {
        self.source = Binding::Shared(source);
        self
    }

    /// Bind to another instance for reading and writing
    pub fn rebind_mut(&mut self, source: &'a mut dyn Reflect) -> &mut Self {
        self.source = Binding::Exclusive(source);
        self
    }

    /// Release the bound instance
    pub fn unbind(&mut self) -> &mut Self {
        self.source = Binding::Unbound;
        self
    }

    /// Check if an instance is bound
    pub fn is_bound(&self) -> bool {
        !matches!(self.source, Binding::Unbound)
    }

    /// The shared registry
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Options this accessor was created with
    pub fn config(&self) -> AccessorConfig {
        self.config
    }

    // ========================================================================
    // Single property access
    // ========================================================================

    /// Read a property, case-insensitively.
    ///
    /// Returns `Value::Null` for unknown or write-only properties and when
    /// nothing is bound.
    pub fn get(&self, name: &str) -> Value {
        self.read_from(self.source.reader(), name)
    }

    /// Read a property and narrow it to `T`, falling back to `T::default()`
    pub fn get_as<T: FromValue + Default>(&self, name: &str) -> T {
        T::from_value(self.get(name)).unwrap_or_default()
    }

    /// Write a property, skipping silently when it cannot be written
    pub fn set(&mut self, name: &str, value: Value) {
        match self.try_set(name, value) {
            Ok(true) => {}
            Ok(false) => debug!(
                type_name = self.registry.type_name(),
                property = name,
                "write skipped"
            ),
            Err(err) => debug!(
                type_name = self.registry.type_name(),
                property = name,
                error = %err,
                "write skipped"
            ),
        }
    }

    /// Write a property, reporting conversion failures.
    ///
    /// Returns `Ok(false)` when the name is unknown, the property is not
    /// writable, or the accessor has no writable binding.
    pub fn try_set(&mut self, name: &str, value: Value) -> AccessorResult<bool> {
        let Some(descriptor) = self.registry.get(name) else {
            return Ok(false);
        };
        if !descriptor.can_write() {
            return Ok(false);
        }
        let property = descriptor.name();

        let Some(target) = self.source.writer() else {
            return Ok(false);
        };
        target
            .set_property(property, value)
            .map_err(|source| AccessorError::Conversion {
                property: property.to_string(),
                source,
            })
    }

    /// Check if the registry has a property, case-insensitively
    pub fn contains_key(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// Compare property `name` of `a` and `b` with the default value ordering.
    ///
    /// Both values are read through this accessor's registry; the current
    /// binding is left untouched. Values without an ordering produce
    /// `AccessorError::Incomparable`.
    pub fn compare(&self, a: &dyn Reflect, b: &dyn Reflect, name: &str) -> AccessorResult<Ordering> {
        let left = self.read_from(Some(a), name);
        let right = self.read_from(Some(b), name);
        left.compare(&right)
            .ok_or_else(|| AccessorError::Incomparable {
                left: left.type_name().to_string(),
                right: right.type_name().to_string(),
            })
    }

    /// Replace null values with their type's canonical zero.
    ///
    /// Only readable, writable properties currently reading `Null` are
    /// touched, and only when their underlying type has a concrete default
    /// (text, numeric, logical). Temporal and object properties stay null.
    pub fn normalize_nulls_to_default(&mut self) {
        let pending: Vec<(&'static str, Value)> = self
            .registry
            .iter()
            .filter(|d| d.can_read() && d.can_write())
            .filter(|d| self.get(d.name()).is_null())
            .filter_map(|d| {
                default_for(&underlying_type(d.declared_type())).map(|value| (d.name(), value))
            })
            .collect();

        for (name, value) in pending {
            self.set(name, value);
        }
    }

    // ========================================================================
    // Projections
    // ========================================================================

    /// Read the named properties in the given order; unknown names read `Null`
    pub fn values_of<S: AsRef<str>>(&self, names: &[S]) -> Vec<Value> {
        names.iter().map(|name| self.get(name.as_ref())).collect()
    }

    /// Read every readable property in registry order
    pub fn values(&self) -> Vec<Value> {
        self.registry
            .iter()
            .filter(|d| d.can_read())
            .map(|d| self.get(d.name()))
            .collect()
    }

    /// Read the named properties, keyed by the names as given
    pub fn keyed_values_of<S: AsRef<str>>(&self, names: &[S]) -> IndexMap<String, Value> {
        names
            .iter()
            .map(|name| (name.as_ref().to_string(), self.get(name.as_ref())))
            .collect()
    }

    /// Read every readable property, keyed by declared name, in registry order
    pub fn keyed_values(&self) -> IndexMap<String, Value> {
        self.registry
            .iter()
            .filter(|d| d.can_read())
            .map(|d| (d.name().to_string(), self.get(d.name())))
            .collect()
    }

    // ========================================================================
    // Bulk writes
    // ========================================================================

    /// Apply each entry whose key names a writable property; skip the rest
    pub fn set_many<K, I>(&mut self, entries: I)
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        for (name, value) in entries {
            let name = name.as_ref();
            if self
                .registry
                .get(name)
                .is_some_and(PropertyDescriptor::can_write)
            {
                self.set(name, value);
            }
        }
    }

    /// Write `values[i]` into property `names[i]`.
    ///
    /// Lengths must match. Read-only names are skipped; unknown names follow
    /// the configured `MissingPropertyPolicy`. Under `Fail`, nothing is
    /// written when any name is unknown.
    pub fn set_positional<S: AsRef<str>>(&mut self, names: &[S], values: Vec<Value>) -> AccessorResult<()> {
        if names.len() != values.len() {
            return Err(AccessorError::LengthMismatch {
                operation: "set_positional",
                expected: names.len(),
                got: values.len(),
            });
        }

        if self.config.missing_positional == MissingPropertyPolicy::Fail {
            if let Some(missing) = names
                .iter()
                .map(|name| name.as_ref())
                .find(|name| !self.registry.contains_key(name))
            {
                return Err(AccessorError::UnknownProperty {
                    type_name: self.registry.type_name().to_string(),
                    name: missing.to_string(),
                });
            }
        }

        for (name, value) in names.iter().zip(values) {
            let name = name.as_ref();
            match self.registry.get(name).map(PropertyDescriptor::can_write) {
                Some(true) => self.set(name, value),
                Some(false) => {}
                None => debug!(
                    type_name = self.registry.type_name(),
                    property = name,
                    "positional write skipped: unknown property"
                ),
            }
        }
        Ok(())
    }

    /// Write `values` into the read-write properties, in registry order
    pub fn set_all(&mut self, values: Vec<Value>) -> AccessorResult<()> {
        let names = self.registry.read_write_names();
        if names.len() != values.len() {
            return Err(AccessorError::LengthMismatch {
                operation: "set_all",
                expected: names.len(),
                got: values.len(),
            });
        }
        self.set_positional(&names, values)
    }

    // ========================================================================
    // Name sets
    // ========================================================================

    /// Readable property names in registry order
    pub fn readable_names(&self) -> Vec<&'static str> {
        self.registry.readable_names()
    }

    /// Writable property names in registry order
    pub fn writable_names(&self) -> Vec<&'static str> {
        self.registry.writable_names()
    }

    /// Read-write property names in registry order
    pub fn read_write_names(&self) -> Vec<&'static str> {
        self.registry.read_write_names()
    }

    fn read_from(&self, source: Option<&dyn Reflect>, name: &str) -> Value {
        let Some(descriptor) = self.registry.get(name).filter(|d| d.can_read()) else {
            return Value::Null;
        };
        source
            .and_then(|s| s.get_property(descriptor.name()))
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for PropertyAccessor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyAccessor")
            .field("type_name", &self.registry.type_name())
            .field("properties", &self.registry.len())
            .field("bound", &self.is_bound())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollisionPolicy;
    use crate::Properties;
    use chrono::NaiveDate;

    #[derive(Debug, Clone, Default, PartialEq, Properties)]
    struct Cust {
        #[property(rename = "ID")]
        pub id: String,
        #[property(rename = "Name")]
        pub name: String,
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Owner {
        name: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Properties)]
    struct Account {
        pub code: String,
        pub balance: Option<i64>,
        pub rate: Option<f64>,
        pub active: Option<bool>,
        pub memo: Option<String>,
        pub opened: Option<NaiveDate>,
        #[property(object)]
        pub owner: Option<Owner>,
        #[property(readonly)]
        pub version: u32,
        #[property(writeonly)]
        pub password: String,
        internal: u8,
    }

    fn cust(id: &str, name: &str) -> Cust {
        Cust {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_get_case_insensitive() {
        let c = cust("C001", "A");
        let accessor = PropertyAccessor::new(&c).unwrap();

        assert_eq!(accessor.get("ID"), Value::Text("C001".into()));
        assert_eq!(accessor.get("id"), Value::Text("C001".into()));
        assert_eq!(accessor.get("nAmE"), Value::Text("A".into()));
    }

    #[test]
    fn test_get_unknown_is_null() {
        let c = cust("C001", "A");
        let accessor = PropertyAccessor::new(&c).unwrap();
        assert!(accessor.get("NoSuchField").is_null());
    }

    #[test]
    fn test_unbound_reads_null() {
        let accessor = PropertyAccessor::for_type::<Cust>().unwrap();
        assert!(!accessor.is_bound());
        assert!(accessor.get("ID").is_null());
        assert!(accessor.contains_key("id"));
    }

    #[test]
    fn test_set_through_exclusive_binding() {
        let mut c = Cust::default();
        let mut accessor = PropertyAccessor::new_mut(&mut c).unwrap();
        accessor.set("ID", Value::from("C001"));
        accessor.set("name", Value::from("A"));
        drop(accessor);

        assert_eq!(c, cust("C001", "A"));
    }

    #[test]
    fn test_set_unknown_is_noop() {
        let mut c = cust("C001", "A");
        let before = c.clone();
        let mut accessor = PropertyAccessor::new_mut(&mut c).unwrap();
        accessor.set("NoSuchField", Value::Int(5));
        assert_eq!(accessor.try_set("NoSuchField", Value::Int(5)), Ok(false));
        drop(accessor);

        assert_eq!(c, before);
    }

    #[test]
    fn test_set_through_shared_binding_is_skipped() {
        let c = cust("C001", "A");
        let mut accessor = PropertyAccessor::new(&c).unwrap();
        accessor.set("ID", Value::from("X"));
        assert_eq!(accessor.try_set("ID", Value::from("X")), Ok(false));
        assert_eq!(accessor.get("ID"), Value::from("C001"));
    }

    #[test]
    fn test_set_mismatched_value() {
        let mut account = Account::default();
        let mut accessor = PropertyAccessor::new_mut(&mut account).unwrap();

        accessor.set("balance", Value::from("lots"));
        assert!(accessor.get("balance").is_null());

        let err = accessor.try_set("balance", Value::from("lots")).unwrap_err();
        assert!(matches!(err, AccessorError::Conversion { ref property, .. } if property == "balance"));
    }

    #[test]
    fn test_readonly_and_writeonly() {
        let mut account = Account {
            version: 3,
            password: "secret".into(),
            ..Default::default()
        };
        let mut accessor = PropertyAccessor::new_mut(&mut account).unwrap();

        accessor.set("version", Value::UInt(9));
        assert_eq!(accessor.get("version"), Value::UInt(3));

        assert!(accessor.get("password").is_null());
        accessor.set("password", Value::from("changed"));
        drop(accessor);

        assert_eq!(account.version, 3);
        assert_eq!(account.password, "changed");
    }

    #[test]
    fn test_private_fields_are_not_properties() {
        let accessor = PropertyAccessor::for_type::<Account>().unwrap();
        assert!(!accessor.contains_key("internal"));
    }

    #[test]
    fn test_get_as() {
        let c = cust("C001", "A");
        let accessor = PropertyAccessor::new(&c).unwrap();

        assert_eq!(accessor.get_as::<String>("Id"), "C001");
        assert_eq!(accessor.get_as::<i32>("Id"), 0);
        assert_eq!(accessor.get_as::<String>("missing"), "");
        assert_eq!(accessor.get_as::<Option<String>>("name"), Some("A".to_string()));
    }

    #[test]
    fn test_normalize_nulls_selectively() {
        let mut account = Account::default();
        let mut accessor = PropertyAccessor::new_mut(&mut account).unwrap();
        accessor.normalize_nulls_to_default();
        drop(accessor);

        assert_eq!(account.balance, Some(0));
        assert_eq!(account.rate, Some(0.0));
        assert_eq!(account.active, Some(false));
        assert_eq!(account.memo, Some(String::new()));
        assert_eq!(account.opened, None);
        assert_eq!(account.owner, None);
    }

    #[test]
    fn test_normalize_keeps_existing_values() {
        let mut account = Account {
            balance: Some(12),
            memo: Some("keep".into()),
            ..Default::default()
        };
        let mut accessor = PropertyAccessor::new_mut(&mut account).unwrap();
        accessor.normalize_nulls_to_default();
        drop(accessor);

        assert_eq!(account.balance, Some(12));
        assert_eq!(account.memo.as_deref(), Some("keep"));
    }

    #[test]
    fn test_values_projection() {
        let c = cust("C001", "A");
        let accessor = PropertyAccessor::new(&c).unwrap();

        assert_eq!(
            accessor.values_of(&["Name", "Missing", "ID"]),
            vec![Value::from("A"), Value::Null, Value::from("C001")]
        );
        assert_eq!(accessor.values(), vec![Value::from("C001"), Value::from("A")]);
    }

    #[test]
    fn test_values_skip_writeonly() {
        let account = Account::default();
        let accessor = PropertyAccessor::new(&account).unwrap();

        assert_eq!(accessor.values().len(), accessor.readable_names().len());
        assert!(!accessor.readable_names().contains(&"password"));
        assert!(accessor.writable_names().contains(&"password"));
        assert!(!accessor.read_write_names().contains(&"version"));
    }

    #[test]
    fn test_keyed_values() {
        let c = cust("C001", "A");
        let accessor = PropertyAccessor::new(&c).unwrap();

        let all = accessor.keyed_values();
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["ID", "Name"]);
        assert_eq!(all["ID"], Value::from("C001"));

        let some = accessor.keyed_values_of(&["name"]);
        assert_eq!(some.get("name"), Some(&Value::from("A")));
    }

    #[test]
    fn test_set_many_skips_extra_keys() {
        let mut account = Account::default();
        let mut entries = IndexMap::new();
        entries.insert("CODE", Value::from("A-1"));
        entries.insert("version", Value::UInt(7));
        entries.insert("unknown", Value::Int(1));

        let mut accessor = PropertyAccessor::new_mut(&mut account).unwrap();
        accessor.set_many(entries);
        drop(accessor);

        assert_eq!(account.code, "A-1");
        assert_eq!(account.version, 0);
    }

    #[test]
    fn test_set_positional_skip_policy() {
        let mut c = Cust::default();
        let mut accessor = PropertyAccessor::new_mut(&mut c).unwrap();
        accessor
            .set_positional(&["Name", "Nope"], vec![Value::from("A"), Value::from("x")])
            .unwrap();
        drop(accessor);

        assert_eq!(c.name, "A");
    }

    #[test]
    fn test_set_positional_fail_policy() {
        let mut c = Cust::default();
        let config = AccessorConfig::new().with_missing_positional(MissingPropertyPolicy::Fail);
        let mut accessor = PropertyAccessor::new_mut_with_config(&mut c, config).unwrap();

        let err = accessor
            .set_positional(&["Name", "Nope"], vec![Value::from("A"), Value::from("x")])
            .unwrap_err();
        drop(accessor);

        assert_eq!(
            err,
            AccessorError::UnknownProperty {
                type_name: "Cust".to_string(),
                name: "Nope".to_string(),
            }
        );
        assert_eq!(c.name, "");
    }

    #[test]
    fn test_set_positional_length_mismatch() {
        let mut c = Cust::default();
        let mut accessor = PropertyAccessor::new_mut(&mut c).unwrap();
        let err = accessor.set_positional(&["ID"], vec![]).unwrap_err();

        assert!(matches!(
            err,
            AccessorError::LengthMismatch { operation: "set_positional", expected: 1, got: 0 }
        ));
    }

    #[test]
    fn test_set_all() {
        let mut c = Cust::default();
        let mut accessor = PropertyAccessor::new_mut(&mut c).unwrap();
        accessor.set_all(vec![Value::from("C009"), Value::from("Z")]).unwrap();

        let err = accessor.set_all(vec![Value::from("only one")]).unwrap_err();
        assert!(matches!(err, AccessorError::LengthMismatch { operation: "set_all", .. }));
        drop(accessor);

        assert_eq!(c, cust("C009", "Z"));
    }

    #[test]
    fn test_rebind_reuses_registry() {
        let customers = vec![cust("C001", "A"), cust("C002", "B"), cust("C003", "C")];
        let mut accessor = PropertyAccessor::for_type::<Cust>().unwrap();
        let registry = Arc::clone(accessor.registry());

        let mut ids = Vec::new();
        for c in &customers {
            accessor.rebind(c);
            ids.push(accessor.get_as::<String>("id"));
            assert!(Arc::ptr_eq(&registry, accessor.registry()));
        }
        assert_eq!(ids, vec!["C001", "C002", "C003"]);

        accessor.unbind();
        assert!(!accessor.is_bound());
    }

    #[test]
    fn test_rebind_to_other_shape_reads_null() {
        let account = Account::default();
        let mut accessor = PropertyAccessor::for_type::<Cust>().unwrap();
        accessor.rebind(&account);
        assert!(accessor.get("ID").is_null());
    }

    #[test]
    fn test_compare() {
        let a = cust("C001", "B");
        let b = cust("C002", "A");
        let accessor = PropertyAccessor::for_type::<Cust>().unwrap();

        assert_eq!(accessor.compare(&a, &b, "ID"), Ok(Ordering::Less));
        assert_eq!(accessor.compare(&a, &b, "Name"), Ok(Ordering::Greater));
        assert_eq!(accessor.compare(&a, &a, "name"), Ok(Ordering::Equal));
    }

    #[test]
    fn test_compare_sorts_collection() {
        let mut customers = vec![cust("C003", "C"), cust("C001", "A"), cust("C002", "B")];
        let accessor = PropertyAccessor::for_type::<Cust>().unwrap();

        customers.sort_by(|x, y| accessor.compare(x, y, "id").unwrap_or(Ordering::Equal));

        let ids: Vec<_> = customers.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["C001", "C002", "C003"]);
    }

    #[test]
    fn test_compare_incomparable_propagates() {
        let a = Account {
            owner: Some(Owner { name: "x".into() }),
            ..Default::default()
        };
        let accessor = PropertyAccessor::for_type::<Account>().unwrap();

        let err = accessor.compare(&a, &a, "owner").unwrap_err();
        assert!(matches!(err, AccessorError::Incomparable { .. }));
    }

    #[test]
    fn test_config_is_kept() {
        let config = AccessorConfig::new().with_collision(CollisionPolicy::LastWins);
        let accessor = PropertyAccessor::for_type_with_config::<Cust>(config).unwrap();
        assert_eq!(accessor.config(), config);
    }
}
