//! Type registry: per-type property lookup tables
//!
//! A `TypeRegistry` is built once per concrete type from the type's static
//! `PropertyDef` table and is immutable afterwards. Lookup keys are the
//! lower-cased property names, so `"ID"`, `"Id"` and `"id"` resolve to the
//! same descriptor while the descriptor keeps the declared spelling.
//!
//! Registries are cached process-wide, keyed by `(TypeId, CollisionPolicy)`.
//! The cache is populated build-if-absent: concurrent first requests may
//! both build, but only one result is stored and every caller gets the
//! stored `Arc`.

use std::any::TypeId;
use std::borrow::Cow;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::config::CollisionPolicy;
use crate::error::{AccessorError, AccessorResult};
use crate::reflect::{Properties, Reflect};
use crate::types::{Access, DeclaredType, PropertyDef};

/// Normalize a property name into its lookup key
pub fn normalize_key(name: &str) -> Cow<'_, str> {
    if name.chars().all(|c| c.is_ascii() && !c.is_ascii_uppercase()) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(name.to_lowercase())
    }
}

/// Registered property: capability and declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    name: &'static str,
    key: String,
    access: Access,
    declared: DeclaredType,
}

impl PropertyDescriptor {
    fn from_def(def: &PropertyDef) -> Self {
        Self {
            name: def.name,
            key: normalize_key(def.name).into_owned(),
            access: def.access,
            declared: def.declared,
        }
    }

    /// Declared name, case preserved
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Normalized lookup key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read/write capability
    pub fn access(&self) -> Access {
        self.access
    }

    /// Whether the property can be read
    pub fn can_read(&self) -> bool {
        self.access.can_read()
    }

    /// Whether the property can be written
    pub fn can_write(&self) -> bool {
        self.access.can_write()
    }

    /// Declared type
    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared
    }
}

/// Immutable, case-insensitive property table for one concrete type.
#[derive(Debug)]
pub struct TypeRegistry {
    type_id: TypeId,
    type_name: &'static str,
    /// Descriptors in declaration order
    properties: Vec<PropertyDescriptor>,
    /// Normalized name to index into `properties`
    lookup: FxHashMap<String, usize>,
}

impl TypeRegistry {
    /// Build a registry from a property table.
    ///
    /// Properties keep declaration order. Names that collide after
    /// normalization are handled according to `policy`.
    pub fn build(
        type_id: TypeId,
        type_name: &'static str,
        defs: &[PropertyDef],
        policy: CollisionPolicy,
    ) -> AccessorResult<Self> {
        let mut properties: Vec<PropertyDescriptor> = Vec::with_capacity(defs.len());
        let mut lookup: FxHashMap<String, usize> = FxHashMap::default();

        for def in defs {
            let descriptor = PropertyDescriptor::from_def(def);
            if let Some(&index) = lookup.get(&descriptor.key) {
                let first = properties[index].name;
                match policy {
                    CollisionPolicy::Reject => {
                        return Err(AccessorError::DuplicateProperty {
                            type_name: type_name.to_string(),
                            first: first.to_string(),
                            second: def.name.to_string(),
                        });
                    }
                    CollisionPolicy::LastWins => {
                        warn!(type_name, dropped = first, kept = def.name, "property names collide");
                        properties[index] = descriptor;
                    }
                }
            } else {
                lookup.insert(descriptor.key.clone(), properties.len());
                properties.push(descriptor);
            }
        }

        debug!(type_name, properties = properties.len(), ?policy, "built type registry");

        Ok(Self {
            type_id,
            type_name,
            properties,
            lookup,
        })
    }

    /// Build an uncached registry for `T` with the default policy
    pub fn of<T: Properties>() -> AccessorResult<Self> {
        Self::build(
            TypeId::of::<T>(),
            T::TYPE_NAME,
            T::PROPERTIES,
            CollisionPolicy::default(),
        )
    }

    /// Look up a descriptor, case-insensitively
    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.lookup
            .get(normalize_key(name).as_ref())
            .map(|&index| &self.properties[index])
    }

    /// Check if a property exists, case-insensitively
    pub fn contains_key(&self, name: &str) -> bool {
        self.lookup.contains_key(normalize_key(name).as_ref())
    }

    /// Descriptors in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if the type has no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Identity of the registered type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the registered type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Names of readable properties, in declaration order
    pub fn readable_names(&self) -> Vec<&'static str> {
        self.names_where(|d| d.can_read())
    }

    /// Names of writable properties, in declaration order
    pub fn writable_names(&self) -> Vec<&'static str> {
        self.names_where(|d| d.can_write())
    }

    /// Names of properties both readable and writable, in declaration order
    pub fn read_write_names(&self) -> Vec<&'static str> {
        self.names_where(|d| d.can_read() && d.can_write())
    }

    fn names_where(&self, keep: impl Fn(&PropertyDescriptor) -> bool) -> Vec<&'static str> {
        self.properties
            .iter()
            .filter(|d| keep(d))
            .map(PropertyDescriptor::name)
            .collect()
    }
}

// ============================================================================
// Registry Cache
// ============================================================================

static REGISTRY_CACHE: Lazy<DashMap<(TypeId, CollisionPolicy), Arc<TypeRegistry>>> =
    Lazy::new(DashMap::new);

/// Cached registry for `T`
pub fn registry_for<T: Properties>(policy: CollisionPolicy) -> AccessorResult<Arc<TypeRegistry>> {
    cached(TypeId::of::<T>(), T::TYPE_NAME, T::PROPERTIES, policy)
}

/// Cached registry for the runtime type behind `source`
pub fn registry_for_dyn(
    source: &dyn Reflect,
    policy: CollisionPolicy,
) -> AccessorResult<Arc<TypeRegistry>> {
    cached(
        source.reflect_type_id(),
        source.type_name(),
        source.property_defs(),
        policy,
    )
}

/// Number of registries currently cached
pub fn cached_count() -> usize {
    REGISTRY_CACHE.len()
}

fn cached(
    type_id: TypeId,
    type_name: &'static str,
    defs: &'static [PropertyDef],
    policy: CollisionPolicy,
) -> AccessorResult<Arc<TypeRegistry>> {
    let key = (type_id, policy);
    if let Some(hit) = REGISTRY_CACHE.get(&key) {
        trace!(type_name, "type registry cache hit");
        return Ok(Arc::clone(hit.value()));
    }

    // Build outside the shard lock; failures are not cached.
    let built = Arc::new(TypeRegistry::build(type_id, type_name, defs, policy)?);
    let entry = REGISTRY_CACHE.entry(key).or_insert(built);
    Ok(Arc::clone(entry.value()))
}
