//! Mapper façade: cloning, mapping and equality over two accessors.
//!
//! Name-based operations copy the intersection
//! `writable(target) ∩ readable(source) \ ignore`, matched
//! case-insensitively and applied in the target's declaration order.
//! Properties present on only one side are left alone.
//!
//! The free functions use the default `AccessorConfig`; construct a
//! `Mapper` to use other policies.

use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::accessor::PropertyAccessor;
use crate::config::AccessorConfig;
use crate::error::{AccessorError, AccessorResult};
use crate::reflect::{Properties, Reflect};
use crate::registry::{normalize_key, registry_for, TypeRegistry};

// ============================================================================
// Copy Plan
// ============================================================================

/// Property pairs to copy from one type to another, resolved once.
#[derive(Debug)]
struct CopyPlan {
    source: Arc<TypeRegistry>,
    target: Arc<TypeRegistry>,
    /// (source name, target name) in target order
    pairs: Vec<(&'static str, &'static str)>,
    config: AccessorConfig,
}

impl CopyPlan {
    fn new(
        source: Arc<TypeRegistry>,
        target: Arc<TypeRegistry>,
        ignore: &[&str],
        config: AccessorConfig,
    ) -> Self {
        let ignored: FxHashSet<String> = ignore
            .iter()
            .map(|name| normalize_key(name).into_owned())
            .collect();

        let pairs: Vec<_> = target
            .iter()
            .filter(|d| d.can_write() && !ignored.contains(d.key()))
            .filter_map(|d| {
                source
                    .get(d.key())
                    .filter(|s| s.can_read())
                    .map(|s| (s.name(), d.name()))
            })
            .collect();

        debug!(
            source = source.type_name(),
            target = target.type_name(),
            properties = pairs.len(),
            ignored = ignored.len(),
            "resolved copy plan"
        );

        Self {
            source,
            target,
            pairs,
            config,
        }
    }

    fn apply(&self, reader: &PropertyAccessor<'_>, writer: &mut PropertyAccessor<'_>) {
        for &(from, to) in &self.pairs {
            writer.set(to, reader.get(from));
        }
    }

    fn produce<R: Default + Reflect>(&self, source: &dyn Reflect) -> R {
        let mut target = R::default();
        {
            let mut reader = PropertyAccessor::from_registry(Arc::clone(&self.source), self.config);
            reader.rebind(source);
            let mut writer = PropertyAccessor::from_registry(Arc::clone(&self.target), self.config);
            writer.rebind_mut(&mut target);
            self.apply(&reader, &mut writer);
        }
        target
    }
}

/// Lazy iterator of fresh `R` values filled from each source element.
///
/// Created by [`Mapper::auto_clone_many`] and [`Mapper::clone_many`]. The
/// registries and the property pairs are shared by every element; the
/// iterator is restartable by cloning when the source iterator is.
pub struct AutoCloneMany<I, R> {
    plan: Arc<CopyPlan>,
    sources: I,
    _target: PhantomData<fn() -> R>,
}

impl<'s, T, I, R> Iterator for AutoCloneMany<I, R>
where
    T: Properties + 's,
    I: Iterator<Item = &'s T>,
    R: Properties + Default,
{
    type Item = R;

    fn next(&mut self) -> Option<R> {
        let source = self.sources.next()?;
        Some(self.plan.produce(source))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.sources.size_hint()
    }
}

impl<'s, T, I, R> ExactSizeIterator for AutoCloneMany<I, R>
where
    T: Properties + 's,
    I: ExactSizeIterator<Item = &'s T>,
    R: Properties + Default,
{
}

impl<I: Clone, R> Clone for AutoCloneMany<I, R> {
    fn clone(&self) -> Self {
        Self {
            plan: Arc::clone(&self.plan),
            sources: self.sources.clone(),
            _target: PhantomData,
        }
    }
}

impl<I, R> std::fmt::Debug for AutoCloneMany<I, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoCloneMany")
            .field("source", &self.plan.source.type_name())
            .field("target", &self.plan.target.type_name())
            .field("properties", &self.plan.pairs.len())
            .finish()
    }
}

// ============================================================================
// Mapper
// ============================================================================

/// Stateless mapping operations with a fixed configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mapper {
    config: AccessorConfig,
}

impl Mapper {
    /// Create a mapper with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mapper with specific options
    pub fn with_config(config: AccessorConfig) -> Self {
        Self { config }
    }

    /// Options used for every accessor this mapper creates
    pub fn config(&self) -> AccessorConfig {
        self.config
    }

    /// Copy `source` into a fresh `T::default()`.
    ///
    /// Every readable property is copied into the matching writable one.
    /// Read-only properties of the result keep their default values.
    pub fn clone_value<T: Properties + Default>(&self, source: &T) -> AccessorResult<T> {
        let mut target = T::default();
        self.clone_into(source, &mut target)?;
        Ok(target)
    }

    /// Copy every readable property of `source` into `target`
    pub fn clone_into<T: Properties>(&self, source: &T, target: &mut T) -> AccessorResult<()> {
        self.auto_map(source, target, &[])
    }

    /// Lazily clone each element of `sources`, in order
    pub fn clone_many<'s, T, I>(&self, sources: I) -> AccessorResult<AutoCloneMany<I::IntoIter, T>>
    where
        T: Properties + Default + 's,
        I: IntoIterator<Item = &'s T>,
    {
        self.auto_clone_many::<T, T, I>(sources, &[])
    }

    /// Copy the shared properties of `source` into `target`.
    ///
    /// Names in `ignore` are matched case-insensitively and skipped.
    pub fn auto_map(
        &self,
        source: &dyn Reflect,
        target: &mut dyn Reflect,
        ignore: &[&str],
    ) -> AccessorResult<()> {
        let reader = PropertyAccessor::with_config(source, self.config)?;
        let mut writer = PropertyAccessor::new_mut_with_config(target, self.config)?;
        let plan = CopyPlan::new(
            Arc::clone(reader.registry()),
            Arc::clone(writer.registry()),
            ignore,
            self.config,
        );
        plan.apply(&reader, &mut writer);
        Ok(())
    }

    /// Lazily build an `R` from each element of `sources` by `auto_map` rules.
    ///
    /// Both registries and the property pairs are resolved here, before the
    /// first element is produced.
    pub fn auto_clone_many<'s, T, R, I>(
        &self,
        sources: I,
        ignore: &[&str],
    ) -> AccessorResult<AutoCloneMany<I::IntoIter, R>>
    where
        T: Properties + 's,
        R: Properties + Default,
        I: IntoIterator<Item = &'s T>,
    {
        let source = registry_for::<T>(self.config.collision)?;
        let target = registry_for::<R>(self.config.collision)?;
        let plan = CopyPlan::new(source, target, ignore, self.config);

        Ok(AutoCloneMany {
            plan: Arc::new(plan),
            sources: sources.into_iter(),
            _target: PhantomData,
        })
    }

    /// Copy `source_names[i]` of `source` into `target_names[i]` of `target`.
    ///
    /// No name matching is done between the two lists. Unknown target names
    /// follow the configured `MissingPropertyPolicy`.
    pub fn map_to<S1, S2>(
        &self,
        source: &dyn Reflect,
        source_names: &[S1],
        target: &mut dyn Reflect,
        target_names: &[S2],
    ) -> AccessorResult<()>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        if source_names.len() != target_names.len() {
            return Err(AccessorError::LengthMismatch {
                operation: "map_to",
                expected: source_names.len(),
                got: target_names.len(),
            });
        }

        let reader = PropertyAccessor::with_config(source, self.config)?;
        let values = reader.values_of(source_names);
        let mut writer = PropertyAccessor::new_mut_with_config(target, self.config)?;
        writer.set_positional(target_names, values)
    }

    /// Check if two values have the same runtime type and equal readable
    /// properties
    pub fn is_value_equal(&self, a: &dyn Reflect, b: &dyn Reflect) -> bool {
        if a.reflect_type_id() != b.reflect_type_id() {
            return false;
        }

        let mut accessor = match PropertyAccessor::with_config(a, self.config) {
            Ok(accessor) => accessor,
            Err(err) => {
                debug!(type_name = a.type_name(), error = %err, "equality check without registry");
                return false;
            }
        };
        let left = accessor.values();
        accessor.rebind(b);
        left == accessor.values()
    }

    /// Check if two slices are pairwise value-equal.
    ///
    /// Slices of different length are unequal without inspecting elements.
    ///
    /// # Note
    ///
    /// Only slices are accepted: their lengths are known up front, so the
    /// length check never consumes or re-reads elements. Lazy or single-pass
    /// sequences (such as an [`AutoCloneMany`]) should be collected into a
    /// `Vec` first.
    pub fn is_many_value_equal<A: Reflect, B: Reflect>(&self, a: &[A], b: &[B]) -> bool {
        a.len() == b.len()
            && a
                .iter()
                .zip(b)
                .all(|(left, right)| self.is_value_equal(left, right))
    }
}

// ============================================================================
// Free functions
// ============================================================================

/// Copy `source` into a fresh `T::default()`
pub fn clone<T: Properties + Default>(source: &T) -> AccessorResult<T> {
    Mapper::new().clone_value(source)
}

/// Copy every readable property of `source` into `target`
pub fn clone_into<T: Properties>(source: &T, target: &mut T) -> AccessorResult<()> {
    Mapper::new().clone_into(source, target)
}

/// Lazily clone each element of `sources`
pub fn clone_many<'s, T, I>(sources: I) -> AccessorResult<AutoCloneMany<I::IntoIter, T>>
where
    T: Properties + Default + 's,
    I: IntoIterator<Item = &'s T>,
{
    Mapper::new().clone_many(sources)
}

/// Copy the shared properties of `source` into `target`, skipping `ignore`
pub fn auto_map(source: &dyn Reflect, target: &mut dyn Reflect, ignore: &[&str]) -> AccessorResult<()> {
    Mapper::new().auto_map(source, target, ignore)
}

/// Lazily build an `R` from each element of `sources`
pub fn auto_clone_many<'s, T, R, I>(
    sources: I,
    ignore: &[&str],
) -> AccessorResult<AutoCloneMany<I::IntoIter, R>>
where
    T: Properties + 's,
    R: Properties + Default,
    I: IntoIterator<Item = &'s T>,
{
    Mapper::new().auto_clone_many(sources, ignore)
}

/// Positional copy between two name lists
pub fn map_to<S1, S2>(
    source: &dyn Reflect,
    source_names: &[S1],
    target: &mut dyn Reflect,
    target_names: &[S2],
) -> AccessorResult<()>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    Mapper::new().map_to(source, source_names, target, target_names)
}

/// Check if two values have the same runtime type and equal properties
pub fn is_value_equal(a: &dyn Reflect, b: &dyn Reflect) -> bool {
    Mapper::new().is_value_equal(a, b)
}

/// Check if two slices are pairwise value-equal.
///
/// # Note
///
/// See [`Mapper::is_many_value_equal`]; collect other sequences first.
pub fn is_many_value_equal<A: Reflect, B: Reflect>(a: &[A], b: &[B]) -> bool {
    Mapper::new().is_many_value_equal(a, b)
}
