//! Traits: immutable, named bundles of behavior.
//!
//! A trait is an unordered mapping from property name to descriptor,
//! lifted from a behavior record. Traits are value objects: composition
//! and resolution always produce new traits and never touch their inputs.

mod compose;
mod resolve;

pub use compose::compose;
pub use resolve::{Resolution, resolve};

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{TraitError, TraitResult};
use crate::instance::Instance;
use crate::property::{Descriptor, DescriptorKind, Slot, Value};

/// An immutable mapping from property name to [`Descriptor`].
///
/// Names are unique by construction; only composition introduces
/// `Conflict` markers. Cloning a trait shares method implementations, so
/// clones agree with each other under composition (the diamond rule).
#[derive(Debug, Clone, Default)]
pub struct Trait {
    properties: IndexMap<String, Descriptor>,
}

impl Trait {
    /// An empty trait, the identity element of composition.
    pub fn empty() -> Trait {
        Trait::default()
    }

    /// Start building a trait from individual slots.
    pub fn builder() -> TraitBuilder {
        TraitBuilder::default()
    }

    /// Lift a behavior record, given as `(name, slot)` pairs, into a trait.
    ///
    /// Fails with [`TraitError::InvalidTraitLiteral`] if the record binds
    /// the same name twice.
    pub fn from_entries<I, N>(entries: I) -> TraitResult<Trait>
    where
        I: IntoIterator<Item = (N, Slot)>,
        N: Into<String>,
    {
        let mut properties = IndexMap::new();
        for (name, slot) in entries {
            let name = name.into();
            if properties.contains_key(&name) {
                return Err(TraitError::InvalidTraitLiteral(name));
            }
            properties.insert(name, slot.into_descriptor());
        }
        Ok(Trait { properties })
    }

    /// Internal constructor for traits produced by transformations, whose
    /// name uniqueness is guaranteed by the map representation itself.
    pub(crate) fn from_map(properties: IndexMap<String, Descriptor>) -> Trait {
        Trait { properties }
    }

    /// Descriptor bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Descriptor> {
        self.properties.get(name)
    }

    /// Kind of the descriptor bound to `name`, if any.
    pub fn kind_of(&self, name: &str) -> Option<DescriptorKind> {
        self.properties.get(name).map(Descriptor::kind)
    }

    /// Iterate over `(name, descriptor)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Descriptor)> {
        self.properties.iter().map(|(name, desc)| (name.as_str(), desc))
    }

    /// Property names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// True while any property is a live conflict marker.
    pub fn has_conflicts(&self) -> bool {
        self.properties.values().any(|d| d.kind() == DescriptorKind::Conflict)
    }

    /// Names of live conflict markers, lexicographically sorted.
    pub fn conflict_names(&self) -> Vec<&str> {
        self.names_of_kind(DescriptorKind::Conflict)
    }

    /// Names of unsatisfied required slots, lexicographically sorted.
    pub fn required_names(&self) -> Vec<&str> {
        self.names_of_kind(DescriptorKind::Required)
    }

    fn names_of_kind(&self, kind: DescriptorKind) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .iter()
            .filter(|(_, desc)| desc.kind() == kind)
            .map(|(name, _)| name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Structural equivalence: same names, and per name the same
    /// underlying implementation (value equality for data, wrap identity
    /// for methods). Blind to declaration order.
    pub fn eqv(&self, other: &Trait) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, desc)| other.get(name).is_some_and(|theirs| theirs == desc))
    }

    /// Serializable name → kind summary, for reporting and diagnostics.
    pub fn shape(&self) -> TraitShape {
        TraitShape {
            properties: self
                .iter()
                .map(|(name, desc)| (name.to_string(), desc.kind()))
                .collect(),
        }
    }
}

/// Name → kind summary of a trait, detached from the implementations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraitShape {
    pub properties: IndexMap<String, DescriptorKind>,
}

/// Accumulates record slots and validates them into a [`Trait`].
#[derive(Default)]
pub struct TraitBuilder {
    entries: Vec<(String, Slot)>,
}

impl TraitBuilder {
    /// Add a data slot.
    pub fn data(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.slot(name, Slot::value(value))
    }

    /// Add a method slot.
    pub fn method<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> eyre::Result<Value> + Send + Sync + 'static,
    {
        self.slot(name, Slot::method(body))
    }

    /// Declare a required slot.
    pub fn required(self, name: impl Into<String>) -> Self {
        self.slot(name, Slot::Required)
    }

    /// Add an already-built slot.
    pub fn slot(mut self, name: impl Into<String>, slot: Slot) -> Self {
        self.entries.push((name.into(), slot));
        self
    }

    /// Validate and build. Duplicate names are rejected with
    /// [`TraitError::InvalidTraitLiteral`].
    pub fn build(self) -> TraitResult<Trait> {
        Trait::from_entries(self.entries)
    }
}
