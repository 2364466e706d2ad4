//! Conflict resolution directives: exclusion and renaming.
//!
//! Resolution is how a live conflict is actually settled: exclude one
//! side, or rename it out of the contested slot. Renaming a conflict
//! marker only relocates it; exclusion is what removes it.

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use crate::error::{TraitError, TraitResult};
use crate::property::Descriptor;
use crate::traits::Trait;

/// A rename/exclude directive set, applied atomically to one trait.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    renames: IndexMap<String, String>,
    excludes: IndexSet<String>,
}

impl Resolution {
    pub fn new() -> Resolution {
        Resolution::default()
    }

    /// Move the descriptor bound to `from` to the name `to`.
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    /// Drop the property `name` from the result entirely.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.excludes.insert(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty() && self.excludes.is_empty()
    }

    /// Every property name this directive set refers to.
    fn referenced_names(&self) -> impl Iterator<Item = &str> {
        self.renames
            .keys()
            .chain(self.excludes.iter())
            .map(String::as_str)
    }
}

/// Apply a [`Resolution`] to a trait, producing a new trait.
///
/// Per name, exclusion applies first and removes the property entirely,
/// including a live `Conflict`; that is how conflicts are settled. A
/// rename then moves the descriptor to its new name, leaving the old name
/// absent; a renamed `Conflict` marker stays a conflict at its new name.
/// Names mentioned by neither directive pass through unchanged.
///
/// If a rename lands on a name that is already bound in the result, the
/// two descriptors are merged with the composition kernel, so disagreeing
/// definitions surface as a `Conflict` rather than one side silently
/// winning.
///
/// Fails with [`TraitError::UnknownPropertyReference`] if any directive
/// names a property absent from `source`: a stale directive is a
/// programmer error and is surfaced, not ignored. The lexicographically
/// first unknown name is reported, and `source` is left untouched.
pub fn resolve(source: &Trait, resolution: &Resolution) -> TraitResult<Trait> {
    if let Some(unknown) = resolution
        .referenced_names()
        .filter(|name| source.get(name).is_none())
        .min()
    {
        return Err(TraitError::UnknownPropertyReference(unknown.to_string()));
    }

    let mut merged: IndexMap<String, Descriptor> = IndexMap::new();
    for (name, desc) in source.iter() {
        if resolution.excludes.contains(name) {
            trace!("resolve: excluded `{name}` ({})", desc.kind());
            continue;
        }

        let target = resolution.renames.get(name).map(String::as_str).unwrap_or(name);
        if target != name {
            trace!("resolve: renamed `{name}` -> `{target}` ({})", desc.kind());
        }

        match merged.get_mut(target) {
            Some(existing) => *existing = existing.merge(desc),
            None => {
                merged.insert(target.to_string(), desc.clone());
            }
        }
    }

    let result = Trait::from_map(merged);
    debug!(
        "resolved trait: {} renames, {} exclusions, {} -> {} properties",
        resolution.renames.len(),
        resolution.excludes.len(),
        source.len(),
        result.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{DescriptorKind, Slot, Value};
    use crate::traits::compose;
    use serde_json::json;

    #[test]
    fn exclusion_removes_the_property() {
        let t = Trait::builder().data("x", 1).data("y", 2).build().unwrap();
        let r = resolve(&t, &Resolution::new().exclude("x")).unwrap();
        assert!(r.get("x").is_none());
        assert_eq!(r.kind_of("y"), Some(DescriptorKind::Data));
    }

    #[test]
    fn exclusion_settles_a_conflict() {
        let a = Trait::builder().data("n", 1).build().unwrap();
        let b = Trait::builder().data("n", 2).build().unwrap();
        let conflicted = compose(&[a, b]);
        assert!(conflicted.has_conflicts());

        let settled = resolve(&conflicted, &Resolution::new().exclude("n")).unwrap();
        assert!(settled.get("n").is_none());
        assert!(!settled.has_conflicts());
    }

    #[test]
    fn rename_moves_the_descriptor() {
        let t = Trait::builder()
            .method("start", |_, _| Ok(json!("started")))
            .build()
            .unwrap();
        let r = resolve(&t, &Resolution::new().rename("start", "start_moving")).unwrap();
        assert!(r.get("start").is_none());
        assert_eq!(r.kind_of("start_moving"), Some(DescriptorKind::Method));
    }

    #[test]
    fn renaming_a_conflict_moves_the_marker() {
        let a = Trait::builder().data("n", 1).build().unwrap();
        let b = Trait::builder().data("n", 2).build().unwrap();
        let conflicted = compose(&[a, b]);

        let moved = resolve(&conflicted, &Resolution::new().rename("n", "m")).unwrap();
        assert!(moved.get("n").is_none());
        assert_eq!(moved.kind_of("m"), Some(DescriptorKind::Conflict));
    }

    #[test]
    fn unknown_reference_is_rejected() {
        let t = Trait::builder().data("x", 1).build().unwrap();

        let err = resolve(&t, &Resolution::new().exclude("ghost")).unwrap_err();
        assert_eq!(err, TraitError::UnknownPropertyReference("ghost".into()));

        let err = resolve(&t, &Resolution::new().rename("ghost", "y")).unwrap_err();
        assert_eq!(err, TraitError::UnknownPropertyReference("ghost".into()));
    }

    #[test]
    fn first_unknown_reference_by_name_order() {
        let t = Trait::builder().data("x", 1).build().unwrap();
        let err = resolve(
            &t,
            &Resolution::new().exclude("zz").rename("aa", "bb"),
        )
        .unwrap_err();
        assert_eq!(err, TraitError::UnknownPropertyReference("aa".into()));
    }

    #[test]
    fn rename_collision_becomes_a_conflict() {
        let t = Trait::builder().data("a", 1).data("b", 2).build().unwrap();
        let r = resolve(&t, &Resolution::new().rename("a", "b")).unwrap();
        assert!(r.get("a").is_none());
        assert_eq!(r.kind_of("b"), Some(DescriptorKind::Conflict));
    }

    #[test]
    fn rename_onto_identical_definition_collapses() {
        let shared = crate::property::MethodFn::new(|_, _| Ok(Value::Null));
        let t = Trait::from_entries([
            ("a", Slot::Method(shared.clone())),
            ("b", Slot::Method(shared)),
        ])
        .unwrap();
        let r = resolve(&t, &Resolution::new().rename("a", "b")).unwrap();
        assert_eq!(r.kind_of("b"), Some(DescriptorKind::Method));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn exclusion_applies_before_rename_of_same_name() {
        let t = Trait::builder().data("x", 1).build().unwrap();
        let r = resolve(
            &t,
            &Resolution::new().exclude("x").rename("x", "y"),
        )
        .unwrap();
        assert!(r.is_empty());
    }

    #[test]
    fn untouched_names_pass_through() {
        let t = Trait::builder().required("f").data("x", 1).build().unwrap();
        let r = resolve(&t, &Resolution::new().rename("x", "y")).unwrap();
        assert_eq!(r.kind_of("f"), Some(DescriptorKind::Required));
    }

    #[test]
    fn resolve_does_not_mutate_the_source() {
        let t = Trait::builder().data("x", 1).build().unwrap();
        let _ = resolve(&t, &Resolution::new().rename("x", "y")).unwrap();
        assert_eq!(t.kind_of("x"), Some(DescriptorKind::Data));
    }
}
