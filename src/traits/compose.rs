//! Symmetric trait composition.
//!
//! `compose` merges any number of traits into one, marking disagreements
//! as conflicts instead of resolving them by source order. Conflicts are
//! data here; they only become errors at instantiation time.

use indexmap::IndexMap;
use log::{debug, trace};

use crate::property::Descriptor;
use crate::traits::Trait;

/// Compose traits symmetrically.
///
/// Per property name: a single definition is carried through; definitions
/// that share the same underlying implementation collapse into one (so a
/// trait reached through several composition paths never conflicts with
/// itself); disagreeing definitions become a `Conflict` marker; a
/// `Required` slot is satisfied by any concrete definition and survives
/// only if every source leaves it required.
///
/// The result is order-independent as a name → descriptor mapping:
/// `compose` is commutative and associative up to [`Trait::eqv`].
/// `compose(&[])` is the empty trait. This operation never fails.
pub fn compose(traits: &[Trait]) -> Trait {
    let mut merged: IndexMap<String, Descriptor> = IndexMap::new();

    for source in traits {
        for (name, desc) in source.iter() {
            match merged.get_mut(name) {
                Some(existing) => {
                    let combined = existing.merge(desc);
                    trace!(
                        "compose: `{name}` {} + {} -> {}",
                        existing.kind(),
                        desc.kind(),
                        combined.kind()
                    );
                    *existing = combined;
                }
                None => {
                    merged.insert(name.to_string(), desc.clone());
                }
            }
        }
    }

    let result = Trait::from_map(merged);
    debug!(
        "composed {} traits into {} properties ({} conflicts, {} required)",
        traits.len(),
        result.len(),
        result.conflict_names().len(),
        result.required_names().len()
    );
    result
}

impl Trait {
    /// Prioritized composition: the receiver wins every contested name.
    ///
    /// Unlike [`compose`], this merge is deliberately asymmetric and never
    /// generates a conflict: where both sides define a name, the
    /// receiver's definition is kept; a `Required` slot on either side is
    /// satisfied by the other side's definition. An existing `Conflict`
    /// marker is an ordinary binding for this purpose: it is carried, not
    /// cleared.
    pub fn override_with(&self, other: &Trait) -> Trait {
        let mut merged = self.properties.clone();

        for (name, desc) in other.iter() {
            match merged.get_mut(name) {
                Some(existing) => {
                    if matches!(existing, Descriptor::Required)
                        && !matches!(desc, Descriptor::Required)
                    {
                        trace!("override: `{name}` required slot satisfied");
                        *existing = desc.clone();
                    }
                }
                None => {
                    merged.insert(name.to_string(), desc.clone());
                }
            }
        }

        Trait::from_map(merged)
    }
}
