//! Property descriptors: the atomic unit of the trait algebra.
//!
//! A trait maps property names to descriptors. A descriptor is either a
//! plain data value, an unbound method, a required-but-unimplemented
//! marker, or a conflict marker left behind by a disagreeing composition.
//! The per-name merge kernel ([`Descriptor::merge`]) lives here; both the
//! composer and the resolver reduce to it.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::instance::Instance;

/// Dynamic value stored in data slots and passed to/returned from methods.
pub use serde_json::Value;

/// Signature of a trait method body: receiver plus positional arguments.
///
/// Methods are stored unbound. The receiver is supplied only when the
/// method is invoked through a fully composed [`Instance`], so sibling
/// lookups observe the final object rather than the trait of origin.
pub type MethodBody = dyn Fn(&Instance, &[Value]) -> eyre::Result<Value> + Send + Sync;

static NEXT_METHOD_ID: AtomicU64 = AtomicU64::new(1);

/// A shared, unbound method implementation with a stable identity.
///
/// Identity is allocated once when the callable is wrapped and survives
/// clones, renames, and re-compositions. Two methods are the same
/// implementation iff they originate from the same wrap, which is what
/// lets a trait reached through two composition paths agree with itself.
#[derive(Clone)]
pub struct MethodFn {
    id: u64,
    body: Arc<MethodBody>,
}

impl MethodFn {
    /// Wrap a callable as a method implementation.
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> eyre::Result<Value> + Send + Sync + 'static,
    {
        Self {
            id: NEXT_METHOD_ID.fetch_add(1, Ordering::Relaxed),
            body: Arc::new(body),
        }
    }

    /// Invoke the method with an explicit receiver.
    pub fn invoke(&self, receiver: &Instance, args: &[Value]) -> eyre::Result<Value> {
        (self.body)(receiver, args)
    }

    /// Identity token of the underlying implementation.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl PartialEq for MethodFn {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MethodFn {}

impl fmt::Debug for MethodFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodFn(#{})", self.id)
    }
}

/// The four states a named slot can be in.
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    /// A plain field value.
    Data(Value),
    /// An unbound method, bound to the receiver at instantiation time.
    Method(MethodFn),
    /// Declared but unimplemented; must be satisfied before instantiation.
    Required,
    /// Two or more sources disagreed; must be resolved before instantiation.
    Conflict,
}

impl Descriptor {
    /// Kind tag for introspection and reporting.
    pub fn kind(&self) -> DescriptorKind {
        match self {
            Descriptor::Data(_) => DescriptorKind::Data,
            Descriptor::Method(_) => DescriptorKind::Method,
            Descriptor::Required => DescriptorKind::Required,
            Descriptor::Conflict => DescriptorKind::Conflict,
        }
    }

    /// True for `Data` and `Method`, the slots that carry an implementation.
    pub fn is_concrete(&self) -> bool {
        matches!(self, Descriptor::Data(_) | Descriptor::Method(_))
    }

    /// Merge two descriptors bound to the same name.
    ///
    /// This is the whole composition algebra for one slot:
    /// - a conflict dominates everything, including a requirement;
    /// - a requirement is satisfied by any concrete descriptor and
    ///   idempotent with itself;
    /// - concrete descriptors agree only when they carry the same
    ///   underlying implementation (value equality for data, wrap
    ///   identity for methods); agreement by name alone is a conflict.
    pub(crate) fn merge(&self, other: &Descriptor) -> Descriptor {
        use Descriptor::*;
        match (self, other) {
            (Conflict, _) | (_, Conflict) => Conflict,
            (Required, Required) => Required,
            (Required, concrete) => concrete.clone(),
            (concrete, Required) => concrete.clone(),
            (a, b) if a == b => a.clone(),
            _ => Conflict,
        }
    }
}

/// Kind of a property descriptor, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorKind {
    Data,
    Method,
    Required,
    Conflict,
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            DescriptorKind::Data => "data",
            DescriptorKind::Method => "method",
            DescriptorKind::Required => "required",
            DescriptorKind::Conflict => "conflict",
        };
        write!(f, "{tag}")
    }
}

/// One entry of a behavior record, before it is lifted into a trait.
///
/// `Slot::Required` is the sentinel that marks a slot as declared but
/// deferred; [`REQUIRED`] re-exports it as a constant for record literals.
#[derive(Debug, Clone)]
pub enum Slot {
    /// A plain field value.
    Value(Value),
    /// A method implementation.
    Method(MethodFn),
    /// The required-slot sentinel.
    Required,
}

/// Sentinel marking a record slot as required rather than implemented.
pub const REQUIRED: Slot = Slot::Required;

impl Slot {
    /// A data slot.
    pub fn value(value: impl Into<Value>) -> Slot {
        Slot::Value(value.into())
    }

    /// A method slot wrapping a fresh implementation.
    pub fn method<F>(body: F) -> Slot
    where
        F: Fn(&Instance, &[Value]) -> eyre::Result<Value> + Send + Sync + 'static,
    {
        Slot::Method(MethodFn::new(body))
    }

    pub(crate) fn into_descriptor(self) -> Descriptor {
        match self {
            Slot::Value(value) => Descriptor::Data(value),
            Slot::Method(body) => Descriptor::Method(body),
            Slot::Required => Descriptor::Required,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop() -> MethodFn {
        MethodFn::new(|_, _| Ok(Value::Null))
    }

    #[test]
    fn method_identity_survives_clone() {
        let m = noop();
        assert_eq!(m, m.clone());
    }

    #[test]
    fn separately_wrapped_methods_differ() {
        assert_ne!(noop(), noop());
    }

    #[test]
    fn merge_required_with_required() {
        let merged = Descriptor::Required.merge(&Descriptor::Required);
        assert_eq!(merged.kind(), DescriptorKind::Required);
    }

    #[test]
    fn merge_required_with_concrete_is_satisfied() {
        let data = Descriptor::Data(json!(7));
        assert_eq!(Descriptor::Required.merge(&data), data);
        assert_eq!(data.merge(&Descriptor::Required), data);
    }

    #[test]
    fn merge_conflict_dominates_requirement() {
        let merged = Descriptor::Required.merge(&Descriptor::Conflict);
        assert_eq!(merged.kind(), DescriptorKind::Conflict);
        let merged = Descriptor::Conflict.merge(&Descriptor::Required);
        assert_eq!(merged.kind(), DescriptorKind::Conflict);
    }

    #[test]
    fn merge_equal_data_carries_through() {
        let a = Descriptor::Data(json!({"x": 1}));
        let b = Descriptor::Data(json!({"x": 1}));
        assert_eq!(a.merge(&b), a);
    }

    #[test]
    fn merge_different_data_conflicts() {
        let a = Descriptor::Data(json!(1));
        let b = Descriptor::Data(json!(2));
        assert_eq!(a.merge(&b).kind(), DescriptorKind::Conflict);
    }

    #[test]
    fn merge_same_method_instance_agrees() {
        let m = noop();
        let a = Descriptor::Method(m.clone());
        let b = Descriptor::Method(m);
        assert_eq!(a.merge(&b).kind(), DescriptorKind::Method);
    }

    #[test]
    fn merge_distinct_method_instances_conflict() {
        let a = Descriptor::Method(noop());
        let b = Descriptor::Method(noop());
        assert_eq!(a.merge(&b).kind(), DescriptorKind::Conflict);
    }

    #[test]
    fn merge_data_with_method_conflicts() {
        let a = Descriptor::Data(json!(null));
        let b = Descriptor::Method(noop());
        assert_eq!(a.merge(&b).kind(), DescriptorKind::Conflict);
    }

    #[test]
    fn kind_display_is_lowercase() {
        assert_eq!(DescriptorKind::Required.to_string(), "required");
        assert_eq!(DescriptorKind::Conflict.to_string(), "conflict");
    }

    #[test]
    fn required_sentinel_lifts_to_required_descriptor() {
        assert_eq!(REQUIRED.into_descriptor().kind(), DescriptorKind::Required);
    }
}
