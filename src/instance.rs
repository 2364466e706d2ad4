//! Instantiation: turning a resolved trait plus concrete state into a
//! usable object.
//!
//! An instance is the terminal artifact of the algebra. Its methods
//! dispatch by name with the instance itself as receiver, so one trait's
//! method can call another trait's method (or read state fields) on the
//! same object.

use std::cell::RefCell;
use std::fmt;

use indexmap::IndexMap;
use log::debug;

use crate::error::{TraitError, TraitResult};
use crate::property::{Descriptor, MethodFn, Value};
use crate::traits::Trait;

/// A plain record of initial field values and methods, supplied at
/// instantiation. Not part of the trait algebra itself, but its entries
/// may satisfy `Required` slots.
///
/// State records hold only concrete slots; the builder has no way to
/// express a required marker.
#[derive(Debug, Clone, Default)]
pub struct State {
    data: IndexMap<String, Value>,
    methods: IndexMap<String, MethodFn>,
}

impl State {
    /// A state object with no properties of its own.
    pub fn empty() -> State {
        State::default()
    }

    pub fn builder() -> StateBuilder {
        StateBuilder::default()
    }

    /// True if the record binds `name`, as either data or a method.
    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name) || self.methods.contains_key(name)
    }

    /// All bound names, data first, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().chain(self.methods.keys()).map(String::as_str)
    }
}

/// Accumulates concrete slots and validates them into a [`State`].
#[derive(Default)]
pub struct StateBuilder {
    entries: Vec<(String, StateEntry)>,
}

enum StateEntry {
    Data(Value),
    Method(MethodFn),
}

impl StateBuilder {
    /// Add an initial field value.
    pub fn data(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((name.into(), StateEntry::Data(value.into())));
        self
    }

    /// Add a method supplied by the state object.
    pub fn method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> eyre::Result<Value> + Send + Sync + 'static,
    {
        self.entries
            .push((name.into(), StateEntry::Method(MethodFn::new(body))));
        self
    }

    /// Validate and build. Duplicate names are rejected with
    /// [`TraitError::InvalidTraitLiteral`], same as a trait literal.
    pub fn build(self) -> TraitResult<State> {
        let mut state = State::default();
        for (name, entry) in self.entries {
            if state.contains(&name) {
                return Err(TraitError::InvalidTraitLiteral(name));
            }
            match entry {
                StateEntry::Data(value) => {
                    state.data.insert(name, value);
                }
                StateEntry::Method(body) => {
                    state.methods.insert(name, body);
                }
            }
        }
        Ok(state)
    }
}

/// A concrete object produced by [`instantiate`].
///
/// Data fields sit behind interior mutability, so methods invoked through
/// [`Instance::call`] can read and update them via the shared receiver.
/// The method table is fixed at instantiation. Instances are ordinary
/// single-threaded objects (`!Sync`); the algebra's value types stay
/// `Send + Sync`.
pub struct Instance {
    fields: RefCell<IndexMap<String, Value>>,
    methods: IndexMap<String, MethodFn>,
}

impl Instance {
    /// Current value of a data field.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.fields.borrow().get(name).cloned()
    }

    /// Set a data field, adding it if absent.
    ///
    /// Method slots are fixed at instantiation; shadowing one is refused.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> eyre::Result<()> {
        let name = name.into();
        if self.methods.contains_key(&name) {
            eyre::bail!("property `{name}` is a method and cannot be reassigned");
        }
        self.fields.borrow_mut().insert(name, value.into());
        Ok(())
    }

    /// Invoke the method bound to `name`, with this instance as receiver.
    pub fn call(&self, name: &str, args: &[Value]) -> eyre::Result<Value> {
        match self.methods.get(name) {
            Some(method) => method.invoke(self, args),
            None if self.fields.borrow().contains_key(name) => {
                eyre::bail!("property `{name}` is a data field, not a method")
            }
            None => eyre::bail!("no property named `{name}`"),
        }
    }

    /// True if the instance has a property named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name) || self.fields.borrow().contains_key(name)
    }

    /// All property names: data fields first, then methods.
    pub fn names(&self) -> Vec<String> {
        self.fields
            .borrow()
            .keys()
            .chain(self.methods.keys())
            .cloned()
            .collect()
    }

    /// Names of data fields.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.borrow().keys().cloned().collect()
    }

    /// Names of methods.
    pub fn method_names(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("fields", &*self.fields.borrow())
            .field("methods", &self.method_names())
            .finish()
    }
}

/// Combine a state object with a fully resolved trait into an [`Instance`].
///
/// Preconditions, checked before any object is produced:
/// - no property of `source` is a `Conflict` marker, and no name is
///   defined concretely by both `state` and `source` (that overlap is
///   itself a conflict; state never silently overrides a trait, nor the
///   reverse). Violation: [`TraitError::UnresolvedConflict`] naming the
///   lexicographically first offender.
/// - every `Required` property of `source` is bound by `state`.
///   Violation: [`TraitError::UnsatisfiedRequirement`], lexicographically
///   first offender.
///
/// Neither input is mutated; every call produces a fresh object.
pub fn instantiate(state: &State, source: &Trait) -> TraitResult<Instance> {
    let mut conflicted: Vec<&str> = Vec::new();
    let mut missing: Vec<&str> = Vec::new();
    for (name, desc) in source.iter() {
        match desc {
            Descriptor::Conflict => conflicted.push(name),
            Descriptor::Data(_) | Descriptor::Method(_) => {
                if state.contains(name) {
                    conflicted.push(name);
                }
            }
            Descriptor::Required => {
                if !state.contains(name) {
                    missing.push(name);
                }
            }
        }
    }

    if let Some(name) = conflicted.into_iter().min() {
        return Err(TraitError::UnresolvedConflict(name.to_string()));
    }
    if let Some(name) = missing.into_iter().min() {
        return Err(TraitError::UnsatisfiedRequirement(name.to_string()));
    }

    let mut fields = state.data.clone();
    let mut methods = state.methods.clone();
    for (name, desc) in source.iter() {
        match desc {
            Descriptor::Data(value) => {
                fields.insert(name.to_string(), value.clone());
            }
            Descriptor::Method(body) => {
                methods.insert(name.to_string(), body.clone());
            }
            // Satisfied by the state object's own binding.
            Descriptor::Required => {}
            // Excluded by the precondition check above.
            Descriptor::Conflict => unreachable!("conflict survived precondition check"),
        }
    }

    debug!(
        "instantiated object with {} fields and {} methods",
        fields.len(),
        methods.len()
    );
    Ok(Instance {
        fields: RefCell::new(fields),
        methods,
    })
}
