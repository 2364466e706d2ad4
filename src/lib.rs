//! traitmix is a trait composition engine with explicit conflict
//! resolution.
//!
//! Objects are built out of reusable, independently authored behavior
//! units ("traits"). Composition is symmetric and conflict-detecting:
//! when two traits disagree on a property, the disagreement is recorded
//! as a `Conflict` marker instead of being silently resolved by source
//! order, and it must be settled by exclusion or renaming before an
//! object can be instantiated. Required slots declare dependencies that
//! another trait, or the state object, must supply.
//!
//! The pipeline is: behavior record → [`Trait`] → ([`compose`] |
//! [`resolve`], repeatedly, in any order) → [`instantiate`] → concrete
//! [`Instance`]. Traits are immutable values; every step returns a new
//! trait and never touches its inputs.
//!
//! ```
//! use serde_json::json;
//! use traitmix::{compose, instantiate, resolve, Resolution, State, Trait};
//!
//! // A trait that needs `name` from somewhere else.
//! let greeter = Trait::builder()
//!     .required("name")
//!     .method("greet", |this, _args| {
//!         let name = this.get("name").unwrap_or(json!("stranger"));
//!         Ok(json!(format!("hello, {}", name.as_str().unwrap_or("?"))))
//!     })
//!     .build()?;
//!
//! // Another trait contends for `greet`; rename it out of the way.
//! let shouter = Trait::builder()
//!     .method("greet", |_this, _args| Ok(json!("HELLO")))
//!     .build()?;
//! let shouter = resolve(&shouter, &Resolution::new().rename("greet", "shout"))?;
//!
//! let composed = compose(&[greeter, shouter]);
//! let state = State::builder().data("name", "world").build()?;
//! let obj = instantiate(&state, &composed)?;
//!
//! assert_eq!(obj.call("greet", &[])?, json!("hello, world"));
//! assert_eq!(obj.call("shout", &[])?, json!("HELLO"));
//! # Ok::<(), eyre::Report>(())
//! ```

pub mod error;
pub mod instance;
pub mod property;
pub mod traits;

pub use error::{TraitError, TraitResult};
pub use instance::{instantiate, Instance, State, StateBuilder};
pub use property::{Descriptor, DescriptorKind, MethodFn, Slot, Value, REQUIRED};
pub use traits::{compose, resolve, Resolution, Trait, TraitBuilder, TraitShape};
