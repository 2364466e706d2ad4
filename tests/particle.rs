//! End-to-end test of the composition pipeline: an animation trait with a
//! required `animate` slot, a particle trait that supplies it, rename and
//! exclusion directives to clear the contested names, and instantiation
//! against a state object that provides `move`.

use serde_json::json;
use traitmix::{
    compose, instantiate, resolve, Resolution, Slot, State, Trait, TraitError, Value, REQUIRED,
};

fn animation_trait() -> Trait {
    Trait::from_entries([
        ("animate", REQUIRED),
        ("start", Slot::method(|this, _args| this.call("animate", &[]))),
        ("stop", Slot::method(|_this, _args| Ok(json!("timer reset")))),
    ])
    .unwrap()
}

fn particle_trait(dx: f64, dy: f64) -> Trait {
    let animation = resolve(
        &animation_trait(),
        &Resolution::new().rename("start", "start_moving").exclude("stop"),
    )
    .unwrap();

    // Because `start` is renamed and `stop` excluded from the animation
    // trait, this trait must provide alternative implementations.
    let particle = Trait::from_entries([
        (
            "animate",
            Slot::method(move |this, _args| this.call("move", &[json!(dx), json!(dy)])),
        ),
        ("start", Slot::method(|this, _args| this.call("start_moving", &[]))),
        ("stop", Slot::method(|_this, _args| Ok(json!("alternative stop")))),
    ])
    .unwrap();

    compose(&[particle, animation])
}

fn circle_state(radius: f64) -> State {
    State::builder()
        .data("radius", radius)
        .method("move", |_this, args| {
            let dx = args.first().and_then(Value::as_f64).unwrap_or(0.0);
            let dy = args.get(1).and_then(Value::as_f64).unwrap_or(0.0);
            Ok(json!(format!("moved {dx},{dy}")))
        })
        .build()
        .unwrap()
}

#[test]
fn particle_morph_end_to_end() {
    let morph = instantiate(&circle_state(2.0), &particle_trait(1.0, 1.0)).unwrap();

    // start_moving carries the animation trait's original start behavior,
    // which reaches the particle's animate and the state's move through
    // the shared receiver.
    assert_eq!(morph.call("start_moving", &[]).unwrap(), json!("moved 1,1"));

    // Both contested names exist on the instance, with the particle's
    // alternative implementations.
    assert!(morph.contains("start"));
    assert!(morph.contains("stop"));
    assert_eq!(morph.call("start", &[]).unwrap(), json!("moved 1,1"));
    assert_eq!(morph.call("stop", &[]).unwrap(), json!("alternative stop"));

    // The state object's own method and field survive untouched.
    assert_eq!(
        morph.call("move", &[json!(2.0), json!(3.0)]).unwrap(),
        json!("moved 2,3")
    );
    assert_eq!(morph.get("radius"), Some(json!(2.0)));
}

#[test]
fn composed_trait_is_fully_resolved() {
    let t = particle_trait(1.0, 1.0);
    assert!(!t.has_conflicts());
    assert!(t.required_names().is_empty());
    assert_eq!(t.len(), 4);
}

#[test]
fn without_resolution_the_composition_conflicts() {
    let particle = Trait::from_entries([
        ("animate", Slot::method(|this, _| this.call("move", &[]))),
        ("start", Slot::method(|this, _| this.call("start_moving", &[]))),
        ("stop", Slot::method(|_, _| Ok(json!("alternative stop")))),
    ])
    .unwrap();

    let clashing = compose(&[particle, animation_trait()]);
    assert_eq!(clashing.conflict_names(), vec!["start", "stop"]);

    // Instantiation reports the lexicographically first conflict...
    let err = instantiate(&circle_state(2.0), &clashing).unwrap_err();
    assert_eq!(err, TraitError::UnresolvedConflict("start".into()));

    // ...and excluding the contested names clears the way.
    let settled = resolve(
        &clashing,
        &Resolution::new().exclude("start").exclude("stop"),
    )
    .unwrap();
    assert!(!settled.has_conflicts());
    assert!(instantiate(&circle_state(2.0), &settled).is_ok());
}

#[test]
fn requirement_must_come_from_state_or_trait() {
    let animation = animation_trait();

    // Nothing provides `animate`: instantiation refuses.
    let err = instantiate(&State::empty(), &animation).unwrap_err();
    assert_eq!(err, TraitError::UnsatisfiedRequirement("animate".into()));

    // The state object can satisfy it directly.
    let state = State::builder()
        .method("animate", |_, _| Ok(json!("state-driven")))
        .build()
        .unwrap();
    let obj = instantiate(&state, &animation).unwrap();
    assert_eq!(obj.call("start", &[]).unwrap(), json!("state-driven"));
}

#[test]
fn rename_preserves_behavior_under_the_new_name() {
    let t = Trait::builder()
        .method("greet", |_, _| Ok(json!("hi")))
        .build()
        .unwrap();
    let renamed = resolve(&t, &Resolution::new().rename("greet", "salute")).unwrap();

    let obj = instantiate(&State::empty(), &renamed).unwrap();
    assert_eq!(obj.call("salute", &[]).unwrap(), json!("hi"));
    assert!(!obj.contains("greet"));
}

#[test]
fn renamed_alias_still_agrees_with_its_origin() {
    // Renaming does not re-wrap the implementation, so a renamed view
    // composed back with its source collapses instead of conflicting.
    let source = animation_trait();
    let alias = resolve(&source, &Resolution::new().rename("stop", "halt")).unwrap();
    let merged = compose(&[source, alias]);

    assert!(!merged.has_conflicts());
    assert_eq!(merged.conflict_names(), Vec::<&str>::new());
    assert!(merged.names().any(|n| n == "halt"));
}
