//! Particle morph demonstration
//!
//! Rebuilds the classic animation/particle scenario through the public
//! API: an animation trait that requires `animate`, composed with a
//! particle trait that supplies it by delegating to the state object's
//! `move`. The animation trait's `start` is renamed to `start_moving`
//! and its `stop` excluded, so the particle trait provides alternative
//! implementations of both without conflicting.

use colored::*;
use eyre::Result;
use serde::Serialize;
use serde_json::json;

use traitmix::{compose, instantiate, resolve, Resolution, Slot, State, Trait, TraitShape, Value, REQUIRED};

use crate::cli::OutputFormat;
use crate::config::Config;

#[derive(Serialize)]
struct DemoReport {
    shape: TraitShape,
    properties: Vec<String>,
    start_moving: Value,
    stop: Value,
    moved: Value,
}

fn animation_trait(move_rate: f64) -> Result<Trait> {
    let t = Trait::from_entries([
        ("animate", REQUIRED),
        (
            "start",
            Slot::method(move |this, _args| {
                log::debug!("animation tick at refresh rate {move_rate}");
                this.call("animate", &[])
            }),
        ),
        ("stop", Slot::method(|_this, _args| Ok(json!("timer reset")))),
    ])?;
    Ok(t)
}

fn particle_trait(move_rate: f64, dx: f64, dy: f64) -> Result<Trait> {
    let animation = resolve(
        &animation_trait(move_rate)?,
        &Resolution::new().rename("start", "start_moving").exclude("stop"),
    )?;

    let particle = Trait::from_entries([
        (
            "animate",
            Slot::method(move |this, _args| this.call("move", &[json!(dx), json!(dy)])),
        ),
        (
            "start",
            Slot::method(|this, _args| this.call("start_moving", &[])),
        ),
        ("stop", Slot::method(|_this, _args| Ok(json!("alternative stop")))),
    ])?;

    Ok(compose(&[particle, animation]))
}

fn circle_state(radius: f64) -> Result<State> {
    let state = State::builder()
        .data("radius", radius)
        .method("move", |_this, args| {
            let dx = args.first().and_then(Value::as_f64).unwrap_or(0.0);
            let dy = args.get(1).and_then(Value::as_f64).unwrap_or(0.0);
            Ok(json!(format!("moved {dx},{dy}")))
        })
        .build()?;
    Ok(state)
}

pub fn run(
    radius: Option<f64>,
    move_rate: Option<f64>,
    dx: Option<f64>,
    dy: Option<f64>,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let defaults = &config.demo;
    let radius = radius.unwrap_or(defaults.radius);
    let move_rate = move_rate.unwrap_or(defaults.move_rate);
    let dx = dx.unwrap_or(defaults.dx);
    let dy = dy.unwrap_or(defaults.dy);

    let morph_trait = particle_trait(move_rate, dx, dy)?;
    let state = circle_state(radius)?;
    let morph = instantiate(&state, &morph_trait)?;

    let report = DemoReport {
        shape: morph_trait.shape(),
        properties: morph.names(),
        start_moving: morph.call("start_moving", &[])?,
        stop: morph.call("stop", &[])?,
        moved: morph.call("move", &[json!(2.0), json!(3.0)])?,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&report)?),
        OutputFormat::Text => print_text_report(&report),
    }

    Ok(())
}

fn print_text_report(report: &DemoReport) {
    println!("{}", "Particle Morph".bold());
    println!();

    println!(
        "{} ({}):",
        "Composed trait".cyan(),
        format!("{} properties", report.shape.properties.len()).dimmed()
    );
    for (name, kind) in &report.shape.properties {
        println!("  {} {} {}", "✓".green(), name, format!("[{kind}]").dimmed());
    }
    println!();

    println!("{}:", "Calls".cyan());
    print_call("start_moving()", &report.start_moving);
    print_call("stop()", &report.stop);
    print_call("move(2, 3)", &report.moved);
}

fn print_call(invocation: &str, result: &Value) {
    println!("  {:16} {} {}", invocation, "→".dimmed(), result.to_string().yellow());
}
