use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tracing::info;

use slipstream::components::MovementInput;
use slipstream::config::SurfaceType;
use slipstream::events::SimEvent;
use slipstream::scene::{build_demo, DemoOptions};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Surface {
    Snow,
    Ice,
    Grass,
    Rock,
    Metal,
}

impl From<Surface> for SurfaceType {
    fn from(surface: Surface) -> Self {
        match surface {
            Surface::Snow => SurfaceType::Snow,
            Surface::Ice => SurfaceType::Ice,
            Surface::Grass => SurfaceType::Grass,
            Surface::Rock => SurfaceType::Rock,
            Surface::Metal => SurfaceType::Metal,
        }
    }
}

#[derive(Parser)]
#[command(name = "slipstream", about = "Headless ski/jetpack movement run")]
struct Args {
    /// Simulated seconds to run
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,
    /// Frame length in milliseconds fed to the fixed-step accumulator
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f32,
    /// Slope incline in degrees
    #[arg(long, default_value_t = 18.0)]
    slope_deg: f32,
    #[arg(long, value_enum, default_value_t = Surface::Snow)]
    surface: Surface,
    /// Log filter, same syntax as RUST_LOG
    #[arg(long, default_value = "slipstream=info")]
    log: String,
}

/// Scripted inputs: run downhill, ski, jump, burn the jetpack, then let go.
fn scripted_input(t: f64) -> MovementInput {
    let mut input = MovementInput { forward: 1.0, ..Default::default() };
    match t {
        t if t < 1.0 => {}
        t if t < 4.0 => input.ski = true,
        t if t < 4.05 => input.jump = true,
        t if t < 5.5 => input.jetpack = true,
        _ => input.forward = 0.0,
    }
    input
}

/// Number of frames covering `seconds` at `frame_ms` per frame.
fn frame_count(seconds: f32, frame_ms: f32) -> anyhow::Result<u32> {
    if !(frame_ms.is_finite() && frame_ms > 0.0) {
        bail!("--frame-ms must be positive, got {frame_ms}");
    }
    if !(seconds.is_finite() && seconds >= 0.0) {
        bail!("--seconds must be zero or positive, got {seconds}");
    }
    Ok((seconds * 1000.0 / frame_ms).ceil() as u32)
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let args = Args::parse();
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_new(&args.log).context("invalid --log filter")?)
        .init();

    let options = DemoOptions {
        slope_deg: args.slope_deg,
        surface: args.surface.into(),
        ..Default::default()
    };
    let (mut sim, player) = build_demo(&options)?;
    info!(slope = args.slope_deg, surface = ?args.surface, "demo scene ready");

    let frames = frame_count(args.seconds, args.frame_ms)?;
    let frame_dt = args.frame_ms / 1000.0;
    for _ in 0..frames {
        sim.set_input(player, scripted_input(sim.time()))?;
        sim.advance(frame_dt)?;

        for event in sim.drain_events() {
            match event {
                SimEvent::StateChanged { entity, previous, new } if entity == player => {
                    info!(t = sim.time(), from = previous.name(), to = new.name(), "state change");
                }
                SimEvent::Landed(landing) if landing.entity == player => {
                    info!(
                        t = sim.time(),
                        impact = landing.impact_force,
                        surface = landing.surface.name(),
                        "landed"
                    );
                }
                _ => {}
            }
        }
    }

    let body = sim.physics().state(player)?;
    let controller = sim.controller(player).context("player controller missing")?;
    info!(
        ticks = sim.ticks(),
        state = controller.state().name(),
        position = %body.position,
        speed = body.velocity.length(),
        energy = controller.energy(),
        "run finished"
    );
    Ok(())
}
