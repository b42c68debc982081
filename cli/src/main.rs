//! Demonstration host: a 7493 counter clocked by a square wave,
//! decoded through a 7448 and rendered as a seven-segment digit.
//!
//! The machine-configuration layer a real emulator would have (memory
//! maps, cartridge banking, input ports) collapses here to a handful
//! of nets and two devices; the host's whole job is to build the
//! network, inject the clock, and read the segment nets back for
//! rendering.
use std::error::Error;
use std::time::Duration;

use clap::Parser;
use tracing::{event, Level as LogLevel};
use tracing_subscriber::prelude::*;

use logic::Level;
use netlist::{NetId, NetlistBuilder, Simulation};

mod clock;
mod display;

use clock::HostClock;
use display::SegmentDisplay;

/// Half of the simulated clock period: the counter advances once per
/// full period, on the falling edge.
const HALF_PERIOD: Duration = Duration::from_micros(500);

#[derive(Debug, Parser)]
#[command(name = "netsim", about = "Simulate a TTL counter driving a seven-segment display")]
struct Args {
    /// Number of clock periods to simulate.
    #[arg(long, default_value_t = 20)]
    cycles: u32,

    /// Run this many times faster than real-time ('MAX' for
    /// as-fast-as-possible).
    #[arg(long)]
    speed_multiplier: Option<String>,

    /// Hold the decoder's lamp-test input asserted.
    #[arg(long)]
    lamp_test: bool,

    /// Hold the decoder's blanking input asserted.
    #[arg(long)]
    blank: bool,

    /// Hold the decoder's ripple-blanking input asserted, suppressing
    /// the zero digit.
    #[arg(long)]
    ripple_blank: bool,
}

const SEGMENT_NETS: [&str; 7] = [
    "seg_a", "seg_b", "seg_c", "seg_d", "seg_e", "seg_f", "seg_g",
];

fn build_network() -> Result<Simulation, Box<dyn Error>> {
    let mut builder = NetlistBuilder::new();
    builder.device("u1", netlist::devices::counter::RippleCounter4::new())?;
    builder.device("u2", netlist::devices::seven_seg::Bcd7Seg::new())?;
    for name in ["clk", "reset", "qa", "qb", "qc", "qd", "ltq", "biq", "rbiq"] {
        builder.net(name)?;
    }
    for name in SEGMENT_NETS {
        builder.net(name)?;
    }
    builder.connect("u1", "CLK", "clk")?;
    builder.connect("u1", "R1", "reset")?;
    builder.connect("u1", "R2", "reset")?;
    for (pin, net) in [("QA", "qa"), ("QB", "qb"), ("QC", "qc"), ("QD", "qd")] {
        builder.connect("u1", pin, net)?;
    }
    for (pin, net) in [("A", "qa"), ("B", "qb"), ("C", "qc"), ("D", "qd")] {
        builder.connect("u2", pin, net)?;
    }
    for (pin, net) in [("LTQ", "ltq"), ("BIQ", "biq"), ("RBIQ", "rbiq")] {
        builder.connect("u2", pin, net)?;
    }
    for (pin, net) in ["a", "b", "c", "d", "e", "f", "g"].iter().zip(SEGMENT_NETS) {
        builder.connect("u2", pin, net)?;
    }
    Ok(builder.build())
}

fn segment_pattern(sim: &Simulation, segments: &[NetId; 7]) -> u8 {
    let mut pattern = 0u8;
    for (position, net) in segments.iter().enumerate() {
        if sim.net_level(*net).is_high() {
            pattern |= 1 << position;
        }
    }
    pattern
}

fn parse_speed_multiplier(arg: Option<&str>) -> Result<Option<f64>, Box<dyn Error>> {
    match arg {
        None => {
            event!(
                LogLevel::INFO,
                "No --speed-multiplier option specified, using multiplier of 1.0"
            );
            Ok(Some(1.0))
        }
        Some("MAX") => {
            event!(
                LogLevel::INFO,
                "--speed-multiplier=MAX, running at maximum speed"
            );
            Ok(None)
        }
        Some(s) => {
            let multiplier = s.parse::<f64>()?;
            event!(
                LogLevel::INFO,
                "--speed-multiplier={}, running at speed multiplier {}",
                s,
                multiplier
            );
            Ok(Some(multiplier))
        }
    }
}

fn run_simulator() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // See
    // https://docs.rs/tracing-subscriber/0.3/tracing_subscriber/fmt/index.html#filtering-events-with-environment-variables
    // for instructions on how to select which trace messages get
    // printed.
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
    let filter_layer = match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
    {
        Err(e) => {
            return Err(Box::new(e));
        }
        Ok(layer) => layer,
    };
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let speed_multiplier = parse_speed_multiplier(args.speed_multiplier.as_deref())?;

    let mut sim = build_network()?;
    let clk = sim.net_named("clk").expect("clk is declared above");
    let reset = sim.net_named("reset").expect("reset is declared above");
    let segments: [NetId; 7] = SEGMENT_NETS
        .map(|name| sim.net_named(name).expect("segment nets are declared above"));

    // Static override levels, asserted (low) or released (high) for
    // the whole run.
    for (name, asserted) in [
        ("ltq", args.lamp_test),
        ("biq", args.blank),
        ("rbiq", args.ripple_blank),
    ] {
        let net = sim.net_named(name).expect("override nets are declared above");
        sim.set_external(net, Level::from_bool(!asserted), Duration::ZERO)?;
    }

    // Power-on reset pulse, released before the first clock edge.
    sim.set_external(reset, Level::High, Duration::ZERO)?;
    sim.run_until(Duration::from_micros(100));
    sim.set_external(reset, Level::Low, Duration::from_micros(150))?;
    sim.run_until(Duration::from_micros(200));

    let mut host = HostClock::new(speed_multiplier);
    let mut display = SegmentDisplay::new();
    let mut shown: Option<u8> = None;
    let mut t = Duration::from_micros(200);
    for half_cycle in 0..args.cycles.saturating_mul(2) {
        t += HALF_PERIOD;
        let level = if half_cycle % 2 == 0 {
            Level::High
        } else {
            Level::Low
        };
        sim.set_external(clk, level, t)?;
        // Run half a period past the edge so the counter and decoder
        // delays have settled before we sample.
        sim.run_until(t + HALF_PERIOD / 2);
        let pattern = segment_pattern(&sim, &segments);
        if shown != Some(pattern) {
            display.show(&format!("t={:?}", sim.now()), pattern)?;
            shown = Some(pattern);
        }
        host.pace(sim.now());
    }
    event!(
        LogLevel::INFO,
        "simulation finished at t={:?} with {} pending events",
        sim.now(),
        sim.pending_events()
    );
    Ok(())
}

fn main() {
    match run_simulator() {
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Ok(()) => {
            std::process::exit(0);
        }
    }
}
