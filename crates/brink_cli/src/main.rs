//! Brink CLI
//!
//! Drive a simulated table view through pull-to-refresh and infinite-scroll
//! sessions and log what the edge controllers do.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod sim;

use brink_core::Edge;
use brink_refresh::{EdgeState, RefreshExt, ScrollContainer};
use config::BrinkConfig;
use sim::Simulation;

#[derive(Parser)]
#[command(name = "brink")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Simulate pull-to-refresh and infinite-scroll sessions", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// brink.toml with [refresh] and [demo] settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull down past the top edge and release
    Pull {
        /// Offset to drag to (negative pulls down)
        #[arg(short, long, default_value = "-90", allow_hyphen_values = true)]
        distance: f32,
    },

    /// Drag past the bottom edge repeatedly, loading a page each time
    LoadMore {
        /// Number of pages to load
        #[arg(short, long, default_value = "3")]
        pages: u32,
    },

    /// Programmatic refresh after one second, then infinite scrolling
    Demo {
        /// Number of pages to load after the refresh
        #[arg(short, long, default_value = "2")]
        pages: u32,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = BrinkConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Pull { distance } => cmd_pull(&config, distance),
        Commands::LoadMore { pages } => cmd_load_more(&config, pages),
        Commands::Demo { pages } => cmd_demo(&config, pages),
        Commands::Config => cmd_config(&config),
    }
}

/// Upper bound for waiting on one handler
fn load_timeout(sim: &Simulation) -> f32 {
    sim.load_time() + 2.0
}

fn wait_for_idle(sim: &mut Simulation, edge: Edge) -> Result<()> {
    let timeout = load_timeout(sim);
    if !sim.run_until(timeout, |s| s.view().edge_state(edge) == Some(EdgeState::Idle)) {
        anyhow::bail!("{} edge still loading after {:.1}s", edge, timeout);
    }
    sim.settle();
    Ok(())
}

fn cmd_pull(config: &BrinkConfig, distance: f32) -> Result<()> {
    let mut sim = Simulation::new(config);
    sim.enable_pull_to_refresh();

    info!("Pulling to {}", distance);
    sim.drag(distance, 0.3);

    if sim.view().edge_state(Edge::Top) != Some(EdgeState::Loading) {
        warn!(
            "Released at {} without arming; the top edge arms past {}",
            distance,
            -config.refresh.top.indicator_height
        );
        sim.settle();
    } else {
        sim.settle();
        info!(
            "Holding at {} with inset {}",
            sim.view().content_offset().y,
            sim.view().content_inset().top
        );
        wait_for_idle(&mut sim, Edge::Top)?;
    }

    summary(&sim);
    Ok(())
}

fn load_pages(sim: &mut Simulation, pages: u32) -> Result<()> {
    for page in 1..=pages {
        let target = sim.load_more_offset();
        info!("Page {}: dragging to {}", page, target);
        sim.drag(target, 0.4);

        if sim.view().edge_state(Edge::Bottom) != Some(EdgeState::Loading) {
            anyhow::bail!("bottom edge did not start loading on page {}", page);
        }
        wait_for_idle(sim, Edge::Bottom)?;
        info!("Page {}: {} rows", page, sim.rows());
    }
    Ok(())
}

fn cmd_load_more(config: &BrinkConfig, pages: u32) -> Result<()> {
    let mut sim = Simulation::new(config);
    sim.enable_infinite_scrolling();

    load_pages(&mut sim, pages)?;

    summary(&sim);
    Ok(())
}

fn cmd_demo(config: &BrinkConfig, pages: u32) -> Result<()> {
    let mut sim = Simulation::new(config);
    sim.enable_pull_to_refresh();
    sim.enable_infinite_scrolling();

    let view = Rc::downgrade(sim.view());
    sim.after(1.0, move || {
        if let Some(view) = view.upgrade() {
            view.trigger(Edge::Top);
        }
    });

    info!("Refreshing in 1s");
    let started = sim.run_until(2.0, |s| {
        s.view().edge_state(Edge::Top) == Some(EdgeState::Loading)
    });
    if !started {
        anyhow::bail!("programmatic refresh did not start");
    }
    wait_for_idle(&mut sim, Edge::Top)?;

    load_pages(&mut sim, pages)?;

    summary(&sim);
    Ok(())
}

fn cmd_config(config: &BrinkConfig) -> Result<()> {
    println!("{}", config.to_toml()?);
    Ok(())
}

fn summary(sim: &Simulation) {
    let stats = sim.stats();
    info!(
        "Done after {:.2}s ({} frames): {} refreshes, {} loads, {} rows",
        sim.now(),
        stats.frames,
        stats.refreshes,
        stats.loads,
        sim.rows()
    );
}
