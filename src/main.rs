use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use timeloom::simpacks::{life, LifeState};
use timeloom::{Path, Rounding, Simulation};

#[derive(Parser, Debug)]
#[command(name = "timeloom", about = "Branching simulation history demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the Life simpack, fork mid-history, and show both branch tips.
    Life {
        /// Board width in cells.
        #[arg(long, default_value_t = 12)]
        width: usize,
        /// Board height in cells.
        #[arg(long, default_value_t = 12)]
        height: usize,
        /// Generations to simulate on the trunk.
        #[arg(long, default_value_t = 30)]
        steps: usize,
        /// Generation at which to fork a divergent branch.
        #[arg(long, default_value_t = 10)]
        fork_at: i64,
    },
    /// Report the recorded time segment of a Life run against a window.
    Segment {
        /// Generations to simulate.
        #[arg(long, default_value_t = 20)]
        steps: usize,
        /// Window start time.
        start: f64,
        /// Window end time.
        end: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Life {
            width,
            height,
            steps,
            fork_at,
        } => run_life(width, height, steps, fork_at)?,
        Commands::Segment { steps, start, end } => run_segment(steps, start, end)?,
    }
    Ok(())
}

fn run_life(width: usize, height: usize, steps: usize, fork_at: i64) -> Result<()> {
    if fork_at < 0 || fork_at as usize >= steps {
        bail!("fork generation {fork_at} must lie inside the run of {steps} steps");
    }

    let mut sim = Simulation::new(life::step);
    let root = sim.begin(LifeState::glider(width, height));
    sim.simulate(root, steps)
        .context("failed to grow the trunk")?;

    // Pin the trunk's route before any fork exists, then diverge from a
    // perturbed copy of the chosen generation.
    let mut trunk = Path::new(root);
    let fork_node = trunk
        .get(sim.tree(), fork_at)
        .context("fork generation not on the trunk")?;
    for _ in trunk.iter(sim.tree()) {}

    let mut perturbed = sim.tree().node(fork_node)?.state().clone();
    perturbed.set(0, 0, true);
    let branch_start = sim.tree_mut().attach_child(fork_node, perturbed)?;
    let remaining = steps - fork_at as usize;
    let branch_tip = sim.simulate(branch_start, remaining)?;

    let mut branch = Path::new(root);
    branch.decide(fork_node, branch_start);

    let trunk_tip = trunk.last_node(sim.tree(), None)?;
    println!(
        "trunk: {} nodes, tip clock {}",
        trunk.length(sim.tree())?,
        sim.tree().clock(trunk_tip)?
    );
    println!("{}", sim.tree().node(trunk_tip)?.state());
    println!(
        "branch (forked at generation {fork_at}): {} nodes, tip clock {}",
        branch.length(sim.tree())?,
        sim.tree().clock(branch_tip)?
    );
    println!("{}", sim.tree().node(branch_tip)?.state());

    let midpoint = steps as f64 / 2.0;
    let near = trunk.by_clock(sim.tree(), midpoint, Rounding::Closest)?;
    if let Some(node) = near.single() {
        println!(
            "closest trunk node to clock {midpoint}: {} at clock {}",
            node,
            sim.tree().clock(node)?
        );
    }
    Ok(())
}

fn run_segment(steps: usize, start: f64, end: f64) -> Result<()> {
    let mut sim = Simulation::new(life::step);
    let root = sim.begin(LifeState::glider(10, 10));
    sim.simulate(root, steps)?;

    let mut path = Path::new(root);
    match path.existing_time_segment(sim.tree(), start, end)? {
        Some((lo, hi)) => println!("recorded segment inside [{start}, {end}]: [{lo}, {hi}]"),
        None => println!("no recorded history inside [{start}, {end}]"),
    }
    Ok(())
}
