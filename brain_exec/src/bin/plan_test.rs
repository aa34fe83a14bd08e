//! # Planning Test
//!
//! This binary plans a single path across a map file, without requiring the vehicle or the rest
//! of the flight software. The tree, the resulting path and the map's occupancy grid are saved in
//! the session for inspection.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;

use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};
use nalgebra::Point2;
use structopt::StructOpt;

use brain_lib::auto::{
    map::{AirspaceMap, MapParams},
    nav::{RrtParams, RrtPlanner},
};
use util::{
    logger::{logger_init, LevelFilter},
    session::{self, Session},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Plan a path between two points of a map.
#[derive(Debug, StructOpt)]
#[structopt(name = "plan_test")]
struct Args {
    /// Path to the map file
    map: PathBuf,

    /// Start point as `x y`
    #[structopt(long, required = true, number_of_values = 2, allow_hyphen_values = true)]
    start: Vec<f64>,

    /// Goal point as `x y`
    #[structopt(long, required = true, number_of_values = 2, allow_hyphen_values = true)]
    goal: Vec<f64>,

    /// Seed for the planner's random number generator
    #[structopt(long)]
    seed: Option<u64>,

    /// Maximum number of planner iterations
    #[structopt(long, default_value = "5000")]
    max_iterations: usize,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("plan_test", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Planning Test\n");

    // ---- LOAD MAP ----

    let map = AirspaceMap::load(&args.map, MapParams::default())
        .wrap_err_with(|| format!("Failed to load the map {:?}", args.map))?;

    session::save("occupancy/occupancy_grid.json", map.occupancy_grid().clone());

    // ---- PLAN ----

    let start = Point2::new(args.start[0], args.start[1]);
    let goal = Point2::new(args.goal[0], args.goal[1]);

    let mut planner = RrtPlanner::new(RrtParams {
        max_iterations: args.max_iterations,
        seed: args.seed,
        save_reports: true,
        ..Default::default()
    });

    match planner.plan(start, goal, &map) {
        Ok(path) => info!(
            "Found a path of {} points, {:.2} m long",
            path.len(),
            path.length_m(&start)
        ),
        Err(e) => warn!("Planning failed: {}", e),
    }

    session.exit();

    Ok(())
}
