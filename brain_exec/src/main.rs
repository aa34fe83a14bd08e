//! Main brain executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Load the airspace map and publish its occupancy grid
//!     - Initialise all modules
//!     - Main loop:
//!         - System input acquisition:
//!             - Pose from localisation
//!             - Battery voltage
//!         - Battery monitoring
//!         - Flight management:
//!             - Goal selection
//!             - Path planning
//!             - Flight sequencing
//!         - Motion command output
//!         - Telemetry saving
//!
//! # Modules
//!
//! Cyclic modules (e.g. `battery`) shall provide a public struct implementing the
//! `util::module::State` trait.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use brain_lib::{
    auto::{
        battery::BatteryMonitor,
        explore::{Explorer, ExplorerParams, GoalList, GoalSelector},
        flight_mgr::{FlightCtx, FlightMgr, FlightMgrParams, FlightState},
        loc::LocMgr,
        map::{AirspaceMap, MapParams},
        motion::MotionSink,
    },
    sim_vehicle::{SimParams, SimVehicle},
};

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use nalgebra::Point2;
use std::{
    path::PathBuf,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};
use structopt::StructOpt;

// Internal
use params::BrainExecParams;
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Autonomous exploration of an airspace.
#[derive(Debug, StructOpt)]
#[structopt(name = "brain_exec")]
struct Args {
    /// Name of the map in the `maps` directory (without `.world.json`), or a path to a map file
    map: String,

    /// Spacing of the occupancy grid and the explorer lattice
    #[structopt(long, default_value = "0.05")]
    discretization: f64,

    /// Clearance margin added around every obstacle, on top of the vehicle's half width
    #[structopt(long, default_value = "0.1")]
    expansion_factor: f64,

    /// Range within which the vehicle's cameras see the airspace
    #[structopt(long, default_value = "0.85")]
    render_distance: f64,

    /// Minimum level of log messages, at least `info`
    #[structopt(long, default_value = "debug")]
    log_level: LevelFilter,

    /// Seed for the planner's random number generator
    #[structopt(long)]
    seed: Option<u64>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("brain_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(args.log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Brain Executable\n");
    info!("Running on: {}", host::get_hostname());
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", args);

    // ---- LOAD PARAMETERS ----

    let exec_params: BrainExecParams =
        util::params::load("brain_exec.toml").wrap_err("Could not load brain_exec params")?;

    let mut flight_params: FlightMgrParams =
        util::params::load("flight_mgr.toml").wrap_err("Could not load flight_mgr params")?;
    if args.seed.is_some() {
        flight_params.rrt.seed = args.seed;
    }

    let sim_params: SimParams =
        util::params::load("sim.toml").wrap_err("Could not load sim params")?;

    info!("Exec parameters loaded");

    // ---- LOAD MAP ----

    let map_path = resolve_map_path(&args.map)?;
    info!("Loading map from {:?}", map_path);

    let map = Arc::new(
        AirspaceMap::load(
            &map_path,
            MapParams {
                clearance_m: args.expansion_factor,
                grid_resolution_m: args.discretization,
                ..Default::default()
            },
        )
        .wrap_err_with(|| format!("Failed to load the map {:?}", map_path))?,
    );

    info!(
        "Map loaded: {} obstacles, {:.1} % of the airspace occupied\n",
        map.obstacles().len(),
        map.occupancy_grid().occupied_fraction() * 100.0
    );

    publish_occupancy(&map, false);

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let goal_selector: Box<dyn GoalSelector> = if exec_params.goals.is_empty() {
        info!("No goals given, exploring the airspace");
        Box::new(
            Explorer::new(
                &map,
                ExplorerParams {
                    discretisation_m: args.discretization,
                    render_distance_m: args.render_distance,
                },
            )
            .wrap_err("Failed to initialise the Explorer")?,
        )
    } else {
        info!("Flying to {} fixed goals", exec_params.goals.len());
        Box::new(GoalList::new(
            exec_params.goals.iter().map(|g| Point2::new(g[0], g[1])),
        ))
    };

    let mut flight_mgr = FlightMgr::new(flight_params, map.clone(), goal_selector)
        .wrap_err("Failed to initialise FlightMgr")?;
    info!("FlightMgr init complete");

    let mut battery = BatteryMonitor::default();
    battery
        .init(
            util::params::load("battery.toml").wrap_err("Could not load battery params")?,
            Some(&session),
        )
        .wrap_err("Failed to initialise BatteryMonitor")?;
    info!("BatteryMonitor init complete");

    let mut vehicle = SimVehicle::new(sim_params);
    let loc_mgr = LocMgr::new(Box::new(vehicle.pose_handle()));
    info!("SimVehicle init complete");

    info!("Module initialisation complete\n");

    // ---- STARTUP PAUSE ----

    info!("Waiting {} s before starting", exec_params.startup_pause_s);
    thread::sleep(Duration::from_secs_f64(exec_params.startup_pause_s.max(0.0)));

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(util::time::period_s(exec_params.cycle_frequency_hz));
    let mut last_tm_save_s = f64::NEG_INFINITY;
    let mut last_occupancy_publish_s = session::get_elapsed_seconds();

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- DATA INPUT ----

        let pose = loc_mgr.get_pose();
        let voltage_v = vehicle.battery_voltage_v();

        // ---- BATTERY MONITORING ----

        let must_land = match battery.proc(&voltage_v) {
            Ok((must_land, _report)) => must_land,
            Err(e) => {
                warn!("BatteryMonitor error, assuming the vehicle must land: {}", e);
                true
            }
        };

        // ---- FLIGHT MANAGEMENT ----

        let out = flight_mgr.step(&FlightCtx { pose, must_land });

        if let Some(cmd) = out.cmd {
            vehicle.send(&cmd);
        }

        // ---- TELEMETRY ----

        let elapsed_s = session::get_elapsed_seconds();

        if elapsed_s - last_tm_save_s >= exec_params.tm_save_period_s {
            session::save_with_timestamp("flight_tm/flight_tm.json", flight_mgr.get_tm());
            last_tm_save_s = elapsed_s;
        }

        if elapsed_s - last_occupancy_publish_s >= exec_params.occupancy_publish_period_s {
            publish_occupancy(&map, true);
            last_occupancy_publish_s = elapsed_s;
        }

        if out.state == FlightState::EmergencyLanding {
            info!("Emergency landing, stopping");
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        // Get the end time of the cycle
        let cycle_dur = Instant::now() - cycle_start_instant;

        // Sleep for the rest of the cycle, or warn if it overran
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            ),
        }
    }

    // ---- SHUTDOWN ----

    session.save("flight_tm/flight_tm_final.json", flight_mgr.get_tm());
    vehicle.stop();

    info!("End of execution");

    session.exit();

    Ok(())
}

/// Find the map file, either as a direct path or by name in the software root's `maps` directory.
fn resolve_map_path(map: &str) -> Result<PathBuf, Report> {
    let direct = PathBuf::from(map);
    if direct.extension().is_some() {
        return Ok(direct);
    }

    let mut path = host::get_sw_root()
        .map_err(|_| eyre!("The {} environment variable is not set", host::SW_ROOT_ENV_VAR))?;
    path.push("maps");
    path.push(format!("{}.world.json", map));

    Ok(path)
}

/// Hand the occupancy grid over to the session's save thread as JSON and as an image.
fn publish_occupancy(map: &AirspaceMap, timestamped: bool) {
    let grid = map.occupancy_grid();

    if timestamped {
        session::save_with_timestamp("occupancy/occupancy_grid.json", grid.clone());
    } else {
        session::save("occupancy/occupancy_grid.json", grid.clone());
    }

    match grid.to_png() {
        Ok(png) => session::save_raw("occupancy/occupancy_grid.png", png),
        Err(e) => warn!("Could not render the occupancy grid: {}", e),
    }
}
