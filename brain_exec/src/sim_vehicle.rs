//! # Simulated Vehicle
//!
//! The SimVehicle provides a simple kinematic stand-in for the real vehicle, so that the brain can
//! be run without any hardware. It is to be used for testing and development of systems rather
//! than actual flight. The SimVehicle provides:
//!
//! - The vehicle pose, reported as localised after a configurable delay - [`SimPoseHandle`].
//! - A motion command interface - [`MotionSink`].
//! - The battery cell voltage, which drains linearly with time.
//!
//! The vehicle is propagated in a background thread at a fixed rate. It flies straight towards the
//! last commanded setpoint at a bounded speed, while turning towards the setpoint heading at a
//! bounded rate.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, Receiver, Sender},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use util::maths::{clamp, get_ang_dist_2pi, wrap_2pi};

use crate::auto::{
    loc::{Pose, PoseProvider},
    motion::{MotionCmd, MotionSink, Setpoint},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulated vehicle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimParams {
    /// Starting pose as `[x, y, z, yaw]`
    pub start_pose: [f64; 4],

    /// Maximum speed towards the position setpoint
    pub max_speed_m_s: f64,

    /// Maximum turn rate towards the heading setpoint
    pub max_yaw_rate_rad_s: f64,

    /// Time after start at which the vehicle reports being localised
    pub localisation_delay_s: f64,

    /// Cell voltage at start
    pub initial_voltage_v: f64,

    /// Rate at which the cell voltage drops
    pub voltage_drain_v_s: f64,

    /// Rate at which the background thread propagates the vehicle
    pub sim_frequency_hz: f64,
}

/// The kinematic state of the simulated vehicle.
#[derive(Debug, Clone)]
pub struct SimModel {
    params: SimParams,

    pose: Pose,

    /// Last commanded setpoint, `None` until the first command.
    setpoint: Option<Setpoint>,

    elapsed_s: f64,

    voltage_v: f64,
}

/// Simulated vehicle running in a background thread.
pub struct SimVehicle {
    bg_jh: Option<JoinHandle<()>>,
    bg_run: Arc<AtomicBool>,
    model: Arc<Mutex<SimModel>>,
    cmd_sender: Sender<MotionCmd>,
}

/// Shared read only view of the simulated vehicle's pose, for use as the localisation source.
#[derive(Clone)]
pub struct SimPoseHandle {
    model: Arc<Mutex<SimModel>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            start_pose: [0.5, 0.5, 0.0, 0.0],
            max_speed_m_s: 0.5,
            max_yaw_rate_rad_s: 1.0,
            localisation_delay_s: 2.0,
            initial_voltage_v: 4.2,
            voltage_drain_v_s: 0.002,
            sim_frequency_hz: 100.0,
        }
    }
}

impl SimModel {
    pub fn new(params: SimParams) -> Self {
        let [x, y, z, yaw] = params.start_pose;

        Self {
            params,
            pose: Pose::new(x, y, z, wrap_2pi(yaw)),
            setpoint: None,
            elapsed_s: 0.0,
            voltage_v: params.initial_voltage_v,
        }
    }

    /// Apply a motion command. Repeating a command has no further effect.
    pub fn command(&mut self, cmd: &MotionCmd) {
        self.setpoint = Some(*cmd.setpoint());
    }

    /// Advance the simulation by `dt_s` seconds.
    pub fn propagate(&mut self, dt_s: f64) {
        self.elapsed_s += dt_s;
        self.voltage_v -= self.params.voltage_drain_v_s * dt_s;

        let sp = match self.setpoint {
            Some(s) => s,
            None => return,
        };

        // Position, straight line at bounded speed
        let to_target = sp.position_m - self.pose.position_m;
        let max_step = self.params.max_speed_m_s * dt_s;
        let dist = to_target.norm();

        if dist <= max_step {
            self.pose.position_m = sp.position_m;
        } else {
            self.pose.position_m += to_target * (max_step / dist);
        }

        // Heading, shortest way round at bounded rate
        let yaw_err = get_ang_dist_2pi(self.pose.yaw_rad, wrap_2pi(sp.yaw_rad));
        let max_turn = self.params.max_yaw_rate_rad_s * dt_s;

        self.pose.yaw_rad = wrap_2pi(self.pose.yaw_rad + clamp(&yaw_err, &-max_turn, &max_turn));
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn is_localised(&self) -> bool {
        self.elapsed_s >= self.params.localisation_delay_s
    }

    pub fn voltage_v(&self) -> f64 {
        self.voltage_v
    }

    pub fn setpoint(&self) -> Option<Setpoint> {
        self.setpoint
    }
}

impl SimVehicle {
    /// Start the simulated vehicle's background thread.
    pub fn new(params: SimParams) -> Self {
        let model = Arc::new(Mutex::new(SimModel::new(params)));
        let bg_run = Arc::new(AtomicBool::new(true));
        let (cmd_sender, cmd_receiver) = channel();

        let period = Duration::from_secs_f64(1.0 / params.sim_frequency_hz.max(1.0));

        let model_clone = model.clone();
        let bg_run_clone = bg_run.clone();

        let bg_jh = Some(thread::spawn(move || {
            bg_thread(model_clone, bg_run_clone, cmd_receiver, period)
        }));

        info!(
            "SimVehicle started at {:?}, localised after {} s",
            params.start_pose, params.localisation_delay_s
        );

        Self {
            bg_jh,
            bg_run,
            model,
            cmd_sender,
        }
    }

    /// Get the battery cell voltage, `None` if the simulation has failed.
    pub fn battery_voltage_v(&self) -> Option<f64> {
        self.model.lock().map(|m| m.voltage_v()).ok()
    }

    /// Get a handle through which the pose can be read independently of the vehicle.
    pub fn pose_handle(&self) -> SimPoseHandle {
        SimPoseHandle {
            model: self.model.clone(),
        }
    }

    /// Stop the background thread.
    pub fn stop(&mut self) {
        self.bg_run.store(false, Ordering::Relaxed);

        if let Some(jh) = self.bg_jh.take() {
            if jh.join().is_err() {
                warn!("SimVehicle background thread panicked");
            }
        }
    }
}

impl PoseProvider for SimPoseHandle {
    fn is_localised(&self) -> bool {
        self.model.lock().map(|m| m.is_localised()).unwrap_or(false)
    }

    fn pose(&self) -> Option<Pose> {
        self.model.lock().map(|m| m.pose()).ok()
    }
}

impl MotionSink for SimVehicle {
    fn send(&mut self, cmd: &MotionCmd) {
        if let Err(e) = self.cmd_sender.send(*cmd) {
            warn!("Could not send command to the SimVehicle: {}", e);
        }
    }
}

impl Drop for SimVehicle {
    fn drop(&mut self) {
        self.stop();
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Background thread, applies received commands and propagates the model at a fixed rate.
fn bg_thread(
    model: Arc<Mutex<SimModel>>,
    run: Arc<AtomicBool>,
    cmd_receiver: Receiver<MotionCmd>,
    period: Duration,
) {
    let mut last = Instant::now();

    while run.load(Ordering::Relaxed) {
        thread::sleep(period);

        let now = Instant::now();
        let dt_s = (now - last).as_secs_f64();
        last = now;

        let mut m = match model.lock() {
            Ok(m) => m,
            Err(_) => {
                warn!("SimVehicle model mutex poisoned, stopping");
                break;
            }
        };

        for cmd in cmd_receiver.try_iter() {
            m.command(&cmd);
        }

        m.propagate(dt_s);
    }

    debug!("SimVehicle background thread exited");
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
