//! # Battery monitor
//!
//! Converts the battery voltage into an estimate of the remaining charge and raises the "must
//! land" flag once the charge drops below a threshold. The flag is sticky, a recovering voltage
//! (for example once the motors stop drawing current) never clears it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use util::{maths::lin_map, module::State, session::Session};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BatteryParams {
    /// Voltage of an empty battery.
    pub min_voltage_v: f64,

    /// Voltage of a full battery.
    pub max_voltage_v: f64,

    /// Remaining charge below which the vehicle must land.
    pub land_threshold_pct: f64,
}

#[derive(Debug, Default)]
pub struct BatteryMonitor {
    params: Option<BatteryParams>,

    must_land: bool,

    last_charge_pct: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BatteryStatusReport {
    /// Charge estimate from the latest voltage sample, if there was one this cycle.
    pub charge_pct: Option<f64>,

    /// Set on the cycle in which the must land flag was first raised.
    pub must_land_raised: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum BatteryError {
    #[error("Invalid battery voltage range {0} V to {1} V")]
    InvalidVoltageRange(f64, f64),

    #[error("The BatteryMonitor has not been initialised")]
    NotInit,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for BatteryParams {
    fn default() -> Self {
        Self {
            min_voltage_v: 3.0,
            max_voltage_v: 4.23,
            land_threshold_pct: 30.0,
        }
    }
}

impl BatteryParams {
    /// Estimated remaining charge for the given voltage. Not clamped, so an overcharged or
    /// depleted battery reads above 100 % or below 0 %.
    pub fn charge_pct(&self, voltage_v: f64) -> f64 {
        lin_map(
            (self.min_voltage_v, self.max_voltage_v),
            (0.0, 100.0),
            voltage_v,
        )
    }
}

impl BatteryMonitor {
    /// Build an initialised monitor from parameters.
    pub fn new(params: BatteryParams) -> Result<Self, BatteryError> {
        let mut monitor = Self::default();
        monitor.init(params, None)?;
        Ok(monitor)
    }

    /// True once the charge has dropped below the landing threshold.
    pub fn must_land(&self) -> bool {
        self.must_land
    }

    pub fn last_charge_pct(&self) -> Option<f64> {
        self.last_charge_pct
    }
}

impl State for BatteryMonitor {
    type InitData = BatteryParams;
    type InitError = BatteryError;

    type InputData = Option<f64>;
    type OutputData = bool;
    type StatusReport = BatteryStatusReport;
    type ProcError = BatteryError;

    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: Option<&Session>,
    ) -> Result<(), Self::InitError> {
        if !(init_data.max_voltage_v > init_data.min_voltage_v) {
            return Err(BatteryError::InvalidVoltageRange(
                init_data.min_voltage_v,
                init_data.max_voltage_v,
            ));
        }

        self.params = Some(init_data);
        self.must_land = false;
        self.last_charge_pct = None;

        Ok(())
    }

    /// Process the latest voltage sample, `None` if no sample was received this cycle.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let params = self.params.ok_or(BatteryError::NotInit)?;

        let mut report = BatteryStatusReport::default();

        if let Some(voltage_v) = input_data {
            let charge_pct = params.charge_pct(*voltage_v);
            debug!("Battery at {:.2} V ({:.1} %)", voltage_v, charge_pct);

            if !self.must_land && charge_pct < params.land_threshold_pct {
                warn!(
                    "Battery charge {:.1} % is below {:.1} %, vehicle must land",
                    charge_pct, params.land_threshold_pct
                );
                self.must_land = true;
                report.must_land_raised = true;
            }

            report.charge_pct = Some(charge_pct);
            self.last_charge_pct = Some(charge_pct);
        }

        Ok((self.must_land, report))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_charge_pct() {
        let params = BatteryParams::default();

        assert!((params.charge_pct(3.0) - 0.0).abs() < 1e-9);
        assert!((params.charge_pct(4.23) - 100.0).abs() < 1e-9);
        assert!((params.charge_pct(3.615) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_must_land_is_sticky() {
        let mut monitor = BatteryMonitor::new(BatteryParams::default()).unwrap();

        // 4.0 V is about 81 %
        let (must_land, report) = monitor.proc(&Some(4.0)).unwrap();
        assert!(!must_land);
        assert!(report.charge_pct.unwrap() > 80.0);

        // Missing samples change nothing
        assert!(!monitor.proc(&None).unwrap().0);

        // 3.3 V is about 24 %
        let (must_land, report) = monitor.proc(&Some(3.3)).unwrap();
        assert!(must_land);
        assert!(report.must_land_raised);

        // Voltage recovers but the flag stays raised
        let (must_land, report) = monitor.proc(&Some(4.2)).unwrap();
        assert!(must_land);
        assert!(!report.must_land_raised);
        assert!(monitor.must_land());
    }

    #[test]
    fn test_init_errors() {
        assert!(matches!(
            BatteryMonitor::new(BatteryParams {
                min_voltage_v: 4.0,
                max_voltage_v: 3.0,
                land_threshold_pct: 30.0
            }),
            Err(BatteryError::InvalidVoltageRange(_, _))
        ));

        let mut monitor = BatteryMonitor::default();
        assert!(matches!(monitor.proc(&Some(4.0)), Err(BatteryError::NotInit)));
    }
}
