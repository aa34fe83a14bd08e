//! # Autonomy Module
//!
//! This module provides the autonomy of the vehicle, allowing it to explore the airspace by
//! itself: selecting goals, planning collision free paths to them and sequencing the flight.

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use flight_mgr::FlightMgr;

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Battery monitor - raises the must land flag when the charge runs low
pub mod battery;

/// Goal selection - chooses where the vehicle should fly to next
pub mod explore;

/// Flight Manager module
pub mod flight_mgr;

/// Localisation module - provides the vehicle with an idea of where it is in the world
pub mod loc;

/// Map module - provides the airspace map and its occupancy grid
pub mod map;

/// Motion commands sent to the vehicle
pub mod motion;

/// Navigation module - provides path planning using RRT
pub mod nav;

/// Defines path types
pub mod path;
