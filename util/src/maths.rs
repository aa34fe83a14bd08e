//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;
use std::f64::consts::TAU;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Limit a value to the range `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T 
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Get the signed angular distance between two angles in the range of [0, 2pi].
///
/// This function will return the shortest signed distance between a and b accounting for wrapping
/// between 0 and 2pi.
pub fn get_ang_dist_2pi(a: f64, b: f64) -> f64 {
    let c = (a - b).rem_euclid(TAU);
    let d = (b - a).rem_euclid(TAU);

    if c < d {
        -c
    }
    else {
        d
    }
}

/// Wrap any angle into the range [0, 2pi).
pub fn wrap_2pi(value: f64) -> f64 {
    let r = value.rem_euclid(TAU);

    // rem_euclid can round up to exactly TAU for tiny negative values
    if r >= TAU {
        0.0
    }
    else {
        r
    }
}
