// SPDX-License-Identifier: LGPL-3.0-or-later

//! Gain unit conversions.

/// Convert decibels to a linear amplitude gain.
///
/// # Arguments
/// * `db` - Gain in decibels
///
/// # Returns
/// Linear amplitude ratio (`10^(db / 20)`)
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert a linear amplitude gain to decibels.
///
/// # Arguments
/// * `gain` - Linear amplitude ratio (must be > 0)
///
/// # Returns
/// Gain in decibels (`20 * log10(gain)`)
#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    20.0 * gain.log10()
}
