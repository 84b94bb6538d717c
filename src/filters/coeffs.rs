// SPDX-License-Identifier: LGPL-3.0-or-later

//! Biquad coefficient set and the peaking-filter designer.
//!
//! Coefficients are normalized by `a0` and stored with `a1` and `a2`
//! **pre-negated** relative to the standard RBJ Audio EQ Cookbook, so
//! the processing recurrence uses addition throughout:
//! ```text
//!   y    = b0*x + d0
//!   d0   = b1*x + a1*y + d1
//!   d1   = b2*x + a2*y
//! ```
//! That is, `a1 = -a1_std / a0` and `a2 = -a2_std / a0`.

use std::f32::consts::PI;

use crate::error::DesignError;

/// Normalized coefficients for one second-order IIR section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl Default for BiquadCoeffs {
    fn default() -> Self {
        Self::identity()
    }
}

impl BiquadCoeffs {
    /// The exact pass-through coefficient set.
    pub fn identity() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    /// Evaluate the transfer function at `freq` Hz.
    ///
    /// Returns `(magnitude, phase)` where magnitude is linear (not dB)
    /// and phase is in radians.
    pub fn freq_response(&self, freq: f32, sample_rate: f32) -> (f32, f32) {
        let w = 2.0 * PI * freq / sample_rate;
        let cos_w = w.cos();
        let sin_w = w.sin();
        let cos_2w = (2.0 * w).cos();
        let sin_2w = (2.0 * w).sin();

        // Numerator: b0 + b1*e^(-jw) + b2*e^(-j2w)
        let num_re = self.b0 + self.b1 * cos_w + self.b2 * cos_2w;
        let num_im = -self.b1 * sin_w - self.b2 * sin_2w;

        // Denominator with pre-negated a1/a2: 1 - a1*e^(-jw) - a2*e^(-j2w)
        let den_re = 1.0 - self.a1 * cos_w - self.a2 * cos_2w;
        let den_im = self.a1 * sin_w + self.a2 * sin_2w;

        let den_mag_sq = den_re * den_re + den_im * den_im;
        let h_re = (num_re * den_re + num_im * den_im) / den_mag_sq;
        let h_im = (num_im * den_re - num_re * den_im) / den_mag_sq;

        let magnitude = (h_re * h_re + h_im * h_im).sqrt();
        let phase = h_im.atan2(h_re);
        (magnitude, phase)
    }
}

/// Design a peaking ("bell") equalizer biquad.
///
/// `linear_gain` is the amplitude ratio at the center frequency, i.e.
/// `10^(gain_db / 20)`. With `linear_gain == 1.0` the result is an
/// exact unity transfer function at every frequency.
///
/// # Errors
///
/// Returns [`DesignError::InvalidParameter`] when `freq` is not
/// strictly between 0 and Nyquist, or when `q` or `linear_gain` is not
/// positive. Callers are expected to clamp upstream rather than pass
/// out-of-range values through.
pub fn design_peak_filter(
    sample_rate: f32,
    freq: f32,
    q: f32,
    linear_gain: f32,
) -> Result<BiquadCoeffs, DesignError> {
    if !(freq > 0.0 && freq < sample_rate * 0.5) {
        return Err(DesignError::InvalidParameter(
            "peak frequency outside (0, Nyquist)",
        ));
    }
    if q <= 0.0 {
        return Err(DesignError::InvalidParameter("peak Q must be positive"));
    }
    if linear_gain <= 0.0 {
        return Err(DesignError::InvalidParameter(
            "peak gain must be positive",
        ));
    }

    // The cookbook's A is defined so the magnitude at the center comes
    // out as A^2, hence the square root of the requested gain.
    let a = linear_gain.sqrt();

    let w0 = 2.0 * PI * freq / sample_rate;
    let cos_w0 = w0.cos();
    let sin_w0 = w0.sin();
    let alpha = sin_w0 / (2.0 * q);

    let b0 = 1.0 + alpha * a;
    let b1 = -2.0 * cos_w0;
    let b2 = 1.0 - alpha * a;
    let a0 = 1.0 + alpha / a;
    let a1_std = -2.0 * cos_w0;
    let a2_std = 1.0 - alpha / a;

    let inv_a0 = 1.0 / a0;
    Ok(BiquadCoeffs {
        b0: b0 * inv_a0,
        b1: b1 * inv_a0,
        b2: b2 * inv_a0,
        a1: -a1_std * inv_a0,
        a2: -a2_std * inv_a0,
    })
}
