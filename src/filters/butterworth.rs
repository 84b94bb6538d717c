// SPDX-License-Identifier: LGPL-3.0-or-later

//! Even-order Butterworth cascade designer.
//!
//! An order-`2S` Butterworth filter is decomposed into `S` independent
//! second-order sections, one per conjugate pole pair. Pole pairs sit
//! at angles `theta_k = pi * (2k + 1) / (2N)` on the Butterworth circle
//! in the s-plane and are mapped to the z-plane with a bilinear
//! transform and pre-warped cutoff. The passband is maximally flat; the
//! stopband rolls off at `20 * N` dB/decade (`6 * N` dB/octave).

use std::f32::consts::PI;

use crate::error::DesignError;

use super::coeffs::BiquadCoeffs;

/// Maximum supported filter order (the steepest slope, 60 dB/oct).
pub const MAX_ORDER: usize = 10;

/// Maximum number of cascaded second-order sections (`MAX_ORDER / 2`).
pub const MAX_SECTIONS: usize = MAX_ORDER / 2;

/// Butterworth response kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutKind {
    /// High-pass: removes content below the cutoff (a "low cut").
    Highpass,
    /// Low-pass: removes content above the cutoff (a "high cut").
    Lowpass,
}

/// Fixed-capacity sequence of designed second-order sections.
///
/// Produced by [`design_butterworth_cascade`]; holds `order / 2`
/// sections without heap allocation so it can be built inside the
/// real-time callback.
#[derive(Debug, Clone, Copy)]
pub struct Cascade {
    sections: [BiquadCoeffs; MAX_SECTIONS],
    len: usize,
}

impl Cascade {
    /// Number of designed sections.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the cascade holds no sections.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The designed sections, in processing order.
    pub fn sections(&self) -> &[BiquadCoeffs] {
        &self.sections[..self.len]
    }
}

/// Design an even-order Butterworth filter as cascaded biquad sections.
///
/// `order` must be even and within `2..=`[`MAX_ORDER`]; the result
/// holds `order / 2` sections whose product realizes the full filter.
/// Each section is a true second-order IIR with no state shared across
/// sections.
///
/// # Errors
///
/// Returns [`DesignError::InvalidParameter`] for an odd, zero or
/// too-large order, or when `freq` is not strictly between 0 and
/// Nyquist. Callers are expected to clamp upstream.
pub fn design_butterworth_cascade(
    kind: CutKind,
    freq: f32,
    sample_rate: f32,
    order: usize,
) -> Result<Cascade, DesignError> {
    if order == 0 || order > MAX_ORDER || order % 2 != 0 {
        return Err(DesignError::InvalidParameter(
            "filter order must be even and within 2..=10",
        ));
    }
    if !(freq > 0.0 && freq < sample_rate * 0.5) {
        return Err(DesignError::InvalidParameter(
            "cutoff frequency outside (0, Nyquist)",
        ));
    }

    let n = order;
    // Pre-warp the cutoff for the bilinear transform.
    let wc = (PI * freq / sample_rate).tan();
    let wc2 = wc * wc;

    let mut sections = [BiquadCoeffs::identity(); MAX_SECTIONS];
    for (k, section) in sections.iter_mut().take(n / 2).enumerate() {
        let theta = PI * (2 * k + 1) as f32 / (2 * n) as f32;
        let two_sin_theta = 2.0 * theta.sin();

        // Analog prototype per pole pair: 1 / (s^2 + 2*sin(theta)*s + 1),
        // frequency-scaled by wc, then bilinear-transformed. The
        // denominator is shared between the low-pass and high-pass
        // variants; only the zeros differ.
        let d = 1.0 + two_sin_theta * wc + wc2;
        let inv_d = 1.0 / d;
        let a1_std = 2.0 * (wc2 - 1.0) * inv_d;
        let a2_std = (1.0 - two_sin_theta * wc + wc2) * inv_d;

        *section = match kind {
            CutKind::Lowpass => BiquadCoeffs {
                b0: wc2 * inv_d,
                b1: 2.0 * wc2 * inv_d,
                b2: wc2 * inv_d,
                a1: -a1_std,
                a2: -a2_std,
            },
            CutKind::Highpass => BiquadCoeffs {
                b0: inv_d,
                b1: -2.0 * inv_d,
                b2: inv_d,
                a1: -a1_std,
                a2: -a2_std,
            },
        };
    }

    Ok(Cascade {
        sections,
        len: n / 2,
    })
}
