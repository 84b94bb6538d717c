// SPDX-License-Identifier: LGPL-3.0-or-later

//! Coefficient designers and the per-channel filter topology.
//!
//! Designers are pure functions over scalar inputs; all filter state
//! lives in [`stage::CascadeStage`] and the fixed-size containers built
//! from it. Coefficients use the pre-negated `a1`/`a2` convention
//! described in [`coeffs`].

pub mod butterworth;
pub mod chain;
pub mod coeffs;
pub mod cut_bank;
pub mod stage;
