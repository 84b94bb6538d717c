// SPDX-License-Identifier: LGPL-3.0-or-later

//! # channel-eq
//!
//! Real-time signal path of a three-band parametric equalizer: a
//! low-cut Butterworth filter bank, a peaking ("bell") filter and a
//! high-cut Butterworth filter bank, cascaded per channel.
//!
//! - **Designers**: RBJ peaking biquad and even-order Butterworth
//!   cascades ([`filters::coeffs`], [`filters::butterworth`])
//! - **Topology**: fixed 5 + 1 + 5 stage chain per channel with
//!   bypass-driven slope selection ([`filters::cut_bank`],
//!   [`filters::chain`])
//! - **Engine**: stereo [`engine::Equalizer`] refreshing coefficients
//!   once per block from a lock-free [`store::ParamStore`]
//!
//! The audio path performs no heap allocation and takes no locks;
//! parameter writes and audio processing may run on different threads.

pub mod engine;
pub mod error;
pub mod filters;
pub mod params;
pub mod store;
pub mod units;
