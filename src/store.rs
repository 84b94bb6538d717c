// SPDX-License-Identifier: LGPL-3.0-or-later

//! Lock-free shared parameter storage.
//!
//! A [`ParamStore`] is the hand-off point between the control surface
//! and the audio thread: the writer updates individual knobs, the audio
//! thread reads a whole [`EqParams`] snapshot once per block. Every
//! field is an individually atomic word, so reads and writes are
//! wait-free and never block either thread. A snapshot may interleave
//! values from two adjacent writes; the once-per-block refresh cadence
//! tolerates that, and each value on its own is always valid.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use tracing::debug;

use crate::params::{EqParams, Slope};

/// `f32` stored as its bit pattern in an [`AtomicU32`].
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Shared parameter store, one atomic word per parameter.
///
/// Share it between threads with an `Arc`; the engine keeps one handle
/// and the control surface another.
#[derive(Debug)]
pub struct ParamStore {
    low_cut_freq: AtomicF32,
    low_cut_slope: AtomicU8,
    bell_freq: AtomicF32,
    bell_gain_db: AtomicF32,
    bell_q: AtomicF32,
    high_cut_freq: AtomicF32,
    high_cut_slope: AtomicU8,
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new(EqParams::default())
    }
}

impl ParamStore {
    /// Create a store holding `params`.
    pub fn new(params: EqParams) -> Self {
        Self {
            low_cut_freq: AtomicF32::new(params.low_cut_freq),
            low_cut_slope: AtomicU8::new(params.low_cut_slope.index() as u8),
            bell_freq: AtomicF32::new(params.bell_freq),
            bell_gain_db: AtomicF32::new(params.bell_gain_db),
            bell_q: AtomicF32::new(params.bell_q),
            high_cut_freq: AtomicF32::new(params.high_cut_freq),
            high_cut_slope: AtomicU8::new(params.high_cut_slope.index() as u8),
        }
    }

    /// Read a snapshot of all parameters. Wait-free, never blocks.
    pub fn snapshot(&self) -> EqParams {
        EqParams {
            low_cut_freq: self.low_cut_freq.load(),
            low_cut_slope: load_slope(&self.low_cut_slope),
            bell_freq: self.bell_freq.load(),
            bell_gain_db: self.bell_gain_db.load(),
            bell_q: self.bell_q.load(),
            high_cut_freq: self.high_cut_freq.load(),
            high_cut_slope: load_slope(&self.high_cut_slope),
        }
    }

    /// Overwrite every parameter from `params`.
    ///
    /// Used when restoring persisted state; individual knob movements
    /// go through the per-band setters instead.
    pub fn store(&self, params: &EqParams) {
        self.set_low_cut(params.low_cut_freq, params.low_cut_slope);
        self.set_bell(params.bell_freq, params.bell_gain_db, params.bell_q);
        self.set_high_cut(params.high_cut_freq, params.high_cut_slope);
        debug!(?params, "parameter store replaced");
    }

    /// Update the low-cut band.
    pub fn set_low_cut(&self, freq: f32, slope: Slope) {
        self.low_cut_freq.store(freq);
        self.low_cut_slope.store(slope.index() as u8, Ordering::Relaxed);
    }

    /// Update the bell band.
    pub fn set_bell(&self, freq: f32, gain_db: f32, q: f32) {
        self.bell_freq.store(freq);
        self.bell_gain_db.store(gain_db);
        self.bell_q.store(q);
    }

    /// Update the high-cut band.
    pub fn set_high_cut(&self, freq: f32, slope: Slope) {
        self.high_cut_freq.store(freq);
        self.high_cut_slope.store(slope.index() as u8, Ordering::Relaxed);
    }
}

/// Decode a stored slope index.
///
/// Only valid indices are ever stored, but a corrupt value must not
/// take down the audio thread, so decoding falls back to the gentlest
/// slope.
fn load_slope(cell: &AtomicU8) -> Slope {
    Slope::from_index(cell.load(Ordering::Relaxed) as usize).unwrap_or(Slope::Db12)
}
