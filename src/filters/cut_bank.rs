// SPDX-License-Identifier: LGPL-3.0-or-later

//! Cut filter bank: five stages with a slope-selected active prefix.
//!
//! The bank always owns [`MAX_SECTIONS`] stages so the topology is
//! fixed-size and configuration never allocates. A slope of `S`
//! sections activates stages `0..S` and bypasses the rest; the active
//! prefix jointly realizes a Butterworth high-pass or low-pass of order
//! `2S`.

use crate::error::DesignError;
use crate::params::Slope;

use super::butterworth::{Cascade, MAX_SECTIONS};
use super::stage::CascadeStage;

/// Ordered bank of up to [`MAX_SECTIONS`] active cascade stages.
///
/// Stages past the active prefix stay allocated but bypassed; their
/// delay state is frozen and their (stale) coefficients are never
/// applied to live audio.
#[derive(Debug, Clone)]
pub struct CutFilterBank {
    stages: [CascadeStage; MAX_SECTIONS],
}

impl Default for CutFilterBank {
    fn default() -> Self {
        Self::new()
    }
}

impl CutFilterBank {
    /// Create a bank with every stage bypassed (identity).
    pub fn new() -> Self {
        let mut stages: [CascadeStage; MAX_SECTIONS] =
            std::array::from_fn(|_| CascadeStage::new());
        for stage in &mut stages {
            stage.set_bypassed(true);
        }
        Self { stages }
    }

    /// Assign `cascade` to the active prefix and bypass the remainder.
    ///
    /// Stage `i` receives `cascade.sections()[i]` and is activated for
    /// `i < slope.sections()`; later stages are bypassed without
    /// touching their coefficients or delay state.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidParameter`] when the cascade
    /// length does not match the slope's section count. The engine
    /// always designs the cascade from the same slope, so in practice
    /// this is unreachable, but it must not panic.
    pub fn configure(&mut self, slope: Slope, cascade: &Cascade) -> Result<(), DesignError> {
        if cascade.len() != slope.sections() {
            return Err(DesignError::InvalidParameter(
                "cascade length does not match slope",
            ));
        }

        let sections = cascade.sections();
        for (i, stage) in self.stages.iter_mut().enumerate() {
            if i < sections.len() {
                stage.set_coefficients(sections[i]);
                stage.set_bypassed(false);
            } else {
                stage.set_bypassed(true);
            }
        }
        Ok(())
    }

    /// Number of active (non-bypassed) stages.
    pub fn active_stages(&self) -> usize {
        self.stages.iter().filter(|s| !s.is_bypassed()).count()
    }

    /// Zero the delay state of every stage.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    /// Run the block through the stages in order, in place.
    ///
    /// Bypassed stages are no-ops, so the net effect is exactly the
    /// active prefix applied in cascade.
    pub fn process_inplace(&mut self, buf: &mut [f32]) {
        for stage in &mut self.stages {
            stage.process_inplace(buf);
        }
    }

    /// Combined transfer function of the active stages at `freq`.
    ///
    /// Unity when every stage is bypassed.
    pub fn freq_response(&self, freq: f32, sample_rate: f32) -> (f32, f32) {
        let mut mag = 1.0_f32;
        let mut phase = 0.0_f32;
        for stage in &self.stages {
            let (m, p) = stage.freq_response(freq, sample_rate);
            mag *= m;
            phase += p;
        }
        (mag, phase)
    }
}
