// SPDX-License-Identifier: LGPL-3.0-or-later

//! Per-channel processing chain.

use super::cut_bank::CutFilterBank;
use super::stage::CascadeStage;

/// The fixed pipeline for one audio channel: low-cut bank, bell stage,
/// high-cut bank, applied strictly in that order, in place.
///
/// Eleven stages in total (5 + 1 + 5); stages are never added or
/// removed, only their coefficients and bypass flags change. The bell
/// stage is always active.
#[derive(Debug, Clone)]
pub struct ChannelChain {
    pub(crate) low_cut: CutFilterBank,
    pub(crate) bell: CascadeStage,
    pub(crate) high_cut: CutFilterBank,
}

impl Default for ChannelChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelChain {
    /// Create a transparent chain: both banks bypassed, bell at unity.
    pub fn new() -> Self {
        Self {
            low_cut: CutFilterBank::new(),
            bell: CascadeStage::new(),
            high_cut: CutFilterBank::new(),
        }
    }

    /// Zero the delay state of all eleven stages.
    pub fn reset(&mut self) {
        self.low_cut.reset();
        self.bell.reset();
        self.high_cut.reset();
    }

    /// Process one channel's block in place.
    pub fn process_inplace(&mut self, buf: &mut [f32]) {
        self.low_cut.process_inplace(buf);
        self.bell.process_inplace(buf);
        self.high_cut.process_inplace(buf);
    }

    /// Combined transfer function of the whole chain at `freq`.
    pub fn freq_response(&self, freq: f32, sample_rate: f32) -> (f32, f32) {
        let (m_low, p_low) = self.low_cut.freq_response(freq, sample_rate);
        let (m_bell, p_bell) = self.bell.freq_response(freq, sample_rate);
        let (m_high, p_high) = self.high_cut.freq_response(freq, sample_rate);
        (m_low * m_bell * m_high, p_low + p_bell + p_high)
    }
}
