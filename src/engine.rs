// SPDX-License-Identifier: LGPL-3.0-or-later

//! Stereo equalizer engine.
//!
//! Owns one [`ChannelChain`] per channel and refreshes all stage
//! coefficients once per block from the shared parameter store before
//! audio flows through. Left and right always share coefficients.
//!
//! The processing path is bounded-time and allocation-free: designers
//! write into fixed-capacity containers, stages are preallocated, and
//! the parameter snapshot is a wait-free atomic read.

use std::sync::Arc;

use tracing::debug;

use crate::filters::butterworth::{design_butterworth_cascade, Cascade, CutKind};
use crate::filters::chain::ChannelChain;
use crate::filters::coeffs::{design_peak_filter, BiquadCoeffs};
use crate::params::EqParams;
use crate::store::ParamStore;
use crate::units::db_to_gain;

/// Stereo three-band equalizer.
///
/// Lifecycle: construct, [`prepare`](Equalizer::prepare), then call
/// [`process`](Equalizer::process) from the audio callback. `prepare`
/// must run again whenever the host changes the sample rate or the
/// maximum block size; it resets the filter delay state.
pub struct Equalizer {
    params: Arc<ParamStore>,
    left: ChannelChain,
    right: ChannelChain,
    sample_rate: f32,
    max_block_size: usize,
    prepared: bool,
}

impl Equalizer {
    /// Create an engine reading its parameters from `params`.
    pub fn new(params: Arc<ParamStore>) -> Self {
        Self {
            params,
            left: ChannelChain::new(),
            right: ChannelChain::new(),
            sample_rate: 0.0,
            max_block_size: 0,
            prepared: false,
        }
    }

    /// Reset all filter state and record the processing format.
    ///
    /// Idempotent. Coefficients are refreshed immediately so the first
    /// block after preparation already reflects current parameters.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        assert!(sample_rate > 0.0, "sample rate must be positive");
        assert!(max_block_size > 0, "maximum block size must be positive");

        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.left.reset();
        self.right.reset();
        self.prepared = true;

        let snapshot = self.params.snapshot();
        self.update_from_parameters(&snapshot);
        debug!(sample_rate, max_block_size, "equalizer prepared");
    }

    /// True once [`prepare`](Equalizer::prepare) has run.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Sample rate recorded by the last `prepare` call.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Recompute all stage coefficients from `params`.
    ///
    /// Values are clamped to their declared ranges first, so the
    /// designers cannot fail for any input; both channel chains receive
    /// identical coefficients. This runs automatically at the start of
    /// every [`process`](Equalizer::process) call; hosts only call it
    /// directly to apply freshly restored state before the next block
    /// is due.
    pub fn update_from_parameters(&mut self, params: &EqParams) {
        // Before prepare there is no sample rate to design against; the
        // prepare call itself refreshes coefficients.
        if !self.prepared {
            return;
        }

        let p = params.clamped_for(self.sample_rate);

        let designed = design_all(self.sample_rate, &p);
        let Some((bell, low, high)) = designed else {
            // Unreachable once clamped; keep the previous coefficients.
            debug_assert!(false, "filter design failed for clamped parameters");
            return;
        };

        for chain in [&mut self.left, &mut self.right] {
            chain.bell.set_coefficients(bell);
            let low_ok = chain.low_cut.configure(p.low_cut_slope, &low).is_ok();
            let high_ok = chain.high_cut.configure(p.high_cut_slope, &high).is_ok();
            debug_assert!(low_ok && high_ok, "cascade length mismatched its slope");
        }
    }

    /// Process one stereo block in place.
    ///
    /// Takes the current parameter snapshot, refreshes coefficients,
    /// then runs each channel chain. Bounded time in the block length,
    /// no allocation, no locks.
    ///
    /// # Panics
    ///
    /// Panics if called before [`prepare`](Equalizer::prepare), or if
    /// the channel buffers differ in length. Both indicate host
    /// integration bugs, not runtime conditions.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        assert!(
            self.prepared,
            "Equalizer::process called before prepare"
        );
        assert_eq!(
            left.len(),
            right.len(),
            "channel buffers must have equal length"
        );
        debug_assert!(
            left.len() <= self.max_block_size,
            "block exceeds the prepared maximum size"
        );

        let snapshot = self.params.snapshot();
        self.update_from_parameters(&snapshot);

        self.left.process_inplace(left);
        self.right.process_inplace(right);
    }

    /// Combined transfer function of the current coefficients at `freq`.
    ///
    /// Both channels share coefficients, so one curve describes the
    /// whole equalizer. Returns `(magnitude, phase)`, magnitude linear,
    /// phase in radians. Intended for response-curve rendering outside
    /// the audio thread.
    pub fn freq_response(&self, freq: f32) -> (f32, f32) {
        if !self.prepared {
            return (1.0, 0.0);
        }
        self.left.freq_response(freq, self.sample_rate)
    }
}

/// Design the bell biquad and both cut cascades for a clamped snapshot.
fn design_all(
    sample_rate: f32,
    p: &EqParams,
) -> Option<(BiquadCoeffs, Cascade, Cascade)> {
    let bell = design_peak_filter(
        sample_rate,
        p.bell_freq,
        p.bell_q,
        db_to_gain(p.bell_gain_db),
    )
    .ok()?;
    let low = design_butterworth_cascade(
        CutKind::Highpass,
        p.low_cut_freq,
        sample_rate,
        p.low_cut_slope.order(),
    )
    .ok()?;
    let high = design_butterworth_cascade(
        CutKind::Lowpass,
        p.high_cut_freq,
        sample_rate,
        p.high_cut_slope.order(),
    )
    .ok()?;
    Some((bell, low, high))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Slope;

    const SR: f32 = 48000.0;
    const BLOCK: usize = 512;

    fn engine_with(params: EqParams) -> Equalizer {
        let store = Arc::new(ParamStore::new(params));
        let mut eq = Equalizer::new(store);
        eq.prepare(SR, BLOCK);
        eq
    }

    fn sine(freq: f32, len: usize, phase_offset: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let n = (i + phase_offset) as f32;
                (2.0 * std::f32::consts::PI * freq * n / SR).sin() * 0.5
            })
            .collect()
    }

    fn rms(buf: &[f32]) -> f32 {
        (buf.iter().map(|x| x * x).sum::<f32>() / buf.len() as f32).sqrt()
    }

    #[test]
    #[should_panic(expected = "before prepare")]
    fn process_before_prepare_is_a_lifecycle_bug() {
        let mut eq = Equalizer::new(Arc::new(ParamStore::default()));
        let mut left = [0.0f32; 16];
        let mut right = [0.0f32; 16];
        eq.process(&mut left, &mut right);
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn mismatched_channel_lengths_are_a_host_bug() {
        let mut eq = engine_with(EqParams::default());
        let mut left = [0.0f32; 16];
        let mut right = [0.0f32; 8];
        eq.process(&mut left, &mut right);
    }

    #[test]
    fn prepare_marks_the_engine_ready() {
        let mut eq = Equalizer::new(Arc::new(ParamStore::default()));
        assert!(!eq.is_prepared());
        eq.prepare(SR, BLOCK);
        assert!(eq.is_prepared());
        assert_eq!(eq.sample_rate(), SR);
    }

    #[test]
    fn channels_share_coefficients() {
        let mut eq = engine_with(EqParams {
            low_cut_freq: 200.0,
            low_cut_slope: Slope::Db36,
            bell_freq: 2000.0,
            bell_gain_db: 6.0,
            bell_q: 1.5,
            high_cut_freq: 8000.0,
            high_cut_slope: Slope::Db24,
        });

        let src = sine(1000.0, BLOCK, 0);
        let mut left = src.clone();
        let mut right = src;
        eq.process(&mut left, &mut right);

        for i in 0..BLOCK {
            assert!(
                (left[i] - right[i]).abs() < 1e-7,
                "identical input must give identical output per channel: sample {i}"
            );
        }
    }

    #[test]
    fn default_parameters_are_near_transparent_midband() {
        let mut eq = engine_with(EqParams::default());
        // Warm up past the filter transient, then measure.
        for _ in 0..4 {
            let mut left = sine(1000.0, BLOCK, 0);
            let mut right = left.clone();
            eq.process(&mut left, &mut right);
        }
        let src = sine(1000.0, BLOCK, 0);
        let mut left = src.clone();
        let mut right = src.clone();
        eq.process(&mut left, &mut right);

        let gain = rms(&left) / rms(&src);
        assert!(
            (gain - 1.0).abs() < 0.02,
            "default settings at 1kHz should be ~unity, got gain {gain}"
        );
    }

    #[test]
    fn slope_selects_the_active_stage_counts() {
        for (low, high) in [
            (Slope::Db12, Slope::Db60),
            (Slope::Db36, Slope::Db24),
            (Slope::Db60, Slope::Db12),
        ] {
            let eq = engine_with(EqParams {
                low_cut_slope: low,
                high_cut_slope: high,
                ..EqParams::default()
            });
            assert_eq!(eq.left.low_cut.active_stages(), low.sections());
            assert_eq!(eq.left.high_cut.active_stages(), high.sections());
            assert_eq!(eq.right.low_cut.active_stages(), low.sections());
            assert_eq!(eq.right.high_cut.active_stages(), high.sections());
        }
    }

    #[test]
    fn parameter_writes_apply_on_the_next_block() {
        let store = Arc::new(ParamStore::default());
        let mut eq = Equalizer::new(Arc::clone(&store));
        eq.prepare(SR, BLOCK);

        // Settle at unity gain.
        for _ in 0..4 {
            let mut left = sine(1000.0, BLOCK, 0);
            let mut right = left.clone();
            eq.process(&mut left, &mut right);
        }

        store.set_bell(1000.0, 12.0, 1.0);

        // Let the boosted filter settle, then measure.
        for _ in 0..8 {
            let mut left = sine(1000.0, BLOCK, 0);
            let mut right = left.clone();
            eq.process(&mut left, &mut right);
        }
        let src = sine(1000.0, BLOCK, 0);
        let mut left = src.clone();
        let mut right = src.clone();
        eq.process(&mut left, &mut right);

        let gain = rms(&left) / rms(&src);
        let expected = 10.0_f32.powf(12.0 / 20.0);
        assert!(
            (gain - expected).abs() < expected * 0.05,
            "bell boost should reach ~{expected} at center, got {gain}"
        );
    }

    #[test]
    fn prepare_resets_delay_state() {
        let params = EqParams {
            low_cut_freq: 100.0,
            low_cut_slope: Slope::Db24,
            high_cut_freq: 10000.0,
            ..EqParams::default()
        };
        let mut eq = engine_with(params);

        let mut noise_l: Vec<f32> = (0..BLOCK).map(|i| (i as f32 * 0.13).sin()).collect();
        let mut noise_r = noise_l.clone();
        eq.process(&mut noise_l, &mut noise_r);

        eq.prepare(SR, BLOCK);
        let mut ir1_l = vec![0.0f32; 128];
        ir1_l[0] = 1.0;
        let mut ir1_r = ir1_l.clone();
        eq.process(&mut ir1_l, &mut ir1_r);

        eq.prepare(SR, BLOCK);
        let mut ir2_l = vec![0.0f32; 128];
        ir2_l[0] = 1.0;
        let mut ir2_r = ir2_l.clone();
        eq.process(&mut ir2_l, &mut ir2_r);

        for i in 0..128 {
            assert!(
                (ir1_l[i] - ir2_l[i]).abs() < 1e-7,
                "prepare should reset state: sample {i} differs"
            );
        }
    }

    #[test]
    fn out_of_range_parameters_are_clamped_not_fatal() {
        let store = Arc::new(ParamStore::new(EqParams {
            low_cut_freq: -500.0,
            bell_freq: 90000.0,
            bell_gain_db: 300.0,
            bell_q: f32::NAN,
            high_cut_freq: 0.0,
            ..EqParams::default()
        }));
        let mut eq = Equalizer::new(store);
        eq.prepare(SR, BLOCK);

        let mut left = sine(1000.0, BLOCK, 0);
        let mut right = left.clone();
        eq.process(&mut left, &mut right);

        for (i, s) in left.iter().enumerate() {
            assert!(s.is_finite(), "output sample {i} not finite: {s}");
        }
    }

    #[test]
    fn freq_response_reflects_the_bell_boost() {
        let eq = engine_with(EqParams {
            bell_freq: 2000.0,
            bell_gain_db: 6.0,
            bell_q: 1.0,
            ..EqParams::default()
        });
        let (mag, _) = eq.freq_response(2000.0);
        let expected = 10.0_f32.powf(6.0 / 20.0);
        assert!(
            (mag - expected).abs() < 0.1,
            "response at the bell center: expected ~{expected}, got {mag}"
        );
    }

    #[test]
    fn update_before_prepare_is_a_quiet_no_op() {
        let mut eq = Equalizer::new(Arc::new(ParamStore::default()));
        eq.update_from_parameters(&EqParams::default());
        assert!(!eq.is_prepared());
    }

    #[test]
    fn restored_state_applies_via_update_from_parameters() {
        let store = Arc::new(ParamStore::default());
        let mut eq = Equalizer::new(Arc::clone(&store));
        eq.prepare(SR, BLOCK);

        let restored = EqParams {
            bell_freq: 3000.0,
            bell_gain_db: -12.0,
            bell_q: 2.0,
            ..EqParams::default()
        };
        store.store(&restored);
        eq.update_from_parameters(&restored);

        let (mag, _) = eq.freq_response(3000.0);
        let expected = 10.0_f32.powf(-12.0 / 20.0);
        assert!(
            (mag - expected).abs() < 0.05,
            "restored cut should show in the response: expected ~{expected}, got {mag}"
        );
    }
}
