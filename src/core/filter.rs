//! Windowed-sinc filter table design.
//!
//! The interpolation kernel is stored as the right half of a symmetric
//! sinc × Kaiser impulse response, sampled at [`TABLE_RESOLUTION`] phases per
//! zero-crossing. A companion difference table lets the resampler interpolate
//! linearly between stored phases without evaluating transcendentals per tap.

use std::f64::consts::PI;

use crate::core::types::try_alloc;
use crate::core::window::kaiser;
use crate::error::ResampleError;

/// Target stopband attenuation of the kernel, in dB.
pub const STOPBAND_ATTENUATION_DB: f64 = 80.0;
/// Number of sinc zero-crossings on each side of the kernel (`N_z`).
pub const ZERO_CROSSINGS: usize = 5;
/// Table phases per zero-crossing (`L`).
pub const TABLE_RESOLUTION: usize = 512;
/// Length of the half-kernel table (`N_h = L * N_z + 1`).
pub const TABLE_LEN: usize = TABLE_RESOLUTION * ZERO_CROSSINGS + 1;

/// Kaiser shape parameter (alpha, a.k.a. beta) for a stopband attenuation.
///
/// Empirical three-branch rule: `0.1102 (dB - 8.7)` above 50 dB,
/// `0.5842 (dB - 21)^0.4 + 0.07886 (dB - 21)` between 21 and 50 dB,
/// and 0 (rectangular window) below 21 dB.
pub fn kaiser_beta_for_attenuation(db: f64) -> f64 {
    if db > 50.0 {
        0.1102 * (db - 8.7)
    } else if db >= 21.0 {
        0.5842 * (db - 21.0).powf(0.4) + 0.07886 * (db - 21.0)
    } else {
        0.0
    }
}

/// Builds the half-kernel table `h` of length `len`.
///
/// Entry `i` holds the Kaiser window of length `M + 1 = 2(len - 1) + 1`
/// evaluated at `len - i - 1`, so index 0 is the kernel center and the last
/// entry is the window edge. Entries `i >= 1` are multiplied by
/// `sin(i*pi/L) / (i*pi/L)`; entry 0 is set to exactly 1.0.
pub fn build_table(alpha: f64, len: usize, resolution: usize) -> Result<Vec<f64>, ResampleError> {
    let mut h = try_alloc(len, 0.0f64)?;
    if len == 0 {
        return Ok(h);
    }

    let m = ((len - 1) * 2) as f64;
    for (i, v) in h.iter_mut().enumerate() {
        *v = kaiser(alpha, m, (len - i - 1) as f64);
    }

    for (i, v) in h.iter_mut().enumerate().skip(1) {
        let x = i as f64 / resolution as f64 * PI;
        *v *= x.sin() / x;
    }

    h[0] = 1.0;
    Ok(h)
}

/// Forward differences of `h`: `hb[i] = h[i+1] - h[i]`, with `hb[last] = 0`.
pub fn build_diffs(h: &[f64]) -> Result<Vec<f64>, ResampleError> {
    let mut hb = try_alloc(h.len(), 0.0f64)?;
    for (d, pair) in hb.iter_mut().zip(h.windows(2)) {
        *d = pair[1] - pair[0];
    }
    Ok(hb)
}

/// Immutable interpolation kernel: coefficient table plus difference table.
#[derive(Debug, Clone)]
pub struct FilterTable {
    h: Vec<f64>,
    hb: Vec<f64>,
    beta: f64,
    resolution: usize,
    zero_crossings: usize,
}

impl FilterTable {
    /// Designs the kernel used by the resampler: 80 dB stopband,
    /// 5 zero-crossings, 512 phases per zero-crossing.
    pub fn new() -> Result<Self, ResampleError> {
        Self::with_design(STOPBAND_ATTENUATION_DB, ZERO_CROSSINGS, TABLE_RESOLUTION)
    }

    /// Designs a kernel with arbitrary attenuation and table geometry.
    ///
    /// # Errors
    ///
    /// Returns [`ResampleError::InvalidFormat`] if `zero_crossings` or
    /// `resolution` is zero.
    pub fn with_design(
        attenuation_db: f64,
        zero_crossings: usize,
        resolution: usize,
    ) -> Result<Self, ResampleError> {
        if zero_crossings == 0 || resolution == 0 {
            return Err(ResampleError::InvalidFormat(format!(
                "filter geometry must be non-zero: {} zero-crossings, {} phases",
                zero_crossings, resolution
            )));
        }
        let beta = kaiser_beta_for_attenuation(attenuation_db);
        let len = resolution * zero_crossings + 1;
        let h = build_table(beta, len, resolution)?;
        let hb = build_diffs(&h)?;

        log::debug!(
            "designed filter: {:.1} dB, beta {:.5}, {} zero-crossings x {} phases ({} taps)",
            attenuation_db,
            beta,
            zero_crossings,
            resolution,
            len
        );

        Ok(Self {
            h,
            hb,
            beta,
            resolution,
            zero_crossings,
        })
    }

    /// Half-kernel coefficients `h`.
    #[inline]
    pub fn coefficients(&self) -> &[f64] {
        &self.h
    }

    /// Forward differences `hb` of the coefficients.
    #[inline]
    pub fn differences(&self) -> &[f64] {
        &self.hb
    }

    /// Table length `N_h`.
    #[inline]
    pub fn len(&self) -> usize {
        self.h.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.h.is_empty()
    }

    /// Kaiser shape parameter the table was designed with.
    #[inline]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Phases per zero-crossing `L`.
    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Zero-crossings per side `N_z`.
    #[inline]
    pub fn zero_crossings(&self) -> usize {
        self.zero_crossings
    }

    /// Kernel tap at table index `idx`, linearly interpolated by `eta`
    /// toward the next stored phase.
    #[inline]
    pub fn tap(&self, idx: usize, eta: f64) -> f64 {
        self.h[idx] + eta * self.hb[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::window::bessel_i0;

    #[test]
    fn test_beta_branches() {
        assert_eq!(kaiser_beta_for_attenuation(10.0), 0.0);
        assert_eq!(kaiser_beta_for_attenuation(20.999), 0.0);
        assert_eq!(kaiser_beta_for_attenuation(21.0), 0.0);
        assert!((kaiser_beta_for_attenuation(80.0) - 7.857_26).abs() < 1e-9);
        assert!((kaiser_beta_for_attenuation(100.0) - 0.1102 * 91.3).abs() < 1e-12);
        let mid = kaiser_beta_for_attenuation(30.0);
        let expected = 0.5842 * 9.0f64.powf(0.4) + 0.07886 * 9.0;
        assert!((mid - expected).abs() < 1e-12);
    }

    #[test]
    fn test_beta_continuous_at_21_db() {
        let below = kaiser_beta_for_attenuation(21.0 - 1e-9);
        let above = kaiser_beta_for_attenuation(21.0 + 1e-9);
        assert!((above - below).abs() < 1e-3, "{} vs {}", below, above);
    }

    #[test]
    fn test_beta_continuous_at_50_db() {
        // The empirical constants leave a step of ~0.018 (0.4%) at 50 dB.
        let below = kaiser_beta_for_attenuation(50.0);
        let above = kaiser_beta_for_attenuation(50.0 + 1e-9);
        assert!((above - below).abs() < 0.02, "{} vs {}", below, above);
        assert!((above - below).abs() / above < 0.005);
    }

    #[test]
    fn test_table_shape() {
        let table = FilterTable::new().unwrap();
        assert_eq!(table.len(), TABLE_LEN);
        assert_eq!(TABLE_LEN, 2561);
        assert_eq!(table.coefficients()[0], 1.0);
        assert_eq!(table.differences().len(), TABLE_LEN);
        assert_eq!(table.resolution(), 512);
        assert_eq!(table.zero_crossings(), 5);
    }

    #[test]
    fn test_diffs_are_forward_differences() {
        let table = FilterTable::new().unwrap();
        let h = table.coefficients();
        let hb = table.differences();
        for i in 0..h.len() - 1 {
            assert_eq!(hb[i], h[i + 1] - h[i], "index {}", i);
        }
        assert_eq!(hb[h.len() - 1], 0.0);
    }

    #[test]
    fn test_zero_crossings_land_on_table_multiples() {
        let table = FilterTable::new().unwrap();
        let h = table.coefficients();
        for k in 1..=ZERO_CROSSINGS {
            assert!(h[k * TABLE_RESOLUTION].abs() < 1e-12, "h[{}L] = {}", k, h[k * TABLE_RESOLUTION]);
        }
        // Main lobe is positive, first side lobe negative
        assert!(h[TABLE_RESOLUTION / 2] > 0.5);
        assert!(h[TABLE_RESOLUTION + TABLE_RESOLUTION / 2] < 0.0);
    }

    #[test]
    fn test_table_entries_match_direct_evaluation() {
        let table = FilterTable::new().unwrap();
        let beta = table.beta();
        let h = table.coefficients();
        let l = TABLE_RESOLUTION as f64;
        let half = (TABLE_LEN - 1) as f64;
        for i in (1..TABLE_LEN).step_by(97) {
            // Distance from the kernel center, in table steps
            let x = i as f64 / half;
            let window = bessel_i0(beta * (1.0 - x * x).sqrt()) / bessel_i0(beta);
            let arg = std::f64::consts::PI * i as f64 / l;
            let expected = window * arg.sin() / arg;
            assert!((h[i] - expected).abs() < 1e-12, "h[{}] {} vs {}", i, h[i], expected);
        }
    }

    #[test]
    fn test_last_entry_is_window_edge() {
        let table = FilterTable::new().unwrap();
        let h = table.coefficients();
        // Window edge is 1 / I0(beta); sinc there is sin(5*pi) ~ 0
        assert!(h[TABLE_LEN - 1].abs() < 1e-15);
        let edge_window = 1.0 / bessel_i0(table.beta());
        let before = &h[TABLE_LEN - 2];
        let arg = std::f64::consts::PI * (TABLE_LEN - 2) as f64 / TABLE_RESOLUTION as f64;
        assert!((before / (arg.sin() / arg)) > edge_window * 0.99);
    }

    #[test]
    fn test_rectangular_table_is_plain_sinc() {
        let h = build_table(0.0, 4 * 8 + 1, 8).unwrap();
        assert_eq!(h[0], 1.0);
        for (i, &v) in h.iter().enumerate().skip(1) {
            let x = i as f64 / 8.0 * PI;
            assert!((v - x.sin() / x).abs() < 1e-15);
        }
    }

    #[test]
    fn test_degenerate_tables() {
        assert!(build_table(7.0, 0, 512).unwrap().is_empty());
        assert_eq!(build_table(7.0, 1, 512).unwrap(), vec![1.0]);
        assert_eq!(build_diffs(&[1.0]).unwrap(), vec![0.0]);
        assert!(build_diffs(&[]).unwrap().is_empty());
        assert!(FilterTable::with_design(80.0, 0, 512).is_err());
        assert!(FilterTable::with_design(80.0, 5, 0).is_err());
    }

    #[test]
    fn test_tap_interpolates_between_phases() {
        let table = FilterTable::new().unwrap();
        let h = table.coefficients();
        assert_eq!(table.tap(100, 0.0), h[100]);
        assert!((table.tap(100, 1.0) - h[101]).abs() < 1e-15);
        let mid = table.tap(100, 0.5);
        assert!((mid - 0.5 * (h[100] + h[101])).abs() < 1e-15);
    }
}
