#![allow(dead_code)]

use std::f64::consts::PI;
use std::path::PathBuf;

use rustfft::{num_complex::Complex, FftPlanner};

pub fn gen_sine(freq_hz: f64, sr: u32, n: usize, amp: f64) -> Vec<i16> {
    (0..n)
        .map(|i| (amp * (2.0 * PI * freq_hz * i as f64 / sr as f64).sin()) as i16)
        .collect()
}

/// Value of the continuous sine that `gen_sine` samples, at time `j / sr`.
pub fn ideal_sine(freq_hz: f64, sr: u32, j: usize, amp: f64) -> f64 {
    amp * (2.0 * PI * freq_hz * j as f64 / sr as f64).sin()
}

/// RMS difference between `signal` and the ideal sine over `start..end`.
pub fn rms_error_vs_sine(
    signal: &[i16],
    freq_hz: f64,
    sr: u32,
    amp: f64,
    start: usize,
    end: usize,
) -> f64 {
    let end = end.min(signal.len());
    if end <= start {
        return 0.0;
    }
    let sum_sq: f64 = (start..end)
        .map(|j| {
            let d = signal[j] as f64 - ideal_sine(freq_hz, sr, j, amp);
            d * d
        })
        .sum();
    (sum_sq / (end - start) as f64).sqrt()
}

pub fn rms(signal: &[i16]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = signal.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq / signal.len() as f64).sqrt()
}

/// Single-bin DFT magnitude, normalized so a full-scale sine of amplitude
/// `a` reads `a / 2` when the window holds a whole number of periods.
pub fn energy_at_freq(signal: &[i16], sr: u32, freq_hz: f64) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let mut re = 0.0f64;
    let mut im = 0.0f64;
    for (i, &s) in signal.iter().enumerate() {
        let angle = 2.0 * PI * freq_hz * i as f64 / sr as f64;
        let sv = s as f64;
        re += sv * angle.cos();
        im -= sv * angle.sin();
    }
    (re * re + im * im).sqrt() / signal.len() as f64
}

/// Frequency of the largest Hann-windowed FFT bin (excluding DC).
pub fn dominant_freq(signal: &[i16], sr: u32) -> f64 {
    let n = signal.len();
    if n < 2 {
        return 0.0;
    }
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let mut frame: Vec<Complex<f64>> = signal
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let w = 0.5 - 0.5 * (2.0 * PI * i as f64 / (n - 1) as f64).cos();
            Complex::new(s as f64 * w, 0.0)
        })
        .collect();
    fft.process(&mut frame);

    let (bin, _) = frame[1..=n / 2]
        .iter()
        .enumerate()
        .fold((0, 0.0f64), |best, (i, c)| {
            let mag = c.norm();
            if mag > best.1 {
                (i + 1, mag)
            } else {
                best
            }
        });
    bin as f64 * sr as f64 / n as f64
}

pub fn count_positive_zero_crossings(signal: &[i16], start: usize, end: usize) -> usize {
    if signal.len() < 2 {
        return 0;
    }
    let start = start.min(signal.len() - 1);
    let end = end.min(signal.len());
    if end <= start + 1 {
        return 0;
    }
    (start..end - 1)
        .filter(|&i| signal[i] <= 0 && signal[i + 1] > 0)
        .count()
}

/// A path in the system temp directory unique to this process and `name`.
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bandlimit-{}-{}", std::process::id(), name))
}
