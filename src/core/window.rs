//! Kaiser window and the zeroth-order modified Bessel function it is built on.

/// Series terms smaller than this end the Bessel I0 summation.
const BESSEL_CONVERGENCE: f64 = 1.0e-21;

/// Zeroth-order modified Bessel function of the first kind.
///
/// Sums `(x/2)^(2i) / (i!)^2` until a term drops below `1e-21`. Terms are
/// monotonically decreasing past the peak for the shape values produced by
/// [`kaiser_beta_for_attenuation`](crate::core::filter::kaiser_beta_for_attenuation),
/// so the first small term ends the series.
pub fn bessel_i0(x: f64) -> f64 {
    let half_x = x / 2.0;
    let mut sum = 1.0f64;
    let mut factorial = 1.0f64;
    let mut i = 1i32;

    loop {
        let term = half_x.powi(2 * i) / (factorial * factorial);
        if term < BESSEL_CONVERGENCE {
            break;
        }
        sum += term;
        i += 1;
        factorial *= i as f64;
    }

    sum
}

/// Value of a Kaiser window of length `m + 1` with shape `alpha` at point `n`.
///
/// Returns 0 outside `[0, m]`. The window is symmetric about `m / 2` and is
/// rectangular when `alpha == 0`.
#[inline]
pub fn kaiser(alpha: f64, m: f64, n: f64) -> f64 {
    if n < 0.0 || n > m {
        return 0.0;
    }
    let x = 2.0 * n / m - 1.0;
    bessel_i0(alpha * (1.0 - x * x).sqrt()) / bessel_i0(alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bessel_i0_zero_is_exactly_one() {
        assert_eq!(bessel_i0(0.0), 1.0);
    }

    #[test]
    fn test_bessel_i0_known_values() {
        // I0(1) ≈ 1.2660658777520082
        assert!((bessel_i0(1.0) - 1.266_065_877_752_008_2).abs() < 1e-12);
        // I0(3) ≈ 4.880792585865024
        assert!((bessel_i0(3.0) - 4.880_792_585_865_024).abs() < 1e-10);
        // Denominator of the 80 dB window, I0(7.85726) ≈ 374.16
        let v = bessel_i0(7.857_26);
        assert!(v > 373.0 && v < 375.5, "I0(7.857) = {}", v);
    }

    #[test]
    fn test_bessel_i0_even() {
        for &x in &[0.5, 2.0, 5.5, 9.0] {
            assert_eq!(bessel_i0(x), bessel_i0(-x));
        }
    }

    #[test]
    fn test_kaiser_rectangular_when_alpha_zero() {
        let m = 16.0;
        for n in 0..=16 {
            assert_eq!(kaiser(0.0, m, n as f64), 1.0, "n = {}", n);
        }
    }

    #[test]
    fn test_kaiser_zero_outside_support() {
        for &alpha in &[0.0, 3.0, 7.857] {
            assert_eq!(kaiser(alpha, 10.0, -1.0), 0.0);
            assert_eq!(kaiser(alpha, 10.0, -1e-9), 0.0);
            assert_eq!(kaiser(alpha, 10.0, 10.5), 0.0);
            assert_eq!(kaiser(alpha, 10.0, 11.0), 0.0);
        }
    }

    #[test]
    fn test_kaiser_symmetric() {
        let m = 5120.0;
        for &alpha in &[1.5, 4.0, 7.857] {
            for n in (0..=5120).step_by(37) {
                let a = kaiser(alpha, m, n as f64);
                let b = kaiser(alpha, m, m - n as f64);
                assert!((a - b).abs() < 1e-12, "alpha {} n {}: {} vs {}", alpha, n, a, b);
            }
        }
    }

    #[test]
    fn test_kaiser_peak_at_center() {
        let m = 100.0;
        let alpha = 6.0;
        assert!((kaiser(alpha, m, 50.0) - 1.0).abs() < 1e-15);
        for n in 0..=100 {
            assert!(kaiser(alpha, m, n as f64) <= 1.0 + 1e-15);
        }
        // Edges fall to 1 / I0(alpha)
        assert!((kaiser(alpha, m, 0.0) - 1.0 / bessel_i0(alpha)).abs() < 1e-15);
    }
}
