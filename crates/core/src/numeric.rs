//! Numeric primitives shared by the smoothing, motion and curve panels.
//!
//! Everything here is a pure function of its arguments. Sequence helpers that
//! cannot produce a meaningful first sample (empty or too-short input) fail
//! with [`EngineError::InvalidInput`] instead of emitting NaN.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Linear interpolation `start*(1-t) + end*t`. `t` is not clamped.
pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start * (1.0 - t) + end * t
}

/// Exponential moving average.
///
/// `out[0] = data[0]`, `out[i] = alpha*data[i] + (1-alpha)*out[i-1]`.
/// `alpha` is expected in (0, 1] but not enforced.
pub fn ema(data: &[f64], alpha: f64) -> Result<Vec<f64>, EngineError> {
    let (&first, rest) = data
        .split_first()
        .ok_or_else(|| EngineError::invalid_input("ema requires at least one sample"))?;
    let mut out = Vec::with_capacity(data.len());
    out.push(first);
    let mut prev = first;
    for &x in rest {
        prev = alpha * x + (1.0 - alpha) * prev;
        out.push(prev);
    }
    Ok(out)
}

/// Holt's linear (double exponential) smoothing.
///
/// Seeds `level = data[0]`, `trend = data[1] - data[0]`; the first output is
/// `data[0]` and each later output is the updated `level + trend`.
pub fn double_exponential_smoothing(
    data: &[f64],
    alpha: f64,
    beta: f64,
) -> Result<Vec<f64>, EngineError> {
    if data.len() < 2 {
        return Err(EngineError::invalid_input(format!(
            "double exponential smoothing requires at least 2 samples, got {}",
            data.len()
        )));
    }
    let mut level = data[0];
    let mut trend = data[1] - data[0];
    let mut out = Vec::with_capacity(data.len());
    out.push(data[0]);
    for &x in &data[1..] {
        let last_level = level;
        level = alpha * x + (1.0 - alpha) * (level + trend);
        trend = beta * (level - last_level) + (1.0 - beta) * trend;
        out.push(level + trend);
    }
    Ok(out)
}

/// Normal probability density at `x` with standard deviation `sigma`.
pub fn gaussian_weight(x: f64, sigma: f64) -> f64 {
    (-(x * x) / (2.0 * sigma * sigma)).exp() / (sigma * (2.0 * PI).sqrt())
}

/// Uniform Catmull-Rom evaluation on the segment `p1 → p2` at `t ∈ [0, 1]`.
///
/// Scalar form; 2D curves evaluate x and y independently.
pub fn catmull_rom(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

/// Position and velocity of a 1D spring.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpringState {
    pub position: f64,
    pub velocity: f64,
}

/// One semi-implicit Euler step of a damped spring pulled toward `target`.
///
/// `accel = (target - current)*stiffness - velocity*damping`, then velocity is
/// advanced before position. This is the canonical form: damping is explicit.
pub fn critically_damped_spring(
    current: f64,
    target: f64,
    velocity: f64,
    stiffness: f64,
    damping: f64,
    dt: f64,
) -> SpringState {
    let acceleration = (target - current) * stiffness - velocity * damping;
    let velocity = velocity + acceleration * dt;
    SpringState {
        position: current + velocity * dt,
        velocity,
    }
}

/// Preset of [`critically_damped_spring`] with `damping = 2*sqrt(stiffness)`.
///
/// Produces visibly different motion from the explicit form for the same
/// stiffness; panels choose one or the other.
pub fn critically_damped_spring_derived(
    current: f64,
    target: f64,
    velocity: f64,
    stiffness: f64,
    dt: f64,
) -> SpringState {
    critically_damped_spring(
        current,
        target,
        velocity,
        stiffness,
        critical_damping(stiffness),
        dt,
    )
}

/// Damping coefficient that makes a unit-mass spring critically damped.
pub fn critical_damping(stiffness: f64) -> f64 {
    2.0 * stiffness.sqrt()
}

/// Half-open index range of the centered window around `i`, clamped to `len`.
fn centered_window(i: usize, len: usize, window: usize) -> std::ops::Range<usize> {
    let half = window / 2;
    i.saturating_sub(half)..(i + half + 1).min(len)
}

/// Moving median over a centered window that shrinks at the edges.
///
/// Picks index `len/2` of the sorted window, so even-length windows (which
/// only occur at the edges) take the upper of the two middle values.
pub fn moving_median(data: &[f64], window: usize) -> Vec<f64> {
    let mut scratch = Vec::with_capacity(window + 1);
    (0..data.len())
        .map(|i| {
            scratch.clear();
            scratch.extend_from_slice(&data[centered_window(i, data.len(), window)]);
            scratch.sort_by(f64::total_cmp);
            scratch[scratch.len() / 2]
        })
        .collect()
}

/// Marks samples that exceed their local mean by more than `constant`.
///
/// Output is 1.0 where `data[i] > mean(window) + constant`, else 0.0.
pub fn adaptive_threshold(data: &[f64], window: usize, constant: f64) -> Vec<f64> {
    (0..data.len())
        .map(|i| {
            let w = &data[centered_window(i, data.len(), window)];
            let mean = w.iter().sum::<f64>() / w.len() as f64;
            if data[i] > mean + constant {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    // ---- lerp ----

    #[test]
    fn lerp_hits_endpoints() {
        assert_eq!(lerp(3.0, 11.0, 0.0), 3.0);
        assert_eq!(lerp(3.0, 11.0, 1.0), 11.0);
        assert!((lerp(3.0, 11.0, 0.5) - 7.0).abs() < EPS);
    }

    #[test]
    fn lerp_extrapolates_outside_unit_interval() {
        assert!((lerp(0.0, 10.0, 1.5) - 15.0).abs() < EPS);
        assert!((lerp(0.0, 10.0, -0.5) + 5.0).abs() < EPS);
    }

    // ---- ema ----

    #[test]
    fn ema_empty_is_invalid_input() {
        assert!(matches!(ema(&[], 0.2), Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn ema_alpha_one_is_identity() {
        let data = [4.0, -2.0, 9.5, 0.0];
        assert_eq!(ema(&data, 1.0).unwrap(), data.to_vec());
    }

    #[test]
    fn ema_known_values() {
        let out = ema(&[0.0, 10.0, 10.0], 0.5).unwrap();
        assert!((out[1] - 5.0).abs() < EPS);
        assert!((out[2] - 7.5).abs() < EPS);
    }

    // ---- double exponential smoothing ----

    #[test]
    fn des_requires_two_samples() {
        assert!(double_exponential_smoothing(&[], 0.2, 0.1).is_err());
        assert!(double_exponential_smoothing(&[1.0], 0.2, 0.1).is_err());
        assert_eq!(
            double_exponential_smoothing(&[1.0, 2.0], 0.2, 0.1)
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn des_tracks_a_perfect_line() {
        let data: Vec<f64> = (0..20).map(|i| 3.0 + 2.0 * i as f64).collect();
        let out = double_exponential_smoothing(&data, 0.3, 0.2).unwrap();
        // With an exact linear seed the forecast leads the data by one slope.
        for (i, v) in out.iter().enumerate().skip(1) {
            assert!((v - (data[i] + 2.0)).abs() < 1e-9, "index {i}: {v}");
        }
    }

    // ---- gaussian ----

    #[test]
    fn gaussian_peak_and_symmetry() {
        let sigma = 2.0;
        let peak = gaussian_weight(0.0, sigma);
        assert!((peak - 1.0 / (sigma * (2.0 * PI).sqrt())).abs() < EPS);
        assert!((gaussian_weight(1.3, sigma) - gaussian_weight(-1.3, sigma)).abs() < EPS);
        assert!(gaussian_weight(3.0, sigma) < peak);
    }

    // ---- catmull-rom ----

    #[test]
    fn catmull_rom_passes_through_inner_control_points() {
        assert!((catmull_rom(0.0, 1.0, 4.0, 9.0, 0.0) - 1.0).abs() < EPS);
        assert!((catmull_rom(0.0, 1.0, 4.0, 9.0, 1.0) - 4.0).abs() < EPS);
    }

    #[test]
    fn catmull_rom_is_linear_on_evenly_spaced_colinear_points() {
        for k in 0..=10 {
            let t = k as f64 / 10.0;
            let v = catmull_rom(0.0, 1.0, 2.0, 3.0, t);
            assert!((v - (1.0 + t)).abs() < EPS, "t={t}: {v}");
        }
    }

    #[test]
    fn catmull_rom_2d_colinear_points_stay_colinear() {
        // Points on y = 2x + 1.
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = xs.map(|x| 2.0 * x + 1.0);
        for k in 0..=10 {
            let t = k as f64 / 10.0;
            let x = catmull_rom(xs[0], xs[1], xs[2], xs[3], t);
            let y = catmull_rom(ys[0], ys[1], ys[2], ys[3], t);
            assert!((y - (2.0 * x + 1.0)).abs() < 1e-9);
        }
    }

    // ---- springs ----

    #[test]
    fn spring_at_rest_on_target_stays_put() {
        let s = critically_damped_spring(5.0, 5.0, 0.0, 0.3, 0.7, 1.0 / 60.0);
        assert_eq!(s, SpringState { position: 5.0, velocity: 0.0 });
    }

    #[test]
    fn spring_uses_semi_implicit_euler() {
        let s = critically_damped_spring(0.0, 10.0, 0.0, 2.0, 0.5, 0.1);
        // accel = 20, v = 2, x = 0.2
        assert!((s.velocity - 2.0).abs() < EPS);
        assert!((s.position - 0.2).abs() < EPS);
    }

    #[test]
    fn derived_spring_matches_explicit_with_two_sqrt_k() {
        let a = critically_damped_spring_derived(1.0, 4.0, 0.3, 9.0, 0.01);
        let b = critically_damped_spring(1.0, 4.0, 0.3, 9.0, 6.0, 0.01);
        assert_eq!(a, b);
    }

    #[test]
    fn derived_spring_converges_without_overshoot() {
        let mut s = SpringState::default();
        let target = 100.0;
        for _ in 0..2000 {
            s = critically_damped_spring_derived(s.position, target, s.velocity, 4.0, 1.0 / 60.0);
            assert!(s.position <= target + 1e-6, "overshoot: {}", s.position);
        }
        assert!((s.position - target).abs() < 1e-3);
    }

    // ---- windowed filters ----

    #[test]
    fn moving_median_removes_single_spike() {
        let data = [1.0, 1.0, 50.0, 1.0, 1.0];
        assert_eq!(moving_median(&data, 3), vec![1.0; 5]);
    }

    #[test]
    fn moving_median_shrinks_window_at_edges() {
        // At i=0 with window 5 the window is [3, 1, 2] → sorted [1, 2, 3] → 2.
        let data = [3.0, 1.0, 2.0, 8.0, 9.0];
        assert_eq!(moving_median(&data, 5)[0], 2.0);
        // At i=4 the window is [2, 8, 9] → 8.
        assert_eq!(moving_median(&data, 5)[4], 8.0);
    }

    #[test]
    fn moving_median_even_window_takes_index_half_len() {
        // window 3 at i=0 covers [0, 2): [5, 1] → sorted [1, 5] → index 1 → 5.
        assert_eq!(moving_median(&[5.0, 1.0, 7.0], 3)[0], 5.0);
    }

    #[test]
    fn moving_median_empty_input() {
        assert!(moving_median(&[], 3).is_empty());
    }

    #[test]
    fn adaptive_threshold_flags_local_peaks() {
        let data = [0.0, 0.0, 10.0, 0.0, 0.0];
        assert_eq!(
            adaptive_threshold(&data, 3, 1.0),
            vec![0.0, 0.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn adaptive_threshold_constant_raises_bar() {
        let data = [0.0, 3.0, 0.0];
        assert_eq!(adaptive_threshold(&data, 3, 0.5)[1], 1.0);
        assert_eq!(adaptive_threshold(&data, 3, 5.0)[1], 0.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn lerp_monotonic_in_t(a in -1e3_f64..1e3, d in 0.001_f64..1e3, t1 in 0.0_f64..1.0, t2 in 0.0_f64..1.0) {
                let b = a + d;
                let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
                prop_assert!(lerp(a, b, lo) <= lerp(a, b, hi) + 1e-9);
            }

            #[test]
            fn ema_preserves_length(data in prop::collection::vec(-1e3_f64..1e3, 1..64), alpha in 0.01_f64..=1.0) {
                prop_assert_eq!(ema(&data, alpha).unwrap().len(), data.len());
            }

            #[test]
            fn des_preserves_length(data in prop::collection::vec(-1e3_f64..1e3, 2..64)) {
                prop_assert_eq!(double_exponential_smoothing(&data, 0.2, 0.1).unwrap().len(), data.len());
            }

            #[test]
            fn moving_median_output_is_drawn_from_input(data in prop::collection::vec(-1e3_f64..1e3, 0..48), window in 0_usize..9) {
                let out = moving_median(&data, window);
                prop_assert_eq!(out.len(), data.len());
                for v in out {
                    prop_assert!(data.contains(&v));
                }
            }

            #[test]
            fn adaptive_threshold_is_binary(data in prop::collection::vec(-1e3_f64..1e3, 0..48), window in 0_usize..9, c in -5.0_f64..5.0) {
                for v in adaptive_threshold(&data, window, c) {
                    prop_assert!(v == 0.0 || v == 1.0);
                }
            }
        }
    }
}
