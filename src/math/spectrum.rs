//! Discrete Fourier analysis used by the periodic-model guess heuristics.
//!
//! The spectrum is computed with RustFFT on the raw samples (no window, no DC
//! removal): the zero-frequency bin is excluded from the peak search instead.

use rustfft::{FftPlanner, num_complex::Complex};

/// The strongest positive, non-zero frequency component of a sampled signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DominantComponent {
    /// DFT bin index, in `1..=n/2`.
    pub bin: usize,
    /// Frequency in inverse coordinate units: `bin / (n * dx)`.
    pub frequency: f64,
    /// Argument of the complex DFT coefficient (radians, `-π..=π`).
    pub phase: f64,
    /// Magnitude of the complex DFT coefficient.
    pub magnitude: f64,
}

/// Forward DFT of real samples.
pub fn dft(samples: &[f64]) -> Vec<Complex<f64>> {
    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .map(|&re| Complex { re, im: 0.0 })
        .collect();
    if buffer.is_empty() {
        return buffer;
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);
    buffer
}

/// Find the magnitude-argmax bin among positive non-zero frequencies.
///
/// `dx` is the sample spacing; returns `None` when fewer than two samples are
/// given or the spacing is zero or non-finite.
pub fn dominant_component(samples: &[f64], dx: f64) -> Option<DominantComponent> {
    let n = samples.len();
    if n < 2 || !dx.is_finite() || dx == 0.0 {
        return None;
    }

    let spectrum = dft(samples);

    let mut best: Option<(usize, f64)> = None;
    for (bin, c) in spectrum.iter().enumerate().take(n / 2 + 1).skip(1) {
        let mag = c.norm();
        match best {
            Some((_, m)) if mag <= m => {}
            _ => best = Some((bin, mag)),
        }
    }

    let (bin, magnitude) = best?;
    Some(DominantComponent {
        bin,
        frequency: bin as f64 / (n as f64 * dx),
        phase: spectrum[bin].arg(),
        magnitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn finds_bin_and_phase_of_pure_cosine() {
        let n = 64;
        let dx = 0.1;
        let phase = 0.7;
        let samples: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 4.0 * i as f64 / n as f64 + phase).cos() + 2.0)
            .collect();

        let c = dominant_component(&samples, dx).unwrap();
        assert_eq!(c.bin, 4);
        assert!((c.frequency - 4.0 / (n as f64 * dx)).abs() < 1e-12);
        assert!((c.phase - phase).abs() < 1e-9, "phase {}", c.phase);
        // Coefficient magnitude of A*cos is A*n/2.
        assert!((c.magnitude - n as f64 / 2.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert!(dominant_component(&[1.0], 1.0).is_none());
        assert!(dominant_component(&[1.0, 2.0], 0.0).is_none());
        assert!(dft(&[]).is_empty());
    }
}
