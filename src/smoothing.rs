use crate::{config::Smoothing, error::AnalysisError};

/// Savitzky-Golay smoothing filter.
///
/// Every sample in the interior is replaced by the value, at the window centre, of a least-squares
/// polynomial of degree `order` fitted to the `window` samples around it. For the first and last
/// `window / 2` samples a polynomial is fitted to the first (resp. last) full window and evaluated
/// at their positions, so the output has the same length as the input.
///
/// Window positions are scaled to `[-1, 1]` before fitting. This keeps the normal equations well
/// conditioned for long windows (a 3601 sample window would otherwise need powers of 1800 up to
/// the sixth) and does not change the fitted values.
#[derive(Debug, Clone, PartialEq)]
pub struct SavitzkyGolay {
    window: usize,
    order: usize,
    coefficients: Vec<f64>,
}
impl SavitzkyGolay {
    pub fn new(window: usize, order: usize) -> Result<Self, AnalysisError> {
        if window == 0 || window % 2 == 0 || order >= window {
            return Err(AnalysisError::InvalidWindow {
                window,
                order,
                len: 0,
            });
        }

        // value of the fitted polynomial at t = 0 is the first entry of the solution, so the
        // convolution weight of sample t_j is e0 . N^-1 . [1, t_j, .., t_j^order]
        let normal = normal_matrix(window, order);
        let mut e0 = vec![0_f64; order + 1];
        e0[0] = 1.0;
        let weights = solve(normal, e0);

        let coefficients = positions(window)
            .map(|t| evaluate(&weights, t))
            .collect::<Vec<_>>();

        Ok(SavitzkyGolay {
            window,
            order,
            coefficients,
        })
    }

    pub fn from_config(smoothing: &Smoothing) -> Result<Self, AnalysisError> {
        Self::new(smoothing.window, smoothing.order)
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Convolution weights of the centred fit, from the oldest to the newest sample.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn apply(&self, data: &[f64]) -> Result<Vec<f64>, AnalysisError> {
        if self.window > data.len() {
            return Err(AnalysisError::InvalidWindow {
                window: self.window,
                order: self.order,
                len: data.len(),
            });
        }

        let half = self.window / 2;
        let mut smoothed = vec![0_f64; data.len()];

        for (centre, out) in smoothed
            .iter_mut()
            .enumerate()
            .take(data.len() - half)
            .skip(half)
        {
            let samples = &data[centre - half..=centre + half];
            *out = samples
                .iter()
                .zip(self.coefficients.iter())
                .map(|(x, c)| x * c)
                .sum();
        }

        // edges: fit the first and last full windows and evaluate them off-centre
        let head = self.fit(&data[..self.window]);
        for (i, t) in positions(self.window).take(half).enumerate() {
            smoothed[i] = evaluate(&head, t);
        }

        let start = data.len() - self.window;
        let tail = self.fit(&data[start..]);
        for (i, t) in positions(self.window).enumerate().skip(self.window - half) {
            smoothed[start + i] = evaluate(&tail, t);
        }

        Ok(smoothed)
    }

    /// Least-squares polynomial coefficients (in scaled positions) for exactly one window.
    fn fit(&self, samples: &[f64]) -> Vec<f64> {
        let mut rhs = vec![0_f64; self.order + 1];
        for (t, y) in positions(self.window).zip(samples.iter()) {
            let mut power = 1.0;
            for r in rhs.iter_mut() {
                *r += power * y;
                power *= t;
            }
        }

        solve(normal_matrix(self.window, self.order), rhs)
    }
}

/// Scaled sample positions of a window, from -1 to 1.
fn positions(window: usize) -> impl Iterator<Item = f64> {
    let half = (window / 2) as f64;
    (0..window).map(move |j| {
        if half == 0.0 {
            0.0
        } else {
            (j as f64 - half) / half
        }
    })
}

/// Gram matrix `A^T A` of the Vandermonde matrix over the window positions.
fn normal_matrix(window: usize, order: usize) -> Vec<Vec<f64>> {
    let mut moments = vec![0_f64; 2 * order + 1];
    for t in positions(window) {
        let mut power = 1.0;
        for m in moments.iter_mut() {
            *m += power;
            power *= t;
        }
    }

    (0..=order)
        .map(|row| (0..=order).map(|col| moments[row + col]).collect())
        .collect()
}

/// Horner evaluation of `coeffs[0] + coeffs[1] t + ..`.
fn evaluate(coeffs: &[f64], t: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * t + c)
}

/// Gaussian elimination with partial pivoting. The normal matrices solved here are symmetric
/// positive definite, so a pivot is always available.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0_f64; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64], tolerance: f64) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
            assert!(
                (a - e).abs() <= tolerance,
                "sample {}: expected {}, got {}",
                i,
                e,
                a
            );
        }
    }

    #[test]
    fn classic_five_point_quadratic_weights() -> anyhow::Result<()> {
        let filter = SavitzkyGolay::new(5, 2)?;
        let expected = [-3.0, 12.0, 17.0, 12.0, -3.0].map(|c| c / 35.0);
        assert_close(filter.coefficients(), &expected, 1e-12);
        Ok(())
    }

    #[test]
    fn matches_scipy_interp_mode() -> anyhow::Result<()> {
        // scipy.signal.savgol_filter([2, 2, 5, 2, 1, 0, 1, 4, 9], 5, 2)
        let data = [2.0, 2.0, 5.0, 2.0, 1.0, 0.0, 1.0, 4.0, 9.0];
        let smoothed = SavitzkyGolay::new(5, 2)?.apply(&data)?;
        assert_close(
            &smoothed,
            &[1.66, 3.17, 3.54, 2.86, 0.66, 0.17, 1.0, 4.0, 9.0],
            0.01,
        );
        Ok(())
    }

    #[test]
    fn constant_series_stays_constant() -> anyhow::Result<()> {
        let data = vec![523.25; 10_000];
        let smoothed = SavitzkyGolay::new(3601, 3)?.apply(&data)?;

        assert_eq!(smoothed.len(), data.len());
        assert_close(&smoothed, &data, 1e-8);
        Ok(())
    }

    #[test]
    fn cubic_series_passes_through_unchanged() -> anyhow::Result<()> {
        let data = (0..400)
            .map(|i| {
                let x = i as f64 / 100.0;
                0.5 * x * x * x - 2.0 * x * x + x + 7.0
            })
            .collect::<Vec<_>>();
        let smoothed = SavitzkyGolay::new(31, 3)?.apply(&data)?;

        assert_close(&smoothed, &data, 1e-9);
        Ok(())
    }

    #[test]
    fn window_equal_to_series_length_is_allowed() -> anyhow::Result<()> {
        let data = [1.0, 4.0, 9.0, 16.0, 25.0];
        let smoothed = SavitzkyGolay::new(5, 2)?.apply(&data)?;
        assert_close(&smoothed, &data, 1e-9);
        Ok(())
    }

    #[test]
    fn removes_fast_noise_but_keeps_the_daily_shape() -> anyhow::Result<()> {
        let day = 86_400;
        let signal = (0..day)
            .map(|s| 500.0 + 200.0 * (2.0 * std::f64::consts::PI * s as f64 / day as f64).sin())
            .collect::<Vec<_>>();
        let noisy = signal
            .iter()
            .enumerate()
            .map(|(s, v)| v + if s % 2 == 0 { 25.0 } else { -25.0 })
            .collect::<Vec<_>>();

        let smoothed = SavitzkyGolay::new(3601, 3)?.apply(&noisy)?;

        let max_error = smoothed
            .iter()
            .zip(signal.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        assert!(max_error < 1.0, "max error {}", max_error);
        Ok(())
    }

    #[test]
    fn even_window_is_rejected() {
        assert!(matches!(
            SavitzkyGolay::new(3600, 3),
            Err(AnalysisError::InvalidWindow { window: 3600, .. })
        ));
    }

    #[test]
    fn zero_window_and_high_order_are_rejected() {
        assert!(SavitzkyGolay::new(0, 0).is_err());
        assert!(SavitzkyGolay::new(3, 3).is_err());
    }

    #[test]
    fn window_longer_than_series_is_rejected() -> anyhow::Result<()> {
        let filter = SavitzkyGolay::new(3601, 3)?;
        assert_eq!(
            filter.apply(&[1.0; 100]),
            Err(AnalysisError::InvalidWindow {
                window: 3601,
                order: 3,
                len: 100
            })
        );
        Ok(())
    }
}
