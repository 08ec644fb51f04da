//! The sampled solution of an integration run.

use ndarray::prelude::*;
use tracing::warn;

use crate::error::IntegrateError;

/// States of a system sampled on a time grid.
///
/// There is one row per time point and one column per state component. A
/// trajectory always has at least one row, the initial state.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    times: Array1<f64>,
    states: Array2<f64>,
}

impl Trajectory {
    pub(crate) fn new(times: Array1<f64>, states: Array2<f64>) -> Trajectory {
        debug_assert_eq!(times.len(), states.nrows());
        debug_assert!(!times.is_empty());
        Trajectory { times, states }
    }

    /// Number of time points.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns `true` if there are no time points.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of components in each state.
    pub fn dim(&self) -> usize {
        self.states.ncols()
    }

    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.times.view()
    }

    /// All states, shape `(self.len(), self.dim())`.
    pub fn states(&self) -> ArrayView2<'_, f64> {
        self.states.view()
    }

    /// State at the `i`th time point.
    ///
    /// **Panics** if `i` is out of bounds.
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.states.row(i)
    }

    /// History of the `j`th state component.
    ///
    /// **Panics** if `j` is out of bounds.
    pub fn column(&self, j: usize) -> ArrayView1<'_, f64> {
        self.states.column(j)
    }

    pub fn initial(&self) -> ArrayView1<'_, f64> {
        self.row(0)
    }

    pub fn last(&self) -> ArrayView1<'_, f64> {
        self.row(self.len() - 1)
    }

    /// Iterates over `(time, state)` pairs in grid order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, ArrayView1<'_, f64>)> + '_ {
        self.times.iter().copied().zip(self.states.outer_iter())
    }

    /// Evaluates `quantity` on every state.
    pub fn map_rows<F>(&self, quantity: F) -> Array1<f64>
    where
        F: FnMut(ArrayView1<'_, f64>) -> f64,
    {
        self.states.outer_iter().map(quantity).collect()
    }

    /// Largest absolute deviation of `quantity` from its value at the
    /// initial state.
    ///
    /// A `NaN` anywhere in the series makes the result `NaN`.
    pub fn max_drift<F>(&self, quantity: F) -> f64
    where
        F: FnMut(ArrayView1<'_, f64>) -> f64,
    {
        let series = self.map_rows(quantity);
        let reference = series[0];
        series.fold(0., |max, &q| {
            let drift = (q - reference).abs();
            if drift.is_nan() || drift > max {
                drift
            } else {
                max
            }
        })
    }

    /// Checks that `quantity` (usually the total energy of an undamped
    /// system) never drifts more than `tolerance` from its initial value.
    ///
    /// Returns the observed maximum drift on success.
    pub fn check_drift<F>(&self, quantity: F, tolerance: f64) -> Result<f64, IntegrateError>
    where
        F: FnMut(ArrayView1<'_, f64>) -> f64,
    {
        let drift = self.max_drift(quantity);
        if drift <= tolerance {
            Ok(drift)
        } else {
            warn!(drift, tolerance, "maximum drift exceeded");
            Err(IntegrateError::EnergyDrift { drift, tolerance })
        }
    }

    /// Splits the trajectory into its time grid and state matrix.
    pub fn into_parts(self) -> (Array1<f64>, Array2<f64>) {
        (self.times, self.states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trajectory {
        Trajectory::new(
            array![0., 1., 2.],
            array![[1., 0.], [0.5, -1.], [-0.25, 2.]],
        )
    }

    #[test]
    fn accessors() {
        let trajectory = sample();
        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.dim(), 2);
        assert!(!trajectory.is_empty());
        assert_eq!(trajectory.initial(), aview1(&[1., 0.]));
        assert_eq!(trajectory.last(), aview1(&[-0.25, 2.]));
        assert_eq!(trajectory.column(1), aview1(&[0., -1., 2.]));
        let times: Vec<f64> = trajectory.iter().map(|(t, _)| t).collect();
        assert_eq!(times, vec![0., 1., 2.]);
    }

    #[test]
    fn drift_is_measured_from_the_first_row() {
        let trajectory = sample();
        assert_eq!(trajectory.max_drift(|y| y[0]), 1.25);
        assert_eq!(trajectory.check_drift(|y| y[1], 2.), Ok(2.));
        assert_eq!(
            trajectory.check_drift(|y| y[1], 1.5),
            Err(IntegrateError::EnergyDrift {
                drift: 2.,
                tolerance: 1.5
            })
        );
    }

    #[test]
    fn nan_counts_as_drift() {
        let trajectory = Trajectory::new(array![0., 1.], array![[0.], [f64::NAN]]);
        assert!(trajectory.max_drift(|y| y[0]).is_nan());
        assert!(trajectory.check_drift(|y| y[0], 1.).is_err());
    }
}
