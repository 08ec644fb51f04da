//! Right-hand sides of the systems being integrated.

use ndarray::prelude::*;

/// Right-hand side of a first-order system `dy/dt = f(y, t)`.
///
/// Implementations must be pure: the solver evaluates them at intermediate
/// stage states as well as at grid points, and the determinism of
/// [`odeint`](crate::odeint) relies on repeated calls giving the same
/// answer. The length of the returned derivative is checked by the solver.
pub trait Model {
    /// Returns the time derivative of `state` at time `t`.
    fn evaluate(&self, state: ArrayView1<'_, f64>, t: f64) -> Array1<f64>;
}

impl<F> Model for F
where
    F: Fn(ArrayView1<'_, f64>, f64) -> Array1<f64>,
{
    fn evaluate(&self, state: ArrayView1<'_, f64>, t: f64) -> Array1<f64> {
        self(state, t)
    }
}

/// Lets a model be chosen at runtime and passed by reference.
impl<'a> Model for &'a dyn Model {
    fn evaluate(&self, state: ArrayView1<'_, f64>, t: f64) -> Array1<f64> {
        (**self).evaluate(state, t)
    }
}

impl Model for Box<dyn Model> {
    fn evaluate(&self, state: ArrayView1<'_, f64>, t: f64) -> Array1<f64> {
        (**self).evaluate(state, t)
    }
}
