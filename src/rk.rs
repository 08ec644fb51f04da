//! Fixed-step Runge–Kutta solvers.

use lazy_static::lazy_static;
use ndarray::prelude::*;
use std::marker::PhantomData;
use tracing::{debug, trace};

use crate::error::{GridDefect, IntegrateError};
use crate::model::Model;
use crate::trajectory::Trajectory;
use crate::OdeIntegrate;

/// Checks that the grid is non-empty, finite and non-decreasing.
fn validate_grid(grid: ArrayView1<f64>) -> Result<(), GridDefect> {
    if grid.is_empty() {
        return Err(GridDefect::Empty);
    }
    for (index, &t) in grid.iter().enumerate() {
        if !t.is_finite() {
            return Err(GridDefect::NotFinite { index });
        }
        if index > 0 && t < grid[index - 1] {
            return Err(GridDefect::Decreasing { index });
        }
    }
    Ok(())
}

/// Explicit Runge–Kutta solver stepping along a caller-supplied time grid.
///
/// Each call to `.step()` advances the state from one grid point to the
/// next, using the gap between them as the step size. There is no error
/// control; the accuracy is governed entirely by the grid spacing.
///
/// The solver is also an iterator over the rows of the trajectory, starting
/// with the initial state, so long grids can be consumed without
/// materializing the whole solution.
#[derive(Clone, Debug)]
pub struct FixedStep<M, O = RK4>
where
    M: Model,
    O: RKMethod,
{
    model: M,
    method: PhantomData<O>,
    /// Time points at which the solution is sampled.
    grid: Array1<f64>,
    /// Initial state, kept for `.restart()`.
    y0: Array1<f64>,
    /// Index into `grid` of the current state.
    index: usize,
    /// Current state.
    y: Array1<f64>,
    /// Storage array for Runge–Kutta stages, shape `O::NUM_STAGES, self.len()`.
    k: Array2<f64>,
    /// Whether the iterator has already produced the current state.
    yielded: bool,
    /// Set once a step has failed; the iterator is fused after that.
    failed: bool,
}

impl<M, O> FixedStep<M, O>
where
    M: Model,
    O: RKMethod,
{
    /// Creates a new `FixedStep` solver.
    ///
    /// # Parameters
    ///
    /// * `model`: Right-hand side of the system.
    ///
    /// * `y0`: Initial values of the dependent variable. The dimension of
    ///   the system is `y0.len()` for the whole run.
    ///
    /// * `grid`: Time points at which the solution is wanted, in
    ///   non-decreasing order. The first point is the initial time.
    ///   Repeated points are allowed and produce repeated rows.
    pub fn new(
        model: M,
        y0: Array1<f64>,
        grid: Array1<f64>,
    ) -> Result<FixedStep<M, O>, IntegrateError> {
        if y0.is_empty() {
            return Err(IntegrateError::InvalidInitialState);
        }
        validate_grid(grid.view())?;

        let k = Array2::zeros((O::NUM_STAGES, y0.len()));
        Ok(FixedStep {
            model,
            method: PhantomData,
            grid,
            y: y0.clone(),
            y0,
            index: 0,
            k,
            yielded: false,
            failed: false,
        })
    }

    /// The time grid being followed.
    pub fn grid(&self) -> ArrayView1<'_, f64> {
        self.grid.view()
    }

    /// Index into the grid of the current state.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Rewinds the solver to the initial state and the first grid point.
    pub fn restart(&mut self) {
        self.y.assign(&self.y0);
        self.index = 0;
        self.yielded = false;
        self.failed = false;
    }

    /// Evaluates the model, checking the length of the derivative.
    fn eval(&self, y: ArrayView1<f64>, t: f64) -> Result<Array1<f64>, IntegrateError> {
        let dy = self.model.evaluate(y, t);
        if dy.len() != self.y.len() {
            return Err(IntegrateError::DimensionMismatch {
                expected: self.y.len(),
                found: dy.len(),
                t,
            });
        }
        Ok(dy)
    }

    /// Performs a single Runge–Kutta step of size `t_new - t` from the
    /// current state and returns the new state.
    ///
    /// Stage `s` is evaluated at `y + h * (a[s] · k[..s])`. The stage with
    /// `c == 1` is evaluated at `t_new` itself rather than `t + h`.
    fn step_to(&mut self, t: f64, t_new: f64) -> Result<Array1<f64>, IntegrateError> {
        let h = t_new - t;

        let f = self.eval(self.y.view(), t)?;
        self.k.row_mut(0).assign(&f);
        for (s, (a, &c)) in O::a().iter().zip(O::c()).enumerate() {
            let dy = self.k.slice(s![..s + 1, ..]).t().dot(a) * h;
            let t_stage = if c == 1. { t_new } else { t + c * h };
            let f = self.eval((dy + &self.y).view(), t_stage)?;
            self.k.row_mut(s + 1).assign(&f);
        }

        Ok(h * self.k.t().dot(&O::b()) + &self.y)
    }

    fn current(&self) -> (f64, Array1<f64>) {
        (self.time(), self.y.clone())
    }
}

impl<M, O> OdeIntegrate for FixedStep<M, O>
where
    M: Model,
    O: RKMethod,
{
    fn len(&self) -> usize {
        self.y.len()
    }

    fn step(&mut self) -> Result<(), IntegrateError> {
        if self.finished() {
            return Ok(());
        }
        let t = self.grid[self.index];
        let t_new = self.grid[self.index + 1];
        let y_new = self.step_to(t, t_new)?;

        self.y = y_new;
        self.index += 1;
        self.yielded = false;
        trace!(index = self.index, t = t_new, "accepted step");
        Ok(())
    }

    fn time(&self) -> f64 {
        self.grid[self.index]
    }

    fn time_bound(&self) -> f64 {
        self.grid[self.grid.len() - 1]
    }

    fn state(&self) -> ArrayView1<'_, f64> {
        self.y.view()
    }

    /// Repeated trailing grid points still count as steps, so this compares
    /// grid indices rather than times.
    fn finished(&self) -> bool {
        self.index + 1 == self.grid.len()
    }
}

impl<M, O> Iterator for FixedStep<M, O>
where
    M: Model,
    O: RKMethod,
{
    type Item = Result<(f64, Array1<f64>), IntegrateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if !self.yielded {
            self.yielded = true;
            return Some(Ok(self.current()));
        }
        if self.finished() {
            return None;
        }
        match self.step() {
            Ok(()) => {
                self.yielded = true;
                Some(Ok(self.current()))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = self.grid.len() - self.index - 1 + usize::from(!self.yielded);
        (0, Some(remaining))
    }
}

/// Integrates `model` over `time_grid` with the classical fourth-order
/// Runge–Kutta method.
///
/// Row `i` of the returned trajectory is the state at `time_grid[i]`; row 0
/// is a copy of `y0`. On error no trajectory is returned.
///
/// # Errors
///
/// * `InvalidInitialState` if `y0` is empty.
/// * `InvalidGrid` if `time_grid` is empty, non-finite or decreasing.
/// * `DimensionMismatch` if `model` returns a derivative whose length
///   differs from `y0.len()`.
pub fn odeint<M>(
    model: M,
    y0: Array1<f64>,
    time_grid: Array1<f64>,
) -> Result<Trajectory, IntegrateError>
where
    M: Model,
{
    odeint_with::<M, RK4>(model, y0, time_grid)
}

/// Like [`odeint`], but with the Runge–Kutta method chosen by `O`.
pub fn odeint_with<M, O>(
    model: M,
    y0: Array1<f64>,
    time_grid: Array1<f64>,
) -> Result<Trajectory, IntegrateError>
where
    M: Model,
    O: RKMethod,
{
    let mut solver = FixedStep::<M, O>::new(model, y0, time_grid)?;
    debug!(
        points = solver.grid.len(),
        dim = solver.len(),
        order = O::ORDER,
        "starting fixed-step integration"
    );

    let mut states = Array2::zeros((solver.grid.len(), solver.len()));
    states.row_mut(0).assign(&solver.state());
    while !solver.finished() {
        solver.step()?;
        states.row_mut(solver.index).assign(&solver.state());
    }

    debug!(t = solver.time(), "finished fixed-step integration");
    Ok(Trajectory::new(solver.grid, states))
}

pub trait RKMethod {
    /// Order of the method.
    const ORDER: usize;

    /// Number of stages in the method.
    const NUM_STAGES: usize;

    /// Coefficients for incrementing time for consecutive RK stages, length
    /// `NUM_STAGES - 1`.
    ///
    /// The value for the first stage is always zero, so it is not included.
    fn c() -> ArrayView1<'static, f64>;

    /// Coefficients for combining previous RK stages to compute the next
    /// stage, length `NUM_STAGES - 1`.
    ///
    /// For explicit methods the coefficients above the main diagonal are
    /// zeros, so `a` is stored as a list of arrays of increasing lengths. The
    /// first stage is always just `f`, thus no coefficients for it are
    /// required.
    fn a() -> &'static [ArrayView1<'static, f64>];

    /// Coefficients for combining RK stages for computing the final
    /// prediction, length `NUM_STAGES`.
    fn b() -> ArrayView1<'static, f64>;
}

/// Classical Runge–Kutta method of order 4.
///
/// With step `h` from `(t, y)`:
///
/// ```text
/// k1 = f(y, t)
/// k2 = f(y + h/2 k1, t + h/2)
/// k3 = f(y + h/2 k2, t + h/2)
/// k4 = f(y + h k3, t + h)
/// y' = y + h/6 (k1 + 2 k2 + 2 k3 + k4)
/// ```
///
/// The local truncation error is O(h^5), the global error O(h^4).
#[derive(Clone, Copy, Debug)]
pub struct RK4;

impl RKMethod for RK4 {
    const ORDER: usize = 4;

    const NUM_STAGES: usize = 4;

    fn c() -> ArrayView1<'static, f64> {
        aview1(&[1./2., 1./2., 1.])
    }

    fn a() -> &'static [ArrayView1<'static, f64>] {
        lazy_static! {
            static ref A: [ArrayView1<'static, f64>; 4 - 1] = [
                aview1(&[1./2.]),
                aview1(&[0., 1./2.]),
                aview1(&[0., 0., 1.]),
            ];
        }
        &*A
    }

    fn b() -> ArrayView1<'static, f64> {
        aview1(&[1./6., 1./3., 1./3., 1./6.])
    }
}

/// Forward Euler method of order 1.
///
/// Mostly useful as a baseline when checking the convergence of
/// higher-order methods.
#[derive(Clone, Copy, Debug)]
pub struct Euler;

impl RKMethod for Euler {
    const ORDER: usize = 1;

    const NUM_STAGES: usize = 1;

    fn c() -> ArrayView1<'static, f64> {
        aview1(&[])
    }

    fn a() -> &'static [ArrayView1<'static, f64>] {
        &[]
    }

    fn b() -> ArrayView1<'static, f64> {
        aview1(&[1.])
    }
}
