//! Fixed-step Runge–Kutta integration of pendulum models on `ndarray`
//! arrays.
//!
//! ```
//! use ndarray::prelude::*;
//! use ndarray_pendulum::odeint;
//! use ndarray_pendulum::pendulum::{PendulumParams, Undamped};
//! use std::f64::consts::PI;
//!
//! let params = PendulumParams::default();
//! let y0 = params.initial_state(PI / 6., 0.);
//! let trajectory = odeint(Undamped::new(params), y0, Array1::linspace(0., 50., 500))?;
//! assert_eq!(trajectory.initial(), aview1(&[PI / 6., 0.]));
//! # Ok::<(), ndarray_pendulum::IntegrateError>(())
//! ```

pub mod double_pendulum;
pub mod error;
pub mod model;
pub mod pendulum;
pub mod rk;
pub mod trajectory;

pub use crate::error::{GridDefect, IntegrateError};
pub use crate::model::Model;
pub use crate::rk::{odeint, odeint_with, FixedStep};
pub use crate::trajectory::Trajectory;

use ndarray::prelude::*;

pub trait OdeIntegrate {
    /// Returns the number of elements in the state.
    fn len(&self) -> usize;
    /// Advance the state to the next time point.
    fn step(&mut self) -> Result<(), IntegrateError>;
    /// Current time.
    fn time(&self) -> f64;
    /// The ending time.
    fn time_bound(&self) -> f64;
    /// Current state.
    fn state(&self) -> ArrayView1<'_, f64>;
    /// Returns `true` if the integration has reached `time_bound`.
    fn finished(&self) -> bool {
        self.time() == self.time_bound()
    }
    /// Integrate until reaching `time_bound`.
    fn run_to_bound(&mut self) -> Result<(), IntegrateError> {
        while !self.finished() {
            self.step()?;
        }
        Ok(())
    }
}
