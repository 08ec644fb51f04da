//! Double pendulum: two point bobs on massless rods, the second hanging
//! from the first.
//!
//! Both angles are measured from the downward vertical. [`DoublePendulum`]
//! works on `[θ1, ω1, θ2, ω2]` and carries its parameters itself;
//! [`EmbeddedDoublePendulum`] works on the nine-slot state `[θ1, ω1, θ2,
//! ω2, g, m1, m2, l1, l2]` that carries the parameters through the
//! integration instead.

use ndarray::prelude::*;

use crate::model::Model;
use crate::pendulum::STANDARD_GRAVITY;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoublePendulumParams {
    /// Gravitational acceleration (m/s²).
    pub gravity: f64,
    /// Mass of the upper bob (kg).
    pub mass1: f64,
    /// Mass of the lower bob (kg).
    pub mass2: f64,
    /// Length of the upper rod (m).
    pub length1: f64,
    /// Length of the lower rod (m).
    pub length2: f64,
}

impl Default for DoublePendulumParams {
    fn default() -> DoublePendulumParams {
        DoublePendulumParams {
            gravity: STANDARD_GRAVITY,
            mass1: 1.,
            mass2: 1.,
            length1: 1.,
            length2: 1.,
        }
    }
}

impl DoublePendulumParams {
    /// Angular accelerations `(θ1'', θ2'')` at the given configuration.
    pub fn accelerations(&self, theta1: f64, omega1: f64, theta2: f64, omega2: f64) -> (f64, f64) {
        let DoublePendulumParams {
            gravity: g,
            mass1: m1,
            mass2: m2,
            length1: l1,
            length2: l2,
        } = *self;
        let (s, c) = (theta1 - theta2).sin_cos();
        let denominator = m1 + m2 * s * s;

        let alpha1 = (m2 * g * theta2.sin() * c
            - m2 * s * (l1 * omega1 * omega1 * c + l2 * omega2 * omega2)
            - (m1 + m2) * g * theta1.sin())
            / l1
            / denominator;
        let alpha2 = ((m1 + m2)
            * (l1 * omega1 * omega1 * s - g * theta2.sin() + g * theta1.sin() * c)
            + m2 * l2 * omega2 * omega2 * s * c)
            / l2
            / denominator;
        (alpha1, alpha2)
    }

    /// Total mechanical energy `T + V` of the state `[θ1, ω1, θ2, ω2, ..]`,
    /// with the potential measured from the pivot.
    ///
    /// **Panics** if `state` is shorter than four.
    pub fn energy(&self, state: ArrayView1<'_, f64>) -> f64 {
        let DoublePendulumParams {
            gravity: g,
            mass1: m1,
            mass2: m2,
            length1: l1,
            length2: l2,
        } = *self;
        let (theta1, omega1, theta2, omega2) = (state[0], state[1], state[2], state[3]);

        let potential = -(m1 + m2) * l1 * g * theta1.cos() - m2 * l2 * g * theta2.cos();
        let v1 = l1 * omega1;
        let v2 = l2 * omega2;
        let kinetic = 0.5 * m1 * v1 * v1
            + 0.5 * m2 * (v1 * v1 + v2 * v2 + 2. * v1 * v2 * (theta1 - theta2).cos());
        kinetic + potential
    }

    /// Cartesian positions of both bobs relative to the pivot, `y` up.
    pub fn bob_positions(&self, theta1: f64, theta2: f64) -> [(f64, f64); 2] {
        let upper = (self.length1 * theta1.sin(), -self.length1 * theta1.cos());
        let lower = (
            upper.0 + self.length2 * theta2.sin(),
            upper.1 - self.length2 * theta2.cos(),
        );
        [upper, lower]
    }
}

/// Double pendulum on the state `[θ1, ω1, θ2, ω2]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DoublePendulum {
    pub params: DoublePendulumParams,
}

impl DoublePendulum {
    pub const LEN: usize = 4;

    pub fn new(params: DoublePendulumParams) -> DoublePendulum {
        DoublePendulum { params }
    }
}

impl Model for DoublePendulum {
    /// A state that is not four long gets a zero derivative of length four.
    fn evaluate(&self, state: ArrayView1<'_, f64>, _t: f64) -> Array1<f64> {
        if state.len() != Self::LEN {
            return Array1::zeros(Self::LEN);
        }
        let (omega1, omega2) = (state[1], state[3]);
        let (alpha1, alpha2) = self.params.accelerations(state[0], omega1, state[2], omega2);
        array![omega1, alpha1, omega2, alpha2]
    }
}

/// Double pendulum whose parameters ride along in the state vector.
///
/// The derivative of each parameter slot is zero, so the parameters stay
/// fixed for the whole integration and each trajectory row is
/// self-describing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EmbeddedDoublePendulum;

impl EmbeddedDoublePendulum {
    pub const LEN: usize = 9;

    /// Builds the nine-slot initial state.
    pub fn pack(
        params: &DoublePendulumParams,
        theta1: f64,
        omega1: f64,
        theta2: f64,
        omega2: f64,
    ) -> Array1<f64> {
        array![
            theta1,
            omega1,
            theta2,
            omega2,
            params.gravity,
            params.mass1,
            params.mass2,
            params.length1,
            params.length2,
        ]
    }

    /// Reads the parameters back out of a nine-slot state.
    ///
    /// **Panics** if `state` is shorter than nine.
    pub fn params(state: ArrayView1<'_, f64>) -> DoublePendulumParams {
        DoublePendulumParams {
            gravity: state[4],
            mass1: state[5],
            mass2: state[6],
            length1: state[7],
            length2: state[8],
        }
    }
}

impl Model for EmbeddedDoublePendulum {
    /// A state that is not nine long gets a zero derivative of length nine.
    fn evaluate(&self, state: ArrayView1<'_, f64>, _t: f64) -> Array1<f64> {
        let mut dz = Array1::zeros(Self::LEN);
        if state.len() != Self::LEN {
            return dz;
        }
        let (omega1, omega2) = (state[1], state[3]);
        let (alpha1, alpha2) =
            Self::params(state).accelerations(state[0], omega1, state[2], omega2);
        dz[0] = omega1;
        dz[1] = alpha1;
        dz[2] = omega2;
        dz[3] = alpha2;
        dz
    }
}
