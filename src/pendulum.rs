//! Single pendulum: a point bob on a massless rod, state `[θ, ω]`.
//!
//! `θ` is the angle from the downward vertical in radians and `ω = dθ/dt`.

use ndarray::prelude::*;
use std::f64::consts::PI;

use crate::model::Model;

/// Standard gravitational acceleration (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.81;
/// Dynamic viscosity of air (kg/(m·s)).
pub const AIR_VISCOSITY: f64 = 1.827e-5;
/// Dynamic viscosity of water (kg/(m·s)).
pub const WATER_VISCOSITY: f64 = 8.9e-4;

/// Physical parameters of a single pendulum.
///
/// The mass, bob radius and viscosity only matter for [`Damped`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendulumParams {
    /// Gravitational acceleration (m/s²).
    pub gravity: f64,
    /// Rod length (m).
    pub length: f64,
    /// Bob mass (kg).
    pub mass: f64,
    /// Bob radius (m).
    pub bob_radius: f64,
    /// Dynamic viscosity of the surrounding fluid (kg/(m·s)).
    pub viscosity: f64,
}

impl Default for PendulumParams {
    /// A 1 g bob of radius 10 cm on a 70 cm rod, swinging in water.
    fn default() -> PendulumParams {
        PendulumParams {
            gravity: STANDARD_GRAVITY,
            length: 0.7,
            mass: 0.001,
            bob_radius: 0.1,
            viscosity: WATER_VISCOSITY,
        }
    }
}

impl PendulumParams {
    /// Frictionless pendulum of the given length under the given gravity.
    pub fn new(gravity: f64, length: f64) -> PendulumParams {
        PendulumParams {
            gravity,
            length,
            viscosity: 0.,
            ..PendulumParams::default()
        }
    }

    /// Sets the bob and the fluid that cause drag.
    pub fn with_drag(self, mass: f64, bob_radius: f64, viscosity: f64) -> PendulumParams {
        PendulumParams {
            mass,
            bob_radius,
            viscosity,
            ..self
        }
    }

    /// Linear drag coefficient `B = 2π r μ` (kg/s).
    pub fn drag_coefficient(&self) -> f64 {
        2. * PI * self.bob_radius * self.viscosity
    }

    /// Damping rate `B / m` (1/s).
    pub fn damping_rate(&self) -> f64 {
        self.drag_coefficient() / self.mass
    }

    /// `g / l` (1/s²).
    pub fn stiffness(&self) -> f64 {
        self.gravity / self.length
    }

    /// Angular frequency of small oscillations, `√(g/l)`.
    pub fn natural_frequency(&self) -> f64 {
        self.stiffness().sqrt()
    }

    /// Period of small oscillations, `2π √(l/g)`.
    pub fn small_angle_period(&self) -> f64 {
        2. * PI / self.natural_frequency()
    }

    /// State for a release at angle `theta0` with tangential bob speed
    /// `speed` (m/s).
    pub fn initial_state(&self, theta0: f64, speed: f64) -> Array1<f64> {
        array![theta0, speed / self.length]
    }

    /// Mechanical energy per unit mass, `½ l² ω² − g l cos θ`.
    ///
    /// Constant along exact solutions of [`Undamped`].
    ///
    /// **Panics** if `state` is shorter than two.
    pub fn energy(&self, state: ArrayView1<'_, f64>) -> f64 {
        let (theta, omega) = (state[0], state[1]);
        let l = self.length;
        0.5 * l * l * omega * omega - self.gravity * l * theta.cos()
    }

    /// Cartesian position of the bob relative to the pivot, `y` up.
    pub fn bob_position(&self, theta: f64) -> (f64, f64) {
        (self.length * theta.sin(), -self.length * theta.cos())
    }
}

/// Splits `[θ, ω]`, or returns `None` for a state of any other length.
fn unpack(state: ArrayView1<'_, f64>) -> Option<(f64, f64)> {
    if state.len() == 2 {
        Some((state[0], state[1]))
    } else {
        None
    }
}

/// The models below answer a state of the wrong length with a zero
/// derivative of length 2, which the solver reports as a dimension mismatch.
fn mismatched() -> Array1<f64> {
    Array1::zeros(2)
}

/// `θ'' = −(g/l) sin θ`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Undamped {
    pub params: PendulumParams,
}

impl Undamped {
    pub fn new(params: PendulumParams) -> Undamped {
        Undamped { params }
    }
}

impl Model for Undamped {
    fn evaluate(&self, state: ArrayView1<'_, f64>, _t: f64) -> Array1<f64> {
        match unpack(state) {
            Some((theta, omega)) => array![omega, -self.params.stiffness() * theta.sin()],
            None => mismatched(),
        }
    }
}

/// `θ'' = −(B/m) ω − (g/l) sin θ`, linear drag on the bob.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Damped {
    pub params: PendulumParams,
}

impl Damped {
    pub fn new(params: PendulumParams) -> Damped {
        Damped { params }
    }
}

impl Model for Damped {
    fn evaluate(&self, state: ArrayView1<'_, f64>, _t: f64) -> Array1<f64> {
        match unpack(state) {
            Some((theta, omega)) => array![
                omega,
                -self.params.damping_rate() * omega - self.params.stiffness() * theta.sin()
            ],
            None => mismatched(),
        }
    }
}

/// Small-angle approximation, `θ'' = −(g/l) θ`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Linearized {
    pub params: PendulumParams,
}

impl Linearized {
    pub fn new(params: PendulumParams) -> Linearized {
        Linearized { params }
    }

    /// Exact angle at time `t` after release from rest at `theta0`.
    pub fn exact(&self, theta0: f64, t: f64) -> f64 {
        theta0 * (self.params.natural_frequency() * t).cos()
    }
}

impl Model for Linearized {
    fn evaluate(&self, state: ArrayView1<'_, f64>, _t: f64) -> Array1<f64> {
        match unpack(state) {
            Some((theta, omega)) => array![omega, -self.params.stiffness() * theta],
            None => mismatched(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[cfg(feature = "serde")]
    #[test]
    fn params_load_from_json() {
        let params: PendulumParams = serde_json::from_str(
            r#"{"gravity": 9.81, "length": 0.5, "mass": 0.9, "bob_radius": 0.2, "viscosity": 1.827e-5}"#,
        )
        .unwrap();
        assert_eq!(
            params,
            PendulumParams::new(9.81, 0.5).with_drag(0.9, 0.2, AIR_VISCOSITY)
        );
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(serde_json::from_str::<PendulumParams>(&json).unwrap(), params);
    }

    #[test]
    fn drag_in_water() {
        let params = PendulumParams::default();
        assert_relative_eq!(params.drag_coefficient(), 5.592e-4, max_relative = 1e-3);
        assert_relative_eq!(params.damping_rate(), 0.5592, max_relative = 1e-3);
        let air = params.with_drag(0.001, 0.1, AIR_VISCOSITY);
        assert!(air.damping_rate() < params.damping_rate());
    }

    #[test]
    fn frictionless_constructor_has_no_drag() {
        let params = PendulumParams::new(9.81, 1.);
        assert_eq!(params.damping_rate(), 0.);
        assert_relative_eq!(params.small_angle_period(), 2.006, max_relative = 1e-3);
    }

    #[test]
    fn initial_state_converts_speed() {
        let params = PendulumParams::new(9.81, 0.5);
        assert_eq!(params.initial_state(0.3, 1.), array![0.3, 2.]);
    }

    #[test]
    fn bob_hangs_below_pivot_at_rest() {
        let params = PendulumParams::new(9.81, 0.7);
        let (x, y) = params.bob_position(0.);
        assert_eq!(x, 0.);
        assert_eq!(y, -0.7);
        let (x, y) = params.bob_position(PI / 2.);
        assert_relative_eq!(x, 0.7);
        assert!(y.abs() < 1e-15);
    }

    #[test]
    fn models_at_rest_position() {
        let params = PendulumParams::default();
        let rest = array![0., 0.];
        assert_eq!(Undamped::new(params).evaluate(rest.view(), 0.), array![0., 0.]);
        assert_eq!(Damped::new(params).evaluate(rest.view(), 0.), array![0., 0.]);
        assert_eq!(Linearized::new(params).evaluate(rest.view(), 0.), array![0., 0.]);
    }

    #[test]
    fn linearization_agrees_for_small_angles() {
        let params = PendulumParams::new(9.81, 0.7);
        let state = array![1e-4, 0.2];
        let full = Undamped::new(params).evaluate(state.view(), 0.);
        let linear = Linearized::new(params).evaluate(state.view(), 0.);
        assert_relative_eq!(full[1], linear[1], max_relative = 1e-8);
    }

    #[test]
    fn damping_opposes_motion() {
        let params = PendulumParams::default();
        let dy = Damped::new(params).evaluate(aview1(&[0., 1.]), 0.);
        assert_relative_eq!(dy[1], -params.damping_rate());
    }

    #[test]
    fn wrong_length_state_gives_two_derivatives() {
        let model = Undamped::new(PendulumParams::default());
        assert_eq!(model.evaluate(aview1(&[0.1, 0., 5.]), 0.).len(), 2);
        // Non-contiguous views are accepted too.
        let states = array![[0.5, 9.], [0., 9.]];
        assert_eq!(model.evaluate(states.column(0), 0.)[0], 0.);
    }
}
