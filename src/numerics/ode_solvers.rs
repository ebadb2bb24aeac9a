//! Solver for system of ordinary differential equations (ODE)

use ndarray::*;

/// Integrates a system of ODEs over a single time step using 4th order Runge-Kutta
///
/// `f(t, x)` returns the derivative of the state `x` at time `t`.
///
/// # Examples
///
/// Exponential growth, `x' = x`:
/// ```
/// use ndarray::array;
/// use torque_curve::ode_solvers::rk4_step;
/// let next = rk4_step(|_, x| x.clone(), &array![1.0], 0.0, 1e-3);
/// assert!((next[0] - 1e-3f64.exp()).abs() < 1e-12);
/// ```
pub fn rk4_step<F>(f: F, x: &Array1<f64>, t: f64, step: f64) -> Array1<f64>
where
    F: Fn(f64, &Array1<f64>) -> Array1<f64>,
{
    let half = step / 2.0;
    let k1 = f(t, x);
    let k2 = f(t + half, &(x + &(&k1 * half)));
    let k3 = f(t + half, &(x + &(&k2 * half)));
    let k4 = f(t + step, &(x + &(&k3 * step)));
    x + &((step / 6.0) * (k1 + 2.0 * k2 + 2.0 * k3 + k4))
}

/// Integrates a system of ODEs over a single time step using explicit Euler method
pub fn euler_step<F>(f: F, x: &Array1<f64>, t: f64, step: f64) -> Array1<f64>
where
    F: Fn(f64, &Array1<f64>) -> Array1<f64>,
{
    x + &(step * f(t, x))
}

/// Integration scheme selectable at run time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    RungeKutta4,
    Euler,
}

impl Scheme {
    pub fn step<F>(self, f: F, x: &Array1<f64>, t: f64, step: f64) -> Array1<f64>
    where
        F: Fn(f64, &Array1<f64>) -> Array1<f64>,
    {
        match self {
            Scheme::RungeKutta4 => rk4_step(f, x, t, step),
            Scheme::Euler => euler_step(f, x, t, step),
        }
    }
}
