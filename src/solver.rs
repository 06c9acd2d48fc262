//! Fixed-step fourth-order Runge-Kutta integration of the mass compartments.

use crate::error::ModelError;
use crate::types::Trajectory;
use ndarray::{Array1, Zip};

/// Days per year, converting step sizes into age increments.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Rates of change (kg/day) of both compartments for every individual.
#[derive(Debug, Clone, PartialEq)]
pub struct MassRates {
    pub ffm: Array1<f64>,
    pub fm: Array1<f64>,
}

/// Right-hand side of the mass balance system.
///
/// Age (years) is a time-varying parameter rather than a state variable.
pub trait MassSystem {
    fn d_mass(
        &self,
        age: &Array1<f64>,
        ffm: &Array1<f64>,
        fm: &Array1<f64>,
    ) -> Result<MassRates, ModelError>;
}

/// Fixed-step RK4 with step `dt` in days.
///
/// Stage states are perturbed by the raw stage rates (`y + 0.5·k`, `y + k`)
/// while age advances by `0.5·dt` and `dt`. Only the final blend is scaled
/// by `dt`. This reduces to classical RK4 when `dt = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rk4 {
    pub dt: f64,
}

impl Rk4 {
    pub fn new(dt: f64) -> Self {
        Self { dt }
    }

    /// Number of steps needed to cover `days`.
    pub fn n_steps(&self, days: f64) -> usize {
        (days / self.dt).floor() as usize
    }

    /// Advance `(ffm, fm)` by one step starting at `age`.
    pub fn step<S: MassSystem>(
        &self,
        sys: &S,
        age: &Array1<f64>,
        ffm: &Array1<f64>,
        fm: &Array1<f64>,
    ) -> Result<(Array1<f64>, Array1<f64>), ModelError> {
        let dt = self.dt;
        let half_age = age + 0.5 * dt / DAYS_PER_YEAR;
        let full_age = age + dt / DAYS_PER_YEAR;

        let k1 = sys.d_mass(age, ffm, fm)?;
        let k2 = sys.d_mass(
            &half_age,
            &(ffm + &(&k1.ffm * 0.5)),
            &(fm + &(&k1.fm * 0.5)),
        )?;
        let k3 = sys.d_mass(
            &half_age,
            &(ffm + &(&k2.ffm * 0.5)),
            &(fm + &(&k2.fm * 0.5)),
        )?;
        let k4 = sys.d_mass(&full_age, &(ffm + &k3.ffm), &(fm + &k3.fm))?;

        let ffm_next = combine(ffm, dt, [&k1.ffm, &k2.ffm, &k3.ffm, &k4.ffm]);
        let fm_next = combine(fm, dt, [&k1.fm, &k2.fm, &k3.fm, &k4.fm]);
        Ok((ffm_next, fm_next))
    }

    /// Integrate from the initial state over `days` and record every step.
    pub fn integrate<S: MassSystem>(
        &self,
        sys: &S,
        age_0: &Array1<f64>,
        ffm_0: &Array1<f64>,
        fm_0: &Array1<f64>,
        days: f64,
    ) -> Result<Trajectory, ModelError> {
        let n_steps = self.n_steps(days);
        let mut traj = Trajectory::with_shape(age_0.len(), n_steps);
        traj.record(0, 0.0, age_0.view(), ffm_0.view(), fm_0.view());

        let mut age = age_0.clone();
        let mut ffm = ffm_0.clone();
        let mut fm = fm_0.clone();

        let progress_every = (n_steps / 10).max(1);
        for i_step in 1..=n_steps {
            let (ffm_next, fm_next) = self.step(sys, &age, &ffm, &fm)?;
            ffm = ffm_next;
            fm = fm_next;
            age = age_0 + i_step as f64 * self.dt / DAYS_PER_YEAR;

            traj.record(
                i_step,
                i_step as f64 * self.dt,
                age.view(),
                ffm.view(),
                fm.view(),
            );

            if i_step % progress_every == 0 {
                let progress = 100.0 * i_step as f64 / n_steps as f64;
                log::info!("completed {progress:06.2}%");
            }
        }

        Ok(traj)
    }
}

fn combine(y: &Array1<f64>, dt: f64, k: [&Array1<f64>; 4]) -> Array1<f64> {
    let mut next = y.clone();
    Zip::from(&mut next)
        .and(k[0])
        .and(k[1])
        .and(k[2])
        .and(k[3])
        .for_each(|y, &k1, &k2, &k3, &k4| {
            *y += dt * (k1 + 2.0 * k2 + 2.0 * k3 + k4) / 6.0;
        });
    next
}
