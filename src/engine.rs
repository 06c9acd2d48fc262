use crate::config::Config;
use crate::model::ChildModel;
use crate::solver::Rk4;
use crate::types::{Cohort, Trajectory};
use anyhow::{Context, Result};
use rmp_serde::{decode, encode};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Simulation engine.
///
/// Holds the configuration, the initial cohort and the model built from
/// them, and runs the integration over the configured horizon.
pub struct Engine {
    cfg: Config,
    cohort: Cohort,
    model: ChildModel,
}

impl Engine {
    /// Create a new `Engine` from a validated configuration.
    ///
    /// Fails before any step is taken if the intake cannot cover the horizon.
    pub fn new(cfg: Config) -> Result<Self> {
        let cohort = cfg.cohort().context("failed to construct cohort")?;
        let intake = cfg.intake().context("failed to construct intake")?;

        let n_steps = Rk4::new(cfg.solver.dt).n_steps(cfg.solver.days);
        intake
            .check_coverage(cohort.n_ind(), n_steps)
            .context("intake does not cover the simulated horizon")?;

        let model = ChildModel::new(&cohort, cfg.solver.reference, intake);

        Ok(Self { cfg, cohort, model })
    }

    /// Integrate the cohort over the configured horizon.
    pub fn perform_simulation(&self) -> Result<Trajectory> {
        let rk4 = Rk4::new(self.cfg.solver.dt);
        log::info!(
            "simulating {} individuals over {} steps",
            self.cohort.n_ind(),
            rk4.n_steps(self.cfg.solver.days)
        );

        let traj = rk4
            .integrate(
                &self.model,
                &self.cohort.age,
                &self.cohort.ffm,
                &self.cohort.fm,
                self.cfg.solver.days,
            )
            .context("failed to integrate")?;
        log::info!("integrated {} steps", traj.n_cols() - 1);

        if let (true, Some(first)) = (self.cfg.solver.check, traj.invalid.first()) {
            log::warn!(
                "{} entries with non-positive mass, first for individual {} at step {}",
                traj.invalid.len(),
                first.individual,
                first.step
            );
        }

        Ok(traj)
    }
}

/// Save a trajectory to a MessagePack-encoded file.
pub fn save_trajectory<P: AsRef<Path>>(traj: &Trajectory, file: P) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    encode::write_named(&mut writer, traj).context("failed to serialize trajectory")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}

/// Load a trajectory previously written by [`save_trajectory`].
pub fn load_trajectory<P: AsRef<Path>>(file: P) -> Result<Trajectory> {
    let file = file.as_ref();
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(file);
    let traj = decode::from_read(&mut reader).context("failed to deserialize trajectory")?;
    Ok(traj)
}
