use crate::analysis::Analyzer;
use crate::config::Config;
use crate::engine::{Engine, save_trajectory};
use anyhow::{Context, Result};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{:#?}", cfg.solver);

        Ok(Self { sim_dir, cfg })
    }

    pub fn run_simulation(&self) -> Result<()> {
        let engine = Engine::new(self.cfg.clone()).context("failed to construct engine")?;

        let traj = engine
            .perform_simulation()
            .context("failed to perform simulation")?;

        let run_idx = self.run_dirs().context("failed to list run dirs")?.len();
        let run_dir = self.run_dir(run_idx);
        fs::create_dir_all(&run_dir).with_context(|| format!("failed to create {run_dir:?}"))?;
        log::info!("created {run_dir:?}");

        let trajectory_file = self.trajectory_file(run_idx);
        save_trajectory(&traj, &trajectory_file)
            .with_context(|| format!("failed to save {trajectory_file:?}"))?;
        log::info!("saved {trajectory_file:?}");

        Ok(())
    }

    pub fn run_analysis(&self) -> Result<()> {
        let n_runs = self.run_dirs().context("failed to list run dirs")?.len();
        for run_idx in 0..n_runs {
            let mut analyzer = Analyzer::new();

            analyzer
                .add_file(self.trajectory_file(run_idx))
                .context("failed to add file")?;

            let results_file = self.results_file(run_idx);
            analyzer
                .save_results(&results_file)
                .context("failed to save results")?;
            log::info!("saved {results_file:?}");
        }

        Ok(())
    }

    pub fn clean_sim(&self) -> Result<()> {
        for run_dir in self.run_dirs().context("failed to list run dirs")? {
            fs::remove_dir_all(&run_dir)
                .with_context(|| format!("failed to remove {run_dir:?}"))?;
            log::info!("removed {run_dir:?}");
        }

        Ok(())
    }

    fn run_dirs(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.sim_dir.join("run-*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let run_dirs = glob(pattern)
            .context("failed to glob run dirs")?
            .filter_map(Result::ok)
            .filter(|p| p.is_dir())
            .collect();
        Ok(run_dirs)
    }

    fn run_dir(&self, run_idx: usize) -> PathBuf {
        self.sim_dir.join(format!("run-{run_idx:04}"))
    }

    fn trajectory_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("trajectory.msgpack")
    }

    fn results_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("results.msgpack")
    }
}
