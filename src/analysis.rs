use crate::engine::load_trajectory;
use crate::stats::{Accumulator, AccumulatorReport};
use crate::types::Trajectory;
use anyhow::{Context, Result, bail};
use ndarray::ArrayView2;
use rmp_serde::encode;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufWriter, path::Path};

/// Summary of one observable.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub name: String,
    pub stats: AccumulatorReport,
}

pub trait Obs {
    fn update(&mut self, traj: &Trajectory) -> Result<()>;
    fn report(&self) -> Report;
}

/// Which column of a trajectory an endpoint reads.
#[derive(Clone, Copy)]
enum Col {
    Initial,
    Final,
    Change,
}

/// Distribution across individuals of a mass compartment at a given column.
pub struct Endpoint {
    name: &'static str,
    select: fn(&Trajectory) -> ArrayView2<'_, f64>,
    col: Col,
    acc: Accumulator,
}

impl Endpoint {
    fn new(
        name: &'static str,
        select: fn(&Trajectory) -> ArrayView2<'_, f64>,
        col: Col,
    ) -> Self {
        Self {
            name,
            select,
            col,
            acc: Accumulator::new(),
        }
    }
}

impl Obs for Endpoint {
    fn update(&mut self, traj: &Trajectory) -> Result<()> {
        let mat = (self.select)(traj);
        let n_cols = traj.n_cols();
        if n_cols == 0 || traj.n_ind() == 0 {
            bail!("trajectory has no steps");
        }
        for row in mat.outer_iter() {
            let val = match self.col {
                Col::Initial => row[0],
                Col::Final => row[n_cols - 1],
                Col::Change => row[n_cols - 1] - row[0],
            };
            self.acc.add(val);
        }
        Ok(())
    }

    fn report(&self) -> Report {
        Report {
            name: self.name.to_string(),
            stats: self.acc.report(),
        }
    }
}

/// Number of trajectory entries with a non-positive mass compartment.
pub struct InvalidMassCount {
    acc: Accumulator,
}

impl InvalidMassCount {
    pub fn new() -> Self {
        Self {
            acc: Accumulator::new(),
        }
    }
}

impl Obs for InvalidMassCount {
    fn update(&mut self, traj: &Trajectory) -> Result<()> {
        self.acc.add(traj.invalid.len() as f64);
        Ok(())
    }

    fn report(&self) -> Report {
        Report {
            name: "invalid_mass_count".to_string(),
            stats: self.acc.report(),
        }
    }
}

fn body_weight(traj: &Trajectory) -> ArrayView2<'_, f64> {
    traj.body_weight.view()
}

fn fat_free_mass(traj: &Trajectory) -> ArrayView2<'_, f64> {
    traj.fat_free_mass.view()
}

fn fat_mass(traj: &Trajectory) -> ArrayView2<'_, f64> {
    traj.fat_mass.view()
}

pub struct Analyzer {
    obs_ptr_vec: Vec<Box<dyn Obs>>,
}

impl Analyzer {
    pub fn new() -> Self {
        let obs_ptr_vec: Vec<Box<dyn Obs>> = vec![
            Box::new(Endpoint::new("initial_body_weight", body_weight, Col::Initial)),
            Box::new(Endpoint::new("final_body_weight", body_weight, Col::Final)),
            Box::new(Endpoint::new("body_weight_change", body_weight, Col::Change)),
            Box::new(Endpoint::new("final_fat_free_mass", fat_free_mass, Col::Final)),
            Box::new(Endpoint::new("final_fat_mass", fat_mass, Col::Final)),
            Box::new(InvalidMassCount::new()),
        ];
        Self { obs_ptr_vec }
    }

    pub fn add_trajectory(&mut self, traj: &Trajectory) -> Result<()> {
        for obs in &mut self.obs_ptr_vec {
            obs.update(traj).context("failed to update observable")?;
        }
        Ok(())
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let traj = load_trajectory(file).context("failed to load trajectory")?;
        self.add_trajectory(&traj)
    }

    pub fn reports(&self) -> Vec<Report> {
        self.obs_ptr_vec.iter().map(|obs| obs.report()).collect()
    }

    pub fn save_results<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);

        let reports = self.reports();
        for report in &reports {
            log::info!("{report:?}");
        }
        encode::write_named(&mut writer, &reports).context("failed to serialize results")?;
        Ok(())
    }
}
