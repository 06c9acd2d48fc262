use crate::error::ModelError;
use crate::intake::{Intake, Logistic};
use crate::reference::ReferenceSet;
use crate::types::{BmiCategory, Cohort};
use crate::utils::{check_mat, check_num, check_vec};
use anyhow::{Context, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub cohort: CohortConfig,
    pub intake: IntakeConfig,
    pub solver: SolverConfig,
}

/// Initial covariates and body composition, one entry per individual.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CohortConfig {
    /// Age (years).
    pub age: Vec<f64>,
    /// Sex weight (0 male, 1 female).
    pub sex: Vec<f64>,
    /// BMI category (1 under, 2 normal, 3 over, 4 obese).
    pub bmi_cat: Vec<BmiCategory>,
    /// Fat free mass (kg).
    pub ffm: Vec<f64>,
    /// Fat mass (kg).
    pub fm: Vec<f64>,
}

/// Energy intake, either a logistic curve or a table.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    pub logistic: Option<Logistic>,
    /// Daily intake (kcal), one row per time step and one column per individual.
    pub table: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Time step (days).
    pub dt: f64,
    /// Simulated horizon (days).
    pub days: f64,
    #[serde(default)]
    pub reference: ReferenceSet,
    /// Warn about non-positive masses in the trajectory.
    #[serde(default = "default_check")]
    pub check: bool,
}

fn default_check() -> bool {
    true
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let cohort = &self.cohort;
        let n_ind = cohort.age.len();
        check_num(n_ind, 1..1_000_000).context("invalid number of individuals")?;

        check_vec(Array1::from(cohort.age.clone()).view(), n_ind, 0.0..100.0)
            .context("invalid ages")?;
        check_vec(Array1::from(cohort.sex.clone()).view(), n_ind, 0.0..=1.0)
            .context("invalid sexes")?;
        check_num(cohort.bmi_cat.len(), n_ind..=n_ind).context("invalid number of BMI categories")?;
        check_vec(
            Array1::from(cohort.ffm.clone()).view(),
            n_ind,
            f64::MIN_POSITIVE..,
        )
        .context("invalid fat free masses")?;
        check_vec(
            Array1::from(cohort.fm.clone()).view(),
            n_ind,
            f64::MIN_POSITIVE..,
        )
        .context("invalid fat masses")?;

        if self.intake.logistic.is_some() == self.intake.table.is_some() {
            return Err::<(), _>(ModelError::ConfigurationConflict).context("invalid intake");
        }
        if self.intake.table.is_some() {
            let table = self.intake_table().context("invalid intake table")?;
            check_mat(table.view(), n_ind, 0.0..).context("invalid intake table")?;
        }

        check_num(self.solver.dt, f64::MIN_POSITIVE..).context("invalid time step")?;
        check_num(self.solver.days, 0.0..).context("invalid number of days")?;

        Ok(())
    }

    /// Cohort described by the configuration.
    pub fn cohort(&self) -> Result<Cohort, ModelError> {
        let cohort = &self.cohort;
        Cohort::new(
            Array1::from(cohort.age.clone()),
            Array1::from(cohort.sex.clone()),
            cohort.bmi_cat.clone(),
            Array1::from(cohort.ffm.clone()),
            Array1::from(cohort.fm.clone()),
        )
    }

    /// Intake mode described by the configuration.
    pub fn intake(&self) -> Result<Intake> {
        let table = match self.intake.table {
            Some(_) => Some(self.intake_table()?),
            None => None,
        };
        let age_0 = self.cohort.age.first().copied().unwrap_or_default();
        let intake = Intake::select(self.intake.logistic, table, age_0, self.solver.dt)?;
        Ok(intake)
    }

    fn intake_table(&self) -> Result<Array2<f64>> {
        let rows = self.intake.table.as_deref().unwrap_or_default();
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Array2::from_shape_vec((n_rows, n_cols), flat)
            .context("intake table rows must all have the same length")
    }
}
