//! Simulation data types.

use crate::error::ModelError;
use ndarray::{Array1, Array2, ArrayView1, Zip};
use serde::{Deserialize, Serialize};

/// Tag identifying trajectories produced by the child and adolescent model.
pub const MODEL_TYPE: &str = "Children";

/// BMI category of an individual at the start of the simulation.
///
/// Selects which branch of the reference body composition tables applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BmiCategory {
    Under,
    Normal,
    Over,
    Obese,
}

impl BmiCategory {
    /// Column of this category in the reference tables.
    pub fn index(self) -> usize {
        match self {
            Self::Under => 0,
            Self::Normal => 1,
            Self::Over => 2,
            Self::Obese => 3,
        }
    }
}

impl TryFrom<u8> for BmiCategory {
    type Error = ModelError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Under),
            2 => Ok(Self::Normal),
            3 => Ok(Self::Over),
            4 => Ok(Self::Obese),
            _ => Err(ModelError::DomainViolation(format!(
                "BMI category must be one of 1, 2, 3 or 4, but is {code}"
            ))),
        }
    }
}

impl From<BmiCategory> for u8 {
    fn from(cat: BmiCategory) -> Self {
        cat.index() as u8 + 1
    }
}

/// Constant with a male and a female value.
///
/// Sex is a continuous weight in `[0, 1]`, so intermediate values interpolate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SexPair {
    pub male: f64,
    pub female: f64,
}

impl SexPair {
    pub const fn new(male: f64, female: f64) -> Self {
        Self { male, female }
    }

    pub fn blend(&self, sex: f64) -> f64 {
        self.male * (1.0 - sex) + self.female * sex
    }

    pub fn blend_all(&self, sex: ArrayView1<f64>) -> Array1<f64> {
        sex.mapv(|s| self.blend(s))
    }
}

/// Initial state and covariates of a batch of individuals.
///
/// All arrays are indexed by individual and share the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Cohort {
    /// Age in years.
    pub age: Array1<f64>,
    /// Sex weight, 0 for male and 1 for female.
    pub sex: Array1<f64>,
    /// BMI category.
    pub bmi_cat: Vec<BmiCategory>,
    /// Fat free mass in kg.
    pub ffm: Array1<f64>,
    /// Fat mass in kg.
    pub fm: Array1<f64>,
}

impl Cohort {
    /// Assemble a non-empty cohort, checking array lengths and the sex domain.
    pub fn new(
        age: Array1<f64>,
        sex: Array1<f64>,
        bmi_cat: Vec<BmiCategory>,
        ffm: Array1<f64>,
        fm: Array1<f64>,
    ) -> Result<Self, ModelError> {
        let n_ind = age.len();
        if n_ind == 0 {
            return Err(ModelError::DomainViolation(
                "cohort must hold at least one individual".to_string(),
            ));
        }
        check_len("sex", n_ind, sex.len())?;
        check_len("bmi_cat", n_ind, bmi_cat.len())?;
        check_len("ffm", n_ind, ffm.len())?;
        check_len("fm", n_ind, fm.len())?;

        if let Some(s) = sex.iter().find(|s| !(0.0..=1.0).contains(*s)) {
            return Err(ModelError::DomainViolation(format!(
                "sex must be in the range [0, 1], but is {s}"
            )));
        }

        Ok(Self {
            age,
            sex,
            bmi_cat,
            ffm,
            fm,
        })
    }

    /// Number of individuals.
    pub fn n_ind(&self) -> usize {
        self.age.len()
    }
}

pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), ModelError> {
    if expected != actual {
        return Err(ModelError::ShapeMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Entry of a trajectory where a mass compartment is not strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidMass {
    pub individual: usize,
    pub step: usize,
}

/// Full simulated history of a cohort.
///
/// Matrices have one row per individual and one column per step,
/// column 0 being the initial state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    /// Days elapsed since the start of the simulation.
    pub time: Array1<f64>,
    /// Age in years.
    pub age: Array2<f64>,
    pub fat_free_mass: Array2<f64>,
    pub fat_mass: Array2<f64>,
    pub body_weight: Array2<f64>,

    /// No mass compartment ever became non-positive.
    pub correct_values: bool,
    pub invalid: Vec<InvalidMass>,

    pub model_type: String,
}

impl Trajectory {
    /// Allocate a trajectory for `n_ind` individuals and `n_steps` steps.
    pub(crate) fn with_shape(n_ind: usize, n_steps: usize) -> Self {
        Self {
            time: Array1::zeros(n_steps + 1),
            age: Array2::zeros((n_ind, n_steps + 1)),
            fat_free_mass: Array2::zeros((n_ind, n_steps + 1)),
            fat_mass: Array2::zeros((n_ind, n_steps + 1)),
            body_weight: Array2::zeros((n_ind, n_steps + 1)),
            correct_values: true,
            invalid: Vec::new(),
            model_type: MODEL_TYPE.to_string(),
        }
    }

    /// Store the state of step `i_step` and flag non-positive masses.
    pub(crate) fn record(
        &mut self,
        i_step: usize,
        time: f64,
        age: ArrayView1<f64>,
        ffm: ArrayView1<f64>,
        fm: ArrayView1<f64>,
    ) {
        self.time[i_step] = time;
        self.age.column_mut(i_step).assign(&age);
        self.fat_free_mass.column_mut(i_step).assign(&ffm);
        self.fat_mass.column_mut(i_step).assign(&fm);
        Zip::from(self.body_weight.column_mut(i_step))
            .and(ffm)
            .and(fm)
            .for_each(|bw, &ffm, &fm| *bw = ffm + fm);

        for (i_ind, (&ffm, &fm)) in ffm.iter().zip(fm.iter()).enumerate() {
            // Negated comparisons also catch NaN.
            if !(ffm > 0.0) || !(fm > 0.0) {
                self.invalid.push(InvalidMass {
                    individual: i_ind,
                    step: i_step,
                });
                self.correct_values = false;
            }
        }
    }

    /// Number of individuals.
    pub fn n_ind(&self) -> usize {
        self.body_weight.nrows()
    }

    /// Number of stored steps, including the initial state.
    pub fn n_cols(&self) -> usize {
        self.time.len()
    }
}
