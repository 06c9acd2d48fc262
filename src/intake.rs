//! Energy intake schedules.

use crate::error::ModelError;
use crate::types::check_len;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Generalized logistic (Richards) curve of intake over age.
///
/// `intake(t) = a + (k - a) / (c + q exp(-b t))^(1 / nu)` with `t` in years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Logistic {
    pub k: f64,
    pub q: f64,
    pub a: f64,
    pub b: f64,
    pub nu: f64,
    pub c: f64,
}

impl Logistic {
    pub fn eval(&self, t: f64) -> f64 {
        self.a + (self.k - self.a) / (self.c + self.q * (-self.b * t).exp()).powf(1.0 / self.nu)
    }
}

/// Energy intake (kcal/day) as a function of age.
#[derive(Debug, Clone, PartialEq)]
pub enum Intake {
    /// Closed-form curve shared by the whole cohort.
    Logistic(Logistic),
    /// Fixed schedule with one row per time step and one column per individual.
    ///
    /// Rows are indexed by days elapsed since `age_0` (the first
    /// individual's initial age) divided by `dt`.
    Table {
        rows: Array2<f64>,
        age_0: f64,
        dt: f64,
    },
}

impl Intake {
    /// Select the intake mode. Exactly one of `logistic` and `table` must be given.
    pub fn select(
        logistic: Option<Logistic>,
        table: Option<Array2<f64>>,
        age_0: f64,
        dt: f64,
    ) -> Result<Self, ModelError> {
        match (logistic, table) {
            (Some(logistic), None) => Ok(Self::Logistic(logistic)),
            (None, Some(rows)) => Ok(Self::Table { rows, age_0, dt }),
            _ => Err(ModelError::ConfigurationConflict),
        }
    }

    /// Check that the intake covers `n_ind` individuals over `n_steps` steps.
    pub fn check_coverage(&self, n_ind: usize, n_steps: usize) -> Result<(), ModelError> {
        let Self::Table { rows, .. } = self else {
            return Ok(());
        };
        check_len("intake table row", n_ind, rows.ncols())?;
        // The last stage of the last step reads row `n_steps`.
        if rows.nrows() <= n_steps {
            return Err(ModelError::IndexOutOfRange {
                row: n_steps,
                rows: rows.nrows(),
            });
        }
        Ok(())
    }

    /// Intake of each individual at age `t` (years).
    pub fn eval(&self, t: ArrayView1<f64>) -> Result<Array1<f64>, ModelError> {
        match self {
            Self::Logistic(logistic) => Ok(t.mapv(|t| logistic.eval(t))),
            Self::Table { rows, age_0, dt } => {
                let Some(&t_0) = t.first() else {
                    return Ok(Array1::zeros(0));
                };
                let row = table_row(t_0, *age_0, *dt);
                if row < 0.0 || row as usize >= rows.nrows() {
                    return Err(ModelError::IndexOutOfRange {
                        row: row.max(0.0) as usize,
                        rows: rows.nrows(),
                    });
                }
                Ok(rows.row(row as usize).to_owned())
            }
        }
    }
}

fn table_row(t: f64, age_0: f64, dt: f64) -> f64 {
    // Absorb round-off so that exact step boundaries map to their own row.
    const EPS: f64 = 1e-9;
    (365.0 * (t - age_0) / dt + EPS).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const LOGISTIC: Logistic = Logistic {
        k: 1800.0,
        q: 1.0,
        a: 500.0,
        b: 0.01,
        nu: 1.0,
        c: 1.0,
    };

    #[test]
    fn mode_selection_is_exclusive() {
        assert_eq!(
            Intake::select(None, None, 10.0, 1.0),
            Err(ModelError::ConfigurationConflict)
        );
        assert_eq!(
            Intake::select(Some(LOGISTIC), Some(array![[1500.0]]), 10.0, 1.0),
            Err(ModelError::ConfigurationConflict)
        );
        assert!(matches!(
            Intake::select(Some(LOGISTIC), None, 10.0, 1.0),
            Ok(Intake::Logistic(_))
        ));
    }

    #[test]
    fn logistic_curve() {
        // At t = 0 the denominator is (c + q) = 2.
        assert_eq!(LOGISTIC.eval(0.0), 500.0 + 1300.0 / 2.0);
        let far = LOGISTIC.eval(5000.0);
        assert!((far - 1800.0).abs() < 1e-6);

        let intake = Intake::Logistic(LOGISTIC);
        let vals = intake.eval(array![0.0, 10.0].view()).expect("logistic intake");
        assert_eq!(vals[0], 1150.0);
        assert_eq!(vals[1], LOGISTIC.eval(10.0));
    }

    #[test]
    fn table_rows_follow_elapsed_days() {
        let rows = array![[1000.0, 1100.0], [1200.0, 1300.0], [1400.0, 1500.0]];
        let intake = Intake::select(None, Some(rows), 6.0, 1.0).expect("table intake");

        let vals = intake.eval(array![6.0, 8.0].view()).expect("row 0");
        assert_eq!(vals, array![1000.0, 1100.0]);

        let vals = intake.eval(array![6.0 + 0.5 / 365.0, 0.0].view()).expect("row 0");
        assert_eq!(vals, array![1000.0, 1100.0]);

        let vals = intake
            .eval(array![6.0 + 2.0 / 365.0, 0.0].view())
            .expect("row 2");
        assert_eq!(vals, array![1400.0, 1500.0]);
    }

    #[test]
    fn table_overrun_fails() {
        let rows = array![[1000.0], [1200.0]];
        let intake = Intake::select(None, Some(rows), 6.0, 1.0).expect("table intake");
        assert_eq!(
            intake.eval(array![6.0 + 2.0 / 365.0].view()),
            Err(ModelError::IndexOutOfRange { row: 2, rows: 2 })
        );
        assert_eq!(
            intake.check_coverage(1, 2),
            Err(ModelError::IndexOutOfRange { row: 2, rows: 2 })
        );
        assert_eq!(intake.check_coverage(1, 1), Ok(()));
        assert!(matches!(
            intake.check_coverage(3, 1),
            Err(ModelError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn table_with_no_ages_is_empty() {
        let rows = array![[1000.0], [1200.0]];
        let intake = Intake::select(None, Some(rows), 6.0, 1.0).expect("table intake");
        let vals = intake.eval(Array1::<f64>::zeros(0).view()).expect("no ages");
        assert!(vals.is_empty());
    }
}
