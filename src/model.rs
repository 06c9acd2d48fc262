//! Energy balance model of body composition in children and adolescents.
//!
//! Based on Hall et al. (2013), "Dynamics of childhood growth and obesity".
//! Ages are in years, masses in kg and energies in kcal/day.

use crate::curve::{AgeCurve, EB_IMPACT, GROWTH_DYNAMIC, GROWTH_IMPACT};
use crate::error::ModelError;
use crate::intake::Intake;
use crate::physiology::{self, K, RHO_FM};
use crate::reference::{ReferenceCurves, ReferenceSet};
use crate::solver::{MassRates, MassSystem};
use crate::types::Cohort;
use ndarray::{Array1, ArrayView1};

/// Model of a cohort, with every individual-specific constant resolved.
#[derive(Debug, Clone)]
pub struct ChildModel {
    sex: Array1<f64>,
    k: Array1<f64>,
    reference: ReferenceCurves,
    intake: Intake,
}

impl ChildModel {
    pub fn new(cohort: &Cohort, reference: ReferenceSet, intake: Intake) -> Self {
        Self {
            sex: cohort.sex.clone(),
            k: K.blend_all(cohort.sex.view()),
            reference: ReferenceCurves::new(reference, cohort),
            intake,
        }
    }

    fn curve(&self, curve: &AgeCurve, t: ArrayView1<f64>) -> Array1<f64> {
        curve.eval_all(t, self.sex.view())
    }

    /// Energy cost of growth at age `t`.
    pub fn growth(&self, t: ArrayView1<f64>) -> Array1<f64> {
        self.curve(&GROWTH_DYNAMIC, t)
    }

    // Not part of the right-hand side.
    #[allow(dead_code)]
    pub fn growth_impact(&self, t: ArrayView1<f64>) -> Array1<f64> {
        self.curve(&GROWTH_IMPACT, t)
    }

    /// Energy imbalance along the reference trajectory at age `t`.
    pub fn eb_impact(&self, t: ArrayView1<f64>) -> Array1<f64> {
        self.curve(&EB_IMPACT, t)
    }

    pub fn delta(&self, t: ArrayView1<f64>) -> Array1<f64> {
        Array1::from_shape_fn(t.len(), |i| physiology::delta(t[i], self.sex[i]))
    }

    pub fn intake(&self, t: ArrayView1<f64>) -> Result<Array1<f64>, ModelError> {
        self.intake.eval(t)
    }

    /// Intake that sustains the reference trajectory at age `t`.
    pub fn intake_reference(&self, t: ArrayView1<f64>) -> Array1<f64> {
        let eb = self.eb_impact(t);
        let ffm_ref = self.reference.ffm(t);
        let fm_ref = self.reference.fm(t);
        let delta = self.delta(t);
        let growth = self.growth(t);

        Array1::from_shape_fn(t.len(), |i| {
            let p = physiology::partition(ffm_ref[i], fm_ref[i]);
            let rho_ffm = physiology::rho_ffm(ffm_ref[i]);
            eb[i]
                + self.k[i]
                + (22.4 + delta[i]) * ffm_ref[i]
                + (4.5 + delta[i]) * fm_ref[i]
                + 230.0 / rho_ffm * (p * eb[i] + growth[i])
                + 180.0 / RHO_FM * ((1.0 - p) * eb[i] - growth[i])
        })
    }

    /// Energy expenditure at age `t` for the given body composition.
    pub fn expenditure(
        &self,
        t: ArrayView1<f64>,
        ffm: ArrayView1<f64>,
        fm: ArrayView1<f64>,
    ) -> Result<Array1<f64>, ModelError> {
        let intake = self.intake(t)?;
        let delta = self.delta(t);
        let intake_ref = self.intake_reference(t);
        let growth = self.growth(t);

        Ok(Array1::from_shape_fn(t.len(), |i| {
            let p = physiology::partition(ffm[i], fm[i]);
            let rho_ffm = physiology::rho_ffm(ffm[i]);
            let d_intake = intake[i] - intake_ref[i];
            // Expenditure appears on both sides through the cost of tissue
            // deposition; this is the closed-form solution.
            let expend = self.k[i]
                + (22.4 + delta[i]) * ffm[i]
                + (4.5 + delta[i]) * fm[i]
                + 0.24 * d_intake
                + (230.0 / rho_ffm * p + 180.0 / RHO_FM * (1.0 - p)) * intake[i]
                + growth[i] * (230.0 / rho_ffm - 180.0 / RHO_FM);
            expend / (1.0 + 230.0 / rho_ffm * p + 180.0 / RHO_FM * (1.0 - p))
        }))
    }
}

impl MassSystem for ChildModel {
    fn d_mass(
        &self,
        age: &Array1<f64>,
        ffm: &Array1<f64>,
        fm: &Array1<f64>,
    ) -> Result<MassRates, ModelError> {
        let intake = self.intake(age.view())?;
        let expend = self.expenditure(age.view(), ffm.view(), fm.view())?;
        let growth = self.growth(age.view());

        let n_ind = age.len();
        let mut d_ffm = Array1::zeros(n_ind);
        let mut d_fm = Array1::zeros(n_ind);
        for i in 0..n_ind {
            let p = physiology::partition(ffm[i], fm[i]);
            let rho_ffm = physiology::rho_ffm(ffm[i]);
            let imbalance = intake[i] - expend[i];
            d_ffm[i] = (p * imbalance + growth[i]) / rho_ffm;
            d_fm[i] = ((1.0 - p) * imbalance - growth[i]) / RHO_FM;
        }

        Ok(MassRates {
            ffm: d_ffm,
            fm: d_fm,
        })
    }
}
