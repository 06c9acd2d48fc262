//! Growth and energy balance curves of age.
//!
//! Every curve has the shape
//! `A exp(-(t - tA) / tauA) + B exp(-((t - tB) / tauB)^2 / 2) + D exp(-((t - tD) / tauD)^2 / 2)`
//! with sex-specific parameters.

use crate::types::SexPair;
use ndarray::{Array1, ArrayView1, Zip};

/// Parameters of one age curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeCurve {
    pub a: SexPair,
    pub b: SexPair,
    pub d: SexPair,
    pub t_a: SexPair,
    pub t_b: SexPair,
    pub t_d: SexPair,
    pub tau_a: SexPair,
    pub tau_b: SexPair,
    pub tau_d: SexPair,
}

/// Rate of growth-driven mass deposition (kcal/day).
pub const GROWTH_DYNAMIC: AgeCurve = AgeCurve {
    a: SexPair::new(3.2, 2.3),
    b: SexPair::new(9.6, 8.4),
    d: SexPair::new(10.1, 1.1),
    t_a: SexPair::new(4.7, 4.5),
    t_b: SexPair::new(12.5, 11.7),
    t_d: SexPair::new(15.0, 16.2),
    tau_a: SexPair::new(2.5, 1.0),
    tau_b: SexPair::new(1.0, 0.9),
    tau_d: SexPair::new(1.5, 0.7),
};

pub const GROWTH_IMPACT: AgeCurve = AgeCurve {
    a: SexPair::new(3.2, 2.3),
    b: SexPair::new(9.6, 8.4),
    d: SexPair::new(10.0, 1.1),
    t_a: SexPair::new(4.7, 4.5),
    t_b: SexPair::new(12.5, 11.7),
    t_d: SexPair::new(15.0, 16.0),
    tau_a: SexPair::new(1.0, 1.0),
    tau_b: SexPair::new(0.94, 0.94),
    tau_d: SexPair::new(0.69, 0.69),
};

/// Energy imbalance of the reference trajectory (kcal/day).
pub const EB_IMPACT: AgeCurve = AgeCurve {
    a: SexPair::new(7.2, 16.5),
    b: SexPair::new(30.0, 47.0),
    d: SexPair::new(21.0, 41.0),
    t_a: SexPair::new(5.6, 4.8),
    t_b: SexPair::new(9.8, 9.1),
    t_d: SexPair::new(15.0, 13.5),
    tau_a: SexPair::new(15.0, 7.0),
    tau_b: SexPair::new(1.5, 1.0),
    tau_d: SexPair::new(2.0, 1.5),
};

impl AgeCurve {
    /// Value at age `t` (years) for sex weight `sex`.
    pub fn eval(&self, t: f64, sex: f64) -> f64 {
        let a = self.a.blend(sex);
        let b = self.b.blend(sex);
        let d = self.d.blend(sex);
        let t_a = self.t_a.blend(sex);
        let t_b = self.t_b.blend(sex);
        let t_d = self.t_d.blend(sex);
        let tau_a = self.tau_a.blend(sex);
        let tau_b = self.tau_b.blend(sex);
        let tau_d = self.tau_d.blend(sex);

        a * (-(t - t_a) / tau_a).exp()
            + b * (-0.5 * ((t - t_b) / tau_b).powi(2)).exp()
            + d * (-0.5 * ((t - t_d) / tau_d).powi(2)).exp()
    }

    /// Elementwise evaluation over a cohort.
    pub fn eval_all(&self, t: ArrayView1<f64>, sex: ArrayView1<f64>) -> Array1<f64> {
        Zip::from(t)
            .and(sex)
            .map_collect(|&t, &sex| self.eval(t, sex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn single_terms_at_their_centers() {
        let curve = AgeCurve {
            a: SexPair::new(1.0, 1.0),
            b: SexPair::new(0.0, 0.0),
            d: SexPair::new(0.0, 0.0),
            t_a: SexPair::new(3.0, 3.0),
            t_b: SexPair::new(0.0, 0.0),
            t_d: SexPair::new(0.0, 0.0),
            tau_a: SexPair::new(2.0, 2.0),
            tau_b: SexPair::new(1.0, 1.0),
            tau_d: SexPair::new(1.0, 1.0),
        };
        assert_eq!(curve.eval(3.0, 0.0), 1.0);
        assert!((curve.eval(5.0, 0.0) - (-1.0f64).exp()).abs() < 1e-15);

        let gauss = AgeCurve {
            a: SexPair::new(0.0, 0.0),
            b: SexPair::new(4.0, 4.0),
            ..curve
        };
        assert_eq!(gauss.eval(0.0, 1.0), 4.0);
        assert!((gauss.eval(1.0, 1.0) - 4.0 * (-0.5f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn growth_peaks_in_puberty() {
        let at_8 = GROWTH_DYNAMIC.eval(8.0, 0.0);
        let at_12_5 = GROWTH_DYNAMIC.eval(12.5, 0.0);
        assert!(at_12_5 > at_8);
        assert!(GROWTH_DYNAMIC.eval(10.0, 1.0) > 0.0);
    }

    #[test]
    fn cohort_evaluation_matches_scalar() {
        let t = array![6.0, 10.0, 14.5];
        let sex = array![0.0, 1.0, 0.3];
        for curve in [GROWTH_DYNAMIC, GROWTH_IMPACT, EB_IMPACT] {
            let vals = curve.eval_all(t.view(), sex.view());
            assert_eq!(vals.len(), 3);
            for i in 0..3 {
                assert_eq!(vals[i], curve.eval(t[i], sex[i]));
            }
        }
    }
}
