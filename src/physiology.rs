//! Tissue energetics.

use crate::types::SexPair;

/// Energy density of fat mass (kcal/kg).
pub const RHO_FM: f64 = 9400.0;

/// Baseline expenditure offset (kcal/day).
pub const K: SexPair = SexPair::new(800.0, 700.0);

const DELTA_MIN: SexPair = SexPair::new(10.0, 10.0);
const DELTA_MAX: SexPair = SexPair::new(19.0, 17.0);
/// Age (years) at which delta is halfway between its bounds.
const P: f64 = 12.0;
const H: f64 = 10.0;

/// Energy density of fat free mass (kcal/kg).
pub fn rho_ffm(ffm: f64) -> f64 {
    4.3 * ffm + 837.0
}

/// Fraction of an energy imbalance deposited as fat free mass.
pub fn partition(ffm: f64, fm: f64) -> f64 {
    let c = 10.4 * rho_ffm(ffm) / RHO_FM;
    c / (c + fm)
}

/// Age-dependent physical activity coefficient (kcal/kg/day).
pub fn delta(t: f64, sex: f64) -> f64 {
    let delta_min = DELTA_MIN.blend(sex);
    let delta_max = DELTA_MAX.blend(sex);
    delta_min + (delta_max - delta_min) / (1.0 + (t / P).powf(H))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ffm_energy_density() {
        assert_eq!(rho_ffm(0.0), 837.0);
        assert!((rho_ffm(25.0) - 944.5).abs() < 1e-12);
    }

    #[test]
    fn partition_in_unit_interval() {
        for ffm in [5.0, 25.0, 60.0, 120.0] {
            for fm in [0.0, 0.5, 8.0, 40.0, 150.0] {
                let p = partition(ffm, fm);
                assert!(p > 0.0 && p <= 1.0, "p = {p} for ffm = {ffm}, fm = {fm}");
                if fm > 0.0 {
                    assert!(p < 1.0);
                }
            }
        }
        assert!(partition(25.0, 8.0) > partition(25.0, 16.0));
    }

    #[test]
    fn delta_decays_with_age() {
        assert_eq!(delta(0.0, 0.0), 19.0);
        assert_eq!(delta(0.0, 1.0), 17.0);
        assert!((delta(12.0, 0.0) - 14.5).abs() < 1e-12);
        assert!(delta(30.0, 1.0) - 10.0 < 1e-3);
        assert!(delta(8.0, 0.0) > delta(14.0, 0.0));
    }
}
