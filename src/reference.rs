//! Reference body composition by age, sex and BMI category.
//!
//! Values are tabulated for integer ages 2 to 18 and linearly interpolated
//! in between. Ages 2 to 5 share one value per sex across BMI categories.

use crate::types::{BmiCategory, Cohort, SexPair};
use ndarray::{Array1, Array2, ArrayView1, Zip};
use serde::{Deserialize, Serialize};

/// Number of tabulated ages (2 to 18).
const N_AGES: usize = 17;
const FIRST_AGE: f64 = 2.0;
const LAST_AGE: f64 = 18.0;

/// Reference values of one tabulated age, by BMI category.
type Row = [SexPair; 4];
type Table = [Row; N_AGES];

const fn all(male: f64, female: f64) -> Row {
    [SexPair::new(male, female); 4]
}

const fn cat(under: (f64, f64), normal: (f64, f64), over: (f64, f64), obese: (f64, f64)) -> Row {
    [
        SexPair::new(under.0, under.1),
        SexPair::new(normal.0, normal.1),
        SexPair::new(over.0, over.1),
        SexPair::new(obese.0, obese.1),
    ]
}

#[rustfmt::skip]
const FFM_MEAN: Table = [
    all(10.134, 9.477),
    all(12.099, 11.494),
    all(14.0, 13.2),
    all(15.72, 14.86),
    cat((12.7942, 13.7957), (17.0238, 15.2337), (19.3070, 17.7866), (22.2248, 21.2170)),
    cat((17.8106, 18.4835), (19.0775, 17.5198), (20.3344, 18.9406), (23.1765, 22.2733)),
    cat((20.3597, 18.5363), (20.4774, 19.6317), (22.1128, 21.6080), (25.8151, 25.1641)),
    cat((19.3668, 17.0314), (22.3768, 21.3680), (26.7714, 26.1791), (31.3143, 30.1484)),
    cat((20.3271, 23.7546), (26.2985, 26.4307), (29.6861, 32.5531), (36.6630, 34.1787)),
    cat((25.5568, 21.2704), (27.4862, 28.8484), (32.8810, 34.9192), (39.1109, 39.0934)),
    cat((27.9345, 27.7570), (31.5756, 33.3547), (36.9403, 39.1253), (44.0610, 43.9033)),
    cat((30.1592, 26.9376), (35.7001, 36.2985), (43.5796, 41.3549), (48.3233, 47.0629)),
    cat((21.2736, 29.2222), (40.4352, 37.1184), (47.0679, 44.8448), (56.7861, 47.6488)),
    cat((36.1157, 34.1242), (43.2381, 40.0629), (50.7450, 45.9011), (58.3804, 50.1206)),
    cat((40.5041, 38.1473), (44.8314, 40.0155), (54.5065, 44.8730), (60.6145, 51.3464)),
    cat((40.5722, 36.5821), (48.7226, 41.6682), (57.3895, 48.4993), (60.3961, 53.4969)),
    cat((42.7400, 31.2639), (49.7806, 41.8400), (58.2319, 47.9007), (61.8395, 51.3603)),
];

#[rustfmt::skip]
const FFM_MEDIAN: Table = [
    all(10.134, 9.477),
    all(12.099, 11.494),
    all(14.0, 13.2),
    all(15.72, 14.86),
    cat((14.4641, 13.8627), (17.1430, 15.1282), (19.2280, 17.6859), (21.9501, 20.4992)),
    cat((16.3729, 16.6347), (18.2285, 17.2507), (21.7099, 20.0341), (24.9713, 23.4162)),
    cat((18.0019, 17.2583), (19.9148, 19.4286), (24.6404, 22.1758), (27.4774, 26.8346)),
    cat((19.2548, 17.5150), (21.9058, 21.2721), (26.5243, 25.6952), (30.8636, 29.2900)),
    cat((20.3271, 23.7546), (26.2985, 26.4307), (29.6861, 32.5531), (36.6630, 34.1787)),
    cat((25.5568, 21.2704), (27.4862, 28.8484), (32.8810, 34.9192), (39.1109, 39.0934)),
    cat((27.9345, 27.7570), (31.5756, 33.3547), (36.9403, 39.1253), (44.0610, 43.9033)),
    cat((30.1592, 26.9376), (35.7001, 36.2985), (43.5796, 41.3549), (48.3233, 47.0629)),
    cat((21.2736, 29.2222), (40.4352, 37.1184), (47.0679, 44.8448), (56.7861, 47.6488)),
    cat((36.1157, 34.1242), (43.2381, 40.0629), (50.7450, 45.9011), (58.3804, 50.1206)),
    cat((41.8846, 38.1473), (44.8314, 40.0155), (54.5065, 44.8730), (60.6145, 51.3464)),
    cat((40.5722, 36.5821), (48.7226, 41.6682), (57.3895, 48.4993), (60.3961, 53.4969)),
    cat((42.7400, 31.2639), (49.7806, 41.8400), (58.2319, 47.9007), (61.8395, 51.3603)),
];

#[rustfmt::skip]
const FM_MEAN: Table = [
    all(2.456, 2.433),
    all(2.576, 2.606),
    all(2.7, 2.8),
    all(3.66, 4.47),
    cat((1.7764, 2.5951), (3.4540, 3.8303), (4.8055, 5.7014), (7.9672, 9.3883)),
    cat((2.3398, 2.8164), (3.5859, 4.2782), (5.4625, 6.5960), (8.4350, 10.4148)),
    cat((3.2767, 3.0828), (4.1138, 5.2226), (5.5455, 7.3667), (9.3266, 12.0550)),
    cat((2.3902, 2.6538), (4.1705, 5.0218), (6.6958, 8.6945), (11.5896, 14.1436)),
    cat((2.4479, 3.2454), (4.9982, 5.4190), (7.9746, 9.1949), (16.3177, 13.9706)),
    cat((3.3203, 2.6392), (5.4113, 6.0374), (8.9515, 10.9333), (16.9403, 18.6393)),
    cat((3.4905, 3.7443), (6.3199, 7.1416), (10.7410, 12.6422), (20.7120, 23.3028)),
    cat((3.7085, 3.2124), (7.0187, 8.4339), (13.6491, 14.2744), (23.7980, 24.5466)),
    cat((1.9970, 3.9076), (8.1211, 8.7344), (15.2322, 16.2757), (30.4881, 28.6411)),
    cat((4.2798, 3.8050), (8.5973, 9.8169), (16.8229, 17.9753), (32.0464, 29.0900)),
    cat((4.6019, 4.5292), (9.1734, 9.8278), (19.3477, 16.1585), (32.1754, 30.8017)),
    cat((4.2804, 4.3746), (10.0719, 9.8915), (20.2305, 18.4581), (30.7093, 35.2589)),
    cat((4.9325, 3.3333), (11.1103, 9.3370), (21.0289, 18.4491), (36.5275, 30.2936)),
];

#[rustfmt::skip]
const FM_MEDIAN: Table = [
    all(2.456, 2.433),
    all(2.576, 2.606),
    all(2.7, 2.8),
    all(3.66, 4.47),
    cat((2.0359, 2.5660), (3.4642, 3.7042), (4.6220, 5.6735), (7.1058, 8.7339)),
    cat((2.3771, 2.9560), (3.6030, 4.1865), (5.5651, 6.4374), (8.0501, 9.3100)),
    cat((2.1231, 3.0917), (3.6729, 4.8531), (5.8971, 7.0172), (8.9372, 11.5469)),
    cat((2.4068, 2.9027), (4.0597, 4.8707), (6.5720, 8.7112), (10.8084, 12.7559)),
    cat((2.4479, 3.2454), (4.9982, 5.4190), (7.9746, 9.1949), (16.3177, 13.9706)),
    cat((3.3203, 2.6392), (5.4113, 6.0374), (8.9515, 10.9333), (16.9403, 18.6393)),
    cat((3.4905, 3.7443), (6.3199, 7.1416), (10.7410, 12.6422), (20.7120, 23.3028)),
    cat((3.7085, 3.2124), (7.0187, 8.4339), (13.6491, 14.2744), (23.7980, 24.5466)),
    cat((1.9970, 3.9076), (8.1211, 8.7344), (15.2322, 16.2757), (30.4881, 28.6411)),
    cat((4.2798, 3.8050), (8.5973, 9.8169), (16.8229, 17.9753), (32.0464, 29.0900)),
    cat((4.6585, 4.5292), (9.1734, 9.8278), (19.3477, 16.1585), (32.1754, 30.8017)),
    cat((4.2804, 4.3746), (10.0719, 9.8915), (20.2305, 18.4581), (30.7093, 35.2589)),
    cat((4.9325, 3.3333), (11.1103, 9.3370), (21.0289, 18.4491), (36.5275, 30.2936)),
];

/// Calibration set of the reference tables.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceSet {
    #[default]
    Mean,
    Median,
}

impl ReferenceSet {
    fn tables(self) -> (&'static Table, &'static Table) {
        match self {
            Self::Mean => (&FFM_MEAN, &FM_MEAN),
            Self::Median => (&FFM_MEDIAN, &FM_MEDIAN),
        }
    }
}

/// Reference fat free and fat mass curves of every individual in a cohort.
///
/// Each individual's table column is resolved once from their sex and BMI
/// category, so evaluation only interpolates.
#[derive(Debug, Clone)]
pub struct ReferenceCurves {
    ffm_rows: Array2<f64>,
    fm_rows: Array2<f64>,
}

impl ReferenceCurves {
    pub fn new(set: ReferenceSet, cohort: &Cohort) -> Self {
        let (ffm_table, fm_table) = set.tables();
        Self {
            ffm_rows: resolve(ffm_table, cohort.sex.view(), &cohort.bmi_cat),
            fm_rows: resolve(fm_table, cohort.sex.view(), &cohort.bmi_cat),
        }
    }

    /// Reference fat free mass at age `t` (years) of each individual.
    pub fn ffm(&self, t: ArrayView1<f64>) -> Array1<f64> {
        evaluate(&self.ffm_rows, t)
    }

    /// Reference fat mass at age `t` (years) of each individual.
    pub fn fm(&self, t: ArrayView1<f64>) -> Array1<f64> {
        evaluate(&self.fm_rows, t)
    }
}

fn resolve(table: &Table, sex: ArrayView1<f64>, bmi_cat: &[BmiCategory]) -> Array2<f64> {
    let mut rows = Array2::zeros((sex.len(), N_AGES));
    for (i_ind, mut ind_rows) in rows.outer_iter_mut().enumerate() {
        let col = bmi_cat[i_ind].index();
        for (i_age, row) in table.iter().enumerate() {
            ind_rows[i_age] = row[col].blend(sex[i_ind]);
        }
    }
    rows
}

fn evaluate(rows: &Array2<f64>, t: ArrayView1<f64>) -> Array1<f64> {
    Zip::from(rows.rows())
        .and(t)
        .map_collect(|ind_rows, &t| interpolate(ind_rows, t))
}

/// Linear interpolation between the tabulated ages around `t`.
///
/// Ages of 18 and above return the last row.
fn interpolate(rows: ArrayView1<f64>, t: f64) -> f64 {
    if t >= LAST_AGE {
        return rows[N_AGES - 1];
    }
    let floor = t.floor();
    let i_low = (floor.clamp(FIRST_AGE, LAST_AGE - 1.0) - FIRST_AGE) as usize;
    let i_high = (i_low + 1).min(N_AGES - 1);
    let frac = t - floor;
    rows[i_low] + frac * (rows[i_high] - rows[i_low])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn single(sex: f64, bmi_cat: BmiCategory) -> Cohort {
        Cohort::new(array![10.0], array![sex], vec![bmi_cat], array![25.0], array![8.0])
            .expect("valid cohort")
    }

    #[test]
    fn integer_age_hits_table_row() {
        let refs = ReferenceCurves::new(ReferenceSet::Mean, &single(1.0, BmiCategory::Normal));
        assert_eq!(refs.ffm(array![10.0].view())[0], 26.4307);
        assert_eq!(refs.fm(array![10.0].view())[0], 5.4190);
        assert_eq!(refs.ffm(array![2.0].view())[0], 9.477);
    }

    #[test]
    fn half_year_is_midpoint() {
        let refs = ReferenceCurves::new(ReferenceSet::Mean, &single(0.0, BmiCategory::Obese));
        let val = refs.ffm(array![10.5].view())[0];
        assert!((val - 0.5 * (36.6630 + 39.1109)).abs() < 1e-12);
    }

    #[test]
    fn ages_past_eighteen_are_clamped() {
        let refs = ReferenceCurves::new(ReferenceSet::Median, &single(0.0, BmiCategory::Over));
        for t in [18.0, 18.7, 25.0, 80.0] {
            assert_eq!(refs.ffm(array![t].view())[0], 58.2319);
            assert_eq!(refs.fm(array![t].view())[0], 21.0289);
        }
    }

    #[test]
    fn sex_blends_between_tables() {
        let refs = ReferenceCurves::new(ReferenceSet::Mean, &single(0.5, BmiCategory::Under));
        let val = refs.fm(array![12.0].view())[0];
        assert!((val - 0.5 * (3.4905 + 3.7443)).abs() < 1e-12);
    }

    #[test]
    fn mean_and_median_differ() {
        let cohort = single(0.0, BmiCategory::Under);
        let mean = ReferenceCurves::new(ReferenceSet::Mean, &cohort);
        let median = ReferenceCurves::new(ReferenceSet::Median, &cohort);
        let t = array![16.0];
        assert_eq!(mean.ffm(t.view())[0], 40.5041);
        assert_eq!(median.ffm(t.view())[0], 41.8846);
    }

    #[test]
    fn vectorized_over_cohort() {
        let cohort = Cohort::new(
            array![6.0, 6.0],
            array![0.0, 1.0],
            vec![BmiCategory::Under, BmiCategory::Obese],
            array![20.0, 20.0],
            array![5.0, 5.0],
        )
        .expect("valid cohort");
        let refs = ReferenceCurves::new(ReferenceSet::Mean, &cohort);
        let ffm = refs.ffm(array![6.0, 6.0].view());
        assert_eq!(ffm, array![12.7942, 21.2170]);
    }
}
