use anyhow::{Context, Result, bail};
use ndarray::{ArrayView1, ArrayView2};
use std::{fmt::Debug, ops::RangeBounds};

pub fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {:?}, but is {:?}", range, num);
    }

    Ok(())
}

pub fn check_vec<R>(vec: ArrayView1<f64>, exp_len: usize, range: R) -> Result<()>
where
    R: RangeBounds<f64> + Debug + Clone,
{
    let len = vec.len();
    if len != exp_len {
        bail!("vector length must be {exp_len}, but is {len}");
    }

    for (i_ele, &ele) in vec.iter().enumerate() {
        check_num(ele, range.clone()).with_context(|| format!("invalid element {i_ele}"))?;
    }

    Ok(())
}

pub fn check_mat<R>(mat: ArrayView2<f64>, exp_n_cols: usize, range: R) -> Result<()>
where
    R: RangeBounds<f64> + Debug + Clone,
{
    let (n_rows, n_cols) = mat.dim();
    if n_rows == 0 {
        bail!("matrix must have at least one row");
    }
    if n_cols != exp_n_cols {
        bail!("matrix must have {exp_n_cols} columns, but has {n_cols}");
    }

    for (i_row, row) in mat.outer_iter().enumerate() {
        check_vec(row, exp_n_cols, range.clone()).with_context(|| format!("invalid row {i_row}"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn ranges() {
        assert!(check_num(0.5, 0.0..=1.0).is_ok());
        assert!(check_num(1.5, 0.0..=1.0).is_err());
        assert!(check_num(0.0, f64::MIN_POSITIVE..).is_err());
        assert!(check_num(f64::NAN, 0.0..).is_err());
    }

    #[test]
    fn vectors_and_matrices() {
        let vec = array![1.0, 2.0, 3.0];
        assert!(check_vec(vec.view(), 3, 0.0..).is_ok());
        assert!(check_vec(vec.view(), 2, 0.0..).is_err());
        assert!(check_vec(vec.view(), 3, 0.0..2.5).is_err());

        let mat = array![[1500.0, 1600.0], [1510.0, 1610.0]];
        assert!(check_mat(mat.view(), 2, 0.0..).is_ok());
        assert!(check_mat(mat.view(), 3, 0.0..).is_err());
        assert!(check_mat(mat.view(), 2, 0.0..1550.0).is_err());
    }
}
