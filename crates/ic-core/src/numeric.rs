use crate::CoreError;

/// Floating point type used for every table cell and coordinate.
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// A table cell counts as missing when absent or NaN.
pub fn is_missing(cell: Option<Real>) -> bool {
    cell.is_none_or(|v| v.is_nan())
}

/// Distinct values in ascending order. NaN is dropped.
///
/// Equality is exact: coordinates that differ in the last bit stay distinct,
/// the same way a label-based pivot treats them.
pub fn sorted_unique<I>(values: I) -> Vec<Real>
where
    I: IntoIterator<Item = Real>,
{
    let mut out: Vec<Real> = values.into_iter().filter(|v| !v.is_nan()).collect();
    out.sort_by(|a, b| a.total_cmp(b));
    // -0.0 and 0.0 compare equal here, matching label equality
    out.dedup_by(|a, b| a == b);
    out
}

/// Position of `value` in a slice produced by [`sorted_unique`].
pub fn position_in_sorted(sorted: &[Real], value: Real) -> Option<usize> {
    if value.is_nan() {
        return None;
    }
    let idx = sorted.partition_point(|x| *x < value);
    (idx < sorted.len() && sorted[idx] == value).then_some(idx)
}
