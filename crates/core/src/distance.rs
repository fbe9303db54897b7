//! Distance kernels and the metric registry.
//!
//! Three pure kernels over equal-length `f64` slices, each registered under a
//! canonical name so an index can persist its metric as a string and recover
//! the function on load.

use crate::error::{Error, Result};

/// A distance kernel over two equal-length vectors.
pub type DistanceFn = fn(&[f64], &[f64]) -> f64;

/// Registry name of [`euclidean`].
pub const EUCLIDEAN: &str = "euclidean";

/// Registry name of [`square_distance`].
pub const SQUARE_DISTANCE: &str = "squareDistance";

/// Registry name of [`dot_product`].
pub const DOT_PRODUCT: &str = "dotProduct";

/// Euclidean (L2) distance: `sqrt(sum((a_i - b_i)^2))`.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    square_distance(a, b).sqrt()
}

/// Squared Euclidean distance.
///
/// Cheaper than [`euclidean`] and order-equivalent, so it is the tie-break
/// metric for graph maintenance.
pub fn square_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Dot product: `sum(a_i * b_i)`.
pub fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Resolves a kernel by its registered name.
///
/// The empty string resolves to the default metric. Unregistered names are an
/// [`Error::UnknownMetric`], which is how loading a snapshot written with a
/// metric this build does not know fails.
pub fn by_name(name: &str) -> Result<DistanceFn> {
    match name {
        "" | EUCLIDEAN => Ok(euclidean),
        SQUARE_DISTANCE => Ok(square_distance),
        DOT_PRODUCT => Ok(dot_product),
        other => Err(Error::UnknownMetric(other.to_string())),
    }
}
