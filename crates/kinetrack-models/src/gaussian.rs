//! Multivariate normal distribution with a cached covariance square root.
//!
//! [`Gaussian::map_standard_normal`] turns a vector of independent
//! standard-normal draws into a draw from `N(mean, covariance)` through the
//! affine map `mean + L · z`, where `L · Lᵀ = covariance`.  The caller owns the
//! random number generator; the distribution itself is deterministic.

use kinetrack_types::{Result, TrackError};
use nalgebra::{DMatrix, DVector};

/// A multivariate normal distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Gaussian {
    mean: DVector<f64>,
    covariance: DMatrix<f64>,
    square_root: DMatrix<f64>,
}

impl Gaussian {
    /// Create a distribution from its mean and a symmetric PSD covariance.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::DimensionMismatch`] when the covariance is not
    /// square or does not match the mean, and [`TrackError::InvalidParameter`]
    /// when it is not a finite symmetric PSD matrix.
    pub fn new(mean: DVector<f64>, covariance: DMatrix<f64>) -> Result<Self> {
        if !covariance.is_square() {
            return Err(TrackError::DimensionMismatch {
                what: "covariance columns".to_string(),
                expected: covariance.nrows(),
                actual: covariance.ncols(),
            });
        }
        if covariance.nrows() != mean.len() {
            return Err(TrackError::DimensionMismatch {
                what: "covariance".to_string(),
                expected: mean.len(),
                actual: covariance.nrows(),
            });
        }
        check_covariance("covariance", &covariance)?;
        let square_root = square_root(&covariance);
        Ok(Self {
            mean,
            covariance,
            square_root,
        })
    }

    /// Standard normal distribution of the given dimension.
    pub fn standard(dimension: usize) -> Self {
        Self {
            mean: DVector::zeros(dimension),
            covariance: DMatrix::identity(dimension, dimension),
            square_root: DMatrix::identity(dimension, dimension),
        }
    }

    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &DVector<f64> {
        &self.mean
    }

    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    /// Lower-triangular (or eigen-based, for singular covariances) factor `L`
    /// with `L · Lᵀ = covariance`.
    pub fn square_root(&self) -> &DMatrix<f64> {
        &self.square_root
    }

    /// Map a standard-normal sample `z` to `mean + L · z`.
    pub fn map_standard_normal(&self, sample: &DVector<f64>) -> Result<DVector<f64>> {
        if sample.len() != self.dimension() {
            return Err(TrackError::DimensionMismatch {
                what: "standard normal sample".to_string(),
                expected: self.dimension(),
                actual: sample.len(),
            });
        }
        Ok(&self.mean + &self.square_root * sample)
    }
}

/// Reject covariances with non-finite entries, asymmetry, or eigenvalues
/// below zero beyond a tolerance relative to the largest entry.
///
/// The square root only reads the lower triangle and clips negative
/// eigenvalues, so anything else would sample from a different matrix than
/// the one reported.
pub(crate) fn check_covariance(name: &str, covariance: &DMatrix<f64>) -> Result<()> {
    if covariance.iter().any(|v| !v.is_finite()) {
        return Err(TrackError::invalid_parameter(name, "contains non-finite entries"));
    }
    if covariance.nrows() == 0 {
        return Ok(());
    }
    let tolerance = 1e-9 * covariance.amax().max(1.0);
    let asymmetry = (covariance - covariance.transpose()).amax();
    if asymmetry > tolerance {
        return Err(TrackError::invalid_parameter(
            name,
            format!("not symmetric (max |A - Aᵀ| = {asymmetry})"),
        ));
    }
    let smallest = covariance.symmetric_eigenvalues().min();
    if smallest < -tolerance {
        return Err(TrackError::invalid_parameter(
            name,
            format!("not positive semi-definite (eigenvalue {smallest})"),
        ));
    }
    Ok(())
}

// Cholesky for the common positive-definite case; a clipped eigen
// decomposition for semi-definite ones (e.g. zero elapsed time).
fn square_root(covariance: &DMatrix<f64>) -> DMatrix<f64> {
    if covariance.nrows() == 0 {
        return DMatrix::zeros(0, 0);
    }
    if let Some(cholesky) = covariance.clone().cholesky() {
        return cholesky.l();
    }
    let eigen = covariance.clone().symmetric_eigen();
    let roots = eigen.eigenvalues.map(|v| v.max(0.0).sqrt());
    &eigen.eigenvectors * DMatrix::from_diagonal(&roots)
}
