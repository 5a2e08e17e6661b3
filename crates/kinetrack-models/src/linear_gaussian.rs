//! Linear-Gaussian transition `x' = A·x + B·w + C·u` with `w ~ N(0, I)`.

use kinetrack_types::{Result, TrackError};
use nalgebra::{DMatrix, DVector};

use crate::gaussian::Gaussian;

/// Linear transition with additive Gaussian noise.
///
/// `A` is the dynamics matrix (state × state), `B` the noise matrix
/// (state × noise) and `C` the input matrix (state × input).
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGaussianModel {
    dynamics: DMatrix<f64>,
    noise: DMatrix<f64>,
    input: DMatrix<f64>,
}

impl LinearGaussianModel {
    /// # Errors
    ///
    /// [`TrackError::DimensionMismatch`] when `A` is not square or `B`/`C` do
    /// not have as many rows as `A`.
    pub fn new(dynamics: DMatrix<f64>, noise: DMatrix<f64>, input: DMatrix<f64>) -> Result<Self> {
        let n = dynamics.nrows();
        if dynamics.ncols() != n {
            return Err(mismatch("dynamics matrix columns", n, dynamics.ncols()));
        }
        if noise.nrows() != n {
            return Err(mismatch("noise matrix rows", n, noise.nrows()));
        }
        if input.nrows() != n {
            return Err(mismatch("input matrix rows", n, input.nrows()));
        }
        Ok(Self {
            dynamics,
            noise,
            input,
        })
    }

    /// Random walk of dimension `n` with noise scale `sigma`:
    /// `A = I`, `B = sigma·I`, `C = I`.
    pub fn random_walk(n: usize, sigma: f64) -> Self {
        Self {
            dynamics: DMatrix::identity(n, n),
            noise: DMatrix::<f64>::identity(n, n) * sigma,
            input: DMatrix::identity(n, n),
        }
    }

    pub fn dynamics_matrix(&self) -> &DMatrix<f64> {
        &self.dynamics
    }

    pub fn noise_matrix(&self) -> &DMatrix<f64> {
        &self.noise
    }

    pub fn input_matrix(&self) -> &DMatrix<f64> {
        &self.input
    }

    pub fn state_dimension(&self) -> usize {
        self.dynamics.nrows()
    }

    pub fn noise_dimension(&self) -> usize {
        self.noise.ncols()
    }

    pub fn input_dimension(&self) -> usize {
        self.input.ncols()
    }

    /// `A·x + C·u`.
    pub fn expected_state(&self, state: &DVector<f64>, input: &DVector<f64>) -> Result<DVector<f64>> {
        self.check(state, input)?;
        Ok(&self.dynamics * state + &self.input * input)
    }

    /// `A·x + B·w + C·u` for a standard-normal noise sample `w`.
    pub fn state(
        &self,
        state: &DVector<f64>,
        noise: &DVector<f64>,
        input: &DVector<f64>,
    ) -> Result<DVector<f64>> {
        if noise.len() != self.noise_dimension() {
            return Err(mismatch("noise sample", self.noise_dimension(), noise.len()));
        }
        Ok(self.expected_state(state, input)? + &self.noise * noise)
    }

    /// Transition covariance `B·Bᵀ`.
    pub fn covariance(&self) -> DMatrix<f64> {
        &self.noise * self.noise.transpose()
    }

    /// Distribution of the next state given the current state and input.
    pub fn condition(&self, state: &DVector<f64>, input: &DVector<f64>) -> Result<Gaussian> {
        Gaussian::new(self.expected_state(state, input)?, self.covariance())
    }

    fn check(&self, state: &DVector<f64>, input: &DVector<f64>) -> Result<()> {
        if state.len() != self.state_dimension() {
            return Err(mismatch("state", self.state_dimension(), state.len()));
        }
        if input.len() != self.input_dimension() {
            return Err(mismatch("input", self.input_dimension(), input.len()));
        }
        Ok(())
    }
}

fn mismatch(what: &str, expected: usize, actual: usize) -> TrackError {
    TrackError::DimensionMismatch {
        what: what.to_string(),
        expected,
        actual,
    }
}
