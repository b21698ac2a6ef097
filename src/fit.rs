//! Linear regression of sea-level height on trend, nodal tide, wind, and
//! season.
//!
//! # Model
//!
//! The height series is explained by a designed feature matrix:
//!
//! ```text
//! h(t) = β₀ + β₁·(t - 1970) + β₂·cos(2π(t-1970)/18.613) + β₃·sin(2π(t-1970)/18.613)
//!        [+ β₄·u2main + β₅·u2perp]  [+ Σₘ βₘ·1(month = m), m = 1..11]
//! ```
//!
//! The 18.613-year term is the lunar nodal cycle; December is absorbed by
//! the constant when seasonal indicators are requested. Rows with a missing
//! height are dropped before fitting (an explicit drop policy, not
//! imputation).
//!
//! The fit is a single exact ordinary-least-squares solve of the normal
//! equations. No iterative refinement, no regularization.

use chrono::Datelike;
use faer::{linalg::solvers::Solve, Mat};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::align::MergedFrame;

/// Lunar nodal cycle period in years.
pub const NODAL_PERIOD_YEARS: f64 = 18.613;

/// Epoch year for the trend term.
pub const TREND_EPOCH_YEAR: f64 = 1970.0;

/// Error type for the regression fit.
#[derive(Debug, Error)]
pub enum FitError {
    /// Design matrix is not full rank (too few usable rows, or linearly
    /// dependent feature columns).
    #[error("design matrix is rank-deficient ({n_rows} usable rows, {n_cols} feature columns)")]
    SingularMatrix {
        /// Usable (non-missing-height) row count
        n_rows: usize,
        /// Feature column count
        n_cols: usize,
    },

    /// Every height in the frame is missing.
    #[error("no usable rows: every height in the frame is missing")]
    EmptyFrame,

    /// A feature column contains a non-finite value (e.g. wind requested but
    /// never joined).
    #[error("feature column '{name}' contains a non-finite value")]
    NonFiniteFeature {
        /// Offending column name
        name: String,
    },
}

/// Which optional feature groups enter the design matrix.
#[derive(Clone, Copy, Debug, Default)]
pub struct FitOptions {
    /// Include along-/cross-shore squared wind features
    pub with_wind: bool,
    /// Include 11 monthly indicator features (December in the constant)
    pub with_season: bool,
}

/// The designed feature matrix for one merged frame.
///
/// Rows correspond 1:1 to merged-frame rows with a non-missing height.
#[derive(Clone, Debug)]
pub struct DesignMatrix {
    /// Feature names, positionally aligned with the columns
    pub names: Vec<String>,
    /// Response vector (heights of the kept rows)
    pub response: Vec<f64>,
    /// Indices of the kept rows in the source frame
    pub kept_rows: Vec<usize>,
    data: Vec<f64>, // row-major n_rows x n_cols
}

impl DesignMatrix {
    /// Build the design matrix from a merged frame.
    ///
    /// Rows with missing height are dropped. Feature columns with zero
    /// variance are tolerated with a warning (the caller may still want the
    /// nodal columns present in a short record).
    ///
    /// # Errors
    ///
    /// [`FitError::NonFiniteFeature`] if a requested feature carries NaN,
    /// which happens when wind features are requested but no wind series was
    /// ever joined.
    pub fn build(frame: &MergedFrame, options: FitOptions) -> Result<Self, FitError> {
        let mut names = vec![
            "Constant".to_string(),
            "Trend".to_string(),
            "Nodal U".to_string(),
            "Nodal V".to_string(),
        ];
        if options.with_wind {
            names.push("Wind U^2".to_string());
            names.push("Wind V^2".to_string());
        }
        if options.with_season {
            for m in 1..=11 {
                names.push(format!("month_{}", m));
            }
        }
        let n_cols = names.len();

        let kept_rows: Vec<usize> = (0..frame.len())
            .filter(|&i| frame.height[i].is_finite())
            .collect();

        let mut data = Vec::with_capacity(kept_rows.len() * n_cols);
        let mut response = Vec::with_capacity(kept_rows.len());

        for &i in &kept_rows {
            let years = frame.year_fraction[i] - TREND_EPOCH_YEAR;
            let tau = 2.0 * std::f64::consts::PI * years / NODAL_PERIOD_YEARS;

            data.push(1.0);
            data.push(years);
            data.push(tau.cos());
            data.push(tau.sin());

            if options.with_wind {
                data.push(frame.u2main[i]);
                data.push(frame.u2perp[i]);
            }
            if options.with_season {
                let month = frame.dates[i].month();
                for m in 1..=11u32 {
                    data.push(if month == m { 1.0 } else { 0.0 });
                }
            }

            response.push(frame.height[i]);
        }

        let design = Self {
            names,
            response,
            kept_rows,
            data,
        };

        design.check_finite()?;
        design.warn_zero_variance();
        Ok(design)
    }

    /// Number of usable rows.
    pub fn n_rows(&self) -> usize {
        self.kept_rows.len()
    }

    /// Number of feature columns.
    pub fn n_cols(&self) -> usize {
        self.names.len()
    }

    /// Feature value at (row, column).
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n_cols() + col]
    }

    fn check_finite(&self) -> Result<(), FitError> {
        for row in 0..self.n_rows() {
            for col in 0..self.n_cols() {
                if !self.value(row, col).is_finite() {
                    return Err(FitError::NonFiniteFeature {
                        name: self.names[col].clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn warn_zero_variance(&self) {
        let n = self.n_rows();
        if n < 2 {
            return;
        }
        // Skip the constant; it is zero-variance by construction.
        for col in 1..self.n_cols() {
            let mean: f64 = (0..n).map(|row| self.value(row, col)).sum::<f64>() / n as f64;
            let var: f64 = (0..n)
                .map(|row| (self.value(row, col) - mean).powi(2))
                .sum::<f64>()
                / (n - 1) as f64;
            if var < 1e-12 {
                warn!(column = %self.names[col], "feature column has zero variance");
            }
        }
    }
}

/// Result of the ordinary-least-squares fit.
#[derive(Clone, Debug, Serialize)]
pub struct FitResult {
    /// Feature names, positionally aligned with the coefficients
    pub names: Vec<String>,
    /// Fitted coefficients
    pub coefficients: Vec<f64>,
    /// Coefficient standard errors (NaN for a saturated fit)
    pub std_errors: Vec<f64>,
    /// Fitted values, aligned with the design matrix rows
    pub fitted: Vec<f64>,
    /// Residuals (observed - fitted)
    pub residuals: Vec<f64>,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Number of rows used in the fit
    pub n_rows: usize,
}

impl FitResult {
    /// Coefficient by feature name.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.coefficients[i])
    }

    /// Standard error by feature name.
    pub fn std_error(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.std_errors[i])
    }

    /// The trend coefficient (mm per year when heights are mm).
    pub fn trend(&self) -> f64 {
        self.coefficient("Trend").unwrap_or(f64::NAN)
    }

    /// Residual sum of squares.
    pub fn residual_sum_of_squares(&self) -> f64 {
        self.residuals.iter().map(|r| r * r).sum()
    }
}

/// Fit the sea-level model to a merged frame.
///
/// Builds the design matrix per [`FitOptions`], drops rows with missing
/// height, and performs a single exact OLS solve.
///
/// # Errors
///
/// * [`FitError::EmptyFrame`] when every height is missing.
/// * [`FitError::SingularMatrix`] when usable rows are fewer than feature
///   columns or the normal matrix is rank-deficient.
/// * [`FitError::NonFiniteFeature`] when a requested feature is unavailable.
pub fn fit_sea_level(frame: &MergedFrame, options: FitOptions) -> Result<FitResult, FitError> {
    let design = DesignMatrix::build(frame, options)?;
    fit_design(&design)
}

/// Fit an already-built design matrix.
///
/// Solves the normal equations `(XᵀX) β = Xᵀy` with a full-pivot LU
/// decomposition, which stays stable for the ill-conditioned monthly
/// indicator columns.
pub fn fit_design(design: &DesignMatrix) -> Result<FitResult, FitError> {
    let n = design.n_rows();
    let p = design.n_cols();

    if n == 0 {
        return Err(FitError::EmptyFrame);
    }
    if n < p {
        return Err(FitError::SingularMatrix {
            n_rows: n,
            n_cols: p,
        });
    }

    // Normal equations: (XᵀX) β = Xᵀy
    let mut xtx = Mat::<f64>::zeros(p, p);
    for i in 0..p {
        for j in 0..p {
            let mut sum = 0.0;
            for k in 0..n {
                sum += design.value(k, i) * design.value(k, j);
            }
            xtx[(i, j)] = sum;
        }
    }

    let mut xty = Mat::<f64>::zeros(p, 1);
    for i in 0..p {
        let mut sum = 0.0;
        for k in 0..n {
            sum += design.value(k, i) * design.response[k];
        }
        xty[(i, 0)] = sum;
    }

    let lu = xtx.as_ref().full_piv_lu();
    let beta = lu.solve(&xty);

    // A rank-deficient normal matrix surfaces as non-finite solve output
    // (zero pivot in the LU factorization).
    for i in 0..p {
        if !beta[(i, 0)].is_finite() {
            return Err(FitError::SingularMatrix {
                n_rows: n,
                n_cols: p,
            });
        }
    }

    let coefficients: Vec<f64> = (0..p).map(|i| beta[(i, 0)]).collect();

    // Fitted values and residuals
    let fitted: Vec<f64> = (0..n)
        .map(|k| {
            (0..p)
                .map(|j| coefficients[j] * design.value(k, j))
                .sum::<f64>()
        })
        .collect();
    let residuals: Vec<f64> = design
        .response
        .iter()
        .zip(fitted.iter())
        .map(|(&obs, &fit)| obs - fit)
        .collect();

    let ssr: f64 = residuals.iter().map(|r| r * r).sum();

    // Standard errors from the diagonal of (XᵀX)⁻¹ σ²
    let inverse = lu.solve(&Mat::<f64>::identity(p, p));
    for i in 0..p {
        if !inverse[(i, i)].is_finite() {
            return Err(FitError::SingularMatrix {
                n_rows: n,
                n_cols: p,
            });
        }
    }

    let sigma2 = if n > p {
        ssr / (n - p) as f64
    } else {
        // Saturated fit: residual variance undefined
        f64::NAN
    };
    let std_errors: Vec<f64> = (0..p)
        .map(|i| (sigma2 * inverse[(i, i)]).sqrt())
        .collect();

    // R² = 1 - SS_res / SS_tot
    let y_mean: f64 = design.response.iter().sum::<f64>() / n as f64;
    let sst: f64 = design
        .response
        .iter()
        .map(|&y| (y - y_mean).powi(2))
        .sum();
    let r_squared = if sst > 1e-10 { 1.0 - ssr / sst } else { 1.0 };

    Ok(FitResult {
        names: design.names.clone(),
        coefficients,
        std_errors,
        fitted,
        residuals,
        r_squared,
        n_rows: n,
    })
}
