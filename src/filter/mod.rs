/*
    Sibyl, recursive Bayesian estimation for time series
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::errors::{FitStepSnafu, ShapeMismatchSnafu};
use crate::estimate::{FilterHistory, StateEstimate, COVAR_TOLERANCE};
use crate::linalg::allocator::Allocator;
use crate::linalg::{DMatrix, DefaultAllocator, DimName, OVector};
use crate::EstimationError;
use snafu::prelude::*;

pub mod ekf;
pub mod kalman;

pub use ekf::EKF;
pub use kalman::KF;

/// Defines the recursive predict–update cycle shared by the linear and extended Kalman
/// filters.
///
/// Implementors provide the two *pure* half-steps ([`predicted_estimate`](Self::predicted_estimate)
/// and [`corrected_estimate`](Self::corrected_estimate)) plus access to the single
/// estimate the filter owns; the looping contract over an observation batch is then
/// identical for every filter and implemented here once.
///
/// The recursion is strictly sequential: step `t`'s prediction requires step `t − 1`'s
/// posterior, so there is no parallelism within one filter. Independent filters are
/// naturally processed in parallel by an outer caller.
pub trait Filter<S, M>
where
    S: DimName,
    M: DimName,
    DefaultAllocator: Allocator<S>
        + Allocator<M>
        + Allocator<S, S>
        + Allocator<M, M>
        + Allocator<M, S>
        + Allocator<S, M>,
{
    /// Returns the current estimate, the only mutable state of a filter.
    fn estimate(&self) -> &StateEstimate<S>;

    /// Commits a new current estimate.
    fn set_estimate(&mut self, estimate: StateEstimate<S>);

    /// Computes the time update from `from`, without committing it.
    ///
    /// The returned estimate is marked predicted.
    fn predicted_estimate(
        &self,
        from: &StateEstimate<S>,
    ) -> Result<StateEstimate<S>, EstimationError>;

    /// Computes the measurement update of `prior` with the provided observation,
    /// without committing it.
    fn corrected_estimate(
        &self,
        prior: &StateEstimate<S>,
        observation: &OVector<f64, M>,
    ) -> Result<StateEstimate<S>, EstimationError>;

    /// Standalone time update: predicts from the current estimate and commits the
    /// prediction.
    fn predict(&mut self) -> Result<StateEstimate<S>, EstimationError> {
        let predicted = self.predicted_estimate(self.estimate())?;
        self.set_estimate(predicted.clone());
        Ok(predicted)
    }

    /// Standalone measurement update: corrects the current (predicted) estimate with
    /// this observation and commits the correction.
    ///
    /// Transactional: on failure the committed estimate is untouched.
    fn update(
        &mut self,
        observation: &OVector<f64, M>,
    ) -> Result<StateEstimate<S>, EstimationError> {
        let corrected = self.corrected_estimate(self.estimate(), observation)?;
        self.set_estimate(corrected.clone());
        Ok(corrected)
    }

    /// Runs the full predict–update recursion over an observation batch (columns are
    /// time steps) and returns the accumulated history.
    ///
    /// Processes `min(step_limit, batch.ncols())` columns when a limit is given, else
    /// the whole batch. The history is seeded with the pre-fit estimate, so its entry
    /// `i + 1` aligns with column `i`. An error aborts the recursion at the failing
    /// step; the filter then still holds the last successfully corrected estimate.
    fn fit(
        &mut self,
        batch: &DMatrix<f64>,
        step_limit: Option<usize>,
    ) -> Result<FilterHistory<S>, EstimationError> {
        let steps = match step_limit {
            Some(limit) if limit < batch.ncols() => limit,
            _ => batch.ncols(),
        };
        let mut history = FilterHistory::seeded(self.estimate().clone());
        self.process_columns(batch, steps, &mut history)?;
        info!("processed {steps} observations");
        Ok(history)
    }

    /// Streaming continuation of [`fit`](Self::fit): processes every column of `batch`
    /// with the exact same inner loop, appending to a caller-owned history.
    fn process_new_observations(
        &mut self,
        batch: &DMatrix<f64>,
        history: &mut FilterHistory<S>,
    ) -> Result<(), EstimationError> {
        self.process_columns(batch, batch.ncols(), history)
    }

    /// Inner loop of [`fit`](Self::fit) and [`process_new_observations`](Self::process_new_observations).
    ///
    /// Each step is transactional: the prediction and the correction are computed from
    /// the committed estimate without intermediate commit, and only a fully corrected
    /// posterior is committed and appended.
    fn process_columns(
        &mut self,
        batch: &DMatrix<f64>,
        steps: usize,
        history: &mut FilterHistory<S>,
    ) -> Result<(), EstimationError> {
        ensure!(
            batch.nrows() == M::USIZE,
            ShapeMismatchSnafu {
                rows: batch.nrows(),
                expected: M::USIZE,
            }
        );
        let mut divergence_flagged = false;
        for step in 0..steps {
            let observation =
                OVector::<f64, M>::from_iterator(batch.column(step).iter().copied());
            let prior = self
                .predicted_estimate(self.estimate())
                .context(FitStepSnafu { step })?;
            let posterior = self
                .corrected_estimate(&prior, &observation)
                .context(FitStepSnafu { step })?;
            if !divergence_flagged && !posterior.covar_within_tolerance(COVAR_TOLERANCE) {
                warn!(
                    "divergence risk at step {step}: covariance drifted from symmetric PSD (trace = {:.6e})",
                    posterior.covar_trace()
                );
                divergence_flagged = true;
            }
            self.set_estimate(posterior.clone());
            history.push(posterior);
        }
        Ok(())
    }
}
