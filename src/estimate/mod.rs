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

use crate::linalg::allocator::Allocator;
use crate::linalg::{DefaultAllocator, DimName, OMatrix, OVector};
use approx::abs_diff_eq;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Symmetry and positivity tolerance used by the divergence-risk monitor.
pub const COVAR_TOLERANCE: f64 = 1e-9;

/// A mean/covariance pair, as the result of a time update (prediction) or a
/// measurement update (correction).
///
/// Each update produces a fresh estimate; the owning filter always holds exactly one
/// current estimate, and past estimates accumulate in a [FilterHistory].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "OVector<f64, S>: serde::Serialize, OMatrix<f64, S, S>: serde::Serialize",
    deserialize = "OVector<f64, S>: serde::Deserialize<'de>, OMatrix<f64, S, S>: serde::Deserialize<'de>"
))]
pub struct StateEstimate<S: DimName>
where
    DefaultAllocator: Allocator<S> + Allocator<S, S>,
{
    /// The estimated state
    pub mean: OVector<f64, S>,
    /// The covariance of this estimate
    pub covar: OMatrix<f64, S, S>,
    /// Whether this is a predicted estimate from a time update, or an estimate from a
    /// measurement update
    pub predicted: bool,
}

impl<S: DimName> StateEstimate<S>
where
    DefaultAllocator: Allocator<S> + Allocator<S, S>,
{
    /// Initializes a new estimate from a mean and its full covariance.
    pub fn from_covar(mean: OVector<f64, S>, covar: OMatrix<f64, S, S>) -> Self {
        Self {
            mean,
            covar,
            predicted: false,
        }
    }

    /// Initializes an estimate with a zero covariance, i.e. a state known with certainty.
    pub fn certain(mean: OVector<f64, S>) -> Self {
        Self {
            mean,
            covar: OMatrix::<f64, S, S>::zeros(),
            predicted: false,
        }
    }

    /// Trace of the covariance, the monitored measure of total uncertainty.
    pub fn covar_trace(&self) -> f64 {
        self.covar.trace()
    }

    /// Returns whether the covariance is symmetric with a non-negative diagonal within
    /// `tolerance`.
    ///
    /// Repeated ill-conditioned updates can drift the covariance away from symmetric
    /// positive semi-definiteness. This check is the monitorable condition for that
    /// divergence risk: the filters log it but never enforce it.
    pub fn covar_within_tolerance(&self, tolerance: f64) -> bool {
        for i in 0..S::USIZE {
            if self.covar[(i, i)] < -tolerance {
                return false;
            }
            for j in (i + 1)..S::USIZE {
                if !abs_diff_eq!(self.covar[(i, j)], self.covar[(j, i)], epsilon = tolerance) {
                    return false;
                }
            }
        }
        true
    }
}

impl<S: DimName> fmt::Display for StateEstimate<S>
where
    DefaultAllocator: Allocator<S> + Allocator<S, S>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} estimate: mean = [",
            if self.predicted {
                "predicted"
            } else {
                "corrected"
            }
        )?;
        for (i, component) in self.mean.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{component:.6e}")?;
        }
        write!(f, "], covar trace = {:.6e}", self.covar_trace())
    }
}

/// An append-only, ordered sequence of estimates, one per processed observation.
///
/// The history is seeded with the estimate held before the first observation was
/// processed, so entry `i + 1` is index-aligned with observation column `i`. It is an
/// explicit accumulator returned by [`Filter::fit`](crate::filter::Filter::fit) and
/// owned by the caller, not hidden inside the filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "OVector<f64, S>: serde::Serialize, OMatrix<f64, S, S>: serde::Serialize",
    deserialize = "OVector<f64, S>: serde::Deserialize<'de>, OMatrix<f64, S, S>: serde::Deserialize<'de>"
))]
pub struct FilterHistory<S: DimName>
where
    DefaultAllocator: Allocator<S> + Allocator<S, S>,
{
    estimates: Vec<StateEstimate<S>>,
}

impl<S: DimName> FilterHistory<S>
where
    DefaultAllocator: Allocator<S> + Allocator<S, S>,
{
    /// Starts a new history from the pre-fit estimate.
    pub fn seeded(initial: StateEstimate<S>) -> Self {
        Self {
            estimates: vec![initial],
        }
    }

    pub(crate) fn push(&mut self, estimate: StateEstimate<S>) {
        self.estimates.push(estimate);
    }

    /// All stored estimates, the seed entry included.
    pub fn estimates(&self) -> &[StateEstimate<S>] {
        &self.estimates
    }

    /// The estimates produced by processed observations, i.e. without the seed entry.
    /// Index-aligned with the observation batch.
    pub fn corrected(&self) -> &[StateEstimate<S>] {
        &self.estimates[1..]
    }

    /// Latest estimate in this history.
    pub fn latest(&self) -> &StateEstimate<S> {
        // Cannot be empty: seeded at construction and append-only.
        self.estimates.last().unwrap()
    }

    /// Number of stored estimates, the seed entry included.
    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Ordered posterior means, one per processed observation.
    pub fn means(&self) -> Vec<OVector<f64, S>> {
        self.corrected().iter().map(|e| e.mean.clone()).collect()
    }

    /// Ordered posterior covariances, one per processed observation.
    pub fn covars(&self) -> Vec<OMatrix<f64, S, S>> {
        self.corrected().iter().map(|e| e.covar.clone()).collect()
    }
}
