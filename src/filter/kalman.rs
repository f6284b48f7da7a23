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

use crate::dynamics::LinearModel;
use crate::errors::SingularInnovationCovarianceSnafu;
use crate::estimate::StateEstimate;
use crate::filter::Filter;
use crate::linalg::allocator::Allocator;
use crate::linalg::{DefaultAllocator, DimName, OMatrix, OVector, U1};
use crate::EstimationError;
use snafu::prelude::*;

/// The linear Kalman filter: maintains a posterior mean/covariance under a
/// linear-Gaussian model.
///
/// `S` is the state size, `M` the measurement size and `C` the control size.
#[derive(Clone, Debug)]
#[allow(clippy::upper_case_acronyms)]
pub struct KF<S, M, C = U1>
where
    S: DimName,
    M: DimName,
    C: DimName,
    DefaultAllocator: Allocator<S>
        + Allocator<S, S>
        + Allocator<M, S>
        + Allocator<M, M>
        + Allocator<S, C>
        + Allocator<C>,
{
    /// The linear-Gaussian model, immutable for the lifetime of this filter
    pub model: LinearModel<S, M, C>,
    estimate: StateEstimate<S>,
}

impl<S, M, C> KF<S, M, C>
where
    S: DimName,
    M: DimName,
    C: DimName,
    DefaultAllocator: Allocator<S>
        + Allocator<S, S>
        + Allocator<M, S>
        + Allocator<M, M>
        + Allocator<S, C>
        + Allocator<C>,
{
    /// Initializes this filter with an initial estimate and a model.
    pub fn new(initial_estimate: StateEstimate<S>, model: LinearModel<S, M, C>) -> Self {
        Self {
            model,
            estimate: initial_estimate,
        }
    }

    /// Initializes this filter from an initial state known with certainty (zero
    /// initial covariance).
    pub fn from_certain(x_init: OVector<f64, S>, model: LinearModel<S, M, C>) -> Self {
        Self::new(StateEstimate::certain(x_init), model)
    }
}

impl<S, M, C> Filter<S, M> for KF<S, M, C>
where
    S: DimName,
    M: DimName,
    C: DimName,
    DefaultAllocator: Allocator<S>
        + Allocator<M>
        + Allocator<S, S>
        + Allocator<M, M>
        + Allocator<M, S>
        + Allocator<S, M>
        + Allocator<S, C>
        + Allocator<C>,
{
    fn estimate(&self) -> &StateEstimate<S> {
        &self.estimate
    }

    fn set_estimate(&mut self, estimate: StateEstimate<S>) {
        self.estimate = estimate;
    }

    /// Time update: `x⁻ = F·x + B·u` and `P⁻ = F·P·Fᵗ + Q`.
    fn predicted_estimate(
        &self,
        from: &StateEstimate<S>,
    ) -> Result<StateEstimate<S>, EstimationError> {
        let mean = &self.model.f * &from.mean + self.model.control_effect();
        let covar = &self.model.f * &from.covar * self.model.f.transpose() + &self.model.q;
        Ok(StateEstimate {
            mean,
            covar,
            predicted: true,
        })
    }

    /// Measurement update: innovation `ν = z − H·x⁻`, innovation covariance
    /// `S = H·P⁻·Hᵗ + R`, gain `K = P⁻·Hᵗ·S⁻¹`, then `x = x⁻ + K·ν` and
    /// `P = (I − K·H)·P⁻`.
    fn corrected_estimate(
        &self,
        prior: &StateEstimate<S>,
        observation: &OVector<f64, M>,
    ) -> Result<StateEstimate<S>, EstimationError> {
        let h = &self.model.h;
        let innovation = observation - h * &prior.mean;

        let s_k = h * &prior.covar * h.transpose() + &self.model.r;
        let s_k_inv = s_k
            .try_inverse()
            .context(SingularInnovationCovarianceSnafu)?;

        let gain = &prior.covar * h.transpose() * s_k_inv;

        let mean = &prior.mean + &gain * innovation;
        let covar = (OMatrix::<f64, S, S>::identity() - &gain * h) * &prior.covar;

        Ok(StateEstimate {
            mean,
            covar,
            predicted: false,
        })
    }
}
