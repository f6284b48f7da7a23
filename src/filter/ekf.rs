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

use crate::dynamics::NonlinearDynamics;
use crate::errors::SingularInnovationCovarianceSnafu;
use crate::estimate::{FilterHistory, StateEstimate};
use crate::filter::Filter;
use crate::linalg::allocator::Allocator;
use crate::linalg::{DefaultAllocator, DimName, Dyn, OMatrix, OVector};
use crate::EstimationError;
use snafu::prelude::*;

/// The extended Kalman filter: the same predict–update recursion as [`KF`](crate::filter::KF),
/// generalized to nonlinear dynamics through per-step Jacobian evaluation.
///
/// Jacobians are always evaluated at the current best estimate of the linearization
/// point: the posterior mean before a prediction, the prior mean before a correction.
/// This is the standard extended-filter approximation; it degrades under strong
/// nonlinearity or large noise covariances, and no re-linearization or iteration is
/// performed.
#[derive(Clone, Debug)]
#[allow(clippy::upper_case_acronyms)]
pub struct EKF<S, M, D>
where
    S: DimName,
    M: DimName,
    D: NonlinearDynamics<S, M>,
    DefaultAllocator:
        Allocator<S> + Allocator<M> + Allocator<S, S> + Allocator<M, S> + Allocator<M, M>,
{
    /// The nonlinear model, immutable for the lifetime of this filter
    pub dynamics: D,
    /// Process noise covariance, usually noted Q
    pub q: OMatrix<f64, S, S>,
    /// Measurement noise covariance, usually noted R
    pub r: OMatrix<f64, M, M>,
    estimate: StateEstimate<S>,
}

impl<S, M, D> EKF<S, M, D>
where
    S: DimName,
    M: DimName,
    D: NonlinearDynamics<S, M>,
    DefaultAllocator:
        Allocator<S> + Allocator<M> + Allocator<S, S> + Allocator<M, S> + Allocator<M, M>,
{
    /// Initializes this filter with an initial estimate, the nonlinear dynamics, and
    /// the noise covariances.
    pub fn new(
        initial_estimate: StateEstimate<S>,
        dynamics: D,
        q: OMatrix<f64, S, S>,
        r: OMatrix<f64, M, M>,
    ) -> Self {
        Self {
            dynamics,
            q,
            r,
            estimate: initial_estimate,
        }
    }

    /// Reconstructs the fitted observation sequence by projecting every posterior mean
    /// of `history` into measurement space, the initial (pre-update) entry excluded.
    ///
    /// Column `i` of the output corresponds to observation column `i` of the batch the
    /// history was accumulated from, and the number of columns is the history length
    /// minus one.
    pub fn fitted_observations(&self, history: &FilterHistory<S>) -> OMatrix<f64, M, Dyn> {
        let corrected = history.corrected();
        let mut fitted = OMatrix::<f64, M, Dyn>::zeros_generic(M::name(), Dyn(corrected.len()));
        for (i, estimate) in corrected.iter().enumerate() {
            fitted.set_column(i, &self.dynamics.observe(&estimate.mean));
        }
        fitted
    }

    /// Pure forward simulation from the current posterior mean: repeatedly applies the
    /// transition and projects each new state into measurement space.
    ///
    /// This is a deterministic open-loop trajectory forecast, not a filtering step: no
    /// Jacobian is evaluated, no noise is injected, and the filter state is not
    /// mutated.
    pub fn forecast(&self, steps: usize) -> OMatrix<f64, M, Dyn> {
        let mut trajectory = OMatrix::<f64, M, Dyn>::zeros_generic(M::name(), Dyn(steps));
        let mut state = self.estimate.mean.clone();
        for k in 0..steps {
            state = self.dynamics.transition(&state);
            trajectory.set_column(k, &self.dynamics.observe(&state));
        }
        trajectory
    }
}

impl<S, M, D> Filter<S, M> for EKF<S, M, D>
where
    S: DimName,
    M: DimName,
    D: NonlinearDynamics<S, M>,
    DefaultAllocator: Allocator<S>
        + Allocator<M>
        + Allocator<S, S>
        + Allocator<M, M>
        + Allocator<M, S>
        + Allocator<S, M>,
{
    fn estimate(&self) -> &StateEstimate<S> {
        &self.estimate
    }

    fn set_estimate(&mut self, estimate: StateEstimate<S>) {
        self.estimate = estimate;
    }

    /// Time update with linearization at the posterior mean:
    /// `x⁻ = f(x)` and `P⁻ = F̂·P·F̂ᵗ + L̂·Q·L̂ᵗ`.
    fn predicted_estimate(
        &self,
        from: &StateEstimate<S>,
    ) -> Result<StateEstimate<S>, EstimationError> {
        let f_k = self.dynamics.transition_jacobian(&from.mean);
        let l_k = self.dynamics.process_noise_jacobian(&from.mean);

        let mean = self.dynamics.transition(&from.mean);
        let covar =
            &f_k * &from.covar * f_k.transpose() + &l_k * &self.q * l_k.transpose();

        Ok(StateEstimate {
            mean,
            covar,
            predicted: true,
        })
    }

    /// Measurement update with linearization at the prior mean:
    /// `ν = z − h(x⁻)`, `S = Ĥ·P⁻·Ĥᵗ + M̂·R·M̂ᵗ`, `K = P⁻·Ĥᵗ·S⁻¹`, then
    /// `x = x⁻ + K·ν` and `P = (I − K·Ĥ)·P⁻`.
    fn corrected_estimate(
        &self,
        prior: &StateEstimate<S>,
        observation: &OVector<f64, M>,
    ) -> Result<StateEstimate<S>, EstimationError> {
        let h_k = self.dynamics.observation_jacobian(&prior.mean);
        let m_k = self.dynamics.measurement_noise_jacobian(&prior.mean);

        let innovation = observation - self.dynamics.observe(&prior.mean);

        let s_k = &h_k * &prior.covar * h_k.transpose() + &m_k * &self.r * m_k.transpose();
        let s_k_inv = s_k
            .try_inverse()
            .context(SingularInnovationCovarianceSnafu)?;

        let gain = &prior.covar * h_k.transpose() * s_k_inv;

        let mean = &prior.mean + &gain * innovation;
        let covar = (OMatrix::<f64, S, S>::identity() - &gain * &h_k) * &prior.covar;

        Ok(StateEstimate {
            mean,
            covar,
            predicted: false,
        })
    }
}
