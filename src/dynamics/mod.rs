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

mod linear;
pub use linear::{ControlInput, LinearModel};

/// The capability interface of a nonlinear state-space model, consumed by the extended
/// Kalman filter.
///
/// One concrete type implements this trait per model, rather than passing loose
/// callables around: the signatures of the dynamics and of every Jacobian provider are
/// then verified at compile time. In particular the noise Jacobians follow the
/// convention that `L` maps process-noise space onto state space (`S × S`) and `M` maps
/// measurement-noise space onto measurement space (`M × M`), so an incompatible
/// dimension cannot be expressed.
///
/// Both noise Jacobians default to the identity, which covers the common
/// additive-noise formulation.
pub trait NonlinearDynamics<S, M>
where
    S: DimName,
    M: DimName,
    DefaultAllocator:
        Allocator<S> + Allocator<M> + Allocator<S, S> + Allocator<M, S> + Allocator<M, M>,
{
    /// Propagates a state forward by one step.
    ///
    /// Control inputs, if the model has any, are bound inside the implementing type.
    fn transition(&self, state: &OVector<f64, S>) -> OVector<f64, S>;

    /// Jacobian of [`transition`](Self::transition) evaluated at `state`, usually noted F.
    fn transition_jacobian(&self, state: &OVector<f64, S>) -> OMatrix<f64, S, S>;

    /// Projects a state into measurement space.
    fn observe(&self, state: &OVector<f64, S>) -> OVector<f64, M>;

    /// Jacobian of [`observe`](Self::observe) evaluated at `state`, usually noted H.
    fn observation_jacobian(&self, state: &OVector<f64, S>) -> OMatrix<f64, M, S>;

    /// Jacobian of the transition with respect to the process noise, usually noted L.
    fn process_noise_jacobian(&self, _state: &OVector<f64, S>) -> OMatrix<f64, S, S> {
        OMatrix::<f64, S, S>::identity()
    }

    /// Jacobian of the observation with respect to the measurement noise, usually noted M.
    fn measurement_noise_jacobian(&self, _state: &OVector<f64, S>) -> OMatrix<f64, M, M> {
        OMatrix::<f64, M, M>::identity()
    }
}
