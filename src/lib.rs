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

/*! # sibyl

[Sibyl](https://en.wikipedia.org/wiki/Sibyl): recursive Bayesian state estimation for
financial time series. Provides a linear Kalman filter, an extended Kalman filter with
per-step linearization, and an open-loop forecaster sharing the same state model.

The estimator assumes its inputs (model matrices, noise covariances, dynamics) are
dimensionally consistent: state and measurement sizes are encoded in the type system,
and only the boundary with externally acquired observation tables is checked at runtime.
*/

/// Provides the linear and extended Kalman filters, and the `Filter` trait they share.
pub mod filter;

/// Provides the state-space models consumed by the filters: linear model matrices and
/// the capability trait for nonlinear dynamics.
pub mod dynamics;

/// Provides state estimate and history handling functionalities.
pub mod estimate;

/// Open-loop trajectory forecasting from a fixed linear model.
pub mod forecast;

/// Scalar accuracy measures over predicted vs. actual sequences.
pub mod analysis;

mod errors;
/// Sibyl will (almost) never panic and functions which may fail will return an error.
pub use self::errors::EstimationError;

#[macro_use]
extern crate log;
extern crate nalgebra as na;

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}

#[allow(unused_imports)]
pub mod prelude {
    pub use crate::analysis::{directional_accuracy, rmse};
    pub use crate::dynamics::{ControlInput, LinearModel, NonlinearDynamics};
    pub use crate::estimate::{FilterHistory, StateEstimate};
    pub use crate::filter::{Filter, EKF, KF};
    pub use crate::forecast::forecast;
    pub use crate::linalg::{Const, DMatrix, Matrix1, Matrix2, Vector1, Vector2, U1, U2, U3};
    pub use crate::EstimationError;
}
