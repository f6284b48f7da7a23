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
use crate::linalg::{DefaultAllocator, DimName, OMatrix, OVector, U1};
use typed_builder::TypedBuilder;

/// A constant control term `B·u` applied at each time update.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlInput<S, C>
where
    S: DimName,
    C: DimName,
    DefaultAllocator: Allocator<S, C> + Allocator<C>,
{
    /// Control matrix, mapping control space onto state space
    pub b: OMatrix<f64, S, C>,
    /// Control vector
    pub u: OVector<f64, C>,
}

impl<S, C> ControlInput<S, C>
where
    S: DimName,
    C: DimName,
    DefaultAllocator: Allocator<S, C> + Allocator<C> + Allocator<S>,
{
    /// The state-space effect of this control term.
    pub fn effect(&self) -> OVector<f64, S> {
        &self.b * &self.u
    }
}

/// A linear-Gaussian state-space model, immutable for the lifetime of the filter that
/// owns it.
///
/// Dimensions are part of the type: `S` is the state size, `M` the measurement size,
/// and `C` the control size (defaults to one, and is irrelevant when no control term is
/// set). An omitted control term means no control effect at all.
///
/// # Example
/// ```
/// use sibyl::prelude::*;
///
/// let model: LinearModel<U1, U1> = LinearModel::builder()
///     .f(Matrix1::new(1.0))
///     .q(Matrix1::new(0.01))
///     .h(Matrix1::new(1.0))
///     .r(Matrix1::new(1.0))
///     .build();
/// assert!(model.control.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct LinearModel<S, M, C = U1>
where
    S: DimName,
    M: DimName,
    C: DimName,
    DefaultAllocator: Allocator<S, S>
        + Allocator<M, S>
        + Allocator<M, M>
        + Allocator<S, C>
        + Allocator<C>,
{
    /// State transition matrix, usually noted F
    pub f: OMatrix<f64, S, S>,
    /// Process noise covariance, usually noted Q
    pub q: OMatrix<f64, S, S>,
    /// Measurement matrix, usually noted H
    pub h: OMatrix<f64, M, S>,
    /// Measurement noise covariance, usually noted R
    pub r: OMatrix<f64, M, M>,
    /// Optional control term, `None` meaning a zero control effect
    #[builder(default, setter(strip_option))]
    pub control: Option<ControlInput<S, C>>,
}

impl<S, M, C> LinearModel<S, M, C>
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
    /// The control effect `B·u`, or zero when no control term is set.
    pub fn control_effect(&self) -> OVector<f64, S> {
        match &self.control {
            Some(input) => input.effect(),
            None => OVector::<f64, S>::zeros(),
        }
    }
}
