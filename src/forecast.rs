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
use crate::linalg::{DefaultAllocator, DimName, Dyn, OMatrix, OVector};

/// Open-loop projection of a fixed linear model: repeatedly applies
/// `state ← F·state` for `horizon` steps from the last known state, emitting
/// `H·state` into column `i` of the output.
///
/// No process noise, no observation feedback, no uncertainty: a point forecast,
/// fully determined by its inputs. This shares the open-loop semantics of
/// [`EKF::forecast`](crate::filter::EKF::forecast) but operates on constant model
/// matrices, typically the ones a filter was fitted with.
pub fn forecast<S, M>(
    horizon: usize,
    last_state: &OVector<f64, S>,
    f: &OMatrix<f64, S, S>,
    h: &OMatrix<f64, M, S>,
) -> OMatrix<f64, M, Dyn>
where
    S: DimName,
    M: DimName,
    DefaultAllocator: Allocator<S> + Allocator<M> + Allocator<S, S> + Allocator<M, S>,
{
    let mut predicted = OMatrix::<f64, M, Dyn>::zeros_generic(M::name(), Dyn(horizon));
    let mut state = last_state.clone();
    for k in 0..horizon {
        state = f * state;
        predicted.set_column(k, &(h * &state));
    }
    predicted
}
