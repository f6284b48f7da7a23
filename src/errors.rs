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

use snafu::prelude::Snafu;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EstimationError {
    #[snafu(display(
        "observation batch has {rows} rows but the measurement model expects {expected}"
    ))]
    ShapeMismatch { rows: usize, expected: usize },
    #[snafu(display("innovation covariance S is singular, gain cannot be computed"))]
    SingularInnovationCovariance,
    #[snafu(display("filter aborted at step {step}: {source}"))]
    FitStep {
        step: usize,
        #[snafu(source(from(EstimationError, Box::new)))]
        source: Box<EstimationError>,
    },
    #[snafu(display("{truth_len} truth points cannot be scored against {predicted_len} predictions"))]
    SequenceLengthMismatch {
        truth_len: usize,
        predicted_len: usize,
    },
    #[snafu(display("cannot score empty sequences"))]
    EmptySequence,
}
