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

use crate::errors::{EmptySequenceSnafu, SequenceLengthMismatchSnafu};
use crate::EstimationError;
use snafu::prelude::*;

/// Root mean squared error between a truth sequence and a predicted sequence of the
/// same length.
pub fn rmse(truth: &[f64], predicted: &[f64]) -> Result<f64, EstimationError> {
    validate(truth, predicted)?;
    let sum_sq: f64 = truth
        .iter()
        .zip(predicted)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    Ok((sum_sq / truth.len() as f64).sqrt())
}

/// Fraction of steps where the truth and the prediction agree in direction, a value of
/// zero or above counting as the positive direction.
pub fn directional_accuracy(truth: &[f64], predicted: &[f64]) -> Result<f64, EstimationError> {
    validate(truth, predicted)?;
    let agreements = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| (**t >= 0.0) == (**p >= 0.0))
        .count();
    Ok(agreements as f64 / truth.len() as f64)
}

fn validate(truth: &[f64], predicted: &[f64]) -> Result<(), EstimationError> {
    ensure!(
        truth.len() == predicted.len(),
        SequenceLengthMismatchSnafu {
            truth_len: truth.len(),
            predicted_len: predicted.len(),
        }
    );
    ensure!(!truth.is_empty(), EmptySequenceSnafu);
    Ok(())
}
