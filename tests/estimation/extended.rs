use super::{scalar_filter, IdentityDynamics, LogisticDynamics, ScaledNoiseDynamics};
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg64Mcg;
use sibyl::prelude::*;

#[test]
fn identity_dynamics_reduce_to_the_linear_filter() {
    let _ = pretty_env_logger::try_init();

    let observations = [1.0, 0.5, 0.8, 1.2, 0.9, 1.1, 0.7, 1.0];
    let batch = DMatrix::from_iterator(1, observations.len(), observations.iter().copied());

    let mut ekf = EKF::new(
        StateEstimate::from_covar(Vector1::new(0.0), Matrix1::new(1.0)),
        IdentityDynamics,
        Matrix1::new(0.01),
        Matrix1::new(1.0),
    );
    let mut kf = scalar_filter(0.0, 1.0, 0.01, 1.0);

    let ekf_history = ekf.fit(&batch, None).unwrap();
    let kf_history = kf.fit(&batch, None).unwrap();

    assert_eq!(ekf_history.len(), kf_history.len());
    for (step, (e, k)) in ekf_history
        .estimates()
        .iter()
        .zip(kf_history.estimates())
        .enumerate()
    {
        assert!(
            (e.mean[0] - k.mean[0]).abs() < 1e-13,
            "means diverge at step {step}"
        );
        assert!(
            (e.covar[(0, 0)] - k.covar[(0, 0)]).abs() < 1e-13,
            "covariances diverge at step {step}"
        );
    }
}

#[test]
fn fitted_observations_skip_the_seed_entry() {
    let observations = [0.4, 0.6, 0.5, 0.7];
    let batch = DMatrix::from_iterator(1, observations.len(), observations.iter().copied());

    let mut ekf = EKF::new(
        StateEstimate::from_covar(Vector1::new(0.5), Matrix1::new(0.2)),
        IdentityDynamics,
        Matrix1::new(1e-3),
        Matrix1::new(0.1),
    );
    let history = ekf.fit(&batch, None).unwrap();
    let fitted = ekf.fitted_observations(&history);

    // One fitted observation per processed column, none for the initial estimate.
    assert_eq!(fitted.ncols(), observations.len());
    assert_eq!(history.len(), observations.len() + 1);
    for (i, estimate) in history.corrected().iter().enumerate() {
        // Identity observation model: fitted columns are the posterior means.
        assert!((fitted[(0, i)] - estimate.mean[0]).abs() < f64::EPSILON);
    }
}

#[test]
fn forecast_is_deterministic_and_does_not_mutate() {
    let dynamics = LogisticDynamics {
        rate: 0.2,
        capacity: 10.0,
    };
    let ekf = EKF::new(
        StateEstimate::from_covar(Vector1::new(2.0), Matrix1::new(0.5)),
        dynamics,
        Matrix1::new(1e-3),
        Matrix1::new(0.1),
    );
    let before = ekf.estimate().clone();

    let first = ekf.forecast(12);
    let second = ekf.forecast(12);
    assert_eq!(first, second);
    assert_eq!(ekf.estimate(), &before);

    // Matches iterating the transition by hand.
    let mut x = 2.0;
    for k in 0..12 {
        x += 0.2 * x * (1.0 - x / 10.0);
        assert!((first[(0, k)] - x).abs() < 1e-14, "forecast differs at step {k}");
    }
}

#[test]
fn logistic_tracking_stays_well_conditioned() {
    let rate = 0.3;
    let capacity = 50.0;
    let mut rng = Pcg64Mcg::new(7);
    let noise = Normal::new(0.0, 0.5).unwrap();

    // Simulate a noisy logistic trajectory.
    let mut x = 5.0;
    let mut observations = Vec::with_capacity(60);
    for _ in 0..60 {
        x += rate * x * (1.0 - x / capacity);
        observations.push(x + noise.sample(&mut rng));
    }
    let batch = DMatrix::from_iterator(1, observations.len(), observations.iter().copied());

    let mut ekf = EKF::new(
        StateEstimate::from_covar(Vector1::new(4.0), Matrix1::new(2.0)),
        LogisticDynamics { rate, capacity },
        Matrix1::new(1e-2),
        Matrix1::new(0.25),
    );
    let history = ekf.fit(&batch, None).unwrap();

    for (step, estimate) in history.estimates().iter().enumerate() {
        assert!(
            estimate.covar_within_tolerance(1e-9),
            "covariance invalid at step {step}"
        );
    }
    // The trajectory has converged to the carrying capacity by step 60.
    assert!((history.latest().mean[0] - capacity).abs() < 1.0);

    // Fitted observations track the truth to well within the noise level.
    let fitted = ekf.fitted_observations(&history);
    let fitted_seq: Vec<f64> = (0..fitted.ncols()).map(|i| fitted[(0, i)]).collect();
    let error = rmse(&observations, &fitted_seq).unwrap();
    assert!(error < 0.6, "rmse {error}");
    assert!(directional_accuracy(&observations, &fitted_seq).unwrap() > 0.99);
}

#[test]
fn noise_jacobians_scale_the_covariance_terms() {
    let q = 0.04;
    let r = 0.09;
    let l_scale = 2.0;
    let m_scale = 3.0;
    let p_init = 0.5;

    let mut ekf = EKF::new(
        StateEstimate::from_covar(Vector1::new(1.0), Matrix1::new(p_init)),
        ScaledNoiseDynamics { l_scale, m_scale },
        Matrix1::new(q),
        Matrix1::new(r),
    );

    // P⁻ = P + L·Q·Lᵗ
    let predicted = ekf.predict().unwrap();
    let p_prior = p_init + l_scale * l_scale * q;
    assert!((predicted.covar[(0, 0)] - p_prior).abs() < 1e-15);

    // S = P⁻ + M·R·Mᵗ, K = P⁻ / S
    let posterior = ekf.update(&Vector1::new(1.5)).unwrap();
    let s = p_prior + m_scale * m_scale * r;
    let gain = p_prior / s;
    assert!((posterior.mean[0] - (1.0 + gain * 0.5)).abs() < 1e-14);
    assert!((posterior.covar[(0, 0)] - (1.0 - gain) * p_prior).abs() < 1e-14);
}

#[test]
fn extended_filter_rejects_mismatched_batches() {
    let mut ekf = EKF::new(
        StateEstimate::certain(Vector1::new(0.0)),
        IdentityDynamics,
        Matrix1::new(0.01),
        Matrix1::new(1.0),
    );
    let before = ekf.estimate().clone();

    let batch = DMatrix::from_element(3, 4, 1.0);
    let err = ekf.fit(&batch, None).unwrap_err();
    assert_eq!(
        err,
        EstimationError::ShapeMismatch {
            rows: 3,
            expected: 1,
        }
    );
    assert_eq!(ekf.estimate(), &before);
}
