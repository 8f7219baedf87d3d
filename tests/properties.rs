//! Properties of the ensemble statistics on hand-built ensembles.

use approx::assert_relative_eq;
use enstat::stats::{
    ensemble_mean, ensemble_skill_error, ensemble_spread, kurtosis, mean_squared_deviation,
    skewness,
};
use enstat::{Comparison, StatsError};
use ndarray::{Array1, Array2, Axis, array};

fn ensemble() -> Array2<f64> {
    array![
        [1.0, 4.0, 2.5, 7.0, 0.5],
        [2.0, 3.0, 2.0, 9.0, 1.5],
        [0.5, 6.0, 4.0, 8.0, 0.0],
        [3.5, 5.0, 1.0, 6.5, 2.5],
    ]
}

#[test]
fn identical_members_have_no_spread() {
    let row = array![1.0, -2.0, 3.5, 0.0];
    let a = Array2::from_shape_fn((5, 4), |(_, t)| row[t]);

    let spread = ensemble_spread(a.view(), Axis(0)).unwrap();
    assert_eq!(spread, Array1::<f64>::zeros(4));
    assert!(skewness(a.view(), Axis(0)).unwrap().iter().all(|v| v.is_nan()));
    assert!(kurtosis(a.view(), Axis(0)).unwrap().iter().all(|v| v.is_nan()));
}

#[test]
fn identical_decimal_members_have_no_spread() {
    let row = array![0.1, 0.7, 3.3, 1.1];
    for n_members in [3, 7, 10] {
        let a = Array2::from_shape_fn((n_members, 4), |(_, t)| row[t]);

        let spread = ensemble_spread(a.view(), Axis(0)).unwrap();
        assert_eq!(spread, Array1::<f64>::zeros(4), "M = {n_members}");
        assert!(skewness(a.view(), Axis(0)).unwrap().iter().all(|v| v.is_nan()));
        assert!(kurtosis(a.view(), Axis(0)).unwrap().iter().all(|v| v.is_nan()));

        // Members along the columns
        let t = a.t();
        assert_eq!(ensemble_spread(t, Axis(1)).unwrap(), Array1::<f64>::zeros(4));
        assert!(skewness(t, Axis(1)).unwrap().iter().all(|v| v.is_nan()));
    }
}

#[test]
fn per_step_outputs_keep_time_length() {
    let a = ensemble();
    let truth = array![1.0, 5.0, 2.0, 8.0, 1.0];
    assert_eq!(ensemble_mean(a.view(), Axis(0)).unwrap().len(), 5);
    assert_eq!(ensemble_spread(a.view(), Axis(0)).unwrap().len(), 5);
    assert_eq!(skewness(a.view(), Axis(0)).unwrap().len(), 5);
    assert_eq!(kurtosis(a.view(), Axis(0)).unwrap().len(), 5);
    assert_eq!(
        ensemble_skill_error(a.view(), &truth, Axis(0)).unwrap().len(),
        5
    );

    // Same ensemble with members along the columns
    let t = a.t();
    assert_eq!(ensemble_mean(t, Axis(1)).unwrap().len(), 5);
    assert_eq!(ensemble_mean(t, Axis(0)).unwrap().len(), 4);
}

#[test]
fn spread_is_msd_against_own_mean() {
    let a = ensemble();
    let mean = ensemble_mean(a.view(), Axis(0)).unwrap();
    assert_eq!(
        mean_squared_deviation(a.view(), &mean, Axis(0)).unwrap(),
        ensemble_spread(a.view(), Axis(0)).unwrap()
    );
}

#[test]
fn axis_choice_is_consistent() {
    let a = ensemble();
    let t = a.t();
    assert_eq!(
        ensemble_spread(a.view(), Axis(0)).unwrap(),
        ensemble_spread(t, Axis(1)).unwrap()
    );
    let skew_rows = skewness(a.view(), Axis(0)).unwrap();
    let skew_cols = skewness(t, Axis(1)).unwrap();
    for (&x, &y) in skew_rows.iter().zip(skew_cols.iter()) {
        assert_relative_eq!(x, y, epsilon = 1e-12);
    }
}

#[test]
fn rmsd_is_non_negative() {
    let a = ensemble();
    for reference in [
        array![1.0, 5.0, 2.0, 8.0, 1.0],
        array![-10.0, 0.0, 10.0, -3.0, 2.0],
        array![1.75, 4.5, 2.375, 7.625, 1.125],
    ] {
        let cmp = Comparison::new(a.view(), reference.view(), Axis(0)).unwrap();
        assert!(cmp.root_mean_square_difference().unwrap() >= 0.0);
        assert!(cmp.ensemble_root_mean_square_difference().unwrap() >= 0.0);
    }
}

#[test]
fn nash_sutcliffe_of_series_against_itself_is_one() {
    let reference = array![0.3, 1.7, 4.2, 2.9, 0.8];
    let as_ensemble = reference.view().insert_axis(Axis(0));
    let cmp = Comparison::new(as_ensemble, reference.view(), Axis(0)).unwrap();
    assert_eq!(cmp.nash_sutcliffe().unwrap(), 1.0);
}

#[test]
fn all_true_mask_matches_unmasked() {
    let a = ensemble();
    let truth = array![1.0, 5.0, 2.0, 8.0, 1.0];
    let mask = Array1::from_elem(5, true);

    for window in [0..5, 1..4] {
        let plain = Comparison::new(a.view(), truth.view(), Axis(0))
            .unwrap()
            .window(window.clone())
            .unwrap();
        let masked = plain.clone().mask(mask.view()).unwrap();

        assert_eq!(plain.bias(), masked.bias());
        assert_eq!(
            plain.root_mean_square_difference(),
            masked.root_mean_square_difference()
        );
        assert_eq!(
            plain.ensemble_root_mean_square_difference(),
            masked.ensemble_root_mean_square_difference()
        );
        assert_eq!(plain.nash_sutcliffe(), masked.nash_sutcliffe());
    }
}

#[test]
fn perfect_mean_example() {
    let a = array![[1.0, 2.0, 3.0], [3.0, 4.0, 5.0]];
    let reference = array![2.0, 3.0, 4.0];

    assert_eq!(ensemble_mean(a.view(), Axis(0)).unwrap(), reference);

    let cmp = Comparison::new(a.view(), reference.view(), Axis(0)).unwrap();
    assert_eq!(cmp.bias().unwrap(), 0.0);
    assert_eq!(cmp.nash_sutcliffe().unwrap(), 1.0);
}

#[test]
fn constant_ensemble_example() {
    let a = array![[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]];
    let reference = array![2.0, 2.0, 2.0];

    assert_eq!(
        ensemble_spread(a.view(), Axis(0)).unwrap(),
        array![0.0, 0.0, 0.0]
    );

    let cmp = Comparison::new(a.view(), reference.view(), Axis(0)).unwrap();
    assert_eq!(cmp.root_mean_square_difference().unwrap(), 1.0);
    assert_eq!(
        cmp.nash_sutcliffe(),
        Err(StatsError::ZeroVariance {
            statistic: "Nash-Sutcliffe efficiency"
        })
    );
}

#[test]
fn preconditions_are_not_degenerate() {
    let a = ensemble();
    let short = array![1.0, 2.0];
    let err = Comparison::new(a.view(), short.view(), Axis(0)).unwrap_err();
    assert!(!err.is_degenerate());

    let truth = array![1.0, 5.0, 2.0, 8.0, 1.0];
    let cmp = Comparison::new(a.view(), truth.view(), Axis(0)).unwrap();
    let err = cmp.window(4..2).unwrap_err();
    assert_eq!(err, StatsError::EmptyWindow { start: 4, end: 2 });
    assert!(!err.is_degenerate());
}
