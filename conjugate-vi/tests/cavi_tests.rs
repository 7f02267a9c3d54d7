use approx::assert_abs_diff_eq;
use conjugate_vi::gmm_elbo::gmm_elbo;
use conjugate_vi::simulate::{simulate_gmm, GmmSimArgs};
use conjugate_vi::*;
use nalgebra::{DMatrix, DVector};
use vi_param::{GmmParams, GmmPrior};
use vi_util::LN_2PI;

fn two_cluster_data(n: usize, seed: u64) -> (Dataset, DMatrix<f64>) {
    let sim = simulate_gmm(&GmmSimArgs {
        n,
        k: 2,
        rseed: seed,
        ..Default::default()
    })
    .unwrap();
    (Dataset::new(sim.xx).unwrap(), sim.centres)
}

fn assert_non_decreasing(trace: &[f64]) {
    for (i, w) in trace.windows(2).enumerate() {
        assert!(
            w[1] - w[0] >= -1e-8,
            "ELBO decreased at iteration {}: {} -> {}",
            i + 1,
            w[0],
            w[1]
        );
    }
}

fn variant(err: &anyhow::Error) -> &VariationalError {
    err.downcast_ref::<VariationalError>()
        .unwrap_or_else(|| panic!("not a VariationalError: {}", err))
}

#[test]
fn elbo_never_decreases() {
    let (data, _) = two_cluster_data(400, 3);
    for kk in [1, 2, 3, 5] {
        let prior = GmmPrior::new(kk, 2);
        let fit = fit_gmm_cavi(&data, &prior, &CaviOptions::default()).unwrap();
        assert!(!fit.elbo_trace.is_empty());
        assert_non_decreasing(&fit.elbo_trace);
    }
}

#[test]
fn elbo_never_decreases_with_correlated_precision() {
    let (data, _) = two_cluster_data(300, 11);
    let mut prior = GmmPrior::new(3, 2);
    prior.delta_o = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]);
    prior.m_o = DVector::from_vec(vec![1.0, -1.0]);
    let fit = fit_gmm_cavi(&data, &prior, &CaviOptions::default()).unwrap();
    assert_non_decreasing(&fit.elbo_trace);
}

#[test]
fn responsibilities_stay_on_simplex() {
    let (data, _) = two_cluster_data(200, 5);
    let prior = GmmPrior::new(3, 2);
    let mut visited = 0;
    let mut check = |_iter: usize, params: &GmmParams, _elbo: f64| {
        for row in params.lambda_phi.row_iter() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-9);
            assert!(row.iter().all(|&p| p >= 0.0));
        }
        visited += 1;
    };
    let fit = fit_gmm_cavi_observed(&data, &prior, &CaviOptions::default(), &mut check).unwrap();
    assert_eq!(visited, fit.num_iter);
}

#[test]
fn single_cluster_mean_is_shrunk_average() {
    let xs: [&[f64]; 2] = [&[2.0], &[1.0, 4.0]];
    for x in xs {
        let data = Dataset::from_slice(x).unwrap();
        let mut prior = GmmPrior::new(1, 1);
        prior.m_o[0] = 0.5;
        prior.beta_o = 0.3;

        let fit = fit_gmm_cavi(&data, &prior, &CaviOptions::default()).unwrap();
        let nn = x.len() as f64;
        let xbar = x.iter().sum::<f64>() / nn;
        let expected = (prior.beta_o * prior.m_o[0] + nn * xbar) / (prior.beta_o + nn);
        assert_abs_diff_eq!(fit.params.lambda_m[(0, 0)], expected, epsilon = 1e-12);
    }

    // same in two dimensions
    let data = Dataset::from_rows(&[vec![1.0, -2.0], vec![3.0, 0.0]]).unwrap();
    let prior = GmmPrior::new(1, 2);
    let fit = fit_gmm_cavi(&data, &prior, &CaviOptions::default()).unwrap();
    assert_abs_diff_eq!(fit.params.lambda_m[(0, 0)], 4.0 / 2.01, epsilon = 1e-12);
    assert_abs_diff_eq!(fit.params.lambda_m[(0, 1)], -2.0 / 2.01, epsilon = 1e-12);
}

#[test]
fn single_cluster_runs_to_max_iter() {
    // the bound is flat after the first sweep, which is not a strict increase
    let data = Dataset::from_slice(&[1.0, 2.0, 3.0]).unwrap();
    let prior = GmmPrior::new(1, 1);
    let options = CaviOptions {
        max_iter: 7,
        ..Default::default()
    };
    let fit = fit_gmm_cavi(&data, &prior, &options).unwrap();
    assert_eq!(fit.status, FitStatus::MaxIterReached);
    assert_eq!(fit.num_iter, 7);
    assert_eq!(fit.elbo_trace.len(), 7);
}

#[test]
fn stops_within_max_iter() {
    let (data, _) = two_cluster_data(300, 9);
    for max_iter in [1, 2, 10, 300] {
        let options = CaviOptions {
            max_iter,
            ..Default::default()
        };
        let fit = fit_gmm_cavi(&data, &GmmPrior::new(4, 2), &options).unwrap();
        assert!(fit.num_iter <= max_iter);
        assert_eq!(fit.num_iter, fit.elbo_trace.len());
        assert_ne!(fit.status, FitStatus::Running);
    }
}

#[test]
fn hand_computed_elbo_one_point() {
    // x = 2, K = 1, D = 1, m_o = 0, beta_o = 1, Δ = 1, α = 1
    // after one sweep: λ_π = 2, λ_β = 2, m = 1, φ = 1
    let data = Dataset::from_slice(&[2.0]).unwrap();
    let mut prior = GmmPrior::new(1, 1);
    prior.beta_o = 1.0;

    let options = CaviOptions {
        max_iter: 3,
        ..Default::default()
    };
    let fit = fit_gmm_cavi(&data, &prior, &options).unwrap();

    assert_abs_diff_eq!(fit.params.lambda_pi[0], 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(fit.params.lambda_beta[0], 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(fit.params.lambda_m[(0, 0)], 1.0, epsilon = 1e-12);

    // Dirichlet part vanishes; -½ ln 2π; ½ ln ½ + ½ - ¼ - ½; -½ - ¼
    let expected = -0.5 * LN_2PI + 0.5 * 0.5f64.ln() - 1.0;
    assert_abs_diff_eq!(expected, -2.265_512, epsilon = 1e-6);
    for &elbo in &fit.elbo_trace {
        assert_abs_diff_eq!(elbo, expected, epsilon = 1e-12);
    }
}

#[test]
fn elbo_matches_direct_evaluation() {
    let (data, _) = two_cluster_data(100, 21);
    let prior = GmmPrior::new(2, 2);
    let fit = fit_gmm_cavi(&data, &prior, &CaviOptions::default()).unwrap();
    let direct = gmm_elbo(data.matrix(), &fit.params, &prior, 0.0);
    assert_abs_diff_eq!(fit.final_elbo().unwrap(), direct, epsilon = 1e-9);
}

#[test]
fn recovers_separated_centres() {
    let (data, centres) = two_cluster_data(600, 42);
    let prior = GmmPrior::new(2, 2);
    let fit = fit_gmm_cavi(&data, &prior, &CaviOptions::default()).unwrap();
    assert_eq!(fit.status, FitStatus::Converged);

    for k in 0..2 {
        let fitted = fit.params.lambda_m.row(k);
        let closest = (0..2)
            .map(|c| (fitted - centres.row(c)).norm())
            .fold(f64::INFINITY, f64::min);
        assert!(closest < 0.4, "cluster {} is {} away from any true centre", k, closest);
    }
}

#[test]
fn observer_does_not_change_results() {
    let (data, _) = two_cluster_data(250, 8);
    let prior = GmmPrior::new(3, 2);
    let options = CaviOptions::default();

    let plain = fit_gmm_cavi(&data, &prior, &options).unwrap();

    let mut seen = vec![];
    let mut record = |iter: usize, _: &GmmParams, elbo: f64| seen.push((iter, elbo));
    let observed = fit_gmm_cavi_observed(&data, &prior, &options, &mut record).unwrap();

    assert_eq!(plain.elbo_trace, observed.elbo_trace);
    assert_eq!(plain.params.lambda_phi, observed.params.lambda_phi);
    assert_eq!(plain.params.lambda_m, observed.params.lambda_m);
    assert_eq!(plain.status, observed.status);

    let expected: Vec<(usize, f64)> = plain.elbo_trace.iter().copied().enumerate().collect();
    assert_eq!(seen, expected);
}

#[test]
fn seed_controls_initialization() {
    let (data, _) = two_cluster_data(150, 1);
    let prior = GmmPrior::new(3, 2);
    let a = fit_gmm_cavi(&data, &prior, &CaviOptions::default()).unwrap();
    let b = fit_gmm_cavi(&data, &prior, &CaviOptions::default()).unwrap();
    assert_eq!(a.elbo_trace, b.elbo_trace);
}

#[test]
fn invalid_configurations_are_rejected() {
    let (data, _) = two_cluster_data(20, 2);
    let options = CaviOptions::default();

    let err = fit_gmm_cavi(&data, &GmmPrior::new(0, 2), &options).unwrap_err();
    assert!(matches!(variant(&err), VariationalError::InvalidConfig(_)));

    let err = fit_gmm_cavi(&data, &GmmPrior::new(2, 3), &options).unwrap_err();
    assert!(matches!(variant(&err), VariationalError::InvalidConfig(_)));

    let mut prior = GmmPrior::new(2, 2);
    prior.alpha_o[1] = 0.0;
    let err = fit_gmm_cavi(&data, &prior, &options).unwrap_err();
    assert!(matches!(variant(&err), VariationalError::InvalidConfig(_)));

    let mut prior = GmmPrior::new(2, 2);
    prior.beta_o = -1.0;
    let err = fit_gmm_cavi(&data, &prior, &options).unwrap_err();
    assert!(matches!(variant(&err), VariationalError::InvalidConfig(_)));

    let zero_iter = CaviOptions {
        max_iter: 0,
        ..Default::default()
    };
    let err = fit_gmm_cavi(&data, &GmmPrior::new(2, 2), &zero_iter).unwrap_err();
    assert!(matches!(variant(&err), VariationalError::InvalidConfig(_)));

    assert!(Dataset::from_rows(&[]).is_err());
}

#[test]
fn indefinite_precision_is_rejected() {
    let (data, _) = two_cluster_data(20, 2);
    let options = CaviOptions::default();

    let mut prior = GmmPrior::new(2, 2);
    prior.delta_o = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
    let err = fit_gmm_cavi(&data, &prior, &options).unwrap_err();
    assert_eq!(variant(&err), &VariationalError::NotPositiveDefinite);

    let mut prior = GmmPrior::new(2, 2);
    prior.delta_o = DMatrix::from_row_slice(2, 2, &[1.0, 0.3, 0.0, 1.0]);
    let err = fit_gmm_cavi(&data, &prior, &options).unwrap_err();
    assert_eq!(variant(&err), &VariationalError::NotPositiveDefinite);
}
