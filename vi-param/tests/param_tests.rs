use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use vi_param::*;

#[test]
fn constrained_round_trip() {
    let p = UgmParams::from_constrained(7.0, 1000.0, 500.5, 480.0);
    assert_abs_diff_eq!(p.lambda_m(), 7.0, epsilon = 1e-12);
    assert_abs_diff_eq!(p.lambda_beta(), 1000.0, epsilon = 1e-9);
    assert_abs_diff_eq!(p.lambda_a(), 500.5, epsilon = 1e-9);
    assert_abs_diff_eq!(p.lambda_b(), 480.0, epsilon = 1e-9);
    assert_abs_diff_eq!(p.precision_mean(), 500.5 / 480.0, epsilon = 1e-12);
}

#[test]
fn init_is_reproducible_and_valid() {
    let prior = UgmPrior::default();
    let mut rng1 = rand::rngs::StdRng::seed_from_u64(42);
    let mut rng2 = rand::rngs::StdRng::seed_from_u64(42);
    let p1 = UgmParams::init(&prior, 3000.0, &mut rng1).unwrap();
    let p2 = UgmParams::init(&prior, 3000.0, &mut rng2).unwrap();
    assert_eq!(p1, p2);
    assert!(p1.is_valid());
}

#[test]
fn init_rejects_bad_spread() {
    let prior = UgmPrior::default();
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    assert!(UgmParams::init(&prior, f64::NAN, &mut rng).is_err());
}

#[test]
fn nan_is_flagged() {
    let mut p = UgmParams::from_constrained(0.0, 1.0, 1.0, 1.0);
    p.raw_mut()[UgmParams::A] = f64::NAN;
    assert_eq!(p.first_invalid(), Some("lambda_a"));
}

#[test]
fn mixture_prior_defaults() {
    let prior = GmmPrior::new(3, 2);
    assert_eq!(prior.num_clusters(), 3);
    assert_eq!(prior.dim(), 2);
    assert_abs_diff_eq!(prior.beta_o, 0.01);
    assert!(prior.alpha_o.iter().all(|&a| a == 1.0));
    assert_eq!(prior.delta_o, nalgebra::DMatrix::<f64>::identity(2, 2));
}
