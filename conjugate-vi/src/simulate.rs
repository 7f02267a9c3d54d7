use crate::common::*;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Uniform};

/// Settings for a simulated Gaussian mixture
#[derive(Debug, Clone)]
pub struct GmmSimArgs {
    /// number of observations
    pub n: usize,
    /// number of clusters
    pub k: usize,
    /// dimension. Default: 2
    pub dim: usize,
    /// minimum distance between neighbouring centres. Default: 6
    pub separation: f64,
    /// random seed
    pub rseed: u64,
}

impl Default for GmmSimArgs {
    fn default() -> Self {
        Self {
            n: 1000,
            k: 2,
            dim: 2,
            separation: 6.0,
            rseed: DEFAULT_SEED,
        }
    }
}

/// Simulated mixture data along with the ground truth
#[derive(Debug, Clone)]
pub struct GmmSimOut {
    /// N x D observations
    pub xx: Mat,
    /// K x D true centres
    pub centres: Mat,
    /// true cluster of each observation
    pub membership: Vec<usize>,
}

/// Centres spaced evenly on a circle in the first two coordinates (on a
/// line if D = 1), neighbours `separation` apart
fn mixture_centres(k: usize, dim: usize, separation: f64) -> Mat {
    let mut centres = Mat::zeros(k, dim);
    if k < 2 {
        return centres;
    }
    if dim == 1 {
        let shift = 0.5 * separation * (k - 1) as f64;
        for c in 0..k {
            centres[(c, 0)] = separation * c as f64 - shift;
        }
        return centres;
    }
    let radius = 0.5 * separation / (std::f64::consts::PI / k as f64).sin();
    for c in 0..k {
        let angle = 2.0 * std::f64::consts::PI * c as f64 / k as f64;
        centres[(c, 0)] = radius * angle.cos();
        centres[(c, 1)] = radius * angle.sin();
    }
    centres
}

/// Simulate a K-component mixture with identity precision
///
/// ```text
/// z_n ~ Uniform{0..K}
/// x_n ~ N(centre[z_n], I)
/// ```
pub fn simulate_gmm(args: &GmmSimArgs) -> anyhow::Result<GmmSimOut> {
    if args.n == 0 || args.k == 0 || args.dim == 0 {
        return Err(invalid_config(format!(
            "simulation needs positive n, k and dim (got {}, {}, {})",
            args.n, args.k, args.dim
        )));
    }

    let mut rng = rand::rngs::StdRng::seed_from_u64(args.rseed);
    let runif = Uniform::new(0, args.k).map_err(|e| anyhow::anyhow!("unif [0 .. k): {}", e))?;
    let rnorm = Normal::new(0.0, 1.0)?;

    let centres = mixture_centres(args.k, args.dim, args.separation);
    let membership: Vec<usize> = (0..args.n).map(|_| runif.sample(&mut rng)).collect();

    let mut xx = Mat::zeros(args.n, args.dim);
    for (i, &z) in membership.iter().enumerate() {
        for j in 0..args.dim {
            xx[(i, j)] = centres[(z, j)] + rnorm.sample(&mut rng);
        }
    }

    info!(
        "simulated {} points from {} clusters in {} dimensions",
        args.n, args.k, args.dim
    );
    Ok(GmmSimOut {
        xx,
        centres,
        membership,
    })
}

/// `n` independent draws from `N(mean, sd²)`
pub fn simulate_univariate(n: usize, mean: f64, sd: f64, rseed: u64) -> anyhow::Result<Vec<f64>> {
    if n == 0 {
        return Err(invalid_config("simulation needs at least one point"));
    }
    let mut rng = rand::rngs::StdRng::seed_from_u64(rseed);
    let rnorm = Normal::new(mean, sd).map_err(|e| invalid_config(format!("N({}, {}²): {}", mean, sd, e)))?;
    Ok((0..n).map(|_| rnorm.sample(&mut rng)).collect())
}
