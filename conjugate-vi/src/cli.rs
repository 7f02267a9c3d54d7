use clap::{Args, Parser, Subcommand};
use conjugate_vi::common::*;
use conjugate_vi::simulate::{simulate_gmm, simulate_univariate, GmmSimArgs};
use conjugate_vi::{fit_gmm_cavi, fit_ugm_gavi, CaviOptions, Dataset, FitStatus, GaviOptions};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use vi_param::{GmmPrior, UgmPrior};

#[derive(Parser)]
#[command(name = "conjugate-vi")]
#[command(about = "Variational inference for conjugate Gaussian models on simulated data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate a Gaussian mixture and fit it by coordinate ascent
    Gmm(GmmArgs),
    /// Simulate univariate Normal data and fit it by gradient ascent
    Ugm(UgmArgs),
}

#[derive(Args, Debug)]
pub struct GmmArgs {
    #[arg(long, default_value_t = 2, help = "Number of clusters")]
    pub k: usize,

    #[arg(long, default_value_t = 1000, help = "Number of simulated points")]
    pub n: usize,

    #[arg(long, default_value_t = 2, help = "Dimension of the simulated points")]
    pub dim: usize,

    #[arg(long, default_value_t = DEFAULT_CAVI_MAX_ITER, help = "Maximum number of sweeps")]
    pub max_iter: usize,

    #[arg(
        long,
        default_value_t = DEFAULT_THRESHOLD,
        help = "Convergence tolerance",
        long_help = "Stop once a sweep improves the ELBO by a positive amount\n\
                     smaller than this."
    )]
    pub threshold: f64,

    #[arg(long, default_value_t = DEFAULT_SEED, help = "Random seed")]
    pub seed: u64,

    #[arg(short, long, help = "Output prefix (creates {output}.json)")]
    pub output: Box<str>,

    #[arg(short, long, help = "Log every iteration")]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct UgmArgs {
    #[arg(long, default_value_t = 1000, help = "Number of simulated points")]
    pub n: usize,

    #[arg(long, default_value_t = 7.0, help = "Mean of the simulated Normal")]
    pub mean: f64,

    #[arg(long, default_value_t = 1.0, help = "Standard deviation of the simulated Normal")]
    pub sd: f64,

    #[arg(long, default_value_t = DEFAULT_GAVI_MAX_ITER, help = "Maximum number of Adam steps")]
    pub max_iter: usize,

    #[arg(long, default_value_t = DEFAULT_LEARNING_RATE, help = "Adam learning rate")]
    pub lr: f64,

    #[arg(long, default_value_t = DEFAULT_THRESHOLD, help = "Convergence tolerance on |ΔELBO|")]
    pub threshold: f64,

    #[arg(
        long,
        default_value_t = DEFAULT_INIT_MEAN_SD,
        help = "Spread of the initial mean",
        long_help = "Standard deviation of the random starting value of the\n\
                     variational mean, centred on the prior mean."
    )]
    pub init_mean_sd: f64,

    #[arg(long, default_value_t = DEFAULT_SEED, help = "Random seed")]
    pub seed: u64,

    #[arg(short, long, help = "Output prefix (creates {output}.json)")]
    pub output: Box<str>,

    #[arg(short, long, help = "Log every iteration")]
    pub verbose: bool,
}

#[derive(Serialize)]
struct GmmReport {
    status: FitStatus,
    num_iter: usize,
    elbo_trace: Vec<f64>,
    lambda_pi: Vec<f64>,
    lambda_beta: Vec<f64>,
    lambda_m: Vec<Vec<f64>>,
    true_centres: Vec<Vec<f64>>,
    assignments: Vec<usize>,
}

#[derive(Serialize)]
struct UgmReport {
    status: FitStatus,
    num_iter: usize,
    elbo_trace: Vec<f64>,
    lambda_m: f64,
    lambda_beta: f64,
    lambda_a: f64,
    lambda_b: f64,
    precision_mean: f64,
}

fn rows_of(mat: &Mat) -> Vec<Vec<f64>> {
    mat.row_iter().map(|r| r.iter().copied().collect()).collect()
}

fn write_json<T: Serialize>(report: &T, output: &str) -> anyhow::Result<()> {
    let file_path = format!("{}.json", output);
    let writer = BufWriter::new(File::create(&file_path)?);
    serde_json::to_writer_pretty(writer, report)?;
    info!("wrote {}", file_path);
    Ok(())
}

pub fn run_gmm(args: &GmmArgs) -> anyhow::Result<()> {
    let sim = simulate_gmm(&GmmSimArgs {
        n: args.n,
        k: args.k,
        dim: args.dim,
        rseed: args.seed,
        ..Default::default()
    })?;

    let data = Dataset::new(sim.xx)?;
    let prior = GmmPrior::new(args.k, data.ncols());
    let options = CaviOptions {
        max_iter: args.max_iter,
        threshold: args.threshold,
        seed: args.seed,
        verbose: args.verbose,
        show_progress: true,
    };

    let fit = fit_gmm_cavi(&data, &prior, &options)?;

    let report = GmmReport {
        status: fit.status,
        num_iter: fit.num_iter,
        lambda_pi: fit.params.lambda_pi.iter().copied().collect(),
        lambda_beta: fit.params.lambda_beta.iter().copied().collect(),
        lambda_m: rows_of(&fit.params.lambda_m),
        true_centres: rows_of(&sim.centres),
        assignments: fit.params.argmax_assignments(),
        elbo_trace: fit.elbo_trace,
    };
    write_json(&report, &args.output)
}

pub fn run_ugm(args: &UgmArgs) -> anyhow::Result<()> {
    let x = simulate_univariate(args.n, args.mean, args.sd, args.seed)?;
    let data = Dataset::from_slice(&x)?;
    let prior = UgmPrior::default();
    let options = GaviOptions {
        learning_rate: args.lr,
        max_iter: args.max_iter,
        threshold: args.threshold,
        init_mean_sd: args.init_mean_sd,
        seed: args.seed,
        verbose: args.verbose,
        show_progress: true,
    };

    let fit = fit_ugm_gavi(&data, &prior, &options)?;
    let params = &fit.params;

    let report = UgmReport {
        status: fit.status,
        num_iter: fit.num_iter,
        lambda_m: params.lambda_m(),
        lambda_beta: params.lambda_beta(),
        lambda_a: params.lambda_a(),
        lambda_b: params.lambda_b(),
        precision_mean: params.precision_mean(),
        elbo_trace: fit.elbo_trace,
    };
    write_json(&report, &args.output)
}
