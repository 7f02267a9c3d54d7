//! Numeric building blocks shared by the variational updaters.
//!
//! Everything here is pure and stateless. The special functions are the
//! most fragile part of an ELBO computation: a wrong digamma does not raise
//! anything, it just silently shifts the bound. Keep the tests in
//! `tests/special_tests.rs` in sync with any change.

/// digamma, trigamma, log-gamma and the softplus family
pub mod special_fn;

/// Dirichlet expectation, multivariate log-Beta, softmax and sampling on the simplex
pub mod simplex;

/// Small dense linear algebra: Cholesky log-determinant, quadratic forms
pub mod linalg;

pub use linalg::*;
pub use simplex::*;
pub use special_fn::*;
