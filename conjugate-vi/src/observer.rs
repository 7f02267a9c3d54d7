/// Called once per completed iteration with the zero-based iteration index,
/// the parameters after the update and the ELBO recorded for that iteration.
///
/// Any `FnMut(usize, &P, f64)` closure is an observer.
pub trait IterationObserver<P> {
    /// see the trait docs
    fn observe(&mut self, iteration: usize, params: &P, elbo: f64);
}

impl<P, F> IterationObserver<P> for F
where
    F: FnMut(usize, &P, f64),
{
    fn observe(&mut self, iteration: usize, params: &P, elbo: f64) {
        self(iteration, params, elbo)
    }
}

/// Observer that does nothing
pub struct NoopObserver;

impl<P> IterationObserver<P> for NoopObserver {
    fn observe(&mut self, _iteration: usize, _params: &P, _elbo: f64) {}
}
