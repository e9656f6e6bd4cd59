use rand::Rng;
use rand_distr::{Distribution, Normal};

/// The draws the engine makes from its single random stream.
///
/// Every `rand::Rng` is a stream. Tests can plug in a [`ConstantStream`] to
/// force outcomes that would otherwise be left to chance.
pub trait RandomStream {
    /// Uniform sample in [0, 1)
    fn uniform(&mut self) -> f64;

    /// Normally distributed sample
    fn gaussian(&mut self, mean: f64, sd: f64) -> f64;

    /// Uniform index in `0..n`
    fn pick(&mut self, n: usize) -> usize;
}

impl<R: Rng> RandomStream for R {
    fn uniform(&mut self) -> f64 {
        self.gen()
    }

    fn gaussian(&mut self, mean: f64, sd: f64) -> f64 {
        match Normal::new(mean, sd) {
            Ok(normal) => normal.sample(self),
            Err(_) => mean,
        }
    }

    fn pick(&mut self, n: usize) -> usize {
        self.gen_range(0..n)
    }
}

/// A stream that returns the same uniform value on every draw.
///
/// Gaussian draws return the mean; `pick` maps the value onto the index range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantStream(pub f64);

impl RandomStream for ConstantStream {
    fn uniform(&mut self) -> f64 {
        self.0
    }

    fn gaussian(&mut self, mean: f64, _sd: f64) -> f64 {
        mean
    }

    fn pick(&mut self, n: usize) -> usize {
        let index = (self.0 * n as f64).floor() as usize;
        index.min(n.saturating_sub(1))
    }
}
