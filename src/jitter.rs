//! Sources of the random spread applied to due dates so that items learned together don't all
//! come due on the same day.

pub const MIN_JITTER: f64 = 0.8;
pub const MAX_JITTER: f64 = 1.2;

pub trait Jitter {
    /// Returns a multiplier in [`MIN_JITTER`, `MAX_JITTER`].
    fn factor(&mut self) -> f64;
}

/// Leaves due dates exactly on the interval.
pub struct NoJitter;

impl Jitter for NoJitter {
    fn factor(&mut self) -> f64 {
        1.0
    }
}

pub struct RandomJitter {
    rng: fastrand::Rng,
}

impl RandomJitter {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for RandomJitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Jitter for RandomJitter {
    fn factor(&mut self) -> f64 {
        MIN_JITTER + self.rng.f64() * (MAX_JITTER - MIN_JITTER)
    }
}

impl<J: Jitter + ?Sized> Jitter for Box<J> {
    fn factor(&mut self) -> f64 {
        (**self).factor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_in_range() {
        let mut jitter = RandomJitter::with_seed(391348571);

        for _ in 0..1000 {
            let f = jitter.factor();
            assert!((MIN_JITTER..=MAX_JITTER).contains(&f), "{f}");
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RandomJitter::with_seed(123456789);
        let mut b = RandomJitter::with_seed(123456789);

        for _ in 0..10 {
            assert_eq!(a.factor().to_bits(), b.factor().to_bits());
        }
    }

    #[test]
    fn no_jitter() {
        assert_eq!(NoJitter.factor(), 1.0);
    }
}
