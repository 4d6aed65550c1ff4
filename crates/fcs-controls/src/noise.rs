//! Deterministic noise streams for degraded sensors.
//!
//! Each noisy component draws from its own ChaCha stream seeded by hashing
//! the run's master seed with the component's property name, so results are
//! reproducible and independent of component order. The hash is a fixed-key
//! SipHash over little-endian bytes and does not change between toolchains.

use std::hash::Hasher;

use fcs_core::PropertyId;
use fcs_props::PropertyStore;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use rand_seeder::SipHasher;

/// RNG for a named component under a master seed.
pub fn component_rng(seed: u64, name: &str) -> ChaCha8Rng {
    let mut hasher = SipHasher::new();
    hasher.write(&seed.to_le_bytes());
    hasher.write(name.as_bytes());
    ChaCha8Rng::seed_from_u64(hasher.finish())
}

/// How a draw is combined with the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseKind {
    /// `output *= 1 + variance * r`
    #[default]
    Percent,
    /// `output += variance * r`
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distribution {
    /// `r` uniform on `[-1, 1)`.
    #[default]
    Uniform,
    /// `r` standard normal.
    Gaussian,
}

/// Noise stage. The variance lives in a property so it can be changed
/// while running.
#[derive(Debug, Clone)]
pub struct Noise {
    variance: PropertyId,
    kind: NoiseKind,
    distribution: Distribution,
    seed: u64,
    stream: String,
    rng: ChaCha8Rng,
}

impl Noise {
    /// Create `<base>/noise-variance` and the stream for `base`.
    pub fn new(base: &str, seed: u64, store: &mut PropertyStore) -> Self {
        let variance = store.create(&format!("{base}/noise-variance"));
        Self {
            variance,
            kind: NoiseKind::default(),
            distribution: Distribution::default(),
            seed,
            stream: base.to_string(),
            rng: component_rng(seed, base),
        }
    }

    /// Set the initial variance and draw model.
    pub fn configure(
        &mut self,
        variance: f64,
        kind: NoiseKind,
        distribution: Distribution,
        store: &mut PropertyStore,
    ) {
        store.set(self.variance, variance);
        self.kind = kind;
        self.distribution = distribution;
    }

    pub fn variance_property(&self) -> PropertyId {
        self.variance
    }

    fn draw(&mut self) -> f64 {
        match self.distribution {
            Distribution::Uniform => self.rng.gen_range(-1.0..1.0),
            Distribution::Gaussian => self.rng.sample(StandardNormal),
        }
    }

    /// Apply noise to `value`. A zero variance leaves it untouched.
    pub fn apply(&mut self, value: f64, store: &PropertyStore) -> f64 {
        let variance = store.get(self.variance);
        if variance == 0.0 {
            return value;
        }
        let r = self.draw();
        match self.kind {
            NoiseKind::Percent => value * (1.0 + variance * r),
            NoiseKind::Absolute => value + variance * r,
        }
    }

    /// Restart the stream from its seed.
    pub fn reset(&mut self) {
        self.rng = component_rng(self.seed, &self.stream);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draws(seed: u64, name: &str) -> Vec<f64> {
        let mut rng = component_rng(seed, name);
        (0..4).map(|_| rng.gen_range(0.0..1.0)).collect()
    }

    #[test]
    fn streams_are_reproducible_per_name() {
        assert_eq!(draws(7, "x"), draws(7, "x"));
        assert_ne!(draws(7, "x"), draws(7, "y"));
        assert_ne!(draws(7, "x"), draws(8, "x"));
    }

    #[test]
    fn seed_is_a_byte_hash_of_seed_then_name() {
        let mut bytes = 7_u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"fcs/pitot");
        let mut hasher = SipHasher::new();
        hasher.write(&bytes);
        let mut expected = ChaCha8Rng::seed_from_u64(hasher.finish());
        let mut rng = component_rng(7, "fcs/pitot");
        assert_eq!(rng.r#gen::<u64>(), expected.r#gen::<u64>());
    }

    #[test]
    fn absolute_noise_is_bounded_by_variance() {
        let mut store = PropertyStore::new();
        let mut noise = Noise::new("fcs/sensor", 1, &mut store);
        noise.configure(0.1, NoiseKind::Absolute, Distribution::Uniform, &mut store);
        for _ in 0..200 {
            let v = noise.apply(5.0, &store);
            assert!((4.9..5.1).contains(&v));
        }
    }

    #[test]
    fn zero_variance_is_identity() {
        let mut store = PropertyStore::new();
        let mut noise = Noise::new("fcs/sensor", 1, &mut store);
        assert_eq!(noise.apply(3.0, &store), 3.0);
    }

    #[test]
    fn variance_property_is_live() {
        let mut store = PropertyStore::new();
        let mut noise = Noise::new("fcs/sensor", 1, &mut store);
        store.set_by_name("fcs/sensor/noise-variance", 0.5).unwrap();
        assert_ne!(noise.apply(3.0, &store), 3.0);
    }

    #[test]
    fn reset_replays_stream() {
        let mut store = PropertyStore::new();
        let mut noise = Noise::new("fcs/sensor", 9, &mut store);
        noise.configure(1.0, NoiseKind::Percent, Distribution::Gaussian, &mut store);
        let first: Vec<f64> = (0..5).map(|_| noise.apply(1.0, &store)).collect();
        noise.reset();
        let again: Vec<f64> = (0..5).map(|_| noise.apply(1.0, &store)).collect();
        assert_eq!(first, again);
    }
}
