//! Seeded random streams for resampling and subsampling.

use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use siphasher::sip::SipHasher13;

/// Seeded random stream.
///
/// Every random draw in the workspace starts from a caller supplied `u64`.
/// Numbered substreams hash `(master_seed, substream)` with SipHash-1-3 under
/// zero keys, so bootstrap iteration `i` sees the same stream whichever worker
/// runs it.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Stream seeded directly from `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Stream number `substream` of `master_seed`.
    pub fn substream(master_seed: u64, substream: u64) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, substream))
    }

    /// Draws `n` indices uniformly from `[0, n)` with replacement.
    pub fn resample_indices(&mut self, n: usize) -> Vec<usize> {
        if n == 0 {
            return Vec::new();
        }
        (0..n).map(|_| self.rng.gen_range(0..n)).collect()
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Seed of substream `substream` under `master_seed`.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
