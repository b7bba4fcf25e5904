use mdag_types::ObjectId;
use sha2::Digest;

use crate::algorithm::HashAlgorithm;

/// A single in-progress digest computation.
///
/// A computation accumulates input through [`write`](Self::write) and is
/// finalized by [`sum`](Self::sum). It must be [`reset`](Self::reset) or
/// dropped between independent digests and is never shared across threads
/// while in use.
pub trait HashComputation {
    /// Append input.
    fn write(&mut self, data: &[u8]);

    /// Finalize over everything written so far followed by `extra`.
    ///
    /// Does not consume or modify the computation.
    fn sum(&self, extra: &[u8]) -> ObjectId;

    /// Discard all written input.
    fn reset(&mut self);
}

/// Source of fresh hash computations.
pub trait HashProvider: Send + Sync {
    type Computation: HashComputation;

    /// A fresh computation with no input written.
    fn get(&self) -> Self::Computation;

    /// The algorithm this provider computes.
    fn algorithm(&self) -> HashAlgorithm;
}

impl<P: HashProvider + ?Sized> HashProvider for &P {
    type Computation = P::Computation;

    fn get(&self) -> Self::Computation {
        (**self).get()
    }

    fn algorithm(&self) -> HashAlgorithm {
        (**self).algorithm()
    }
}

/// Digest `data` with a fresh computation from `provider`.
pub fn digest<P: HashProvider + ?Sized>(provider: &P, data: &[u8]) -> ObjectId {
    let mut computation = provider.get();
    computation.write(data);
    computation.sum(&[])
}

/// Check that `data` digests to `expected`.
pub fn verify<P: HashProvider + ?Sized>(provider: &P, data: &[u8], expected: &ObjectId) -> bool {
    digest(provider, data) == *expected
}

// ---------------------------------------------------------------------------
// BLAKE3
// ---------------------------------------------------------------------------

/// Provider for BLAKE3 computations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blake3Provider;

/// In-progress BLAKE3 digest.
#[derive(Clone, Debug, Default)]
pub struct Blake3Computation(blake3::Hasher);

impl HashComputation for Blake3Computation {
    fn write(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn sum(&self, extra: &[u8]) -> ObjectId {
        let hash = if extra.is_empty() {
            self.0.finalize()
        } else {
            let mut hasher = self.0.clone();
            hasher.update(extra);
            hasher.finalize()
        };
        ObjectId::from_hash(*hash.as_bytes())
    }

    fn reset(&mut self) {
        self.0.reset();
    }
}

impl HashProvider for Blake3Provider {
    type Computation = Blake3Computation;

    fn get(&self) -> Self::Computation {
        Blake3Computation::default()
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Blake3
    }
}

// ---------------------------------------------------------------------------
// SHA-256
// ---------------------------------------------------------------------------

/// Provider for SHA-256 computations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha256Provider;

/// In-progress SHA-256 digest.
#[derive(Clone, Debug, Default)]
pub struct Sha256Computation(sha2::Sha256);

impl HashComputation for Sha256Computation {
    fn write(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }

    fn sum(&self, extra: &[u8]) -> ObjectId {
        let mut hasher = self.0.clone();
        Digest::update(&mut hasher, extra);
        let hash = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        ObjectId::from_hash(bytes)
    }

    fn reset(&mut self) {
        Digest::reset(&mut self.0);
    }
}

impl HashProvider for Sha256Provider {
    type Computation = Sha256Computation;

    fn get(&self) -> Self::Computation {
        Sha256Computation::default()
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }
}
