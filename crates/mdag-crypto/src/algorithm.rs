use std::fmt;
use std::str::FromStr;

use mdag_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::hasher::{
    Blake3Computation, Blake3Provider, HashComputation, HashProvider, Sha256Computation,
    Sha256Provider,
};

/// A supported digest algorithm.
///
/// Used as the `hash` key in configuration, and usable directly as a
/// [`HashProvider`] that dispatches at runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Blake3,
    Sha256,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blake3 => "blake3",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing an algorithm name that is not supported.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown hash algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for HashAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blake3" => Ok(Self::Blake3),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Computation for a runtime-selected algorithm.
#[derive(Clone, Debug)]
pub enum AlgorithmComputation {
    Blake3(Blake3Computation),
    Sha256(Sha256Computation),
}

impl HashComputation for AlgorithmComputation {
    fn write(&mut self, data: &[u8]) {
        match self {
            Self::Blake3(c) => c.write(data),
            Self::Sha256(c) => c.write(data),
        }
    }

    fn sum(&self, extra: &[u8]) -> ObjectId {
        match self {
            Self::Blake3(c) => c.sum(extra),
            Self::Sha256(c) => c.sum(extra),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Blake3(c) => c.reset(),
            Self::Sha256(c) => c.reset(),
        }
    }
}

impl HashProvider for HashAlgorithm {
    type Computation = AlgorithmComputation;

    fn get(&self) -> Self::Computation {
        match self {
            Self::Blake3 => AlgorithmComputation::Blake3(Blake3Provider.get()),
            Self::Sha256 => AlgorithmComputation::Sha256(Sha256Provider.get()),
        }
    }

    fn algorithm(&self) -> HashAlgorithm {
        *self
    }
}
