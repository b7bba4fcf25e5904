//! Hash providers for the mdag object store.
//!
//! A [`HashProvider`] hands out fresh [`HashComputation`]s; the DAG crate
//! never holds a global hasher. Two algorithms are supported:
//!
//! - [`Blake3Provider`] -- BLAKE3, the default
//! - [`Sha256Provider`] -- SHA-256
//!
//! [`HashAlgorithm`] names an algorithm and is itself a provider, which lets
//! configuration pick the algorithm at runtime.
//!
//! All crypto operations wrap established libraries -- no custom cryptography.

pub mod algorithm;
pub mod hasher;

pub use algorithm::{AlgorithmComputation, HashAlgorithm, UnknownAlgorithm};
pub use hasher::{
    digest, verify, Blake3Computation, Blake3Provider, HashComputation, HashProvider,
    Sha256Computation, Sha256Provider,
};
