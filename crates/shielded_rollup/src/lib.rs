//! # shielded_rollup
//!
//! Transition predicates for an account-based shielded rollup with DeFi
//! bridging.
//!
//! Given a private witness, each transition decides whether a state change
//! is valid and, if so, which public values it commits to:
//!
//! - **Account**: register an alias and account key, migrate the account
//!   key, or authorize additional signing keys.
//! - **Join-split**: spend up to two value notes into up to two new ones,
//!   as a deposit, withdrawal, private send or DeFi deposit.
//! - **Claim**: settle a finished DeFi interaction into a value note.
//!
//! Every transition returns the same fixed 16-slot [`PublicInputs`]
//! vector, so an aggregator can treat all proof kinds uniformly.
//!
//! ## Scope
//!
//! This crate only evaluates predicates. Proving, data tree storage,
//! nullifier uniqueness and batch aggregation belong to the surrounding
//! rollup: roots arrive as plain field elements and nullifiers leave as
//! plain field elements.
//!
//! ## Primitives
//!
//! Everything lives in the Pallas base field $\mathbb{F}_p$. Commitments,
//! nullifiers, Merkle nodes and signing messages are domain-separated
//! BLAKE2b-512 hashes reduced into $\mathbb{F}_p$. Keys are Pallas points
//! and signatures are RedPallas.
//!
//! ## Nomenclature
//!
//! A *note* is a committed record; its *commitment* goes into the data
//! tree and its *nullifier* is revealed when it is consumed. An *alias*
//! names an account; the *account key* owns value notes; *signing keys*
//! authorize spends when a note requires it.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::pub_use, reason = "exporting items for consumers")]

extern crate alloc;

pub mod bridge;
pub mod circuit;
pub mod constants;
pub mod error;
pub mod keys;
pub mod note;
pub mod primitives;

#[cfg(any(test, feature = "test-dependencies"))]
pub mod testing;

pub use bridge::BridgeCallData;
pub use circuit::{PublicInputs, Witness, evaluate};
pub use constants::ProofId;
pub use error::CircuitError;
pub use keys::{PrivateKey, PublicKey, Signature};
