//! ## Keys
//!
//! Every account has one **account key** and any number of **signing
//! keys**. Both are RedPallas SpendAuth key pairs:
//!
//! - [`PrivateKey`]: a Pallas scalar. The account private key also keys
//!   value note nullifiers, so only the owner can derive them.
//! - [`PublicKey`]: the affine point $[\mathsf{sk}]\,\mathcal{G}$ as two
//!   $\mathbb{F}_p$ coordinates, compared coordinate-wise. Ownership is
//!   always a point equality, never an opaque identity.
//! - [`Signature`]: a 64-byte RedPallas signature over the 32-byte encoding
//!   of a transition's signing message.
//!
//! The fixed base $\mathcal{G}$ is the RedPallas SpendAuth basepoint, so a
//! key derived with [`scalar_mul_fixed_base`] verifies signatures produced
//! by the same scalar.

mod private;
mod public;
mod signature;

pub use private::{PrivateKey, scalar_mul_fixed_base};
pub use public::PublicKey;
pub use signature::Signature;
