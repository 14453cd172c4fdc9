use ff::{FromUniformBytes as _, PrimeField as _};
use pasta_curves::Fp;

use crate::keys::PublicKey;

/// Incremental domain-separated hash into $\mathbb{F}_p$.
///
/// `BLAKE2b-512(personalization, x_1 || x_2 || ...)` reduced with
/// `FromUniformBytes`, where every field element enters as its canonical
/// 32-byte little-endian encoding. Deterministic: equal inputs give equal
/// outputs on every platform.
#[derive(Clone, Debug)]
pub struct Hasher(blake2b_simd::State);

impl Hasher {
    /// Start a hash under the given 16-byte personalization.
    #[must_use]
    pub fn new(personalization: &[u8; 16]) -> Self {
        Self(
            blake2b_simd::Params::new()
                .hash_length(64)
                .personal(personalization)
                .to_state(),
        )
    }

    /// Absorb a field element.
    #[must_use]
    pub fn field(mut self, fp: Fp) -> Self {
        self.0.update(&fp.to_repr());
        self
    }

    /// Absorb both coordinates of a curve point.
    #[must_use]
    pub fn point(self, pk: PublicKey) -> Self {
        self.field(pk.x).field(pk.y)
    }

    /// Absorb a boolean as the field element 0 or 1.
    #[must_use]
    pub fn flag(self, flag: bool) -> Self {
        self.field(Fp::from(u64::from(flag)))
    }

    /// Absorb raw 32-byte key material.
    #[must_use]
    pub fn bytes(mut self, bytes: &[u8; 32]) -> Self {
        self.0.update(bytes);
        self
    }

    /// Finish the hash.
    #[must_use]
    pub fn finalize(&self) -> Fp {
        Fp::from_uniform_bytes(self.0.finalize().as_array())
    }
}

/// `commit(fields...)`: hash a list of field elements under a
/// personalization.
#[must_use]
pub fn commit(personalization: &[u8; 16], fields: &[Fp]) -> Fp {
    fields
        .iter()
        .fold(Hasher::new(personalization), |hasher, fp| hasher.field(*fp))
        .finalize()
}
