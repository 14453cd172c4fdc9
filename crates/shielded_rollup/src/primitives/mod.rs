//! The primitive interface every transition is built on: domain-separated
//! hashing into $\mathbb{F}_p$, bit-width range checks and data tree
//! membership.

mod hash;
mod merkle;
mod range;

pub use hash::{Hasher, commit};
pub use merkle::{MerklePath, check_membership, node_hash};
pub use range::{fits_in_bits, range_check};

#[cfg(feature = "serde")]
pub(crate) mod fp_serde {
    use ff::PrimeField as _;
    use pasta_curves::Fp;
    use serde::{Deserialize as _, Deserializer, Serialize as _, Serializer};

    pub(crate) fn serialize<S: Serializer>(fp: &Fp, serializer: S) -> Result<S::Ok, S::Error> {
        fp.to_repr().serialize(serializer)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fp, D::Error> {
        let bytes = <[u8; 32]>::deserialize(deserializer)?;
        Option::from(Fp::from_repr(bytes))
            .ok_or_else(|| serde::de::Error::custom("invalid field element"))
    }
}
