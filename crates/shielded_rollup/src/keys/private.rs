//! Private (signing) keys.

use ff::PrimeField as _;
use pasta_curves::{Fp, Fq};
use rand::{CryptoRng, RngCore};
use reddsa::orchard::SpendAuth;

use super::{public::PublicKey, signature::Signature};

/// An account or signing private key: a Pallas scalar wrapped as a
/// RedPallas SpendAuth signing key.
#[derive(Clone, Copy, Debug)]
pub struct PrivateKey(reddsa::SigningKey<SpendAuth>);

impl PrivateKey {
    /// Sample a fresh key.
    pub fn random(rng: &mut (impl RngCore + CryptoRng)) -> Self {
        Self(reddsa::SigningKey::new(rng))
    }

    /// Derive the public key: `[sk]G`.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        // reddsa::VerificationKey::from(&signing_key) performs [sk]G
        // (scalar-times-basepoint), not a trivial type conversion.
        PublicKey::from(reddsa::VerificationKey::from(&self.0))
    }

    /// Sign the 32-byte encoding of `message`.
    pub fn sign(&self, rng: &mut (impl RngCore + CryptoRng), message: Fp) -> Signature {
        Signature(self.0.sign(rng, &message.to_repr()))
    }

    /// Canonical encoding of the scalar, used as nullifier key material.
    pub(crate) fn to_bytes(self) -> [u8; 32] {
        self.0.into()
    }
}

impl TryFrom<Fq> for PrivateKey {
    type Error = reddsa::Error;

    fn try_from(scalar: Fq) -> Result<Self, Self::Error> {
        reddsa::SigningKey::<SpendAuth>::try_from(scalar.to_repr()).map(Self)
    }
}

/// `scalar_mul_fixed_base(scalar)`: the public key of `scalar`.
#[must_use]
pub fn scalar_mul_fixed_base(scalar: &Fq) -> PublicKey {
    #[expect(clippy::expect_used, reason = "to_repr is always canonical")]
    let sk = PrivateKey::try_from(*scalar).expect("canonical scalar encoding");
    sk.public_key()
}
