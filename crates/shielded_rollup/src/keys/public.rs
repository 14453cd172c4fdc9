//! Public (verification) keys.

use ff::{Field as _, PrimeField as _};
use group::GroupEncoding as _;
use pasta_curves::{
    EpAffine, Fp,
    arithmetic::{Coordinates, CurveAffine as _},
};
use reddsa::orchard::SpendAuth;

use super::signature::Signature;

/// An affine Pallas point, as carried in witnesses and committed in notes.
///
/// The identity is represented as `(0, 0)`. Coordinates that do not lie on
/// the curve are representable (witnesses are untrusted) but never verify
/// a signature.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PublicKey {
    /// Affine x-coordinate.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub x: Fp,
    /// Affine y-coordinate.
    #[cfg_attr(feature = "serde", serde(with = "crate::primitives::fp_serde"))]
    pub y: Fp,
}

impl PublicKey {
    /// The point at infinity.
    pub const IDENTITY: Self = Self {
        x: Fp::ZERO,
        y: Fp::ZERO,
    };

    /// Whether this is the `(0, 0)` identity encoding.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// `verify_signature(pubkey, signature, message)`.
    ///
    /// Fails if the coordinates are not a non-identity curve point or the
    /// signature does not verify over the 32-byte encoding of `message`.
    pub fn verify(&self, message: Fp, sig: &Signature) -> Result<(), reddsa::Error> {
        let point: Option<EpAffine> = Option::from(EpAffine::from_xy(self.x, self.y));
        let vk = point
            .filter(|_| !self.is_identity())
            .ok_or(reddsa::Error::MalformedVerificationKey)
            .and_then(|point| reddsa::VerificationKey::<SpendAuth>::try_from(point.to_bytes()))?;
        vk.verify(&message.to_repr(), &sig.0)
    }
}

impl From<reddsa::VerificationKey<SpendAuth>> for PublicKey {
    fn from(vk: reddsa::VerificationKey<SpendAuth>) -> Self {
        let bytes: [u8; 32] = vk.into();
        let point: Option<EpAffine> = Option::from(EpAffine::from_bytes(&bytes));
        point
            .and_then(|point| Option::<Coordinates<EpAffine>>::from(point.coordinates()))
            .map_or(Self::IDENTITY, |coords| Self {
                x: *coords.x(),
                y: *coords.y(),
            })
    }
}
