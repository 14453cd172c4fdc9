//! Transaction authorization signatures.

use reddsa::orchard::SpendAuth;

/// A RedPallas signature authorizing a transition.
///
/// An account transition is signed over the keys it registers and the
/// nullifiers it publishes; a join-split over its public values, output
/// commitments, input nullifiers and chaining fields. Either way the
/// message is a single field element, and the wire form is 64 bytes.
#[derive(Clone, Copy, Debug)]
pub struct Signature(pub(crate) reddsa::Signature<SpendAuth>);

impl From<[u8; 64]> for Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(reddsa::Signature::from(bytes))
    }
}

impl From<Signature> for [u8; 64] {
    fn from(sig: Signature) -> Self {
        sig.0.into()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Signature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_big_array::BigArray::serialize(&<[u8; 64]>::from(*self), serializer)
    }
}

#[cfg(feature = "serde")]
#[expect(clippy::missing_trait_methods, reason = "serde default is sufficient")]
impl<'de> serde::Deserialize<'de> for Signature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <[u8; 64] as serde_big_array::BigArray<'de, u8>>::deserialize(deserializer).map(Self::from)
    }
}
