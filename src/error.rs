use std::{
    array::TryFromSliceError,
    error::Error,
    fmt::{Display, Formatter, Result},
    sync::PoisonError,
};
use rabe_bn::FieldError;
#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};
#[cfg(feature = "borsh")]
use borsh::{BorshSerialize, BorshDeserialize};

/// Every failure the MPECK scheme, its slot index and the delegation roles can report.
///
/// A non-matching search is not an error: `Mpeck::test` simply returns `false`.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MpeckError {
    /// The secret key is zero and has no inverse modulo the group order.
    InvalidKey,
    /// The keyword was never registered in the keyword index.
    UnknownKeyword(String),
    /// The keyword (or a digest of it) has no canonical fixed-width encoding.
    Encoding(String),
    /// The sealed payload failed authentication or is malformed.
    Authentication,
    /// The slot sequence handed to encode is not as long as the keyword index.
    MismatchedSlotCount {
        expected: usize,
        actual: usize,
    },
    /// Two keywords compete for the same slot.
    SlotConflict(String),
    /// A document must be readable by at least one key.
    NoRecipients,
    /// A trapdoor needs at least one keyword.
    EmptyQuery,
    /// The consultant has no client registered under this name.
    UnknownClient(String),
    /// The role cannot perform this operation.
    Capability(String),
    /// A lock guarding shared state was poisoned by a panicking writer.
    Lock,
}

impl Display for MpeckError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            MpeckError::InvalidKey => write!(f, "Error: secret key is not invertible"),
            MpeckError::UnknownKeyword(kw) => write!(f, "Error: unknown keyword {}", kw),
            MpeckError::Encoding(details) => write!(f, "Error: encoding failed: {}", details),
            MpeckError::Authentication => write!(f, "Error: payload authentication failed"),
            MpeckError::MismatchedSlotCount { expected, actual } => write!(
                f,
                "Error: expected {} keyword slots but got {}",
                expected, actual
            ),
            MpeckError::SlotConflict(details) => write!(f, "Error: slot conflict: {}", details),
            MpeckError::NoRecipients => write!(f, "Error: no authorized keys given"),
            MpeckError::EmptyQuery => write!(f, "Error: trapdoor query is empty"),
            MpeckError::UnknownClient(name) => write!(f, "Error: unknown client {}", name),
            MpeckError::Capability(details) => write!(f, "Error: not permitted: {}", details),
            MpeckError::Lock => write!(f, "Error: lock poisoned"),
        }
    }
}

impl Error for MpeckError {}

impl From<FieldError> for MpeckError {
    fn from(error: FieldError) -> Self {
        match error {
            FieldError::InvalidSliceLength => MpeckError::Encoding("FieldError::InvalidSliceLength".to_string()),
            FieldError::InvalidU512Encoding => MpeckError::Encoding("FieldError::InvalidU512Encoding".to_string()),
            FieldError::NotMember => MpeckError::Encoding("FieldError::NotMember".to_string()),
        }
    }
}

impl From<aes_gcm::Error> for MpeckError {
    fn from(_error: aes_gcm::Error) -> Self {
        // Aead's error is intentionally opaque, there is no more information in here
        MpeckError::Authentication
    }
}

impl From<TryFromSliceError> for MpeckError {
    fn from(error: TryFromSliceError) -> Self {
        MpeckError::Encoding(error.to_string())
    }
}

impl<T> From<PoisonError<T>> for MpeckError {
    fn from(_error: PoisonError<T>) -> Self {
        MpeckError::Lock
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn display() {
        let e = MpeckError::MismatchedSlotCount { expected: 3, actual: 2 };
        assert_eq!(e.to_string(), "Error: expected 3 keyword slots but got 2");
        assert_eq!(
            MpeckError::UnknownKeyword(String::from("2024")).to_string(),
            "Error: unknown keyword 2024"
        );
    }

    #[test]
    fn field_error() {
        let e: MpeckError = FieldError::NotMember.into();
        assert_eq!(e, MpeckError::Encoding(String::from("FieldError::NotMember")));
    }

    #[test]
    fn slice_error() {
        let short: &[u8] = &[0u8; 31];
        let result: std::result::Result<[u8; 32], MpeckError> = short.try_into().map_err(|e: TryFromSliceError| e.into());
        assert!(matches!(result, Err(MpeckError::Encoding(_))));
    }
}
