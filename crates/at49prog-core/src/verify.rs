//! Checksum verification
//!
//! Equality of the two digests is the whole verdict; there is no partial
//! match.

use crate::checksum::Digest;

/// Outcome of comparing a device checksum against a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Device and reference agree
    Match(Digest),
    /// Device and reference differ
    Mismatch {
        /// Checksum computed from the device
        device: Digest,
        /// Checksum it was compared against
        reference: Digest,
    },
    /// No reference was given; the device checksum is reported as is
    Unchecked(Digest),
}

impl Verdict {
    /// Whether the verdict counts as a failed verification
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Mismatch { .. })
    }

    /// The checksum computed from the device
    pub fn device(&self) -> &Digest {
        match self {
            Self::Match(d) | Self::Unchecked(d) => d,
            Self::Mismatch { device, .. } => device,
        }
    }
}

/// Compare a device checksum against an optional reference
pub fn compare(device: &Digest, reference: Option<&Digest>) -> Verdict {
    match reference {
        None => Verdict::Unchecked(*device),
        Some(reference) if reference == device => Verdict::Match(*device),
        Some(reference) => Verdict::Mismatch {
            device: *device,
            reference: *reference,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match() {
        let a = Digest::of(&[1, 2, 3]);
        let b = Digest::of(&[1, 2, 3]);
        let verdict = compare(&a, Some(&b));
        assert_eq!(verdict, Verdict::Match(a));
        assert!(!verdict.is_failure());
    }

    #[test]
    fn test_mismatch() {
        let a = Digest::of(&[1, 2, 3]);
        let b = Digest::of(&[1, 2, 4]);
        let verdict = compare(&a, Some(&b));
        assert!(verdict.is_failure());
        assert_eq!(verdict.device(), &a);
    }

    #[test]
    fn test_no_reference() {
        let a = Digest::of(&[0xFF; 16]);
        let verdict = compare(&a, None);
        assert_eq!(verdict, Verdict::Unchecked(a));
        assert!(!verdict.is_failure());
    }
}
