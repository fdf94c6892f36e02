//! Liquidity-provider identity.

use core::fmt;

/// The 20-byte account that owns a position.
///
/// All byte sequences are valid owners, so construction is infallible.
/// Displays as lowercase `0x`-prefixed hex.
///
/// # Examples
///
/// ```
/// use clmm_backtest::domain::Owner;
///
/// let owner = Owner::new([0xab; 20]);
/// assert_eq!(owner.as_bytes(), [0xab; 20]);
/// assert!(owner.to_string().starts_with("0xabab"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Owner([u8; 20]);

impl Owner {
    /// Creates an `Owner` from raw address bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying address bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 20] {
        self.0
    }
}

impl From<[u8; 20]> for Owner {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_hex() {
        let mut bytes = [0u8; 20];
        bytes[19] = 0x0f;
        assert_eq!(
            Owner::new(bytes).to_string(),
            "0x000000000000000000000000000000000000000f"
        );
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(Owner::new([0u8; 20]) < Owner::new([1u8; 20]));
    }
}
