use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;

/// 128 random bits used to fill unique-ID fields in generated sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier([u8; 16]);

impl Identifier {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// The four big-endian 32-bit words of the identifier.
    pub fn words(&self) -> [u32; 4] {
        let mut words = [0u32; 4];
        for (i, chunk) in self.0.chunks_exact(4).enumerate() {
            words[i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        words
    }

    /// Rendering for native source: `0xAAAAAAAA, 0xBBBBBBBB, 0xCCCCCCCC, 0xDDDDDDDD`.
    pub fn to_native_literal(&self) -> String {
        self.words()
            .iter()
            .map(|w| format!("0x{w:08X}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Unbroken uppercase hex, 32 characters.
    pub fn to_compact(&self) -> String {
        self.0.iter().map(|b| format!("{b:02X}")).collect()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_compact())
    }
}

/// Source of fresh identifiers, injected into the resolver.
pub trait IdentifierGenerator: Send + Sync {
    fn generate(&self) -> Identifier;
}

/// Draws every identifier from the operating system's CSPRNG.
///
/// Panics if the OS randomness source is unavailable; there is no sensible
/// way to continue generating unique IDs without it.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandomGenerator;

impl IdentifierGenerator for OsRandomGenerator {
    fn generate(&self) -> Identifier {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        Identifier(bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn sample() -> Identifier {
        Identifier::from_bytes([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0xfe, 0xdc, 0xba, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ])
    }

    #[test]
    fn native_literal_groups_four_words() {
        assert_eq!(
            sample().to_native_literal(),
            "0x01234567, 0x89ABCDEF, 0xFEDCBA98, 0x76543210"
        );
    }

    #[test]
    fn compact_is_uppercase_hex() {
        assert_eq!(sample().to_compact(), "0123456789ABCDEFFEDCBA9876543210");
        assert_eq!(sample().to_string(), sample().to_compact());
    }

    #[test]
    fn both_renderings_carry_the_same_bits() {
        let id = sample();
        let from_literal: String = id
            .to_native_literal()
            .split(", ")
            .map(|w| w.trim_start_matches("0x").to_string())
            .collect();
        assert_eq!(from_literal, id.to_compact());
    }

    #[test]
    fn os_generator_does_not_repeat() {
        let generator = OsRandomGenerator;
        let ids: HashSet<Identifier> = (0..10_000).map(|_| generator.generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }
}
