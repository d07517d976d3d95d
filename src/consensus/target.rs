// Compact difficulty ("bits") <-> 256-bit target

use primitive_types::U256;

use crate::core::Hash256;
use crate::error::{GenesisError, Result};

/// Sign bit of the 24-bit coefficient
const COMPACT_SIGN_BIT: u32 = 0x0080_0000;

/// Difficulty target representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    value: U256,
}

impl Target {
    /// Easiest possible target, every hash satisfies it
    pub const MAX: Target = Target { value: U256::MAX };

    pub fn new(value: U256) -> Self {
        Self { value }
    }

    /// Decode compact bits.
    /// Formula: target = coefficient * 256^(exponent - 3)
    ///
    /// Exponents below 3 shift the coefficient right instead. A set sign bit
    /// or a value wider than 256 bits is rejected.
    pub fn from_bits(bits: u32) -> Result<Self> {
        let exponent = bits >> 24;
        let coefficient = bits & 0x007f_ffff;

        if coefficient == 0 {
            return Ok(Self::new(U256::zero()));
        }

        if bits & COMPACT_SIGN_BIT != 0 {
            return Err(GenesisError::InvalidDifficulty { bits, reason: "negative target" });
        }

        if exponent > 34
            || (coefficient > 0xff && exponent > 33)
            || (coefficient > 0xffff && exponent > 32)
        {
            return Err(GenesisError::InvalidDifficulty { bits, reason: "target exceeds 256 bits" });
        }

        let value = if exponent <= 3 {
            U256::from(coefficient >> (8 * (3 - exponent)))
        } else {
            U256::from(coefficient) << (8 * (exponent - 3)) as usize
        };

        Ok(Self::new(value))
    }

    /// Normalised compact encoding (minimal exponent, clear sign bit)
    pub fn to_bits(&self) -> u32 {
        let mut size = self.value.bits().div_ceil(8) as u32;
        let mut compact = if size <= 3 {
            (self.value.low_u64() << (8 * (3 - size))) as u32
        } else {
            (self.value >> (8 * (size - 3)) as usize).low_u32()
        };

        if compact & COMPACT_SIGN_BIT != 0 {
            compact >>= 8;
            size += 1;
        }

        compact | (size << 24)
    }

    pub fn as_u256(&self) -> U256 {
        self.value
    }

    /// Proof-of-work condition: hash (as LE integer) <= target
    #[inline]
    pub fn is_met_by(&self, hash: &Hash256) -> bool {
        hash.to_u256() <= self.value
    }

    /// Target as 64 big-endian hex digits
    pub fn to_hex(&self) -> String {
        let mut bytes = [0u8; 32];
        self.value.to_big_endian(&mut bytes);
        hex::encode(bytes)
    }

    /// Count leading zero bits in target (difficulty indicator)
    pub fn leading_zeros(&self) -> u32 {
        self.value.leading_zeros()
    }
}

/// Round-trip bits through the target to their normalised form
pub fn normalize_bits(bits: u32) -> Result<u32> {
    Ok(Target::from_bits(bits)?.to_bits())
}
