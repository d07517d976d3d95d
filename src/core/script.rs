// Minimal script encoding for coinbase inputs and outputs

use crate::error::{GenesisError, Result};

/// Number pushed first by the historical genesis scriptSig (0x1d00ffff)
pub const GENESIS_SCRIPT_BITS: u32 = 486_604_799;

/// Small marker pushed after the bits constant
pub const GENESIS_EXTRA_NONCE: i64 = 4;

/// Opcodes used by the coinbase scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Next byte is the push length
    OpPushData1 = 0x4c,
    /// Next two bytes (LE) are the push length
    OpPushData2 = 0x4d,
    /// Next four bytes (LE) are the push length
    OpPushData4 = 0x4e,
    /// Push the number 1, i.e. "anyone can spend"
    OpTrue = 0x51,
    /// Check signature
    OpCheckSig = 0xac,
}

impl OpCode {
    /// Convert byte to opcode
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x4c => Some(OpCode::OpPushData1),
            0x4d => Some(OpCode::OpPushData2),
            0x4e => Some(OpCode::OpPushData4),
            0x51 => Some(OpCode::OpTrue),
            0xac => Some(OpCode::OpCheckSig),
            _ => None,
        }
    }
}

/// Largest payload pushed with a bare length byte
const MAX_DIRECT_PUSH: usize = 0x4b;

/// Output script selection for the coinbase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputScript {
    /// `OP_TRUE`
    ConstantTrue,
    /// `<pubkey> OP_CHECKSIG`
    PayToPubkey(Vec<u8>),
    /// Caller-supplied scriptPubKey bytes, used verbatim
    Raw(Vec<u8>),
}

impl OutputScript {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            OutputScript::ConstantTrue => Script::pay_to_constant(),
            OutputScript::PayToPubkey(pubkey) => Script::pay_to_pubkey(pubkey),
            OutputScript::Raw(bytes) => bytes.clone(),
        }
    }
}

/// Script builder
pub struct Script;

impl Script {
    /// Minimal push of `payload`.
    ///
    /// 0..=75 bytes get a bare length byte, then OP_PUSHDATA1/2/4 with a
    /// little-endian length as the payload grows.
    pub fn push(payload: &[u8]) -> Vec<u8> {
        let len = payload.len();
        let mut script = Vec::with_capacity(len + 5);

        if len <= MAX_DIRECT_PUSH {
            script.push(len as u8);
        } else if len <= 0xff {
            script.push(OpCode::OpPushData1 as u8);
            script.push(len as u8);
        } else if len <= 0xffff {
            script.push(OpCode::OpPushData2 as u8);
            script.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            script.push(OpCode::OpPushData4 as u8);
            script.extend_from_slice(&(len as u32).to_le_bytes());
        }

        script.extend_from_slice(payload);
        script
    }

    /// Shortest little-endian encoding of a non-negative script number.
    ///
    /// Zero is the empty vector. A trailing 0x00 is added when the top byte
    /// has its high bit set, otherwise the value would read as negative.
    pub fn minimal_number(n: i64) -> Result<Vec<u8>> {
        if n < 0 {
            return Err(GenesisError::UnsupportedNegative(n));
        }

        let mut out = Vec::new();
        let mut value = n as u64;
        while value > 0 {
            out.push((value & 0xff) as u8);
            value >>= 8;
        }

        if out.last().is_some_and(|&top| top & 0x80 != 0) {
            out.push(0x00);
        }

        Ok(out)
    }

    /// Genesis coinbase scriptSig:
    /// `push(num(bits)) push(num(extra_nonce)) push(message)`
    pub fn coinbase_script_sig(bits_as_number: i64, extra_nonce: i64, message: &[u8]) -> Result<Vec<u8>> {
        let mut script = Self::push(&Self::minimal_number(bits_as_number)?);
        script.extend(Self::push(&Self::minimal_number(extra_nonce)?));
        script.extend(Self::push(message));
        Ok(script)
    }

    /// `OP_TRUE`
    pub fn pay_to_constant() -> Vec<u8> {
        vec![OpCode::OpTrue as u8]
    }

    /// `<pubkey> OP_CHECKSIG`
    pub fn pay_to_pubkey(pubkey: &[u8]) -> Vec<u8> {
        let mut script = Self::push(pubkey);
        script.push(OpCode::OpCheckSig as u8);
        script
    }
}
