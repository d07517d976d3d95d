// Coinbase transaction

use std::io::{Cursor, Read};

use super::serialize::{read_array, read_compact_len, read_short_bytes, write_compact_len, write_short_bytes};
use crate::core::{Hash256, hash256};
use crate::error::{GenesisError, Result};

/// Index of the null previous output
pub const NULL_PREV_INDEX: u32 = 0xffffffff;

/// Conventional final sequence number
pub const SEQUENCE_FINAL: u32 = 0xffffffff;

/// The single input of a coinbase - spends the null outpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinbaseInput {
    /// Signature script (scriptSig), carries the genesis message
    pub script_sig: Vec<u8>,
    /// Sequence number (usually 0xffffffff)
    pub sequence: u32,
}

impl CoinbaseInput {
    pub fn new(script_sig: Vec<u8>) -> Self {
        Self {
            script_sig,
            sequence: SEQUENCE_FINAL,
        }
    }
}

/// Transaction output - specifies amount and recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    /// Amount in satoshis (1 coin = 100,000,000 satoshis)
    pub value: u64,
    /// Public key script (scriptPubKey) - specifies conditions for spending
    pub script_pubkey: Vec<u8>,
}

impl TxOutput {
    /// Create a new transaction output
    pub fn new(value: u64, script_pubkey: Vec<u8>) -> Self {
        Self {
            value,
            script_pubkey,
        }
    }
}

/// One-input, one-output reward transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinbaseTransaction {
    /// Transaction version
    pub version: i32,
    pub input: CoinbaseInput,
    pub output: TxOutput,
    /// Lock time (conventionally zero)
    pub lock_time: u32,
}

impl CoinbaseTransaction {
    /// Create a version 1 coinbase with zero lock time
    pub fn new(script_sig: Vec<u8>, output: TxOutput) -> Self {
        Self {
            version: 1,
            input: CoinbaseInput::new(script_sig),
            output,
            lock_time: 0,
        }
    }

    /// Canonical wire bytes.
    ///
    /// Counts and script lengths are single CompactSize bytes, so either
    /// script reaching 253 bytes is an error.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(
            4 + 1 + 32 + 4 + 1 + self.input.script_sig.len() + 4 + 1 + 8 + 1 + self.output.script_pubkey.len() + 4,
        );

        buf.extend_from_slice(&self.version.to_le_bytes());

        write_compact_len(&mut buf, 1, "input count")?;
        buf.extend_from_slice(Hash256::zero().as_bytes());
        buf.extend_from_slice(&NULL_PREV_INDEX.to_le_bytes());
        write_short_bytes(&mut buf, &self.input.script_sig, "scriptSig")?;
        buf.extend_from_slice(&self.input.sequence.to_le_bytes());

        write_compact_len(&mut buf, 1, "output count")?;
        buf.extend_from_slice(&self.output.value.to_le_bytes());
        write_short_bytes(&mut buf, &self.output.script_pubkey, "scriptPubKey")?;

        buf.extend_from_slice(&self.lock_time.to_le_bytes());

        Ok(buf)
    }

    /// Calculate transaction ID (double SHA256 of serialized tx)
    pub fn txid(&self) -> Result<Hash256> {
        Ok(hash256(&self.serialize()?))
    }

    /// Parse a coinbase from its wire bytes, rejecting trailing data
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let tx = Self::from_reader(&mut cursor)?;
        if cursor.position() as usize != data.len() {
            return Err(GenesisError::Decode(format!(
                "{} trailing bytes after coinbase",
                data.len() - cursor.position() as usize
            )));
        }
        Ok(tx)
    }

    /// Deserialize from a reader
    pub fn from_reader(reader: &mut dyn Read) -> Result<Self> {
        let version = i32::from_le_bytes(read_array(reader)?);

        expect_single(read_compact_len(reader, "input count")?, "input")?;

        let prev_hash: [u8; 32] = read_array(reader)?;
        let prev_index = u32::from_le_bytes(read_array(reader)?);
        if prev_hash != [0u8; 32] || prev_index != NULL_PREV_INDEX {
            return Err(GenesisError::Decode("input does not spend the null outpoint".to_string()));
        }

        let script_sig = read_short_bytes(reader, "scriptSig")?;
        let sequence = u32::from_le_bytes(read_array(reader)?);

        expect_single(read_compact_len(reader, "output count")?, "output")?;

        let value = u64::from_le_bytes(read_array(reader)?);
        let script_pubkey = read_short_bytes(reader, "scriptPubKey")?;

        let lock_time = u32::from_le_bytes(read_array(reader)?);

        Ok(Self {
            version,
            input: CoinbaseInput { script_sig, sequence },
            output: TxOutput::new(value, script_pubkey),
            lock_time,
        })
    }
}

fn expect_single(count: usize, what: &str) -> Result<()> {
    if count != 1 {
        return Err(GenesisError::Decode(format!("coinbase must have exactly one {}, got {}", what, count)));
    }
    Ok(())
}
