// Block header and genesis block

use std::io::Cursor;

use super::serialize::read_array;
use crate::core::{CoinbaseTransaction, Hash256, hash256};
use crate::error::{GenesisError, Result};

/// Serialized header size
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Byte offset of the nonce inside the serialized header
pub const NONCE_OFFSET: usize = 76;

/// Block header - 80 bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Block version
    pub version: i32,
    /// Hash of the previous block
    pub prev_block_hash: Hash256,
    /// Merkle root of all transactions in the block
    pub merkle_root: Hash256,
    /// Block timestamp (Unix epoch)
    pub time: u32,
    /// Difficulty target (compact format)
    pub bits: u32,
    /// Nonce for proof-of-work
    pub nonce: u32,
}

impl BlockHeader {
    /// Create a new block header
    pub fn new(
        version: i32,
        prev_block_hash: Hash256,
        merkle_root: Hash256,
        time: u32,
        bits: u32,
        nonce: u32,
    ) -> Self {
        Self {
            version,
            prev_block_hash,
            merkle_root,
            time,
            bits,
            nonce,
        }
    }

    /// Genesis header template: zero previous hash, nonce 0
    pub fn genesis_template(version: i32, merkle_root: Hash256, time: u32, bits: u32) -> Self {
        Self::new(version, Hash256::zero(), merkle_root, time, bits, 0)
    }

    /// Copy of this header with a different nonce
    pub fn with_nonce(&self, nonce: u32) -> Self {
        Self { nonce, ..self.clone() }
    }

    /// Calculate the hash of this block header
    pub fn hash(&self) -> Hash256 {
        hash256(&self.serialize_to_array())
    }

    /// Serialize the block header (always 80 bytes)
    pub fn serialize_to_array(&self) -> [u8; BLOCK_HEADER_SIZE] {
        let mut buf = [0u8; BLOCK_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.version.to_le_bytes());
        buf[4..36].copy_from_slice(self.prev_block_hash.as_bytes());
        buf[36..68].copy_from_slice(self.merkle_root.as_bytes());
        buf[68..72].copy_from_slice(&self.time.to_le_bytes());
        buf[72..76].copy_from_slice(&self.bits.to_le_bytes());
        buf[NONCE_OFFSET..].copy_from_slice(&self.nonce.to_le_bytes());
        buf
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.serialize_to_array().to_vec()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.serialize_to_array())
    }

    /// Deserialize a block header; input must be exactly 80 bytes
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        if data.len() != BLOCK_HEADER_SIZE {
            return Err(GenesisError::Decode(format!(
                "block header must be {} bytes, got {}",
                BLOCK_HEADER_SIZE,
                data.len()
            )));
        }

        let mut cursor = Cursor::new(data);
        Ok(Self {
            version: i32::from_le_bytes(read_array(&mut cursor)?),
            prev_block_hash: Hash256::new(read_array(&mut cursor)?),
            merkle_root: Hash256::new(read_array(&mut cursor)?),
            time: u32::from_le_bytes(read_array(&mut cursor)?),
            bits: u32::from_le_bytes(read_array(&mut cursor)?),
            nonce: u32::from_le_bytes(read_array(&mut cursor)?),
        })
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| GenesisError::Decode(format!("invalid header hex: {}", e)))?;
        Self::deserialize(&bytes)
    }
}

/// Genesis block - header plus its single coinbase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisBlock {
    pub header: BlockHeader,
    pub coinbase: CoinbaseTransaction,
}

impl GenesisBlock {
    /// Pair a coinbase with a header template whose merkle root is the coinbase txid
    pub fn new(coinbase: CoinbaseTransaction, version: i32, time: u32, bits: u32) -> Result<Self> {
        let merkle_root = Self::merkle_root(&coinbase)?;
        Ok(Self {
            header: BlockHeader::genesis_template(version, merkle_root, time, bits),
            coinbase,
        })
    }

    /// Merkle root of a single-transaction block: the transaction's own id
    pub fn merkle_root(coinbase: &CoinbaseTransaction) -> Result<Hash256> {
        coinbase.txid()
    }

    /// Get the block hash
    pub fn hash(&self) -> Hash256 {
        self.header.hash()
    }

    /// Check if this is the genesis block
    pub fn is_genesis(&self) -> bool {
        self.header.prev_block_hash == Hash256::zero()
    }

    /// Full block bytes: header, transaction count, coinbase
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut buf = self.header.serialize();
        buf.push(1);
        buf.extend(self.coinbase.serialize()?);
        Ok(buf)
    }
}
