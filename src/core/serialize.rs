// Serialization helpers for the one-input/one-output coinbase layout

use std::io::{self, Read, Write};

use crate::error::{GenesisError, Result};

/// First byte value that would switch a CompactSize to a multi-byte form
pub const COMPACT_SIZE_MULTIBYTE_MARKER: usize = 0xfd;

/// Write a length or count as a single CompactSize byte.
///
/// Only lengths below 0xfd are representable; anything longer would need the
/// 0xfd/0xfe/0xff forms and is rejected rather than truncated.
pub fn write_compact_len<W: Write>(writer: &mut W, len: usize, field: &'static str) -> Result<()> {
    if len >= COMPACT_SIZE_MULTIBYTE_MARKER {
        return Err(GenesisError::ScriptTooLongForCompactEncoding { field, len });
    }
    writer.write_all(&[len as u8]).map_err(io_error)
}

/// Write bytes with a single-byte length prefix
pub fn write_short_bytes<W: Write>(writer: &mut W, data: &[u8], field: &'static str) -> Result<()> {
    write_compact_len(writer, data.len(), field)?;
    writer.write_all(data).map_err(io_error)
}

/// Read a single-byte CompactSize
pub fn read_compact_len<R: Read + ?Sized>(reader: &mut R, field: &'static str) -> Result<usize> {
    let [len] = read_array::<1, R>(reader)?;
    if len as usize >= COMPACT_SIZE_MULTIBYTE_MARKER {
        return Err(GenesisError::ScriptTooLongForCompactEncoding { field, len: len as usize });
    }
    Ok(len as usize)
}

/// Read bytes with a single-byte length prefix
pub fn read_short_bytes<R: Read + ?Sized>(reader: &mut R, field: &'static str) -> Result<Vec<u8>> {
    let len = read_compact_len(reader, field)?;
    let mut data = vec![0u8; len];
    reader.read_exact(&mut data).map_err(io_error)?;
    Ok(data)
}

/// Read a fixed number of bytes
pub fn read_array<const N: usize, R: Read + ?Sized>(reader: &mut R) -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    reader.read_exact(&mut bytes).map_err(io_error)?;
    Ok(bytes)
}

fn io_error(e: io::Error) -> GenesisError {
    GenesisError::Decode(e.to_string())
}
