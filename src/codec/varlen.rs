//! Length-prefixed field helpers
//!
//! Two prefix styles appear on the wire:
//! - single byte length, then the value (addresses, headers, signatures, keys)
//! - "length of length" byte in `[0, 4]`, then that many big-endian length
//!   bytes, then the payload
//!
//! Integers are written trimmed: minimal big-endian bytes, at least one.
//! Every reader checks the declared size against a ceiling before
//! consuming the payload.

use super::error::CodecError;
use super::stream::{ByteSink, ReadStream};

/// Maximum number of bytes a length field may occupy
pub const MAX_LENGTH_OF_LENGTH: u8 = 4;

// =============================================================================
// Trimmed integers
// =============================================================================

/// Minimal big-endian bytes of `value`, never empty
///
/// Negative values are taken as their 64-bit two's complement, so `-1`
/// becomes eight `0xFF` bytes.
pub fn trimmed_bytes(value: i64) -> Vec<u8> {
    let bytes = (value as u64).to_be_bytes();
    let skip = bytes
        .iter()
        .take(bytes.len() - 1)
        .take_while(|b| **b == 0)
        .count();
    bytes[skip..].to_vec()
}

fn pad_be<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out[N - bytes.len()..].copy_from_slice(bytes);
    out
}

fn check_length(length: i64, min: usize, max: usize) -> Result<usize, CodecError> {
    if length < min as i64 || length > max as i64 {
        return Err(CodecError::LengthOutOfRange { length, min, max });
    }
    Ok(length as usize)
}

// =============================================================================
// Writers
// =============================================================================

/// `[len: u8][bytes]`
pub fn write_single_byte_len_value<S: ByteSink>(out: &mut S, bytes: &[u8]) -> Result<(), CodecError> {
    let len = check_length(bytes.len() as i64, 0, u8::MAX as usize)?;
    out.write_u8(len as u8)?;
    out.write(bytes)
}

/// `[len: u8][trimmed value]`
pub fn write_single_be_value<S: ByteSink>(out: &mut S, value: i64) -> Result<(), CodecError> {
    write_single_byte_len_value(out, &trimmed_bytes(value))
}

/// `[0x04][value: i32 BE]`, the untrimmed form used by merkle paths
pub fn write_single_fixed_be_value<S: ByteSink>(out: &mut S, value: i32) -> Result<(), CodecError> {
    write_single_byte_len_value(out, &value.to_be_bytes())
}

/// `[len(len): u8][len: trimmed BE][bytes]`
pub fn write_var_len_value<S: ByteSink>(out: &mut S, bytes: &[u8]) -> Result<(), CodecError> {
    write_single_be_value(out, bytes.len() as i64)?;
    out.write(bytes)
}

// =============================================================================
// Readers
// =============================================================================

/// Read a value prefixed by a single length byte in `[min, max]`
pub fn read_single_byte_len_value<'a>(
    stream: &mut ReadStream<'a>,
    min: usize,
    max: usize,
) -> Result<&'a [u8], CodecError> {
    let len = check_length(stream.read_u8()? as i64, min, max)?;
    stream.read(len)
}

/// Read a "length of length" prefixed size, as a signed 32-bit number
fn read_var_len_size(stream: &mut ReadStream<'_>) -> Result<i64, CodecError> {
    let length_length = stream.read_u8()?;
    if length_length > MAX_LENGTH_OF_LENGTH {
        return Err(CodecError::InvalidLengthPrefix(length_length));
    }
    let bytes = stream.read(length_length as usize)?;
    Ok(i32::from_be_bytes(pad_be::<4>(bytes)) as i64)
}

/// Read a variable-length payload whose size must lie in `[min, max]`
pub fn read_var_len_value<'a>(
    stream: &mut ReadStream<'a>,
    min: usize,
    max: usize,
) -> Result<&'a [u8], CodecError> {
    let len = check_length(read_var_len_size(stream)?, min, max)?;
    stream.read(len)
}

/// Read a single-length-prefixed big-endian `i32` (up to 4 bytes)
pub fn read_single_i32_be_value(stream: &mut ReadStream<'_>) -> Result<i32, CodecError> {
    let bytes = read_single_byte_len_value(stream, 0, 4)?;
    Ok(i32::from_be_bytes(pad_be::<4>(bytes)))
}

/// Read a single-length-prefixed big-endian `i64` (up to 8 bytes)
pub fn read_single_i64_be_value(stream: &mut ReadStream<'_>) -> Result<i64, CodecError> {
    let bytes = read_single_byte_len_value(stream, 0, 8)?;
    Ok(i64::from_be_bytes(pad_be::<8>(bytes)))
}

/// Read a counted array: var-len count in `[0, max]`, then `count` items
pub fn read_array_of<'a, T, F>(
    stream: &mut ReadStream<'a>,
    max: usize,
    mut read_item: F,
) -> Result<Vec<T>, CodecError>
where
    F: FnMut(&mut ReadStream<'a>) -> Result<T, CodecError>,
{
    let count = read_var_len_size(stream)?;
    if count < 0 || count > max as i64 {
        return Err(CodecError::ArraySizeExceeded { count, max });
    }

    // the count is untrusted, never reserve more than the input could hold
    let mut items = Vec::with_capacity((count as usize).min(stream.remaining()));
    for _ in 0..count {
        items.push(read_item(stream)?);
    }
    Ok(items)
}

/// Read the optional network byte that may precede a transaction type
///
/// Returns `None` when the first byte already is `tx_type`.
pub fn read_network_byte(stream: &mut ReadStream<'_>, tx_type: u8) -> Result<Option<u8>, CodecError> {
    let first = stream.read_u8()?;
    if first == tx_type {
        return Ok(None);
    }

    let found = stream.read_u8()?;
    if found != tx_type {
        return Err(CodecError::UnexpectedTxType {
            expected: tx_type,
            found,
        });
    }
    Ok(Some(first))
}
