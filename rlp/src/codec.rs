//! Canonical RLP encoding and strict decoding.
//!
//! Prefix rules:
//! - a single byte below `0x80` is its own encoding;
//! - a byte string of length < 56 is `0x80 + len` followed by the bytes;
//! - a longer byte string is `0xb7 + len_of_len`, the big-endian length, then the bytes;
//! - lists use the same scheme with base `0xc0` / `0xf7` over the concatenated items.
//!
//! Decoding accepts only the minimal form of each prefix and never reads past the input.

use crate::error::RlpError;
use crate::item::RlpItem;

const STRING_OFFSET: u8 = 0x80;
const LIST_OFFSET: u8 = 0xc0;
const SHORT_LIMIT: usize = 55;

/// Maximum list nesting accepted by the decoder.
pub const MAX_DEPTH: usize = 64;

/// Encode an item to bytes.
pub fn encode(item: &RlpItem) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(item, &mut out);
    out
}

fn encode_into(item: &RlpItem, out: &mut Vec<u8>) {
    match item {
        RlpItem::Bytes(bytes) if bytes.len() == 1 && bytes[0] < STRING_OFFSET => {
            out.push(bytes[0]);
        }
        RlpItem::Bytes(bytes) => {
            push_prefix(out, STRING_OFFSET, bytes.len());
            out.extend_from_slice(bytes);
        }
        RlpItem::List(items) => {
            let mut payload = Vec::new();
            for child in items {
                encode_into(child, &mut payload);
            }
            push_prefix(out, LIST_OFFSET, payload.len());
            out.extend_from_slice(&payload);
        }
    }
}

fn push_prefix(out: &mut Vec<u8>, offset: u8, len: usize) {
    if len <= SHORT_LIMIT {
        out.push(offset + len as u8);
    } else {
        let be = len.to_be_bytes();
        let start = be.iter().position(|b| *b != 0).unwrap_or(be.len() - 1);
        let len_bytes = &be[start..];
        out.push(offset + SHORT_LIMIT as u8 + len_bytes.len() as u8);
        out.extend_from_slice(len_bytes);
    }
}

/// Decode exactly one item spanning the whole of `input`.
pub fn decode(input: &[u8]) -> Result<RlpItem, RlpError> {
    let (item, consumed) = decode_prefix(input)?;
    if consumed != input.len() {
        return Err(RlpError::TrailingBytes(input.len() - consumed));
    }
    Ok(item)
}

/// Decode the first item in `input`, returning it and the bytes it occupied.
pub fn decode_prefix(input: &[u8]) -> Result<(RlpItem, usize), RlpError> {
    decode_at_depth(input, 0)
}

fn decode_at_depth(input: &[u8], depth: usize) -> Result<(RlpItem, usize), RlpError> {
    if depth > MAX_DEPTH {
        return Err(RlpError::TooDeep(MAX_DEPTH));
    }
    let first = *input.first().ok_or(RlpError::Truncated {
        needed: 1,
        available: 0,
    })?;

    match first {
        0x00..=0x7f => Ok((RlpItem::Bytes(vec![first]), 1)),
        0x80..=0xbf => {
            let (header, len) = read_header(input, STRING_OFFSET)?;
            let payload = slice(input, header, len)?;
            if len == 1 && payload[0] < STRING_OFFSET {
                return Err(RlpError::NonCanonicalSingleByte);
            }
            Ok((RlpItem::Bytes(payload.to_vec()), header + len))
        }
        0xc0..=0xff => {
            let (header, len) = read_header(input, LIST_OFFSET)?;
            let mut payload = slice(input, header, len)?;
            let mut items = Vec::new();
            while !payload.is_empty() {
                let (item, used) = decode_at_depth(payload, depth + 1)?;
                items.push(item);
                payload = &payload[used..];
            }
            Ok((RlpItem::List(items), header + len))
        }
    }
}

/// Returns `(header_len, payload_len)` for a string or list prefix.
fn read_header(input: &[u8], offset: u8) -> Result<(usize, usize), RlpError> {
    let marker = input[0] - offset;
    if marker as usize <= SHORT_LIMIT {
        return Ok((1, marker as usize));
    }
    let len_of_len = marker as usize - SHORT_LIMIT;
    let len_bytes = slice(input, 1, len_of_len)?;
    if len_bytes[0] == 0 {
        return Err(RlpError::NonCanonicalLength);
    }
    if len_of_len > std::mem::size_of::<usize>() {
        return Err(RlpError::Truncated {
            needed: usize::MAX,
            available: input.len(),
        });
    }
    let len = len_bytes
        .iter()
        .fold(0usize, |acc, b| (acc << 8) | *b as usize);
    if len <= SHORT_LIMIT {
        return Err(RlpError::NonCanonicalLength);
    }
    Ok((1 + len_of_len, len))
}

fn slice(input: &[u8], start: usize, len: usize) -> Result<&[u8], RlpError> {
    let end = start.checked_add(len).ok_or(RlpError::Truncated {
        needed: usize::MAX,
        available: input.len(),
    })?;
    input.get(start..end).ok_or(RlpError::Truncated {
        needed: end,
        available: input.len(),
    })
}
