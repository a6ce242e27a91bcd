//! This module contains an attribute-aware codec for fixed-stride vertex data.
//!
//! It follows the shape of meshoptimizer's vertex codec (v0):
//! * vertices are processed in blocks of up to 256,
//! * every byte position of the record is a separate stream, delta-coded against the
//!   same byte of the previous vertex and zigzag-mapped so small signed changes
//!   become small unsigned values,
//! * each stream is cut into groups of 16 bytes, and every group is bit-packed at
//!   the narrowest of 0, 2, 4 or 8 bits that holds its largest value.
//!
//! Layout: `[0xA0]` then, per block and per byte position, a header of 2-bit width
//! codes (four groups per byte) followed by the packed groups.

use crate::error::SplatPressError;

/// Format marker and version (v0).
pub const HEADER_BYTE: u8 = 0xA0;
/// Vertices per block.
pub const BLOCK_MAX_VERTICES: usize = 256;

const GROUP_SIZE: usize = 16;
const BITS_FOR_CODE: [usize; 4] = [0, 2, 4, 8];

//==================================================================================
// 1. Core Logic (The "Engine")
//==================================================================================

#[inline]
fn zigzag(delta: u8) -> u8 {
    let d = delta as i8;
    ((d << 1) ^ (d >> 7)) as u8
}

#[inline]
fn unzigzag(z: u8) -> u8 {
    (z >> 1) ^ 0u8.wrapping_sub(z & 1)
}

#[inline]
fn groups_for(count: usize) -> usize {
    count.div_ceil(GROUP_SIZE)
}

#[inline]
fn group_header_bytes(groups: usize) -> usize {
    groups.div_ceil(4)
}

fn width_code(group: &[u8; GROUP_SIZE]) -> u8 {
    match group.iter().copied().max().unwrap_or(0) {
        0 => 0,
        1..=3 => 1,
        4..=15 => 2,
        _ => 3,
    }
}

/// Packs one byte stream (`values.len() <= 256`) into `out`.
fn encode_byte_groups(values: &[u8], out: &mut Vec<u8>) {
    let groups = groups_for(values.len());
    let header_pos = out.len();
    out.resize(header_pos + group_header_bytes(groups), 0);

    for (g, chunk) in values.chunks(GROUP_SIZE).enumerate() {
        let mut group = [0u8; GROUP_SIZE];
        group[..chunk.len()].copy_from_slice(chunk);

        let code = width_code(&group);
        out[header_pos + g / 4] |= code << ((g % 4) * 2);

        let bits = BITS_FOR_CODE[code as usize];
        match bits {
            0 => {}
            8 => out.extend_from_slice(&group),
            _ => {
                let per_byte = 8 / bits;
                for packed in group.chunks(per_byte) {
                    let byte = packed
                        .iter()
                        .enumerate()
                        .fold(0u8, |acc, (t, &v)| acc | (v << (t * bits)));
                    out.push(byte);
                }
            }
        }
    }
}

/// Unpacks one byte stream of `values.len()` entries starting at `*pos`.
fn decode_byte_groups(
    encoded: &[u8],
    pos: &mut usize,
    values: &mut [u8],
) -> Result<(), SplatPressError> {
    let groups = groups_for(values.len());
    let header_len = group_header_bytes(groups);
    let header = encoded
        .get(*pos..*pos + header_len)
        .ok_or_else(|| truncated(*pos))?;
    let mut cursor = *pos + header_len;

    for (g, chunk) in values.chunks_mut(GROUP_SIZE).enumerate() {
        let code = (header[g / 4] >> ((g % 4) * 2)) & 0b11;
        let bits = BITS_FOR_CODE[code as usize];
        let payload_len = GROUP_SIZE * bits / 8;
        let payload = encoded
            .get(cursor..cursor + payload_len)
            .ok_or_else(|| truncated(cursor))?;

        let mut group = [0u8; GROUP_SIZE];
        match bits {
            0 => {}
            8 => group.copy_from_slice(payload),
            _ => {
                let per_byte = 8 / bits;
                let mask = (1u8 << bits) - 1;
                for (i, v) in group.iter_mut().enumerate() {
                    *v = (payload[i / per_byte] >> ((i % per_byte) * bits)) & mask;
                }
            }
        }
        chunk.copy_from_slice(&group[..chunk.len()]);
        cursor += payload_len;
    }

    *pos = cursor;
    Ok(())
}

fn truncated(offset: usize) -> SplatPressError {
    SplatPressError::VertexCodecError(format!("stream truncated at offset {}", offset))
}

//==================================================================================
// 2. Public API
//==================================================================================

fn record_bytes(vertex_count: usize, vertex_stride: usize) -> Result<usize, SplatPressError> {
    vertex_count.checked_mul(vertex_stride).ok_or_else(|| {
        SplatPressError::InternalError(format!(
            "{} records x {} bytes overflows usize",
            vertex_count, vertex_stride
        ))
    })
}

/// Upper bound on the encoded size of `vertex_count` records of `vertex_stride` bytes.
pub fn encode_bound(vertex_count: usize, vertex_stride: usize) -> usize {
    let per_block = |n: usize| {
        let groups = groups_for(n);
        vertex_stride * (group_header_bytes(groups) + groups * GROUP_SIZE)
    };
    let full_blocks = vertex_count / BLOCK_MAX_VERTICES;
    let remainder = vertex_count % BLOCK_MAX_VERTICES;
    1 + full_blocks * per_block(BLOCK_MAX_VERTICES) + per_block(remainder)
}

/// Encodes `vertex_count` interleaved records of `vertex_stride` bytes.
pub fn encode(
    data: &[u8],
    vertex_count: usize,
    vertex_stride: usize,
) -> Result<Vec<u8>, SplatPressError> {
    let expected = record_bytes(vertex_count, vertex_stride)?;
    if data.len() != expected {
        return Err(SplatPressError::LayoutMismatch {
            expected,
            actual: data.len(),
            context: "vertex codec input",
        });
    }

    let mut out = Vec::with_capacity(encode_bound(vertex_count, vertex_stride));
    out.push(HEADER_BYTE);

    let mut last = vec![0u8; vertex_stride];
    let mut deltas = [0u8; BLOCK_MAX_VERTICES];

    for block_start in (0..vertex_count).step_by(BLOCK_MAX_VERTICES) {
        let n = BLOCK_MAX_VERTICES.min(vertex_count - block_start);
        let block = &data[block_start * vertex_stride..(block_start + n) * vertex_stride];

        for (k, &baseline) in last.iter().enumerate() {
            let mut prev = baseline;
            for (i, delta) in deltas[..n].iter_mut().enumerate() {
                let v = block[i * vertex_stride + k];
                *delta = zigzag(v.wrapping_sub(prev));
                prev = v;
            }
            encode_byte_groups(&deltas[..n], &mut out);
        }
        last.copy_from_slice(&block[(n - 1) * vertex_stride..]);
    }

    Ok(out)
}

/// Decodes a stream produced by [`encode`] into `dst`, which must hold exactly
/// `vertex_count * vertex_stride` bytes.
pub fn decode(
    encoded: &[u8],
    vertex_count: usize,
    vertex_stride: usize,
    dst: &mut [u8],
) -> Result<(), SplatPressError> {
    let expected = record_bytes(vertex_count, vertex_stride)?;
    if dst.len() != expected {
        return Err(SplatPressError::LayoutMismatch {
            expected,
            actual: dst.len(),
            context: "vertex codec output",
        });
    }
    if encoded.first() != Some(&HEADER_BYTE) {
        return Err(SplatPressError::VertexCodecError(
            "missing or unsupported header".to_string(),
        ));
    }

    let mut pos = 1;
    let mut last = vec![0u8; vertex_stride];
    let mut deltas = [0u8; BLOCK_MAX_VERTICES];

    for block_start in (0..vertex_count).step_by(BLOCK_MAX_VERTICES) {
        let n = BLOCK_MAX_VERTICES.min(vertex_count - block_start);
        let block = &mut dst[block_start * vertex_stride..(block_start + n) * vertex_stride];

        for (k, &baseline) in last.iter().enumerate() {
            decode_byte_groups(encoded, &mut pos, &mut deltas[..n])?;
            let mut prev = baseline;
            for (i, &z) in deltas[..n].iter().enumerate() {
                prev = prev.wrapping_add(unzigzag(z));
                block[i * vertex_stride + k] = prev;
            }
        }
        last.copy_from_slice(&block[(n - 1) * vertex_stride..]);
    }

    if pos != encoded.len() {
        return Err(SplatPressError::VertexCodecError(format!(
            "{} trailing bytes after the last block",
            encoded.len() - pos
        )));
    }
    Ok(())
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
