//! Rewrite engine: `read`, `write_all` (pass-through), `rewrite_spec_names`,
//! and `rewrite_table_names`.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};

use log::debug;

use crate::error::{Error, Result};
use crate::io;
use crate::length::{self, Encoding};
use crate::pool::{StringPool, HEADER_SIZE, UTF8_FLAG};

/// Fields common to every parse, including the ones `rewrite_spec_names` and
/// `rewrite_table_names` need but `read`'s public `StringPool` doesn't carry
/// (`chunk_size`, `string_count`, `style_count` before any rewrite).
struct RawPool {
    chunk_size: u32,
    string_count: u32,
    style_count: u32,
    flags: u32,
    styles_offset: u32,
    string_offsets: Vec<u32>,
    style_offsets: Vec<u32>,
    payload: Vec<u8>,
    styles: Option<Vec<u32>>,
}

impl RawPool {
    fn into_pool(self) -> StringPool {
        StringPool {
            is_utf8: self.flags & UTF8_FLAG != 0,
            flags: self.flags,
            string_offsets: self.string_offsets,
            payload: self.payload,
            style_offsets: self.style_offsets,
            styles: self.styles,
        }
    }

    fn encoding(&self) -> Encoding {
        if self.flags & UTF8_FLAG != 0 {
            Encoding::Utf8
        } else {
            Encoding::Utf16Le
        }
    }
}

fn parse_raw(reader: &mut impl Read, also_allowed_null: bool) -> Result<RawPool> {
    io::read_chunk_type(reader, io::CHUNK_STRINGPOOL_TYPE, also_allowed_null)?;
    let chunk_size = io::read_u32(reader)?;
    let string_count = io::read_u32(reader)?;
    let style_count = io::read_u32(reader)?;
    let flags = io::read_u32(reader)?;
    let strings_offset = io::read_u32(reader)?;
    let styles_offset = io::read_u32(reader)?;

    let string_offsets = io::read_u32_array(reader, string_count as usize)?;
    let style_offsets = if style_count > 0 {
        io::read_u32_array(reader, style_count as usize)?
    } else {
        Vec::new()
    };

    let payload_end = if styles_offset == 0 { chunk_size } else { styles_offset };
    let payload_size = payload_end.saturating_sub(strings_offset);
    if payload_size % 4 != 0 {
        return Err(Error::UnalignedPayload(payload_size));
    }
    let mut payload = vec![0u8; payload_size as usize];
    io::read_exact(reader, &mut payload)?;

    let styles = if styles_offset != 0 {
        let styles_bytes = chunk_size.saturating_sub(styles_offset);
        if styles_bytes % 4 != 0 {
            return Err(Error::UnalignedStyles(styles_bytes));
        }
        Some(io::read_u32_array(reader, (styles_bytes / 4) as usize)?)
    } else {
        None
    };

    debug!(
        "parsed string pool: {string_count} strings, {style_count} styles, utf8={}",
        flags & UTF8_FLAG != 0
    );

    Ok(RawPool {
        chunk_size,
        string_count,
        style_count,
        flags,
        styles_offset,
        string_offsets,
        style_offsets,
        payload,
        styles,
    })
}

fn pad_to_multiple_of_4(buf: &mut Vec<u8>) {
    let rem = buf.len() % 4;
    if rem != 0 {
        buf.resize(buf.len() + (4 - rem), 0);
    }
}

/// Parses a string pool chunk positioned at its chunk-type word. Accepts the
/// null-chunk synonym.
pub fn read(reader: &mut impl Read) -> Result<StringPool> {
    Ok(parse_raw(reader, true)?.into_pool())
}

/// Copies an unmodified string pool chunk from `reader` to `writer` verbatim.
pub fn write_all(reader: &mut impl Read, writer: &mut impl Write) -> Result<()> {
    io::write_check_chunk_type(reader, writer, io::CHUNK_STRINGPOOL_TYPE, true)?;
    let chunk_size = io::read_u32(reader)?;
    io::write_u32(writer, chunk_size)?;
    io::tee(reader, writer, chunk_size as usize - 8)?;
    Ok(())
}

/// Replaces the entire string table with `new_names`, in order. Fails with
/// `Error::UnexpectedStyles` if the input pool carries any styles — this
/// rewrite is only valid for spec-name pools, which never do. `assigned_index`
/// is cleared and then populated with the index assigned to each name, so the
/// caller can relink references afterward.
///
/// The null chunk-type synonym is rejected here: a rewrite needs the real
/// flags/encoding of the pool it is replacing, and a null chunk carries none.
pub fn rewrite_spec_names(
    reader: &mut impl Read,
    writer: &mut impl Write,
    new_names: &[String],
    assigned_index: &mut HashMap<String, usize>,
) -> Result<i32> {
    let raw = parse_raw(reader, false)?;
    if raw.style_count != 0 {
        return Err(Error::UnexpectedStyles(raw.style_count));
    }
    let encoding = raw.encoding();

    assigned_index.clear();
    let mut seen = HashSet::with_capacity(new_names.len());
    let mut payload = Vec::new();
    let mut string_offsets = Vec::with_capacity(new_names.len());

    for (index, name) in new_names.iter().enumerate() {
        if !seen.insert(name.as_str()) {
            return Err(Error::DuplicateName(name.clone()));
        }
        string_offsets.push(payload.len() as u32);
        payload.extend_from_slice(&length::encode_entry(name, encoding)?);
        assigned_index.insert(name.clone(), index);
    }
    pad_to_multiple_of_4(&mut payload);

    let string_count = new_names.len() as u32;
    let strings_offset = HEADER_SIZE + 4 * string_count;
    let total_size = strings_offset + payload.len() as u32;

    io::write_u32(writer, io::CHUNK_STRINGPOOL_TYPE)?;
    io::write_u32(writer, total_size)?;
    io::write_u32(writer, string_count)?;
    io::write_u32(writer, 0)?;
    io::write_u32(writer, raw.flags)?;
    io::write_u32(writer, strings_offset)?;
    io::write_u32(writer, 0)?;
    io::write_u32_array(writer, &string_offsets)?;
    writer.write_all(&payload)?;

    debug!("rewrote spec-name pool: {string_count} names, {total_size} bytes");
    Ok(raw.chunk_size as i32 - total_size as i32)
}

/// Substitutes strings at the indices named in `rename`, leaving every other
/// entry byte-identical and preserving any style offsets/spans verbatim.
pub fn rewrite_table_names(
    reader: &mut impl Read,
    writer: &mut impl Write,
    rename: &HashMap<usize, String>,
) -> Result<i32> {
    let raw = parse_raw(reader, false)?;
    let encoding = raw.encoding();
    let string_count = raw.string_count as usize;

    let mut payload = Vec::new();
    let mut new_offsets = Vec::with_capacity(string_count);
    for i in 0..string_count {
        new_offsets.push(payload.len() as u32);
        if let Some(name) = rename.get(&i) {
            payload.extend_from_slice(&length::encode_entry(name, encoding)?);
        } else {
            let start = raw.string_offsets[i] as usize;
            let end = if i + 1 < string_count {
                raw.string_offsets[i + 1] as usize
            } else {
                raw.payload.len()
            };
            payload.extend_from_slice(&raw.payload[start..end]);
        }
    }
    pad_to_multiple_of_4(&mut payload);

    let style_count = raw.style_count;
    let strings_offset = HEADER_SIZE + 4 * string_count as u32 + 4 * style_count;
    let styles_offset = if raw.styles_offset != 0 {
        strings_offset + payload.len() as u32
    } else {
        0
    };
    let styles_trailer_len = raw.styles.as_ref().map_or(0, |s| s.len() as u32 * 4);
    let total_size = strings_offset + payload.len() as u32 + styles_trailer_len;

    io::write_u32(writer, io::CHUNK_STRINGPOOL_TYPE)?;
    io::write_u32(writer, total_size)?;
    io::write_u32(writer, string_count as u32)?;
    io::write_u32(writer, style_count)?;
    io::write_u32(writer, raw.flags)?;
    io::write_u32(writer, strings_offset)?;
    io::write_u32(writer, styles_offset)?;
    io::write_u32_array(writer, &new_offsets)?;
    if style_count > 0 {
        io::write_u32_array(writer, &raw.style_offsets)?;
    }
    writer.write_all(&payload)?;
    if let Some(styles) = &raw.styles {
        io::write_u32_array(writer, styles)?;
    }

    debug!("rewrote table-name pool: {} substitutions, {total_size} bytes", rename.len());
    Ok(raw.chunk_size as i32 - total_size as i32)
}
