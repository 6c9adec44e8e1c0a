//! Binary I/O adapter: little-endian primitives plus a verbatim byte "tee"
//! from a reader to a writer. No buffering or seeking is required by the
//! rewrite engine, so these operate on plain `Read`/`Write`, not `Read + Seek`
//! (unlike `AxmlReader`, which seeks past chunks it does not understand).

use std::io::{Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt, LE};

use crate::error::{Error, Result};

/// `ResStringPool_header.type` on the wire.
pub const CHUNK_STRINGPOOL_TYPE: u32 = 0x001C_0001;
/// Accepted by `read`/`write_all` as a synonym for malformed/placeholder chunks.
pub const CHUNK_NULL_TYPE: u32 = 0x0000_0000;

pub fn read_u32(r: &mut impl Read) -> Result<u32> {
    Ok(r.read_u32::<LE>()?)
}

pub fn read_u16(r: &mut impl Read) -> Result<u16> {
    Ok(r.read_u16::<LE>()?)
}

pub fn read_u32_array(r: &mut impl Read, n: usize) -> Result<Vec<u32>> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(read_u32(r)?);
    }
    Ok(out)
}

pub fn read_exact(r: &mut impl Read, buf: &mut [u8]) -> Result<()> {
    r.read_exact(buf)?;
    Ok(())
}

/// Reads a chunk-type word, accepting `expected` and, if `also_allowed_null`
/// is set, `CHUNK_NULL_TYPE` too.
pub fn read_chunk_type(r: &mut impl Read, expected: u32, also_allowed_null: bool) -> Result<u32> {
    let found = read_u32(r)?;
    if found == expected || (also_allowed_null && found == CHUNK_NULL_TYPE) {
        Ok(found)
    } else {
        Err(Error::InvalidChunkType(found))
    }
}

pub fn write_u32(w: &mut impl Write, value: u32) -> Result<()> {
    Ok(w.write_u32::<LE>(value)?)
}

pub fn write_u16(w: &mut impl Write, value: u16) -> Result<()> {
    Ok(w.write_u16::<LE>(value)?)
}

pub fn write_u32_array(w: &mut impl Write, values: &[u32]) -> Result<()> {
    for &v in values {
        write_u32(w, v)?;
    }
    Ok(())
}

/// Copies exactly `n` bytes from `r` to `w`, unmodified.
pub fn tee(r: &mut impl Read, w: &mut impl Write, n: usize) -> Result<()> {
    let mut buffer = [0u8; 4096];
    let mut remaining = n;
    while remaining > 0 {
        let chunk = remaining.min(buffer.len());
        read_exact(r, &mut buffer[..chunk])?;
        w.write_all(&buffer[..chunk])?;
        remaining -= chunk;
    }
    Ok(())
}

/// Reads a chunk-type word from `r`, validates it, and writes the same value to `w`.
pub fn write_check_chunk_type(
    r: &mut impl Read,
    w: &mut impl Write,
    expected: u32,
    also_allowed_null: bool,
) -> Result<u32> {
    let found = read_chunk_type(r, expected, also_allowed_null)?;
    write_u32(w, found)?;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn tee_copies_bytes_verbatim() -> anyhow::Result<()> {
        let input = (0u8..20).collect::<Vec<_>>();
        let mut reader = Cursor::new(input.clone());
        let mut out = Vec::new();
        tee(&mut reader, &mut out, input.len())?;
        assert_eq!(out, input);
        Ok(())
    }

    #[test]
    fn read_chunk_type_accepts_null_synonym() -> anyhow::Result<()> {
        let mut reader = Cursor::new(0u32.to_le_bytes());
        let found = read_chunk_type(&mut reader, CHUNK_STRINGPOOL_TYPE, true)?;
        assert_eq!(found, CHUNK_NULL_TYPE);
        Ok(())
    }

    #[test]
    fn read_chunk_type_rejects_mismatch() {
        let mut reader = Cursor::new(0xDEAD_BEEFu32.to_le_bytes());
        let err = read_chunk_type(&mut reader, CHUNK_STRINGPOOL_TYPE, true).unwrap_err();
        assert!(matches!(err, Error::InvalidChunkType(0xDEAD_BEEF)));
    }
}
