//! In-memory model of a parsed string pool chunk.

use log::warn;

use crate::length::{self, Encoding};

/// `ResStringPool_header.flags & UTF8_FLAG`.
pub const UTF8_FLAG: u32 = 0x0000_0100;
/// Size in bytes of the seven-`u32` chunk header.
pub const HEADER_SIZE: u32 = 28;

/// Decode-time choices, threaded through calls rather than stored globally —
/// the codec keeps no process-wide state.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// When set, `get` stops a UTF-8 decode at the first NUL byte within the
    /// declared length, reproducing a legacy AAPT scanning quirk. The
    /// AOSP-correct default (`false`) trusts the declared byte length outright.
    pub utf8_scan_for_nul: bool,
}

/// A parsed, read-only string pool.
#[derive(Debug, Clone)]
pub struct StringPool {
    pub is_utf8: bool,
    pub flags: u32,
    pub string_offsets: Vec<u32>,
    pub payload: Vec<u8>,
    pub style_offsets: Vec<u32>,
    pub styles: Option<Vec<u32>>,
}

impl StringPool {
    pub fn count(&self) -> usize {
        self.string_offsets.len()
    }

    /// The raw payload-relative offset of entry `i`'s length prefix.
    pub fn raw_offset(&self, i: usize) -> Option<u32> {
        self.string_offsets.get(i).copied()
    }

    fn encoding(&self) -> Encoding {
        if self.is_utf8 {
            Encoding::Utf8
        } else {
            Encoding::Utf16Le
        }
    }

    /// Decodes entry `i` with default options. Out-of-range or malformed
    /// entries return `None`; malformed entries also log a warning.
    pub fn get(&self, i: usize) -> Option<String> {
        self.get_with_options(i, DecodeOptions::default())
    }

    pub fn get_with_options(&self, i: usize, options: DecodeOptions) -> Option<String> {
        let offset = self.string_offsets.get(i).copied()? as usize;
        match self.encoding() {
            Encoding::Utf8 => self.decode_utf8_at(i, offset, options),
            Encoding::Utf16Le => self.decode_utf16_at(i, offset),
        }
    }

    fn decode_utf8_at(&self, i: usize, offset: usize, options: DecodeOptions) -> Option<String> {
        let Some((data_offset, mut data_len)) = length::decode_entry_utf8(&self.payload, offset)
        else {
            warn!("string pool entry {i} has a truncated utf-8 length prefix at offset {offset}");
            return None;
        };
        if options.utf8_scan_for_nul {
            let Some(declared_end) = data_offset.checked_add(data_len) else {
                warn!("string pool entry {i} declares a length that overflows at offset {data_offset}");
                return None;
            };
            let Some(window) = self.payload.get(data_offset..declared_end) else {
                warn!(
                    "string pool entry {i} declares data range {data_offset}..{declared_end} past end of payload"
                );
                return None;
            };
            if let Some(nul_pos) = window.iter().position(|&b| b == 0) {
                data_len = nul_pos;
            }
        }
        let Some(end) = data_offset.checked_add(data_len) else {
            warn!("string pool entry {i} declares a length that overflows at offset {data_offset}");
            return None;
        };
        let Some(bytes) = self.payload.get(data_offset..end) else {
            warn!("string pool entry {i} declares data range {data_offset}..{end} past end of payload");
            return None;
        };
        match std::str::from_utf8(bytes) {
            Ok(s) => Some(s.to_string()),
            Err(e) => {
                warn!("string pool entry {i} is not valid utf-8: {e}");
                None
            }
        }
    }

    fn decode_utf16_at(&self, i: usize, offset: usize) -> Option<String> {
        let Some((data_offset, data_len)) = length::decode_entry_utf16(&self.payload, offset)
        else {
            warn!("string pool entry {i} has a truncated utf-16le length prefix at offset {offset}");
            return None;
        };
        let Some(end) = data_offset.checked_add(data_len) else {
            warn!("string pool entry {i} declares a length that overflows at offset {data_offset}");
            return None;
        };
        let Some(bytes) = self.payload.get(data_offset..end) else {
            warn!("string pool entry {i} declares data range {data_offset}..{end} past end of payload");
            return None;
        };
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        match String::from_utf16(&units) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!("string pool entry {i} is not valid utf-16: {e}");
                None
            }
        }
    }

    /// Linear search by decoded value. UTF-16LE pools compare code-unit by
    /// code-unit against each entry's declared char length; UTF-8 pools
    /// compare the fully decoded string.
    pub fn find(&self, needle: &str) -> Option<usize> {
        match self.encoding() {
            Encoding::Utf8 => (0..self.count()).find(|&i| self.get(i).as_deref() == Some(needle)),
            Encoding::Utf16Le => self.find_utf16(needle),
        }
    }

    fn find_utf16(&self, needle: &str) -> Option<usize> {
        let needle_units: Vec<u16> = needle.encode_utf16().collect();
        for i in 0..self.count() {
            let offset = *self.string_offsets.get(i)? as usize;
            let Some((data_offset, data_len)) = length::decode_entry_utf16(&self.payload, offset)
            else {
                continue;
            };
            if data_len / 2 != needle_units.len() {
                continue;
            }
            let Some(end) = data_offset.checked_add(data_len) else {
                continue;
            };
            let Some(bytes) = self.payload.get(data_offset..end) else {
                continue;
            };
            let matches = bytes
                .chunks_exact(2)
                .zip(needle_units.iter())
                .all(|(c, &u)| u16::from_le_bytes([c[0], c[1]]) == u);
            if matches {
                return Some(i);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8_pool_with(entries: &[&str]) -> StringPool {
        let mut payload = Vec::new();
        let mut offsets = Vec::new();
        for e in entries {
            offsets.push(payload.len() as u32);
            payload.extend(crate::length::encode_entry(e, Encoding::Utf8).unwrap());
        }
        while payload.len() % 4 != 0 {
            payload.push(0);
        }
        StringPool {
            is_utf8: true,
            flags: UTF8_FLAG,
            string_offsets: offsets,
            payload,
            style_offsets: Vec::new(),
            styles: None,
        }
    }

    #[test]
    fn get_decodes_single_utf8_entry() {
        let pool = utf8_pool_with(&["ok"]);
        assert_eq!(pool.count(), 1);
        assert_eq!(pool.get(0).as_deref(), Some("ok"));
        assert_eq!(pool.get(1), None);
    }

    #[test]
    fn find_locates_utf8_entry() {
        let pool = utf8_pool_with(&["foo", "bar", "baz"]);
        assert_eq!(pool.find("bar"), Some(1));
        assert_eq!(pool.find("nope"), None);
    }

    #[test]
    fn find_utf16_compares_code_units() {
        let mut payload = Vec::new();
        let mut offsets = Vec::new();
        for e in ["app", "name"] {
            offsets.push(payload.len() as u32);
            payload.extend(crate::length::encode_entry(e, Encoding::Utf16Le).unwrap());
        }
        let pool = StringPool {
            is_utf8: false,
            flags: 0,
            string_offsets: offsets,
            payload,
            style_offsets: Vec::new(),
            styles: None,
        };
        assert_eq!(pool.find("name"), Some(1));
        assert_eq!(pool.find("missing"), None);
    }

    #[test]
    fn malformed_entry_returns_none_not_panic() {
        // offset points one byte before the end, which truncates the length prefix read.
        let pool = StringPool {
            is_utf8: true,
            flags: UTF8_FLAG,
            string_offsets: vec![3],
            payload: vec![0, 0, 0, 0],
            style_offsets: Vec::new(),
            styles: None,
        };
        assert_eq!(pool.get(0), None);
    }

    #[test]
    fn utf8_scan_for_nul_truncates_at_embedded_nul() {
        // Declared byte length is 5, but a NUL sits at offset 2 within it.
        let mut payload = vec![5u8, 5u8, b'a', b'b', 0, b'c', b'd'];
        payload.push(0); // terminator
        while payload.len() % 4 != 0 {
            payload.push(0);
        }
        let pool = StringPool {
            is_utf8: true,
            flags: UTF8_FLAG,
            string_offsets: vec![0],
            payload,
            style_offsets: Vec::new(),
            styles: None,
        };

        assert_eq!(pool.get(0).as_deref(), Some("ab\u{0}cd"));
        assert_eq!(
            pool.get_with_options(0, DecodeOptions { utf8_scan_for_nul: true })
                .as_deref(),
            Some("ab")
        );
    }
}
