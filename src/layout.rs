//! On-disk layout of the `Regist.reg` container.
//!
//! Every format constant and every fixed-width field layout lives here, so
//! the byte-level contract stays in one testable place.  All multi-byte
//! integers are big-endian.
//!
//! ```text
//! offset 0      4-byte magic D0 06 00 00 (inside index entry 0's padding)
//! offset 0      64 × 48-byte index entries
//! offset 0xC00  16 bytes of padding
//! offset 0xC10  first bank: 16-byte name + 32-byte version string,
//!               then 8 registration records (32-byte header + payload)
//! ```

use byteorder::{BigEndian, WriteBytesExt};
use std::io::{self, Read, Write};

use crate::error::FormatError;

/// Container signature at offset 0.
pub const MAGIC: [u8; 4] = [0xd0, 0x06, 0x00, 0x00];
/// Number of slots in the index table, present or not.
pub const INDEX_ENTRIES: usize = 64;
/// Width of one index entry.
pub const INDEX_ENTRY_SIZE: usize = 48;
/// Padding between the index table and the first bank.
pub const INDEX_TRAILER_SIZE: usize = 16;
/// Byte position of the first bank: 64 × 48 + 16.
pub const FIRST_BANK_POSITION: u32 = 0x0c10;
/// Inline bank header: 16-byte name + 32-byte version string.
pub const BANK_HEADER_SIZE: u32 = 48;
/// Width of a registration record header.
pub const REG_HEADER_SIZE: usize = 32;
/// A record's `size` field covers flags + name + payload, so the payload is
/// `size - 22` bytes and the on-disk span is `size + 10` (id tag + size field).
pub const REG_HEADER_OVERHEAD: u32 = 22;
pub const REG_RECORD_EXTRA: u32 = 10;
/// Canonical size field of an unused slot.
pub const EMPTY_REG_SIZE: u32 = 573;
/// On-disk span of an unused slot: 6-byte id + 4-byte size + 573 zero bytes.
pub const EMPTY_REG_SPAN: u32 = 583;
/// Fixed width of every name field.
pub const NAME_WIDTH: usize = 16;
/// Registration id tag prefix; the trailing digit is the slot number.
pub const REG_ID_PREFIX: &[u8; 5] = b"REG00";
/// Flag bytes written for a populated registration.  Byte 11 of the header
/// (the second flag byte) is zero exactly when the slot is empty.
pub const REG_FLAGS_PRESENT: [u8; 6] = [0x08, 0x01, 0x00, 0x00, 0x00, 0x00];
pub const EMPTY_FLAG_OFFSET: usize = 11;
/// Version string following each bank name.
pub const VERSION_STRING: &[u8; 32] = b"PSR-9000PREGIST Ver1.00         ";
/// Maximum registrations per bank.
pub const SLOTS_PER_BANK: usize = 8;

// ── Fixed-width strings ──────────────────────────────────────────────────────

/// Decode a fixed-width name field: cut at the first NUL (empty if the field
/// starts with one), otherwise strip trailing whitespace.
pub fn decode_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim_end().to_string()
}

/// Encode a name into a fixed-width field: NUL-padded, silently truncated
/// when over-length.
pub fn encode_name(name: &str, out: &mut [u8]) {
    let bytes = name.as_bytes();
    let n = bytes.len().min(out.len());
    out[..n].copy_from_slice(&bytes[..n]);
    out[n..].fill(0);
}

/// The 22-character "long name" stored in an index entry and listed in the
/// manifest: the bank name space-padded to 16 characters, the bank number as
/// two uppercase hex digits, and a literal `.reg` suffix.
pub fn long_name(name: &str, number: u8) -> String {
    let short: String = name.chars().take(NAME_WIDTH).collect();
    format!("{short:<16}{number:02X}.reg")
}

// ── Index entries ────────────────────────────────────────────────────────────

/// One 48-byte index table entry.  Entries with `size == 0` mark unused bank
/// slots and are never materialized.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub size: u32,
    pub position: u32,
    pub number: u8,
    pub name: String,
}

impl IndexEntry {
    /// Read one entry.  A short read means the index table is truncated.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, FormatError> {
        let mut buf = [0u8; INDEX_ENTRY_SIZE];
        reader
            .read_exact(&mut buf)
            .map_err(|_| FormatError::Truncated("index table"))?;

        // 16 pad bytes (the magic lives in entry 0's padding), then the
        // big-endian fields and the 16-byte name prefix of the long name.
        let size = u32::from_be_bytes(buf[16..20].try_into().unwrap());
        let position = u32::from_be_bytes(buf[20..24].try_into().unwrap());
        let number = buf[24];
        let name = decode_name(&buf[25..25 + NAME_WIDTH]);

        Ok(Self { size, position, number, name })
    }

    /// Write one entry.  The lead entry carries the 2-byte format tag in its
    /// padding; every other entry's padding is all zeros.
    pub fn write<W: Write>(&self, mut writer: W, lead: bool) -> io::Result<()> {
        if lead {
            writer.write_all(&MAGIC[..2])?;
            writer.write_all(&[0u8; 14])?;
        } else {
            writer.write_all(&[0u8; 16])?;
        }
        writer.write_u32::<BigEndian>(self.size)?;
        writer.write_u32::<BigEndian>(self.position)?;
        writer.write_u8(self.number)?;

        let mut long = [0u8; 22];
        encode_name(&long_name(&self.name, self.number), &mut long);
        writer.write_all(&long)?;
        writer.write_u8(0)?;
        Ok(())
    }
}

// ── Registration headers ─────────────────────────────────────────────────────

/// Parsed 32-byte registration record header.  `raw` keeps the bytes exactly
/// as read; the model carries them through rearrangement untouched.
#[derive(Debug, Clone)]
pub struct RegHeader {
    pub number: u8,
    pub size: u32,
    pub empty: bool,
    pub name: String,
    pub raw: [u8; REG_HEADER_SIZE],
}

impl RegHeader {
    pub fn read<R: Read>(mut reader: R) -> Result<Self, FormatError> {
        let mut raw = [0u8; REG_HEADER_SIZE];
        reader
            .read_exact(&mut raw)
            .map_err(|_| FormatError::Truncated("registration header"))?;

        // Id tag "REG00n": the digits after "REG" carry the slot number.
        let id: [u8; 6] = raw[0..6].try_into().unwrap();
        let number = std::str::from_utf8(&id[3..6])
            .ok()
            .and_then(|digits| digits.parse::<u8>().ok())
            .ok_or(FormatError::BadRecordTag(id))?;

        let size = u32::from_be_bytes(raw[6..10].try_into().unwrap());
        if size < REG_HEADER_OVERHEAD {
            return Err(FormatError::BadRecordSize(size));
        }
        let empty = raw[EMPTY_FLAG_OFFSET] == 0;
        let name = decode_name(&raw[16..16 + NAME_WIDTH]);

        Ok(Self { number, size, empty, name, raw })
    }

    /// Payload length implied by the size field.
    pub fn data_len(&self) -> usize {
        (self.size - REG_HEADER_OVERHEAD) as usize
    }
}

/// Write the 6-byte registration id tag for a slot.
pub fn write_reg_id<W: Write>(mut writer: W, number: u8) -> io::Result<()> {
    writer.write_all(REG_ID_PREFIX)?;
    writer.write_all(&[b'0' + (number % 10)])?;
    Ok(())
}

/// Write the inline bank header: NUL-padded name + version string.
pub fn write_bank_header<W: Write>(mut writer: W, name: &str) -> io::Result<()> {
    let mut field = [0u8; NAME_WIDTH];
    encode_name(name, &mut field);
    writer.write_all(&field)?;
    writer.write_all(VERSION_STRING)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decode_name_cuts_at_first_nul() {
        assert_eq!(decode_name(b"Piano\x00\x00junk\x00ab"), "Piano");
        assert_eq!(decode_name(b"\x00whatever"), "");
        assert_eq!(decode_name(b"Strings   "), "Strings");
    }

    #[test]
    fn encode_name_pads_and_truncates() {
        let mut field = [0xffu8; NAME_WIDTH];
        encode_name("Organ", &mut field);
        assert_eq!(&field[..5], b"Organ");
        assert!(field[5..].iter().all(|&b| b == 0));

        encode_name("A name well over sixteen chars", &mut field);
        assert_eq!(&field, b"A name well over");
    }

    #[test]
    fn long_name_carries_hex_number_and_suffix() {
        assert_eq!(long_name("Live Set", 0x1f), "Live Set        1F.reg");
        assert_eq!(long_name("Bank", 3), "Bank            03.reg");
        assert_eq!(long_name("Bank", 3).len(), 22);
    }

    #[test]
    fn index_entry_roundtrip() {
        let entry = IndexEntry {
            size: 4712,
            position: FIRST_BANK_POSITION,
            number: 9,
            name: "My Bank".to_string(),
        };
        let mut buf = Vec::new();
        entry.write(&mut buf, true).unwrap();
        assert_eq!(buf.len(), INDEX_ENTRY_SIZE);
        assert_eq!(&buf[..2], &MAGIC[..2]);

        let back = IndexEntry::read(&buf[..]).unwrap();
        assert_eq!(back.size, 4712);
        assert_eq!(back.position, FIRST_BANK_POSITION);
        assert_eq!(back.number, 9);
        assert_eq!(back.name, "My Bank");
    }

    #[test]
    fn index_entry_truncated() {
        let short = [0u8; 20];
        assert!(matches!(
            IndexEntry::read(&short[..]),
            Err(FormatError::Truncated(_))
        ));
    }

    #[test]
    fn reg_header_parses_slot_and_flags() {
        let mut raw = [0u8; REG_HEADER_SIZE];
        raw[0..6].copy_from_slice(b"REG005");
        raw[6..10].copy_from_slice(&326u32.to_be_bytes());
        raw[10..16].copy_from_slice(&REG_FLAGS_PRESENT);
        raw[16..21].copy_from_slice(b"Tango");

        let header = RegHeader::read(&raw[..]).unwrap();
        assert_eq!(header.number, 5);
        assert_eq!(header.size, 326);
        assert_eq!(header.data_len(), 304);
        assert!(!header.empty);
        assert_eq!(header.name, "Tango");
    }

    #[test]
    fn reg_header_rejects_bad_tag() {
        let mut raw = [0u8; REG_HEADER_SIZE];
        raw[0..6].copy_from_slice(b"BOGUS!");
        raw[6..10].copy_from_slice(&100u32.to_be_bytes());
        assert!(matches!(
            RegHeader::read(&raw[..]),
            Err(FormatError::BadRecordTag(_))
        ));
    }

    proptest! {
        #[test]
        fn name_field_roundtrip(name in "[ -~]{0,16}") {
            let mut field = [0u8; NAME_WIDTH];
            encode_name(&name, &mut field);
            // Trailing whitespace is lost by design; everything else survives.
            prop_assert_eq!(decode_name(&field), name.trim_end());
        }
    }
}
