//! Binary codec for the `Regist.reg` container.
//!
//! # Decode
//! [`read_banks`] verifies the magic signature, walks the 64-entry index
//! table (entries with a zero size field are unused and skipped), then seeks
//! to each bank and reads registration records sequentially until the bank's
//! declared size is consumed.  Single pass, whole container in memory — the
//! format tops out at a few hundred KiB.
//!
//! # Encode
//! [`write_banks`] emits the index table (lead entry tagged with the format
//! magic, unused slots zero-filled), the 16 trailer bytes that put the first
//! bank at 0x0C10, then each bank's inline header and registration records.
//! Encode trusts the caller-provided model and only fails on I/O errors;
//! validation happens during decode, map parsing, and rearrangement.

use byteorder::{BigEndian, WriteBytesExt};
use log::{debug, trace};
use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::FormatError;
use crate::layout::{
    encode_name, write_bank_header, write_reg_id, IndexEntry, RegHeader, BANK_HEADER_SIZE,
    EMPTY_REG_SIZE, INDEX_ENTRIES, INDEX_ENTRY_SIZE, INDEX_TRAILER_SIZE, MAGIC, NAME_WIDTH,
    REG_FLAGS_PRESENT, REG_HEADER_SIZE,
};
use crate::model::{Bank, Registration};

/// Decode a container into its bank list.
///
/// Banks whose index entry has a zero size are not materialized, and any
/// registration slot may be marked empty, so the result is sparse in both
/// dimensions.
pub fn read_banks<R: Read + Seek>(reader: &mut R) -> Result<Vec<Bank>, FormatError> {
    let mut magic = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .map_err(|_| FormatError::Truncated("magic number"))?;
    if magic != MAGIC {
        return Err(FormatError::BadMagic(magic));
    }

    // The magic sits inside index entry 0's padding; rewind and read the
    // whole table.
    reader.seek(SeekFrom::Start(0))?;
    let mut banks = Vec::new();

    for _ in 0..INDEX_ENTRIES {
        let entry = IndexEntry::read(&mut *reader)?;
        if entry.size == 0 {
            continue;
        }
        banks.push(Bank {
            number: entry.number,
            name: entry.name,
            position: entry.position,
            size: entry.size,
            registrations: Vec::new(),
        });
    }
    debug!("index table lists {} bank(s)", banks.len());

    for bank in &mut banks {
        let mut offset = BANK_HEADER_SIZE;
        reader.seek(SeekFrom::Start(u64::from(bank.position) + u64::from(offset)))?;

        while offset < bank.size {
            let header = RegHeader::read(&mut *reader)?;
            let mut data = vec![0u8; header.data_len()];
            reader
                .read_exact(&mut data)
                .map_err(|_| FormatError::Truncated("registration data"))?;

            offset += (REG_HEADER_SIZE + data.len()) as u32;
            trace!(
                "bank {:02}: slot {} '{}' size {}",
                bank.number, header.number, header.name, header.size
            );

            bank.registrations.push(Registration {
                number: header.number,
                empty: header.empty,
                name: header.name,
                size: header.size,
                head: header.raw,
                data,
            });
        }
    }

    Ok(banks)
}

/// Encode a bank list as a complete container.
///
/// The caller is expected to pass a self-consistent model — fresh from
/// [`read_banks`] or rebuilt by [`crate::rearrange::rearrange_banks`], which
/// recomputes every position and size.
pub fn write_banks<W: Write>(banks: &[Bank], writer: &mut W) -> std::io::Result<()> {
    debug_assert!(banks.len() <= INDEX_ENTRIES);

    for (i, bank) in banks.iter().enumerate() {
        let entry = IndexEntry {
            size: bank.size,
            position: bank.position,
            number: bank.number,
            name: bank.name.clone(),
        };
        entry.write(&mut *writer, i == 0)?;
    }
    for _ in banks.len()..INDEX_ENTRIES {
        writer.write_all(&[0u8; INDEX_ENTRY_SIZE])?;
    }
    writer.write_all(&[0u8; INDEX_TRAILER_SIZE])?;

    for bank in banks {
        write_bank_header(&mut *writer, &bank.name)?;

        for registration in &bank.registrations {
            write_reg_id(&mut *writer, registration.number)?;

            if registration.is_present() {
                writer.write_u32::<BigEndian>(registration.size)?;
                writer.write_all(&REG_FLAGS_PRESENT)?;
                let mut name = [0u8; NAME_WIDTH];
                encode_name(&registration.name, &mut name);
                writer.write_all(&name)?;
                writer.write_all(&registration.data)?;
            } else {
                writer.write_u32::<BigEndian>(EMPTY_REG_SIZE)?;
                writer.write_all(&vec![0u8; EMPTY_REG_SIZE as usize])?;
            }
        }
    }

    debug!("wrote container with {} bank(s)", banks.len());
    Ok(())
}
