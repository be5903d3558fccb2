//! In-memory model of a decoded container.
//!
//! `Bank` and `Registration` are plain value records created fresh on every
//! decode.  The raw `head`/`data` buffers are owned here and nowhere else;
//! map plans (see [`crate::map`]) only carry coordinates into this model.

use serde::Serialize;

use crate::layout::{EMPTY_REG_SPAN, REG_HEADER_SIZE, REG_RECORD_EXTRA};

/// A named group of up to 8 registrations stored contiguously in the
/// container.
#[derive(Debug, Clone, Serialize)]
pub struct Bank {
    /// Index slot number, 0–63.  Read verbatim on decode.
    pub number: u8,
    pub name: String,
    /// Byte offset of this bank in the container.
    pub position: u32,
    /// Total byte span including the 48-byte bank header.
    pub size: u32,
    pub registrations: Vec<Registration>,
}

/// A single preset slot.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    /// Slot within the bank, 0–7.
    pub number: u8,
    /// Derived from flag byte 11 of the on-disk header.
    pub empty: bool,
    pub name: String,
    /// On-disk size field; the payload is `size - 22` bytes.
    pub size: u32,
    /// The 32-byte record header exactly as read.
    #[serde(skip)]
    pub head: [u8; REG_HEADER_SIZE],
    /// Raw settings payload.
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Registration {
    /// A freshly synthesized unused slot.  Encode ignores everything but the
    /// slot number for these.
    pub fn empty_slot(number: u8) -> Self {
        Self {
            number,
            empty: true,
            name: String::new(),
            size: 0,
            head: [0u8; REG_HEADER_SIZE],
            data: Vec::new(),
        }
    }

    /// Whether encode will emit this slot's stored payload.  Keyed off the
    /// name as well as the flag — a quirk of the source format that is
    /// preserved deliberately: an unnamed registration is written as an
    /// empty slot even when it carries residual data.
    pub fn is_present(&self) -> bool {
        !self.empty && !self.name.is_empty()
    }

    /// On-disk byte span of this record.
    pub fn span(&self) -> u32 {
        if self.is_present() {
            self.size + REG_RECORD_EXTRA
        } else {
            EMPTY_REG_SPAN
        }
    }
}
