//! Text map codec — the human-editable interchange form.
//!
//! A map renders every bank as a header line followed by exactly eight slot
//! lines, with a blank line between banks:
//!
//! ```text
//! 01|N|Bank Name
//! 01|1|Registration 1
//! 01|2|
//! ...
//! 01|8|Registration 8
//! ```
//!
//! Bank and slot numbers are 1-based in the text form and 0-based internally;
//! the +1 offset is applied on both serialize and parse.  A slot line's first
//! two fields are *source coordinates* into the originally decoded model, so
//! an unedited map is the identity plan.  On a bank header line a negative
//! first field means "relative skip": `-k` advances the running bank counter
//! by `k` from the previous bank, leaving the skipped banks untouched without
//! renumbering everything that follows.

use std::io::{self, BufRead, Write};

use crate::error::FormatError;
use crate::layout::SLOTS_PER_BANK;
use crate::model::Bank;

/// One slot of a rearrangement plan.  Carries coordinates and a display
/// name, never raw bytes — resolution happens in [`crate::rearrange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapSlot {
    Empty,
    Source {
        /// 0-based bank number in the original model.
        bank: u8,
        /// 0-based registration number within that bank.
        registration: u8,
        /// Display name to install on the rearranged registration.
        name: String,
    },
}

/// One bank of a rearrangement plan.  After parsing, `slots` always holds
/// exactly eight entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapBank {
    pub number: u8,
    pub name: String,
    pub slots: Vec<MapSlot>,
}

// ── Serialize ────────────────────────────────────────────────────────────────

/// Render a bank list as map text.  Deterministic: slots absent from the
/// model (including gaps before a present slot) come out as empty lines, so
/// every bank is exactly a header plus eight slot lines.
pub fn write_map<W: Write>(banks: &[Bank], writer: &mut W) -> io::Result<()> {
    for bank in banks {
        let bb = format!("{:02}", bank.number as u16 + 1);
        writeln!(writer, "{bb}|N|{}", bank.name)?;

        let mut names: [Option<&str>; SLOTS_PER_BANK] = [None; SLOTS_PER_BANK];
        for registration in &bank.registrations {
            if let Some(slot) = names.get_mut(registration.number as usize) {
                *slot = Some(&registration.name);
            }
        }
        for (slot, name) in names.iter().enumerate() {
            writeln!(writer, "{bb}|{}|{}", slot + 1, name.unwrap_or(""))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

// ── Parse ────────────────────────────────────────────────────────────────────

/// Running parser state: the bank number counter survives across banks so
/// that relative skips can advance it.
struct OpenBank {
    number: i32,
    name: String,
    slots: Vec<MapSlot>,
}

impl OpenBank {
    /// Close the bank: truncate or pad the slot list to exactly eight
    /// entries.  A bank whose running number never became valid (possible
    /// through the `0` absolute-number edge case) is dropped, matching the
    /// source format's observed behavior.
    fn close(self, plan: &mut Vec<MapBank>) -> Result<(), FormatError> {
        if self.number < 0 {
            return Ok(());
        }
        if self.number > 63 {
            return Err(FormatError::MapSyntax {
                msg: format!("Bank number {} exceeds the 64-slot index", self.number + 1),
                line: format!("{}|N|{}", self.number + 1, self.name),
            });
        }
        let mut slots = self.slots;
        slots.truncate(SLOTS_PER_BANK);
        slots.resize(SLOTS_PER_BANK, MapSlot::Empty);
        plan.push(MapBank { number: self.number as u8, name: self.name, slots });
        Ok(())
    }
}

fn parse_field(field: &str, what: &str, line: &str) -> Result<i32, FormatError> {
    field
        .parse::<i32>()
        .map_err(|_| FormatError::syntax(format!("Expected a number for {what}, got '{field}'"), line))
}

fn to_coordinate(value: i32, what: &str, line: &str) -> Result<u8, FormatError> {
    u8::try_from(value - 1)
        .map_err(|_| FormatError::syntax(format!("Source {what} {value} is out of range"), line))
}

/// Parse an edited map into a rearrangement plan.
///
/// Every non-blank line must split into exactly three pipe-delimited fields.
/// The third field of a slot line is taken verbatim (after whole-line trim);
/// an empty one marks the slot empty, anything else requires valid source
/// coordinates in the first two fields.
pub fn read_map<R: BufRead>(reader: R) -> Result<Vec<MapBank>, FormatError> {
    let mut plan = Vec::new();
    let mut current: Option<OpenBank> = None;
    let mut counter: i32 = -1;

    for line in reader.lines() {
        let raw = line?;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() != 3 {
            return Err(FormatError::syntax(
                format!("Expected 3 fields but got {}", fields.len()),
                line,
            ));
        }
        let first = fields[0].trim();
        let second = fields[1].trim();
        let name = fields[2];

        if second == "N" {
            if let Some(open) = current.take() {
                open.close(&mut plan)?;
            }
            let number = parse_field(first, "the bank number", line)?;
            if number < 0 {
                counter += -number;
            } else {
                counter = number - 1;
            }
            current = Some(OpenBank { number: counter, name: name.to_owned(), slots: Vec::new() });
        } else {
            let bank = current
                .as_mut()
                .ok_or_else(|| FormatError::syntax("Registrations without bank found", line))?;

            if name.is_empty() {
                bank.slots.push(MapSlot::Empty);
            } else {
                let source_bank = parse_field(first, "the source bank", line)?;
                let source_reg = parse_field(second, "the source registration", line)?;
                bank.slots.push(MapSlot::Source {
                    bank: to_coordinate(source_bank, "bank", line)?,
                    registration: to_coordinate(source_reg, "registration", line)?,
                    name: name.to_owned(),
                });
            }
        }
    }

    if let Some(open) = current.take() {
        open.close(&mut plan)?;
    }
    Ok(plan)
}
