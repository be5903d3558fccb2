//! Rearrangement engine: combine a parsed map plan with the originally
//! decoded bank list into a new, fully self-consistent bank list.
//!
//! Positions and sizes are recomputed from scratch with a running byte
//! cursor, so the result is ready for [`crate::container::write_banks`]
//! without further fixups.  Lookups are relational — every source slot is
//! resolved by `(bank number, registration number)` against the original
//! list at this point and nowhere else.

use log::debug;

use crate::error::ReferenceError;
use crate::layout::{BANK_HEADER_SIZE, EMPTY_REG_SPAN, FIRST_BANK_POSITION, REG_RECORD_EXTRA};
use crate::map::{MapBank, MapSlot};
use crate::model::{Bank, Registration};

/// Resolve a plan against the original model.
///
/// Fails with a [`ReferenceError`] before producing anything if any slot
/// cites a bank or registration number the original model doesn't have.
pub fn rearrange_banks(original: &[Bank], plan: &[MapBank]) -> Result<Vec<Bank>, ReferenceError> {
    let mut banks = Vec::with_capacity(plan.len());
    let mut position = FIRST_BANK_POSITION;

    for map_bank in plan {
        let mut bank = Bank {
            number: map_bank.number,
            name: map_bank.name.clone(),
            position,
            size: BANK_HEADER_SIZE,
            registrations: Vec::with_capacity(map_bank.slots.len()),
        };

        for (slot, entry) in map_bank.slots.iter().enumerate() {
            let number = slot as u8;
            match entry {
                MapSlot::Empty => {
                    bank.size += EMPTY_REG_SPAN;
                    bank.registrations.push(Registration::empty_slot(number));
                }
                MapSlot::Source { bank: src_bank, registration: src_reg, name } => {
                    let source = resolve(original, *src_bank, *src_reg)?;
                    bank.size += source.size + REG_RECORD_EXTRA;
                    bank.registrations.push(Registration {
                        number,
                        empty: source.empty,
                        name: name.clone(),
                        size: source.size,
                        head: source.head,
                        data: source.data.clone(),
                    });
                }
            }
        }

        debug!(
            "bank {:02} '{}' at {:#06x}, {} bytes",
            bank.number, bank.name, bank.position, bank.size
        );
        position += bank.size;
        banks.push(bank);
    }

    Ok(banks)
}

fn resolve(original: &[Bank], bank: u8, registration: u8) -> Result<&Registration, ReferenceError> {
    let source_bank = original
        .iter()
        .find(|b| b.number == bank)
        .ok_or(ReferenceError::BankNotFound(bank))?;
    source_bank
        .registrations
        .iter()
        .find(|r| r.number == registration)
        .ok_or(ReferenceError::RegistrationNotFound { bank, registration })
}
