//! Payload byte patcher: overwrite a fixed range in every non-empty
//! registration across all banks.
//!
//! The caller-supplied offset is relative to the start of the registration
//! record, so the fixed 32-byte header is subtracted before indexing into
//! the payload.  Offsets below 32 are rejected upstream by the CLI — they
//! would land inside the header.

use log::debug;

use crate::layout::REG_HEADER_SIZE;
use crate::model::Bank;

/// Splice `replacement` into every non-empty registration's payload at
/// `offset` (record-relative, ≥ 32).  Each patched registration gets a fresh
/// buffer; empty slots are left alone.  The replacement is always written in
/// full, so a range reaching past the end of a payload grows it.
pub fn patch_banks(banks: &mut [Bank], offset: u64, replacement: &[u8]) {
    debug_assert!(offset >= REG_HEADER_SIZE as u64);
    let start = (offset as usize) - REG_HEADER_SIZE;
    let end = start + replacement.len();
    let mut patched = 0usize;

    for bank in banks.iter_mut() {
        for registration in bank.registrations.iter_mut() {
            if registration.empty {
                continue;
            }
            let data = &registration.data;
            let head_end = start.min(data.len());
            let tail_start = end.min(data.len());

            let mut next = Vec::with_capacity(head_end + replacement.len() + data.len() - tail_start);
            next.extend_from_slice(&data[..head_end]);
            next.extend_from_slice(replacement);
            next.extend_from_slice(&data[tail_start..]);
            registration.data = next;
            patched += 1;
        }
    }
    debug!("patched {} registration(s) at payload offset {}", patched, start);
}
