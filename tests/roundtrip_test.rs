use regbank::backup::{open_backup, save_backup, REGIST_FILE};
use regbank::layout::{BANK_HEADER_SIZE, FIRST_BANK_POSITION, REG_HEADER_SIZE};
use regbank::manifest::MANIFEST_FILE;
use regbank::{
    read_banks, read_map, rearrange_banks, write_banks, write_map, Bank, FormatError,
    ReferenceError, Registration,
};
use std::io::Cursor;
use tempfile::tempdir;

fn registration(number: u8, name: &str, payload: Vec<u8>) -> Registration {
    Registration {
        number,
        empty: false,
        name: name.to_string(),
        size: payload.len() as u32 + 22,
        head: [0u8; REG_HEADER_SIZE],
        data: payload,
    }
}

fn bank(number: u8, name: &str, position: u32, registrations: Vec<Registration>) -> Bank {
    let size = BANK_HEADER_SIZE + registrations.iter().map(Registration::span).sum::<u32>();
    Bank { number, name: name.to_string(), position, size, registrations }
}

/// Two banks with mixed empty and populated slots, positioned back to back.
fn sample_banks() -> Vec<Bank> {
    let first = bank(
        0,
        "Stage Set",
        FIRST_BANK_POSITION,
        vec![
            registration(0, "Opener", vec![0x10; 304]),
            Registration::empty_slot(1),
            registration(2, "Ballad", vec![0x22; 551]),
            Registration::empty_slot(3),
            Registration::empty_slot(4),
            Registration::empty_slot(5),
            Registration::empty_slot(6),
            Registration::empty_slot(7),
        ],
    );
    let second_position = first.position + first.size;
    let second = bank(
        5,
        "Rehearsal",
        second_position,
        vec![
            registration(0, "Warmup", vec![0x33; 64]),
            Registration::empty_slot(1),
            Registration::empty_slot(2),
            Registration::empty_slot(3),
            Registration::empty_slot(4),
            Registration::empty_slot(5),
            Registration::empty_slot(6),
            Registration::empty_slot(7),
        ],
    );
    vec![first, second]
}

fn encode(banks: &[Bank]) -> Vec<u8> {
    let mut bytes = Vec::new();
    write_banks(banks, &mut bytes).unwrap();
    bytes
}

#[test]
fn binary_roundtrip() {
    let banks = sample_banks();
    let bytes = encode(&banks);
    let decoded = read_banks(&mut Cursor::new(&bytes)).unwrap();

    assert_eq!(decoded.len(), 2);
    for (original, result) in banks.iter().zip(&decoded) {
        assert_eq!(result.number, original.number);
        assert_eq!(result.name, original.name);
        assert_eq!(result.position, original.position);
        assert_eq!(result.size, original.size);
        assert_eq!(result.registrations.len(), 8);

        for (a, b) in original.registrations.iter().zip(&result.registrations) {
            assert_eq!(b.number, a.number);
            assert_eq!(b.empty, a.empty);
            assert_eq!(b.name, a.name);
            if a.is_present() {
                assert_eq!(b.size, a.size);
                assert_eq!(b.data, a.data);
            }
        }
    }

    // Decoding what we re-encode gives identical payloads again.
    let bytes_again = encode(&decoded);
    assert_eq!(bytes, bytes_again);
}

#[test]
fn size_field_implies_payload_length() {
    let banks = sample_banks();
    let decoded = read_banks(&mut Cursor::new(encode(&banks))).unwrap();
    let opener = &decoded[0].registrations[0];
    assert_eq!(opener.size, 326);
    assert_eq!(opener.data.len(), 304);
}

#[test]
fn empty_slot_is_canonical_on_disk() {
    let banks = sample_banks();
    let bytes = encode(&banks);

    // Bank 0's slot 1 record: bank header, then the slot-0 record (6 + 4 + 6
    // + 16 + 304 bytes), then the empty record.
    let record = FIRST_BANK_POSITION as usize + 48 + 336;
    assert_eq!(&bytes[record..record + 6], b"REG001");
    assert_eq!(&bytes[record + 6..record + 10], &573u32.to_be_bytes());
    assert!(bytes[record + 10..record + 10 + 573].iter().all(|&b| b == 0));
}

#[test]
fn unnamed_registration_is_written_as_empty() {
    // The encoder keys emptiness off the name, not the empty flag.
    let mut banks = sample_banks();
    banks[0].registrations[0].name.clear();
    // Keep the model self-consistent: an unnamed slot spans 583 bytes.
    banks[0].size = BANK_HEADER_SIZE
        + banks[0].registrations.iter().map(Registration::span).sum::<u32>();
    banks[1].position = banks[0].position + banks[0].size;

    let decoded = read_banks(&mut Cursor::new(encode(&banks))).unwrap();
    let slot = &decoded[0].registrations[0];
    assert!(slot.empty);
    assert_eq!(slot.name, "");
    assert_eq!(slot.size, 573);
}

#[test]
fn bad_magic_is_rejected() {
    let mut bytes = encode(&sample_banks());
    bytes[0] = 0x42;
    assert!(matches!(
        read_banks(&mut Cursor::new(&bytes)),
        Err(FormatError::BadMagic(_))
    ));
}

#[test]
fn truncated_index_is_rejected() {
    let bytes = encode(&sample_banks());
    assert!(matches!(
        read_banks(&mut Cursor::new(&bytes[..100])),
        Err(FormatError::Truncated(_))
    ));
}

#[test]
fn map_roundtrip_reproduces_the_model() {
    let banks = sample_banks();

    let mut text = Vec::new();
    write_map(&banks, &mut text).unwrap();
    let plan = read_map(&text[..]).unwrap();
    let rebuilt = rearrange_banks(&banks, &plan).unwrap();

    assert_eq!(rebuilt.len(), banks.len());
    for (original, result) in banks.iter().zip(&rebuilt) {
        assert_eq!(result.number, original.number);
        assert_eq!(result.name, original.name);
        assert_eq!(result.registrations.len(), 8);
        for (a, b) in original.registrations.iter().zip(&result.registrations) {
            if a.is_present() {
                assert_eq!(b.name, a.name);
                assert_eq!(b.data, a.data);
            } else {
                assert!(!b.is_present());
            }
        }
    }
}

#[test]
fn map_rendering_is_deterministic() {
    let banks = sample_banks();
    let mut text = Vec::new();
    write_map(&banks, &mut text).unwrap();
    let text = String::from_utf8(text).unwrap();

    let lines: Vec<&str> = text.lines().collect();
    // Two banks: 2 × (1 header + 8 slots + blank separator).
    assert_eq!(lines.len(), 20);
    assert_eq!(lines[0], "01|N|Stage Set");
    assert_eq!(lines[1], "01|1|Opener");
    assert_eq!(lines[2], "01|2|");
    assert_eq!(lines[3], "01|3|Ballad");
    assert_eq!(lines[9], "");
    assert_eq!(lines[10], "06|N|Rehearsal");
    assert_eq!(lines[11], "06|1|Warmup");
}

#[test]
fn edited_map_moves_registrations_across_banks() {
    let banks = sample_banks();
    let map = "01|N|Combined\n\
               01|1|Opener\n\
               06|1|Warmup Moved\n\
               01|3|Ballad\n";
    let plan = read_map(map.as_bytes()).unwrap();
    let rebuilt = rearrange_banks(&banks, &plan).unwrap();

    assert_eq!(rebuilt.len(), 1);
    let combined = &rebuilt[0];
    assert_eq!(combined.position, FIRST_BANK_POSITION);
    assert_eq!(combined.registrations.len(), 8);
    assert_eq!(combined.registrations[1].name, "Warmup Moved");
    assert_eq!(combined.registrations[1].data, banks[1].registrations[0].data);
    assert_eq!(combined.registrations[2].name, "Ballad");
    assert!(combined.registrations[3].empty);

    // The rebuilt container decodes cleanly.
    let decoded = read_banks(&mut Cursor::new(encode(&rebuilt))).unwrap();
    assert_eq!(decoded[0].registrations[1].name, "Warmup Moved");
}

#[test]
fn dangling_reference_aborts_before_output() {
    let banks = sample_banks();
    let plan = read_map("01|N|Broken\n05|3|Ghost\n".as_bytes()).unwrap();
    assert!(matches!(
        rearrange_banks(&banks, &plan),
        Err(ReferenceError::BankNotFound(4))
    ));
}

#[test]
fn backup_directory_roundtrip_with_manifest() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("NEW_BACKUP");

    let banks = sample_banks();
    save_backup(&output, &banks).unwrap();

    assert!(output.join(REGIST_FILE).exists());
    let manifest = std::fs::read_to_string(output.join(MANIFEST_FILE)).unwrap();
    assert!(manifest.contains("TOTAL FILE NUM:2\r\n"));
    assert!(manifest.contains("1 = Stage Set       00.reg\r\n"));
    assert!(manifest.contains("2 = Rehearsal       05.reg\r\n"));

    let reopened = open_backup(&output).unwrap();
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened[0].registrations[0].data, banks[0].registrations[0].data);
}

#[test]
fn existing_directory_gets_no_manifest() {
    let dir = tempdir().unwrap();
    save_backup(dir.path(), &sample_banks()).unwrap();
    assert!(dir.path().join(REGIST_FILE).exists());
    assert!(!dir.path().join(MANIFEST_FILE).exists());
}
