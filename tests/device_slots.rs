//! Slot-level tests against SD card images
//!
//! Verifies the on-device byte layout: where metadata and ROM payloads land,
//! what erase touches, and what a half-finished save leaves behind.

use chipngo_cart::{
    metadata_offset, rom_offset, CartError, CartridgeRecord, Geometry, Library, LibraryBuilder,
    Quirk, RecordFormat, RecordOptions, SlotDevice, BLOCK_SIZE, SLOT_SIZE, TRAILER,
};
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use tempfile::NamedTempFile;

/// Helper: fresh 25-slot image filled with a recognizable pattern
fn patterned_image() -> NamedTempFile {
    let temp = NamedTempFile::new().unwrap();
    let size = Geometry::default().device_size() as usize;
    let bytes: Vec<u8> = (0..size).map(|i| if i % SLOT_SIZE == 0 { 0 } else { 0x5A }).collect();
    std::fs::write(temp.path(), bytes).unwrap();
    temp
}

/// Helper: overwrite raw bytes at an absolute offset
fn poke(path: &std::path::Path, offset: u64, data: &[u8]) {
    let mut file = OpenOptions::new().write(true).open(path).unwrap();
    file.seek(SeekFrom::Start(offset)).unwrap();
    file.write_all(data).unwrap();
}

#[test]
fn test_octopeg_on_disk() {
    let temp = patterned_image();
    let mut library = LibraryBuilder::new()
        .path(temp.path())
        .options(RecordOptions {
            format: RecordFormat::Legacy,
            ..Default::default()
        })
        .build()
        .unwrap();

    let mut record = CartridgeRecord::new(0, "Octopeg");
    record.cpu_freq = 0;
    record.user_flags = [0; 16];
    library.save(0, &record, None).unwrap();

    let raw = std::fs::read(temp.path()).unwrap();
    let expected: [u8; 31] = [
        0xC8, 0x4F, 0x63, 0x74, 0x6F, 0x70, 0x65, 0x67, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x3C, 0x1E, 0x00, 0x00, 0x80, 0x02, 0x00, 0x00, 0x20, 0x01, 0x00, 0x00, 0x40, 0x00,
        0x40,
    ];
    assert_eq!(&raw[..31], &expected);

    // Bytes past the written prefix keep their old contents
    assert_eq!(raw[47], 0x5A);
    assert_eq!(raw[BLOCK_SIZE - 1], 0x5A);
}

#[test]
fn test_sentinel_prefix_leaves_rest_untouched() {
    let temp = patterned_image();
    let mut library = Library::open(temp.path()).unwrap();

    library
        .save(6, &CartridgeRecord::new(6, "MAZE"), None)
        .unwrap();

    let raw = std::fs::read(temp.path()).unwrap();
    let base = metadata_offset(6) as usize;
    assert_eq!(&raw[base + 31..base + 35], &TRAILER);
    assert_eq!(raw[base + 35], 0x5A);
    assert!(library.record(6).unwrap().complete);
}

#[test]
fn test_rom_lands_after_metadata_block() {
    let temp = patterned_image();
    let mut library = Library::open(temp.path()).unwrap();

    let rom: Vec<u8> = (0..200u8).collect();
    library
        .save(3, &CartridgeRecord::new(3, "IBM"), Some(&rom))
        .unwrap();

    let raw = std::fs::read(temp.path()).unwrap();
    let start = rom_offset(3) as usize;
    assert_eq!(start, 3 * 4096 + 512);
    assert_eq!(&raw[start..start + 200], &rom[..]);
    // The next slot is untouched
    assert_eq!(raw[metadata_offset(4) as usize + 1], 0x5A);
}

#[test]
fn test_erase_writes_exactly_one_zero_block() {
    let temp = patterned_image();
    let mut library = Library::open(temp.path()).unwrap();
    library
        .save(9, &CartridgeRecord::new(9, "UFO"), Some(&[0x12; 64]))
        .unwrap();

    let before = std::fs::read(temp.path()).unwrap();
    library.erase(9).unwrap();
    let after = std::fs::read(temp.path()).unwrap();

    let start = metadata_offset(9) as usize;
    assert!(after[start..start + BLOCK_SIZE].iter().all(|&b| b == 0));
    assert_eq!(&after[..start], &before[..start]);
    assert_eq!(&after[start + BLOCK_SIZE..], &before[start + BLOCK_SIZE..]);

    let mut device = SlotDevice::open(temp.path()).unwrap();
    let block = device.read_metadata_block(9).unwrap();
    assert!(!CartridgeRecord::decode(9, &block).unwrap().valid);
}

#[test]
fn test_reload_sees_external_changes() {
    let temp = patterned_image();
    let mut library = Library::open(temp.path()).unwrap();
    assert_eq!(library.occupied().count(), 0);

    poke(temp.path(), metadata_offset(12), &[0xC8, b'K', b'N', b'I', b'G', b'H', b'T']);
    library.load().unwrap();

    let record = library.record(12).unwrap();
    assert!(record.valid);
    assert!(!record.complete);
    // Title field is read whole; the 0x5A fill after the name is part of it
    assert!(record.title.starts_with("KNIGHT"));
    assert_eq!(record.title.len(), 11);
}

#[test]
fn test_metadata_survives_failed_rom_write() {
    let temp = patterned_image();
    let mut library = Library::open(temp.path()).unwrap();

    let mut record = CartridgeRecord::new(1, "SPLIT");
    record.quirks.set(Quirk::NoSpriteWrap, true);
    library.save(1, &record, Some(&[0xAA; 32])).unwrap();

    // Oversized ROM is rejected before anything is written
    let huge = vec![0xBB; 4000];
    let mut changed = record.clone();
    changed.title = "CHANGED".to_string();
    assert!(matches!(
        library.save(1, &changed, Some(&huge)),
        Err(CartError::RomTooLarge { .. })
    ));

    library.load().unwrap();
    assert_eq!(library.record(1).unwrap().title, "SPLIT");
    assert_eq!(library.dump_rom(1, 32).unwrap(), vec![0xAA; 32]);
}

#[test]
fn test_custom_geometry() {
    let temp = NamedTempFile::new().unwrap();
    let mut library = LibraryBuilder::new()
        .path(temp.path())
        .geometry(Geometry::new(2, 2).unwrap())
        .create_image()
        .build()
        .unwrap();

    assert_eq!(library.records().len(), 4);
    assert!(library.save(3, &CartridgeRecord::new(3, "LAST"), None).is_ok());
    assert!(matches!(
        library.save(4, &CartridgeRecord::new(4, "NOPE"), None),
        Err(CartError::SlotOutOfRange { slot: 4, count: 4 })
    ));
    assert_eq!(
        std::fs::metadata(temp.path()).unwrap().len(),
        4 * SLOT_SIZE as u64
    );
}

#[test]
fn test_read_only_rejects_writes() {
    let temp = patterned_image();
    let mut library = LibraryBuilder::new()
        .path(temp.path())
        .read_only()
        .build()
        .unwrap();

    assert_eq!(library.records().len(), 25);
    assert!(matches!(library.erase(0), Err(CartError::Io(_))));
}
