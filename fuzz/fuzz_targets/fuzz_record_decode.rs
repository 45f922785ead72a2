#![no_main]
use chipngo_cart::{CartridgeRecord, BLOCK_SIZE, START_BYTE};
use libfuzzer_sys::fuzz_target;

// Any 512-byte block decodes; only the start byte decides emptiness
fuzz_target!(|data: &[u8]| {
    let mut block = [0u8; BLOCK_SIZE];
    let n = data.len().min(BLOCK_SIZE);
    block[..n].copy_from_slice(&data[..n]);

    let record = CartridgeRecord::decode(0, &block).expect("512-byte blocks always decode");
    assert_eq!(record.valid, block[0] == START_BYTE);

    if data.len() != BLOCK_SIZE {
        assert!(CartridgeRecord::decode(0, data).is_err());
    }
});
