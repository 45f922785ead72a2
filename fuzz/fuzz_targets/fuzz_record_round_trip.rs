#![no_main]
use arbitrary::Arbitrary;
use chipngo_cart::{ButtonMap, CartridgeRecord, Quirks, RecordFormat, RecordOptions};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    legacy: bool,
    title: String,
    cpu_freq: u32,
    timer_freq: u8,
    display_freq: u8,
    quirks: u8,
    maps: [u16; 6],
    user_flags: [u8; 16],
}

fuzz_target!(|input: Input| {
    let format = if input.legacy {
        RecordFormat::Legacy
    } else {
        RecordFormat::Sentinel
    };
    let options = RecordOptions {
        format,
        ..Default::default()
    };

    let mut record = CartridgeRecord::new(0, input.title);
    record.cpu_freq = input.cpu_freq;
    record.timer_freq = input.timer_freq;
    record.display_freq = input.display_freq;
    record.quirks = Quirks::from_bits(input.quirks);
    record.left = ButtonMap::from_bits(input.maps[0]);
    record.right = ButtonMap::from_bits(input.maps[1]);
    record.up = ButtonMap::from_bits(input.maps[2]);
    record.down = ButtonMap::from_bits(input.maps[3]);
    record.a = ButtonMap::from_bits(input.maps[4]);
    record.b = ButtonMap::from_bits(input.maps[5]);
    record.user_flags = input.user_flags;

    // Non-ASCII titles are rejected, everything else must round-trip
    let Ok(block) = record.encode_block(&options) else {
        return;
    };
    let decoded = CartridgeRecord::decode(0, &block).unwrap();

    assert!(decoded.valid);
    assert_eq!(decoded.cpu_freq, record.cpu_freq);
    assert_eq!(decoded.quirks, record.quirks);
    assert_eq!(decoded.button_maps(), record.button_maps());
    assert!(record.title.starts_with(decoded.title.as_str()));
});
