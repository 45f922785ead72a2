//! Property-based tests for the metadata codec
//!
//! Uses proptest to check that bit packing and record encoding hold their
//! invariants across random inputs

use chipngo_cart::{
    pack_bits, unpack_bits, ButtonMap, CartridgeRecord, Quirks, RecordFormat, RecordOptions,
    BLOCK_SIZE, START_BYTE,
};
use proptest::prelude::*;

fn arb_title(max: usize) -> impl Strategy<Value = String> {
    proptest::string::string_regex(&format!("[A-Z0-9 !-]{{1,{}}}", max)).unwrap()
}

fn arb_format() -> impl Strategy<Value = RecordFormat> {
    prop_oneof![Just(RecordFormat::Legacy), Just(RecordFormat::Sentinel)]
}

proptest! {
    #[test]
    fn prop_quirk_bits_round_trip(flags in prop::array::uniform8(any::<bool>())) {
        prop_assert_eq!(unpack_bits::<8>(pack_bits(&flags)), flags);
        prop_assert_eq!(Quirks::from_bits(Quirks::from_flags(flags).bits()).flags(), flags);
    }

    #[test]
    fn prop_button_bits_round_trip(keys in prop::array::uniform16(any::<bool>())) {
        prop_assert_eq!(unpack_bits::<16>(pack_bits(&keys)), keys);
        prop_assert_eq!(ButtonMap::from_bits(ButtonMap::from_keys(keys).bits()).keys(), keys);
    }

    #[test]
    fn prop_integer_round_trip(value in any::<u16>()) {
        prop_assert_eq!(pack_bits(&unpack_bits::<16>(value)), value);
    }

    #[test]
    fn prop_non_start_byte_is_empty(
        block in prop::collection::vec(any::<u8>(), BLOCK_SIZE),
        slot in 0usize..25
    ) {
        let mut block = block;
        if block[0] == START_BYTE {
            block[0] = 0;
        }
        let record = CartridgeRecord::decode(slot, &block).unwrap();
        prop_assert_eq!(record, CartridgeRecord::empty(slot));
    }

    #[test]
    fn prop_decode_accepts_any_block(block in prop::collection::vec(any::<u8>(), BLOCK_SIZE)) {
        prop_assert!(CartridgeRecord::decode(0, &block).is_ok());
    }

    #[test]
    fn prop_record_round_trip(
        format in arb_format(),
        title in arb_title(10),
        cpu_freq in any::<u32>(),
        timer_freq in any::<u8>(),
        display_freq in any::<u8>(),
        quirks in any::<u8>(),
        maps in prop::array::uniform6(any::<u16>()),
        user_flags in prop::array::uniform16(any::<u8>()),
    ) {
        // Trailing spaces survive; only NUL padding is stripped
        let mut record = CartridgeRecord::new(5, title);
        record.cpu_freq = cpu_freq;
        record.timer_freq = timer_freq;
        record.display_freq = display_freq;
        record.quirks = Quirks::from_bits(quirks);
        record.left = ButtonMap::from_bits(maps[0]);
        record.right = ButtonMap::from_bits(maps[1]);
        record.up = ButtonMap::from_bits(maps[2]);
        record.down = ButtonMap::from_bits(maps[3]);
        record.a = ButtonMap::from_bits(maps[4]);
        record.b = ButtonMap::from_bits(maps[5]);
        record.user_flags = user_flags;

        let options = RecordOptions { format, ..Default::default() };
        let block = record.encode_block(&options).unwrap();
        let decoded = CartridgeRecord::decode(5, &block).unwrap();

        prop_assert!(decoded.valid);
        prop_assert_eq!(&decoded.title, &record.title);
        prop_assert_eq!(decoded.cpu_freq, cpu_freq);
        prop_assert_eq!(decoded.timer_freq, timer_freq);
        prop_assert_eq!(decoded.display_freq, display_freq);
        prop_assert_eq!(decoded.quirks.bits(), quirks);
        prop_assert_eq!(decoded.button_maps(), record.button_maps());
        match format {
            RecordFormat::Legacy => {
                prop_assert_eq!(decoded.user_flags, user_flags);
            }
            RecordFormat::Sentinel => {
                prop_assert!(decoded.complete);
            }
        }
    }

    #[test]
    fn prop_long_titles_truncate_to_max(format in arb_format(), title in arb_title(30)) {
        let options = RecordOptions { format, ..Default::default() };
        let max = format.max_title_len();
        let bytes = CartridgeRecord::new(0, title.clone()).encode(&options).unwrap();

        let field = &bytes[1..12];
        let kept = title.len().min(max);
        prop_assert_eq!(&field[..kept], &title.as_bytes()[..kept]);
        prop_assert!(field[kept..].iter().all(|&b| b == 0));
    }
}
