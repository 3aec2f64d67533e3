#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(items) = tessera_cbor::decode_all(data) else {
        return;
    };

    // Decoding item by item must agree with decoding the whole sequence
    let mut offset = 0;
    for item in items {
        let (value, len) = tessera_cbor::decode(&data[offset..]).unwrap();
        assert_eq!(value, item);
        offset += len;
    }
    assert_eq!(offset, data.len());
});
