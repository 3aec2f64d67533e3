#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok((value, len)) = tessera_cbor::decode(data) {
        assert!(len > 0 && len <= data.len());
        _ = format!("{value}");
    }
});
