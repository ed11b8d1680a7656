#![no_main]
use libfuzzer_sys::fuzz_target;

use flash_swf::codec::from_bytes;
use flash_swf::types::Bounds;
use flash_swf::Context;

fuzz_target!(|data: &[u8]| {
    let _ = from_bytes::<Bounds>(data, &mut Context::default());
});
