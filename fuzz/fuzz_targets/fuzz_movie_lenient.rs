#![no_main]
use libfuzzer_sys::fuzz_target;

use flash_swf::read::Reader;

fuzz_target!(|data: &[u8]| {
    let _ = Reader::lenient().parse(data);
});
