#![no_main]
use libfuzzer_sys::fuzz_target;

use flash_swf::read::Reader;
use flash_swf::write::write_to_bytes;

fuzz_target!(|data: &[u8]| {
    if let Ok(movie) = Reader::default().parse(data) {
        // Anything that reads must write again
        let _ = write_to_bytes(&movie).unwrap();
    }
});
