#![no_main]
use libfuzzer_sys::fuzz_target;

use flash_swf::bits::BitReader;
use flash_swf::tag::TagHeader;

fuzz_target!(|data: &[u8]| {
    let _ = TagHeader::read(&mut BitReader::new(data));
});
