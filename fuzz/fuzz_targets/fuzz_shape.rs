#![no_main]
use libfuzzer_sys::fuzz_target;

use flash_swf::codec::{from_bytes, to_bytes};
use flash_swf::tag::TagCode;
use flash_swf::types::DefineShape;
use flash_swf::Context;

fuzz_target!(|data: &[u8]| {
    if let Some((&version, data)) = data.split_first() {
        let tag = match version % 4 {
            0 => TagCode::DefineShape,
            1 => TagCode::DefineShape2,
            2 => TagCode::DefineShape3,
            _ => TagCode::DefineShape4,
        };
        let mut context = Context::default();
        let mut scope = context.push_tag(tag);
        if let Ok(shape) = from_bytes::<DefineShape>(data, &mut scope) {
            let _ = to_bytes(&shape, &mut scope);
        }
    }
});
