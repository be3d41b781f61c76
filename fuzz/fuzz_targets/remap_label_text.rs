//! Fuzz target for label-text remapping.
//!
//! This fuzzer feeds arbitrary UTF-8 label files to the remapper,
//! checking for panics, crashes, or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use relabel::remap::fuzz_remap_label_text;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };

    fuzz_remap_label_text(content);
});
