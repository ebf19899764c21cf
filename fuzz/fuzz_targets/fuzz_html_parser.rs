#![no_main]

use libfuzzer_sys::fuzz_target;
use quire_editor::{from_html, to_html};

fuzz_target!(|data: &[u8]| {
    let Ok(html) = std::str::from_utf8(data) else {
        return;
    };
    if html.len() > 4096 {
        return;
    }

    let doc = from_html(html);
    assert!(!doc.blocks().is_empty(), "parser produced no blocks");

    // Serializing and re-parsing our own output must never panic either.
    let again = from_html(&to_html(&doc));
    assert!(!again.blocks().is_empty());
});
