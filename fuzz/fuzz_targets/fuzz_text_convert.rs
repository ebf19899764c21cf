#![no_main]

use libfuzzer_sys::fuzz_target;
use quire_text::{html_to_text, text_to_html};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 4096 {
        return;
    }

    // Both directions must never panic, including on each other's output.
    let flattened = html_to_text(text);
    let wrapped = text_to_html(&flattened);
    let _ = html_to_text(&wrapped);
    let _ = html_to_text(&text_to_html(text));
});
