#![no_main]
use libfuzzer_sys::fuzz_target;
use sdict::{Dictionary, SuccinctBitVector};

// Arbitrary bytes must either be rejected or load into a dictionary that
// answers queries without panicking.
fuzz_target!(|data: &[u8]| {
    let Ok(dict) = Dictionary::<SuccinctBitVector>::load(data) else {
        return;
    };
    let Ok(all) = dict.get_all_words("") else {
        return;
    };
    for hit in all.iter().take(64) {
        let _ = dict.get_value(&hit.word);
    }
    if let Ok(page) = dict.get_words("a", 1) {
        if let Some(cursor) = page.cursor {
            let _ = dict.get_more_words(cursor, 1);
        }
    }
});
