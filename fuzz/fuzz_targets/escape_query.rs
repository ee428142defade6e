#![no_main]
use libfuzzer_sys::fuzz_target;
use urikit::{Builder, Options};

fuzz_target!(|data: &str| {
    let Ok(b) = Builder::with_options(Options::new(data).with_escape_query(true)) else {
        return;
    };
    let once = b.raw_query();
    b.escape_query();
    assert_eq!(once, b.raw_query());
});
