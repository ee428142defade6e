#![no_main]
use libfuzzer_sys::fuzz_target;
use urikit::Uri;

fuzz_target!(|data: &str| {
    let Ok(uri) = Uri::parse(data) else {
        return;
    };
    let s = uri.to_string();
    let reparsed = Uri::parse(&s).unwrap();
    assert_eq!(s, reparsed.to_string());
});
