#![no_main]
use libfuzzer_sys::fuzz_target;
use urikit::{
    pct_enc::{decode_query, encode_query},
    SpaceEncoding,
};

fuzz_target!(|data: &str| {
    let escaped = encode_query(data);
    for space in [
        SpaceEncoding::Unencoded,
        SpaceEncoding::PercentTwenty,
        SpaceEncoding::Plus,
    ] {
        let s = SpaceEncoding::Plus.transcode(&escaped, space);
        assert_eq!(data.as_bytes(), &*decode_query(&s).unwrap());
    }
});
