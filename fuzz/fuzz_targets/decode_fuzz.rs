//! Decode fuzz target: feed arbitrary bytes to the decoder and the skipper.
//! Neither may panic; each returns Ok or a CodecError.
//! Build with: cargo fuzz run decode_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let inner = jcepack::Schema::from_tags([("x", 0), ("y", 1)]).expect("schema");
    let schema = jcepack::Schema::builder()
        .field("a", 0)
        .nested("n", 1, inner)
        .field("s", 2)
        .field("far", 200)
        .build()
        .expect("schema");
    let _ = jcepack::decode(data, &schema);
    let _ = jcepack::Codec::default().decode_elements(data);
    let _ = jcepack::struct_extent(data, 0, 100);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
