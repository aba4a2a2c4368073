//! Fuzz testing for API key parsing and authentication.
//!
//! Ensures that key handling never panics on arbitrary input:
//!
//! - `KeyStore::load` / `KeyStore::from_source` on any key list
//! - `authorize` on any header value, UTF-8 or not
//! - `key_prefix` / `key_suffix` on multi-byte characters
//!
//! # Running the Fuzz Tests
//!
//! ```bash
//! cargo +nightly install cargo-fuzz
//! cargo +nightly fuzz run fuzz_api_keys
//! cargo +nightly fuzz run fuzz_api_keys -- -max_total_time=60
//! ```

#![no_main]

use arbitrary::Arbitrary;
use axum::http::{HeaderMap, HeaderValue};
use gmass_webhook::KeyStore;
use gmass_webhook::keys::{key_prefix, key_suffix};
use gmass_webhook::middleware::{API_KEY_HEADER, authorize};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    source: &'a str,
    header: &'a [u8],
}

fuzz_target!(|input: Input<'_>| {
    let keys = KeyStore::load(input.source);
    let _ = KeyStore::from_source(input.source);

    for key in input.source.split(',') {
        // Every parsed token is a member
        assert!(keys.contains(key.as_bytes()));
        assert!(key.starts_with(key_prefix(key)));
        assert!(key.ends_with(key_suffix(key)));
    }

    // Not every byte string is a legal header value
    if let Ok(value) = HeaderValue::from_bytes(input.header) {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, value);

        if let Ok(key) = authorize(&keys, &headers) {
            assert!(!key.as_str().is_empty());
            assert!(keys.contains(key.as_str().as_bytes()));
        }
    }
});
