//! Fuzzing harness for config parsing
//!
//! Arbitrary input must never panic the parser or the validators.
//! Run with: cargo fuzz run config_parser

#![no_main]
use libfuzzer_sys::fuzz_target;
use storysnaps_config::Config;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = toml::from_str::<Config>(s) {
            let _ = config.validate();
            let _ = config.storage.resolve_data_dir();
        }
    }
});
