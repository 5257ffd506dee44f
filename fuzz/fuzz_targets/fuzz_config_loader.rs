#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and validating arbitrary TOML must never panic.
    if let Ok(cfg) = smartbin_config::load_toml(data) {
        let _ = cfg.validate();
    }
});
