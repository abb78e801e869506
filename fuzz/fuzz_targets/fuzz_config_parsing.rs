//! Fuzz target for xferload.toml parsing.
//!
//! This fuzzer tests the TOML config parser to ensure:
//! 1. No input causes a panic
//! 2. Malformed TOML is gracefully rejected
//! 3. Configs that deserialize can be validated and turned into argv safely
//!
//! Run with: `cargo +nightly fuzz run fuzz_config_parsing`

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use xferload::config::HarnessConfig;

#[derive(Arbitrary, Debug)]
struct ConfigInput {
    /// Raw TOML string to test
    toml_string: String,
    /// Whether to inject adversarial patterns
    adversarial: Option<AdversarialPattern>,
}

#[derive(Arbitrary, Debug)]
enum AdversarialPattern {
    /// Very long strings
    LongStrings,
    /// Numeric overflows
    NumericOverflow,
    /// Unicode edge cases
    Unicode,
    /// Wrong value types in known keys
    TypeConfusion,
}

impl ConfigInput {
    fn build(&self) -> String {
        match &self.adversarial {
            None => self.toml_string.clone(),
            Some(AdversarialPattern::LongStrings) => {
                let long_value = "a".repeat(10000);
                format!(
                    "address = \"{long_value}\"\nserver = [\"{long_value}\"]\n\n[fixtures]\nextension = \"{long_value}\"\n"
                )
            },
            Some(AdversarialPattern::NumericOverflow) => {
                "port = 99999999999\nmax_transfer_size = -1\nmax_clients = 70000\n\n[shutdown]\nsettle_ms = 18446744073709551616\n"
                    .to_string()
            },
            Some(AdversarialPattern::Unicode) => {
                "address = \"\u{202e}127.0.0.1\"\ncontent_root = \"\u{0}books\"\n\n[fixtures]\nextension = \".p\u{fe0f}df\"\n"
                    .to_string()
            },
            Some(AdversarialPattern::TypeConfusion) => format!(
                "server = \"not-a-list\"\nport = \"55001\"\n[readiness]\nprobe = {:?}\n",
                self.toml_string
            ),
        }
    }
}

fuzz_target!(|input: ConfigInput| {
    let toml_str = input.build();

    if let Ok(config) = toml::from_str::<HarnessConfig>(&toml_str) {
        let _ = config.validate();
        let _ = config.probe_target();
        let _ = config.server_args();
        let _ = config.client_args("fixture.pdf");
        let _ = config.shutdown_policy();
    }
});
