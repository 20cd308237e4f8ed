//! `mcc fingerprint` – show the headers a request would carry.

use mcc_core::config::MccConfig;

pub fn run_fingerprint(cfg: &MccConfig) {
    for (name, value) in cfg.fingerprint_profile().collect() {
        println!("{name}: {value}");
    }
}
