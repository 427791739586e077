//! Build script for vstage.
//!
//! Parses and validates the WGSL sources with naga so a broken shader fails
//! the build instead of the first pipeline creation.

use std::path::Path;

const SHADERS: &[&str] = &["shaders/passthrough.wgsl", "shaders/probe.wgsl"];

fn read(path: &str) -> String {
    println!("cargo:rerun-if-changed={}", path);
    std::fs::read_to_string(Path::new(path))
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e))
}

fn validate(label: &str, source: &str) {
    let module = naga::front::wgsl::parse_str(source).unwrap_or_else(|e| {
        panic!("WGSL parse error in {}:\n{}", label, e.emit_to_string(source))
    });

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    if let Err(e) = validator.validate(&module) {
        panic!("Validation error in {}:\n{}", label, e.emit_to_string(source));
    }
}

fn main() {
    let sources: Vec<String> = SHADERS.iter().map(|p| read(p)).collect();

    // The stage must stand on its own
    validate(SHADERS[0], &sources[0]);

    // The probe module is the stage with the probe fragment appended
    let probe = format!("{}\n{}", sources[0], sources[1]);
    validate("passthrough.wgsl + probe.wgsl", &probe);
}
