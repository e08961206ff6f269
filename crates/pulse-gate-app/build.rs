use std::fs;
use std::path::Path;

fn main() {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let version_path = Path::new(&manifest_dir).join("../../VERSION");

    println!("cargo:rerun-if-changed={}", version_path.display());

    let version = fs::read_to_string(&version_path).expect("root VERSION file is readable");
    let version = version.trim();
    assert!(!version.is_empty(), "VERSION file must be non-empty");

    println!("cargo:rustc-env=PULSE_GATE_VERSION={version}");
}
