fn main() {
    uniffi::generate_scaffolding("src/pinmap.udl").unwrap();
}
