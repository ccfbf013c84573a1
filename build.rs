fn main() {
    // Only the device build needs the ESP-IDF environment; host test builds
    // run with `--no-default-features`.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
