fn main() {
    // ESP-IDF environment is only needed for the on-target binary; host
    // builds and tests run without it.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
