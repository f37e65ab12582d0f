/// `CARGO_PKG_VERSION` plus the compiling OS/arch, analogous to `java -version`'s
/// one-line banner. Uses `std::env::consts` rather than probing the running system,
/// since this is purely informational and not used to pick a class library variant.
#[must_use]
pub fn full() -> String {
    format!(
        "cobalt {} ({}/{})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
