use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds only run the unit tests; nothing to link.
    let target = env::var("TARGET").unwrap_or_default();
    if !target.contains("avr") {
        return;
    }

    println!("cargo:rustc-link-arg=-mmcu=atmega4809");

    // The boot section has to fit in front of BOOTEND; keep the linker honest.
    println!("cargo:rustc-link-arg=-Wl,--gc-sections");

    println!("cargo:warning=Building XMODEM bootloader for ATmega4809");
}
