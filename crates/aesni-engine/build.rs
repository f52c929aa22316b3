fn main() {
    println!("cargo:rustc-check-cfg=cfg(aesni_eligible)");
    println!("cargo:rerun-if-changed=build.rs");

    // The AES-NI round instructions only exist on x86 and x86_64.
    let target_arch = std::env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    if matches!(target_arch.as_str(), "x86" | "x86_64") {
        println!("cargo:rustc-cfg=aesni_eligible");
    }
}
