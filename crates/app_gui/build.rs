use std::env;

fn main() {
    let version = env::var("VIEWER_VERSION")
        .or_else(|_| env::var("CARGO_PKG_VERSION"))
        .unwrap_or_default();
    println!("cargo:rustc-env=VIEWER_VERSION={version}");
    println!("cargo:rerun-if-env-changed=VIEWER_VERSION");
}
