// Copies the demo page in `static/` to `dist/`, next to which `wasm-pack build
// --target web --out-dir dist/pkg` places the module.
use std::path::Path;

use fs_extra::dir::{self, CopyOptions};

fn main() {
    println!("cargo:rerun-if-changed=static");

    let static_dir = Path::new("static");
    if !static_dir.exists() {
        return;
    }
    let out_dir = Path::new("dist");
    if let Err(e) = dir::create_all(out_dir, false) {
        println!("cargo:warning=could not create dist/: {e}");
        return;
    }

    let options = CopyOptions::new().overwrite(true).content_only(true);
    if let Err(e) = dir::copy(static_dir, out_dir, &options) {
        println!("cargo:warning=copying static/ failed: {e}");
    }
}
