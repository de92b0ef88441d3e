use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let Ok(crate_dir) = env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let header = PathBuf::from(&crate_dir).join("include").join("query_ffi.h");

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("QUERY_FFI_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(header);
        }
        Err(e) => println!("cargo:warning=header generation skipped: {e}"),
    }
}
