use vergen_git2::{Emitter, Git2Builder};

fn main() {
    // Git SHA is optional: tarball builds have no repository.
    match Git2Builder::all_git() {
        Ok(git) => match Emitter::default().add_instructions(&git) {
            Ok(emitter) => {
                if let Err(e) = emitter.emit() {
                    eprintln!("vergen failed: {}", e);
                }
            }
            Err(e) => eprintln!("vergen failed: {}", e),
        },
        Err(e) => eprintln!("vergen failed: {}", e),
    }

    let out_dir = std::env::var("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    let dest_path = std::path::Path::new(&out_dir).join("build_info.rs");

    let timestamp = chrono::Utc::now()
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string();

    std::fs::write(
        &dest_path,
        format!("pub const BUILD_VERSION: &str = \"{}\";\n", timestamp),
    )
    .expect("failed to write build_info.rs");

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=assets");
}
