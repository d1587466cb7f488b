use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tell Cargo to rerun this build script if the proto file changes
    let proto_file = "proto/campus.proto";
    println!("cargo:rerun-if-changed={}", proto_file);

    // #[sqlx::test] embeds the migrations at compile time
    println!("cargo:rerun-if-changed=migrations");

    // Use the vendored protoc unless the environment provides one
    if env::var_os("PROTOC").is_none() {
        env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .file_descriptor_set_path(out_dir.join("campus_descriptor.bin"))
        .compile(&[proto_file], &["proto"])?;

    Ok(())
}
