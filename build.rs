use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
	let root_dir: PathBuf = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?);

	println!("cargo::rerun-if-changed=cbindgen.toml");
	println!("cargo::rerun-if-changed=src/c_interface.rs");

	cbindgen::Builder::new()
		.with_config(cbindgen::Config::from_file(root_dir.join("cbindgen.toml"))?)
		.with_crate(&root_dir)
		.generate()?
		.write_to_file(root_dir.join("include").join("fa_workbench.h"));

	Ok(())
}
