use std::error::Error;

use vergen_gitcl::{CargoBuilder, Emitter, GitclBuilder};

fn main() -> Result<(), Box<dyn Error>> {
	let cargo = CargoBuilder::default().target_triple(true).build()?;
	let gitcl = GitclBuilder::default().sha(true).build()?;
	let mut emitter = Emitter::default();
	let with_git = emitter
		.fail_on_error()
		.add_instructions(&cargo)
		.and_then(|emitter| emitter.add_instructions(&gitcl))
		.and_then(|emitter| emitter.emit());

	// Packaged sources carry no git metadata.
	if with_git.is_err() {
		println!("cargo:rustc-env=VERGEN_GIT_SHA=crates.io");

		Emitter::default().add_instructions(&cargo)?.emit()?;
	}

	Ok(())
}
