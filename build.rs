use vergen::{BuildBuilder, Emitter};
use vergen_git2::Git2Builder;

// Exposes VERGEN_GIT_DESCRIBE for `--version`. Outside a git checkout the
// variable is left unset and the package version is shown instead.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = BuildBuilder::all_build()?;
    let mut emitter = Emitter::default();
    emitter.add_instructions(&build)?;

    let git2 = Git2Builder::default()
        .describe(true, true, None)
        .sha(true)
        .build();
    if let Ok(git2) = git2 {
        emitter.add_instructions(&git2)?;
    }

    emitter.emit()?;
    Ok(())
}
