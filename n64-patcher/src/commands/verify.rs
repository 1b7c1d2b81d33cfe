//! Image identification against the profile table

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use n64_patch::io::read_file;
use n64_patch::{DigestKind, DigestSet, normalize};

use super::{CheckFailed, ProfileArgs};
use crate::utils::{create_spinner, fail_line, format_bytes, pass_line};

/// Arguments for `verify`
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// ROM image to identify (.z64, .v64 or .n64)
    pub image: PathBuf,

    /// Print digests without consulting the profile table
    #[arg(long)]
    pub digests_only: bool,

    #[command(flatten)]
    pub profile: ProfileArgs,
}

pub fn execute(args: VerifyArgs, quiet: bool) -> Result<()> {
    let raw = read_file(&args.image)
        .with_context(|| format!("Failed to read image {}", args.image.display()))?;

    let spinner = create_spinner("Computing digests...", quiet);
    let image = normalize(raw)?;
    let digests = DigestSet::compute(&image.data);
    spinner.finish_and_clear();

    let size = image.data.len() as u64;
    println!("Image: {}", args.image.display());
    println!("Size: {} ({size} bytes)", format_bytes(size));
    println!("Byte order: {}", image.detected);
    println!();
    println!("{digests}");

    if args.digests_only {
        return Ok(());
    }

    let table = args.profile.load_table()?;
    println!();

    // An explicit title narrows the check to that entry
    if args.profile.title.is_some() {
        let entry = table
            .select(args.profile.title.as_deref(), args.profile.revision.as_deref())
            .context("Failed to select a title profile")?;

        for (role, profile) in [("base", &entry.base), ("target", &entry.target)] {
            if profile.size == size && profile.matches(&digests) {
                profile.check_sha256(&format!("{entry} {role}"), &digests);
                println!("{}", pass_line(&format!("Matches {entry} {role} image")));
                return Ok(());
            }
        }

        for (role, profile) in [("base", &entry.base), ("target", &entry.target)] {
            let mut failed: Vec<&str> = profile
                .mismatches(&digests)
                .into_iter()
                .map(DigestKind::name)
                .collect();
            if profile.size != size {
                failed.insert(0, "size");
            }
            println!(
                "{}",
                fail_line(&format!("{entry} {role}: {} differ", failed.join(", ")))
            );
        }
        return Err(CheckFailed(format!("image does not match {entry}")).into());
    }

    match table.identify(size, &digests) {
        Some((entry, role)) => {
            entry
                .profile(role)
                .check_sha256(&format!("{entry} {role}"), &digests);
            println!("{}", pass_line(&format!("Matches {entry} {role} image")));
            Ok(())
        }
        None => {
            println!(
                "{}",
                fail_line(&format!(
                    "No match among {} title profile(s)",
                    table.len()
                ))
            );
            Err(CheckFailed(format!(
                "image does not match any profile in {}",
                args.profile.profiles.display()
            ))
            .into())
        }
    }
}
