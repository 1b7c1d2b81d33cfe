//! Verified patch application

use anyhow::{Result, bail};
use clap::Args;
use std::path::PathBuf;

use n64_patch::verify::{DEFAULT_PATCH_FILE, default_output_path};
use n64_patch::{PipelinePaths, VerificationPipeline};

use super::ProfileArgs;
use crate::utils::{create_spinner, pass_line};

/// Arguments for applying a patch
#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// Base ROM image (.z64, .v64 or .n64)
    #[arg(required = true)]
    pub input: Option<PathBuf>,

    /// Output image [default: patched.z64 next to the input]
    pub output: Option<PathBuf>,

    /// N64P patch container
    #[arg(short, long, default_value = DEFAULT_PATCH_FILE)]
    pub patch: PathBuf,

    #[command(flatten)]
    pub profile: ProfileArgs,
}

/// Run the verification pipeline and report the result
pub fn execute(args: ApplyArgs, quiet: bool) -> Result<()> {
    let Some(input) = args.input else {
        bail!("missing input image path");
    };
    let output = args.output.unwrap_or_else(|| default_output_path(&input));

    let config = args.profile.load_config()?;
    let paths = PipelinePaths {
        input,
        patch: args.patch,
        output,
    };

    log::info!(
        "Patching {} with {} into {}",
        paths.input.display(),
        paths.patch.display(),
        paths.output.display()
    );

    let spinner = create_spinner("Verifying and patching...", quiet);
    let result = VerificationPipeline::new(config).execute(&paths);
    spinner.finish_and_clear();
    let report = result?;

    if quiet {
        return Ok(());
    }

    if report.converted() {
        println!(
            "{}",
            pass_line(&format!("Converted input from {}", report.detected))
        );
    } else {
        println!(
            "{}",
            pass_line(&format!("Input byte order: {}", report.detected))
        );
    }
    println!("{}", pass_line("Base image verified"));
    println!(
        "{}",
        pass_line(&format!("Applied {} records", report.records_applied))
    );
    println!("{}", pass_line("Output image verified"));
    println!();
    println!("{}", report.output_digests);
    println!();
    println!("Output written to: {}", paths.output.display());

    Ok(())
}
