//! Patch creation from a base/target image pair

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use n64_patch::io::{read_file, write_atomic};
use n64_patch::patch::DEFAULT_MERGE_GAP;
use n64_patch::verify::DEFAULT_PATCH_FILE;
use n64_patch::{
    ExpectedProfile, NormalizedImage, PatchBuilder, ProfileTable, TitleProfile, normalize,
};

use crate::utils::{create_spinner, format_bytes, pass_line};

/// Arguments for `create`
#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Unpatched ROM image
    pub base: PathBuf,

    /// Patched ROM image
    pub target: PathBuf,

    /// Path for the new N64P container
    #[arg(default_value = DEFAULT_PATCH_FILE)]
    pub output: PathBuf,

    /// Merge differing runs separated by fewer equal bytes than this
    #[arg(long, default_value_t = DEFAULT_MERGE_GAP)]
    pub merge_gap: usize,

    /// Also write a profile table describing both images
    #[arg(long, value_name = "PATH")]
    pub emit_profiles: Option<PathBuf>,

    /// Title recorded in the emitted profile table
    #[arg(long, default_value = "untitled", requires = "emit_profiles")]
    pub title: String,

    /// Revision recorded in the emitted profile table
    #[arg(long, default_value = "", requires = "emit_profiles")]
    pub revision: String,
}

fn load_image(path: &Path, role: &str) -> Result<NormalizedImage> {
    let raw = read_file(path)
        .with_context(|| format!("Failed to read {role} image {}", path.display()))?;
    let image = normalize(raw)?;
    if image.converted_from().is_some() {
        log::info!("Converted {role} image from {}", image.detected);
    }
    Ok(image)
}

pub fn execute(args: CreateArgs, quiet: bool) -> Result<()> {
    let base = load_image(&args.base, "base")?;
    let target = load_image(&args.target, "target")?;

    let spinner = create_spinner("Comparing images...", quiet);
    let result = PatchBuilder::new(&base.data, &target.data)
        .merge_gap(args.merge_gap)
        .build();
    spinner.finish_and_clear();
    let patch = result.context("Failed to build patch")?;

    let bytes = patch.to_bytes()?;
    write_atomic(&args.output, &bytes)
        .with_context(|| format!("Failed to write patch {}", args.output.display()))?;

    if !quiet {
        let summary = patch.summary();
        println!(
            "{}",
            pass_line(&format!(
                "Created {} with {} records ({} payload, {} on disk)",
                args.output.display(),
                summary.record_count,
                format_bytes(summary.payload_bytes),
                format_bytes(bytes.len() as u64)
            ))
        );
    }

    if let Some(path) = &args.emit_profiles {
        let table = ProfileTable::new(vec![TitleProfile {
            title: args.title.clone(),
            revision: args.revision.clone(),
            base: ExpectedProfile::from_image(&base.data),
            target: ExpectedProfile::from_image(&target.data),
        }])?;
        write_atomic(path, table.to_yaml_string()?.as_bytes())
            .with_context(|| format!("Failed to write profile table {}", path.display()))?;

        if !quiet {
            println!(
                "{}",
                pass_line(&format!("Wrote profile table {}", path.display()))
            );
        }
    }

    Ok(())
}
