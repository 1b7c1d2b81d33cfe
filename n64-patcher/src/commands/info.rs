//! Patch container inspection

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use n64_patch::PatchContainer;
use n64_patch::verify::DEFAULT_PATCH_FILE;

use crate::utils::{add_table_row, create_table, format_bytes, format_offset};

/// Arguments for `info`
#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// N64P patch container
    #[arg(default_value = DEFAULT_PATCH_FILE)]
    pub patch: PathBuf,

    /// List individual records
    #[arg(short, long)]
    pub records: bool,

    /// Maximum number of records to list
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

pub fn execute(args: InfoArgs) -> Result<()> {
    let patch = PatchContainer::from_path(&args.patch)
        .with_context(|| format!("Failed to read patch {}", args.patch.display()))?;
    let summary = patch.summary();

    println!("N64P Patch Information");
    println!("======================");
    println!();
    println!("File: {}", args.patch.display());
    println!("Version: {}", patch.version);
    println!(
        "Container size: {} ({} bytes)",
        format_bytes(summary.encoded_len as u64),
        summary.encoded_len
    );
    println!();
    println!("Base image:");
    println!("  Size: {} ({} bytes)", format_bytes(patch.base_size as u64), patch.base_size);
    println!("  SHA-1: {}", patch.base_sha1_hex());
    println!("Target image:");
    println!(
        "  Size: {} ({} bytes)",
        format_bytes(patch.target_size as u64),
        patch.target_size
    );
    println!("  SHA-1: {}", patch.target_sha1_hex());
    println!();
    println!("Records: {}", summary.record_count);
    println!("  Payload: {}", format_bytes(summary.payload_bytes));
    println!("  Bytes covered: {}", format_bytes(summary.covered_bytes));
    if let (Some(low), Some(high)) = (summary.lowest_offset, summary.highest_end) {
        println!("  Span: {} - {}", format_offset(low), format_offset(high));
    }
    if summary.overlapping_records > 0 {
        println!("  Overlapping records: {}", summary.overlapping_records);
    }

    if args.records && !patch.records.is_empty() {
        println!();
        let mut table = create_table(&["#", "Offset", "End", "Length"]);
        for (index, record) in patch.records.iter().take(args.limit).enumerate() {
            add_table_row(
                &mut table,
                vec![
                    index.to_string(),
                    format_offset(record.offset as u64),
                    format_offset(record.end()),
                    record.length().to_string(),
                ],
            );
        }
        table.printstd();

        if patch.records.len() > args.limit {
            println!("... and {} more records", patch.records.len() - args.limit);
        }
    }

    Ok(())
}
