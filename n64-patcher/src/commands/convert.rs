//! Byte-order conversion

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use n64_patch::io::{read_file, write_atomic};
use n64_patch::{ByteOrder, normalize};

use crate::utils::pass_line;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderArg {
    /// Big-endian
    Z64,
    /// Byte-swapped
    V64,
    /// Word-reversed
    N64,
}

impl From<OrderArg> for ByteOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Z64 => ByteOrder::BigEndian,
            OrderArg::V64 => ByteOrder::ByteSwapped,
            OrderArg::N64 => ByteOrder::WordReversed,
        }
    }
}

/// Arguments for `convert`
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Source ROM image in any supported byte order
    pub input: PathBuf,

    /// Destination path
    pub output: PathBuf,

    /// Byte order to write
    #[arg(long, value_enum, default_value = "z64")]
    pub to: OrderArg,
}

pub fn execute(args: ConvertArgs, quiet: bool) -> Result<()> {
    let raw = read_file(&args.input)
        .with_context(|| format!("Failed to read image {}", args.input.display()))?;
    let image = normalize(raw)?;

    let order = ByteOrder::from(args.to);
    let converted = order.convert(&image.data)?;
    write_atomic(&args.output, &converted)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    if !quiet {
        println!(
            "{}",
            pass_line(&format!(
                "Converted {} ({}) to {} ({})",
                args.input.display(),
                image.detected,
                args.output.display(),
                order
            ))
        );
    }

    Ok(())
}
