//! Root CLI structure for n64-patcher

use clap::{Parser, Subcommand};

use crate::commands::apply::ApplyArgs;
use crate::commands::convert::ConvertArgs;
use crate::commands::create::CreateArgs;
use crate::commands::info::InfoArgs;
use crate::commands::verify::VerifyArgs;

#[derive(Parser, Debug)]
#[command(name = "n64-patcher")]
#[command(about = "Verified patching of Nintendo 64 ROM images", long_about = None)]
#[command(version)]
#[command(author)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct Cli {
    /// Subcommand to execute; patches `<input> [<output>]` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub apply: ApplyArgs,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify a base image, apply a patch and write the verified result
    Apply(ApplyArgs),

    /// Show the header and records of a patch container
    Info(InfoArgs),

    /// Compute digests of an image and identify it against the profile table
    Verify(VerifyArgs),

    /// Build a patch container from a base and a target image
    Create(CreateArgs),

    /// Rewrite an image in another byte order
    Convert(ConvertArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
