//! Command implementations

pub mod apply;
pub mod convert;
pub mod create;
pub mod info;
pub mod verify;

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use n64_patch::{PipelineConfig, ProfileTable};

/// Default location of the profile table, resolved against the working directory
pub const DEFAULT_PROFILE_FILE: &str = "profiles.yaml";

/// A check ran to completion and the input did not pass it
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CheckFailed(pub String);

/// Options selecting the expected profiles
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Profile table (YAML) with expected base/target digests
    #[arg(long, env = "N64_PATCHER_PROFILES", default_value = DEFAULT_PROFILE_FILE)]
    pub profiles: PathBuf,

    /// Title to use when the table holds more than one
    #[arg(short, long)]
    pub title: Option<String>,

    /// Revision of the title
    #[arg(long, requires = "title")]
    pub revision: Option<String>,
}

impl ProfileArgs {
    /// Load the table from disk
    pub fn load_table(&self) -> Result<ProfileTable> {
        load_table(&self.profiles)
    }

    /// Load the table and pick the configured title
    pub fn load_config(&self) -> Result<PipelineConfig> {
        let table = self.load_table()?;
        let entry = table
            .select(self.title.as_deref(), self.revision.as_deref())
            .context("Failed to select a title profile")?;
        log::info!("Using profile {entry}");
        Ok(PipelineConfig::from(entry))
    }
}

fn load_table(path: &Path) -> Result<ProfileTable> {
    ProfileTable::from_path(path)
        .with_context(|| format!("Failed to load profile table {}", path.display()))
}
