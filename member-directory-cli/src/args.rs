//! CLI argument definitions using clap
//!
//! - member-directory extract RSN.xlsx               # -> all_members.csv
//! - member-directory publish                        # all_members.csv -> public_members.csv
//! - member-directory publish in.csv out.csv --policy policy.json

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use member_directory::spreadsheet::DEFAULT_SHEET;

/// Full member list produced by `extract` and read by `publish`.
pub const DEFAULT_MEMBERS_FILE: &str = "all_members.csv";

/// Public feed written by `publish`.
pub const DEFAULT_PUBLIC_FILE: &str = "public_members.csv";

#[derive(Debug, Parser)]
#[command(name = "member-directory")]
#[command(about = "Build the public member directory feed from the membership spreadsheet")]
#[command(version)]
pub struct Cli {
    /// More log output (repeat for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert a workbook sheet to CSV, replacing linked cells with their URL
    Extract {
        /// Workbook to read (.xlsx)
        workbook: PathBuf,

        /// CSV file to write
        #[arg(default_value = DEFAULT_MEMBERS_FILE)]
        output: PathBuf,

        /// Sheet to extract; falls back to the first sheet if absent
        #[arg(long, default_value = DEFAULT_SHEET)]
        sheet: String,
    },

    /// Build the privacy-filtered public CSV from the full member CSV
    Publish {
        /// Full member CSV
        #[arg(default_value = DEFAULT_MEMBERS_FILE)]
        input: PathBuf,

        /// Public CSV to write
        #[arg(default_value = DEFAULT_PUBLIC_FILE)]
        output: PathBuf,

        /// JSON policy overriding the built-in one
        #[arg(long, env = "MEMBER_DIRECTORY_POLICY")]
        policy: Option<PathBuf>,
    },
}
