//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DEFAULT_PATCH_DIR, ExecutionMode};

/// Repatch - post-install patches for dependencies
///
/// Applies the patch files stored in your project to installed packages.
#[derive(Parser, Debug)]
#[command(
    name = "repatch",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Apply stored patches to installed dependencies",
    long_about = "Repatch applies the patch files kept in your project's patches directory \
                  to the packages installed under node_modules, so local fixes to \
                  dependencies survive every install.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  repatch apply\n    \
                  repatch apply --reverse\n    \
                  repatch apply --ignore-errors --patch-dir fixes\n    \
                  repatch list"
)]
pub struct Cli {
    /// Application directory containing node_modules (defaults to current directory)
    #[arg(long, short = 'a', global = true, env = "REPATCH_APP_PATH")]
    pub app_path: Option<PathBuf>,

    /// Execution mode (defaults to NODE_ENV)
    #[arg(long, global = true, value_enum)]
    pub mode: Option<ExecutionMode>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply (or reverse) every stored patch
    Apply(ApplyArgs),

    /// List stored patches and the installed packages they target
    List(ListArgs),
}

/// Arguments for the apply command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Apply all patches:\n    repatch apply\n\n\
                  Undo all patches:\n    repatch apply --reverse\n\n\
                  Keep going after a failed patch:\n    repatch apply --ignore-errors\n\n\
                  Fail the build on errors (CI):\n    repatch apply --mode test")]
pub struct ApplyArgs {
    /// Undo the patches instead of applying them
    #[arg(long)]
    pub reverse: bool,

    /// Continue with the remaining patches when one fails
    #[arg(long)]
    pub ignore_errors: bool,

    /// Directory holding the patch files, relative to the application directory
    #[arg(long, value_name = "DIR", default_value = DEFAULT_PATCH_DIR)]
    pub patch_dir: String,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Directory holding the patch files, relative to the application directory
    #[arg(long, value_name = "DIR", default_value = DEFAULT_PATCH_DIR)]
    pub patch_dir: String,
}
