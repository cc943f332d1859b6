//! Terminal output for apply runs

use console::Style;
use miette::Diagnostic;

use super::{ApplyReporter, PatchContext};
use crate::domain::{BatchResult, PatchDescriptor};
use crate::error::RepatchError;

/// Reporter writing styled messages to the terminal
///
/// Successes go to stdout, warnings and errors to stderr.
pub struct ConsoleReporter {
    reverse: bool,
}

impl ConsoleReporter {
    pub fn new(reverse: bool) -> Self {
        Self { reverse }
    }

    /// Package to recreate the patch for
    fn regenerate_target(descriptor: &PatchDescriptor) -> String {
        Style::new()
            .bold()
            .apply_to(&descriptor.path_specifier)
            .to_string()
    }
}

impl ApplyReporter for ConsoleReporter {
    fn no_patches_found(&mut self, patches_dir: &str) {
        eprintln!(
            "{} in {}",
            Style::new().red().apply_to("No patch files found"),
            patches_dir
        );
    }

    fn unrecognized_patch_file(&mut self, filename: &str) {
        eprintln!(
            "{} Unrecognized patch file in patches directory {}",
            Style::new().yellow().apply_to("Warning:"),
            filename
        );
    }

    fn skipped_dev_only(&mut self, descriptor: &PatchDescriptor) {
        println!(
            "Skipping dev-only {}@{} {}",
            Style::new().bold().apply_to(&descriptor.human_readable_path_specifier),
            descriptor.version,
            Style::new().blue().apply_to("✔")
        );
    }

    fn applied(&mut self, descriptor: &PatchDescriptor) {
        let verb = if self.reverse { "Reversed " } else { "" };
        println!(
            "{}{}@{} {}",
            verb,
            Style::new().bold().apply_to(&descriptor.human_readable_path_specifier),
            descriptor.version,
            Style::new().green().apply_to("✔")
        );
    }

    fn version_mismatch(&mut self, ctx: &PatchContext<'_>) {
        let bold = Style::new().bold();
        eprintln!(
            "\n{} version mismatch for {}\n\n  \
             The patch was still {} successfully.\n\n  \
             Patch file created for\n\n    {}@{}\n\n  \
             applied to\n\n    {}@{}\n\n  \
             At path\n\n    {}\n\n  \
             Check that the package still behaves as expected, then recreate the patch\n  \
             against the installed version to make this warning go away.\n",
            Style::new().red().apply_to("Warning:"),
            ctx.patch_location(),
            if self.reverse { "reversed" } else { "applied" },
            ctx.descriptor.name,
            bold.apply_to(&ctx.descriptor.version),
            ctx.descriptor.name,
            bold.apply_to(ctx.installed_version),
            ctx.descriptor.path,
        );
    }

    fn broken_patch(&mut self, ctx: &PatchContext<'_>, detail: &str) {
        let red = Style::new().red();
        eprintln!(
            "\n{} {}\n\n    {}\n\n  \
             The following patch file cannot be {}:\n\n    {}\n\n  \
             Reason: {}\n\n  \
             Try removing node_modules and installing again. If that doesn't work, the\n  \
             patch file may have been changed by accident. Recreate it by editing the\n  \
             package files again and generating a new patch for:\n\n    {}\n",
            red.clone().bold().apply_to("**ERROR**"),
            red.apply_to(format!(
                "Failed to {} patch for package {} at path",
                if self.reverse { "reverse" } else { "apply" },
                Style::new().bold().apply_to(&ctx.descriptor.name)
            )),
            ctx.descriptor.path,
            if self.reverse { "reversed" } else { "applied" },
            ctx.patch_location(),
            detail,
            Self::regenerate_target(ctx.descriptor),
        );
    }

    fn drifted_dependency(&mut self, ctx: &PatchContext<'_>, detail: &str) {
        let red = Style::new().red();
        eprintln!(
            "\n{} {}\n\n    {}\n\n  \
             {} has changed since the patch file was made for it, and the\n  \
             changes conflict with the patch.\n\n  \
             If the patch is no longer needed, delete it. Otherwise make the file\n  \
             changes again and generate a new patch for:\n\n    {}\n\n  \
             Info:\n    \
             Patch file: {}\n    \
             Patch was made for version: {}\n    \
             Installed version: {}\n    \
             Reason: {}\n",
            red.clone().bold().apply_to("**ERROR**"),
            red.apply_to(format!(
                "Failed to {} patch for package {} at path",
                if self.reverse { "reverse" } else { "apply" },
                Style::new().bold().apply_to(&ctx.descriptor.name)
            )),
            ctx.descriptor.path,
            Style::new().bold().apply_to(&ctx.descriptor.name),
            Self::regenerate_target(ctx.descriptor),
            ctx.patch_location(),
            Style::new().green().bold().apply_to(&ctx.descriptor.version),
            Style::new().red().bold().apply_to(ctx.installed_version),
            detail,
        );
    }

    fn descriptor_error(&mut self, _descriptor: &PatchDescriptor, error: &RepatchError) {
        eprintln!("{} {}", Style::new().red().apply_to("Error:"), error);
        if let Some(help) = error.help() {
            eprintln!("\n  {help}\n");
        }
    }

    fn continuing_after_failure(&mut self) {
        eprintln!(
            "{} Option {} was set, moving on to next patch.",
            Style::new().yellow().apply_to("Warning:"),
            Style::new().bold().apply_to("--ignore-errors")
        );
    }

    fn summary(&mut self, result: &BatchResult) {
        let verb = if self.reverse { "reversed" } else { "applied" };
        let line = format!(
            "{} {verb}, {} skipped, {} failed",
            result.applied_count(),
            result.skipped_count(),
            result.failed_count()
        );
        if result.has_failed {
            eprintln!("\n{}", Style::new().red().apply_to(line));
        } else {
            println!("\n{}", Style::new().dim().apply_to(line));
        }
    }
}
