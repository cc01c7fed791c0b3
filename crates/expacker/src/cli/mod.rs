use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;

use expacker::{BuildTarget, Packer, PackerConfig};
use expacker_utils::{fmt::Label, path::get_current_dir};

/// ExPacker, packages a Python script into a standalone executable
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base launcher to build against, -con or -win
    #[arg(allow_hyphen_values = true)]
    mode: String,
    /// Path to the script to package
    script: PathBuf,
    /// Output file path, defaults to the script name with an .exe suffix
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Path to an expacker.toml file, defaults to the one in the current directory
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    pub fn run(self) -> Result<ExitCode> {
        let Ok(target) = self.mode.parse::<BuildTarget>() else {
            println!("{} Invalid mode '{}'", Label::Error, self.mode);
            println!("Parameters:");
            for target in BuildTarget::ALL {
                println!("    {:<6}{target} launcher", target.flag());
            }
            return Ok(ExitCode::FAILURE);
        };

        let cwd = get_current_dir().context("Failed to get current directory")?;
        let config = PackerConfig::discover(self.config.as_deref(), &cwd)
            .context("Failed to load configuration")?;

        let mut packer = Packer::new(config.launcher(target)).with_search_paths(config.search_paths());
        if let Some(output) = self.output {
            packer = packer.with_output(output);
        }

        println!(
            "{} Packaging '{}' with the {target} launcher",
            Label::Info,
            self.script.display()
        );

        let outcome = packer
            .pack(&self.script)
            .with_context(|| format!("Failed to package '{}'", self.script.display()))?;

        for module in outcome.resolution.without_files() {
            println!(
                "{} Module {} is a {}, nothing to embed.",
                Label::Info,
                module.name(),
                module.kind()
            );
        }
        for miss in outcome.resolution.misses() {
            println!("{} {miss}", Label::Warn);
        }

        println!(
            "{} Executable created as {}",
            Label::Done,
            outcome.artifact.path().display()
        );

        Ok(ExitCode::SUCCESS)
    }
}
