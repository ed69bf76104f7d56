//! Package command - assemble the exploded webapp

use console::style;
use std::path::Path;
use warpack_core::Packager;

use crate::error::Result;
use crate::util::{absolute, load_config, parse_define};

pub fn run(
    path: &Path,
    config: Option<&Path>,
    output: Option<&Path>,
    defines: &[String],
    list: bool,
) -> Result<()> {
    let mut config = load_config(path, config)?;

    if let Some(output) = output {
        config.webapp_directory = absolute(output)?;
        tracing::debug!("Output overridden to {}", config.webapp_directory.display());
    }
    for define in defines {
        let (key, value) = parse_define(define)?;
        config.filter_properties.insert(key, value);
    }

    println!(
        "{} {}",
        style("Packaging").cyan().bold(),
        config.base_dir.display()
    );

    let summary = Packager::from_config(&config)?.package()?;

    println!(
        "  {} {}",
        style("Created").green().bold(),
        summary.webapp_directory.display()
    );
    println!("  {} {} files", style("Packaged").dim(), summary.packaged.len());

    for archive in &summary.skipped_archives {
        println!(
            "  {} {} (unknown archive type)",
            style("Skipped").yellow().bold(),
            archive.display()
        );
    }

    if list {
        println!();
        println!("{}:", style("Contents").bold());
        for entry in &summary.packaged {
            println!("  {}", entry);
        }
    }

    Ok(())
}
