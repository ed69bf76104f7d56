//! Plan command - display the packaging sequence

use console::style;
use std::path::Path;
use warpack_core::Packager;

use crate::error::Result;
use crate::util::load_config;

pub fn run(path: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(path, config)?;
    let packager = Packager::from_config(&config)?;

    println!(
        "{}: {}",
        style("Output").bold(),
        packager.webapp_directory().display()
    );
    println!();
    println!("{}:", style("Tasks").bold());
    for (index, task) in packager.tasks().iter().enumerate() {
        println!("  {}. {}", index + 1, task.describe());
    }

    Ok(())
}
