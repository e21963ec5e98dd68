//! Check-config command: report keys the effect would ignore

use anyhow::{bail, Context, Result};
use pyro_core::ConfigSnapshot;
use pyro_particles::keys;

pub fn run(file: &str) -> Result<()> {
    let config = ConfigSnapshot::load(file).with_context(|| format!("Failed to load config '{file}'"))?;

    let unknown = keys::unknown_keys(&config);
    let problems = keys::validate(&config);

    println!("{}: {} key(s)", file, config.len());
    for key in &unknown {
        println!("  [unknown] {key} (ignored)");
    }
    for problem in &problems {
        println!("  [invalid] {problem}");
    }

    if unknown.is_empty() && problems.is_empty() {
        println!("  OK");
        return Ok(());
    }
    bail!(
        "{} unknown key(s), {} invalid value(s)",
        unknown.len(),
        problems.len()
    )
}
