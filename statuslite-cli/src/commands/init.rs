//! `statuslite init` command - writes a starter statuslite.yml

use std::fs;
use std::path::Path;

use statuslite_core::config::{CONFIG_NAMES, StatusConfig};

/// Run the init command in the current directory
pub fn run_init(yes: bool) -> Result<(), String> {
    let cwd =
        std::env::current_dir().map_err(|e| format!("Failed to get current directory: {}", e))?;
    let output_path = write_starter(&cwd, yes)?;

    println!("Created: {}\n", output_path.display());
    println!("Next steps:");
    println!("  1. Edit the services list in statuslite.yml");
    println!("  2. Run `statuslite` to open the status page");
    println!("  3. Run `statuslite check` to probe everything once");

    Ok(())
}

fn write_starter(dir: &Path, yes: bool) -> Result<std::path::PathBuf, String> {
    for name in &CONFIG_NAMES {
        let path = dir.join(name);
        if path.exists() {
            if !yes {
                return Err(format!(
                    "Config file {} already exists. Use --yes to overwrite.",
                    path.display()
                ));
            }
            println!("Overwriting existing config: {}", path.display());
        }
    }

    let body = StatusConfig::starter_yaml().map_err(|e| e.to_string())?;
    let mut yaml = String::new();
    yaml.push_str("# Statuslite Configuration\n");
    yaml.push_str("# Generated by `statuslite init`\n\n");
    yaml.push_str(&body);

    let output_path = dir.join(CONFIG_NAMES[0]);
    fs::write(&output_path, &yaml).map_err(|e| format!("Failed to write config: {}", e))?;
    Ok(output_path)
}
