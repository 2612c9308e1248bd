/// `update-token`: write a secret into an env file
///
/// Prompts for a variable name (default `ADMIN_API_KEY`) and a value (blank
/// generates an admin key), then rewrites `NAME=value` in the file. Every
/// other line, comments and blank lines included, is kept as-is.

use anyhow::Context;
use menuly_shared::auth::admin_key::generate_admin_key;
use std::io::{BufRead, Write};
use std::path::Path;

use super::{mask, Prompt};

/// Default env file
pub const DEFAULT_ENV_FILE: &str = ".env.local";

/// Default variable name
pub const DEFAULT_VARIABLE: &str = "ADMIN_API_KEY";

/// Sets `key` to `value` in env-file `contents`
///
/// Replaces the first `KEY=` (or `export KEY=`) line and drops later
/// duplicates; appends when absent.
pub fn update_env_value(contents: &str, key: &str, value: &str) -> String {
    let mut replaced = false;
    let mut lines: Vec<String> = Vec::new();

    for line in contents.lines() {
        let assignment = line.trim_start();
        let assignment = assignment.strip_prefix("export ").unwrap_or(assignment);
        let is_key = assignment
            .split_once('=')
            .is_some_and(|(name, _)| name.trim() == key);

        if !is_key {
            lines.push(line.to_string());
        } else if !replaced {
            let export = if line.trim_start().starts_with("export ") { "export " } else { "" };
            lines.push(format!("{}{}={}", export, key, value));
            replaced = true;
        }
    }

    if !replaced {
        lines.push(format!("{}={}", key, value));
    }

    let mut updated = lines.join("\n");
    updated.push('\n');
    updated
}

/// Checks a variable name is a plain shell identifier
pub fn validate_variable_name(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return Err(format!("Invalid variable name: {}", name)),
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("Invalid variable name: {}", name));
    }
    Ok(())
}

/// Prompts for the variable and writes it to `path`
///
/// A missing file is created.
pub fn run<R: BufRead, W: Write>(path: &Path, prompt: &mut Prompt<R, W>) -> anyhow::Result<()> {
    let name = loop {
        let name = prompt.ask("Variable", Some(DEFAULT_VARIABLE))?;
        match validate_variable_name(&name) {
            Ok(()) => break name,
            Err(reason) => prompt.say(reason)?,
        }
    };

    let mut value = prompt.ask("Value (blank to generate)", None)?;
    let generated = value.is_empty();
    if generated {
        value = generate_admin_key();
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };

    std::fs::write(path, update_env_value(&contents, &name, &value))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(file = %path.display(), variable = %name, "Env file updated");

    if generated {
        prompt.say(format!("{}={}", name, value))?;
    }
    prompt.say(format!("Updated {} in {} ({})", name, path.display(), mask(&value)))?;

    Ok(())
}
