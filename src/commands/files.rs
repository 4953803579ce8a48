use std::path::Path;

use colored::Colorize;

use crate::config::Config;
use crate::error::Result;
use crate::identity::resolve_user;
use crate::output::{self, Format};
use crate::store::ChatStore;

pub fn share(config: &Config, sender: Option<&str>, path: &Path, format: Format) -> Result<()> {
    let sender = resolve_user(sender)?;
    let mut store = ChatStore::open(config)?;
    let entry = store.shared_files.add(path, &sender)?;
    output::print_shared_file(&entry, format)
}

pub fn list(config: &Config, format: Format) -> Result<()> {
    let mut store = ChatStore::open(config)?;
    let files = store.shared_files.get_all()?;
    output::print_shared_files(&files, format)
}

pub fn prune(config: &Config, format: Format) -> Result<()> {
    let mut store = ChatStore::open(config)?;
    let dropped = store.shared_files.prune()?;
    match format {
        Format::Json => println!("{}", serde_json::json!({"pruned": dropped})),
        Format::Pretty => {
            if dropped == 0 {
                println!("{}", "Nothing to prune.".dimmed());
            } else {
                println!("Pruned {} missing shared file(s)", dropped.to_string().bold());
            }
        }
        Format::Minimal => println!("{dropped}"),
    }
    Ok(())
}
