use colored::Colorize;

use crate::admin;
use crate::config::Config;
use crate::error::Result;
use crate::output::{self, Format};
use crate::store::ChatStore;

pub fn join(config: &Config, name: &str, passcode: Option<&str>, format: Format) -> Result<()> {
    admin::check_login(config, name, passcode)?;
    let mut store = ChatStore::open(config)?;
    store.presence.add(name)?;
    let name = name.trim();
    match format {
        Format::Json => println!("{}", serde_json::json!({"joined": name})),
        Format::Pretty => println!("Joined chat as '{}'", name.cyan().bold()),
        Format::Minimal => println!("{name}"),
    }
    Ok(())
}

pub fn leave(config: &Config, name: &str, format: Format) -> Result<()> {
    let mut store = ChatStore::open(config)?;
    store.presence.remove(name)?;
    let name = name.trim();
    match format {
        Format::Json => println!("{}", serde_json::json!({"left": name})),
        Format::Pretty => println!("Left chat: '{}'", name.cyan()),
        Format::Minimal => println!("{name}"),
    }
    Ok(())
}

pub fn list(config: &Config, format: Format) -> Result<()> {
    let mut store = ChatStore::open(config)?;
    let users = store.presence.get_all()?;
    output::print_users(&users, format)
}
