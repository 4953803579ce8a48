use std::path::Path;

use chrono::Local;

use crate::config::Config;
use crate::error::{ChatError, Result};
use crate::identity::resolve_user;
use crate::model::gif_content;
use crate::output::{self, Format};
use crate::store::ChatStore;

pub fn send(config: &Config, sender: Option<&str>, text: &str, format: Format) -> Result<()> {
    let sender = resolve_user(sender)?;
    let mut store = ChatStore::open(config)?;
    let message = store.messages.append(&sender, text, Local::now())?;
    output::print_message(&message, format)
}

pub fn gif(config: &Config, sender: Option<&str>, path: &Path, format: Format) -> Result<()> {
    let absolute = std::path::absolute(path)?;
    let absolute = absolute
        .to_str()
        .ok_or_else(|| ChatError::NonUtf8Path(absolute.display().to_string()))?;
    send(config, sender, &gif_content(absolute), format)
}

pub fn history(config: &Config, limit: Option<usize>, format: Format) -> Result<()> {
    let mut store = ChatStore::open(config)?;
    let mut messages = store.messages.get_all()?;
    if let Some(n) = limit {
        let len = messages.len();
        if len > n {
            messages = messages.split_off(len - n);
        }
    }
    output::print_messages(&messages, format)
}
