use clap::ValueEnum;
use colored::Colorize;

use crate::error::Result;
use crate::model::{Message, SharedFile};
use crate::poller::ChangeEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
    Minimal,
}

pub fn print_message(message: &Message, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(message)?),
        Format::Pretty => {
            let when = message.timestamp.format("%H:%M:%S").to_string();
            let body = match message.gif_path() {
                Some(path) => format!("{} {}", "[gif]".magenta(), path),
                None => message.content.clone(),
            };
            println!(
                "{} {} {}",
                format!("[{when}]").dimmed(),
                format!("{}:", message.sender).cyan().bold(),
                body
            );
        }
        Format::Minimal => println!("{}\t{}", message.sender, message.content),
    }
    Ok(())
}

pub fn print_messages(messages: &[Message], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(messages)?),
        _ if messages.is_empty() && format == Format::Pretty => {
            println!("{}", "No messages yet.".dimmed())
        }
        _ => {
            for message in messages {
                print_message(message, format)?;
            }
        }
    }
    Ok(())
}

pub fn print_users(users: &[String], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(users)?),
        Format::Pretty => {
            if users.is_empty() {
                println!("{}", "Nobody is online.".dimmed());
            } else {
                println!("{} {}", "online:".dimmed(), users.len());
                for user in users {
                    println!("  {}", user.cyan());
                }
            }
        }
        Format::Minimal => {
            for user in users {
                println!("{user}");
            }
        }
    }
    Ok(())
}

pub fn print_shared_file(file: &SharedFile, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(file)?),
        Format::Pretty => {
            println!(
                "{} {} {}",
                file.filepath.bold(),
                format!("by {}", file.shared_by).cyan(),
                file.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed()
            );
        }
        Format::Minimal => println!("{}", file.filepath),
    }
    Ok(())
}

pub fn print_shared_files(files: &[SharedFile], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(files)?),
        _ if files.is_empty() && format == Format::Pretty => {
            println!("{}", "No shared files.".dimmed())
        }
        _ => {
            for file in files {
                print_shared_file(file, format)?;
            }
        }
    }
    Ok(())
}

/// One line per event in JSON mode so watchers can stream-parse stdout.
pub fn print_event(event: &ChangeEvent, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(event)?),
        Format::Pretty => {
            println!("{}", format!("-- {} changed --", event.kind()).yellow());
            match event {
                ChangeEvent::Messages(messages) => print_messages(messages, format)?,
                ChangeEvent::Users(users) => print_users(users, format)?,
                ChangeEvent::SharedFiles(files) => print_shared_files(files, format)?,
            }
        }
        Format::Minimal => {
            let count = match event {
                ChangeEvent::Messages(m) => m.len(),
                ChangeEvent::Users(u) => u.len(),
                ChangeEvent::SharedFiles(f) => f.len(),
            };
            println!("{} {count}", event.kind());
        }
    }
    Ok(())
}
