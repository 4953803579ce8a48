use colored::Colorize;

use crate::admin::{self, AdminAction, AdminOutcome};
use crate::config::Config;
use crate::error::Result;
use crate::output::Format;
use crate::store::ChatStore;

pub fn run(config: &Config, passcode: &str, action: AdminAction, format: Format) -> Result<()> {
    admin::authorize(config, passcode)?;
    let mut store = ChatStore::open(config)?;
    let outcome = admin::run(&mut store, config, passcode, action)?;
    match format {
        Format::Json => println!("{}", serde_json::to_string(&outcome)?),
        Format::Pretty => match &outcome {
            AdminOutcome::LoggedOutAll => println!("{}", "All users have been logged out".green()),
            AdminOutcome::Archived { archive } => {
                println!("{} {}", "Archived to".green(), archive.display())
            }
        },
        Format::Minimal => match &outcome {
            AdminOutcome::LoggedOutAll => println!("{action}"),
            AdminOutcome::Archived { archive } => println!("{}", archive.display()),
        },
    }
    Ok(())
}
