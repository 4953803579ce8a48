//! Passcode-gated maintenance operations.
//!
//! The passcode is a shared plain string compared for equality. It keeps
//! honest users from clicking the wrong button; it is not access control.

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::{ChatError, Result};
use crate::identity::is_reserved_admin;
use crate::store::ChatStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    LogoutAll,
    ArchiveChat,
    ArchiveFiles,
}

impl std::fmt::Display for AdminAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LogoutAll => write!(f, "logout_all"),
            Self::ArchiveChat => write!(f, "archive_chat"),
            Self::ArchiveFiles => write!(f, "archive_files"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AdminOutcome {
    LoggedOutAll,
    Archived { archive: PathBuf },
}

pub fn authorize(config: &Config, supplied: &str) -> Result<()> {
    if supplied == config.admin_passcode {
        Ok(())
    } else {
        Err(ChatError::InvalidPasscode)
    }
}

/// Joining as `admin` requires the passcode; everyone else needs nothing.
pub fn check_login(config: &Config, username: &str, passcode: Option<&str>) -> Result<()> {
    if is_reserved_admin(username) {
        authorize(config, passcode.unwrap_or_default())?;
    }
    Ok(())
}

pub fn run(
    store: &mut ChatStore,
    config: &Config,
    passcode: &str,
    action: AdminAction,
) -> Result<AdminOutcome> {
    authorize(config, passcode)?;
    info!(%action, "admin action");
    match action {
        AdminAction::LogoutAll => {
            store.presence.clear_all()?;
            Ok(AdminOutcome::LoggedOutAll)
        }
        AdminAction::ArchiveChat => Ok(AdminOutcome::Archived {
            archive: store.messages.archive()?,
        }),
        AdminAction::ArchiveFiles => Ok(AdminOutcome::Archived {
            archive: store.shared_files.archive()?,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn wrong_passcode_changes_nothing() {
        let dir = tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());
        let mut store = ChatStore::open(&config).unwrap();
        store.presence.add("alice").unwrap();

        let err = run(&mut store, &config, "letmein", AdminAction::LogoutAll).unwrap_err();
        assert!(matches!(err, ChatError::InvalidPasscode));
        assert_eq!(store.presence.get_all().unwrap(), vec!["alice"]);
    }

    #[test]
    fn logout_all_clears_presence() {
        let dir = tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());
        let mut store = ChatStore::open(&config).unwrap();
        store.presence.add("alice").unwrap();
        store.presence.add("bob").unwrap();

        let outcome = run(&mut store, &config, "admin123", AdminAction::LogoutAll).unwrap();
        assert_eq!(outcome, AdminOutcome::LoggedOutAll);
        assert!(store.presence.get_all().unwrap().is_empty());
    }

    #[test]
    fn archive_chat_snapshots_history() {
        let dir = tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());
        let mut store = ChatStore::open(&config).unwrap();
        store.messages.append("alice", "hello", Local::now()).unwrap();
        let before = fs::read_to_string(config.history_path()).unwrap();

        let AdminOutcome::Archived { archive } =
            run(&mut store, &config, "admin123", AdminAction::ArchiveChat).unwrap()
        else {
            panic!("expected an archive");
        };
        assert_eq!(fs::read_to_string(archive).unwrap(), before);
        assert!(store.messages.get_all().unwrap().is_empty());
    }

    #[test]
    fn admin_login_needs_passcode() {
        let dir = tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());

        assert!(check_login(&config, "alice", None).is_ok());
        assert!(matches!(
            check_login(&config, "Admin", None),
            Err(ChatError::InvalidPasscode)
        ));
        assert!(matches!(
            check_login(&config, "admin", Some("nope")),
            Err(ChatError::InvalidPasscode)
        ));
        assert!(check_login(&config, "admin", Some("admin123")).is_ok());
    }
}
