use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::admin;
use crate::config::Config;
use crate::error::{ChatError, Result};
use crate::output::{self, Format};
use crate::poller::{ChangePoller, PollerHandle};
use crate::store::ChatStore;

const IDLE_WAIT: Duration = Duration::from_secs(1);

pub struct WatchOptions<'a> {
    pub interval: Option<Duration>,
    pub run_for: Option<Duration>,
    pub join: Option<&'a str>,
    pub passcode: Option<&'a str>,
}

/// Stream change events until `run_for` elapses (or forever).
///
/// With `join`, the user is registered before polling starts and removed
/// again once the watch ends.
pub fn run(config: &Config, opts: WatchOptions<'_>, format: Format) -> Result<()> {
    let mut store = ChatStore::open(config)?;

    let session = match opts.join {
        Some(name) => {
            admin::check_login(config, name, opts.passcode)?;
            store.presence.add(name)?;
            Some(name.trim().to_string())
        }
        None => None,
    };

    let interval = opts.interval.unwrap_or(config.poll_interval);
    let handle = ChangePoller::new(store.clone()).spawn(interval);
    info!(
        interval_ms = handle.interval().as_millis() as u64,
        "watching for changes"
    );
    let deadline = opts.run_for.map(|d| Instant::now() + d);
    let streamed = stream(&handle, deadline, format);
    handle.stop();

    if let Some(name) = session {
        match store.presence.remove(&name) {
            Ok(()) | Err(ChatError::UserNotFound(_)) => debug!(user = %name, "session closed"),
            Err(e) => return Err(e),
        }
    }
    streamed
}

fn stream(handle: &PollerHandle, deadline: Option<Instant>, format: Format) -> Result<()> {
    loop {
        let wait = match deadline {
            Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                Some(left) if !left.is_zero() => left,
                _ => return Ok(()),
            },
            None => IDLE_WAIT,
        };
        match handle.events().recv_timeout(wait) {
            Ok(event) => output::print_event(&event, format)?,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }
    }
}
