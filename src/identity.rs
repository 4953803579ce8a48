use crate::error::{ChatError, Result};

pub const ENV_USER: &str = "FLOCKCHAT_USER";

/// Resolve who is acting: an explicit `--as` value first, then `$FLOCKCHAT_USER`.
pub fn resolve_user(explicit: Option<&str>) -> Result<String> {
    explicit
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| {
            std::env::var(ENV_USER)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .ok_or(ChatError::NoIdentity)
}

/// `admin` in any casing is reserved for passcode holders.
pub fn is_reserved_admin(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case("admin")
}
