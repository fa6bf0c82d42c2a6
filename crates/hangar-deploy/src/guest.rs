//! Guest size resolution

use crate::error::Result;
use hangar_types::GuestSpec;

/// Resolve an optional size token; an empty or blank token leaves the guest
/// unchanged. Anything else must be a preset name verbatim.
pub fn resolve_guest(token: Option<&str>) -> Result<Option<GuestSpec>> {
    match token.filter(|t| !t.trim().is_empty()) {
        Some(token) => Ok(Some(GuestSpec::from_size(token)?)),
        None => Ok(None),
    }
}
