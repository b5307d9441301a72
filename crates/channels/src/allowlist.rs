//! Recipient allowlist gating shared by channel backends.

/// Check if a recipient is allowed.
///
/// An empty allowlist means everyone is allowed (open policy). Entries are
/// matched case-insensitively against the recipient identifier.
#[must_use]
pub fn is_allowed(recipient: &str, allowlist: &[String]) -> bool {
    if allowlist.is_empty() {
        return true;
    }
    let recipient_lower = recipient.to_lowercase();
    allowlist
        .iter()
        .any(|entry| entry.to_lowercase() == recipient_lower)
}
