//! API key resolution for the remote embedding and generation adapters.

/// Pick the credential for one remote call: a non-blank per-request key wins
/// over the configured one. Returns `None` when neither is usable.
pub fn resolve_api_key(request: Option<&str>, configured: Option<&str>) -> Option<String> {
    request
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .or_else(|| configured.map(str::trim).filter(|k| !k.is_empty()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::resolve_api_key;

    #[test]
    fn request_key_wins() {
        assert_eq!(resolve_api_key(Some("req"), Some("cfg")).as_deref(), Some("req"));
    }

    #[test]
    fn blank_request_key_falls_back() {
        assert_eq!(resolve_api_key(Some("  "), Some("cfg")).as_deref(), Some("cfg"));
        assert_eq!(resolve_api_key(None, Some("cfg")).as_deref(), Some("cfg"));
    }

    #[test]
    fn no_key_at_all() {
        assert_eq!(resolve_api_key(None, None), None);
        assert_eq!(resolve_api_key(Some(""), Some(" ")), None);
    }
}
