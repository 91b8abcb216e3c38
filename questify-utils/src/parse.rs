/// Trim an input and reject it when nothing is left.
pub fn non_empty_trimmed(raw: &str) -> Option<&str> {
    let value = raw.trim();
    if value.is_empty() { None } else { Some(value) }
}

/// Normalize an email address to lowercase, rejecting obviously malformed input.
pub fn normalize_email(raw: &str) -> Option<String> {
    let value = non_empty_trimmed(raw)?;
    if value.chars().any(char::is_whitespace) {
        return None;
    }

    let (local, domain) = value.split_once('@')?;
    if local.is_empty() || domain.contains('@') {
        return None;
    }

    let (host, tld) = domain.rsplit_once('.')?;
    if host.is_empty() || tld.is_empty() {
        return None;
    }

    Some(value.to_ascii_lowercase())
}

/// Parse a boolean flag the way `.env` files usually spell it.
pub fn parse_bool_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::{non_empty_trimmed, normalize_email, parse_bool_flag};

    #[test]
    fn trims_and_rejects_blank() {
        assert_eq!(non_empty_trimmed("  quest "), Some("quest"));
        assert_eq!(non_empty_trimmed("   "), None);
        assert_eq!(non_empty_trimmed(""), None);
    }

    #[test]
    fn normalizes_emails() {
        assert_eq!(
            normalize_email(" Hero@Guild.Example "),
            Some("hero@guild.example".to_owned())
        );
        assert_eq!(normalize_email("no-at-sign.example"), None);
        assert_eq!(normalize_email("@guild.example"), None);
        assert_eq!(normalize_email("hero@guild"), None);
        assert_eq!(normalize_email("hero@@guild.example"), None);
        assert_eq!(normalize_email("he ro@guild.example"), None);
        assert_eq!(normalize_email("hero@.example"), None);
    }

    #[test]
    fn bool_flags() {
        assert!(parse_bool_flag("TRUE"));
        assert!(parse_bool_flag(" on "));
        assert!(parse_bool_flag("1"));
        assert!(!parse_bool_flag("off"));
        assert!(!parse_bool_flag(""));
    }
}
