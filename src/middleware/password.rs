/// Shared-password gate for submissions. A courtesy check against casual
/// drive-by edits, not authentication.
pub fn check_password(expected: &str, supplied: &str) -> bool {
    expected == supplied
}

/// `None` when no password is configured or the supplied one matches.
pub fn password_error(expected: Option<&str>, supplied: Option<&str>) -> Option<&'static str> {
    let expected = expected?;
    match supplied {
        Some(s) if check_password(expected, s) => None,
        Some(_) => Some("That password isn't right. Please try again."),
        None => Some("Please enter the group password."),
    }
}
