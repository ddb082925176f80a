/// Name fragments that mark a field as credential-shaped. Compared against the
/// lowercased field name with `_`, `-` and spaces removed.
const SENSITIVE_FRAGMENTS: &[&str] = &[
    "password",
    "passwd",
    "username",
    "secret",
    "token",
    "apikey",
    "passphrase",
    "privatekey",
    "accesskey",
    "credential",
];

/// Whole names that are sensitive on their own but too short to match as
/// fragments.
const SENSITIVE_NAMES: &[&str] = &["user", "pwd"];

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Check a field name against the built-in patterns and `additional` names.
pub fn is_sensitive_name(name: &str, additional: &[String]) -> bool {
    let normalized = normalize(name);
    if normalized.is_empty() {
        return false;
    }
    SENSITIVE_NAMES.contains(&normalized.as_str())
        || SENSITIVE_FRAGMENTS.iter().any(|f| normalized.contains(f))
        || additional.iter().any(|extra| normalize(extra) == normalized)
}

/// `smtpPassword` -> `SMTP_PASSWORD`, `Archive Writer` -> `ARCHIVE_WRITER`.
pub fn to_upper_snake(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut prev: Option<char> = None;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            let boundary = ch.is_ascii_uppercase()
                && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit());
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_uppercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
        prev = Some(ch);
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Coerce an UPPER_SNAKE token into a placeholder identifier: a leading digit
/// gets a `_` prefix and an empty token becomes `SECRET`.
pub fn to_parameter_identifier(token: &str) -> String {
    match token.chars().next() {
        None => "SECRET".to_string(),
        Some(first) if first.is_ascii_digit() => format!("_{}", token),
        Some(_) => token.to_string(),
    }
}
