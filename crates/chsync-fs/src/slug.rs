//! Slug derivation for directory and file names

/// Lowercase `name`, collapse every run of non-alphanumeric characters into a
/// single `-` and trim dashes from both ends. Returns `unnamed` when nothing
/// survives.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "unnamed".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ADT Receiver", "adt-receiver")]
    #[case("  HL7 -> FHIR  ", "hl7-fhir")]
    #[case("dest_1", "dest-1")]
    #[case("already-slugged", "already-slugged")]
    #[case("Ünïcode Only", "n-code-only")]
    #[case("***", "unnamed")]
    #[case("", "unnamed")]
    fn slugify_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(slugify(input), expected);
    }

    #[test]
    fn slugify_is_idempotent() {
        let once = slugify("Lab Results (Outbound)");
        assert_eq!(slugify(&once), once);
    }
}
