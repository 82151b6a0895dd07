use regex::Regex;
use std::sync::LazyLock;

const NANP_TOLL_FREE_PREFIXES: [&str; 7] = ["800", "888", "877", "866", "855", "844", "833"];

static PHONE_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\(?[0-9]{3}\)?[-\s.]?[0-9]{3}[-\s.]?[0-9]{4,6}").expect("phone regex")
});

/// Normalizes a phone number to `+<country><subscriber>` when the country is
/// known or confidently inferable, otherwise returns the bare digits.
///
/// Never fails: an empty input comes back unchanged.
pub fn format_phone(raw: &str, country_code: Option<&str>) -> String {
    if raw.trim().is_empty() {
        return raw.to_string();
    }

    let cleaned = clean_phone(raw);
    if cleaned.starts_with('+') {
        return cleaned;
    }

    if let Some(code) = country_code.and_then(clean_country_code) {
        let national = cleaned.trim_start_matches('0');
        if national.is_empty() {
            return cleaned;
        }
        return format!("+{code}{national}");
    }

    match cleaned.len() {
        11 if cleaned.starts_with('1') => format!("+{cleaned}"),
        10 if is_nanp_subscriber(&cleaned) => format!("+1{cleaned}"),
        _ => cleaned,
    }
}

/// First phone-shaped run in free text, normalized without a country code.
pub fn first_phone_in_text(text: &str) -> Option<String> {
    PHONE_IN_TEXT
        .find_iter(text)
        .filter(|found| {
            let before = text[..found.start()].chars().next_back();
            let after = text[found.end()..].chars().next();
            !before.is_some_and(|ch| ch.is_alphanumeric() || matches!(ch, '/' | '@' | '.'))
                && !after.is_some_and(|ch| ch.is_ascii_digit())
        })
        .map(|found| format_phone(found.as_str(), None))
        .find(|value| !value.is_empty())
}

fn clean_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut out = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        out.push('+');
    }
    out.extend(trimmed.chars().filter(|ch| ch.is_ascii_digit()));
    out
}

fn clean_country_code(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|ch| ch.is_ascii_digit()).collect();
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn is_nanp_subscriber(digits: &str) -> bool {
    let leading_ok = digits
        .chars()
        .next()
        .is_some_and(|ch| ('2'..='9').contains(&ch));
    leading_ok || NANP_TOLL_FREE_PREFIXES.contains(&&digits[..3])
}

#[cfg(test)]
mod tests {
    use super::{first_phone_in_text, format_phone};

    #[test]
    fn ten_digit_us_number_gets_plus_one() {
        assert_eq!(format_phone("555-123-4567", None), "+15551234567");
        assert_eq!(format_phone("(415) 555-1212", None), "+14155551212");
    }

    #[test]
    fn eleven_digits_with_leading_one_gets_plus() {
        assert_eq!(format_phone("15551234567", None), "+15551234567");
    }

    #[test]
    fn explicit_country_code_is_applied() {
        assert_eq!(format_phone("01234567", Some("44")), "+441234567");
        assert_eq!(format_phone("01234567", Some("+044")), "+441234567");
    }

    #[test]
    fn blank_country_code_is_ignored() {
        assert_eq!(format_phone("5551234567", Some("0")), "+15551234567");
        assert_eq!(format_phone("5551234567", Some("")), "+15551234567");
    }

    #[test]
    fn international_form_is_kept() {
        assert_eq!(format_phone("+49 170 1234567", None), "+491701234567");
        assert_eq!(format_phone("+49 170 1234567", Some("1")), "+491701234567");
    }

    #[test]
    fn ambiguous_values_pass_through_as_digits() {
        assert_eq!(format_phone("123", None), "123");
        assert_eq!(format_phone("0123456789", None), "0123456789");
        assert_eq!(format_phone("1123456789", None), "1123456789");
        assert_eq!(format_phone("020 7946 0958 12", None), "0207946095812");
    }

    #[test]
    fn empty_input_is_returned_unchanged() {
        assert_eq!(format_phone("", None), "");
        assert_eq!(format_phone("   ", Some("44")), "   ");
    }

    #[test]
    fn non_digit_input_cleans_to_empty() {
        assert_eq!(format_phone("call me", None), "");
        assert_eq!(format_phone("call me", Some("44")), "");
    }

    #[test]
    fn first_phone_in_text_normalizes_match() {
        let bio = "Bookings: (555) 123-4567 or DM";
        assert_eq!(first_phone_in_text(bio).as_deref(), Some("+15551234567"));
    }

    #[test]
    fn first_phone_in_text_skips_digits_inside_urls() {
        let bio = "see https://example.com/5551234567 for details";
        assert_eq!(first_phone_in_text(bio), None);
    }
}
