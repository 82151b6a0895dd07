use regex::Regex;
use std::sync::LazyLock;

/// Domains whose addresses show up in platform-mention text rather than as contact details.
pub const EXCLUDED_EMAIL_DOMAINS: [&str; 5] = [
    "instagram.com",
    "facebook.com",
    "fb.com",
    "twitter.com",
    "x.com",
];

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email regex")
});

pub fn first_personal_email(text: &str) -> Option<String> {
    EMAIL
        .find_iter(text)
        .map(|found| found.as_str())
        .find(|email| {
            email
                .rsplit_once('@')
                .is_some_and(|(_, domain)| !is_excluded_email_domain(domain))
        })
        .map(|email| email.to_string())
}

/// Matches the excluded domains exactly or as a parent domain (`mail.instagram.com`).
pub fn is_excluded_email_domain(domain: &str) -> bool {
    let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
    EXCLUDED_EMAIL_DOMAINS.iter().any(|excluded| {
        domain == *excluded
            || domain
                .strip_suffix(excluded)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}
