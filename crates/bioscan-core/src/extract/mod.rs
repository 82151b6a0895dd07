pub mod links;

use crate::domain::fields::{
    BUSINESS_EMAIL_KEYS, BUSINESS_PHONE_KEYS, COUNTRY_CODE_KEYS, TOP_LEVEL_EMAIL_KEYS,
    TOP_LEVEL_PHONE_KEYS,
};
use crate::domain::{first_personal_email, first_phone_in_text, format_phone};
use crate::domain::{ContactRecord, FieldMap, ProfileInput};

pub use links::{first_page_link, first_website};

/// Derives the canonical contact record for one profile.
///
/// Free-text fields are scanned from the biography plus external URL; business
/// fields come only from the structured business record and only for business
/// accounts. Pure and infallible.
pub fn extract(profile: &ProfileInput) -> ContactRecord {
    let corpus = profile.search_corpus();
    let mut record = ContactRecord {
        email: first_personal_email(&corpus),
        phone: first_phone_in_text(&corpus),
        website: first_website(&corpus),
        facebook_page: first_page_link(&corpus),
        ..ContactRecord::default()
    };

    if profile.is_business {
        let empty = FieldMap::new();
        let business = profile.business_contact.as_ref().unwrap_or(&empty);
        let public = &profile.public_fields;

        record.business_email = business
            .first(BUSINESS_EMAIL_KEYS)
            .or_else(|| public.first(TOP_LEVEL_EMAIL_KEYS))
            .map(str::to_string);

        let country_code = business
            .first(COUNTRY_CODE_KEYS)
            .or_else(|| public.first(COUNTRY_CODE_KEYS));
        record.business_phone = business
            .first(BUSINESS_PHONE_KEYS)
            .or_else(|| public.first(TOP_LEVEL_PHONE_KEYS))
            .map(|raw| format_phone(raw, country_code))
            .filter(|phone| phone.chars().any(|ch| ch.is_ascii_digit()));
    }

    record
}
