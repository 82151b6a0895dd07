use bioscan_core::{extract, format_phone, FieldMap, ProfileInput, ProfileSummary};
use serde_json::json;

#[test]
fn platform_mentions_do_not_produce_an_email() {
    let record = extract(&ProfileInput::new(
        "DM us @business on instagram.com or reach admin@instagram.com",
    ));
    assert!(record.email.is_none());
}

#[test]
fn bio_email_is_extracted() {
    let record = extract(&ProfileInput::new("Contact: jane.doe@example.com for bookings"));
    assert_eq!(record.email.as_deref(), Some("jane.doe@example.com"));
}

#[test]
fn page_links_are_normalized() {
    let record = extract(&ProfileInput::new("facebook.com/officialpage"));
    assert_eq!(
        record.facebook_page.as_deref(),
        Some("https://facebook.com/officialpage")
    );

    let record = extract(&ProfileInput::new("find me @myhandle also on facebook"));
    assert_eq!(
        record.facebook_page.as_deref(),
        Some("https://facebook.com/myhandle")
    );
}

#[test]
fn non_social_website_is_preferred() {
    let record = extract(&ProfileInput::new("Visit facebook.com/page or mysite.com/shop"));
    assert_eq!(record.website.as_deref(), Some("https://mysite.com/shop"));
}

#[test]
fn business_fields_and_bio_fields_are_independent() {
    let business: FieldMap = [("email", "biz@co.com")].into_iter().collect();
    let record = extract(
        &ProfileInput::new("personal: personal@example.org").with_business_contact(business),
    );
    assert_eq!(record.business_email.as_deref(), Some("biz@co.com"));
    assert_eq!(record.email.as_deref(), Some("personal@example.org"));
}

#[test]
fn non_business_accounts_get_no_business_fields() {
    let raw = json!({
        "biography": "hi",
        "is_business": false,
        "business_contact_method": {"email": "biz@co.com", "phone_number": "5551234567"},
        "public_email": "public@co.com"
    });
    let record = extract(&ProfileInput::from_raw(&raw));
    assert!(record.business_email.is_none());
    assert!(record.business_phone.is_none());
}

#[test]
fn phone_normalization_table() {
    assert_eq!(format_phone("555-123-4567", None), "+15551234567");
    assert_eq!(format_phone("15551234567", None), "+15551234567");
    assert_eq!(format_phone("01234567", Some("44")), "+441234567");
    assert_eq!(format_phone("+49 170 1234567", None), "+491701234567");
    assert_eq!(format_phone("123", None), "123");
}

#[test]
fn odd_shaped_records_never_fail() {
    let shapes = [
        json!(null),
        json!([]),
        json!("string"),
        json!({"biography": null, "external_url": 5, "business_contact_method": null}),
        json!({"biography": "🙂 ☎ +", "is_business": true, "business_contact_method": {"phone": {}}}),
    ];
    for raw in shapes {
        let summary = ProfileSummary::from_raw(&raw);
        assert_eq!(summary, ProfileSummary::from_raw(&raw));
        assert!(summary.contact.business_phone.is_none());
    }
}
