use serde::{Deserialize, Serialize};

/// Canonical contact details derived from one profile.
///
/// `email`, `phone`, `website` and `facebook_page` come from free text only;
/// `business_email` and `business_phone` come from structured business fields only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_page: Option<String>,
    pub business_email: Option<String>,
    pub business_phone: Option<String>,
}

impl ContactRecord {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.phone.is_none()
            && self.website.is_none()
            && self.facebook_page.is_none()
            && self.business_email.is_none()
            && self.business_phone.is_none()
    }
}
