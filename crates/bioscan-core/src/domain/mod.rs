pub mod account;
pub mod contact;
pub mod email;
pub mod fields;
pub mod phone;
pub mod profile;

pub use account::{classify_account, AccountType};
pub use contact::ContactRecord;
pub use email::{first_personal_email, is_excluded_email_domain};
pub use fields::FieldMap;
pub use phone::{first_phone_in_text, format_phone};
pub use profile::ProfileInput;
