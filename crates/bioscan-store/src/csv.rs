use crate::error::Result;
use bioscan_core::ProfileSummary;
use std::collections::HashSet;
use std::io::{Read, Write};

const USERNAME_COLUMN: &str = "username";

pub const SUMMARY_HEADERS: [&str; 22] = [
    "username",
    "full_name",
    "user_id",
    "account_type",
    "is_verified",
    "is_private",
    "follower_count",
    "following_count",
    "post_count",
    "category",
    "location",
    "description",
    "bio",
    "external_url",
    "email",
    "phone",
    "website",
    "facebook_page",
    "business_email",
    "business_phone",
    "profile_pic_url",
    "error",
];

/// Reads usernames from CSV input.
///
/// Uses the `username` column when the header row has one, otherwise the first column
/// (treating the first row as data). Leading `@` is stripped, blanks are skipped and
/// duplicates keep their first position.
pub fn read_usernames<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut csv = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(reader);

    let mut records = csv.records();
    let mut column = 0;
    let mut pending = None;
    if let Some(first) = records.next() {
        let first = first?;
        match first
            .iter()
            .position(|cell| cell.eq_ignore_ascii_case(USERNAME_COLUMN))
        {
            Some(index) => column = index,
            None => pending = Some(first),
        }
    }

    let mut seen = HashSet::new();
    let mut usernames = Vec::new();
    let mut push = |record: &::csv::StringRecord| {
        let Some(cell) = record.get(column) else {
            return;
        };
        let name = cell.trim().trim_start_matches('@');
        if name.is_empty() {
            return;
        }
        if seen.insert(name.to_string()) {
            usernames.push(name.to_string());
        }
    };

    if let Some(first) = pending {
        push(&first);
    }
    for record in records {
        push(&record?);
    }
    Ok(usernames)
}

pub fn write_summaries<W: Write>(writer: W, profiles: &[ProfileSummary]) -> Result<()> {
    let mut csv = ::csv::Writer::from_writer(writer);
    csv.write_record(SUMMARY_HEADERS)?;
    for profile in profiles {
        let contact = &profile.contact;
        let follower_count = profile.follower_count.to_string();
        let following_count = profile.following_count.to_string();
        let post_count = profile.post_count.to_string();
        csv.write_record([
            profile.username.as_str(),
            profile.full_name.as_str(),
            profile.user_id.as_str(),
            profile.account_type.as_str(),
            bool_cell(profile.is_verified),
            bool_cell(profile.is_private),
            follower_count.as_str(),
            following_count.as_str(),
            post_count.as_str(),
            opt(&profile.category),
            opt(&profile.location),
            opt(&profile.description),
            profile.bio.as_str(),
            opt(&profile.external_url),
            opt(&contact.email),
            opt(&contact.phone),
            opt(&contact.website),
            opt(&contact.facebook_page),
            opt(&contact.business_email),
            opt(&contact.business_phone),
            opt(&profile.profile_pic_url),
            opt(&profile.error),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn bool_cell(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
