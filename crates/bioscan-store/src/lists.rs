use crate::error::{Result, StoreError};
use crate::paths;
use bioscan_core::ProfileSummary;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const LISTS_DIR: &str = "lists";
const LIST_EXT: &str = "json";
const MAX_LIST_NAME_LEN: usize = 64;

/// A follower (or batch) result persisted under a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedList {
    pub name: String,
    #[serde(default)]
    pub target_username: Option<String>,
    pub saved_at: i64,
    pub profiles: Vec<ProfileSummary>,
}

#[derive(Debug, Clone)]
pub struct ListStore {
    dir: PathBuf,
}

impl ListStore {
    /// `data_dir` is the application data directory; lists live in its `lists/` subdirectory.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join(LISTS_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, list: &SavedList) -> Result<PathBuf> {
        validate_list_name(&list.name)?;
        paths::ensure_dir(&self.dir)?;

        let path = self.path_for(&list.name);
        let tmp = self.dir.join(format!(".{}.{}.tmp", list.name, LIST_EXT));
        let body = serde_json::to_vec_pretty(list)?;
        fs::write(&tmp, body)?;
        if let Err(err) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<SavedList> {
        validate_list_name(name)?;
        let path = self.path_for(name);
        let contents = match fs::read(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(format!("list {name}")));
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&contents)?)
    }

    pub fn names(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LIST_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if validate_list_name(stem).is_ok() {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        validate_list_name(name)?;
        match fs::remove_file(self.path_for(name)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(format!("list {name}")))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{LIST_EXT}"))
    }
}

pub fn validate_list_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_LIST_NAME_LEN
        && !name.starts_with('.')
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidListName(name.to_string()))
    }
}

/// Saved-list name for a follower export of `username`.
pub fn followers_list_name(username: &str) -> String {
    format!("followers_{username}")
}
