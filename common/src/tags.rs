//! Parsing and validation of resource tags given as `key=value` pairs

use std::collections::BTreeMap;

use crate::constants::{
    FORBIDDEN_TAG_KEY_CHARS, MAX_TAG_COUNT, MAX_TAG_KEY_LENGTH, MAX_TAG_VALUE_LENGTH,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidTag {
    #[error("tag '{0}' must be given as key=value")]
    MissingSeparator(String),
    #[error("tag keys can not be empty")]
    EmptyKey,
    #[error("tag key '{key}' is longer than {max} characters", max = MAX_TAG_KEY_LENGTH)]
    KeyTooLong { key: String },
    #[error("tag value for '{key}' is longer than {max} characters", max = MAX_TAG_VALUE_LENGTH)]
    ValueTooLong { key: String },
    #[error("tag key '{key}' contains '{found}', tag keys can not contain any of < > % & \\ ? /")]
    ForbiddenCharacter { key: String, found: char },
    #[error("tag '{0}' was given more than once")]
    DuplicateKey(String),
    #[error("at most {max} tags can be set, got {0}", max = MAX_TAG_COUNT)]
    TooMany(usize),
}

/// Split a single `key=value` argument. Only the first `=` separates, so values may contain `=`.
pub fn parse_tag(s: &str) -> Result<(String, String), InvalidTag> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| InvalidTag::MissingSeparator(s.to_string()))?;

    Ok((key.trim().to_string(), value.to_string()))
}

/// Validate tags against the Resource Manager limits and collect them into a map.
///
/// Returns `None` when no tags were given so the field is left out of requests.
pub fn create_tag_map(
    tags: Vec<(String, String)>,
) -> Result<Option<BTreeMap<String, String>>, InvalidTag> {
    if tags.is_empty() {
        return Ok(None);
    }
    if tags.len() > MAX_TAG_COUNT {
        return Err(InvalidTag::TooMany(tags.len()));
    }

    let mut map = BTreeMap::new();
    for (key, value) in tags {
        if key.is_empty() {
            return Err(InvalidTag::EmptyKey);
        }
        if key.chars().count() > MAX_TAG_KEY_LENGTH {
            return Err(InvalidTag::KeyTooLong { key });
        }
        if let Some(found) = key.chars().find(|c| FORBIDDEN_TAG_KEY_CHARS.contains(c)) {
            return Err(InvalidTag::ForbiddenCharacter { key, found });
        }
        if value.chars().count() > MAX_TAG_VALUE_LENGTH {
            return Err(InvalidTag::ValueTooLong { key });
        }
        if map.contains_key(&key) {
            return Err(InvalidTag::DuplicateKey(key));
        }

        map.insert(key, value);
    }

    Ok(Some(map))
}
