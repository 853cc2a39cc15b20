//! JSON persistence of the group document

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::{Group, GroupStore};
use crate::error::Result;

#[derive(Serialize, Deserialize, Debug, Default)]
struct Document {
    #[serde(default)]
    groups: Vec<Group>,
}

/// Loads the store at `path`. A missing file is an empty store; records are
/// normalized on the way in.
pub fn load(path: &Path) -> Result<GroupStore> {
    if !path.exists() {
        log::debug!("no group document at {:?}, starting empty", path);
        return Ok(GroupStore::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(GroupStore::new());
    }
    let document: Document = serde_json::from_str(&content)?;
    log::debug!("loaded {} groups from {:?}", document.groups.len(), path);
    Ok(GroupStore::from_groups(document.groups))
}

pub fn save(path: &Path, store: &GroupStore) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let document = Document {
        groups: store.groups().to_vec(),
    };
    let content = serde_json::to_string_pretty(&document)?;
    fs::write(path, content)?;
    Ok(())
}
