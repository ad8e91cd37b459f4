// src/store.rs
//! Resumable collection cursor, stored next to the output file as
//! `<output>.cursor.json`.

use std::{fs, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};

use crate::config::consts::CURSOR_SUFFIX;
use crate::error::{Error, Result};
use crate::file::ensure_parent;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Last bill id whose outcome (row or skip) is reflected in the output.
    pub last_id: Option<u32>,
    /// Ids processed so far, skipped ones included.
    pub processed: usize,
    /// Rows written so far.
    pub written: usize,
}

pub fn cursor_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(CURSOR_SUFFIX);
    PathBuf::from(name)
}

impl Cursor {
    /// `Ok(None)` when no cursor exists yet.
    pub fn load(output: &Path) -> Result<Option<Cursor>> {
        let path = cursor_path(output);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    pub fn save(&self, output: &Path) -> Result<()> {
        let path = cursor_path(output);
        ensure_parent(&path)?;
        // temp file, then rename over the old cursor
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(self)?).map_err(|e| Error::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| Error::io(&path, e))
    }

    pub fn remove(output: &Path) -> Result<()> {
        let path = cursor_path(output);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(&path, e)),
        }
    }

    /// Ids still to do, given ids in processing order.
    pub fn remaining<'a>(&self, ids: &'a [u32]) -> &'a [u32] {
        match self.last_id.and_then(|last| ids.iter().position(|&id| id == last)) {
            Some(pos) => &ids[pos + 1..],
            None => match self.last_id {
                // id list changed: skip everything up to last_id
                Some(last) => {
                    let start = ids.iter().position(|&id| id > last).unwrap_or(ids.len());
                    &ids[start..]
                }
                None => ids,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_and_remaining() {
        assert_eq!(cursor_path(Path::new("out/bills.csv")), PathBuf::from("out/bills.csv.cursor.json"));
        let c = Cursor { last_id: Some(5), processed: 3, written: 2 };
        assert_eq!(c.remaining(&[1, 3, 5, 7, 9]), &[7, 9]);
        assert_eq!(c.remaining(&[1, 6, 8]), &[6, 8]);
        assert_eq!(Cursor::default().remaining(&[1, 2]), &[1, 2]);
    }
}
