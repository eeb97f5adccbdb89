//! Snapshot export: write the current filtered view to a JSON file.
//!
//! The browser panel triggered a download; here the document lands next to
//! the other working-directory files as `<kind>-attitudes.json`.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Context, Result};
use crate::listview::ExportDocument;

/// Write an export document under `dir`, returning the file path.
pub fn write_snapshot<T: Serialize>(doc: &ExportDocument<T>, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("{}-attitudes.json", doc.kind));
    let json = serde_json::to_string_pretty(doc)
        .with_ctx(|| format!("serialize {} export", doc.kind))?;
    std::fs::write(&path, json).with_ctx(|| format!("write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UserAttitude;
    use crate::listview::{ListView, EXPORT_VERSION};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn tmp_dir(tag: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        let n = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        p.push(format!("attmgr_{tag}_{}_{}", std::process::id(), n));
        std::fs::create_dir_all(&p).unwrap();
        p
    }

    #[test]
    fn written_snapshot_round_trips_with_version_and_type() {
        let mut view: ListView<UserAttitude> = ListView::new(10);
        view.load(vec![UserAttitude {
            user_id: "42".to_string(),
            username: Some("alice".to_string()),
            nickname: None,
            attitude: None,
            relationship: None,
            other: None,
        }]);

        let dir = tmp_dir("export");
        let path = write_snapshot(&view.export_snapshot(), &dir).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["version"], EXPORT_VERSION);
        assert_eq!(value["type"], "users");
        assert_eq!(value["data"][0]["user_id"], "42");
        // Absent optional fields are explicit nulls, not omitted keys.
        assert!(value["data"][0]["attitude"].is_null());
        assert!(value["data"][0].get("nickname").is_some());
    }
}
