//! Simple Mod Framework `config.json` (Hitman: World of Assassination)
//!
//! SMF stores its config as a JavaScript object literal: unquoted keys,
//! single-quoted strings. It is not JSON, so the two lists that matter
//! (`knownMods` and `loadOrder`) are edited in place as text and everything
//! around them is left byte-for-byte intact.

use super::{write_atomic, ModState, Projector};
use crate::error::{read_required, Error, Result};
use crate::host::{GameDirs, ModHandle};
use crate::rename::manifest_field;
use crate::tree::EntryKind;
use std::ops::Range;
use std::path::{Path, PathBuf};

pub const SMF_DIR: &str = "Simple Mod Framework";
pub const SMF_MODS_DIR: &str = "Simple Mod Framework/Mods";
pub const SMF_MANIFEST: &str = "manifest.json";

/// Canonical config SMF writes once it has been configured
pub const DEFAULT_CONFIG: &str = r"{runtimePath:'..\Runtime',retailPath:'..\Retail',skipIntro:false,outputToSeparateDirectory:false,loadOrder:[''],modOptions:{},outputConfigToAppDataOnDeploy:true,knownMods:[''],developerMode:false,reportErrors:false}";

/// A freshly unpacked SMF ships a JSON stub instead of its own format
const FRESH_STUB: &str = r#""knownMods": []"#;

const LISTS: [&str; 2] = ["knownMods", "loadOrder"];

#[derive(Debug, Clone, Copy, Default)]
pub struct SmfConfig;

fn config_path(dirs: &GameDirs) -> PathBuf {
    dirs.data_dir.join(SMF_DIR).join("config.json")
}

/// Byte range of the items inside `key:[ ... ]`
fn list_body(text: &str, key: &str) -> Option<Range<usize>> {
    let opener = format!("{key}:[");
    let start = text.find(&opener)? + opener.len();
    let len = text[start..].find(']')?;
    Some(start..start + len)
}

/// Spans of the items in a list body, each including its quotes
fn item_spans(body: &str) -> Vec<Range<usize>> {
    let bytes = body.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b',' | b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            quote @ (b'\'' | b'"') => {
                let end = body[i + 1..]
                    .find(quote as char)
                    .map_or(bytes.len(), |p| i + 1 + p + 1);
                spans.push(i..end);
                i = end;
            }
            _ => {
                let end = body[i..].find(',').map_or(bytes.len(), |p| i + p);
                let trimmed = body[i..end].trim_end().len();
                spans.push(i..i + trimmed);
                i = end;
            }
        }
    }
    spans
}

fn unquote(item: &str) -> &str {
    item.trim_matches(|c| c == '\'' || c == '"')
}

/// Put `'id'` at the front of the list. `None` if already present or the list is missing.
pub fn insert_item(text: &str, key: &str, id: &str) -> Option<String> {
    let body = list_body(text, key)?;
    let spans = item_spans(&text[body.clone()]);
    if spans.iter().any(|s| unquote(&text[body.start..][s.clone()]) == id) {
        return None;
    }
    let insertion = if spans.is_empty() {
        format!("'{id}'")
    } else {
        format!("'{id}',")
    };
    let at = body.start + spans.first().map_or(0, |s| s.start);
    let mut out = String::with_capacity(text.len() + insertion.len());
    out.push_str(&text[..at]);
    out.push_str(&insertion);
    out.push_str(&text[at..]);
    Some(out)
}

/// Drop `id` from the list along with one adjoining separator. `None` if absent.
pub fn remove_item(text: &str, key: &str, id: &str) -> Option<String> {
    let body = list_body(text, key)?;
    let spans = item_spans(&text[body.clone()]);
    let index = spans
        .iter()
        .position(|s| unquote(&text[body.start..][s.clone()]) == id)?;

    let cut = match (spans.get(index + 1), index.checked_sub(1)) {
        (Some(next), _) => spans[index].start..next.start,
        (None, Some(prev)) => spans[prev].end..spans[index].end,
        (None, None) => spans[index].clone(),
    };
    let cut = body.start + cut.start..body.start + cut.end;
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..cut.start]);
    out.push_str(&text[cut.end..]);
    Some(out)
}

/// Apply one toggle to the whole config text. `None` when nothing changed.
pub fn apply(text: &str, id: &str, state: ModState) -> Option<String> {
    let mut current = text.to_string();
    if state.is_active() && current.contains(FRESH_STUB) {
        current = DEFAULT_CONFIG.to_string();
    }
    let mut changed = current != text;
    for key in LISTS {
        let edited = match state {
            ModState::Active => insert_item(&current, key, id),
            ModState::Inactive => remove_item(&current, key, id),
        };
        if let Some(edited) = edited {
            current = edited;
            changed = true;
        }
    }
    changed.then_some(current)
}

/// Manifest ids of the SMF mods a mod ships
fn mod_ids(handle: &ModHandle) -> Result<Vec<String>> {
    let Some(mods) = handle.tree.find_dir(SMF_MODS_DIR) else {
        return Ok(Vec::new());
    };
    mods.children()
        .iter()
        .filter_map(|e| e.as_dir())
        .filter(|d| d.exists(SMF_MANIFEST, EntryKind::File))
        .map(|d| {
            let manifest = handle.path.join(SMF_MODS_DIR).join(d.name()).join(SMF_MANIFEST);
            manifest_field(&manifest, &["id"])
        })
        .collect()
}

fn ensure_lists(text: &str, path: &Path) -> Result<()> {
    match LISTS.iter().find(|key| list_body(text, key).is_none()) {
        Some(key) => Err(Error::MalformedConfig {
            path: path.to_path_buf(),
            reason: format!("no {key}:[...] list"),
        }),
        None => Ok(()),
    }
}

impl Projector for SmfConfig {
    fn name(&self) -> &'static str {
        "smf-config"
    }

    fn project(&self, dirs: &GameDirs, handle: &ModHandle, state: ModState) -> Result<()> {
        let ids = mod_ids(handle)?;
        if ids.is_empty() {
            return Ok(());
        }

        let path = config_path(dirs);
        let original = read_required(&path)?;
        let mut text = original.clone();
        for id in &ids {
            if let Some(edited) = apply(&text, id, state) {
                ensure_lists(&edited, &path)?;
                tracing::info!("SMF: {} {:?}", id, state);
                text = edited;
            }
        }

        if text != original {
            write_atomic(&path, text.as_bytes())?;
        } else if !text.contains(FRESH_STUB) {
            ensure_lists(&text, &path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::disk;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_insert_and_remove_are_inverse() {
        let enabled = apply(DEFAULT_CONFIG, "Author.Mod", ModState::Active).unwrap();
        assert!(enabled.contains("loadOrder:['Author.Mod','']"));
        assert!(enabled.contains("knownMods:['Author.Mod','']"));

        let disabled = apply(&enabled, "Author.Mod", ModState::Inactive).unwrap();
        assert_eq!(disabled, DEFAULT_CONFIG);
    }

    #[test]
    fn test_nested_toggles_unwind() {
        let a = apply(DEFAULT_CONFIG, "A", ModState::Active).unwrap();
        let ab = apply(&a, "B", ModState::Active).unwrap();
        assert!(ab.contains("knownMods:['B','A','']"));

        let b = apply(&ab, "A", ModState::Inactive).unwrap();
        assert!(b.contains("knownMods:['B','']"));
        assert_eq!(apply(&b, "B", ModState::Inactive).unwrap(), DEFAULT_CONFIG);
    }

    #[test]
    fn test_empty_list_round_trip() {
        let text = "{loadOrder:[],knownMods:[ ]}";
        let enabled = apply(text, "X", ModState::Active).unwrap();
        assert_eq!(enabled, "{loadOrder:['X'],knownMods:['X' ]}");
        assert_eq!(apply(&enabled, "X", ModState::Inactive).unwrap(), text);
    }

    #[test]
    fn test_last_item_removal_takes_preceding_separator() {
        let text = "{loadOrder:['a', 'b'],knownMods:['a', 'b']}";
        let removed = apply(text, "b", ModState::Inactive).unwrap();
        assert_eq!(removed, "{loadOrder:['a'],knownMods:['a']}");
    }

    #[test]
    fn test_duplicate_enable_is_noop() {
        let enabled = apply(DEFAULT_CONFIG, "A", ModState::Active).unwrap();
        assert_eq!(apply(&enabled, "A", ModState::Active), None);
        assert_eq!(apply(DEFAULT_CONFIG, "A", ModState::Inactive), None);
    }

    #[test]
    fn test_fresh_stub_is_replaced() {
        let stub = r#"{ "knownMods": [] }"#;
        let enabled = apply(stub, "A", ModState::Active).unwrap();
        assert!(enabled.starts_with("{runtimePath:"));
        assert!(enabled.contains("knownMods:['A','']"));
    }

    #[test]
    fn test_projector_round_trip_on_disk() {
        let root = TempDir::new().unwrap();
        let game = root.path().join("game");
        let mod_dir = root.path().join("mods/Cool");
        let manifest_dir = mod_dir.join("Simple Mod Framework/Mods/Author.Cool");
        fs::create_dir_all(game.join(SMF_DIR)).unwrap();
        fs::create_dir_all(&manifest_dir).unwrap();
        fs::write(game.join(SMF_DIR).join("config.json"), DEFAULT_CONFIG).unwrap();
        fs::write(manifest_dir.join(SMF_MANIFEST), r#"{"id": "Author.Cool"}"#).unwrap();

        let dirs = GameDirs {
            game_dir: game.clone(),
            data_dir: game.clone(),
            profile_dir: root.path().join("profile"),
            mods_dir: root.path().join("mods"),
        };
        let handle = ModHandle {
            name: "Cool".to_string(),
            tree: disk::load(&mod_dir, "").unwrap(),
            path: mod_dir,
        };

        SmfConfig.project(&dirs, &handle, ModState::Active).unwrap();
        let config = fs::read_to_string(config_path(&dirs)).unwrap();
        assert!(config.contains("knownMods:['Author.Cool','']"));

        SmfConfig.project(&dirs, &handle, ModState::Inactive).unwrap();
        assert_eq!(fs::read_to_string(config_path(&dirs)).unwrap(), DEFAULT_CONFIG);
    }

    #[test]
    fn test_config_without_lists_is_malformed() {
        let path = Path::new("config.json");
        assert!(matches!(
            ensure_lists("{skipIntro:false}", path),
            Err(Error::MalformedConfig { .. })
        ));
    }
}
