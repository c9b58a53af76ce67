//! The project manifest (`package.json`). Parsed as a whole document with
//! unrelated fields preserved verbatim; rewritten as a whole, pretty-printed
//! with 2-space indentation, and only when a tracked field changed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(flatten)]
    root: Map<String, Value>,
}

impl Manifest {
    pub fn path(appdir: &Path) -> PathBuf {
        appdir.join("package.json")
    }

    /// Read the manifest, or an empty document when none exists yet.
    pub fn load(appdir: &Path) -> Result<Self> {
        let path = Self::path(appdir);
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON in {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("Could not read {}", path.display())),
        }
    }

    /// Reload after installer runs (installers rewrite the manifest).
    /// Creates an empty `{}` file when the installer left none behind.
    pub fn reload_or_create(appdir: &Path) -> Result<Self> {
        let path = Self::path(appdir);
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON in {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::write(&path, "{}")
                    .with_context(|| format!("Could not create {}", path.display()))?;
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("Could not read {}", path.display())),
        }
    }

    /// Whole-document rewrite.
    pub fn save(&self, appdir: &Path) -> Result<()> {
        let path = Self::path(appdir);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).with_context(|| format!("Could not write {}", path.display()))
    }

    fn string_map_keys(&self, field: &str) -> BTreeSet<String> {
        self.root
            .get(field)
            .and_then(Value::as_object)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Names present under `dependencies`.
    pub fn dependencies(&self) -> BTreeSet<String> {
        self.string_map_keys("dependencies")
    }

    /// Names present under `devDependencies`.
    pub fn dev_dependencies(&self) -> BTreeSet<String> {
        self.string_map_keys("devDependencies")
    }

    pub fn script(&self, name: &str) -> Option<&str> {
        self.root
            .get("scripts")
            .and_then(Value::as_object)
            .and_then(|s| s.get(name))
            .and_then(Value::as_str)
    }

    /// Set or delete a script entry. Returns whether anything changed.
    /// An absent desired value deletes the key rather than writing "".
    pub fn set_script(&mut self, name: &str, desired: Option<&str>) -> bool {
        if self.script(name) == desired {
            return false;
        }

        let scripts = self
            .root
            .entry("scripts")
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(scripts) = scripts.as_object_mut() else {
            return false;
        };

        match desired {
            Some(value) => {
                scripts.insert(name.to_string(), Value::String(value.to_string()));
            }
            None => {
                scripts.remove(name);
            }
        }
        true
    }

    /// Whether the module-system marker selects ES modules.
    pub fn is_esm(&self) -> bool {
        self.root.get("type").and_then(Value::as_str) == Some("module")
    }

    /// Whether a module-system marker is present at all.
    pub fn has_module_marker(&self) -> bool {
        self.root.contains_key("type")
    }

    /// Align the module-system marker. Returns whether anything changed.
    pub fn set_module_marker(&mut self, esm: bool) -> bool {
        if esm {
            if self.is_esm() {
                return false;
            }
            self.root
                .insert("type".to_string(), Value::String("module".to_string()));
            true
        } else {
            self.root.remove("type").is_some()
        }
    }
}
