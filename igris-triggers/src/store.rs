use std::{
    collections::BTreeMap,
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::{fs, sync::Mutex};
use tracing::{debug, info, warn};

use crate::error::{Result, TriggerError};
use crate::model::{TriggerDefinition, TriggerKey};

type Registry = BTreeMap<TriggerKey, TriggerDefinition>;

/// Shared handle to the trigger registry and its file mirror.
///
/// Cheap to clone. Every mutation holds the registry lock across the whole
/// mutate-then-persist step, so each write of the file reflects exactly one
/// more mutation than the previous one.
#[derive(Clone, Debug)]
pub struct TriggerStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    registry: Mutex<Registry>,
}

impl TriggerStore {
    /// Load the registry from `path`.
    ///
    /// A missing file yields an empty registry. A file that exists but is not
    /// a well-formed trigger mapping fails with [`TriggerError::StorageCorrupt`].
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let registry = match fs::read(&path).await {
            Ok(bytes) => parse_registry(&path, &bytes)?,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no trigger file found, starting empty");
                Registry::new()
            }
            Err(source) => return Err(source.into()),
        };

        info!(path = %path.display(), count = registry.len(), "triggers loaded");
        Ok(Self::with_registry(path, registry))
    }

    /// Create an empty registry mirrored to `path` without reading it.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self::with_registry(path.into(), Registry::new())
    }

    /// Move an unreadable trigger file aside to `<file>.corrupt`.
    ///
    /// Returns the backup location.
    pub async fn quarantine(path: &Path) -> Result<PathBuf> {
        let backup = sibling_path(path, ".corrupt");
        fs::rename(path, &backup).await?;
        warn!(
            path = %path.display(),
            backup = %backup.display(),
            "corrupt trigger file moved aside"
        );
        Ok(backup)
    }

    fn with_registry(path: PathBuf, registry: Registry) -> Self {
        Self {
            inner: Arc::new(Inner {
                path,
                registry: Mutex::new(registry),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Insert or overwrite a trigger and persist the registry.
    pub async fn put(&self, key: TriggerKey, definition: TriggerDefinition) -> Result<()> {
        definition.validate()?;

        let mut registry = self.inner.registry.lock().await;
        let previous = registry.insert(key.clone(), definition);

        if let Err(source) = self.persist(&registry).await {
            match previous {
                Some(previous) => registry.insert(key, previous),
                None => registry.remove(&key),
            };
            return Err(source);
        }

        debug!(%key, "trigger stored");
        Ok(())
    }

    /// Remove a trigger. Returns whether it existed; persists only if it did.
    pub async fn remove(&self, key: &TriggerKey) -> Result<bool> {
        let mut registry = self.inner.registry.lock().await;
        let Some(previous) = registry.remove(key) else {
            return Ok(false);
        };

        if let Err(source) = self.persist(&registry).await {
            registry.insert(key.clone(), previous);
            return Err(source);
        }

        debug!(%key, "trigger removed");
        Ok(true)
    }

    /// Remove every trigger and persist the empty registry.
    pub async fn clear(&self) -> Result<()> {
        let mut registry = self.inner.registry.lock().await;
        let previous = std::mem::take(&mut *registry);

        if let Err(source) = self.persist(&registry).await {
            *registry = previous;
            return Err(source);
        }

        debug!(cleared = previous.len(), "triggers cleared");
        Ok(())
    }

    /// Snapshot of all triggers in key order.
    pub async fn list(&self) -> Vec<(TriggerKey, TriggerDefinition)> {
        self.inner
            .registry
            .lock()
            .await
            .iter()
            .map(|(key, definition)| (key.clone(), definition.clone()))
            .collect()
    }

    pub async fn get(&self, key: &TriggerKey) -> Option<TriggerDefinition> {
        self.inner.registry.lock().await.get(key).cloned()
    }

    /// Find the first registered trigger mentioned in `text`.
    ///
    /// Words are whitespace separated; leading and trailing punctuation is
    /// ignored when the bare word is not itself a key. Phrase keys match a run
    /// of consecutive words starting at the same position.
    pub async fn find_in(&self, text: &str) -> Option<(TriggerKey, TriggerDefinition)> {
        let registry = self.inner.registry.lock().await;
        if registry.is_empty() {
            return None;
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        let stripped: Vec<String> = words
            .iter()
            .map(|word| strip_edges(word).to_lowercase())
            .collect();
        let phrases: Vec<(&TriggerKey, &TriggerDefinition, Vec<&str>)> = registry
            .iter()
            .filter(|(key, _)| key.is_phrase())
            .map(|(key, definition)| (key, definition, key.words().map(strip_edges).collect()))
            .collect();

        for (position, word) in words.iter().enumerate() {
            for candidate in [*word, stripped[position].as_str()] {
                if let Ok(key) = TriggerKey::parse_stored(candidate)
                    && let Some(definition) = registry.get(&key)
                {
                    return Some((key, definition.clone()));
                }
            }

            for (key, definition, parts) in &phrases {
                let matches = stripped
                    .get(position..position + parts.len())
                    .is_some_and(|window| {
                        window.iter().map(String::as_str).eq(parts.iter().copied())
                    });
                if matches {
                    return Some(((*key).clone(), (*definition).clone()));
                }
            }
        }

        None
    }

    async fn persist(&self, registry: &Registry) -> Result<()> {
        let path = &self.inner.path;
        let bytes = serde_json::to_vec_pretty(registry)?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        // Write-then-rename so the target is never observed half written.
        let staging = sibling_path(path, ".tmp");
        fs::write(&staging, &bytes).await?;
        fs::rename(&staging, path).await?;

        Ok(())
    }
}

fn parse_registry(path: &Path, bytes: &[u8]) -> Result<Registry> {
    let registry: Registry =
        serde_json::from_slice(bytes).map_err(|source| TriggerError::StorageCorrupt {
            path: path.to_path_buf(),
            source,
        })?;

    for (key, definition) in &registry {
        if let Err(source) = definition.validate() {
            warn!(%key, ?source, "trigger file holds an invalid definition");
            return Err(TriggerError::StorageCorrupt {
                path: path.to_path_buf(),
                source: serde::de::Error::custom(format!("trigger `{key}`: {source}")),
            });
        }
    }

    Ok(registry)
}

fn strip_edges(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric())
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| OsString::from("triggers.json"));
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TriggerKind;
    use tempfile::tempdir;

    fn key(raw: &str) -> TriggerKey {
        TriggerKey::parse(raw).unwrap()
    }

    fn text(content: &str) -> TriggerDefinition {
        TriggerDefinition::text(content).unwrap()
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = TriggerStore::load(dir.path().join("triggers.json"))
            .await
            .unwrap();

        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn put_list_remove() {
        let dir = tempdir().unwrap();
        let store = TriggerStore::load(dir.path().join("triggers.json"))
            .await
            .unwrap();

        store.put(key("wave"), text("o/")).await.unwrap();
        let listed = store.list().await;
        assert_eq!(listed, vec![(key("wave"), text("o/"))]);

        assert!(store.remove(&key("wave")).await.unwrap());
        assert!(store.get(&key("wave")).await.is_none());
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn put_overwrites_existing_key() {
        let dir = tempdir().unwrap();
        let store = TriggerStore::empty(dir.path().join("triggers.json"));

        store.put(key("gm"), text("first")).await.unwrap();
        store.put(key("GM"), text("second")).await.unwrap();

        assert_eq!(store.list().await, vec![(key("gm"), text("second"))]);
    }

    #[tokio::test]
    async fn survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("triggers.json");

        let store = TriggerStore::load(&path).await.unwrap();
        store.put(key("old"), text("stale")).await.unwrap();
        store.clear().await.unwrap();
        store.put(key("k"), text("d")).await.unwrap();
        drop(store);

        let reloaded = TriggerStore::load(&path).await.unwrap();
        assert_eq!(reloaded.list().await, vec![(key("k"), text("d"))]);
    }

    #[tokio::test]
    async fn case_insensitive_lookup() {
        let dir = tempdir().unwrap();
        let store = TriggerStore::empty(dir.path().join("triggers.json"));

        store.put(key("Hello"), text("hi!")).await.unwrap();

        assert_eq!(store.get(&key("hello")).await, Some(text("hi!")));
        assert!(store.remove(&key("HELLO")).await.unwrap());
    }

    #[tokio::test]
    async fn removing_unknown_key_is_a_no_op() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("triggers.json");
        let store = TriggerStore::empty(&path);
        store.put(key("a"), text("1")).await.unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        assert!(!store.remove(&key("doesnotexist")).await.unwrap());

        assert_eq!(store.list().await, vec![(key("a"), text("1"))]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn concurrent_puts_are_all_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("triggers.json");
        let store = TriggerStore::empty(&path);

        let handles = (0..16)
            .map(|index| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .put(key(&format!("t{index}")), text(&format!("r{index}")))
                        .await
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reloaded = TriggerStore::load(&path).await.unwrap();
        assert_eq!(reloaded.list().await.len(), 16);
        assert!(!sibling_path(&path, ".tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("triggers.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let result = TriggerStore::load(&path).await;
        assert!(matches!(result, Err(TriggerError::StorageCorrupt { .. })));
    }

    #[tokio::test]
    async fn invalid_image_entry_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("triggers.json");
        std::fs::write(
            &path,
            r#"{ "cat": { "kind": "image", "content": "http://x.com/cat.bmp" } }"#,
        )
        .unwrap();

        let result = TriggerStore::load(&path).await;
        assert!(matches!(result, Err(TriggerError::StorageCorrupt { .. })));
    }

    #[tokio::test]
    async fn quarantine_moves_file_aside() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("triggers.json");
        std::fs::write(&path, "not json").unwrap();

        let backup = TriggerStore::quarantine(&path).await.unwrap();

        assert!(!path.exists());
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "not json");
    }

    #[tokio::test]
    async fn legacy_file_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("triggers.json");
        std::fs::write(
            &path,
            r#"{ "Hi": { "type": "text", "response": "hello" } }"#,
        )
        .unwrap();

        let store = TriggerStore::load(&path).await.unwrap();
        assert_eq!(store.list().await, vec![(key("hi"), text("hello"))]);
    }

    #[tokio::test]
    async fn legacy_multiword_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("triggers.json");
        std::fs::write(
            &path,
            r#"{ "Good  Morning": { "type": "text", "response": "gm!" } }"#,
        )
        .unwrap();

        let store = TriggerStore::load(&path).await.unwrap();
        let phrase = TriggerKey::parse_stored("good morning").unwrap();
        assert_eq!(store.list().await, vec![(phrase.clone(), text("gm!"))]);

        assert_eq!(
            store.find_in("well, GOOD morning, everyone").await,
            Some((phrase.clone(), text("gm!")))
        );
        assert!(store.find_in("good evening, morning people").await.is_none());

        // Rewriting the file keeps the phrase as one key.
        store.put(key("gn"), text("Good night!")).await.unwrap();
        let reloaded = TriggerStore::load(&path).await.unwrap();
        assert_eq!(reloaded.get(&phrase).await, Some(text("gm!")));
    }

    #[tokio::test]
    async fn oversized_legacy_response_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("triggers.json");
        let raw = serde_json::json!({
            "long": { "type": "text", "response": "x".repeat(crate::MAX_CONTENT_CHARS + 1) }
        });
        std::fs::write(&path, raw.to_string()).unwrap();

        assert!(matches!(
            TriggerStore::load(&path).await,
            Err(TriggerError::StorageCorrupt { .. })
        ));
    }

    #[tokio::test]
    async fn persisted_format_uses_kind_and_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("triggers.json");
        let store = TriggerStore::empty(&path);

        store
            .put(key("pic"), TriggerDefinition::image("http://x.com/pic.png").unwrap())
            .await
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["pic"]["kind"], "image");
        assert_eq!(raw["pic"]["content"], "http://x.com/pic.png");
        assert_eq!(
            store.get(&key("pic")).await.map(|d| d.kind),
            Some(TriggerKind::Image)
        );
    }

    #[tokio::test]
    async fn find_in_matches_words() {
        let dir = tempdir().unwrap();
        let store = TriggerStore::empty(dir.path().join("triggers.json"));
        store.put(key("gm"), text("Good morning!")).await.unwrap();

        let found = store.find_in("well, GM everyone!").await;
        assert_eq!(found, Some((key("gm"), text("Good morning!"))));

        assert!(store.find_in("gmail is down").await.is_none());
        assert!(store.find_in("GM!").await.is_some());
    }
}
