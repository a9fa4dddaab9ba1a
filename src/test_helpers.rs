//! Shared test utilities.
//!
//! Builders for album input and an on-disk site directory, plus
//! [`RecordingStore`], an in-memory [`ObjectStore`] that can be told to reject
//! specific keys.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let root = write_site(tmp.path());          // tmp/homepage + tmp/shared
//! let (albums, pictures, metadata) = album_input(&["010-Landscapes/"]);
//! let store = RecordingStore::failing(&["error.html"]);
//! ```

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::store::{ObjectStore, PutObject, StoreError};
use crate::types::{Album, AlbumMetadata, Picture};

// =========================================================================
// Album input
// =========================================================================

/// Parallel album input: one picture (`<key>1.jpg`) and empty metadata per key.
pub fn album_input(keys: &[&str]) -> (Vec<Album>, Vec<Vec<Picture>>, Vec<AlbumMetadata>) {
    let albums = keys.iter().map(|k| Album::new(*k)).collect();
    let pictures = keys
        .iter()
        .map(|k| vec![Picture::new(format!("{k}1.jpg"))])
        .collect();
    let metadata = keys.iter().map(|_| AlbumMetadata::default()).collect();
    (albums, pictures, metadata)
}

// =========================================================================
// Site fixture
// =========================================================================

pub const INDEX_HTML: &str = "<html><head><title>{title}</title>{googletracking}</head>
<body>
    <ul>{pictures}</ul>
    {backTo}
</body></html>
";

pub const ERROR_HTML: &str = "<h1>{website}</h1>\n    <p>Not found</p>\n";
pub const ALBUM_HTML: &str = r#"<li><a href="/{album}">{title}</a></li>"#;
pub const BACKTO_HTML: &str = r#"<footer>{backLink}</footer>"#;
pub const GA_HTML: &str = "<script>gtag('config', '{gtag}');</script>";

/// Write a complete site under `<dir>/homepage` and the shared analytics
/// snippet under `<dir>/shared`. Returns the site root.
pub fn write_site(dir: &Path) -> PathBuf {
    let root = dir.join("homepage");
    let files: &[(&str, &[u8])] = &[
        ("homepage/index.html", INDEX_HTML.as_bytes()),
        ("homepage/error.html", ERROR_HTML.as_bytes()),
        ("homepage/assets/css/main.css", b"body { margin: 0; }\n"),
        ("homepage/assets/img/1.jpg", &[0xFF, 0xD8, 0xFF]),
        ("homepage/snippets/album.html", ALBUM_HTML.as_bytes()),
        ("homepage/snippets/backto.html", BACKTO_HTML.as_bytes()),
        ("shared/snippets/ga.html", GA_HTML.as_bytes()),
    ];
    for (relative, contents) in files {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
    root
}

// =========================================================================
// Recording store
// =========================================================================

/// In-memory store recording every successful write.
#[derive(Debug, Default)]
pub struct RecordingStore {
    objects: Mutex<BTreeMap<String, PutObject>>,
    reject: BTreeSet<String>,
}

impl RecordingStore {
    /// A store that fails uploads for the given keys.
    pub fn failing(keys: &[&str]) -> Self {
        Self {
            objects: Mutex::default(),
            reject: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    /// Body of a written object. Panics if the key was not written.
    pub fn body(&self, key: &str) -> Vec<u8> {
        self.object(key).body
    }

    pub fn body_str(&self, key: &str) -> String {
        String::from_utf8(self.body(key)).unwrap()
    }

    pub fn content_type(&self, key: &str) -> String {
        self.object(key).content_type
    }

    fn object(&self, key: &str) -> PutObject {
        let objects = self.objects.lock().unwrap();
        objects.get(key).cloned().unwrap_or_else(|| {
            let keys: Vec<&String> = objects.keys().collect();
            panic!("object '{key}' not written. Available: {keys:?}")
        })
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put_object(&self, object: PutObject) -> Result<(), StoreError> {
        if self.reject.contains(&object.key) {
            return Err(StoreError::S3 {
                key: object.key,
                message: "AccessDenied".to_string(),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .insert(object.key.clone(), object);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
