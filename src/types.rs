//! Album input types.
//!
//! Albums, their pictures and their metadata arrive as three parallel
//! sequences, associated by index. They are produced upstream (by whatever
//! lists the bucket and reads album metadata) and are read-only here.

use crate::naming;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An album, identified by its object prefix in the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Album {
    pub key: String,
}

impl Album {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// A picture, identified by its object key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Picture {
    pub key: String,
}

impl Picture {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Per-album metadata. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbumMetadata {
    /// Overrides the title derived from the album key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Capture date, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Custom weight; lower comes first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One album with its pictures and metadata, zipped for a single render.
#[derive(Debug, Clone, Copy)]
pub struct AlbumView<'a> {
    pub album: &'a Album,
    pub pictures: &'a [Picture],
    pub metadata: &'a AlbumMetadata,
}

impl AlbumView<'_> {
    /// Metadata title when set and non-blank, else the title derived from the key.
    pub fn title(&self) -> String {
        self.metadata
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .unwrap_or_else(|| naming::display_title(&self.album.key))
    }

    pub fn cover(&self) -> Option<&Picture> {
        self.pictures.first()
    }
}

/// The JSON document the CLI reads album input from.
///
/// ```json
/// {
///   "albums": ["010-Landscapes/", "020-Travel/"],
///   "pictures": [["010-Landscapes/dawn.jpg"], ["020-Travel/rome.jpg"]],
///   "metadata": [{"date": "2023-05-01"}, {"order": 1}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbumManifest {
    pub albums: Vec<Album>,
    pub pictures: Vec<Vec<Picture>>,
    pub metadata: Vec<AlbumMetadata>,
}
