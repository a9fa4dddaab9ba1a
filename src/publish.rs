//! Walk-and-upload pipeline.
//!
//! Publishes a site directory to an [`ObjectStore`]:
//!
//! ```text
//! homepage/                      bucket
//! ├── index.html        ──────▶  index.html              (home page builder)
//! ├── error.html        ──────▶  error.html              (error page builder)
//! ├── assets/
//! │   └── css/main.css  ──────▶  assets/homepage/css/main.css   (as is)
//! └── snippets/                  (never uploaded)
//!     ├── album.html
//!     └── backto.html
//! shared/snippets/ga.html        (analytics snippet, read only)
//! ```
//!
//! ## Stages
//!
//! 1. Walk the site directory on the blocking pool. A walk failure aborts the
//!    run before anything is uploaded.
//! 2. Load the snippets once. They are shared read-only by every file.
//! 3. Plan each file: skip anything under a `snippets` directory, classify by
//!    name, compute the object key and content type.
//! 4. Upload every file concurrently. Each file is read, rendered and
//!    uploaded in sequence; files are independent of each other.
//!
//! ## Failure model
//!
//! A failing file (unreadable, render error, rejected upload) never cancels
//! its siblings. Once every upload has settled, the first failure is logged
//! once and returned in the [`PublishReport`]. There is no retry and no
//! rollback: a failed run may leave the bucket partially updated.
//!
//! ## Asset namespacing
//!
//! Several generated sites share one bucket, so each site's assets are moved
//! under a section name: `assets/css/main.css` is published as
//! `assets/<section>/css/main.css`. The section defaults to the site
//! directory's name.

use crate::album::RenderError;
use crate::config::RenderContext;
use crate::pages::{self, AlbumInput, PageKind};
use crate::store::{ObjectStore, PutObject, StoreError};
use crate::template::Templater;
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Directory name whose contents are source material, never published.
pub const SNIPPETS_DIR: &str = "snippets";
const ASSETS_DIR: &str = "assets";
const ALBUM_SNIPPET: &str = "album.html";
const BACK_TO_SNIPPET: &str = "backto.html";
const ANALYTICS_SNIPPET: &str = "ga.html";
const FALLBACK_SECTION: &str = "site";

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("Cannot walk site directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Site walk did not finish: {0}")]
    WalkTask(#[from] tokio::task::JoinError),
    #[error("Cannot read snippet {path}: {source}")]
    Snippet {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot render {key}: {source}")]
    Render {
        key: String,
        #[source]
        source: RenderError,
    },
    #[error("Upload failed: {0}")]
    Upload(#[from] StoreError),
}

/// Site layout settings for one run.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Assets namespace; `None` uses the site directory name.
    pub section: Option<String>,
    /// Directory containing `snippets/ga.html`.
    pub shared_dir: PathBuf,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            section: None,
            shared_dir: PathBuf::from("shared"),
        }
    }
}

/// Snippet templates loaded once per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snippets {
    pub analytics: String,
    pub album: String,
    pub back_to: String,
}

impl Snippets {
    /// Load `<root>/snippets/{album,backto}.html` and the shared analytics
    /// snippet.
    ///
    /// The analytics snippet may be absent when analytics is disabled.
    pub async fn load(
        root: &Path,
        shared_dir: &Path,
        analytics_enabled: bool,
    ) -> Result<Self, PublishError> {
        let snippets_dir = root.join(SNIPPETS_DIR);
        let album = read_snippet(&snippets_dir.join(ALBUM_SNIPPET)).await?;
        let back_to = read_snippet(&snippets_dir.join(BACK_TO_SNIPPET)).await?;

        let analytics_path = shared_dir.join(SNIPPETS_DIR).join(ANALYTICS_SNIPPET);
        let analytics = match read_snippet(&analytics_path).await {
            Ok(snippet) => snippet,
            Err(_) if !analytics_enabled => {
                debug!(path = %analytics_path.display(), "analytics disabled, snippet not loaded");
                String::new()
            }
            Err(err) => return Err(err),
        };

        Ok(Self {
            analytics,
            album,
            back_to,
        })
    }
}

async fn read_snippet(path: &Path) -> Result<String, PublishError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PublishError::Snippet {
            path: path.to_path_buf(),
            source,
        })
}

/// One file to publish.
#[derive(Debug, Clone, PartialEq)]
pub struct FileTask {
    pub source: PathBuf,
    /// Path relative to the site root, `/`-separated.
    pub relative: String,
    pub key: String,
    pub content_type: String,
    pub kind: PageKind,
}

/// Files to publish and files left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub section: String,
    pub tasks: Vec<FileTask>,
    /// Relative paths excluded as snippet sources.
    pub skipped: Vec<String>,
}

/// Outcome of a settled run.
#[derive(Debug)]
pub struct PublishReport {
    pub target: String,
    pub uploaded: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: usize,
    /// First failure encountered, if any.
    pub first_error: Option<PublishError>,
}

impl PublishReport {
    pub fn is_success(&self) -> bool {
        self.first_error.is_none()
    }
}

/// List every regular file under `root`, following symlinks, in name order.
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>, PublishError> {
    if !root.is_dir() {
        return Err(PublishError::DirectoryNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// `/`-joined normal components of a relative path.
fn relative_key(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// True when any component of the relative path is `snippets`.
pub fn is_snippet(relative: &Path) -> bool {
    relative
        .components()
        .any(|c| matches!(c, Component::Normal(s) if s == SNIPPETS_DIR))
}

/// Object key for a site-relative path.
///
/// Every `assets` directory segment gains a `<section>` segment after it;
/// all other paths are published as they are.
pub fn destination_key(relative: &str, section: &str) -> String {
    let segments: Vec<&str> = relative.split('/').collect();
    let last = segments.len().saturating_sub(1);
    let mut key = Vec::with_capacity(segments.len() + 1);
    for (i, segment) in segments.into_iter().enumerate() {
        key.push(segment);
        if segment == ASSETS_DIR && i < last {
            key.push(section);
        }
    }
    key.join("/")
}

/// MIME type from the file extension, `application/octet-stream` when unknown.
pub fn content_type(path: &Path) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
}

/// Section name: configured, else the site directory's name.
pub fn resolve_section(root: &Path, configured: Option<&str>) -> String {
    if let Some(section) = configured {
        return section.to_string();
    }
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            root.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        });
    match name {
        Some(name) => name,
        None => {
            warn!(
                root = %root.display(),
                "cannot name site section, using '{}'",
                FALLBACK_SECTION
            );
            FALLBACK_SECTION.to_string()
        }
    }
}

/// Walk `root` and compute every file's key, kind and content type.
pub fn plan_files(root: &Path, options: &PublishOptions) -> Result<Plan, PublishError> {
    let section = resolve_section(root, options.section.as_deref());
    let mut plan = Plan {
        section,
        ..Plan::default()
    };

    for source in walk_files(root)? {
        let Ok(relative) = source.strip_prefix(root) else {
            continue;
        };
        let relative_str = relative_key(relative);
        if is_snippet(relative) {
            plan.skipped.push(relative_str);
            continue;
        }
        plan.tasks.push(FileTask {
            key: destination_key(&relative_str, &plan.section),
            content_type: content_type(relative).to_string(),
            kind: PageKind::classify(relative),
            relative: relative_str,
            source,
        });
    }

    Ok(plan)
}

/// Read, render and upload one file.
async fn publish_file<S: ObjectStore + ?Sized>(
    task: &FileTask,
    input: AlbumInput<'_>,
    templater: Templater<'_>,
    snippets: &Snippets,
    store: &S,
) -> Result<(), PublishError> {
    let raw = tokio::fs::read(&task.source)
        .await
        .map_err(|source| PublishError::Read {
            path: task.source.clone(),
            source,
        })?;

    let body = match task.kind {
        PageKind::ErrorPage => {
            pages::render_error_page(&String::from_utf8_lossy(&raw), &templater).into_bytes()
        }
        PageKind::HomePage => pages::render_home_page(
            &String::from_utf8_lossy(&raw),
            input,
            &snippets.album,
            &snippets.back_to,
            &templater,
            None,
        )
        .map_err(|source| PublishError::Render {
            key: task.key.clone(),
            source,
        })?
        .into_bytes(),
        PageKind::Passthrough => raw,
    };

    store
        .put_object(PutObject {
            key: task.key.clone(),
            body,
            content_type: task.content_type.clone(),
        })
        .await?;

    debug!(key = %task.key, kind = task.kind.label(), "uploaded");
    Ok(())
}

/// Publish the site under `root` with the given albums.
///
/// Returns `Err` only for failures that stop the run before any upload
/// (walk, snippets). Per-file failures are collected into the report.
pub async fn publish<S: ObjectStore + ?Sized>(
    root: &Path,
    input: AlbumInput<'_>,
    ctx: &RenderContext,
    options: &PublishOptions,
    store: &S,
) -> Result<PublishReport, PublishError> {
    let plan = {
        let root = root.to_path_buf();
        let options = options.clone();
        tokio::task::spawn_blocking(move || plan_files(&root, &options)).await??
    };
    let snippets = Snippets::load(root, &options.shared_dir, ctx.analytics_id.is_some()).await?;
    let templater = Templater::new(ctx, &snippets.analytics);

    info!(
        files = plan.tasks.len(),
        skipped = plan.skipped.len(),
        section = %plan.section,
        target = %store.describe(),
        "publishing"
    );

    let snippets = &snippets;
    let mut pending: FuturesUnordered<_> = plan
        .tasks
        .iter()
        .map(|task| async move {
            let result = publish_file(task, input, templater, snippets, store).await;
            (task, result)
        })
        .collect();

    let mut uploaded = Vec::with_capacity(plan.tasks.len());
    let mut failed = 0;
    let mut first_error = None;
    while let Some((task, result)) = pending.next().await {
        match result {
            Ok(()) => uploaded.push(task.key.clone()),
            Err(err) => {
                failed += 1;
                warn!(key = %task.key, error = %err, "file not published");
                first_error.get_or_insert(err);
            }
        }
    }
    drop(pending);

    match &first_error {
        Some(err) => error!(failed, error = %err, "publish finished with errors"),
        None => info!(uploaded = uploaded.len(), "publish complete"),
    }

    Ok(PublishReport {
        target: store.describe(),
        uploaded,
        skipped: plan.skipped,
        failed,
        first_error,
    })
}
