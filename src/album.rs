//! Album markup composition.
//!
//! Zips the parallel album/picture/metadata sequences into [`AlbumView`]s,
//! orders them with an [`AlbumOrder`] when one applies, and renders each view
//! through the album snippet (`snippets/album.html`). Fragments are
//! concatenated in final order.
//!
//! ## Album snippet tokens
//!
//! | Token | Value |
//! |-------|-------|
//! | `{album}` | album key (object prefix) |
//! | `{title}` | metadata title, else derived from the key |
//! | `{cover}` | key of the first picture, `""` for an empty album |
//! | `{count}` | number of pictures |
//! | `{date}` | `YYYY-MM-DD`, `""` when unknown |
//! | `{description}` | metadata description, `""` when unknown |
//!
//! Key, title and cover are HTML-escaped; the description is inserted as
//! written so it may carry markup.
//!
//! Page-wide tokens (`{website}`, `{googletracking}`, `{gtag}`) resolve in
//! the same pass, so the snippet may use them too.

use crate::config::SortingConfig;
use crate::template::{Substitutions, substitute};
use crate::types::{Album, AlbumMetadata, AlbumView, Picture};
use maud::html;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RenderError {
    #[error(
        "album input lengths differ: {albums} albums, {pictures} picture lists, {metadata} metadata entries"
    )]
    LengthMismatch {
        albums: usize,
        pictures: usize,
        metadata: usize,
    },
}

/// Ordering strategy for albums on a page.
///
/// Albums lacking the field a strategy sorts on go last, in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlbumOrder {
    /// Oldest first by metadata date.
    Chronological,
    /// Newest first by metadata date.
    ReverseChronological,
    /// Ascending metadata `order` weight.
    Custom,
    /// Display title, case-insensitive.
    Alphabetical,
}

impl AlbumOrder {
    pub const ALL: [AlbumOrder; 4] = [
        AlbumOrder::Chronological,
        AlbumOrder::ReverseChronological,
        AlbumOrder::Custom,
        AlbumOrder::Alphabetical,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AlbumOrder::Chronological => "chronological",
            AlbumOrder::ReverseChronological => "reverse-chronological",
            AlbumOrder::Custom => "custom",
            AlbumOrder::Alphabetical => "alphabetical",
        }
    }

    /// Stable in-place sort.
    pub fn sort(self, views: &mut [AlbumView<'_>]) {
        match self {
            AlbumOrder::Chronological => views.sort_by(|a, b| {
                missing_last(a.metadata.date, b.metadata.date, Ordering::Less)
            }),
            AlbumOrder::ReverseChronological => views.sort_by(|a, b| {
                missing_last(a.metadata.date, b.metadata.date, Ordering::Greater)
            }),
            AlbumOrder::Custom => views.sort_by(|a, b| {
                missing_last(a.metadata.order, b.metadata.order, Ordering::Less)
            }),
            AlbumOrder::Alphabetical => views.sort_by_key(|v| v.title().to_lowercase()),
        }
    }
}

/// Compare two optional keys, `None` after every `Some`.
///
/// `direction` is `Less` for ascending, `Greater` for descending.
fn missing_last<T: Ord>(a: Option<T>, b: Option<T>, direction: Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if direction == Ordering::Greater => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl fmt::Display for AlbumOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlbumOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        AlbumOrder::ALL
            .into_iter()
            .find(|order| order.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown album order '{s}'"))
    }
}

/// Zip the three parallel sequences by index.
pub fn views<'a>(
    albums: &'a [Album],
    pictures: &'a [Vec<Picture>],
    metadata: &'a [AlbumMetadata],
) -> Result<Vec<AlbumView<'a>>, RenderError> {
    if albums.len() != pictures.len() || albums.len() != metadata.len() {
        return Err(RenderError::LengthMismatch {
            albums: albums.len(),
            pictures: pictures.len(),
            metadata: metadata.len(),
        });
    }

    Ok(albums
        .iter()
        .zip(pictures)
        .zip(metadata)
        .map(|((album, pictures), metadata)| AlbumView {
            album,
            pictures,
            metadata,
        })
        .collect())
}

fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}

/// Token values for one album.
pub fn album_substitutions(view: &AlbumView<'_>) -> Substitutions {
    Substitutions::new()
        .with("album", escape(&view.album.key))
        .with("title", escape(&view.title()))
        .with(
            "cover",
            view.cover().map(|p| escape(&p.key)).unwrap_or_default(),
        )
        .with("count", view.pictures.len().to_string())
        .with(
            "date",
            view.metadata
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        )
        .with(
            "description",
            view.metadata.description.clone().unwrap_or_default(),
        )
}

/// Order the views for `order_key` and render each through `album_markup`.
///
/// `page` holds the page-wide tokens; album tokens win on a name clash.
/// Without a resolvable order the input order is kept.
pub fn compose(
    mut views: Vec<AlbumView<'_>>,
    order_key: Option<&str>,
    album_markup: &str,
    sorting: &SortingConfig,
    page: &Substitutions,
) -> String {
    if let Some(order) = sorting.resolve(order_key) {
        order.sort(&mut views);
    }

    views
        .iter()
        .map(|view| {
            let mut subs = page.clone();
            subs.extend(album_substitutions(view));
            substitute(album_markup, &subs)
        })
        .collect()
}
