//! Page builders.
//!
//! Every file in the site directory is classified into a [`PageKind`]:
//!
//! | File name | Kind | Body |
//! |-----------|------|------|
//! | `error.html` | [`PageKind::ErrorPage`] | templated: `{website}`, analytics |
//! | `index.html` | [`PageKind::HomePage`] | templated: albums, title, back-to block, analytics |
//! | anything else | [`PageKind::Passthrough`] | raw bytes |
//!
//! Builders are pure: they take template text and a [`Templater`] and return
//! the final HTML.
//!
//! ## Back-to block
//!
//! The home page footer (`{backTo}`) is the `snippets/backto.html` snippet
//! with its `{backLink}` filled in. Exactly one of these is chosen:
//!
//! 1. a page title was given → link back to the home page
//! 2. a credits override is configured → the override, verbatim
//! 3. credits are not hidden → the default attribution
//! 4. otherwise → an empty block
//!
//! Album entries and the back-to block are spliced in as finished values, so
//! each resolves the page-wide tokens (`{website}`, `{googletracking}`,
//! `{gtag}`) in its own single pass.

use crate::album::{self, RenderError};
use crate::template::{self, Substitutions, Templater};
use crate::types::{Album, AlbumMetadata, Picture};
use maud::html;
use std::path::Path;

/// How a site file is turned into an object body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    ErrorPage,
    HomePage,
    Passthrough,
}

impl PageKind {
    const TEMPLATED: [(&'static str, PageKind); 2] = [
        ("error.html", PageKind::ErrorPage),
        ("index.html", PageKind::HomePage),
    ];

    /// Classify by exact file name.
    pub fn classify(path: &Path) -> PageKind {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return PageKind::Passthrough;
        };
        Self::TEMPLATED
            .iter()
            .find(|(file_name, _)| *file_name == name)
            .map(|(_, kind)| *kind)
            .unwrap_or(PageKind::Passthrough)
    }

    pub fn label(self) -> &'static str {
        match self {
            PageKind::ErrorPage => "error page",
            PageKind::HomePage => "home page",
            PageKind::Passthrough => "file",
        }
    }
}

/// Album input for the home page: three sequences parallel by index.
#[derive(Debug, Clone, Copy)]
pub struct AlbumInput<'a> {
    pub albums: &'a [Album],
    pub pictures: &'a [Vec<Picture>],
    pub metadata: &'a [AlbumMetadata],
}

/// Render `error.html`.
pub fn render_error_page(raw: &str, templater: &Templater<'_>) -> String {
    templater.render(raw, Substitutions::new())
}

/// Render `index.html` with the album grid.
///
/// `title` names a sub-page: it replaces the site title, selects the album
/// order, and turns the footer into a link home.
pub fn render_home_page(
    raw: &str,
    input: AlbumInput<'_>,
    album_markup: &str,
    back_to: &str,
    templater: &Templater<'_>,
    title: Option<&str>,
) -> Result<String, RenderError> {
    let ctx = templater.context();
    let page = templater.page_substitutions();
    let views = album::views(input.albums, input.pictures, input.metadata)?;
    let pictures = album::compose(views, title, album_markup, &ctx.sorting, &page);

    let subs = Substitutions::new()
        .with(template::TITLE, title.unwrap_or(ctx.site_title.as_str()))
        .with(template::PICTURES, pictures)
        .with(template::BACK_TO, back_to_markup(back_to, templater, title));

    Ok(templater.render(raw, subs))
}

/// Pick and fill the footer block.
pub fn back_to_markup(back_to: &str, templater: &Templater<'_>, title: Option<&str>) -> String {
    let ctx = templater.context();
    let back_link = if title.is_some() {
        home_link(&ctx.site_title)
    } else if let Some(credits) = &ctx.credits_override {
        credits.clone()
    } else if !ctx.hide_credits {
        default_credits()
    } else {
        return String::new();
    };

    let mut subs = templater.page_substitutions();
    subs.insert(template::BACK_LINK, back_link);
    template::substitute(back_to, &subs)
}

fn home_link(site_title: &str) -> String {
    html! {
        a href="/" { "Back to " (site_title) }
    }
    .into_string()
}

fn default_credits() -> String {
    html! {
        a href="https://html5up.net" { "Design: HTML5 UP" }
    }
    .into_string()
}
