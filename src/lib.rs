//! # Gallery Publish
//!
//! Renders the home page of a photo gallery from plain HTML templates and
//! publishes the site directory to an S3 bucket.
//!
//! # Architecture: Render and Upload
//!
//! ```text
//! site dir ──walk──▶ plan ──┬─ index.html ─▶ home page builder ─▶ album composer ─▶ templater ─┐
//!                           ├─ error.html ─▶ error page builder ─────────────────▶ templater ─┼─▶ object store
//!                           └─ anything else (raw bytes) ──────────────────────────────────────┘
//! ```
//!
//! Every file is uploaded concurrently. A failing file never cancels the
//! others; the first failure is reported once all uploads have settled.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`template`] | Single-pass `{token}` substitution, analytics toggle, spaces → tabs |
//! | [`album`] | Album ordering strategies and album markup composition |
//! | [`pages`] | `PageKind` classification, error and home page builders |
//! | [`publish`] | Walk, plan, render and concurrent upload of a site directory |
//! | [`store`] | `ObjectStore` trait with S3 and local directory targets |
//! | [`config`] | Layered `gallery.toml` + environment config, `RenderContext` |
//! | [`types`] | Album, picture and metadata input types |
//! | [`naming`] | Display titles from `NNN-name` album keys |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Explicit Render Context
//!
//! The site name, analytics id, credits and whitespace preferences are read
//! once into a [`config::RenderContext`] and passed to every builder. Builders
//! never look at the process environment, so they are pure functions of their
//! inputs and render the same bytes every time.
//!
//! ## Single-Pass Substitution
//!
//! Templates are operator-supplied HTML, not Rust code, so they are rendered
//! with a small token map rather than a compile-time template engine. Each
//! `{token}` is resolved at most once and substituted values are never
//! rescanned; unknown tokens pass through untouched. Generated snippets of
//! markup (back links, credits, escaped album titles) are still built with
//! [Maud](https://maud.lambda.xyz/).
//!
//! ## Settle All, Report First
//!
//! Uploads fan out on a `FuturesUnordered`. Every file runs to completion or
//! failure, and the first error is kept in a single slot. There is no retry
//! and no rollback: a failed run can leave the bucket partially updated,
//! which a re-run fixes.

pub mod album;
pub mod config;
pub mod naming;
pub mod output;
pub mod pages;
pub mod publish;
pub mod store;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
