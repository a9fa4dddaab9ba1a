//! Site configuration module.
//!
//! Handles loading, validating, and layering the publish configuration.
//! Values are resolved in three layers, each overriding the previous one:
//!
//! ```text
//! stock defaults  →  gallery.toml (optional)  →  environment variables
//! ```
//!
//! The environment layer keeps the variable names the deployment has always
//! used (`WEBSITE`, `GOOGLEANALYTICS`, `SITE_BUCKET`, ...), so a Lambda or CI
//! job can drive a publish without any config file at all.
//!
//! ## Configuration Options
//!
//! ```toml
//! website = ""                      # Site display name ({website})
//! title = ""                        # Default page title, also used in back links
//!
//! [analytics]
//! google = ""                       # Tracking id; empty disables tracking
//!
//! [credits]
//! # override = "<a href=...>..</a>" # Replaces the default attribution
//! hide = false                      # Hide the default attribution
//!
//! [format]
//! spaces_instead_of_tabs = false    # Keep leading spaces in rendered pages
//! tab_width = 4                     # Spaces folded into one tab
//!
//! [sorting]
//! # default = "custom"              # Album order on the home page
//! [sorting.pages]
//! # "Travel" = "reverse-chronological"
//!
//! [publish]
//! bucket = ""
//! # region = "eu-west-1"
//! # endpoint = "http://localhost:9000"
//! # section = "homepage"            # Assets namespace, defaults to the site dir name
//! shared_dir = "shared"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::album::AlbumOrder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Publish configuration.
///
/// All fields have defaults; a config file only needs the values it
/// overrides. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site display name, substituted for `{website}`.
    pub website: String,
    /// Site-wide title: fallback page title and back-link label.
    pub title: String,
    pub analytics: AnalyticsConfig,
    pub credits: CreditsConfig,
    pub format: FormatConfig,
    pub sorting: SortingConfig,
    pub publish: PublishConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.format.tab_width == 0 {
            return Err(ConfigError::Validation(
                "format.tab_width must be at least 1".into(),
            ));
        }
        if let Some(section) = &self.publish.section {
            if section.is_empty() || section.contains('/') {
                return Err(ConfigError::Validation(
                    "publish.section must be a single non-empty path segment".into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyticsConfig {
    /// Google Analytics tracking id. Empty disables tracking.
    pub google: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreditsConfig {
    /// Markup used verbatim instead of the default attribution.
    #[serde(rename = "override", skip_serializing_if = "Option::is_none")]
    pub override_markup: Option<String>,
    /// Hide the default attribution when no override is set.
    pub hide: bool,
}

/// Output formatting of rendered pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// Keep leading spaces instead of folding them into tabs.
    pub spaces_instead_of_tabs: bool,
    /// Number of leading spaces folded into a single tab.
    pub tab_width: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            spaces_instead_of_tabs: false,
            tab_width: 4,
        }
    }
}

/// Album ordering rules.
///
/// `pages` maps a page title to the order used when that page is rendered;
/// `default` applies to the untitled home page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SortingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<AlbumOrder>,
    pub pages: BTreeMap<String, AlbumOrder>,
}

impl SortingConfig {
    /// Resolve the ordering strategy for an order key.
    ///
    /// A page entry wins over the key's own meaning, so a page titled
    /// "custom" can still be mapped to another order.
    pub fn resolve(&self, order_key: Option<&str>) -> Option<AlbumOrder> {
        match order_key {
            Some(key) => self
                .pages
                .get(key)
                .copied()
                .or_else(|| key.parse().ok()),
            None => self.default,
        }
    }
}

/// Object storage target and site layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    pub bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// S3-compatible endpoint (MinIO, LocalStack). Enables path-style addressing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Namespace inserted after `assets/` in object keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Directory holding snippets shared between sites (`snippets/ga.html`).
    pub shared_dir: PathBuf,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: None,
            endpoint: None,
            section: None,
            shared_dir: PathBuf::from("shared"),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Environment variables recognized as config overrides, with their TOML path.
const ENV_STRINGS: &[(&str, &[&str])] = &[
    ("WEBSITE", &["website"]),
    ("WEBSITE_TITLE", &["title"]),
    ("GOOGLEANALYTICS", &["analytics", "google"]),
    ("HOME_PAGE_CREDITS_OVERRIDE", &["credits", "override"]),
    ("ALBUM_SORT", &["sorting", "default"]),
    ("SITE_BUCKET", &["publish", "bucket"]),
    ("AWS_REGION", &["publish", "region"]),
    ("S3_ENDPOINT", &["publish", "endpoint"]),
];

const ENV_FLAGS: &[(&str, &[&str])] = &[
    ("HIDE_HOME_PAGE_CREDITS", &["credits", "hide"]),
    ("SPACES_INSTEAD_OF_TABS", &["format", "spaces_instead_of_tabs"]),
];

/// Interpret a flag variable: set and non-empty means on, except `0`/`false`.
pub fn env_flag(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}

/// Build a config overlay from environment variables.
///
/// Takes the variables as an iterator so tests don't touch the process
/// environment. Returns `None` when no recognized variable is present.
///
/// `HOME_PAGE_CREDITS_OVERRIDE` and `ALBUM_SORT` are ignored when empty.
pub fn env_overlay<I, K, V>(vars: I) -> Option<toml::Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut table = toml::Table::new();
    for (name, value) in vars {
        let (name, value) = (name.as_ref(), value.as_ref());
        if let Some((_, path)) = ENV_STRINGS.iter().find(|(var, _)| *var == name) {
            let optional = matches!(
                name,
                "HOME_PAGE_CREDITS_OVERRIDE" | "ALBUM_SORT" | "AWS_REGION" | "S3_ENDPOINT"
            );
            if optional && value.is_empty() {
                continue;
            }
            insert_path(&mut table, path, toml::Value::String(value.to_string()));
        } else if let Some((_, path)) = ENV_FLAGS.iter().find(|(var, _)| *var == name) {
            insert_path(&mut table, path, toml::Value::Boolean(env_flag(value)));
        }
    }
    if table.is_empty() {
        None
    } else {
        Some(toml::Value::Table(table))
    }
}

fn insert_path(table: &mut toml::Table, path: &[&str], value: toml::Value) {
    match path {
        [] => {}
        [last] => {
            table.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let child = table
                .entry((*head).to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            if let toml::Value::Table(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}

/// Merge overlays onto a base value in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an optional file plus the process environment.
///
/// A missing file is not an error: the stock defaults and the environment
/// are enough to publish.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let file = load_raw_config(path)?;
    let env = env_overlay(std::env::vars());
    resolve_config(stock_defaults_value(), file.into_iter().chain(env))
}

/// Returns a fully-commented stock `gallery.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Gallery Publish Configuration
# =============================
# All settings are optional. Values shown below are the defaults.
# Every setting marked [ENV] can also be set through the named environment
# variable, which wins over this file.
# Unknown keys will cause an error.

# Site display name, substituted for {website}.            [ENV: WEBSITE]
website = ""

# Default page title and back-link label.                   [ENV: WEBSITE_TITLE]
title = ""

# ---------------------------------------------------------------------------
# Analytics
# ---------------------------------------------------------------------------
[analytics]
# Google Analytics id. Empty disables the tracking snippet. [ENV: GOOGLEANALYTICS]
google = ""

# ---------------------------------------------------------------------------
# Credits shown in the home page footer
# ---------------------------------------------------------------------------
[credits]
# Markup used verbatim instead of the default attribution.
#                                          [ENV: HOME_PAGE_CREDITS_OVERRIDE]
# override = '<a href="https://example.com">Photos by me</a>'

# Hide the default attribution.            [ENV: HIDE_HOME_PAGE_CREDITS]
hide = false

# ---------------------------------------------------------------------------
# Output formatting
# ---------------------------------------------------------------------------
[format]
# Keep leading spaces instead of folding them into tabs.
#                                          [ENV: SPACES_INSTEAD_OF_TABS]
spaces_instead_of_tabs = false

# Leading spaces folded into one tab.
tab_width = 4

# ---------------------------------------------------------------------------
# Album ordering
# One of: chronological, reverse-chronological, custom, alphabetical.
# ---------------------------------------------------------------------------
[sorting]
# Order of albums on the home page.        [ENV: ALBUM_SORT]
# default = "custom"

# Per-page orders, keyed by page title.
[sorting.pages]
# "Travel" = "reverse-chronological"

# ---------------------------------------------------------------------------
# Publishing
# ---------------------------------------------------------------------------
[publish]
# Target bucket.                           [ENV: SITE_BUCKET]
bucket = ""

# Region; defaults to the AWS environment.  [ENV: AWS_REGION]
# region = "us-east-1"

# S3-compatible endpoint, path-style.      [ENV: S3_ENDPOINT]
# endpoint = "http://localhost:9000"

# Namespace inserted after assets/ in object keys.
# Defaults to the site directory name.
# section = "homepage"

# Directory holding snippets/ga.html.
shared_dir = "shared"
"##
}

// =============================================================================
// Render context
// =============================================================================

/// Environment-derived toggles for one publish run.
///
/// Built once from [`SiteConfig`] and passed by reference into every render,
/// so page builders stay pure.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    pub website: String,
    pub site_title: String,
    /// `None` when tracking is disabled.
    pub analytics_id: Option<String>,
    pub credits_override: Option<String>,
    pub hide_credits: bool,
    pub keep_spaces: bool,
    pub tab_width: usize,
    pub sorting: SortingConfig,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::from(&SiteConfig::default())
    }
}

impl From<&SiteConfig> for RenderContext {
    fn from(config: &SiteConfig) -> Self {
        Self {
            website: config.website.clone(),
            site_title: config.title.clone(),
            analytics_id: Some(config.analytics.google.trim())
                .filter(|id| !id.is_empty())
                .map(String::from),
            credits_override: config
                .credits
                .override_markup
                .clone()
                .filter(|markup| !markup.is_empty()),
            hide_credits: config.credits.hide,
            keep_spaces: config.format.spaces_instead_of_tabs,
            tab_width: config.format.tab_width,
            sorting: config.sorting.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_uses_tabs() {
        let config = SiteConfig::default();
        assert!(!config.format.spaces_instead_of_tabs);
        assert_eq!(config.format.tab_width, 4);
    }

    #[test]
    fn default_shared_dir() {
        let config = SiteConfig::default();
        assert_eq!(config.publish.shared_dir, PathBuf::from("shared"));
    }

    #[test]
    fn stock_defaults_roundtrip_through_resolve() {
        let config = resolve_config(stock_defaults_value(), None).unwrap();
        assert_eq!(config.format.tab_width, 4);
        assert!(config.credits.override_markup.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
website = "Gallery"

[credits]
hide = true
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.website, "Gallery");
        assert!(config.credits.hide);
        // Unspecified sections keep defaults
        assert_eq!(config.format.tab_width, 4);
    }

    #[test]
    fn parse_credits_override_key() {
        let toml = r#"
[credits]
override = "<b>me</b>"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.credits.override_markup.as_deref(), Some("<b>me</b>"));
    }

    #[test]
    fn parse_sorting_config() {
        let toml = r#"
[sorting]
default = "custom"

[sorting.pages]
Travel = "reverse-chronological"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.sorting.default, Some(AlbumOrder::Custom));
        assert_eq!(
            config.sorting.pages.get("Travel"),
            Some(&AlbumOrder::ReverseChronological)
        );
    }

    #[test]
    fn unknown_sort_name_rejected() {
        let toml = r#"
[sorting]
default = "random"
"#;
        assert!(toml::from_str::<SiteConfig>(toml).is_err());
    }

    #[test]
    fn unknown_key_rejected() {
        let toml = r#"websit = "typo""#;
        assert!(toml::from_str::<SiteConfig>(toml).is_err());
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let toml = r#"
[publish]
buckett = "typo"
"#;
        assert!(toml::from_str::<SiteConfig>(toml).is_err());
    }

    #[test]
    fn validate_tab_width_zero() {
        let mut config = SiteConfig::default();
        config.format.tab_width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_section_with_slash() {
        let mut config = SiteConfig::default();
        config.publish.section = Some("a/b".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_raw_config_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let raw = load_raw_config(&tmp.path().join("gallery.toml")).unwrap();
        assert!(raw.is_none());
    }

    #[test]
    fn load_raw_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gallery.toml");
        fs::write(&path, "this is not [valid toml").unwrap();
        assert!(matches!(load_raw_config(&path), Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"title = "a""#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"title = "b""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("title").unwrap().as_str(), Some("b"));
    }

    #[test]
    fn merge_toml_table_merge_preserves_siblings() {
        let base: toml::Value = toml::from_str(
            r#"
[credits]
hide = false
override = "x"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[credits]
hide = true
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let credits = merged.get("credits").unwrap();
        assert_eq!(credits.get("hide").unwrap().as_bool(), Some(true));
        assert_eq!(credits.get("override").unwrap().as_str(), Some("x"));
    }

    // =========================================================================
    // Environment overlay
    // =========================================================================

    #[test]
    fn env_flag_values() {
        assert!(env_flag("1"));
        assert!(env_flag("true"));
        assert!(env_flag("yes"));
        assert!(!env_flag(""));
        assert!(!env_flag("0"));
        assert!(!env_flag("FALSE"));
    }

    #[test]
    fn env_overlay_none_when_no_known_vars() {
        assert!(env_overlay([("HOME", "/root"), ("PATH", "/bin")]).is_none());
    }

    #[test]
    fn env_overlay_maps_nested_keys() {
        let overlay = env_overlay([
            ("WEBSITE", "My Site"),
            ("GOOGLEANALYTICS", "UA-1"),
            ("HIDE_HOME_PAGE_CREDITS", "1"),
            ("SITE_BUCKET", "bucket"),
        ])
        .unwrap();
        assert_eq!(overlay.get("website").unwrap().as_str(), Some("My Site"));
        let analytics = overlay.get("analytics").unwrap();
        assert_eq!(analytics.get("google").unwrap().as_str(), Some("UA-1"));
        let credits = overlay.get("credits").unwrap();
        assert_eq!(credits.get("hide").unwrap().as_bool(), Some(true));
        let publish = overlay.get("publish").unwrap();
        assert_eq!(publish.get("bucket").unwrap().as_str(), Some("bucket"));
    }

    #[test]
    fn env_overrides_file() {
        let file: toml::Value = toml::from_str(
            r#"
title = "From file"
website = "Kept"
"#,
        )
        .unwrap();
        let env = env_overlay([("WEBSITE_TITLE", "From env")]);
        let config =
            resolve_config(stock_defaults_value(), Some(file).into_iter().chain(env)).unwrap();
        assert_eq!(config.title, "From env");
        assert_eq!(config.website, "Kept");
    }

    #[test]
    fn empty_credits_override_env_is_ignored() {
        assert!(env_overlay([("HOME_PAGE_CREDITS_OVERRIDE", "")]).is_none());
    }

    #[test]
    fn invalid_album_sort_env_is_error() {
        let env = env_overlay([("ALBUM_SORT", "sideways")]);
        let result = resolve_config(stock_defaults_value(), env);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Render context
    // =========================================================================

    #[test]
    fn render_context_blank_analytics_is_disabled() {
        let mut config = SiteConfig::default();
        config.analytics.google = "   ".to_string();
        assert_eq!(RenderContext::from(&config).analytics_id, None);
    }

    #[test]
    fn render_context_copies_toggles() {
        let mut config = SiteConfig::default();
        config.analytics.google = "G-123".to_string();
        config.credits.override_markup = Some("mine".to_string());
        config.format.spaces_instead_of_tabs = true;
        let ctx = RenderContext::from(&config);
        assert_eq!(ctx.analytics_id.as_deref(), Some("G-123"));
        assert_eq!(ctx.credits_override.as_deref(), Some("mine"));
        assert!(ctx.keep_spaces);
    }

    #[test]
    fn sorting_resolve_prefers_page_entry() {
        let mut sorting = SortingConfig::default();
        sorting
            .pages
            .insert("custom".to_string(), AlbumOrder::Alphabetical);
        assert_eq!(sorting.resolve(Some("custom")), Some(AlbumOrder::Alphabetical));
    }

    #[test]
    fn sorting_resolve_parses_key() {
        let sorting = SortingConfig::default();
        assert_eq!(
            sorting.resolve(Some("chronological")),
            Some(AlbumOrder::Chronological)
        );
        assert_eq!(sorting.resolve(Some("Travel")), None);
    }

    #[test]
    fn sorting_resolve_default_for_home() {
        let sorting = SortingConfig {
            default: Some(AlbumOrder::Custom),
            pages: BTreeMap::new(),
        };
        assert_eq!(sorting.resolve(None), Some(AlbumOrder::Custom));
    }
}
