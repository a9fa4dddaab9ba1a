//! Placeholder substitution for HTML templates.
//!
//! Templates are plain HTML with `{name}` placeholders. Substitution is a
//! single pass over the template: each token is looked up once in a
//! [`Substitutions`] map and replaced by its value. Values are never rescanned,
//! so a substituted value containing `{title}` stays literal, and the order in
//! which tokens are registered does not matter.
//!
//! Anything that isn't a registered token (unknown names, CSS blocks, inline
//! JavaScript, a lone brace) is copied through byte-for-byte.
//!
//! [`Templater`] layers the page-wide conditionals on top of plain
//! substitution:
//!
//! - `{website}` → site display name
//! - `{googletracking}` → analytics snippet when an analytics id is configured,
//!   otherwise `""`
//! - `{gtag}` → the analytics id, registered only when analytics is on
//! - leading indentation folded into tabs unless spaces are kept

use crate::config::RenderContext;
use std::collections::BTreeMap;

pub const WEBSITE: &str = "website";
pub const TITLE: &str = "title";
pub const PICTURES: &str = "pictures";
pub const BACK_TO: &str = "backTo";
pub const BACK_LINK: &str = "backLink";
pub const GOOGLE_TRACKING: &str = "googletracking";
pub const GTAG: &str = "gtag";

/// Token → value map for one substitution pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitutions {
    values: BTreeMap<&'static str, String>,
}

impl Substitutions {
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, token: &'static str, value: impl Into<String>) -> Self {
        self.insert(token, value);
        self
    }

    pub fn insert(&mut self, token: &'static str, value: impl Into<String>) {
        self.values.insert(token, value.into());
    }

    /// Add every entry of `other`, replacing values already present.
    pub fn extend(&mut self, other: Substitutions) {
        self.values.extend(other.values);
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }
}

/// Replace every registered `{token}` in `template` in a single pass.
///
/// Unregistered tokens are emitted verbatim. Never fails.
pub fn substitute(template: &str, subs: &Substitutions) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(['{', '}']) {
            Some(close) if after.as_bytes()[close] == b'}' => {
                let name = &after[..close];
                match subs.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            // Another `{` before any `}`: this brace opens nothing we know.
            Some(next_open) => {
                out.push('{');
                out.push_str(&after[..next_open]);
                rest = &after[next_open..];
            }
            None => {
                out.push('{');
                out.push_str(after);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Fold leading spaces on every line into tabs.
///
/// Each complete group of `tab_width` spaces in a line's indentation becomes
/// one `\t`; a shorter remainder stays as spaces. Tabs already in the
/// indentation are kept. Everything after the first non-blank character is
/// untouched.
pub fn spaces_to_tabs(body: &str, tab_width: usize) -> String {
    if tab_width == 0 {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len());
    for line in body.split_inclusive('\n') {
        let content = line.trim_start_matches([' ', '\t']);
        let indent = &line[..line.len() - content.len()];

        let mut pending = 0;
        for c in indent.chars() {
            if c == '\t' {
                out.extend(std::iter::repeat_n(' ', pending));
                pending = 0;
                out.push('\t');
            } else {
                pending += 1;
                if pending == tab_width {
                    out.push('\t');
                    pending = 0;
                }
            }
        }
        out.extend(std::iter::repeat_n(' ', pending));
        out.push_str(content);
    }
    out
}

/// Page-level renderer bound to one run's [`RenderContext`].
///
/// Holds the shared analytics snippet so every page resolves
/// `{googletracking}` the same way.
#[derive(Debug, Clone, Copy)]
pub struct Templater<'a> {
    ctx: &'a RenderContext,
    analytics_snippet: &'a str,
}

impl<'a> Templater<'a> {
    pub fn new(ctx: &'a RenderContext, analytics_snippet: &'a str) -> Self {
        Self {
            ctx,
            analytics_snippet,
        }
    }

    pub fn context(&self) -> &'a RenderContext {
        self.ctx
    }

    /// Page-wide tokens: `{website}`, `{googletracking}`, and `{gtag}` when
    /// analytics is on.
    ///
    /// Fragments spliced into a page (album entries, the back-to block) are
    /// never rescanned, so they resolve these tokens in their own pass.
    /// When analytics is off `{gtag}` is not registered.
    pub fn page_substitutions(&self) -> Substitutions {
        let mut subs = Substitutions::new().with(WEBSITE, self.ctx.website.as_str());
        match &self.ctx.analytics_id {
            Some(id) => {
                let tracking = substitute(
                    self.analytics_snippet,
                    &Substitutions::new().with(GTAG, id.as_str()),
                );
                subs.insert(GOOGLE_TRACKING, tracking);
                subs.insert(GTAG, id.as_str());
            }
            None => subs.insert(GOOGLE_TRACKING, ""),
        }
        subs
    }

    /// Render a full page: caller substitutions plus the page-wide tokens,
    /// then the whitespace pass.
    pub fn render(&self, template: &str, mut subs: Substitutions) -> String {
        subs.extend(self.page_substitutions());

        let body = substitute(template, &subs);
        if self.ctx.keep_spaces {
            body
        } else {
            spaces_to_tabs(&body, self.ctx.tab_width)
        }
    }
}
