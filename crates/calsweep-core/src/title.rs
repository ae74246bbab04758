//! Title normalization for grouping recurring events.
//!
//! Titles of recurring items often differ only by a counter or a date
//! ("Team Sync #42", "Team Sync #43"). [`normalize_title`] collapses these
//! to one canonical [`TitleKey`]:
//!
//! 1. Absent or empty titles map to [`NO_TITLE_KEY`].
//! 2. The title is lower-cased.
//! 3. Everything except `a`-`z` and whitespace is removed. The information
//!    separators U+001C to U+001F count as whitespace.
//! 4. Whitespace runs collapse to a single space and the ends are trimmed.
//! 5. If nothing is left, the original title is used as the key.
//!
//! # Example
//!
//! ```
//! use calsweep_core::title::normalize_title;
//!
//! assert_eq!(normalize_title(Some("Team Sync #42")).as_str(), "team sync");
//! assert_eq!(normalize_title(Some("team sync, #43!!")).as_str(), "team sync");
//! assert_eq!(normalize_title(Some("12345")).as_str(), "12345");
//! assert_eq!(normalize_title(None).as_str(), "no title");
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Key used for events without a title.
pub const NO_TITLE_KEY: &str = "no title";

/// Matches every character that is neither a lowercase latin letter nor a
/// separator (whitespace or U+001C to U+001F).
static NON_LETTER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z\s\x1C-\x1F]").expect("Invalid non-letter regex"));

fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Canonical grouping key derived from an event title. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleKey(String);

impl TitleKey {
    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TitleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TitleKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TitleKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Maps a raw event title to its grouping key.
pub fn normalize_title(title: Option<&str>) -> TitleKey {
    let raw = match title {
        Some(t) if !t.is_empty() => t,
        _ => return TitleKey(NO_TITLE_KEY.to_string()),
    };

    let lowered = raw.to_lowercase();
    let letters_only = NON_LETTER_REGEX.replace_all(&lowered, "");
    let collapsed = letters_only
        .split(is_separator)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.is_empty() {
        TitleKey(raw.to_string())
    } else {
        TitleKey(collapsed)
    }
}
