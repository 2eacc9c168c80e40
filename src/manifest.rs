//! Include manifest parsing and path matching
//!
//! A manifest is an ordered list of glob rules, one per line:
//!
//! ```text
//! # comments and blank lines are ignored
//! **/*.proto          include every .proto file
//! !**/internal/**     ...except anything under an `internal` directory
//! docs/draft.md !     a trailing ` !` also marks an exclusion
//! ```
//!
//! Evaluation is last-match-wins. A path no rule matches is included only
//! when the manifest has no include rules (empty or exclusion-only).
//!
//! Glob syntax: `*` and `?` never cross `/`, `**` spans directories,
//! `[abc]`/`[!abc]` are character classes and `\` escapes the next character.
//! A pattern without `/` is tested against the file name, a leading `/`
//! anchors it to the source root, and a trailing `/` selects a directory.
//! A rule matching a directory applies to everything below it.

use crate::error::{io_err, Error, Result};
use regex::Regex;
use std::fmt;
use std::path::Path;

/// Whether a rule selects or deselects paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Select matching paths
    Include,
    /// Deselect matching paths
    Exclude,
}

/// One compiled manifest rule
#[derive(Clone)]
pub struct ManifestRule {
    pattern: String,
    polarity: Polarity,
    regex: Regex,
}

impl ManifestRule {
    /// Compile a glob pattern
    ///
    /// `line` is only used to label errors.
    pub fn new(pattern: &str, polarity: Polarity, line: usize) -> Result<Self> {
        let bad = |reason: &str| Error::Manifest {
            line,
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if pattern.trim().is_empty() {
            return Err(bad("empty pattern"));
        }

        let (anchored, body) = match pattern.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };
        let (dir_only, body) = match body.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        if body.is_empty() {
            return Err(bad("pattern selects nothing"));
        }

        let translated = translate_glob(body).map_err(|reason| bad(&reason))?;
        let basename_only = !anchored && !body.contains('/');
        let mut source = String::from("^");
        if basename_only {
            source.push_str("(?:.*/)?");
        }
        source.push_str(&translated);
        if dir_only {
            source.push_str("/.*");
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| bad(&e.to_string()))?;
        Ok(Self {
            pattern: pattern.to_string(),
            polarity,
            regex,
        })
    }

    /// The pattern as written
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Rule polarity
    pub const fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Whether the rule matches `path` or one of its ancestor directories
    pub fn is_match(&self, path: &str) -> bool {
        if self.regex.is_match(path) {
            return true;
        }
        path.match_indices('/')
            .any(|(idx, _)| self.regex.is_match(&path[..idx]))
    }
}

impl fmt::Debug for ManifestRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManifestRule")
            .field("pattern", &self.pattern)
            .field("polarity", &self.polarity)
            .finish_non_exhaustive()
    }
}

/// Decide whether `path` is selected by `rules`
pub fn matches(path: &str, rules: &[ManifestRule]) -> bool {
    if let Some(rule) = rules.iter().rev().find(|r| r.is_match(path)) {
        return rule.polarity == Polarity::Include;
    }
    !rules.iter().any(|r| r.polarity == Polarity::Include)
}

/// Ordered rule list
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    rules: Vec<ManifestRule>,
}

impl Manifest {
    /// Parse manifest text
    pub fn parse(text: &str) -> Result<Self> {
        let mut rules = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim_start_matches('\u{feff}').trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (polarity, pattern) = if let Some(rest) = line.strip_prefix('!') {
                (Polarity::Exclude, rest.trim_start())
            } else if let Some(rest) = line.strip_suffix(" !").or_else(|| line.strip_suffix("\t!")) {
                (Polarity::Exclude, rest.trim_end())
            } else {
                (Polarity::Include, line)
            };

            let rule = ManifestRule::new(pattern, polarity, line_no).map_err(|e| match e {
                Error::Manifest { line, reason, .. } => Error::Manifest {
                    line,
                    pattern: raw.to_string(),
                    reason,
                },
                other => other,
            })?;
            rules.push(rule);
        }
        Ok(Self { rules })
    }

    /// Read and parse a manifest file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        Self::parse(&text)
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[ManifestRule] {
        &self.rules
    }

    /// No rules at all (selects everything)
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether `path` is selected
    pub fn matches(&self, path: &str) -> bool {
        matches(path, &self.rules)
    }
}

/// Translate a glob body into a regex fragment (no anchors)
fn translate_glob(glob: &str) -> std::result::Result<String, String> {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    let at_segment_start = i == 0 || chars[i - 1] == '/';
                    if at_segment_start && chars.get(i + 2) == Some(&'/') {
                        // `**/` matches zero or more directories
                        out.push_str("(?:.*/)?");
                        i += 3;
                    } else {
                        out.push_str(".*");
                        i += 2;
                    }
                } else {
                    out.push_str("[^/]*");
                    i += 1;
                }
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            '[' => {
                let (class, next) = translate_class(&chars, i)?;
                out.push_str(&class);
                i = next;
            }
            '\\' => {
                let escaped = chars
                    .get(i + 1)
                    .ok_or_else(|| "trailing backslash".to_string())?;
                out.push_str(&regex::escape(&escaped.to_string()));
                i += 2;
            }
            c => {
                out.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }

    Ok(out)
}

/// Translate `[...]` starting at `start`; returns the fragment and the index after `]`
fn translate_class(chars: &[char], start: usize) -> std::result::Result<(String, usize), String> {
    let mut i = start + 1;
    let mut out = String::from("[");

    if matches!(chars.get(i), Some('!' | '^')) {
        out.push('^');
        i += 1;
    }

    let body_start = i;
    loop {
        let Some(&c) = chars.get(i) else {
            return Err("unclosed character class".to_string());
        };
        match c {
            ']' if i > body_start => break,
            '\\' | '[' | ']' | '^' | '&' | '~' => {
                out.push('\\');
                out.push(c);
            }
            '/' => return Err("character class cannot match '/'".to_string()),
            _ => out.push(c),
        }
        i += 1;
    }

    out.push(']');
    Ok((out, i + 1))
}
