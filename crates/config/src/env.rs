//! `$VAR` / `${VAR}` expansion for manifest paths

use std::path::{Path, PathBuf};

/// Expand environment variable references in `input`
///
/// Unset variables expand to the empty string. A `$` that does not start a
/// reference (and an unterminated `${`) is kept as is.
#[must_use]
pub fn expand_env(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

/// [`expand_env`] for paths; non-UTF-8 paths are returned unchanged
#[must_use]
pub fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) if s.contains('$') => PathBuf::from(expand_env(s)),
        _ => path.to_path_buf(),
    }
}

pub(crate) fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                out.push_str(&lookup(&braced[..end]).unwrap_or_default());
                rest = &braced[end + 1..];
                continue;
            }
        } else {
            let len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            if len > 0 {
                out.push_str(&lookup(&after[..len]).unwrap_or_default());
                rest = &after[len..];
                continue;
            }
        }

        out.push('$');
        rest = after;
    }

    out.push_str(rest);
    out
}
