//! Lexical path handling shared by every scan mode.
//!
//! Paths reported by torrent backends and paths discovered on disk are both
//! reduced to one canonical string form before they are compared. Nothing in
//! this module touches the filesystem.

use std::path::MAIN_SEPARATOR;

use unseeded_config::PathMapping;

/// Separator used by canonical paths on this host.
pub const SEPARATOR: char = MAIN_SEPARATOR;

const fn is_separator(ch: char) -> bool {
    ch == '/' || ch == '\\'
}

/// Canonicalize a path string for comparison on this host.
///
/// Both `/` and `\` become the host separator, runs of separators collapse
/// (a leading UNC pair is kept), and trailing separators are removed unless
/// the path is the root itself. The empty string stays empty.
#[must_use]
pub fn normalize(path: &str) -> String {
    normalize_with(path, SEPARATOR)
}

pub(crate) fn normalize_with(path: &str, separator: char) -> String {
    if path.is_empty() {
        return String::new();
    }

    let mut chars = path.chars();
    let unc = matches!(
        (chars.next(), chars.next()),
        (Some(a), Some(b)) if is_separator(a) && is_separator(b)
    );

    let mut out = String::with_capacity(path.len() + 1);
    let mut previous_was_separator = false;
    for ch in path.chars() {
        if is_separator(ch) {
            if !previous_was_separator {
                out.push(separator);
            }
            previous_was_separator = true;
        } else {
            out.push(ch);
            previous_was_separator = false;
        }
    }

    while out.len() > separator.len_utf8() && out.ends_with(separator) {
        out.pop();
    }

    if unc && out.len() > separator.len_utf8() {
        out.insert(0, separator);
    }
    out
}

/// Containment test on canonical paths.
///
/// `path` is within `container` when they are equal or when `path` continues
/// past `container` at a separator boundary; `/data/Show1` never contains
/// `/data/Show10/e01.mkv`.
#[must_use]
pub fn is_within(path: &str, container: &str) -> bool {
    is_within_with(path, container, SEPARATOR)
}

fn is_within_with(path: &str, container: &str, separator: char) -> bool {
    relative_to(path, container, separator).is_some()
}

fn relative_to<'a>(path: &'a str, prefix: &str, separator: char) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    if path == prefix {
        return Some("");
    }
    let rest = path.strip_prefix(prefix)?;
    if prefix.ends_with(separator) {
        Some(rest)
    } else {
        rest.strip_prefix(separator)
    }
}

/// Join a torrent name onto a directory using the host separator.
#[must_use]
pub fn join(directory: &str, name: &str) -> String {
    if directory.is_empty() {
        return normalize(name);
    }
    if name.is_empty() {
        return normalize(directory);
    }
    normalize(&format!("{directory}{SEPARATOR}{name}"))
}

/// Apply a single mapping rule.
///
/// When `source` lies under the rule's remote prefix, the prefix is replaced
/// by the local one and the result is canonicalized; otherwise `source` is
/// returned unchanged.
#[must_use]
pub fn translate(source: &str, mapping: &PathMapping) -> String {
    translate_with(source, mapping, SEPARATOR)
}

fn translate_with(source: &str, mapping: &PathMapping, separator: char) -> String {
    let remote = normalize_with(mapping.remote.trim(), '/');
    let candidate = normalize_with(source, '/');

    let Some(relative) = relative_to(&candidate, &remote, '/') else {
        return source.to_string();
    };

    let local = normalize_with(mapping.local.trim(), separator);
    let joined = if relative.is_empty() {
        local
    } else if local.is_empty() || local.ends_with(separator) {
        format!("{local}{relative}")
    } else {
        format!("{local}{separator}{relative}")
    };
    normalize_with(&joined, separator)
}

/// Apply mapping rules in order; the first rule that changes the path wins.
#[must_use]
pub fn translate_with_rules(source: &str, mappings: &[PathMapping]) -> String {
    mappings
        .iter()
        .map(|mapping| translate(source, mapping))
        .find(|translated| translated != source)
        .unwrap_or_else(|| source.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_unifies_and_collapses_separators() {
        assert_eq!(normalize_with("/data//movies/", '/'), "/data/movies");
        assert_eq!(normalize_with("T:\\movies\\\\x.mkv", '/'), "T:/movies/x.mkv");
        assert_eq!(normalize_with("C:/Downloads/", '\\'), "C:\\Downloads");
        assert_eq!(normalize_with("///", '/'), "/");
        assert_eq!(normalize_with("", '/'), "");
    }

    #[test]
    fn normalize_keeps_unc_prefix() {
        assert_eq!(
            normalize_with("\\\\nas\\share\\\\tv\\", '\\'),
            "\\\\nas\\share\\tv"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "",
            "/",
            "//",
            "relative/dir/",
            "/data//movies/",
            "T:\\movies\\x.mkv",
            "\\\\nas\\share\\\\tv\\",
            "C:/",
        ];
        for separator in ['/', '\\'] {
            for sample in samples {
                let once = normalize_with(sample, separator);
                assert_eq!(normalize_with(&once, separator), once, "sample {sample:?}");
            }
        }
    }

    #[test]
    fn containment_respects_separator_boundaries() {
        assert!(is_within_with("/data/Show1/e01.mkv", "/data/Show1", '/'));
        assert!(is_within_with("/data/Show1", "/data/Show1", '/'));
        assert!(!is_within_with("/data/Show10/e01.mkv", "/data/Show1", '/'));
        assert!(is_within_with("/anything", "/", '/'));
        assert!(!is_within_with("/data", "", '/'));
    }

    #[test]
    fn translate_replaces_matching_prefix() {
        let mapping = PathMapping::new("/data", "/mnt/user/data");
        assert_eq!(
            translate_with("/data/movies", &mapping, '/'),
            "/mnt/user/data/movies"
        );
        assert_eq!(translate_with("/data", &mapping, '/'), "/mnt/user/data");
    }

    #[test]
    fn translate_is_a_noop_outside_the_prefix() {
        let mapping = PathMapping::new("/data", "/mnt/user/data");
        assert_eq!(translate_with("/database/x", &mapping, '/'), "/database/x");
        assert_eq!(translate_with("/other/x", &mapping, '/'), "/other/x");
    }

    #[test]
    fn translate_to_windows_drive_root() {
        let mapping = PathMapping::new("/download", "T:\\");
        assert_eq!(
            translate_with("/download/movies", &mapping, '\\'),
            "T:\\movies"
        );
        assert_eq!(translate_with("/download/movies", &mapping, '/'), "T:/movies");
    }

    #[test]
    fn translate_from_root_remote() {
        let mapping = PathMapping::new("/", "/srv/torrents");
        assert_eq!(
            translate_with("/tv/show", &mapping, '/'),
            "/srv/torrents/tv/show"
        );
    }

    #[test]
    fn first_changing_rule_wins() {
        let mappings = vec![
            PathMapping::new("/other", "/mnt/other"),
            PathMapping::new("/data", "/mnt/first"),
            PathMapping::new("/data", "/mnt/second"),
        ];
        let expected = normalize("/mnt/first/tv");
        assert_eq!(translate_with_rules("/data/tv", &mappings), expected);
        assert_eq!(translate_with_rules("/elsewhere", &mappings), "/elsewhere");
    }

    #[test]
    fn join_inserts_single_separator() {
        assert_eq!(join("/downloads/", "Movie.mkv"), normalize("/downloads/Movie.mkv"));
        assert_eq!(join("", "Movie.mkv"), "Movie.mkv");
    }
}
