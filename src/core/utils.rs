//! String path helpers shared by the backends.
//!
//! Virtual paths are plain `/`-separated strings. There is a single rooted namespace:
//! `a/b`, `/a/b` and `/a//b/` all name the same node.

/// Splits `path` on `/` and drops empty segments.
/// `.` and `..` are returned as literal segments.
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|part| !part.is_empty())
}

/// Returns `true` if `path` names the root (`/`, `//`, or the empty string).
pub fn is_virtual_root(path: &str) -> bool {
    components(path).next().is_none()
}

/// Lexically normalizes a path: collapses redundant separators, drops `.` and resolves `..`.
/// A trailing separator is removed except for the root.
/// Relative paths stay relative; `..` above a relative start is kept.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in components(path) {
        match part {
            "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                // `..` at root stays at root
                _ if absolute => {}
                _ => parts.push(part),
            },
            _ => parts.push(part),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Joins `path` onto `base` the way a shell would: an absolute `path` wins.
pub fn join(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        return path.to_string();
    }
    if base.ends_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Replaces a leading `~` with `home`, then normalizes the result.
/// Paths without a leading `~` are normalized too.
pub fn expand_tilde(path: &str, home: &str) -> String {
    match path.strip_prefix('~') {
        Some(rest) => normalize(&format!("{home}/{rest}")),
        None => normalize(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_drops_empty_segments() {
        let parts: Vec<_> = components("/a//b/").collect();
        assert_eq!(parts, vec!["a", "b"]);

        let parts: Vec<_> = components("a/./b").collect();
        assert_eq!(parts, vec!["a", ".", "b"]);

        assert_eq!(components("/").count(), 0);
        assert_eq!(components("").count(), 0);
    }

    #[test]
    fn test_is_virtual_root() {
        assert!(is_virtual_root("/"));
        assert!(is_virtual_root("//"));
        assert!(is_virtual_root(""));
        assert!(!is_virtual_root("/a"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/a/b/c/"), "/a/b/c");
        assert_eq!(normalize("/a//b/./c"), "/a/b/c");
        assert_eq!(normalize("/a/b/../c"), "/a/c");
        assert_eq!(normalize("/../a"), "/a");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("a/../.."), "..");
        assert_eq!(normalize("./"), ".");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/dir1", "teve"), "/dir1/teve");
        assert_eq!(join("/", "teve"), "/teve");
        assert_eq!(join("/dir1", "/teve"), "/teve");
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("~/teve", "/home/douglas/"), "/home/douglas/teve");
        assert_eq!(expand_tilde("~", "/home/douglas"), "/home/douglas");
        assert_eq!(expand_tilde("/etc/~x", "/home/douglas"), "/etc/~x");
        assert_eq!(expand_tilde("/etc//teve/", "/home/douglas"), "/etc/teve");
    }
}
