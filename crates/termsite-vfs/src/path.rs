//! Virtual path resolution
//!
//! Paths are plain strings: absolute paths start with [`SEPARATOR`], `~` is
//! the session's home directory and `..` the parent of the current one.
//! Resolution never fails; callers check [`is_syntactically_valid`] on the
//! result and turn a `false` into a command-level error.

/// Path separator
pub const SEPARATOR: char = '/';

/// The root directory
pub const ROOT: &str = "/";

/// Home directory shorthand
pub const HOME_ALIAS: &str = "~";

/// Previous directory shorthand (resolves to home here)
pub const PREVIOUS_ALIAS: &str = "-";

/// Parent directory shorthand
pub const PARENT_ALIAS: &str = "..";

/// Current directory shorthand
pub const CURRENT_ALIAS: &str = ".";

/// Directory that holds every user's home
pub const HOME_BASE: &str = "/home";

/// Home directory path for a nickname
///
/// # Examples
/// - `alice` → `/home/alice`
#[inline]
#[must_use]
pub fn home_path(nickname: &str) -> String {
    join(HOME_BASE, nickname)
}

/// Resolves user-typed targets against a current directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    home: String,
}

impl PathResolver {
    /// Create resolver for the given home directory
    #[inline]
    #[must_use]
    pub fn new(home: impl Into<String>) -> Self {
        Self { home: home.into() }
    }

    /// Create resolver whose home is `/home/<nickname>`
    #[inline]
    #[must_use]
    pub fn for_nickname(nickname: &str) -> Self {
        Self::new(home_path(nickname))
    }

    /// Home directory
    #[inline]
    #[must_use]
    pub fn home(&self) -> &str {
        &self.home
    }

    /// Turn `target` into an absolute path
    ///
    /// - empty, `~` or `-` → home
    /// - `..` → parent of `current_dir` (root's parent is root)
    /// - `.` → `current_dir`
    /// - `~/rest` → home joined with `rest`
    /// - absolute → used as is
    /// - anything else → `current_dir` joined with `target`
    ///
    /// One trailing separator is dropped, so `projects/` and `projects`
    /// agree. Doubled separators are kept for validation to reject.
    #[must_use]
    pub fn resolve(&self, current_dir: &str, target: &str) -> String {
        let target = target.trim();
        match target {
            "" | HOME_ALIAS | PREVIOUS_ALIAS => self.home.clone(),
            PARENT_ALIAS => parent_of(current_dir),
            CURRENT_ALIAS => current_dir.to_string(),
            _ => {
                let joined = if let Some(rest) = target.strip_prefix("~/") {
                    join(&self.home, rest)
                } else if target.starts_with(SEPARATOR) {
                    target.to_string()
                } else {
                    join(current_dir, target)
                };
                trim_trailing_separator(&joined)
            }
        }
    }
}

/// Strip the last path segment; the parent of root is root
#[must_use]
pub fn parent_of(path: &str) -> String {
    let path = path.trim_end_matches(SEPARATOR);
    match path.rfind(SEPARATOR) {
        Some(0) | None => ROOT.to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Last segment of a path (`None` for root)
#[must_use]
pub fn file_name(path: &str) -> Option<&str> {
    components(path).last()
}

/// Join a directory and a relative name without doubling the separator
#[must_use]
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with(SEPARATOR) {
        format!("{dir}{name}")
    } else {
        format!("{dir}{SEPARATOR}{name}")
    }
}

/// Non-empty segments from root to leaf
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|seg| !seg.is_empty())
}

/// Check absolute-path syntax
///
/// Must start with the separator and contain no doubled separators, no
/// backslashes, and no literal `.` or `..` components. `..` is only legal as
/// the bare `cd ..` shorthand, which is resolved before this check.
#[must_use]
pub fn is_syntactically_valid(path: &str) -> bool {
    if !path.starts_with(SEPARATOR) {
        return false;
    }
    if path.contains("//") || path.contains('\\') {
        return false;
    }
    components(path).all(|seg| seg != CURRENT_ALIAS && seg != PARENT_ALIAS)
}

/// Check a single node name: letters, digits, `.`, `_` and `-` only
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != CURRENT_ALIAS
        && name != PARENT_ALIAS
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn trim_trailing_separator(path: &str) -> String {
    if path == ROOT || path.contains("//") {
        return path.to_string();
    }
    path.strip_suffix(SEPARATOR).unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> PathResolver {
        PathResolver::for_nickname("alice")
    }

    #[test]
    fn resolve_home_aliases() {
        let r = alice();
        assert_eq!(r.resolve("/etc", ""), "/home/alice");
        assert_eq!(r.resolve("/etc", "~"), "/home/alice");
        assert_eq!(r.resolve("/etc", "-"), "/home/alice");
    }

    #[test]
    fn resolve_parent_and_current() {
        let r = alice();
        assert_eq!(r.resolve("/home/alice", ".."), "/home");
        assert_eq!(r.resolve("/home", ".."), "/");
        assert_eq!(r.resolve("/", ".."), "/");
        assert_eq!(r.resolve("/home", "."), "/home");
    }

    #[test]
    fn resolve_absolute_and_relative() {
        let r = alice();
        assert_eq!(r.resolve("/home/alice", "/etc"), "/etc");
        assert_eq!(r.resolve("/home/alice", "projects"), "/home/alice/projects");
        assert_eq!(r.resolve("/", "home"), "/home");
        assert_eq!(r.resolve("/home/alice", "projects/"), "/home/alice/projects");
        assert_eq!(r.resolve("/", "~/notes"), "/home/alice/notes");
    }

    #[test]
    fn resolve_keeps_dotdot_inside_longer_targets() {
        // Only the bare shorthand is special; the result fails validation.
        let resolved = alice().resolve("/home/alice", "../bob");
        assert_eq!(resolved, "/home/alice/../bob");
        assert!(!is_syntactically_valid(&resolved));
    }

    #[test]
    fn doubled_trailing_separators_stay_invalid() {
        let r = alice();
        assert_eq!(r.resolve("/home", "//"), "//");
        assert_eq!(r.resolve("/", "/home//"), "/home//");
        assert_eq!(r.resolve("/", "home//"), "/home//");
        assert!(!is_syntactically_valid(&r.resolve("/", "/home//")));
        assert_eq!(r.resolve("/", "/"), "/");
        assert_eq!(r.resolve("/", "~/"), "/home/alice");
    }

    #[test]
    fn parent_of_root_is_root() {
        assert_eq!(parent_of("/"), "/");
        assert_eq!(parent_of("/home"), "/");
        assert_eq!(parent_of("/home/alice"), "/home");
    }

    #[test]
    fn syntax_validation() {
        assert!(is_syntactically_valid("/"));
        assert!(is_syntactically_valid("/home/alice"));
        assert!(!is_syntactically_valid("home"));
        assert!(!is_syntactically_valid("/home//alice"));
        assert!(!is_syntactically_valid("/home\\alice"));
        assert!(!is_syntactically_valid("/home/./alice"));
        assert!(!is_syntactically_valid("/home/.."));
    }

    #[test]
    fn name_validation() {
        assert!(is_valid_name("notes-2024_v1.txt"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("."));
        assert!(!is_valid_name(".."));
        assert!(!is_valid_name("a b"));
        assert!(!is_valid_name("a/b"));
        assert!(!is_valid_name("héllo"));
    }

    #[test]
    fn join_and_file_name() {
        assert_eq!(join("/", "home"), "/home");
        assert_eq!(join("/home", "alice"), "/home/alice");
        assert_eq!(file_name("/home/alice"), Some("alice"));
        assert_eq!(file_name("/"), None);
    }
}
