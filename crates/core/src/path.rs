use std::fmt;

/// The root every published key lives under.
pub const CONFIG_ROOT: &str = "config";

/// The subtree a single run owns in the store.
///
/// Built once from the environment, project and user environment names and
/// shared by every entry of the run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPrefix(String);

impl PathPrefix {
    /// Create the prefix `config/<env>/<project>/<userenv>`.
    ///
    /// # Example
    ///
    /// ```
    /// use kvseed_core::PathPrefix;
    ///
    /// let prefix = PathPrefix::new("prod", "svc", "alice");
    ///
    /// assert_eq!(prefix.as_str(), "config/prod/svc/alice");
    /// ```
    #[must_use]
    pub fn new(env: &str, project: &str, userenv: &str) -> Self {
        Self(format!("{CONFIG_ROOT}/{env}/{project}/{userenv}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The prefix with a trailing slash, covering only keys inside the subtree.
    ///
    /// Prefix-matching deletes treat `config/dev/app/alice` as a prefix of
    /// `config/dev/app/alice2/...` too; the trailing slash keeps sibling user
    /// environments out.
    ///
    /// ```
    /// use kvseed_core::PathPrefix;
    ///
    /// assert_eq!(PathPrefix::new("dev", "app", "alice").subtree(), "config/dev/app/alice/");
    /// assert_eq!(PathPrefix::from("config/dev/app/").subtree(), "config/dev/app/");
    /// ```
    #[must_use]
    pub fn subtree(&self) -> String {
        self.join("")
    }

    /// Append a relative key to the prefix, separated by exactly one slash.
    ///
    /// # Example
    ///
    /// ```
    /// use kvseed_core::PathPrefix;
    ///
    /// let prefix = PathPrefix::from("config/dev/myapp/");
    ///
    /// assert_eq!(prefix.join("db/host"), "config/dev/myapp/db/host");
    /// ```
    #[must_use]
    pub fn join(&self, relative: &str) -> String {
        let base = self.0.strip_suffix('/').unwrap_or(&self.0);
        format!("{base}/{relative}")
    }
}

impl From<&str> for PathPrefix {
    fn from(prefix: &str) -> Self {
        Self(prefix.to_string())
    }
}

impl From<String> for PathPrefix {
    fn from(prefix: String) -> Self {
        Self(prefix)
    }
}

impl AsRef<str> for PathPrefix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_layout() {
        let prefix = PathPrefix::new("prod", "svc", "alice");
        assert_eq!(prefix.as_str(), "config/prod/svc/alice");
        assert_eq!(prefix.to_string(), "config/prod/svc/alice");
    }

    #[test]
    fn test_join_without_trailing_slash() {
        let prefix = PathPrefix::new("dev", "myapp", "bob");
        assert_eq!(prefix.join("db/host"), "config/dev/myapp/bob/db/host");
    }

    #[test]
    fn test_join_with_trailing_slash() {
        let prefix = PathPrefix::from("config/dev/myapp/");
        assert_eq!(prefix.join("db/host"), "config/dev/myapp/db/host");
    }
}
