use std::fmt;

/// Where a configuration key is read from or written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConfigScope {
    /// No flag; git applies its own system/global/local/worktree merge order
    #[default]
    Unspecified,
    Local,
    Global,
    System,
    Worktree,
}

impl ConfigScope {
    /// Command-line flag selecting this scope, or `None` for [`ConfigScope::Unspecified`]
    pub fn flag(self) -> Option<&'static str> {
        match self {
            ConfigScope::Unspecified => None,
            ConfigScope::Local => Some("--local"),
            ConfigScope::Global => Some("--global"),
            ConfigScope::System => Some("--system"),
            ConfigScope::Worktree => Some("--worktree"),
        }
    }

    /// Append the scope flag, if any, to an argument list
    pub fn push_flag(self, args: &mut Vec<String>) {
        if let Some(flag) = self.flag() {
            args.push(flag.to_string());
        }
    }

    /// Interpret a scope name printed by `git config --show-scope`.
    ///
    /// Names that do not denote a storage location (`command`, `unknown`)
    /// yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "local" => Some(ConfigScope::Local),
            "global" => Some(ConfigScope::Global),
            "system" => Some(ConfigScope::System),
            "worktree" => Some(ConfigScope::Worktree),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ConfigScope::Unspecified => "unspecified",
            ConfigScope::Local => "local",
            ConfigScope::Global => "global",
            ConfigScope::System => "system",
            ConfigScope::Worktree => "worktree",
        }
    }
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        assert_eq!(ConfigScope::Unspecified.flag(), None);
        assert_eq!(ConfigScope::Local.flag(), Some("--local"));
        assert_eq!(ConfigScope::Global.flag(), Some("--global"));
        assert_eq!(ConfigScope::System.flag(), Some("--system"));
        assert_eq!(ConfigScope::Worktree.flag(), Some("--worktree"));
    }

    #[test]
    fn test_push_flag_unspecified_adds_nothing() {
        let mut args = vec!["config".to_string(), "--list".to_string()];
        ConfigScope::Unspecified.push_flag(&mut args);
        assert_eq!(args, vec!["config", "--list"]);

        ConfigScope::Global.push_flag(&mut args);
        assert_eq!(args, vec!["config", "--list", "--global"]);
    }

    #[test]
    fn test_from_name_round_trip() {
        for scope in [
            ConfigScope::Local,
            ConfigScope::Global,
            ConfigScope::System,
            ConfigScope::Worktree,
        ] {
            assert_eq!(ConfigScope::from_name(scope.name()), Some(scope));
        }
    }

    #[test]
    fn test_from_name_unknown() {
        assert_eq!(ConfigScope::from_name("command"), None);
        assert_eq!(ConfigScope::from_name("unspecified"), None);
        assert_eq!(ConfigScope::from_name(""), None);
    }

    #[test]
    fn test_default_is_unspecified() {
        assert_eq!(ConfigScope::default(), ConfigScope::Unspecified);
    }
}
