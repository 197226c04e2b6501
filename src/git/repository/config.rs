use super::Repository;
use crate::error::GitResult;
use crate::git::parser::{self, split_lines};
use crate::git::scope::ConfigScope;
use std::collections::BTreeMap;

/// Exit code of `config --get*` when the key is not set
const KEY_NOT_FOUND: i32 = 1;

impl Repository {
    fn config_args(scope: ConfigScope, rest: &[&str]) -> Vec<String> {
        let mut args = vec!["config".to_string()];
        scope.push_flag(&mut args);
        args.extend(rest.iter().map(|arg| arg.to_string()));
        args
    }

    /// All visible settings, a later duplicate key replacing the earlier one
    pub fn configs(&self, scope: ConfigScope) -> GitResult<BTreeMap<String, String>> {
        let output = self.run(&Self::config_args(scope, &["--list"]))?;
        Ok(parser::parse_config_list(&output))
    }

    /// Whether `key` is set in `scope`. Key names are matched as git prints
    /// them (section and variable lower-cased).
    pub fn has_config(&self, scope: ConfigScope, key: &str) -> GitResult<bool> {
        let args = Self::config_args(scope, &["--name-only", "--get-regexp", key]);
        Ok(self
            .lookup(&args, &[KEY_NOT_FOUND])?
            .is_some_and(|output| split_lines(&output).contains(&key)))
    }

    /// The scope whose value of `key` is in effect, if it is set anywhere
    pub fn config_scope(&self, key: &str) -> GitResult<Option<ConfigScope>> {
        let args = Self::config_args(
            ConfigScope::Unspecified,
            &["--show-scope", "--name-only", "--get-regexp", key],
        );
        let Some(output) = self.lookup(&args, &[KEY_NOT_FOUND])? else {
            return Ok(None);
        };

        // git lists lower-precedence scopes first
        Ok(parser::parse_scoped_names(&output)
            .into_iter()
            .filter(|name| name.key == key)
            .filter_map(|name| name.scope)
            .last())
    }

    pub fn set_config(&self, scope: ConfigScope, key: &str, value: &str) -> GitResult<()> {
        self.run(&Self::config_args(scope, &[key, value]))?;
        Ok(())
    }

    /// Append a value to a multi-valued key
    pub fn add_config(&self, scope: ConfigScope, key: &str, value: &str) -> GitResult<()> {
        self.run(&Self::config_args(scope, &["--add", key, value]))?;
        Ok(())
    }

    /// Value of `key`, `None` when unset
    pub fn get_config(&self, scope: ConfigScope, key: &str) -> GitResult<Option<String>> {
        self.lookup(&Self::config_args(scope, &["--get", key]), &[KEY_NOT_FOUND])
    }

    pub fn get_config_or(&self, scope: ConfigScope, key: &str, default: &str) -> GitResult<String> {
        Ok(self
            .get_config(scope, key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Every value of a multi-valued key, in file order
    pub fn get_config_all(&self, scope: ConfigScope, key: &str) -> GitResult<Vec<String>> {
        let args = Self::config_args(scope, &["--get-all", key]);
        let output = self.lookup(&args, &[KEY_NOT_FOUND])?;
        Ok(output
            .map(|text| split_lines(&text).into_iter().map(String::from).collect())
            .unwrap_or_default())
    }

    /// Remove every value of `key`. An unspecified scope deletes from the
    /// scope currently in effect; deleting an unset key is a no-op.
    pub fn delete_config(&self, scope: ConfigScope, key: &str) -> GitResult<()> {
        let scope = match scope {
            ConfigScope::Unspecified => match self.config_scope(key)? {
                Some(found) => found,
                None => return Ok(()),
            },
            explicit => explicit,
        };

        if !self.has_config(scope, key)? {
            return Ok(());
        }

        self.run(&Self::config_args(scope, &["--unset-all", key]))?;
        Ok(())
    }
}
