use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

use serde::{Deserialize, Serialize};

/// Process environment handed to the shell.
///
/// The default inherits everything from the calling process, which matches
/// the platform `system(3)` behaviour. Removals are applied before `set`, so a
/// variable named in both ends up set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellEnvironment {
    /// Start from the caller's environment. When false the shell starts with
    /// only the variables in `set`.
    pub inherit: bool,
    pub set: BTreeMap<String, String>,
    pub remove: Vec<String>,
    /// Working directory for the shell. `None` keeps the caller's.
    pub working_dir: Option<PathBuf>,
}

impl Default for ShellEnvironment {
    fn default() -> Self {
        Self {
            inherit: true,
            set: BTreeMap::new(),
            remove: Vec::new(),
            working_dir: None,
        }
    }
}

impl ShellEnvironment {
    pub fn inherited() -> Self {
        Self::default()
    }

    pub fn isolated() -> Self {
        Self {
            inherit: false,
            ..Self::default()
        }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set.insert(key.into(), value.into());
        self
    }

    pub fn without_var(mut self, key: impl Into<String>) -> Self {
        self.remove.push(key.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// True when nothing is overridden and the shell sees exactly the
    /// caller's environment and working directory.
    pub fn is_ambient(&self) -> bool {
        self.inherit && self.set.is_empty() && self.remove.is_empty() && self.working_dir.is_none()
    }

    pub fn apply(&self, command: &mut Command) {
        if !self.inherit {
            command.env_clear();
        }
        for key in &self.remove {
            command.env_remove(key);
        }
        command.envs(&self.set);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_is_ambient() {
        assert!(ShellEnvironment::default().is_ambient());
        assert!(!ShellEnvironment::isolated().is_ambient());
        assert!(!ShellEnvironment::inherited().with_var("A", "1").is_ambient());
    }

    #[test]
    fn set_wins_over_remove() {
        let env = ShellEnvironment::inherited()
            .without_var("LANG")
            .with_var("LANG", "C");
        let mut command = Command::new("sh");
        env.apply(&mut command);

        let lang: Vec<_> = command
            .get_envs()
            .filter(|(key, _)| *key == OsStr::new("LANG"))
            .collect();
        assert_eq!(lang, vec![(OsStr::new("LANG"), Some(OsStr::new("C")))]);
    }

    #[test]
    fn applies_working_dir() {
        let env = ShellEnvironment::default().with_working_dir("/tmp");
        let mut command = Command::new("sh");
        env.apply(&mut command);
        assert_eq!(command.get_current_dir(), Some(std::path::Path::new("/tmp")));
    }

    #[test]
    fn deserializes_partial_tables() {
        let env: ShellEnvironment = toml::from_str(
            r#"
            remove = ["SECRET"]

            [set]
            LANG = "C"
            "#,
        )
        .unwrap();
        assert!(env.inherit);
        assert_eq!(env.remove, vec!["SECRET".to_owned()]);
        assert_eq!(env.set.get("LANG").map(String::as_str), Some("C"));
        assert_eq!(env.working_dir, None);
    }
}
