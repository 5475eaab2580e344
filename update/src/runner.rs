//! External command execution
//!
//! [`CommandRunner`] is the seam between the staleness gate and the
//! process that actually refreshes the repository. [`SystemRunner`] spawns
//! the process, switching to the Homebrew owner when needed.

use crate::owner::Owner;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Directories that must be on `PATH` for the default environment
pub const DEFAULT_PATH_DIRS: &[&str] = &[
    "/usr/local/sbin",
    "/usr/local/bin",
    "/usr/sbin",
    "/usr/bin",
    "/sbin",
    "/bin",
];

/// A fully described external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCommand {
    /// Executable to run
    pub program: PathBuf,
    /// Arguments after the program
    pub args: Vec<String>,
    /// Complete environment of the child
    pub env: BTreeMap<OsString, OsString>,
    /// Working directory, inherited when unset
    pub cwd: Option<PathBuf>,
    /// Account to run as, the current one when unset
    pub user: Option<Owner>,
}

impl RefreshCommand {
    /// `brew update` run as `owner` in the default environment
    pub fn brew_update(brew: PathBuf, owner: Owner) -> Self {
        let env = default_env(std::env::vars_os(), &owner);
        let cwd = owner.home.is_dir().then(|| owner.home.clone());
        Self {
            program: brew,
            args: vec!["update".to_string()],
            env,
            cwd,
            user: Some(owner),
        }
    }
}

impl fmt::Display for RefreshCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Build the default environment for a command run as `owner`.
///
/// Starts from `base`, appends any missing [`DEFAULT_PATH_DIRS`] to `PATH`
/// and points `HOME`, `USER` and `LOGNAME` at the owner. Entries that are
/// not valid UTF-8 are passed through untouched.
pub fn default_env<I>(base: I, owner: &Owner) -> BTreeMap<OsString, OsString>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut env: BTreeMap<OsString, OsString> = base.into_iter().collect();

    let mut dirs: Vec<OsString> = env
        .get(OsStr::new("PATH"))
        .map(|p| std::env::split_paths(p).map(PathBuf::into_os_string).collect())
        .unwrap_or_default();
    dirs.retain(|d| !d.is_empty());
    for dir in DEFAULT_PATH_DIRS {
        if !dirs.iter().any(|d| d == OsStr::new(dir)) {
            dirs.push(OsString::from(dir));
        }
    }

    let mut path = OsString::new();
    for (i, dir) in dirs.iter().enumerate() {
        if i > 0 {
            path.push(":");
        }
        path.push(dir);
    }
    env.insert("PATH".into(), path);

    env.insert("HOME".into(), owner.home.clone().into_os_string());
    env.insert("USER".into(), owner.name.clone().into());
    env.insert("LOGNAME".into(), owner.name.clone().into());
    env
}

/// Runs external commands to completion
pub trait CommandRunner {
    /// Run `command`, returning an error unless it exits successfully
    fn run(&self, command: &RefreshCommand) -> Result<()>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, command: &RefreshCommand) -> Result<()> {
        (**self).run(command)
    }
}

/// Runs commands as child processes of this one
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &RefreshCommand) -> Result<()> {
        let shown = command.to_string();

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .env_clear()
            .envs(&command.env)
            .stdin(Stdio::null());

        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }

        if let Some(user) = &command.user {
            if user.uid != users::get_effective_uid() {
                debug!(user = %user.name, uid = user.uid, "Dropping privileges");
                cmd.uid(user.uid).gid(user.gid);
            }
        }

        info!(command = %shown, "Running");
        let output = cmd.output().map_err(|source| Error::CommandSpawn {
            command: shown.clone(),
            source,
        })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!(target: "brewup::brew", "{}", line);
        }

        if !output.status.success() {
            return Err(Error::RefreshCommand {
                command: shown,
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use std::os::unix::ffi::{OsStrExt, OsStringExt};

    fn var<'a>(env: &'a BTreeMap<OsString, OsString>, key: &str) -> &'a str {
        env[OsStr::new(key)].to_str().unwrap()
    }

    fn owner() -> Owner {
        Owner {
            name: "admin".to_string(),
            uid: 501,
            gid: 20,
            home: PathBuf::from("/Users/admin"),
        }
    }

    fn shell(script: &str) -> RefreshCommand {
        RefreshCommand {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), script.to_string()],
            env: BTreeMap::new(),
            cwd: None,
            user: None,
        }
    }

    #[test]
    fn test_default_env_extends_path() {
        let base: Vec<(OsString, OsString)> = vec![
            ("PATH".into(), "/opt/homebrew/bin:/usr/bin".into()),
            ("LANG".into(), "en_US.UTF-8".into()),
            ("HOME".into(), "/var/root".into()),
        ];
        let env = default_env(base, &owner());

        assert_eq!(
            var(&env, "PATH"),
            "/opt/homebrew/bin:/usr/bin:/usr/local/sbin:/usr/local/bin:/usr/sbin:/sbin:/bin"
        );
        assert_eq!(var(&env, "LANG"), "en_US.UTF-8");
        assert_eq!(var(&env, "HOME"), "/Users/admin");
        assert_eq!(var(&env, "USER"), "admin");
        assert_eq!(var(&env, "LOGNAME"), "admin");
    }

    #[test]
    fn test_default_env_without_path() {
        let env = default_env(Vec::new(), &owner());
        assert_eq!(var(&env, "PATH"), DEFAULT_PATH_DIRS.join(":"));
    }

    #[test]
    fn test_default_env_keeps_non_utf8_entries() {
        let latin1 = OsString::from_vec(b"caf\xe9".to_vec());
        let base: Vec<(OsString, OsString)> = vec![
            ("BREWUP_LATIN1".into(), latin1.clone()),
            (OsString::from_vec(b"BREWUP_\xff".to_vec()), "x".into()),
            ("PATH".into(), OsString::from_vec(b"/opt/\xe9/bin:/usr/bin".to_vec())),
        ];
        let env = default_env(base, &owner());

        assert_eq!(env[OsStr::new("BREWUP_LATIN1")], latin1);
        assert_eq!(env.len(), 6);
        let path = env[OsStr::new("PATH")].as_bytes();
        assert!(path.starts_with(b"/opt/\xe9/bin:/usr/bin:"));
    }

    #[test]
    fn test_brew_update_with_non_utf8_process_env() {
        std::env::set_var("BREWUP_NON_UTF8_VALUE", OsStr::from_bytes(b"caf\xe9"));

        let cmd = RefreshCommand::brew_update(PathBuf::from("/opt/homebrew/bin/brew"), owner());

        assert_eq!(
            cmd.env[OsStr::new("BREWUP_NON_UTF8_VALUE")].as_bytes(),
            b"caf\xe9"
        );
        std::env::remove_var("BREWUP_NON_UTF8_VALUE");
    }

    #[test]
    fn test_brew_update_command() {
        let cmd = RefreshCommand::brew_update(PathBuf::from("/opt/homebrew/bin/brew"), owner());
        assert_eq!(cmd.args, vec!["update".to_string()]);
        assert_eq!(cmd.user, Some(owner()));
        assert_eq!(cmd.to_string(), "/opt/homebrew/bin/brew update");
    }

    #[test]
    fn test_system_runner_success() {
        assert!(SystemRunner.run(&shell("exit 0")).is_ok());
    }

    #[test]
    fn test_system_runner_failure_captures_stderr() {
        let result = SystemRunner.run(&shell("echo 'fetch failed' >&2; exit 3"));
        assert_matches!(
            result,
            Err(Error::RefreshCommand { status: Some(3), stderr, .. }) if stderr == "fetch failed"
        );
    }

    #[test]
    fn test_system_runner_missing_program() {
        let mut cmd = shell("exit 0");
        cmd.program = PathBuf::from("/nonexistent/bin/brew");
        assert_matches!(SystemRunner.run(&cmd), Err(Error::CommandSpawn { .. }));
    }

    #[test]
    fn test_system_runner_as_current_user() {
        let mut cmd = shell("test \"$USER\" = \"$EXPECTED\"");
        let current = Owner::current().unwrap();
        cmd.env.insert("USER".into(), current.name.clone().into());
        cmd.env.insert("EXPECTED".into(), current.name.clone().into());
        cmd.user = Some(current);
        assert!(SystemRunner.run(&cmd).is_ok());
    }
}
