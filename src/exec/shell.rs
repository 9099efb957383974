// src/exec/shell.rs

//! Shell command construction.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::types::ShellKind;

/// Wrap `command` so its combined stdout/stderr is also written to
/// `artifact`.
///
/// The artifact is truncated on each launch unless `append` is set.
pub fn wrap_with_tee(shell: ShellKind, command: &str, artifact: &Path, append: bool) -> String {
    let artifact = artifact.display().to_string();
    match shell {
        ShellKind::Sh | ShellKind::Bash => {
            let flag = if append { "-a " } else { "" };
            format!("({command}) 2>&1 | tee {flag}{}", posix_quote(&artifact))
        }
        ShellKind::PowerShell => {
            let flag = if append { " -Append" } else { "" };
            format!(
                "& {{ {command} }} 2>&1 | Tee-Object -FilePath {}{flag}",
                powershell_quote(&artifact)
            )
        }
    }
}

/// Single-quote for sh; nothing inside is expanded.
fn posix_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', r"'\''"))
}

/// PowerShell literal string; `'` is escaped by doubling.
fn powershell_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}

/// Build the process for a wrapped script.
///
/// Output is piped so the caller can drain it; the child is killed if its
/// handle is dropped. On Unix the shell leads its own process group so the
/// whole pipeline can be signalled at once.
pub fn shell_command(shell: ShellKind, script: &str, working_dir: &Path) -> Command {
    let mut cmd = Command::new(shell.program());
    cmd.arg(shell.script_flag()).arg(script);

    cmd.current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    cmd.process_group(0);

    cmd
}
