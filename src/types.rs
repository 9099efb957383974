use std::fmt;
use std::str::FromStr;
use serde::Deserialize;

/// Shell used to run the wrapped command.
///
/// - `Sh` / `Bash`: `<shell> -c "(<cmd>) 2>&1 | tee <artifact>"`.
/// - `PowerShell`: `powershell -Command "& { <cmd> } 2>&1 | Tee-Object ..."`,
///   for hosts without a POSIX `tee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    Sh,
    Bash,
    PowerShell,
}

impl Default for ShellKind {
    fn default() -> Self {
        if cfg!(windows) {
            ShellKind::PowerShell
        } else {
            ShellKind::Sh
        }
    }
}

impl ShellKind {
    /// Program name to spawn.
    pub fn program(self) -> &'static str {
        match self {
            ShellKind::Sh => "sh",
            ShellKind::Bash => "bash",
            ShellKind::PowerShell => "powershell",
        }
    }

    /// Flag that makes the program run the next argument as a script.
    pub fn script_flag(self) -> &'static str {
        match self {
            ShellKind::Sh | ShellKind::Bash => "-c",
            ShellKind::PowerShell => "-Command",
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl FromStr for ShellKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sh" => Ok(ShellKind::Sh),
            "bash" => Ok(ShellKind::Bash),
            "powershell" | "pwsh" => Ok(ShellKind::PowerShell),
            other => Err(format!(
                "invalid shell: {other} (expected \"sh\", \"bash\" or \"powershell\")"
            )),
        }
    }
}
