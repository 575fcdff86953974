use std::{path::PathBuf, process::ExitStatus};

/// Failures a caller may want to tell apart. Everything else travels as a
/// plain `anyhow::Error` with context attached.
#[derive(Debug, thiserror::Error)]
pub enum KubyError {
    #[error("the 'config_auth' file couldn't be found at '{}'", .0.display())]
    MissingAuthConfig(PathBuf),

    #[error("the server '{0}' was not in the format name:server")]
    MalformedServerSpec(String),

    #[error("auth helper `{program}` failed ({status})")]
    AuthHelperFailed { program: String, status: ExitStatus },

    #[error("no user besides the USERNAME placeholders in '{}'", .0.display())]
    NoUsableUser(PathBuf),

    #[error("no answer to the confirmation prompt")]
    ConfirmationAborted,
}
