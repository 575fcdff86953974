use std::{fmt, str::FromStr};

use crate::KubyError;

/// One API server to probe, given on the command line as `name:host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSpec {
    pub name: String,
    pub host: String,
}

impl ServerSpec {
    pub fn url(&self, port: u16) -> String {
        format!("https://{}:{port}", self.host)
    }
}

impl FromStr for ServerSpec {
    type Err = KubyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(host), None) if !name.trim().is_empty() && !host.trim().is_empty() => {
                Ok(ServerSpec {
                    name: name.trim().to_owned(),
                    host: host.trim().to_owned(),
                })
            }
            _ => Err(KubyError::MalformedServerSpec(s.to_owned())),
        }
    }
}

impl fmt::Display for ServerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.host)
    }
}
