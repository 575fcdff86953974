//! The kubeconfig file exactly as it sits on disk: lists of named entries.
//!
//! Keys this model does not know about are kept in the flattened `extra`
//! maps, so reading and writing a file never drops anything kubectl wrote.

use std::collections::BTreeMap;
use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::*;
use serde_yaml::Value as YamlValue;

pub type Extra = BTreeMap<String, YamlValue>;

/// kubectl writes `clusters: null` for empty sections; treat that like a
/// missing key.
fn nullable<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

// region: Context
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ContextSpec {
    pub cluster: String,
    #[serde(default)]
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<YamlValue>,
    #[serde(flatten)]
    pub extra: Extra,
}
#[derive(Serialize, Deserialize, Debug)]
pub struct Context {
    pub name: String,
    pub context: ContextSpec,
}
// endregion

// region: Cluster
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterSpec {
    pub server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_authority: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure_skip_tls_verify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_server_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<YamlValue>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Cluster {
    pub name: String,
    pub cluster: ClusterSpec,
}
// endregion

// region: User
/// The `auth-provider` stanza OIDC helpers such as dexter fill in.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AuthProvider {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub config: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct UserSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_certificate: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_certificate_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_provider: Option<AuthProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec: Option<YamlValue>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub user: UserSpec,
}
// endregion

// region: Common
#[derive(Serialize, Deserialize, Debug, Default)]
pub enum ApiVersion {
    #[default]
    #[serde(rename = "v1")]
    V1,
}
#[derive(Serialize, Deserialize, Debug, Default)]
pub enum Kind {
    #[default]
    Config,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub struct KubeConfig {
    #[serde(default)]
    pub kind: Kind,
    #[serde(rename = "apiVersion", default)]
    pub api_version: ApiVersion,
    #[serde(default, skip_serializing_if = "YamlValue::is_null")]
    pub preferences: YamlValue,
    #[serde(default, deserialize_with = "nullable")]
    pub clusters: Vec<Cluster>,
    #[serde(default, deserialize_with = "nullable")]
    pub users: Vec<User>,
    #[serde(default, deserialize_with = "nullable")]
    pub contexts: Vec<Context>,
    #[serde(default, deserialize_with = "nullable")]
    pub current_context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<YamlValue>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl KubeConfig {
    /// Reads a kubeconfig file. An empty file is an empty config, the same
    /// as kubectl treats it.
    pub fn read_from(path: impl AsRef<Path>) -> anyhow::Result<KubeConfig> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Opening kube config {}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(KubeConfig::default());
        }
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Parsing kube config {}", path.display()))
    }

    /// Writes the config to `path`, replacing whatever was there.
    pub fn write_to(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Opening kube config {} for writing", path.display()))?;

        Ok(serde_yaml::to_writer(file, self)?)
    }
}
// endregion

#[cfg(test)]
mod tests {
    use super::*;

    const DEXTER_OUTPUT: &str = r#"
apiVersion: v1
kind: Config
clusters: null
contexts: null
current-context: ""
preferences: {}
users:
- name: jane.doe@example.de
  user:
    auth-provider:
      name: oidc
      config:
        client-id: kube
        id-token: abc.def.ghi
        idp-issuer-url: https://accounts.google.com
"#;

    #[test]
    fn parses_helper_output_with_null_sections() {
        let kc: KubeConfig = serde_yaml::from_str(DEXTER_OUTPUT).unwrap();

        assert!(kc.clusters.is_empty());
        assert!(kc.contexts.is_empty());
        assert_eq!(kc.users.len(), 1);
        let provider = kc.users[0].user.auth_provider.as_ref().unwrap();
        assert_eq!(provider.name, "oidc");
        assert_eq!(provider.config["id-token"], "abc.def.ghi");
    }

    #[test]
    fn keeps_unknown_keys() {
        let yaml = r#"
clusters:
- name: dev
  cluster:
    server: https://dev:6443
    disable-compression: true
"#;
        let kc: KubeConfig = serde_yaml::from_str(yaml).unwrap();
        let cluster = &kc.clusters[0].cluster;
        assert_eq!(cluster.extra["disable-compression"], YamlValue::Bool(true));

        let written = serde_yaml::to_string(&kc).unwrap();
        assert!(written.contains("disable-compression: true"));
    }

    #[test]
    fn empty_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "\n").unwrap();

        let kc = KubeConfig::read_from(&path).unwrap();
        assert!(kc.clusters.is_empty());
        assert_eq!(kc.current_context, "");
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "this is not yaml: [").unwrap();

        let kc = KubeConfig {
            current_context: "dev".into(),
            ..Default::default()
        };
        kc.write_to(&path).unwrap();

        let back = KubeConfig::read_from(&path).unwrap();
        assert_eq!(back.current_context, "dev");
    }
}
