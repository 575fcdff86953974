use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::direct;
pub use crate::direct::{
    AuthProvider, Cluster, ClusterSpec, Context, ContextSpec, Extra, Kind, User, UserSpec,
};

/// A kubeconfig keyed by entry name, which is how kubectl reasons about it
/// when merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KubeConfig {
    pub clusters: BTreeMap<String, ClusterSpec>,
    pub contexts: BTreeMap<String, ContextSpec>,
    pub auth_infos: BTreeMap<String, UserSpec>,
    /// Empty when no context is selected.
    pub current_context: String,
    pub preferences: serde_yaml::Value,
    pub extensions: Option<serde_yaml::Value>,
    pub extra: Extra,
}

/// A `name` + spec pair as it appears in the lists on disk.
trait NamedEntry: Sized {
    type Spec;

    fn split(self) -> (String, Self::Spec);
    fn join(name: String, spec: Self::Spec) -> Self;
}

macro_rules! named_entry {
    ($entry:ident, $field:ident, $spec:ty) => {
        impl NamedEntry for $entry {
            type Spec = $spec;

            fn split(self) -> (String, $spec) {
                (self.name, self.$field)
            }

            fn join(name: String, $field: $spec) -> Self {
                $entry { name, $field }
            }
        }
    };
}

named_entry!(Cluster, cluster, ClusterSpec);
named_entry!(Context, context, ContextSpec);
named_entry!(User, user, UserSpec);

/// Later duplicates of a name replace earlier ones.
fn keyed<E: NamedEntry>(entries: Vec<E>) -> BTreeMap<String, E::Spec> {
    entries.into_iter().map(E::split).collect()
}

fn listed<E: NamedEntry>(map: BTreeMap<String, E::Spec>) -> Vec<E> {
    map.into_iter()
        .map(|(name, spec)| E::join(name, spec))
        .collect()
}

impl From<direct::KubeConfig> for KubeConfig {
    fn from(kc: direct::KubeConfig) -> Self {
        let direct::KubeConfig {
            clusters,
            users,
            contexts,
            current_context,
            preferences,
            extensions,
            extra,
            ..
        } = kc;

        Self {
            clusters: keyed(clusters),
            contexts: keyed(contexts),
            auth_infos: keyed(users),
            current_context,
            preferences,
            extensions,
            extra,
        }
    }
}

impl From<KubeConfig> for direct::KubeConfig {
    fn from(kc: KubeConfig) -> Self {
        direct::KubeConfig {
            kind: Kind::Config,
            api_version: direct::ApiVersion::V1,
            clusters: listed(kc.clusters),
            users: listed(kc.auth_infos),
            contexts: listed(kc.contexts),
            current_context: kc.current_context,
            preferences: kc.preferences,
            extensions: kc.extensions,
            extra: kc.extra,
        }
    }
}

fn resolve(base: &Path, path: &mut Option<PathBuf>) {
    if let Some(p) = path {
        if !p.as_os_str().is_empty() && p.is_relative() {
            *p = base.join(&*p);
        }
    }
}

fn is_empty_value(value: &serde_yaml::Value) -> bool {
    match value {
        serde_yaml::Value::Null => true,
        serde_yaml::Value::Mapping(m) => m.is_empty(),
        _ => false,
    }
}

impl KubeConfig {
    pub fn read_from(path: impl AsRef<Path>) -> anyhow::Result<KubeConfig> {
        direct::KubeConfig::read_from(path).map(KubeConfig::from)
    }

    pub fn write_to(self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        direct::KubeConfig::from(self).write_to(path)
    }

    /// Makes file references relative to `base` absolute, so the config
    /// still points at the same files once it is written somewhere else.
    pub fn resolve_paths(&mut self, base: &Path) {
        for cluster in self.clusters.values_mut() {
            resolve(base, &mut cluster.certificate_authority);
        }
        for user in self.auth_infos.values_mut() {
            resolve(base, &mut user.client_certificate);
            resolve(base, &mut user.client_key);
        }
    }

    /// Folds a lower-priority config into this one. Entries already present
    /// here are kept; `lower` only fills in what is missing.
    pub fn merge_from(&mut self, lower: KubeConfig) {
        for (name, cluster) in lower.clusters {
            self.clusters.entry(name).or_insert(cluster);
        }
        for (name, context) in lower.contexts {
            self.contexts.entry(name).or_insert(context);
        }
        for (name, user) in lower.auth_infos {
            self.auth_infos.entry(name).or_insert(user);
        }
        for (key, value) in lower.extra {
            self.extra.entry(key).or_insert(value);
        }

        if self.current_context.is_empty() {
            self.current_context = lower.current_context;
        }
        if is_empty_value(&self.preferences) {
            self.preferences = lower.preferences;
        }
        if self.extensions.is_none() {
            self.extensions = lower.extensions;
        }
    }

    /// Names of users that can be bound to new contexts: everything except the
    /// `USERNAME` placeholders OIDC helper templates ship with.
    pub fn real_users(&self) -> impl Iterator<Item = &str> {
        self.auth_infos
            .keys()
            .map(String::as_str)
            .filter(|name| !name.starts_with("USERNAME"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(server: &str) -> ClusterSpec {
        ClusterSpec {
            server: server.into(),
            ..Default::default()
        }
    }

    #[test]
    fn merge_keeps_existing_entries() {
        let mut high = KubeConfig::default();
        high.clusters.insert("dev".into(), cluster("https://new-dev:6443"));
        high.current_context = "dev".into();

        let mut low = KubeConfig::default();
        low.clusters.insert("dev".into(), cluster("https://old-dev:6443"));
        low.clusters.insert("other".into(), cluster("https://other:6443"));
        low.current_context = "other".into();

        high.merge_from(low);

        assert_eq!(high.clusters["dev"].server, "https://new-dev:6443");
        assert_eq!(high.clusters["other"].server, "https://other:6443");
        assert_eq!(high.current_context, "dev");
    }

    #[test]
    fn merge_takes_current_context_when_unset() {
        let mut high = KubeConfig::default();
        let low = KubeConfig {
            current_context: "staging".into(),
            ..Default::default()
        };

        high.merge_from(low);

        assert_eq!(high.current_context, "staging");
    }

    #[test]
    fn resolves_relative_paths_only() {
        let mut kc = KubeConfig::default();
        kc.clusters.insert(
            "dev".into(),
            ClusterSpec {
                certificate_authority: Some("ca.crt".into()),
                ..cluster("https://dev:6443")
            },
        );
        kc.auth_infos.insert(
            "jane".into(),
            UserSpec {
                client_certificate: Some("/etc/jane.crt".into()),
                client_key: Some("keys/jane.key".into()),
                ..Default::default()
            },
        );

        kc.resolve_paths(Path::new("/home/jane/.kube"));

        assert_eq!(
            kc.clusters["dev"].certificate_authority.as_deref(),
            Some(Path::new("/home/jane/.kube/ca.crt"))
        );
        let jane = &kc.auth_infos["jane"];
        assert_eq!(
            jane.client_certificate.as_deref(),
            Some(Path::new("/etc/jane.crt"))
        );
        assert_eq!(
            jane.client_key.as_deref(),
            Some(Path::new("/home/jane/.kube/keys/jane.key"))
        );
    }

    #[test]
    fn keyed_form_round_trips_to_sorted_lists() {
        let yaml = r#"
current-context: b
clusters:
- name: b
  cluster:
    server: https://b:6443
- name: a
  cluster:
    server: https://a:6443
users:
- name: jane
  user:
    token: t
"#;
        let on_disk: direct::KubeConfig = serde_yaml::from_str(yaml).unwrap();

        let kc = KubeConfig::from(on_disk);
        assert_eq!(kc.clusters["a"].server, "https://a:6443");
        assert_eq!(kc.auth_infos["jane"].token.as_deref(), Some("t"));

        let back = direct::KubeConfig::from(kc);
        let names: Vec<_> = back.clusters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(back.current_context, "b");
    }

    #[test]
    fn real_users_skips_placeholders() {
        let mut kc = KubeConfig::default();
        kc.auth_infos.insert("USERNAME".into(), UserSpec::default());
        kc.auth_infos.insert("USERNAME@example.de".into(), UserSpec::default());
        kc.auth_infos.insert("jane.doe@example.de".into(), UserSpec::default());

        assert_eq!(kc.real_users().collect::<Vec<_>>(), ["jane.doe@example.de"]);
    }
}
