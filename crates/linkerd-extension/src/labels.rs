//! Extension labels installed on the cluster
//!
//! Every extension installed on the cluster labels its namespace with
//! `linkerd.io/extension=<name>`. The label values are read with `kubectl`.

use crate::capability::{ProcessRunner, command_line};
use crate::error::{ExtensionError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Namespace label naming the extension installed in it
pub const EXTENSION_LABEL: &str = "linkerd.io/extension";

/// Source of the on-cluster extension labels
pub trait ExtensionLabelSource {
    /// Label values in namespace listing order
    fn extension_labels(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct NamespaceList {
    #[serde(default)]
    items: Vec<Namespace>,
}

#[derive(Debug, Deserialize)]
struct Namespace {
    #[serde(default)]
    metadata: ObjectMeta,
}

#[derive(Debug, Default, Deserialize)]
struct ObjectMeta {
    #[serde(default)]
    labels: BTreeMap<String, String>,
}

/// Extract the extension label values from a `kubectl get namespaces -o json`
/// document
pub fn parse_namespace_labels(json: &[u8]) -> Result<Vec<String>> {
    let list: NamespaceList = serde_json::from_slice(json)
        .map_err(|e| ExtensionError::LabelsUnavailable(format!("invalid namespace list: {e}")))?;

    Ok(list
        .items
        .into_iter()
        .filter_map(|ns| ns.metadata.labels.get(EXTENSION_LABEL).cloned())
        .filter(|value| !value.is_empty())
        .collect())
}

/// Reads labels by running `kubectl get namespaces`
pub struct KubectlLabels<'a> {
    runner: &'a dyn ProcessRunner,
    kubectl: PathBuf,
    context: Option<String>,
    kubeconfig: Option<PathBuf>,
}

impl<'a> KubectlLabels<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, kubectl: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            kubectl: kubectl.into(),
            context: None,
            kubeconfig: None,
        }
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    pub fn with_kubeconfig(mut self, kubeconfig: Option<PathBuf>) -> Self {
        self.kubeconfig = kubeconfig;
        self
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(kubeconfig) = &self.kubeconfig {
            args.push(format!("--kubeconfig={}", kubeconfig.display()));
        }
        if let Some(context) = &self.context {
            args.push(format!("--context={context}"));
        }
        args.extend(
            ["get", "namespaces", "-l", EXTENSION_LABEL, "-o", "json"]
                .iter()
                .map(|s| s.to_string()),
        );
        args
    }
}

impl ExtensionLabelSource for KubectlLabels<'_> {
    fn extension_labels(&self) -> Result<Vec<String>> {
        let args = self.args();
        let output = self.runner.run(&self.kubectl, &args)?;

        if !output.success {
            let stderr = output.stderr_lossy();
            let reason = stderr.trim();
            return Err(ExtensionError::LabelsUnavailable(if reason.is_empty() {
                format!(
                    "{} exited with {}",
                    command_line(&self.kubectl, &args),
                    output.status_description()
                )
            } else {
                reason.to_string()
            }));
        }

        parse_namespace_labels(&output.stdout)
    }
}
