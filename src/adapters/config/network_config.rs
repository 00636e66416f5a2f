use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Egress proxy used outside the cloud runtime, e.g. `http://proxy.local:8080`.
    #[serde(default)]
    pub proxy_url: Option<String>,
    /// The process runs in the cloud runtime when this variable equals `cloud_value`...
    #[serde(default = "default_runtime_env_var")]
    pub runtime_env_var: String,
    #[serde(default = "default_cloud_value")]
    pub cloud_value: String,
    /// ...or when any of these variables is set at all.
    #[serde(default = "default_cloud_marker_vars")]
    pub cloud_marker_vars: Vec<String>,
}

fn default_runtime_env_var() -> String {
    "STREAMLIT_RUNTIME_ENV".to_string()
}

fn default_cloud_value() -> String {
    "cloud".to_string()
}

fn default_cloud_marker_vars() -> Vec<String> {
    vec!["STREAMLIT_SERVER_PORT".to_string()]
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            proxy_url: None,
            runtime_env_var: default_runtime_env_var(),
            cloud_value: default_cloud_value(),
            cloud_marker_vars: default_cloud_marker_vars(),
        }
    }
}
