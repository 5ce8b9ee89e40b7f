#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("plugin: {0}")]
    Plugin(#[from] bag_api::PluginError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("output: {0}")]
    Output(#[from] std::io::Error),
}
