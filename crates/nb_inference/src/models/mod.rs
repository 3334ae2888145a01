use std::sync::Arc;

use nb_core::{Error, Result, SummaryModel};
use tracing::info;

use crate::Config;

pub mod dummy;
pub mod remote;

pub use dummy::DummyModel;
pub use remote::RemoteModel;

pub const AVAILABLE_MODELS: &[&str] = &["remote", "dummy"];

/// Builds the summarization backend named by `config.model_name`
/// (`remote` when unset).
pub async fn create_model(config: Option<Config>) -> Result<Arc<dyn SummaryModel>> {
    let config = config.unwrap_or_default();
    let model: Arc<dyn SummaryModel> = match config.model_name.as_deref().unwrap_or("remote") {
        "remote" => Arc::new(RemoteModel::new(&config)?),
        "dummy" => Arc::new(DummyModel::new()),
        other => {
            return Err(Error::Inference(format!(
                "Unknown model: {} (available: {})",
                other,
                AVAILABLE_MODELS.join(", ")
            )))
        }
    };
    info!("🧠 Using {} summarization model", model.name());
    Ok(model)
}
