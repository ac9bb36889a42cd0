//! Shared server state

use crate::enhance::AiClient;
use crate::file_storage::{documents::init_data_dir, DocumentStore, FileResult};
use crate::models::DocumentKind;
use std::path::Path;

/// State shared across all request handlers
#[derive(Clone)]
pub struct ServerAppState {
    pub reviews: DocumentStore,
    pub prds: DocumentStore,
    pub ai: AiClient,
}

impl ServerAppState {
    pub fn new(data_dir: &Path, api_key: Option<String>) -> FileResult<Self> {
        let data_dir = init_data_dir(data_dir)?;
        Ok(ServerAppState {
            reviews: DocumentStore::new(&data_dir, DocumentKind::CodeReview),
            prds: DocumentStore::new(&data_dir, DocumentKind::Prd),
            ai: AiClient::new(api_key),
        })
    }
}
