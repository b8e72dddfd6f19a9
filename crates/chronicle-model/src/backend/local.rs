//! Local model placeholder.
//!
//! Stands in for an embedded runtime; every call is answered by the
//! deterministic mock through the dispatch layer in `backend::ModelBackend`.

#[derive(Debug)]
pub struct LocalBackend {
    model_path: String,
}

impl LocalBackend {
    pub fn new(model_path: String) -> Self {
        Self { model_path }
    }

    pub fn model(&self) -> &str {
        &self.model_path
    }
}
