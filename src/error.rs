use thiserror::Error;

/// Host-visible failures surfaced by the wrapper layer.
///
/// Everything else in the bridge is a programming error and asserts instead.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to read {path}: {source}")]
    BufferIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Engine(#[from] vellum_ir::EngineError),
}
