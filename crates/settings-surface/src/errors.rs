use host_dom::DomError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum SurfaceError {
    #[error("failed to embed settings surface: {0}")]
    Embed(#[from] DomError),
}
