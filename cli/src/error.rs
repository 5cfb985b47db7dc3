use crate::backend::BackendError;
use crate::flow::FlowError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("not signed in; run `pool login` first")]
    NotSignedIn,
    #[error("could not determine a state directory; pass --state-dir or set POOL_STATE_DIR")]
    NoStateDir,
    #[error("{0}")]
    Flow(#[from] FlowError),
    #[error("{0}")]
    Backend(#[from] BackendError),
    #[error("state file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
