use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccessError {
    #[error("class {0} could not be found")]
    ClassNotFound(String),

    #[error("could not read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AccessError {
    pub fn is_class_not_found(&self) -> bool {
        matches!(self, AccessError::ClassNotFound(_))
    }
}

#[macro_export]
macro_rules! internal {
    ($msg:literal $(,)?) => {
        $crate::error::AccessError::Internal(anyhow::anyhow!($msg))
    };
    ($err:expr $(,)?) => {
        $crate::error::AccessError::Internal(anyhow::anyhow!($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::AccessError::Internal(anyhow::anyhow!($fmt, $($arg)*))
    };
}
