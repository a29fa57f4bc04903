use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("cannot load icon {path}: {source}")]
    Load {
        path:   PathBuf,
        #[source]
        source: image::ImageError,
    },
}
