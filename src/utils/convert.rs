use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageOutputFormat;
use thiserror::Error;

/// Conversion failure for one input file.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("could not read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("could not encode {path} as png: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Re-encodes the image at `path` as PNG bytes, the only payload the
/// graffiti upload endpoint accepts. Inputs that are already PNG go through
/// the same decode and encode pass.
pub fn to_png(path: &Path) -> Result<Vec<u8>, ConvertError> {
    let decoded = image::open(path).map_err(|source| ConvertError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut png = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
        .map_err(|source| ConvertError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(png)
}
