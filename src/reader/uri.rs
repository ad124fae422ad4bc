//! Classification of file references by URI scheme.
//!
//! References may be plain paths (`reads.bam`, `/data/set.xml`) or carry a
//! scheme that names their kind (`xml:/data/set.xml`, `fofn:inputs.fofn`).

use std::path::{Path, PathBuf};

use url::Url;

use super::location::absolute_path;
use crate::error::DataSetError;

/// How a referenced file is ingested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    /// Dataset XML descriptor.
    Xml,
    /// BAM or other binary resource.
    Bam,
    /// File-of-file-names manifest.
    Fofn,
    /// No scheme (or `file:`); sniffed by suffix and content.
    Unknown,
}

impl FileKind {
    /// Maps a URI scheme onto a kind. `None` means the scheme is not handled.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "xml" => Some(FileKind::Xml),
            "bam" => Some(FileKind::Bam),
            "fofn" => Some(FileKind::Fofn),
            "" | "file" => Some(FileKind::Unknown),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FileKind::Xml => "xml",
            FileKind::Bam => "bam",
            FileKind::Fofn => "fofn",
            FileKind::Unknown => "unknown",
        }
    }
}

/// A classified file reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileReference {
    pub kind: FileKind,
    /// Filesystem path, absolute when it exists. When the reference had an
    /// authority component this is that authority, taken verbatim.
    pub location: PathBuf,
}

/// Parses `file_ref` and works out its kind and location.
///
/// Unhandled schemes are an error rather than being ignored.
pub fn classify(file_ref: &str) -> Result<FileReference, DataSetError> {
    let (scheme, location) = split_reference(file_ref)?;
    let kind = FileKind::from_scheme(&scheme).ok_or_else(|| DataSetError::UnsupportedFileKind {
        reference: file_ref.to_string(),
        kind: scheme.clone(),
    })?;

    let location = match location {
        Location::Authority(authority) => PathBuf::from(authority),
        Location::Path(path) if path.exists() => absolute_path(&path),
        Location::Path(path) => path,
    };

    Ok(FileReference { kind, location })
}

/// Filesystem location of a reference, ignoring its scheme.
///
/// Used by the standalone statistics and metadata readers. The path is not
/// made absolute.
pub fn reference_location(file_ref: &str) -> Result<PathBuf, DataSetError> {
    Ok(match split_reference(file_ref)?.1 {
        Location::Authority(authority) => PathBuf::from(authority),
        Location::Path(path) => path,
    })
}

enum Location {
    Authority(String),
    Path(PathBuf),
}

fn split_reference(file_ref: &str) -> Result<(String, Location), DataSetError> {
    let trimmed = file_ref.trim();

    // `Url` roots `file:` paths without an authority at `/`.
    if let Some(rest) = strip_file_scheme(trimmed).filter(|rest| !rest.starts_with("//")) {
        return Ok(("file".to_string(), Location::Path(decode_path(rest))));
    }

    let url = match Url::parse(trimmed) {
        Ok(url) if url.scheme().len() > 1 => url,
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Ok((String::new(), Location::Path(PathBuf::from(trimmed))));
        }
        Err(source) => {
            return Err(DataSetError::InvalidFileReference {
                reference: file_ref.to_string(),
                message: source.to_string(),
            });
        }
    };

    let scheme = url.scheme().to_string();
    if let Some(host) = url.host_str().filter(|host| !host.is_empty()) {
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        return Ok((scheme, Location::Authority(authority)));
    }

    Ok((scheme, Location::Path(decode_path(url.path()))))
}

fn strip_file_scheme(reference: &str) -> Option<&str> {
    let prefix = reference.get(..5)?;
    prefix
        .eq_ignore_ascii_case("file:")
        .then(|| &reference[5..])
}

fn decode_path(raw_path: &str) -> PathBuf {
    let path = urlencoding::decode(raw_path)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw_path.to_string());
    Path::new(path.trim()).to_path_buf()
}
