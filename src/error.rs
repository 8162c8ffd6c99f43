use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::asset::AssetType;

/// Any error raised by the asset pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no asset name was entered")]
    EmptyAssetName,

    #[error("no parent folder was chosen for the new asset")]
    EmptyParentFolder,

    #[error("no rig path is available to derive the animation file name from")]
    MissingRigPath,

    #[error("path {} does not name a usable file", .path.display())]
    BadFileName { path: PathBuf },

    #[error("the current document has never been saved")]
    DocumentNeverSaved,

    #[error("the current document is not a valid asset")]
    NotAnAsset,

    #[error("a {0} asset cannot be created")]
    NotCreatable(AssetType),

    #[error("a {0} asset cannot be exported")]
    NotExportable(AssetType),

    #[error("no export root folder is configured in the settings")]
    ExportRootUnset,

    #[error("document {} is not inside the project scenes folder", .path.display())]
    OutsideScenesRoot { path: PathBuf },

    #[error("no {0} node was found among the asset's descendants")]
    MissingDependency(AssetType),

    #[error("the rig node does not come from a file reference")]
    RigNotReferenced,

    #[error("no asset node was found in {}", .path.display())]
    MissingAssetNode { path: PathBuf },

    #[error("node {name} is locked")]
    LockedNode { name: String },

    #[error("nodes {first} and {second} both resolve to the type label {label}")]
    DuplicateTypeLabel {
        first: String,
        second: String,
        label: String,
    },

    #[error("node carries an unknown asset type tag: {value}")]
    UnknownTypeTag { value: String },

    #[error("reference namespace {namespace} contains no nodes")]
    EmptyReference { namespace: String },

    #[error("malformed settings file at path {}", .path.display())]
    MalformedSettings {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[error(transparent)]
    Io {
        #[from]
        source: io::Error,
    },
}

/// The broad classification of an [`Error`], used by callers that present
/// failures differently depending on what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing user input.
    Validation,
    /// A required rig, skeleton, or type-tagged node is absent.
    MissingDependency,
    /// The document is in a state the operation's preconditions forbid.
    State,
    /// A filesystem or document I/O failure.
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyAssetName
            | Error::EmptyParentFolder
            | Error::MissingRigPath
            | Error::BadFileName { .. }
            | Error::DocumentNeverSaved
            | Error::NotAnAsset
            | Error::NotCreatable(_)
            | Error::NotExportable(_)
            | Error::ExportRootUnset
            | Error::OutsideScenesRoot { .. } => ErrorKind::Validation,

            Error::MissingDependency(_) => ErrorKind::MissingDependency,

            Error::RigNotReferenced
            | Error::MissingAssetNode { .. }
            | Error::LockedNode { .. }
            | Error::DuplicateTypeLabel { .. }
            | Error::UnknownTypeTag { .. }
            | Error::EmptyReference { .. } => ErrorKind::State,

            Error::MalformedSettings { .. } | Error::Io { .. } => ErrorKind::Io,
        }
    }
}
