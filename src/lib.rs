//! Tools for managing 3D content assets through their authoring lifecycle:
//! creating typed asset documents, wiring their dependencies together, and
//! exporting them to the exchange format the game runtime consumes.

pub mod asset;
pub mod create;
pub mod dialog;
pub mod error;
pub mod export;
pub mod naming;
pub mod ops;
pub mod pipeline_session;
pub mod resolver;
pub mod settings;

pub use crate::asset::AssetType;
pub use crate::error::{Error, ErrorKind};
pub use crate::pipeline_session::{CurrentAsset, PipelineSession};
