pub mod etl;
pub mod export;
pub mod fetcher;
pub mod flatten;
pub mod metaproperty;

pub use crate::domain::model::{Record, Table, Workbook};
pub use crate::domain::ports::{ArtifactEncoder, MediaSource, Storage};
pub use crate::utils::error::Result;
