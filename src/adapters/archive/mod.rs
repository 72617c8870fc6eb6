//! Transcript Archive Adapters.
//!
//! - `AzureBlobArchive` - Azure Blob Storage via the REST API
//! - `LocalFileArchive` - Local directory, used when no blob storage is configured
//! - `InMemoryArchive` - Test double

mod azure_blob_archive;
mod in_memory_archive;
mod local_file_archive;

pub use azure_blob_archive::{AzureBlobArchive, BlobConnection, BlobCredentials, BLOB_API_VERSION};
pub use in_memory_archive::InMemoryArchive;
pub use local_file_archive::LocalFileArchive;
