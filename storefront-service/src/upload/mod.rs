//! Image uploads
//!
//! The admin API accepts an image plus a folder name ("type"), stores the bytes in
//! object storage under `{type}/{id}{ext}` and answers with the public URL of the
//! resized rendition produced by the bucket's resize extension.

mod image;
mod service;
mod storage;

pub use image::ImageType;
pub use service::{UploadError, UploadResult, UploadService};
pub use storage::{GcsObjectStorage, MemoryObjectStorage, ObjectStorage, StorageError, TokenSource};
