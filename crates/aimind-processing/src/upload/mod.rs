//! Upload pipeline: validate → normalize → key → put → URL.

mod uploader;

pub use uploader::ImageUploader;
