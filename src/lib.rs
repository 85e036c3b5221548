//! Scraper for the MTASZ (Hungarian DanceSport Federation) pages of
//! `ksis.szts.sk`.
//!
//! [`MtaszClient`] fetches the server-rendered upstream pages and turns each
//! into a typed, serializable record. [`build_archive`] packs competition
//! records into a ZIP of CSV files.

pub use archive::{archive_file_name, build_archive, ArchiveSources};
pub use client::{ClientConfig, MtaszClient, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
pub use error::{ErrorBody, ErrorKind, MtaszError, Result};
pub use model::*;
pub use translit::{safe_file_name, transliterate};

mod archive;
mod client;
mod error;
pub mod model;
mod scraper;
mod translit;
