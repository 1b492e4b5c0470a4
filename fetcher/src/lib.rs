//! Registry and cache for ancillary data files.
//!
//! Components (readers, writers and compositors) declare the external files
//! they need. Declaring a file registers it under a cache key such as
//! `readers/coeffs.dat`; retrieving the key downloads the file into the cache
//! on first use and verifies it against an optional `sha256`/`sha512` hash.
//! Bulk discovery walks every component definition on the search path so the
//! whole cache can be filled ahead of time, for example on hosts without
//! network access at run time.
//!
//! # Modules
//!
//! - [`catalog`] - Component definitions discovered on the search path
//! - [`cli`] - Command-line argument definitions
//! - [`component`] - Data file descriptors and the component contract
//! - [`discovery`] - Bulk registration and prefetch
//! - [`download`] - Fetch primitive for HTTP(S) and `file://` URLs
//! - [`error`] - Registration and retrieval errors
//! - [`gld360`] - Reader for GLD360 UALF2 lightning files
//! - [`key`] - Cache keys and component kinds
//! - [`known_hash`] - Integrity hash parsing and verification
//! - [`registry`] - Cache key to source URL and hash mapping
//! - [`retrieve`] - Download-on-demand retrieval into the cache
//! - [`session`] - Command execution for the CLI

pub mod catalog;
pub mod cli;
pub mod component;
pub mod discovery;
pub mod download;
pub mod error;
pub mod gld360;
pub mod key;
pub mod known_hash;
pub mod registry;
pub mod retrieve;
pub mod session;
