//! Core library for cantos
//!
//! This crate is the **Functional Core** of the hymnal extractor. It turns
//! positioned text, already decoded from the PDF, into song records. Nothing
//! in here touches the filesystem, the network or a clock; the `cantos`
//! binary crate owns all of that.
//!
//! # Pipeline
//!
//! ```text
//! Page ─ classify ─▶ ClassifiedPage ─ aggregate ─▶ StanzaBlock
//!                                          │
//!                         segment (fold over pages)  
//!                                          │
//!                                       RawSong ─ normalize ─▶ Song
//! ```
//!
//! - [`classify`]: font-size bands and the footer line decide each line's role
//! - [`aggregate`]: body lines of a geometric block form one stanza
//! - [`segment`]: titles open songs, untitled pages continue the open one
//! - [`stanza`]: stanza renumbering and content rendering
//! - [`song`]: records and the JSON artifact
//! - [`congregational`]: the one-song-per-page section
//! - [`extract`]: the above wired together, with run notices
//!
//! # Example
//!
//! ```rust,ignore
//! use cantos_core::{extract::extract_cantos, config::LayoutConfig};
//!
//! let mut n = 0;
//! let extraction = extract_cantos(pages, &LayoutConfig::default(), &mut || {
//!     n += 1;
//!     format!("song-{n}")
//! });
//! assert!(extraction.notices.is_empty());
//! ```

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod congregational;
pub mod extract;
pub mod page;
pub mod segment;
pub mod song;
pub mod stanza;
