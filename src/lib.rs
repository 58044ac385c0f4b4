//! # image-batcher
//!
//! Batch image resizing and recompression. Queue image files, pick an output
//! format, quality and target box, and get optimized files back: one file
//! as-is, several as a zip.
//!
//! # Architecture: Owned Queue, Pure Projection
//!
//! All state lives in one [`queue::FileQueue`] value. Operations mutate it and
//! report what changed; rendering is a separate pure projection the caller
//! runs whenever it wants:
//!
//! ```text
//! sources ──add_files──► FileQueue ──process──► outputs ──package──► artifact
//!                           │   ▲
//!                  project  │   │  remove / clear / select …
//!                           ▼   │
//!                        ViewModel ──► presentation (CLI, JSON)
//! ```
//!
//! - **Testability**: queue logic runs without a presentation layer, and the
//!   pixel work sits behind [`imaging::ImageBackend`], so tests drive the
//!   whole state machine with a recording mock.
//! - **Explicit runs**: a processing run is a value ([`process::Run`]) that
//!   steps one item at a time. While it is active the queue refuses mutation.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`queue`] | The pending-file queue: items, selection, aggregate status, run outputs |
//! | [`source`] | Input files and their `(name, size, modified)` natural key |
//! | [`preview`] | Revocable preview resources owned by queued items |
//! | [`imaging`] | Transcoding: box fitting, output naming, `image` crate backend |
//! | [`estimate`] | Projected output size from one sample transcode, plus a trailing-edge debouncer |
//! | [`process`] | Sequential processing runs with progress events |
//! | [`render`] | Queue → view-model: rows, primary action, post-process panel |
//! | [`archive`] | Packaging outputs: pass-through for one, zip for many |
//! | [`size`] | Human-readable byte counts |
//! | [`config`] | `image-batcher.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Pseudo-PNG WebP Output
//!
//! WebP output is written with a `.png` extension. Some viewers detect image
//! types by extension and choke on `.webp`; the bytes themselves are WebP.
//! See [`imaging::OutputFormat::extension`].
//!
//! ## Sampled Estimates
//!
//! The size estimate transcodes only the first candidate and scales its
//! compression ratio across the batch. It is an approximation that stays
//! cheap enough to rerun on every settings change.
//!
//! ## Imaging Stack
//!
//! Decoding, Lanczos3 resampling and PNG/JPEG encoding use the `image` crate.
//! WebP is encoded lossy through the `webp` crate (bundled libwebp), since the
//! `image` crate can only write lossless WebP and quality must apply to it.

pub mod archive;
pub mod config;
pub mod estimate;
pub mod imaging;
pub mod output;
pub mod preview;
pub mod process;
pub mod queue;
pub mod render;
pub mod size;
pub mod source;

#[cfg(test)]
pub(crate) mod test_helpers;
