//! Platform abstraction layer for animated-image widgets
//!
//! This crate provides trait-based abstractions for every collaborator the
//! frame-sequence playback controller talks to, so the controller can be
//! developed and tested on the host without a display or a GPU.
//!
//! # Architecture Layers
//!
//! ```text
//! Host render task (LVGL-style widget tree, cooperative tick)
//!         ↓
//! Playback controller (playback crate)
//!         ↓
//! Platform abstractions (this crate - traits)
//!         ↓
//! Hardware Layer (GPU compositor, timers, flash)
//! ```
//!
//! # Abstractions
//!
//! - [`Compositor`] - surface elements the decoded frames are blended onto
//! - [`FrameTimer`] - single-shot frame pacing timer
//! - [`AssetStore`] - read-only access to frame-sequence assets in flash
//! - [`image`] - image descriptors handed to the compositor
//!
//! # Features
//!
//! - `std`: Host builds; exposes the [`mocks`] module to other crates' tests
//! - `defmt`: Enable defmt logging derives
//!
//! # Example
//!
//! ```no_run
//! use platform::{Compositor, ElementId, ImageSource};
//!
//! fn show_placeholder<C: Compositor>(compositor: &mut C, image: ElementId) {
//!     compositor.set_image_source(image, ImageSource::Asset("placeholder.bin"));
//!     compositor.invalidate(image);
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)] // accessors: callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod asset_store;
pub mod compositor;
pub mod config;
pub mod image;
pub mod timer;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export main high-level traits
pub use asset_store::{AssetError, AssetStore};
pub use compositor::{Compositor, CompositorError, ElementId, ImageSource, Opacity, Zoom};
pub use image::{ColorFormat, ImageDescriptor, ImageHeader, OutputFormat};
pub use timer::{EmbassyFrameTimer, FrameTimer};
