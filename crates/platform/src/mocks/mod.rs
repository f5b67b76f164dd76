//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests.

#![cfg(any(test, feature = "std"))]
#![allow(clippy::arithmetic_side_effects)] // counters in test doubles cannot realistically overflow

use embedded_graphics::geometry::Size;
use heapless::{String, Vec};

use crate::asset_store::{AssetError, AssetStore};
use crate::compositor::{Compositor, CompositorError, ElementId, ImageSource, Opacity, Zoom};
use crate::config::MAX_ASSET_NAME_LEN;
use crate::timer::FrameTimer;

/// Mock frame timer driven manually by the test.
///
/// Call [`MockTimer::expire`] to simulate the deadline passing.
#[derive(Debug, Default)]
pub struct MockTimer {
    armed: bool,
    expired: bool,
    duration_ms: u32,
    arm_count: usize,
    cancel_count: usize,
}

impl MockTimer {
    /// Create an idle mock timer
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the pending deadline passing. No effect when idle.
    pub fn expire(&mut self) {
        if self.armed {
            self.expired = true;
        }
    }

    /// Number of `arm` calls so far
    pub fn arm_count(&self) -> usize {
        self.arm_count
    }

    /// Number of `cancel` calls so far
    pub fn cancel_count(&self) -> usize {
        self.cancel_count
    }
}

impl FrameTimer for MockTimer {
    fn arm(&mut self, duration_ms: u32) {
        self.armed = true;
        self.expired = false;
        self.duration_ms = duration_ms;
        self.arm_count += 1;
    }

    fn cancel(&mut self) {
        self.armed = false;
        self.expired = false;
        self.cancel_count += 1;
    }

    fn is_armed(&self) -> bool {
        self.armed
    }

    fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    fn poll_expired(&mut self) -> bool {
        if self.armed && self.expired {
            self.armed = false;
            self.expired = false;
            true
        } else {
            false
        }
    }
}

/// What a mock image element currently displays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BoundSource {
    /// Nothing bound yet
    #[default]
    None,
    /// A named asset
    Asset(String<MAX_ASSET_NAME_LEN>),
    /// A live frame buffer
    Frame {
        /// Frame width
        width: u16,
        /// Frame height
        height: u16,
        /// Descriptor payload size
        data_size: usize,
        /// First pixel byte (decoders under test stamp the frame number here)
        first_byte: Option<u8>,
    },
}

/// Kind of a mock element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Container created with `create_container`
    Container,
    /// Image created with `create_image`
    Image,
}

/// State of one mock element
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Element handle
    pub id: ElementId,
    /// Parent handle
    pub parent: ElementId,
    /// Element kind
    pub kind: ElementKind,
    /// Current image source
    pub source: BoundSource,
    /// Number of `set_image_source` calls that bound a frame buffer
    pub frame_pushes: usize,
    /// Number of `set_image_source` calls that bound an asset
    pub asset_binds: usize,
    /// Current zoom
    pub zoom: Zoom,
    /// Current opacity
    pub opacity: Opacity,
    /// Current size
    pub size: Size,
    /// `true` once `align_center` was called
    pub centered: bool,
    /// Number of `bring_to_front` calls
    pub raised: usize,
    /// Number of `invalidate` calls
    pub invalidations: usize,
}

/// Mock compositor recording every call per element.
///
/// Element 0 is the implicit screen root.
#[derive(Debug)]
pub struct MockCompositor {
    elements: Vec<MockElement, 16>,
    next_id: u32,
    fail_create: bool,
}

impl MockCompositor {
    /// The implicit root element every widget is parented to in tests
    pub const SCREEN: ElementId = ElementId(0);

    /// Create an empty mock compositor
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            next_id: 1,
            fail_create: false,
        }
    }

    /// Make subsequent `create_*` calls fail with `OutOfElements`
    pub fn fail_creation(&mut self, fail: bool) {
        self.fail_create = fail;
    }

    /// Look up a live element
    pub fn element(&self, id: ElementId) -> Option<&MockElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Number of live elements
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut MockElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    fn create(&mut self, parent: ElementId, kind: ElementKind) -> Result<ElementId, CompositorError> {
        if self.fail_create {
            return Err(CompositorError::OutOfElements);
        }
        if parent != Self::SCREEN && self.element(parent).is_none() {
            return Err(CompositorError::UnknownParent);
        }
        let id = ElementId(self.next_id);
        self.elements
            .push(MockElement {
                id,
                parent,
                kind,
                source: BoundSource::None,
                frame_pushes: 0,
                asset_binds: 0,
                zoom: Zoom::NONE,
                opacity: Opacity::COVER,
                size: Size::zero(),
                centered: false,
                raised: 0,
                invalidations: 0,
            })
            .map_err(|_| CompositorError::OutOfElements)?;
        self.next_id += 1;
        Ok(id)
    }
}

impl Default for MockCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor for MockCompositor {
    fn create_container(&mut self, parent: ElementId) -> Result<ElementId, CompositorError> {
        self.create(parent, ElementKind::Container)
    }

    fn create_image(&mut self, parent: ElementId) -> Result<ElementId, CompositorError> {
        self.create(parent, ElementKind::Image)
    }

    fn delete(&mut self, element: ElementId) {
        // Children go with their parent (one level is enough for widgets).
        self.elements.retain(|e| e.id != element && e.parent != element);
    }

    fn set_image_source(&mut self, element: ElementId, source: ImageSource<'_>) {
        let Some(el) = self.element_mut(element) else {
            return;
        };
        match source {
            ImageSource::Asset(name) => {
                let mut stored = String::new();
                // Names in tests always fit MAX_ASSET_NAME_LEN.
                stored.push_str(name).ok();
                el.source = BoundSource::Asset(stored);
                el.asset_binds += 1;
            }
            ImageSource::Frame { descriptor, pixels } => {
                el.source = BoundSource::Frame {
                    width: descriptor.header.width,
                    height: descriptor.header.height,
                    data_size: descriptor.data_size,
                    first_byte: pixels.first().copied(),
                };
                el.frame_pushes += 1;
            }
        }
    }

    fn set_zoom(&mut self, element: ElementId, zoom: Zoom) {
        if let Some(el) = self.element_mut(element) {
            el.zoom = zoom;
        }
    }

    fn set_opacity(&mut self, element: ElementId, opacity: Opacity) {
        if let Some(el) = self.element_mut(element) {
            el.opacity = opacity;
        }
    }

    fn set_size(&mut self, element: ElementId, size: Size) {
        if let Some(el) = self.element_mut(element) {
            el.size = size;
        }
    }

    fn align_center(&mut self, element: ElementId) {
        if let Some(el) = self.element_mut(element) {
            el.centered = true;
        }
    }

    fn bring_to_front(&mut self, element: ElementId) {
        if let Some(el) = self.element_mut(element) {
            el.raised += 1;
        }
    }

    fn invalidate(&mut self, element: ElementId) {
        if let Some(el) = self.element_mut(element) {
            el.invalidations += 1;
        }
    }
}

/// In-memory asset store holding up to `N` named blobs.
#[derive(Debug, Default)]
pub struct MemoryAssetStore<'a, const N: usize> {
    assets: Vec<(&'a str, &'a [u8]), N>,
}

impl<'a, const N: usize> MemoryAssetStore<'a, N> {
    /// Create an empty store
    pub fn new() -> Self {
        Self { assets: Vec::new() }
    }

    /// Add (or replace) an asset. Returns `Err` with the entry when full.
    pub fn insert(&mut self, name: &'a str, data: &'a [u8]) -> Result<(), (&'a str, &'a [u8])> {
        if let Some(slot) = self.assets.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = data;
            return Ok(());
        }
        self.assets.push((name, data))
    }

    fn lookup(&self, name: &str) -> Result<&'a [u8], AssetError> {
        self.assets
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, data)| *data)
            .ok_or(AssetError::NotFound)
    }
}

impl<const N: usize> AssetStore for MemoryAssetStore<'_, N> {
    fn read_asset(&self, name: &str, offset: usize, buf: &mut [u8]) -> Result<usize, AssetError> {
        let data = self.lookup(name)?;
        let tail = data.get(offset..).ok_or(AssetError::OutOfBounds)?;
        let n = tail.len().min(buf.len());
        match (buf.get_mut(..n), tail.get(..n)) {
            (Some(dst), Some(src)) => {
                dst.copy_from_slice(src);
                Ok(n)
            }
            _ => Err(AssetError::Io),
        }
    }

    fn asset_size(&self, name: &str) -> Result<usize, AssetError> {
        self.lookup(name).map(<[u8]>::len)
    }
}
