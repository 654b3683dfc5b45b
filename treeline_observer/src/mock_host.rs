// Copyright 2026 the Treeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A miniature host tree used by the test suites.

use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Rect;
use smallvec::SmallVec;

use crate::host::HostTree;

pub(crate) struct MockRegion {
    rect: Rect,
    clips: Vec<Rect>,
    connected: bool,
    refs: u32,
}

/// One viewport plus a flat set of regions keyed by `u32`, with explicit
/// connectivity, clip chains, and a visible keep-alive count.
pub(crate) struct MockHost {
    viewport: Rect,
    regions: HashMap<u32, MockRegion>,
}

impl MockHost {
    pub(crate) fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            regions: HashMap::new(),
        }
    }

    pub(crate) fn add_region(&mut self, id: u32, rect: Rect) {
        self.add_clipped_region(id, rect, Vec::new());
    }

    pub(crate) fn add_clipped_region(&mut self, id: u32, rect: Rect, clips: Vec<Rect>) {
        self.regions.insert(
            id,
            MockRegion {
                rect,
                clips,
                connected: true,
                refs: 0,
            },
        );
    }

    pub(crate) fn set_rect(&mut self, id: u32, rect: Rect) {
        if let Some(region) = self.regions.get_mut(&id) {
            region.rect = rect;
        }
    }

    pub(crate) fn set_connected(&mut self, id: u32, connected: bool) {
        if let Some(region) = self.regions.get_mut(&id) {
            region.connected = connected;
        }
    }

    pub(crate) fn refs(&self, id: u32) -> u32 {
        self.regions.get(&id).map_or(0, |region| region.refs)
    }
}

impl HostTree for MockHost {
    type Region = u32;

    fn is_valid(&self, region: u32) -> bool {
        self.regions.contains_key(&region)
    }

    fn is_connected(&self, region: u32) -> bool {
        self.regions.get(&region).is_some_and(|r| r.connected)
    }

    fn bounding_rect(&self, region: u32) -> Rect {
        self.regions.get(&region).map_or(Rect::ZERO, |r| r.rect)
    }

    fn clip_chain(&self, region: u32, _root: Option<u32>) -> SmallVec<[Rect; 8]> {
        self.regions
            .get(&region)
            .map(|r| r.clips.iter().copied().collect())
            .unwrap_or_default()
    }

    fn viewport_rect(&self) -> Rect {
        self.viewport
    }

    fn retain(&mut self, region: u32) {
        if let Some(r) = self.regions.get_mut(&region) {
            r.refs += 1;
        }
    }

    fn release(&mut self, region: u32) {
        if let Some(r) = self.regions.get_mut(&region) {
            r.refs = r.refs.saturating_sub(1);
        }
    }
}
