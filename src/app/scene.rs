use crate::landmarks::Position3;
use crate::selection::{CatalogItem, PickHit, PickTest, Pointer, StaticScene};
use std::f32::consts::TAU;

const RING_RADIUS: f32 = 20.0;
const CAMERA_HEIGHT: f32 = 10.0;
const CAMERA_DISTANCE: f32 = 35.0;
const HIT_RADIUS: f32 = 0.08;

/// Items spiralling up a ring around the origin
pub fn ring_catalog(size: usize) -> Vec<CatalogItem> {
    (0..size)
        .map(|index| {
            let turn = index as f32 / size as f32;
            let angle = turn * TAU;
            CatalogItem {
                index,
                position: Position3::new(
                    RING_RADIUS * angle.cos(),
                    2.0 + turn * 16.0,
                    RING_RADIUS * angle.sin(),
                ),
                // Alternate landscape and portrait prints
                aspect_ratio: Some(if index % 2 == 0 { 4.0 / 3.0 } else { 3.0 / 4.0 }),
            }
        })
        .collect()
}

/// Flat projection pick-test for the demo ring.
///
/// Only items on the camera-facing half of the ring can be hit; the closest
/// one wins.
#[derive(Debug, Clone)]
pub struct RingPick {
    items: Vec<CatalogItem>,
}

impl RingPick {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    fn project(position: &Position3) -> Pointer {
        Pointer::new(
            position.x / RING_RADIUS,
            (position.y - CAMERA_HEIGHT) / CAMERA_HEIGHT,
        )
    }
}

impl PickTest for RingPick {
    fn pick(&self, pointer: Pointer) -> Option<PickHit> {
        self.items
            .iter()
            .filter(|item| item.position.z > 0.0)
            .filter(|item| {
                let projected = Self::project(&item.position);
                (projected.x - pointer.x).abs() < HIT_RADIUS
                    && (projected.y - pointer.y).abs() < HIT_RADIUS
            })
            .map(|item| PickHit {
                item_index: item.index,
                depth: CAMERA_DISTANCE - item.position.z,
            })
            .min_by(|a, b| a.depth.total_cmp(&b.depth))
    }
}

pub fn demo_scene(size: usize) -> StaticScene<RingPick> {
    let items = ring_catalog(size);
    StaticScene::new(items.clone(), RingPick::new(items))
}
