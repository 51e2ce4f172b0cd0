//! Pointer-to-item selection with a nearest-item fallback.
//!
//! The scene graph stays on the host side: the resolver only sees a
//! [`PickTest`] capability and a catalog of [`SelectableItem`]s.

use crate::landmarks::{Point2, Position3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pointer in normalized device coordinates, x and y in [-1, 1], y up
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
}

impl Pointer {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Map a mirrored palm position in [0, 1] image space to device space
    pub fn from_palm(palm: Point2) -> Self {
        Self {
            x: palm.x * 2.0 - 1.0,
            y: -(palm.y * 2.0) + 1.0,
        }
    }
}

/// A catalog entry owned by the host scene
pub trait SelectableItem {
    /// Opaque catalog index reported back in selections
    fn index(&self) -> usize;

    /// Current world-space position
    fn world_position(&self) -> Position3;

    /// Width over height of the item's content, when known
    fn aspect_ratio(&self) -> Option<f32>;
}

/// Plain catalog entry for hosts without their own scene objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub index: usize,
    pub position: Position3,
    pub aspect_ratio: Option<f32>,
}

impl SelectableItem for CatalogItem {
    fn index(&self) -> usize {
        self.index
    }

    fn world_position(&self) -> Position3 {
        self.position
    }

    fn aspect_ratio(&self) -> Option<f32> {
        self.aspect_ratio
    }
}

/// A geometric hit reported by the host's pick-test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub item_index: usize,
    pub depth: f32,
}

/// Maps a pointer to the item it visually intersects, if any
pub trait PickTest {
    fn pick(&self, pointer: Pointer) -> Option<PickHit>;
}

impl<F> PickTest for F
where
    F: Fn(Pointer) -> Option<PickHit>,
{
    fn pick(&self, pointer: Pointer) -> Option<PickHit> {
        self(pointer)
    }
}

/// Everything the pipeline needs from the host scene to resolve a selection
pub trait SceneAccess {
    type Item: SelectableItem;

    fn items(&self) -> &[Self::Item];

    fn pick(&self, pointer: Pointer) -> Option<PickHit>;
}

/// A fixed catalog paired with a pick-test
pub struct StaticScene<P> {
    pub items: Vec<CatalogItem>,
    pub pick_test: P,
}

impl<P: PickTest> StaticScene<P> {
    pub fn new(items: Vec<CatalogItem>, pick_test: P) -> Self {
        Self { items, pick_test }
    }
}

impl<P: PickTest> SceneAccess for StaticScene<P> {
    type Item = CatalogItem;

    fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    fn pick(&self, pointer: Pointer) -> Option<PickHit> {
        self.pick_test.pick(pointer)
    }
}

/// A pick-test that never hits, forcing the nearest-item fallback
pub fn never_hits(_pointer: Pointer) -> Option<PickHit> {
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    /// The pick-test hit the item under the pointer
    Hit,
    /// Nothing under the pointer; closest item to the reference position
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionOutcome {
    pub index: usize,
    pub source: SelectionSource,
    pub aspect_ratio: Option<f32>,
}

/// Resolve the pointer to a catalog item.
///
/// Returns `None` only for an empty catalog. Nearest-item ties go to the
/// first item in catalog order.
pub fn resolve<P, I>(
    pointer: Pointer,
    pick_test: &P,
    items: &[I],
    reference: Position3,
) -> Option<SelectionOutcome>
where
    P: PickTest + ?Sized,
    I: SelectableItem,
{
    if items.is_empty() {
        debug!("Selection skipped: empty catalog");
        return None;
    }

    if let Some(hit) = pick_test.pick(pointer) {
        if let Some(item) = items.iter().find(|item| item.index() == hit.item_index) {
            debug!(
                "Pick hit item {} at depth {:.2}",
                hit.item_index, hit.depth
            );
            return Some(SelectionOutcome {
                index: item.index(),
                source: SelectionSource::Hit,
                aspect_ratio: item.aspect_ratio(),
            });
        }
        debug!(
            "Pick hit {} is not in the catalog, falling back to nearest",
            hit.item_index
        );
    }

    let mut nearest = &items[0];
    let mut min_distance = nearest.world_position().distance(&reference);
    for item in &items[1..] {
        let distance = item.world_position().distance(&reference);
        if distance < min_distance {
            min_distance = distance;
            nearest = item;
        }
    }

    Some(SelectionOutcome {
        index: nearest.index(),
        source: SelectionSource::Nearest,
        aspect_ratio: nearest.aspect_ratio(),
    })
}

/// How a presenter should fit the selected item's overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayFit {
    /// Fill this fraction of the viewport width, height follows the aspect
    Width { fraction: f32, max_px: u32 },
    /// Fill this fraction of the viewport height, width follows the aspect
    Height { fraction: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayLayout {
    pub aspect_ratio: f32,
    pub fit: OverlayFit,
}

impl OverlayLayout {
    const FALLBACK_ASPECT: f32 = 16.0 / 9.0;

    pub fn from_aspect(aspect_ratio: Option<f32>) -> Self {
        match aspect_ratio {
            Some(aspect) if aspect.is_finite() && aspect > 0.0 => {
                let fit = if aspect >= 1.0 {
                    OverlayFit::Width {
                        fraction: 0.8,
                        max_px: 600,
                    }
                } else {
                    OverlayFit::Height { fraction: 0.7 }
                };
                Self {
                    aspect_ratio: aspect,
                    fit,
                }
            }
            _ => Self {
                aspect_ratio: Self::FALLBACK_ASPECT,
                fit: OverlayFit::Width {
                    fraction: 0.8,
                    max_px: u32::MAX,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn item(index: usize, z: f32) -> CatalogItem {
        CatalogItem {
            index,
            position: Position3::new(0.0, 0.0, z),
            aspect_ratio: Some(1.5),
        }
    }

    #[test]
    fn test_fallback_picks_nearest() {
        let items = vec![item(0, 10.0), item(1, 3.0), item(2, 7.0)];
        let outcome = resolve(Pointer::default(), &never_hits, &items, Position3::default())
            .unwrap();
        assert_eq!(outcome.index, 1);
        assert_eq!(outcome.source, SelectionSource::Nearest);
    }

    #[test]
    fn test_hit_wins_over_nearest() {
        let items = vec![item(0, 10.0), item(1, 3.0), item(2, 7.0)];
        let pick = |_: Pointer| {
            Some(PickHit {
                item_index: 2,
                depth: 6.5,
            })
        };
        let outcome = resolve(Pointer::new(0.2, -0.1), &pick, &items, Position3::default())
            .unwrap();
        assert_eq!(outcome.index, 2);
        assert_eq!(outcome.source, SelectionSource::Hit);
        assert_eq!(outcome.aspect_ratio, Some(1.5));
    }

    #[test]
    fn test_hit_outside_catalog_falls_back() {
        let items = vec![item(4, 2.0), item(5, 1.0)];
        let pick = |_: Pointer| {
            Some(PickHit {
                item_index: 99,
                depth: 1.0,
            })
        };
        let outcome = resolve(Pointer::default(), &pick, &items, Position3::default()).unwrap();
        assert_eq!(outcome.index, 5);
        assert_eq!(outcome.source, SelectionSource::Nearest);
    }

    #[test]
    fn test_ties_go_to_first_item() {
        let items = vec![item(7, 5.0), item(3, -5.0), item(9, 5.0)];
        let outcome =
            resolve(Pointer::default(), &never_hits, &items, Position3::default()).unwrap();
        assert_eq!(outcome.index, 7);
    }

    #[test]
    fn test_empty_catalog() {
        let items: Vec<CatalogItem> = Vec::new();
        assert!(resolve(Pointer::default(), &never_hits, &items, Position3::default()).is_none());
    }

    #[test]
    fn test_pointer_reaches_pick_test() {
        let seen = Cell::new(None);
        let pick = |pointer: Pointer| -> Option<PickHit> {
            seen.set(Some(pointer));
            None
        };
        let items = vec![item(0, 1.0)];
        let pointer = Pointer::from_palm(Point2::new(0.75, 0.25));
        resolve(pointer, &pick, &items, Position3::default());

        let seen = seen.get().unwrap();
        assert!((seen.x - 0.5).abs() < 1e-6);
        assert!((seen.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_overlay_layout() {
        assert!(matches!(
            OverlayLayout::from_aspect(Some(1.5)).fit,
            OverlayFit::Width { fraction, .. } if fraction == 0.8
        ));
        assert!(matches!(
            OverlayLayout::from_aspect(Some(0.75)).fit,
            OverlayFit::Height { .. }
        ));
        let fallback = OverlayLayout::from_aspect(None);
        assert!((fallback.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
    }
}
