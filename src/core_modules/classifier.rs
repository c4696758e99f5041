// THEORY:
// The `OccupancyClassifier` is the spatial layer: it turns the per-pixel
// delta magnitude grid into a frame-level occupied/unoccupied verdict plus
// the bounding regions of whatever moved. It is completely stateless; every
// frame is classified on its own and the regions are recomputed from scratch.
//
// Algorithm, in order:
// 1.  **Binarize**: pixels whose delta exceeds the configured threshold
//     become foreground.
// 2.  **Dilate**: two passes with a 3x3 structuring element merge adjacent
//     foreground fragments and close small noise holes, so one moving object
//     reads as one region instead of a cloud of specks.
// 3.  **Connected components**: a visited-grid BFS flood fill collects each
//     foreground component and its bounding box.
// 4.  **Area filter**: components smaller than the configured floor are
//     discarded. The boundary is inclusive; a component of exactly the floor
//     survives. This is the config-driven defense against lighting flicker.
//
// The surviving regions are reported in ascending top-left (y, x) order. The
// order carries no meaning, but a deterministic order keeps the output
// directly comparable in tests.

use crate::core_modules::frame::GrayFrame;
use std::collections::VecDeque;

const DILATE_ITERATIONS: usize = 2;

/// Occupancy verdict for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyVerdict {
    Occupied,
    Unoccupied,
}

/// Axis-aligned bounding box of one surviving motion component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Stateless delta-grid classifier with a fixed threshold and area floor.
pub struct OccupancyClassifier {
    delta_threshold: u8,
    min_contour_area: usize,
}

impl OccupancyClassifier {
    pub fn new(delta_threshold: u8, min_contour_area: usize) -> Self {
        Self {
            delta_threshold,
            min_contour_area,
        }
    }

    pub fn classify(&self, delta: &GrayFrame) -> (OccupancyVerdict, Vec<MotionRegion>) {
        let mut mask = binarize(delta, self.delta_threshold);
        for _ in 0..DILATE_ITERATIONS {
            mask = dilate(&mask, delta.width, delta.height);
        }

        let regions = extract_regions(&mask, delta.width, delta.height, self.min_contour_area);
        let verdict = if regions.is_empty() {
            OccupancyVerdict::Unoccupied
        } else {
            OccupancyVerdict::Occupied
        };
        (verdict, regions)
    }
}

/// Foreground mask: strictly greater than the threshold, matching a binary
/// threshold of the delta image.
fn binarize(delta: &GrayFrame, threshold: u8) -> Vec<bool> {
    delta.pixels.iter().map(|&p| p > threshold).collect()
}

/// One pass of morphological dilation with a full 3x3 structuring element.
fn dilate(mask: &[bool], width: u32, height: u32) -> Vec<bool> {
    let (width, height) = (width as i64, height as i64);
    let mut out = vec![false; mask.len()];

    for y in 0..height {
        for x in 0..width {
            if !mask[(y * width + x) as usize] {
                continue;
            }
            for dy in -1..=1i64 {
                for dx in -1..=1i64 {
                    let ny = y + dy;
                    let nx = x + dx;
                    if ny >= 0 && ny < height && nx >= 0 && nx < width {
                        out[(ny * width + nx) as usize] = true;
                    }
                }
            }
        }
    }
    out
}

/// Flood-fills every foreground component and keeps those whose pixel count
/// reaches `min_area` (inclusive). Regions come back sorted by top-left
/// coordinate, rows first.
fn extract_regions(mask: &[bool], width: u32, height: u32, min_area: usize) -> Vec<MotionRegion> {
    let mut visited = vec![false; mask.len()];
    let mut regions = Vec::new();

    for start in 0..mask.len() {
        if !mask[start] || visited[start] {
            continue;
        }

        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited[start] = true;

        let mut area = 0usize;
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0u32;
        let mut max_y = 0u32;

        while let Some(index) = queue.pop_front() {
            area += 1;
            let x = index as u32 % width;
            let y = index as u32 / width;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);

            for (dx, dy) in [(0i64, 1i64), (0, -1), (1, 0), (-1, 0)] {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx < 0 || nx >= width as i64 || ny < 0 || ny >= height as i64 {
                    continue;
                }
                let neighbor = (ny * width as i64 + nx) as usize;
                if mask[neighbor] && !visited[neighbor] {
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }

        if area >= min_area {
            regions.push(MotionRegion {
                x: min_x,
                y: min_y,
                width: max_x - min_x + 1,
                height: max_y - min_y + 1,
            });
        }
    }

    regions.sort_by_key(|r| (r.y, r.x));
    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Delta grid with a filled block of the given geometry, everything else
    /// zero.
    fn delta_with_block(w: u32, h: u32, x0: u32, y0: u32, bw: u32, bh: u32) -> GrayFrame {
        let mut grid = GrayFrame::filled(w, h, 0);
        for y in y0..y0 + bh {
            for x in x0..x0 + bw {
                grid.set(x, y, 255);
            }
        }
        grid
    }

    #[test]
    fn area_floor_is_inclusive_on_the_raw_filter() {
        let mut mask = vec![false; 100];
        for i in 0..7 {
            mask[30 + i] = true; // 7-pixel horizontal run
        }
        assert_eq!(extract_regions(&mask, 10, 10, 7).len(), 1);
        assert!(extract_regions(&mask, 10, 10, 8).is_empty());
    }

    #[test]
    fn area_floor_is_inclusive_through_classify() {
        // A 3x3 foreground block grows to 7x7 = 49 pixels after two 3x3
        // dilation passes.
        let delta = delta_with_block(30, 30, 10, 10, 3, 3);

        let (verdict, regions) = OccupancyClassifier::new(25, 49).classify(&delta);
        assert_eq!(verdict, OccupancyVerdict::Occupied);
        assert_eq!(
            regions,
            vec![MotionRegion {
                x: 8,
                y: 8,
                width: 7,
                height: 7
            }]
        );

        let (verdict, regions) = OccupancyClassifier::new(25, 50).classify(&delta);
        assert_eq!(verdict, OccupancyVerdict::Unoccupied);
        assert!(regions.is_empty());
    }

    #[test]
    fn threshold_is_strictly_greater_than() {
        let delta = GrayFrame::filled(4, 4, 25);
        let (verdict, _) = OccupancyClassifier::new(25, 1).classify(&delta);
        assert_eq!(verdict, OccupancyVerdict::Unoccupied);

        let delta = GrayFrame::filled(4, 4, 26);
        let (verdict, _) = OccupancyClassifier::new(25, 1).classify(&delta);
        assert_eq!(verdict, OccupancyVerdict::Occupied);
    }

    #[test]
    fn dilation_merges_nearby_fragments() {
        // Two single pixels 4 apart merge into one component after two
        // dilation passes (each grows every fragment by 2 in each direction).
        let mut delta = GrayFrame::filled(20, 20, 0);
        delta.set(5, 10, 255);
        delta.set(9, 10, 255);

        let (_, regions) = OccupancyClassifier::new(25, 1).classify(&delta);
        assert_eq!(regions.len(), 1);
    }

    #[test]
    fn regions_come_back_in_top_left_order() {
        let mut delta = delta_with_block(60, 60, 40, 40, 3, 3);
        for y in 5..8 {
            for x in 5..8 {
                delta.set(x, y, 255);
            }
        }

        let (_, regions) = OccupancyClassifier::new(25, 1).classify(&delta);
        assert_eq!(regions.len(), 2);
        assert!(regions[0].y < regions[1].y);
        assert_eq!((regions[0].x, regions[0].y), (3, 3));
        assert_eq!((regions[1].x, regions[1].y), (38, 38));
    }

    #[test]
    fn quiet_grid_is_unoccupied() {
        let delta = GrayFrame::filled(16, 16, 0);
        let (verdict, regions) = OccupancyClassifier::new(25, 1).classify(&delta);
        assert_eq!(verdict, OccupancyVerdict::Unoccupied);
        assert!(regions.is_empty());
    }
}
