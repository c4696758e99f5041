// Annotation drawing for preview and evidence frames: a 2-px outline around
// every surviving motion region and a red strip along the top edge while the
// frame is occupied. Pure pixel writes on the display frame; the capture
// timestamp travels in the upload destination name instead of being
// rasterized onto the image.

use crate::core_modules::classifier::{MotionRegion, OccupancyVerdict};
use crate::core_modules::frame::RgbFrame;

const REGION_COLOR: (u8, u8, u8) = (0, 255, 0);
const STATUS_COLOR: (u8, u8, u8) = (255, 0, 0);
const OUTLINE_THICKNESS: u32 = 2;
const STATUS_STRIP_HEIGHT: u32 = 6;

/// Draws region outlines plus the occupancy strip onto the display frame.
pub fn annotate(frame: &mut RgbFrame, verdict: OccupancyVerdict, regions: &[MotionRegion]) {
    for region in regions {
        draw_outline(frame, region);
    }
    if verdict == OccupancyVerdict::Occupied {
        draw_status_strip(frame);
    }
}

fn draw_outline(frame: &mut RgbFrame, region: &MotionRegion) {
    let x1 = (region.x + region.width).min(frame.width);
    let y1 = (region.y + region.height).min(frame.height);

    for t in 0..OUTLINE_THICKNESS {
        // Top and bottom edges.
        for x in region.x..x1 {
            if region.y + t < frame.height {
                frame.set_pixel(x, region.y + t, REGION_COLOR);
            }
            if y1 > t + 1 {
                frame.set_pixel(x, y1 - 1 - t, REGION_COLOR);
            }
        }
        // Left and right edges.
        for y in region.y..y1 {
            if region.x + t < frame.width {
                frame.set_pixel(region.x + t, y, REGION_COLOR);
            }
            if x1 > t + 1 {
                frame.set_pixel(x1 - 1 - t, y, REGION_COLOR);
            }
        }
    }
}

fn draw_status_strip(frame: &mut RgbFrame) {
    let height = STATUS_STRIP_HEIGHT.min(frame.height);
    for y in 0..height {
        for x in 0..frame.width {
            frame.set_pixel(x, y, STATUS_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupied_frame_gets_the_status_strip() {
        let mut frame = RgbFrame::filled(20, 20, 0);
        annotate(&mut frame, OccupancyVerdict::Occupied, &[]);
        assert_eq!(frame.pixel(0, 0), STATUS_COLOR);
        assert_eq!(frame.pixel(19, STATUS_STRIP_HEIGHT - 1), STATUS_COLOR);
        assert_eq!(frame.pixel(0, STATUS_STRIP_HEIGHT), (0, 0, 0));
    }

    #[test]
    fn unoccupied_frame_stays_clean() {
        let mut frame = RgbFrame::filled(20, 20, 0);
        annotate(&mut frame, OccupancyVerdict::Unoccupied, &[]);
        assert!(frame.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn region_outline_marks_corners_not_interior() {
        let mut frame = RgbFrame::filled(30, 30, 0);
        let region = MotionRegion {
            x: 10,
            y: 10,
            width: 10,
            height: 10,
        };
        annotate(&mut frame, OccupancyVerdict::Unoccupied, &[region]);
        assert_eq!(frame.pixel(10, 10), REGION_COLOR);
        assert_eq!(frame.pixel(19, 19), REGION_COLOR);
        // Center of the box is untouched.
        assert_eq!(frame.pixel(15, 15), (0, 0, 0));
    }
}
