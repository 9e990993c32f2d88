//! Line-position estimation from the binary line sensor.
//!
//! The 7-element sensor is split at its center element into a left and a
//! right half. Each half yields an independent signed position estimate:
//! the robot's offset from the line as seen by that half, in physical
//! units (one sensor gap per accumulated index step, 0.08 by default).
//! A half with no active element has no estimate.
//!
//! A noise filter precedes estimation. Isolated single bits are either
//! discarded or snapped toward the center when the opposite half shows a
//! two-of-four pattern that indicates a sensor-gap artifact rather than
//! noise. The left and right filters are mirror images of each other
//! around the center index.

use crate::link::{LINE_CENTER, LINE_ELEMENTS};

/// Default physical spacing between adjacent sensor elements.
pub const SENSOR_SPACING: f32 = 0.08;

/// Compute the signed left/right position estimates for a reading.
///
/// `spacing` is the physical gap between adjacent sensor elements and
/// scales both estimates. Pure function of the input; `None` means no
/// active element on that half ("no signal"). The center element, when
/// active, contributes -1 to the accumulated sum of both halves.
pub fn line_position(line: &[bool; LINE_ELEMENTS], spacing: f32) -> (Option<f32>, Option<f32>) {
    // Left of center
    let mut sum = 0i32;
    let mut active = 0u32;
    for (i, &on) in line.iter().enumerate().take(LINE_CENTER) {
        if on {
            sum += (i as i32 - LINE_CENTER as i32).abs();
            active += 1;
        }
    }
    if line[LINE_CENTER] {
        sum -= 1;
        active += 1;
    }
    let left = (active > 0).then(|| spacing * sum as f32 / active as f32);

    // Right of center
    let mut sum = 0i32;
    let mut active = 0u32;
    for (i, &on) in line.iter().enumerate().skip(LINE_CENTER + 1) {
        if on {
            sum += i as i32 - LINE_CENTER as i32;
            active += 1;
        }
    }
    if line[LINE_CENTER] {
        sum -= 1;
        active += 1;
    }
    let right = (active > 0).then(|| spacing * sum as f32 / active as f32);

    (left, right)
}

/// Filter sensor noise in place: left half first, then right half.
pub fn filter_line(line: &mut [bool; LINE_ELEMENTS]) {
    filter_left(line);
    filter_right(line);
}

/// Indices of active elements within an inclusive index range.
fn active_in(line: &[bool; LINE_ELEMENTS], lo: usize, hi: usize) -> Vec<usize> {
    (lo..=hi).filter(|&i| line[i]).collect()
}

/// Filter the left half (indices 0..=3).
///
/// A single active non-center bit is noise and is cleared, unless it sits
/// at index 2 with the right half reading the gap pattern [off, on, on,
/// off]; then the line is actually under the center and the center bit is
/// snapped on. Two active bits spanning the center with a one-element gap
/// get the gap filled; a center-plus-edge pair drops the edge.
fn filter_left(line: &mut [bool; LINE_ELEMENTS]) {
    let idx = active_in(line, 0, LINE_CENTER);

    match idx.len() {
        1 if idx[0] != LINE_CENTER => {
            if idx[0] == 2 && !line[3] && line[4] && line[5] && !line[6] {
                line[3] = true;
            } else {
                line[idx[0]] = false;
            }
        }
        2 if idx[1] == LINE_CENTER && idx[0] < 2 => {
            if idx[0] == 1 && !line[5] {
                line[2] = true;
            } else {
                line[0] = false;
            }
        }
        _ => {}
    }
}

/// Filter the right half (indices 3..=6). Mirror image of [`filter_left`].
fn filter_right(line: &mut [bool; LINE_ELEMENTS]) {
    let idx = active_in(line, LINE_CENTER, LINE_ELEMENTS - 1);

    match idx.len() {
        1 if idx[0] != LINE_CENTER => {
            if idx[0] == 4 && !line[3] && line[2] && line[1] && !line[0] {
                line[3] = true;
            } else {
                line[idx[0]] = false;
            }
        }
        2 if idx[0] == LINE_CENTER && idx[1] > 4 => {
            if idx[1] == 5 && !line[1] {
                line[4] = true;
            } else {
                line[6] = false;
            }
        }
        _ => {}
    }
}

/// Parse a 7-character "0"/"1" string into a sensor array. Test helper
/// kept public for the harness and integration tests.
pub fn parse_line(s: &str) -> [bool; LINE_ELEMENTS] {
    let mut out = [false; LINE_ELEMENTS];
    for (i, c) in s.chars().take(LINE_ELEMENTS).enumerate() {
        out[i] = c == '1';
    }
    out
}
