#![no_main]

use cscroll_core::geometry::{Rect, Size};
use cscroll_core::resolver::{self, ViewGeometry};
use cscroll_core::Visibility;
use libfuzzer_sys::fuzz_target;

fn f64_at(data: &[u8], index: usize) -> f64 {
    let start = index * 8;
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[start..start + 8]);
    f64::from_le_bytes(bytes)
}

fuzz_target!(|data: &[u8]| {
    // One selector byte followed by eight raw f64 values (NaN and inf included).
    if data.len() < 1 + 8 * 8 {
        return;
    }
    let visibility = if data[0] & 1 == 0 {
        Visibility::Showing
    } else {
        Visibility::Hiding
    };
    let values = &data[1..];

    let window = Rect::from_size(f64_at(values, 0), f64_at(values, 1));
    let geometry = ViewGeometry {
        window_bounds: window,
        view_frame_in_window: Rect::new(
            f64_at(values, 2),
            f64_at(values, 3),
            f64_at(values, 4),
            f64_at(values, 5),
        ),
        safe_area_bottom: f64_at(values, 6),
        additional_bottom: f64_at(values, 7),
    };
    let reported = Size::new(f64_at(values, 4), f64_at(values, 7));

    let frame = resolver::keyboard_frame(visibility, reported, geometry.window_height());
    let overlap = resolver::overlap(frame, &geometry);

    // Post-conditions that must always hold:
    assert!(overlap.is_finite(), "overlap not finite: {overlap}");
    assert!(overlap >= 0.0, "overlap negative: {overlap}");
    assert_eq!(
        overlap.to_bits(),
        resolver::overlap(frame, &geometry).to_bits(),
        "overlap not deterministic"
    );
    if visibility == Visibility::Hiding {
        assert_eq!(overlap, 0.0, "hiding keyboard overlaps");
    }
});
