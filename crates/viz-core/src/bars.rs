use crate::constants::{
    BAR_INSET, BAR_MAX_RADIUS_PX, BAR_MIN_HEIGHT_PX, BAR_RADIUS_OF_SLOT, BAR_VERTICAL_RESERVE_PX,
    BAR_WIDTH, BASELINE_OFFSET_PX, BIN_COUNT,
};
use glam::DVec2;

/// Rounded rectangle for one bin, in CSS pixels with the origin top-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarRect {
    pub origin: DVec2,
    pub size: DVec2,
    pub radius: f64,
}

/// Lays out one bar per bin across `client_width`. Heights scale with the
/// normalized value over the area left after the vertical reserve, with a
/// floor so silent bins stay visible.
pub fn bar_layout(
    bins: &[f32; BIN_COUNT],
    client_width: f64,
    client_height: f64,
) -> impl Iterator<Item = BarRect> + '_ {
    let slot = client_width.max(0.0) / BIN_COUNT as f64;
    let usable = (client_height - BAR_VERTICAL_RESERVE_PX).max(0.0);
    let radius = BAR_MAX_RADIUS_PX.min(slot * BAR_RADIUS_OF_SLOT);
    bins.iter()
        .enumerate()
        .map(move |(i, &value)| {
            let h = bar_height(value, usable);
            BarRect {
                origin: DVec2::new(
                    i as f64 * slot + slot * BAR_INSET,
                    client_height - h - BASELINE_OFFSET_PX,
                ),
                size: DVec2::new(slot * BAR_WIDTH, h),
                radius,
            }
        })
}

#[inline]
pub fn bar_height(value: f32, usable_height: f64) -> f64 {
    (value.clamp(0.0, 1.0) as f64 * usable_height).max(BAR_MIN_HEIGHT_PX)
}
