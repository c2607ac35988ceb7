//! Progress ring geometry
//!
//! The ring lives in a 100x100 viewBox. Angles are in degrees, measured
//! clockwise from twelve o'clock.

pub const RING_CENTER: f64 = 50.0;
pub const RING_RADIUS: f64 = 40.0;

/// Convert a `[0, 1]` progress fraction to a percentage clamped to `[0, 100]`.
pub fn clamp_percent(progress: f64) -> f64 {
    (progress * 100.0).clamp(0.0, 100.0)
}

/// Linear mapping of percent to sweep angle (100% = 360 degrees).
pub fn arc_degrees(percent: f64) -> f64 {
    percent * 3.6
}

pub fn polar_to_cartesian(cx: f64, cy: f64, radius: f64, angle_deg: f64) -> (f64, f64) {
    let rad = (angle_deg - 90.0).to_radians();
    (cx + radius * rad.cos(), cy + radius * rad.sin())
}

/// SVG arc segment from `start_deg` to `end_deg`, sweeping clockwise.
pub fn describe_arc(cx: f64, cy: f64, radius: f64, start_deg: f64, end_deg: f64) -> String {
    let (sx, sy) = polar_to_cartesian(cx, cy, radius, start_deg);
    let (ex, ey) = polar_to_cartesian(cx, cy, radius, end_deg);
    let large_arc = u8::from(end_deg - start_deg > 180.0);

    format!(
        "M {} {} A {} {} 0 {} 1 {} {}",
        fmt_coord(sx),
        fmt_coord(sy),
        fmt_coord(radius),
        fmt_coord(radius),
        large_arc,
        fmt_coord(ex),
        fmt_coord(ey)
    )
}

/// Filled pie sector for a sweep of `degrees`.
///
/// Returns `None` for a zero sweep. A full sweep is drawn as two half arcs
/// because an SVG arc whose endpoints coincide renders nothing.
pub fn pie_path(degrees: f64) -> Option<String> {
    if degrees <= 0.0 {
        return None;
    }

    let (cx, cy, r) = (RING_CENTER, RING_CENTER, RING_RADIUS);

    if degrees >= 360.0 {
        let first = describe_arc(cx, cy, r, 0.0, 180.0);
        let (ex, ey) = polar_to_cartesian(cx, cy, r, 360.0);
        return Some(format!(
            "{} A {} {} 0 0 1 {} {} Z",
            first,
            fmt_coord(r),
            fmt_coord(r),
            fmt_coord(ex),
            fmt_coord(ey)
        ));
    }

    let arc = describe_arc(cx, cy, r, 0.0, degrees);
    // Turn "M x y A ..." into "M cx cy L x y A ... Z"
    let arc = arc.trim_start_matches("M ");
    Some(format!(
        "M {} {} L {} Z",
        fmt_coord(cx),
        fmt_coord(cy),
        arc
    ))
}

/// Single-cell pie glyph for terminal rendering.
pub fn pie_glyph(percent: f64) -> char {
    if percent <= 0.0 {
        '○'
    } else if percent < 37.5 {
        '◔'
    } else if percent < 62.5 {
        '◑'
    } else if percent < 100.0 {
        '◕'
    } else {
        '●'
    }
}

// Two decimals, trailing zeros trimmed, no negative zero.
fn fmt_coord(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let s = format!("{:.2}", rounded);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
