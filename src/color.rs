use ratatui::style::Color;

/// Hue step between consecutive cluster ids (degrees). Close to the golden
/// angle so neighbouring ids land far apart on the color wheel.
const HUE_STEP: f64 = 137.5;
const SATURATION: f64 = 0.5;
const LIGHTNESS: f64 = 0.5;

/// Empty sites
pub const BACKGROUND_RGB: [u8; 3] = [255, 255, 255];
/// Gaps between sites in exported images
pub const GAP_RGB: [u8; 3] = [0, 0, 0];

/// Hue in degrees assigned to a cluster id
pub fn cluster_hue(cluster: usize) -> f64 {
    (cluster as f64 * HUE_STEP) % 360.0
}

/// Convert HSL (hue in degrees, s and l in 0-1) to RGB
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 3] {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}

/// RGB color of a cluster id
pub fn cluster_rgb(cluster: usize) -> [u8; 3] {
    hsl_to_rgb(cluster_hue(cluster), SATURATION, LIGHTNESS)
}

/// RGB color of a site: cluster hue when occupied, background otherwise
pub fn site_rgb(occupied: bool, cluster: usize) -> [u8; 3] {
    if occupied {
        cluster_rgb(cluster)
    } else {
        BACKGROUND_RGB
    }
}

/// Terminal color of a site
pub fn site_color(occupied: bool, cluster: usize) -> Color {
    let [r, g, b] = site_rgb(occupied, cluster);
    Color::Rgb(r, g, b)
}
