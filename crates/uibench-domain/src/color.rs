//! Relative-speed color scale.
//!
//! Cells are tinted by sweeping hue through CIE LCh(ab) at fixed lightness and chroma,
//! so neighbouring speeds stay perceptually evenly spaced.

use std::f64::consts::TAU;

const SCALE_LIGHTNESS: f64 = 0.9;
const SCALE_CHROMA: f64 = 0.4;

// D65 reference white.
const WHITE_X: f64 = 0.950_47;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.088_83;

/// Lightness and chroma in `[0, 1]` (scaled by 100 into CIE units), hue in turns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

/// Gamma-encoded sRGB, channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub fn to_hex(self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            channel_byte(self.r),
            channel_byte(self.g),
            channel_byte(self.b)
        )
    }
}

fn channel_byte(c: f64) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Hue (turns) for a relative slowness `t`: 140° at the fastest, 30° at the slowest.
pub fn slowness_hue(t: f64) -> f64 {
    (30.0 + 110.0 * (1.0 - t)) / 360.0
}

/// Background color for a cell whose median sits at `t` in its row
/// (0 = fastest, 1 = slowest). `t` is not range-checked.
pub fn slowness_color(t: f64) -> String {
    lch_to_rgb(Lch {
        l: SCALE_LIGHTNESS,
        c: SCALE_CHROMA,
        h: slowness_hue(t),
    })
    .to_hex()
}

/// LCh(ab) → Lab → XYZ → sRGB. Out-of-gamut channels are clamped.
pub fn lch_to_rgb(lch: Lch) -> Rgb {
    let l = lch.l * 100.0;
    let chroma = lch.c * 100.0;
    let angle = lch.h * TAU;
    let a = chroma * angle.cos();
    let b = chroma * angle.sin();

    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let x = WHITE_X * lab_f_inv(fx);
    let y = WHITE_Y * lab_f_inv(fy);
    let z = WHITE_Z * lab_f_inv(fz);

    let r = 3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z;
    let g = -0.969_266_0 * x + 1.876_010_8 * y + 0.041_556_0 * z;
    let bl = 0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z;

    Rgb {
        r: srgb_encode(r),
        g: srgb_encode(g),
        b: srgb_encode(bl),
    }
}

fn lab_f_inv(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;
    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

fn srgb_encode(linear: f64) -> f64 {
    let c = linear.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
