//! Firework colors.
//!
//! Colors travel through the simulation as CSS color strings (the rocket
//! generator produces `hsl(H, 90%, 60%)`) and are resolved to RGB once at
//! construction so the rasterizer never re-parses them.
//!
//! Any CSS color lightningcss understands is accepted: hex, `rgb()`,
//! `hsl()`, `hwb()`, `oklch()` and the named colors. Alpha is ignored.

use std::fmt;
use std::sync::Arc;

use lightningcss::traits::Parse;
use lightningcss::values::color::{CssColor, FloatColor, HSL, SRGB};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// CSS parsing error from lightningcss
    #[error("CSS parse error: {0}")]
    CssParse(String),
}

/// Straight-alpha fill style with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        (channel_to_u8(self.r), channel_to_u8(self.g), channel_to_u8(self.b))
    }
}

fn channel_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Lightness factor applied by [`Dimming::Lightness`].
const DIM_LIGHTNESS: f32 = 7.0 / 9.0;

/// How distant particles get their color dimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dimming {
    /// Swap the first literal `90%` token for `70%`. Colors without that
    /// token are left alone.
    #[default]
    Literal,
    /// Scale the HSL lightness of any color by 7/9.
    Lightness,
}

/// A CSS color string together with its resolved RGB value.
#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    css: Arc<str>,
    rgb: [f32; 3],
}

impl Color {
    /// Parse a CSS color string.
    ///
    /// # Examples
    ///
    /// ```
    /// use fireworks::color::Color;
    ///
    /// let red = Color::parse("hsl(0, 100%, 50%)").unwrap();
    /// assert_eq!(red.to_rgb8(), (255, 0, 0));
    /// assert_eq!(Color::parse("red").unwrap().to_rgb8(), (255, 0, 0));
    /// ```
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ColorError::Empty);
        }
        let rgb = resolve(trimmed)?;
        Ok(Self {
            css: Arc::from(trimmed),
            rgb,
        })
    }

    /// Build the `hsl(H, S%, L%)` string the rocket generator uses.
    pub fn hsl(hue: u16, saturation: u8, lightness: u8) -> Self {
        let css = format!("hsl({hue}, {saturation}%, {lightness}%)");
        // Generated notation always parses; gray at the requested lightness otherwise.
        let rgb = resolve(&css).unwrap_or([lightness.min(100) as f32 / 100.0; 3]);
        Self {
            css: Arc::from(css),
            rgb,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.css
    }

    pub fn rgb(&self) -> [f32; 3] {
        self.rgb
    }

    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        self.fill().to_rgb8()
    }

    /// Opaque fill style for this color.
    pub fn fill(&self) -> Rgba {
        Rgba::new(self.rgb[0], self.rgb[1], self.rgb[2], 1.0)
    }

    /// The color used for particles farther than the dimming depth.
    pub fn dimmed(&self, mode: Dimming) -> Color {
        match mode {
            Dimming::Literal => {
                if !self.css.contains("90%") {
                    return self.clone();
                }
                // A replacement that no longer parses keeps the original paint.
                Color::parse(&self.css.replacen("90%", "70%", 1)).unwrap_or_else(|_| self.clone())
            }
            Dimming::Lightness => {
                let rgb = scale_lightness(self.rgb, DIM_LIGHTNESS);
                let (r, g, b) = Rgba::new(rgb[0], rgb[1], rgb[2], 1.0).to_rgb8();
                Self {
                    css: Arc::from(format!("#{r:02x}{g:02x}{b:02x}")),
                    rgb,
                }
            }
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css)
    }
}

/// Parse with lightningcss and convert to sRGB.
fn resolve(s: &str) -> Result<[f32; 3], ColorError> {
    let css_color = CssColor::parse_string(s).map_err(|e| ColorError::CssParse(e.to_string()))?;

    let rgb_color = css_color
        .to_rgb()
        .map_err(|_| ColorError::CssParse(format!("cannot convert '{s}' to RGB")))?;

    match rgb_color {
        CssColor::RGBA(rgba) => Ok([rgba.red, rgba.green, rgba.blue].map(|c| c as f32 / 255.0)),
        // Colors with `none` components stay in float form.
        CssColor::Float(float_color) => match float_color.as_ref() {
            FloatColor::RGB(rgb) => Ok([rgb.r, rgb.g, rgb.b].map(|c| c.clamp(0.0, 1.0))),
            _ => Err(ColorError::CssParse(format!("unexpected float color for '{s}'"))),
        },
        _ => Err(ColorError::CssParse(format!("'{s}' did not convert to RGB"))),
    }
}

/// Round-trip through lightningcss' HSL space with the lightness scaled.
fn scale_lightness([r, g, b]: [f32; 3], factor: f32) -> [f32; 3] {
    // Grays have no hue; their lightness is the channel value itself.
    if r == g && g == b {
        return [r * factor; 3];
    }
    let mut hsl = HSL::from(SRGB {
        r,
        g,
        b,
        alpha: 1.0,
    });
    hsl.l *= factor;
    let out = SRGB::from(hsl);
    let scaled = [out.r, out.g, out.b];
    if scaled.iter().all(|c| c.is_finite()) {
        scaled.map(|c| c.clamp(0.0, 1.0))
    } else {
        [r * factor, g * factor, b * factor]
    }
}
