//! RGBA color and multi-stop gradients.

use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGBA color.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = opaque).
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::new(255, 0, 0, 255);
    /// Opaque green.
    pub const GREEN: Self = Self::new(0, 255, 0, 255);
    /// Opaque blue.
    pub const BLUE: Self = Self::new(0, 0, 255, 255);
    /// Opaque yellow.
    pub const YELLOW: Self = Self::new(255, 255, 0, 255);

    /// Create a new color from components.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// True when the color contributes no visible pixels.
    #[inline]
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// True when the color is fully opaque.
    #[inline]
    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Linear interpolation between two colors, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: lerp_u8(self.r, other.r, t),
            g: lerp_u8(self.g, other.g, t),
            b: lerp_u8(self.b, other.b, t),
            a: lerp_u8(self.a, other.a, t),
        }
    }

    /// Component-wise multiply, used for tinting during composition.
    pub fn modulate(self, tint: Self) -> Self {
        #[inline]
        fn mul(a: u8, b: u8) -> u8 {
            ((a as u16 * b as u16) / 255) as u8
        }
        Self {
            r: mul(self.r, tint.r),
            g: mul(self.g, tint.g),
            b: mul(self.b, tint.b),
            a: mul(self.a, tint.a),
        }
    }

    /// Source-over blend of `self` onto `dst`.
    pub fn over(self, dst: Self) -> Self {
        if self.a == 255 {
            return self;
        }
        if self.a == 0 {
            return dst;
        }
        let sa = self.a as u32;
        let da = dst.a as u32;
        let out_a = sa + da * (255 - sa) / 255;
        if out_a == 0 {
            return Self::TRANSPARENT;
        }
        let blend = |s: u8, d: u8| -> u8 {
            let s = s as u32;
            let d = d as u32;
            (((s * sa + d * da * (255 - sa) / 255) / out_a) as u8).min(255)
        };
        Self {
            r: blend(self.r, dst.r),
            g: blend(self.g, dst.g),
            b: blend(self.b, dst.b),
            a: out_a as u8,
        }
    }
}

/// Linear interpolation for u8 values.
#[inline]
fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round() as u8
}

impl std::fmt::Debug for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// A single stop along a [`Gradient`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Color at this stop.
    pub color: Rgba,
    /// Normalized position in `[0, 1]`.
    pub stop: f32,
}

/// A multi-stop color gradient sampled by normalized position.
///
/// Always holds at least two stops; constructing from a single color yields
/// that color at both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    stops: Vec<GradientStop>,
}

impl Gradient {
    /// Create a gradient from evenly spaced colors.
    pub fn new(colors: &[Rgba]) -> Self {
        match colors {
            [] => Self::solid(Rgba::TRANSPARENT),
            [one] => Self::solid(*one),
            many => {
                let last = (many.len() - 1) as f32;
                let stops = many
                    .iter()
                    .enumerate()
                    .map(|(i, &color)| GradientStop {
                        color,
                        stop: i as f32 / last,
                    })
                    .collect();
                Self { stops }
            }
        }
    }

    /// Create a two-stop gradient of a single color.
    pub fn solid(color: Rgba) -> Self {
        Self {
            stops: vec![
                GradientStop { color, stop: 0.0 },
                GradientStop { color, stop: 1.0 },
            ],
        }
    }

    /// The ordered stops.
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Replace the color of the first stop.
    pub fn set_first_color(&mut self, color: Rgba) {
        if let Some(first) = self.stops.first_mut() {
            first.color = color;
        }
    }

    /// Replace the color of the last stop.
    pub fn set_last_color(&mut self, color: Rgba) {
        if let Some(last) = self.stops.last_mut() {
            last.color = color;
        }
    }

    /// Sample the gradient at normalized position `t` (clamped to `[0, 1]`).
    pub fn lerp(&self, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mut prev = match self.stops.first() {
            Some(s) => *s,
            None => return Rgba::TRANSPARENT,
        };
        if t <= prev.stop {
            return prev.color;
        }
        for &next in &self.stops[1..] {
            if t <= next.stop {
                let span = next.stop - prev.stop;
                if span <= f32::EPSILON {
                    return next.color;
                }
                return prev.color.lerp(next.color, (t - prev.stop) / span);
            }
            prev = next;
        }
        prev.color
    }
}

impl From<Rgba> for Gradient {
    fn from(color: Rgba) -> Self {
        Self::solid(color)
    }
}
