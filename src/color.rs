use std::fmt;

use palette::{Mix, Srgb};
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Rgb – an 8-bit colour serialized as `rgb(r,g,b)`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Rgb {
    fn to_srgb(self) -> Srgb<f32> {
        Srgb::new(self.0, self.1, self.2).into_format()
    }

    fn from_srgb(c: Srgb<f32>) -> Self {
        let c: Srgb<u8> = c.into_format();
        Rgb(c.red, c.green, c.blue)
    }
}

// ---------------------------------------------------------------------------
// Colorscales
// ---------------------------------------------------------------------------

/// Diverging scale used for correlation matrices.
pub const CORRELATION_STOPS: [Rgb; 10] = [
    Rgb(165, 0, 38),
    Rgb(215, 48, 39),
    Rgb(244, 109, 67),
    Rgb(253, 174, 97),
    Rgb(254, 224, 144),
    Rgb(224, 243, 248),
    Rgb(171, 217, 233),
    Rgb(116, 173, 209),
    Rgb(69, 117, 180),
    Rgb(49, 54, 149),
];

/// Sequential single-hue scale (ColorBrewer "Blues").
pub const BLUES_STOPS: [Rgb; 9] = [
    Rgb(247, 251, 255),
    Rgb(222, 235, 247),
    Rgb(198, 219, 239),
    Rgb(158, 202, 225),
    Rgb(107, 174, 214),
    Rgb(66, 146, 198),
    Rgb(33, 113, 181),
    Rgb(8, 81, 156),
    Rgb(8, 48, 107),
];

/// Piecewise-linear colour map over `[0, 1]`, serialized as `[[t, "rgb(..)"], ...]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Colorscale {
    stops: Vec<(f64, Rgb)>,
}

impl Colorscale {
    /// Evenly spaced stops `t = i / (n - 1)`.
    pub fn evenly_spaced(colors: &[Rgb]) -> Self {
        let last = colors.len().saturating_sub(1).max(1) as f64;
        Colorscale {
            stops: colors
                .iter()
                .enumerate()
                .map(|(i, &c)| (i as f64 / last, c))
                .collect(),
        }
    }

    pub fn correlation() -> Self {
        Self::evenly_spaced(&CORRELATION_STOPS)
    }

    pub fn blues() -> Self {
        Self::evenly_spaced(&BLUES_STOPS)
    }

    pub fn stops(&self) -> &[(f64, Rgb)] {
        &self.stops
    }

    /// Colour at `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let Some(&(_, first)) = self.stops.first() else {
            return Rgb(0, 0, 0);
        };
        for pair in self.stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                let f = if t1 > t0 { ((t - t0) / (t1 - t0)) as f32 } else { 0.0 };
                return Rgb::from_srgb(c0.to_srgb().mix(c1.to_srgb(), f));
            }
        }
        self.stops.last().map_or(first, |&(_, c)| c)
    }
}

// ---------------------------------------------------------------------------
// Qualitative palettes
// ---------------------------------------------------------------------------

/// ColorBrewer "Paired", 12 classes.
pub const PAIRED: [Rgb; 12] = [
    Rgb(166, 206, 227),
    Rgb(31, 120, 180),
    Rgb(178, 223, 138),
    Rgb(51, 160, 44),
    Rgb(251, 154, 153),
    Rgb(227, 26, 28),
    Rgb(253, 191, 111),
    Rgb(255, 127, 0),
    Rgb(202, 178, 214),
    Rgb(106, 61, 154),
    Rgb(255, 255, 153),
    Rgb(177, 89, 40),
];

/// Default qualitative sequence of plotly express.
pub const PLOTLY: [Rgb; 10] = [
    Rgb(99, 110, 250),
    Rgb(239, 85, 59),
    Rgb(0, 204, 150),
    Rgb(171, 99, 250),
    Rgb(255, 161, 90),
    Rgb(25, 211, 243),
    Rgb(255, 102, 146),
    Rgb(182, 232, 128),
    Rgb(255, 151, 255),
    Rgb(254, 203, 82),
];

/// Dendrogram link colour.
pub const DENDROGRAM_LINK: Rgb = Rgb(68, 68, 68);

/// Colour of item `index`, repeating the palette when it runs out.
pub fn cyclic(palette: &[Rgb], index: usize) -> Rgb {
    palette[index % palette.len()]
}
