use std::collections::HashMap;

use lifeline_protocol::{Color, Paint, Point, ThemeToken};

use crate::config::StoryConfig;
use crate::model::{Dataset, Record};

/// d3's `schemeTableau10`.
pub const TABLEAU10: [Color; 10] = [
    Color::from_hex(0x4e79a7),
    Color::from_hex(0xf28e2c),
    Color::from_hex(0xe15759),
    Color::from_hex(0x76b7b2),
    Color::from_hex(0x59a14f),
    Color::from_hex(0xedc949),
    Color::from_hex(0xaf7aa1),
    Color::from_hex(0xff9da7),
    Color::from_hex(0x9c755f),
    Color::from_hex(0xbab0ab),
];

// Thresholds for choosing a 10, 5 or 2 multiplier in `tick_spec`.
const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// A continuous linear mapping from `domain` to `range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    /// Map a domain value to the range. Values outside the domain
    /// extrapolate linearly. A degenerate domain maps to the range midpoint.
    pub fn apply(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 { 0.5 } else { (value - d0) / span };
        r0 + t * (r1 - r0)
    }

    /// Map a range value back into the domain.
    pub fn invert(&self, pixel: f64) -> f64 {
        LinearScale::new(self.range, self.domain).apply(pixel)
    }

    /// Roughly `count` evenly spaced, human-friendly values inside the domain
    /// (steps of 1, 2 or 5 times a power of ten), matching d3's `ticks`.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let [a, b] = self.domain;
        if count == 0 || !a.is_finite() || !b.is_finite() {
            return Vec::new();
        }
        if a == b {
            return vec![a];
        }
        let (start, stop) = if a < b { (a, b) } else { (b, a) };
        let Some((i1, i2, inc)) = tick_spec(start, stop, count as f64) else {
            return Vec::new();
        };
        let mut ticks: Vec<f64> = (i1..=i2)
            .map(|i| {
                if inc < 0.0 {
                    i as f64 / -inc
                } else {
                    i as f64 * inc
                }
            })
            .collect();
        if a > b {
            ticks.reverse();
        }
        ticks
    }

    /// Distance between consecutive ticks for `count`, used for label precision.
    pub fn tick_step(&self, count: usize) -> f64 {
        let ticks = self.ticks(count);
        match ticks.as_slice() {
            [first, second, ..] => (second - first).abs(),
            _ => 1.0,
        }
    }
}

fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let scale = 10f64.powf(-power) / factor;
        i1 = (start * scale).round();
        i2 = (stop * scale).round();
        if i1 / scale < start {
            i1 += 1.0;
        }
        if i2 / scale > stop {
            i2 -= 1.0;
        }
        inc = -scale;
    } else {
        let scale = 10f64.powf(power) * factor;
        i1 = (start / scale).round();
        i2 = (stop / scale).round();
        if i1 * scale < start {
            i1 += 1.0;
        }
        if i2 * scale > stop {
            i2 -= 1.0;
        }
        inc = scale;
    }

    if i2 < i1 {
        if (0.5..2.0).contains(&count) {
            return tick_spec(start, stop, count * 2.0);
        }
        return None;
    }
    Some((i1 as i64, i2 as i64, inc))
}

/// A categorical mapping from country name to palette color.
///
/// The domain is fixed when the scale is built: countries are assigned
/// palette entries in first-seen order, cycling when there are more
/// countries than colors. Unknown keys never extend the domain.
#[derive(Debug, Clone)]
pub struct OrdinalScale {
    domain: Vec<String>,
    index: HashMap<String, usize>,
    palette: Vec<Color>,
}

impl OrdinalScale {
    pub fn new<'a>(domain: impl IntoIterator<Item = &'a str>, palette: &[Color]) -> Self {
        let mut keys = Vec::new();
        let mut index = HashMap::new();
        for key in domain {
            if !index.contains_key(key) {
                index.insert(key.to_string(), keys.len());
                keys.push(key.to_string());
            }
        }
        Self {
            domain: keys,
            index,
            palette: palette.to_vec(),
        }
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn color(&self, key: &str) -> Option<Color> {
        if self.palette.is_empty() {
            return None;
        }
        let i = *self.index.get(key)?;
        Some(self.palette[i % self.palette.len()])
    }

    /// Paint for `key`, falling back to the theme's unknown-series token.
    pub fn paint(&self, key: &str) -> Paint {
        self.color(key)
            .map_or(Paint::Token(ThemeToken::UnknownSeries), Paint::Color)
    }
}

/// The shared scales every scene draws through. Built once per session.
#[derive(Debug, Clone)]
pub struct ScaleRegistry {
    pub x: LinearScale,
    pub y: LinearScale,
    pub color: OrdinalScale,
}

impl ScaleRegistry {
    pub fn build(dataset: &Dataset, config: &StoryConfig) -> Self {
        let viewport = config.viewport();
        Self {
            x: LinearScale::new(config.x_domain, [0.0, viewport.plot_width()]),
            y: LinearScale::new(config.y_domain, [viewport.plot_height(), 0.0]),
            color: OrdinalScale::new(dataset.countries(), &TABLEAU10),
        }
    }

    /// Plot-space pixel position of a `(year, life expectancy)` pair.
    pub fn project(&self, year: f64, life_expectancy: f64) -> Point {
        Point::new(self.x.apply(year), self.y.apply(life_expectancy))
    }

    pub fn project_record(&self, record: &Record) -> Point {
        self.project(f64::from(record.year), record.life_expectancy)
    }
}
