//! Turns a free-hand drawing of a digit into the 28×28 feature vector the network is trained on.
//!
//! The drawing is a grayscale canvas with dark ink on a white background. The ink's bounding box
//! is scaled to fit a 20×20 box and centered on a white 28×28 image, brightness `b` then maps to
//! the feature `min(1, (255 - b) / 255)`.

use ndarray::{Array1, Array2, ArrayView2};

use crate::{MlErr, Result};

/// The side of the produced image.
pub const SIDE: usize = 28;

/// The side of the box the digit is scaled into.
pub const DIGIT_BOX: usize = 20;

/// Pixels added around the ink's bounding box before scaling.
pub const PADDING: usize = 2;

const WHITE: f64 = 255.;
const INK_THRESHOLD: f64 = 0.5 * WHITE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl Bounds {
    fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }
}

/// A grayscale drawing, `pixels[[y, x]]` holds the brightness in `[0, 255]`.
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: Array2<f64>,
}

impl Canvas {
    /// Creates a new `Canvas`.
    ///
    /// # Errors
    /// `MlErr::InvalidHyperparameter` if the canvas is empty or a brightness is outside
    /// `[0, 255]`.
    pub fn new(pixels: Array2<f64>) -> Result<Self> {
        if pixels.is_empty() {
            return Err(MlErr::InvalidHyperparameter {
                name: "canvas",
                reason: "must have at least one pixel".into(),
            });
        }

        if let Some(b) = pixels.iter().find(|b| !(0. ..=WHITE).contains(*b)) {
            return Err(MlErr::InvalidHyperparameter {
                name: "canvas",
                reason: format!("brightness {b} is outside of [0, 255]"),
            });
        }

        Ok(Self { pixels })
    }

    /// Builds a canvas from rows of brightness values.
    ///
    /// # Errors
    /// If the rows have different lengths or the values are not valid brightnesses.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);

        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            return Err(MlErr::SizeMismatch {
                what: "canvas row",
                got: row.len(),
                expected: width,
            });
        }

        let pixels = Array2::from_shape_vec((height, width), rows.into_iter().flatten().collect())
            .map_err(|_| MlErr::SizeMismatch {
                what: "canvas",
                got: height,
                expected: height,
            })?;

        Self::new(pixels)
    }

    pub fn pixels(&self) -> ArrayView2<'_, f64> {
        self.pixels.view()
    }

    /// Converts the drawing into a `SIDE * SIDE` feature vector, row by row. A canvas without
    /// ink yields all zeros.
    pub fn to_features(&self) -> Array1<f64> {
        let Some(bounds) = self.ink_bounds() else {
            return Array1::zeros(SIDE * SIDE);
        };

        let bounds = self.pad(bounds);
        let normalized = self.center(bounds);

        normalized
            .mapv(|b| ((WHITE - b) / WHITE).min(1.))
            .into_shape_with_order(SIDE * SIDE)
            .unwrap_or_else(|_| Array1::zeros(SIDE * SIDE))
    }

    fn ink_bounds(&self) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;

        for ((y, x), &b) in self.pixels.indexed_iter() {
            if b >= INK_THRESHOLD {
                continue;
            }

            let bounds = bounds.get_or_insert(Bounds {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            });

            bounds.min_x = bounds.min_x.min(x);
            bounds.min_y = bounds.min_y.min(y);
            bounds.max_x = bounds.max_x.max(x);
            bounds.max_y = bounds.max_y.max(y);
        }

        bounds
    }

    fn pad(&self, bounds: Bounds) -> Bounds {
        let (height, width) = self.pixels.dim();

        Bounds {
            min_x: bounds.min_x.saturating_sub(PADDING),
            min_y: bounds.min_y.saturating_sub(PADDING),
            max_x: (bounds.max_x + PADDING).min(width - 1),
            max_y: (bounds.max_y + PADDING).min(height - 1),
        }
    }

    /// Scales the region inside `bounds` to fit `DIGIT_BOX`, keeping its aspect ratio, and draws
    /// it in the middle of a white `SIDE×SIDE` image.
    fn center(&self, bounds: Bounds) -> Array2<f64> {
        let (w, h) = (bounds.width() as f64, bounds.height() as f64);
        let box_side = DIGIT_BOX as f64;

        let scale = (box_side / w).min(box_side / h);
        let scaled_w = ((w * scale).floor() as usize).max(1);
        let scaled_h = ((h * scale).floor() as usize).max(1);

        let offset_x = (SIDE - scaled_w) / 2;
        let offset_y = (SIDE - scaled_h) / 2;

        let mut image = Array2::from_elem((SIDE, SIDE), WHITE);
        for ty in 0..scaled_h {
            for tx in 0..scaled_w {
                // sample at the center of the target pixel
                let sx = bounds.min_x as f64 + (tx as f64 + 0.5) * w / scaled_w as f64 - 0.5;
                let sy = bounds.min_y as f64 + (ty as f64 + 0.5) * h / scaled_h as f64 - 0.5;
                image[[offset_y + ty, offset_x + tx]] = self.bilinear(sx, sy, bounds);
            }
        }

        image
    }

    fn bilinear(&self, x: f64, y: f64, bounds: Bounds) -> f64 {
        let x = x.clamp(bounds.min_x as f64, bounds.max_x as f64);
        let y = y.clamp(bounds.min_y as f64, bounds.max_y as f64);

        let (x0, y0) = (x.floor() as usize, y.floor() as usize);
        let (x1, y1) = ((x0 + 1).min(bounds.max_x), (y0 + 1).min(bounds.max_y));
        let (fx, fy) = (x - x0 as f64, y - y0 as f64);

        let p = &self.pixels;
        let top = p[[y0, x0]] * (1. - fx) + p[[y0, x1]] * fx;
        let bottom = p[[y1, x0]] * (1. - fx) + p[[y1, x1]] * fx;
        top * (1. - fy) + bottom * fy
    }
}
