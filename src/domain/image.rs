// ============================================================
// Layer 3 - Host Image Array
// ============================================================
// An 8-bit image in (height, width, channels) order, the shape
// produced by tensor-to-image conversion and consumed by the
// image writer.

/// Interleaved HWC pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArray {
    pub height:   usize,
    pub width:    usize,
    pub channels: usize,
    pub pixels:   Vec<u8>,
}

impl ImageArray {
    pub fn new(height: usize, width: usize, channels: usize, pixels: Vec<u8>) -> Self {
        Self { height, width, channels, pixels }
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.height, self.width, self.channels]
    }

    /// Pixel value at row `y`, column `x`, channel `c`.
    pub fn get(&self, y: usize, x: usize, c: usize) -> Option<u8> {
        if y >= self.height || x >= self.width || c >= self.channels {
            return None;
        }
        self.pixels
            .get((y * self.width + x) * self.channels + c)
            .copied()
    }
}
