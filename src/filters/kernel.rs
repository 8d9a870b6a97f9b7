//! 3x3 convolution kernels.

use image::RgbaImage;
use imageproc::filter::filter3x3;

/// A 3x3 integer kernel with a divisor.
///
/// Convolution goes through [`imageproc::filter::filter3x3`] with the
/// weights divided by the divisor: samples outside the image repeat the
/// nearest edge pixel and each channel is clamped to `[0, 255]` and
/// truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel {
    weights: [i32; 9],
    divisor: i32,
}

impl Kernel {
    /// Edge-sharpening kernel: centre 16, neighbours -1, divisor 8.
    pub const SHARPEN: Kernel = Kernel::new([-1, -1, -1, -1, 16, -1, -1, -1, -1], 8);

    /// One-pass Gaussian blur: `[1 2 1; 2 4 2; 1 2 1] / 16`.
    pub const GAUSSIAN: Kernel = Kernel::new([1, 2, 1, 2, 4, 2, 1, 2, 1], 16);

    /// Create a kernel from row-major weights.
    ///
    /// A zero divisor is treated as 1.
    pub const fn new(weights: [i32; 9], divisor: i32) -> Self {
        let divisor = if divisor == 0 { 1 } else { divisor };
        Self { weights, divisor }
    }

    pub fn divisor(&self) -> i32 {
        self.divisor
    }

    /// Row-major weights already divided by the divisor.
    pub fn normalized(&self) -> [f32; 9] {
        let divisor = self.divisor as f32;
        self.weights.map(|w| w as f32 / divisor)
    }

    /// Convolve every channel of `src` into a new image.
    pub fn convolve(&self, src: &RgbaImage) -> RgbaImage {
        let weights = self.normalized();
        filter3x3(src, &weights[..])
    }
}
