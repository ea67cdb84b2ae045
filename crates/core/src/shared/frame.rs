use ndarray::ArrayView3;

/// A single video/image frame: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; annotators and the
/// painter see the same packed RGB24 layout.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// Wraps a decoded RGB image as frame `index`.
    pub fn from_rgb_image(image: image::RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, 3, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Lends the pixel buffer to `f` as an [`image::RgbImage`] without copying.
    ///
    /// Returns false (and leaves the frame untouched) when the frame is not RGB.
    pub fn edit_as_image<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut image::RgbImage),
    {
        let expected = self.width as usize * self.height as usize * 3;
        if self.channels != 3 || self.data.len() != expected {
            return false;
        }
        let data = std::mem::take(&mut self.data);
        match image::RgbImage::from_raw(self.width, self.height, data) {
            Some(mut img) => {
                f(&mut img);
                self.data = img.into_raw();
                true
            }
            None => false,
        }
    }

    /// Copies the box `(x1, y1, x2, y2)` clamped to the frame bounds.
    ///
    /// Returns `None` when the clamped box is empty.
    pub fn crop(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Option<Frame> {
        let fw = self.width as f64;
        let fh = self.height as f64;
        let left = x1.max(0.0).min(fw) as usize;
        let top = y1.max(0.0).min(fh) as usize;
        let right = x2.max(0.0).min(fw) as usize;
        let bottom = y2.max(0.0).min(fh) as usize;
        if right <= left || bottom <= top {
            return None;
        }

        let channels = self.channels as usize;
        let stride = self.width as usize * channels;
        let row_len = (right - left) * channels;
        let mut data = Vec::with_capacity(row_len * (bottom - top));
        for row in top..bottom {
            let start = row * stride + left * channels;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }
        Some(Frame::new(
            data,
            (right - left) as u32,
            (bottom - top) as u32,
            self.channels,
            self.index,
        ))
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
