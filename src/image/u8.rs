//! 8-bit grayscale rasters: a borrowed strided view and an owned buffer.
//!
//! `ImageU8` is how every stage sees a page or a sub-region of it. Cropping a
//! view is zero-copy: the sub-view keeps the parent's stride and points into
//! the same backing slice.
use super::traits::{ImageView, ImageViewMut};

#[derive(Clone, Copy, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    /// Zero-copy view of the half-open rectangle `[x0, x1) × [y0, y1)`.
    ///
    /// Bounds are clamped to the view, so an out-of-range request yields a
    /// smaller (possibly empty) view instead of panicking.
    pub fn sub_view(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> ImageU8<'a> {
        let x1 = x1.min(self.w);
        let y1 = y1.min(self.h);
        let x0 = x0.min(x1);
        let y0 = y0.min(y1);
        let w = x1 - x0;
        let h = y1 - y0;
        if w == 0 || h == 0 {
            return ImageU8 {
                w,
                h,
                stride: self.stride,
                data: &self.data[..0],
            };
        }
        let start = y0 * self.stride + x0;
        let end = (y1 - 1) * self.stride + x1;
        ImageU8 {
            w,
            h,
            stride: self.stride,
            data: &self.data[start..end],
        }
    }

    /// Rows `[y0, y1)` at full width.
    pub fn rows_between(&self, y0: usize, y1: usize) -> ImageU8<'a> {
        self.sub_view(0, y0, self.w, y1)
    }

    /// Copy the view into a tightly packed owned buffer.
    pub fn to_owned_image(&self) -> GrayImageU8 {
        let mut data = Vec::with_capacity(self.w * self.h);
        for row in self.rows() {
            data.extend_from_slice(row);
        }
        GrayImageU8::new(self.w, self.h, data)
    }
}

impl<'a> ImageView for ImageU8<'a> {
    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        if self.w == 0 {
            return &[];
        }
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

/// Owned 8-bit grayscale buffer (stride == width) with borrowed view conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImageU8 {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayImageU8 {
    /// Construct an owned grayscale buffer given raw row-major bytes.
    ///
    /// `data` is resized to `width * height`, padding with zeros if short.
    pub fn new(width: usize, height: usize, mut data: Vec<u8>) -> Self {
        data.resize(width * height, 0);
        Self {
            width,
            height,
            data,
        }
    }

    /// Buffer of `width × height` pixels all set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self::new(width, height, vec![value; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        self.data[y * self.width + x] = v;
    }

    /// Borrow as a read-only `ImageU8` view
    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8 {
            w: self.width,
            h: self.height,
            stride: self.width,
            data: &self.data,
        }
    }
}

impl ImageView for GrayImageU8 {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }
    #[inline]
    fn height(&self) -> usize {
        self.height
    }
    #[inline]
    fn stride(&self) -> usize {
        self.width
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }
}

impl ImageViewMut for GrayImageU8 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.width;
        &mut self.data[start..start + self.width]
    }
}
