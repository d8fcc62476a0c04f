use crate::ImageSize;

/// Placement of a video frame letterboxed into a canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportFit {
    /// Display-to-image scale; the `ratio` of the projection pipeline.
    pub ratio: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ViewportFit {
    /// Largest uniform scale that fits `image` inside `canvas`, centred.
    ///
    /// Returns `None` for an empty image.
    pub fn contain(canvas: ImageSize, image: ImageSize) -> Option<Self> {
        if image.is_empty() {
            return None;
        }
        let (cw, ch) = (canvas.width as f64, canvas.height as f64);
        let (iw, ih) = (image.width as f64, image.height as f64);
        let ratio = (cw / iw).min(ch / ih);
        Some(Self {
            ratio,
            offset_x: (cw - iw * ratio) / 2.0,
            offset_y: (ch - ih * ratio) / 2.0,
        })
    }
}
