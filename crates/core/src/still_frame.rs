//! Still frames of animated images, shown until the pointer hovers a tile.

/// True for urls that name a GIF. Inline `data:` uris never count.
pub fn is_gif_url(src: &str) -> bool {
    let src = src.trim_start();
    !src.starts_with("data:") && src.to_ascii_lowercase().contains(".gif")
}

#[cfg(feature = "still-frame")]
pub use decode::{first_frame_png, FrameError};

#[cfg(feature = "still-frame")]
mod decode {
    use image::codecs::gif::GifDecoder;
    use image::{AnimationDecoder, DynamicImage, ImageOutputFormat};
    use std::io::Cursor;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum FrameError {
        #[error("gif has no frames")]
        Empty,
        #[error(transparent)]
        Image(#[from] image::ImageError),
    }

    /// Decodes the first frame of a GIF and re-encodes it as PNG.
    pub fn first_frame_png(gif: &[u8]) -> Result<Vec<u8>, FrameError> {
        let decoder = GifDecoder::new(Cursor::new(gif))?;
        let frame = decoder.into_frames().next().ok_or(FrameError::Empty)??;
        let still = DynamicImage::ImageRgba8(frame.into_buffer());
        let mut png = Cursor::new(Vec::new());
        still.write_to(&mut png, ImageOutputFormat::Png)?;
        Ok(png.into_inner())
    }

}
