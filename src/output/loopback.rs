use super::OutputSink;
use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Presents painted frames on a v4l2loopback device as YUYV
///
/// The painted size changes with the layout, so frames are letterboxed into the
/// device's fixed resolution.
pub struct LoopbackOutput {
    device: File,
    width: u32,
    height: u32,
    /// Reused YUYV frame buffer
    packed: Vec<u8>,
}

impl LoopbackOutput {
    pub fn open<P: AsRef<Path>>(device_path: P, width: u32, height: u32) -> Result<Self> {
        let path = device_path.as_ref();
        let device = OpenOptions::new()
            .write(true)
            .open(path)
            .with_context(|| format!("Cannot open loopback device {}", path.display()))?;
        tracing::info!("Presenting {}x{} YUYV frames on {}", width, height, path.display());

        Ok(Self {
            device,
            width,
            height,
            packed: Vec::with_capacity(width as usize * height as usize * 2),
        })
    }

    /// Centre `frame` on a black canvas of the device size, scaling it to fit
    fn letterbox(&self, frame: &RgbaImage) -> RgbaImage {
        let (frame_width, frame_height) = frame.dimensions();
        let mut canvas = RgbaImage::from_pixel(self.width, self.height, BLACK);
        if frame_width == 0 || frame_height == 0 {
            return canvas;
        }

        let scale = (self.width as f32 / frame_width as f32).min(self.height as f32 / frame_height as f32);
        let fit_width = ((frame_width as f32 * scale).round() as u32).clamp(1, self.width);
        let fit_height = ((frame_height as f32 * scale).round() as u32).clamp(1, self.height);
        let scaled = imageops::resize(frame, fit_width, fit_height, FilterType::Triangle);

        let x = i64::from((self.width - fit_width) / 2);
        let y = i64::from((self.height - fit_height) / 2);
        imageops::overlay(&mut canvas, &scaled, x, y);
        canvas
    }
}

/// Full-range BT.601 luma and chroma of one pixel, in 8-bit fixed point
fn ycbcr(pixel: &Rgba<u8>) -> (u8, i32, i32) {
    let [r, g, b, _] = pixel.0.map(i32::from);
    let y = (77 * r + 150 * g + 29 * b + 128) >> 8;
    let cb = ((-43 * r - 85 * g + 128 * b + 128) >> 8) + 128;
    let cr = ((128 * r - 107 * g - 21 * b + 128) >> 8) + 128;
    (y.clamp(0, 255) as u8, cb, cr)
}

/// Append `image` to `out` as packed YUYV 4:2:2
///
/// Each horizontal pixel pair shares the mean of its chroma; an odd final
/// pixel is paired with itself.
fn pack_yuyv(image: &RgbaImage, out: &mut Vec<u8>) {
    for mut row in image.rows() {
        while let Some(left) = row.next() {
            let right = row.next().unwrap_or(left);
            let (y0, cb0, cr0) = ycbcr(left);
            let (y1, cb1, cr1) = ycbcr(right);
            let cb = ((cb0 + cb1) / 2).clamp(0, 255) as u8;
            let cr = ((cr0 + cr1) / 2).clamp(0, 255) as u8;
            out.extend_from_slice(&[y0, cb, y1, cr]);
        }
    }
}

impl OutputSink for LoopbackOutput {
    fn write_frame(&mut self, frame: &RgbaImage) -> Result<()> {
        let boxed = self.letterbox(frame);
        self.packed.clear();
        pack_yuyv(&boxed, &mut self.packed);

        self.device
            .write_all(&self.packed)
            .context("Failed to write frame to loopback device")
    }
}
