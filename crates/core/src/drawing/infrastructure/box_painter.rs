use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::drawing::domain::frame_painter::FramePainter;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

static CAPTION_FONT: &[u8] = include_bytes!("../../../assets/DejaVuSans.ttf");

pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);

pub const DEFAULT_THICKNESS: u32 = 2;
pub const DEFAULT_CAPTION_PX: f32 = 16.0;

/// Gap between a caption's baseline box and the rectangle's top edge.
const CAPTION_GAP: i32 = 2;

/// Draws hollow rectangles and captions with `imageproc`.
pub struct BoxPainter {
    color: Rgb<u8>,
    thickness: u32,
    scale: PxScale,
    font: FontRef<'static>,
}

impl BoxPainter {
    pub fn new(color: Rgb<u8>) -> Result<Self, ab_glyph::InvalidFont> {
        Self::with_style(color, DEFAULT_THICKNESS, DEFAULT_CAPTION_PX)
    }

    pub fn with_style(
        color: Rgb<u8>,
        thickness: u32,
        caption_px: f32,
    ) -> Result<Self, ab_glyph::InvalidFont> {
        Ok(Self {
            color,
            thickness: thickness.max(1),
            scale: PxScale::from(caption_px),
            font: FontRef::try_from_slice(CAPTION_FONT)?,
        })
    }

    fn draw_box(&self, img: &mut RgbImage, det: &Detection) {
        let x = det.x1.round() as i32;
        let y = det.y1.round() as i32;
        let w = det.width().round() as i64;
        let h = det.height().round() as i64;

        // Concentric 1px outlines, shrinking inwards
        for inset in 0..self.thickness as i64 {
            let iw = w - 2 * inset;
            let ih = h - 2 * inset;
            if iw < 1 || ih < 1 {
                break;
            }
            let rect = Rect::at(x + inset as i32, y + inset as i32).of_size(iw as u32, ih as u32);
            draw_hollow_rect_mut(img, rect, self.color);
        }
    }

    fn draw_caption(&self, img: &mut RgbImage, det: &Detection, text: &str) {
        let (_, text_h) = text_size(self.scale, &self.font, text);
        let x = det.x1.round() as i32;
        let y = (det.y1.round() as i32 - text_h as i32 - CAPTION_GAP).max(0);
        draw_text_mut(img, self.color, x, y, self.scale, &self.font, text);
    }
}

impl FramePainter for BoxPainter {
    fn paint(&self, frame: &mut Frame, detections: &[Detection]) {
        if detections.is_empty() {
            return;
        }
        let painted = frame.edit_as_image(|img| {
            for det in detections {
                self.draw_box(img, det);
                if let Some(text) = det.caption() {
                    self.draw_caption(img, det, &text);
                }
            }
        });
        if !painted {
            log::warn!("Frame {} is not RGB, left unpainted", frame.index());
        }
    }
}
