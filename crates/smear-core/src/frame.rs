use crate::types::Extent;
use crate::Color;

/// An RGBA8 pixel buffer (4 bytes per pixel, straight alpha).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Raw pixel data.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Create a new frame buffer filled with zeros (transparent black).
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize) * 4;
        Self {
            data: vec![0u8; size],
            width,
            height,
        }
    }

    /// Create a frame buffer filled with a solid color.
    pub fn solid(width: u32, height: u32, color: &Color) -> Self {
        let mut fb = Self::new(width, height);
        fb.clear(color);
        fb
    }

    pub fn extent(&self) -> Extent {
        Extent::new(self.width, self.height)
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Overwrite every pixel with `color`.
    pub fn clear(&mut self, color: &Color) {
        let pixel = color.to_rgba8();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&pixel);
        }
    }

    /// True when every pixel has zero alpha.
    pub fn is_transparent(&self) -> bool {
        self.data.chunks_exact(4).all(|p| p[3] == 0)
    }

    /// Get the RGBA value at a pixel coordinate. Returns None if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ])
    }

    /// Set the RGBA value at a pixel coordinate. No-op if out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data[offset..offset + 4].copy_from_slice(&rgba);
    }

    /// Overwrite an axis-aligned rectangle with `color`, clipped to the buffer.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: &Color) {
        let pixel = color.to_rgba8();
        let x0 = x.max(0) as i64;
        let y0 = y.max(0) as i64;
        let x1 = (x as i64 + width as i64).min(self.width as i64);
        let y1 = (y as i64 + height as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let stride = self.width as usize * 4;
        for row in y0..y1 {
            let start = row as usize * stride + x0 as usize * 4;
            let end = row as usize * stride + x1 as usize * 4;
            for chunk in self.data[start..end].chunks_exact_mut(4) {
                chunk.copy_from_slice(&pixel);
            }
        }
    }

    /// Alpha-composite `src` on top of `self` at position (dx, dy).
    pub fn composite_over(&mut self, src: &FrameBuffer, dx: i32, dy: i32) {
        self.composite_over_tinted(src, dx, dy, &Color::WHITE);
    }

    /// Alpha-composite `src`, modulated by `tint`, on top of `self` at (dx, dy).
    ///
    /// Each source channel is multiplied by the matching tint channel before
    /// the "over" blend, so a white tint with alpha `a` draws `src` at opacity `a`.
    pub fn composite_over_tinted(&mut self, src: &FrameBuffer, dx: i32, dy: i32, tint: &Color) {
        let [tr, tg, tb, ta] = tint.to_rgba8().map(u32::from);
        if ta == 0 {
            return;
        }

        let dst_width = self.width as i32;
        let dst_height = self.height as i32;

        let mut start_y = 0;
        let mut end_y = src.height as i32;
        let mut start_x = 0;
        let mut end_x = src.width as i32;

        if dy < 0 { start_y = -dy; }
        if dy + end_y > dst_height { end_y = dst_height - dy; }
        if dx < 0 { start_x = -dx; }
        if dx + end_x > dst_width { end_x = dst_width - dx; }

        if start_x >= end_x || start_y >= end_y {
            return;
        }

        let src_stride = (src.width * 4) as usize;
        let dst_stride = (self.width * 4) as usize;

        for sy in start_y..end_y {
            let dst_y = dy + sy;
            let src_row_start = (sy as usize * src_stride) + (start_x as usize * 4);
            let dst_row_start = (dst_y as usize * dst_stride) + ((dx + start_x) as usize * 4);
            let len = (end_x - start_x) as usize * 4;

            let src_slice = &src.data[src_row_start..src_row_start + len];
            let dst_slice = &mut self.data[dst_row_start..dst_row_start + len];

            for (s, d) in src_slice.chunks_exact(4).zip(dst_slice.chunks_exact_mut(4)) {
                let sa = s[3] as u32 * ta / 255;
                if sa == 0 {
                    continue;
                }
                let s_r = s[0] as u32 * tr / 255;
                let s_g = s[1] as u32 * tg / 255;
                let s_b = s[2] as u32 * tb / 255;

                if sa == 255 {
                    d.copy_from_slice(&[s_r as u8, s_g as u8, s_b as u8, 255]);
                    continue;
                }

                let da = d[3] as u32;
                let inv_sa = 255 - sa;
                let out_a = sa + ((da * inv_sa) / 255);

                if out_a == 0 { continue; }

                let d_r = d[0] as u32;
                let d_g = d[1] as u32;
                let d_b = d[2] as u32;

                let out_r = (s_r * sa * 255 + d_r * da * inv_sa) / (out_a * 255);
                let out_g = (s_g * sa * 255 + d_g * da * inv_sa) / (out_a * 255);
                let out_b = (s_b * sa * 255 + d_b * da * inv_sa) / (out_a * 255);

                d[0] = out_r as u8;
                d[1] = out_g as u8;
                d[2] = out_b as u8;
                d[3] = out_a as u8;
            }
        }
    }
}
