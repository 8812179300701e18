//! RGBA8 to YUV 4:2:0 semi-planar conversion.
//!
//! Output layout is a full-resolution Y plane followed by an interleaved
//! V,U plane subsampled 2x2 (NV21 ordering), using the BT.601 integer
//! coefficients expected by the headset encoder.

use crate::types::RGBA_BYTES_PER_PIXEL;

/// Length of the interleaved VU plane for a `width` x `height` frame.
pub fn chroma_plane_len(width: u32, height: u32) -> usize {
    let half_w = (width as usize).div_ceil(2);
    let half_h = (height as usize).div_ceil(2);
    half_w * half_h * 2
}

/// Total length of a YUV420SP buffer (Y plane + VU plane).
pub fn yuv420sp_len(width: u32, height: u32) -> usize {
    width as usize * height as usize + chroma_plane_len(width, height)
}

#[inline]
fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Converts one pixel to (Y, U, V), each clamped into `0..=255`.
#[inline]
pub fn rgb_to_yuv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (r, g, b) = (r as i32, g as i32, b as i32);

    let y = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
    let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;

    (clamp_u8(y), clamp_u8(u), clamp_u8(v))
}

/// Converts a captured frame into `out`.
///
/// Captured surfaces store channels as B, G, R, A, so byte 0 of every pixel is
/// read as blue and byte 2 as red. A V,U pair is emitted for every pixel whose
/// row and column are both even.
///
/// # Panics
///
/// Panics if `rgba` is shorter than `width * height * 4` bytes or `out` is
/// shorter than [`yuv420sp_len`].
pub fn rgba_to_yuv420sp(rgba: &[u8], width: u32, height: u32, out: &mut [u8]) {
    let w = width as usize;
    let h = height as usize;
    let row_bytes = w * RGBA_BYTES_PER_PIXEL;

    assert!(rgba.len() >= row_bytes * h, "RGBA buffer too small");
    assert!(out.len() >= yuv420sp_len(width, height), "YUV buffer too small");

    let (y_plane, vu_plane) = out.split_at_mut(w * h);
    let mut y_index = 0;
    let mut vu_index = 0;

    for (row_index, row) in rgba.chunks_exact(row_bytes).take(h).enumerate() {
        let chroma_row = row_index % 2 == 0;

        for (col_index, pixel) in row.chunks_exact(RGBA_BYTES_PER_PIXEL).enumerate() {
            let b = pixel[0];
            let g = pixel[1];
            let r = pixel[2];

            let (y, u, v) = rgb_to_yuv(r, g, b);
            y_plane[y_index] = y;
            y_index += 1;

            if chroma_row && col_index % 2 == 0 {
                vu_plane[vu_index] = v;
                vu_plane[vu_index + 1] = u;
                vu_index += 2;
            }
        }
    }
}
