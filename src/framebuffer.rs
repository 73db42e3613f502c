use std::sync::{Arc, Mutex};

use crate::area::Area;

/// Neutral gray the owned framebuffer starts out with, so a window shows
/// something sane before the first flush arrives.
pub const INITIAL_FILL: u32 = 0x4444_4444;

/// A whole frame handed over by the rendering library in shared mode.
/// The `Arc` keeps the pixels alive until the presentation loop has
/// uploaded them, however late that happens.
pub type FrameRef = Arc<[u32]>;

/// Pixel data accompanying a flush.
pub enum FlushSource<'a> {
    /// Row-major pixels covering exactly the dirty rectangle; copied into
    /// the owned store.
    Borrowed(&'a [u32]),
    /// A complete frame at display resolution; installed by reference
    /// (last write wins).
    Shared(FrameRef),
}

/// Per-monitor pixel storage.
///
/// `Owned` is the single-buffered path: flushes copy dirty rows into a fixed
/// buffer. `Shared` is the double-buffered path: flushes install a reference
/// to the caller's frame and the presentation loop uploads whichever frame
/// was installed last.
pub enum FrameStore {
    Owned {
        pixels: Mutex<Vec<u32>>,
        width: u32,
        height: u32,
    },
    Shared {
        slot: Mutex<Option<FrameRef>>,
        width: u32,
        height: u32,
    },
}

impl FrameStore {
    pub fn owned(width: u32, height: u32) -> Self {
        let pixels = vec![INITIAL_FILL; (width * height) as usize];
        Self::Owned {
            pixels: Mutex::new(pixels),
            width,
            height,
        }
    }

    pub fn shared(width: u32, height: u32) -> Self {
        Self::Shared {
            slot: Mutex::new(None),
            width,
            height,
        }
    }

    /// Store dimensions (logical display resolution).
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Owned { width, height, .. } => (*width, *height),
            Self::Shared { width, height, .. } => (*width, *height),
        }
    }

    /// Apply a flush to the store. The area has already been checked for
    /// full off-screen rejection; rows and columns that still fall outside
    /// the store are clipped here, never written.
    pub fn apply(&self, area: Area, source: FlushSource<'_>) {
        match self {
            Self::Owned {
                pixels,
                width,
                height,
            } => {
                let mut fb = pixels.lock().expect("framebuffer lock poisoned");
                match source {
                    FlushSource::Borrowed(px) => {
                        blit(&mut fb, *width, *height, area, px);
                    }
                    FlushSource::Shared(frame) => {
                        blit(&mut fb, *width, *height, area, &frame);
                    }
                }
            }
            Self::Shared { slot, .. } => {
                let frame = match source {
                    FlushSource::Shared(frame) => frame,
                    FlushSource::Borrowed(px) => {
                        // Shared mode expects whole frames by reference; a
                        // borrowed flush still works but costs a copy.
                        log::trace!("borrowed flush into shared store, copying frame");
                        Arc::from(px)
                    }
                };
                *slot.lock().expect("frame slot lock poisoned") = Some(frame);
            }
        }
    }

    /// Snapshot the current frame contents as a byte view suitable for
    /// texture upload. Returns `None` for a shared store that has not seen
    /// a flush yet.
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        match self {
            Self::Owned { pixels, .. } => {
                let fb = pixels.lock().expect("framebuffer lock poisoned");
                Some(bytemuck::cast_slice(&fb).to_vec())
            }
            Self::Shared { slot, .. } => {
                let frame = slot.lock().expect("frame slot lock poisoned").clone()?;
                Some(bytemuck::cast_slice(&frame).to_vec())
            }
        }
    }

    /// Current pixel value at (x, y), for inspection in tests and the
    /// shared-store initial-state check. `None` if no frame is installed
    /// or the coordinate is out of range.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        let (width, height) = self.dimensions();
        if x >= width || y >= height {
            return None;
        }
        let idx = (y * width + x) as usize;
        match self {
            Self::Owned { pixels, .. } => {
                Some(pixels.lock().expect("framebuffer lock poisoned")[idx])
            }
            Self::Shared { slot, .. } => slot
                .lock()
                .expect("frame slot lock poisoned")
                .as_ref()
                .map(|f| f[idx]),
        }
    }
}

/// Copy dirty-rectangle rows into a `width x height` framebuffer, clipping
/// both axes. `src` is row-major and covers exactly `area`.
fn blit(fb: &mut [u32], width: u32, height: u32, area: Area, src: &[u32]) {
    let src_stride = area.width() as usize;

    let y_start = area.y1.max(0);
    let y_end = area.y2.min(height as i32 - 1);
    let x_start = area.x1.max(0);
    let x_end = area.x2.min(width as i32 - 1);
    if y_start > y_end || x_start > x_end {
        return;
    }

    let copy_w = (x_end - x_start + 1) as usize;
    // Offset into the source row when the area starts left of the screen.
    let src_x_off = (x_start - area.x1) as usize;

    for y in y_start..=y_end {
        let src_row = (y - area.y1) as usize * src_stride + src_x_off;
        let dst_row = y as usize * width as usize + x_start as usize;
        let src_end = src_row + copy_w;
        if src_end > src.len() {
            // Source shorter than the area it claims to cover; drop the rest.
            log::warn!("flush source truncated at row {}", y);
            return;
        }
        fb[dst_row..dst_row + copy_w].copy_from_slice(&src[src_row..src_end]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(area: Area, color: u32) -> Vec<u32> {
        vec![color; (area.width() * area.height()) as usize]
    }

    #[test]
    fn test_owned_starts_with_neutral_fill() {
        let store = FrameStore::owned(320, 240);
        assert_eq!(store.pixel(0, 0), Some(INITIAL_FILL));
        assert_eq!(store.pixel(319, 239), Some(INITIAL_FILL));
    }

    #[test]
    fn test_owned_blit_in_bounds() {
        let store = FrameStore::owned(320, 240);
        let area = Area::new(10, 10, 20, 20);
        store.apply(area, FlushSource::Borrowed(&filled(area, 0xFF00_00FF)));

        for y in 10..=20 {
            for x in 10..=20 {
                assert_eq!(store.pixel(x, y), Some(0xFF00_00FF));
            }
        }
        // Untouched neighbors
        assert_eq!(store.pixel(0, 0), Some(INITIAL_FILL));
        assert_eq!(store.pixel(9, 10), Some(INITIAL_FILL));
        assert_eq!(store.pixel(21, 20), Some(INITIAL_FILL));
        assert_eq!(store.pixel(10, 21), Some(INITIAL_FILL));
    }

    #[test]
    fn test_owned_blit_clips_bottom_and_right() {
        let store = FrameStore::owned(100, 100);
        let area = Area::new(95, 95, 104, 104);
        store.apply(area, FlushSource::Borrowed(&filled(area, 0xFFAB_CDEF)));

        assert_eq!(store.pixel(95, 95), Some(0xFFAB_CDEF));
        assert_eq!(store.pixel(99, 99), Some(0xFFAB_CDEF));
        // Nothing past the edge exists to check, but the row before the
        // clipped region must be intact.
        assert_eq!(store.pixel(94, 99), Some(INITIAL_FILL));
    }

    #[test]
    fn test_owned_blit_clips_negative_origin() {
        let store = FrameStore::owned(100, 100);
        let area = Area::new(-5, -5, 4, 4);
        // Distinct values so we can verify which source pixels landed where.
        let src: Vec<u32> = (0..(area.width() * area.height()) as u32).collect();
        store.apply(area, FlushSource::Borrowed(&src));

        // Source row 5, column 5 is the first in-bounds pixel -> dst (0,0).
        assert_eq!(store.pixel(0, 0), Some(5 * 10 + 5));
        assert_eq!(store.pixel(4, 4), Some(9 * 10 + 9));
        assert_eq!(store.pixel(5, 5), Some(INITIAL_FILL));
    }

    #[test]
    fn test_owned_blit_truncated_source_stops_short() {
        let store = FrameStore::owned(100, 100);
        let area = Area::new(0, 0, 9, 9);
        // Only 5 complete rows of data.
        let src = vec![0xDEAD_BEEF_u32; 50];
        store.apply(area, FlushSource::Borrowed(&src));

        assert_eq!(store.pixel(0, 4), Some(0xDEAD_BEEF));
        assert_eq!(store.pixel(0, 5), Some(INITIAL_FILL));
    }

    #[test]
    fn test_shared_starts_empty() {
        let store = FrameStore::shared(320, 240);
        assert!(store.snapshot().is_none());
        assert_eq!(store.pixel(0, 0), None);
    }

    #[test]
    fn test_shared_last_write_wins() {
        let store = FrameStore::shared(4, 4);
        let first: FrameRef = Arc::from(vec![0x1111_1111_u32; 16].as_slice());
        let second: FrameRef = Arc::from(vec![0x2222_2222_u32; 16].as_slice());
        let area = Area::new(0, 0, 3, 3);

        store.apply(area, FlushSource::Shared(first));
        store.apply(area, FlushSource::Shared(second));

        assert_eq!(store.pixel(0, 0), Some(0x2222_2222));
        let bytes = store.snapshot().unwrap();
        assert_eq!(bytes.len(), 16 * 4);
        assert_eq!(&bytes[0..4], &[0x22, 0x22, 0x22, 0x22]);
    }

    #[test]
    fn test_shared_accepts_borrowed_by_copy() {
        let store = FrameStore::shared(2, 2);
        let frame = [1u32, 2, 3, 4];
        store.apply(Area::new(0, 0, 1, 1), FlushSource::Borrowed(&frame));
        assert_eq!(store.pixel(1, 1), Some(4));
    }

    #[test]
    fn test_snapshot_byte_order_little_endian() {
        let store = FrameStore::owned(1, 1);
        let area = Area::new(0, 0, 0, 0);
        store.apply(area, FlushSource::Borrowed(&[0xAABB_CCDD]));
        // Packed ARGB in a u32 lands as DD CC BB AA in memory, which is what
        // the Bgra8Unorm texture expects.
        assert_eq!(store.snapshot().unwrap(), vec![0xDD, 0xCC, 0xBB, 0xAA]);
    }
}
