/// Dirty rectangle in display coordinates, all edges inclusive.
///
/// Coordinates are signed: the rendering library may hand over rectangles
/// that start above/left of the screen, and they must clip rather than error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Area {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width in pixels (inclusive coordinates).
    pub fn width(&self) -> i32 {
        self.x2 - self.x1 + 1
    }

    /// Height in pixels (inclusive coordinates).
    pub fn height(&self) -> i32 {
        self.y2 - self.y1 + 1
    }

    /// True if no part of the area overlaps a `hres x vres` screen.
    pub fn outside(&self, hres: u32, vres: u32) -> bool {
        self.x2 < 0 || self.y2 < 0 || self.x1 > hres as i32 - 1 || self.y1 > vres as i32 - 1
    }
}

/// Per-flush description of the logical display, supplied by the rendering
/// library alongside the pixel data.
#[derive(Debug, Clone, Copy)]
pub struct DisplayDescriptor {
    pub hor_res: u32,
    pub ver_res: u32,
    /// Display content is rotated 90 degrees; bounds checks swap the axes.
    pub rotated: bool,
}

impl DisplayDescriptor {
    pub fn new(hor_res: u32, ver_res: u32) -> Self {
        Self {
            hor_res,
            ver_res,
            rotated: false,
        }
    }

    /// Effective resolution with rotation applied: (hres, vres).
    pub fn effective_res(&self) -> (u32, u32) {
        if self.rotated {
            (self.ver_res, self.hor_res)
        } else {
            (self.hor_res, self.ver_res)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_height_inclusive() {
        let a = Area::new(10, 10, 20, 20);
        assert_eq!(a.width(), 11);
        assert_eq!(a.height(), 11);

        let single = Area::new(5, 7, 5, 7);
        assert_eq!(single.width(), 1);
        assert_eq!(single.height(), 1);
    }

    #[test]
    fn test_outside_fully_off_screen() {
        // Entirely left / above
        assert!(Area::new(-20, 0, -1, 10).outside(320, 240));
        assert!(Area::new(0, -20, 10, -1).outside(320, 240));
        // Entirely right / below
        assert!(Area::new(320, 0, 330, 10).outside(320, 240));
        assert!(Area::new(0, 240, 10, 250).outside(320, 240));
    }

    #[test]
    fn test_outside_partial_overlap_is_inside() {
        // Straddles the left edge
        assert!(!Area::new(-5, 0, 5, 10).outside(320, 240));
        // Straddles the bottom edge
        assert!(!Area::new(0, 230, 10, 250).outside(320, 240));
        // Touches the last valid pixel
        assert!(!Area::new(319, 239, 400, 400).outside(320, 240));
    }

    #[test]
    fn test_effective_res_rotation() {
        let desc = DisplayDescriptor::new(320, 240);
        assert_eq!(desc.effective_res(), (320, 240));

        let rotated = DisplayDescriptor {
            rotated: true,
            ..desc
        };
        assert_eq!(rotated.effective_res(), (240, 320));
    }
}
