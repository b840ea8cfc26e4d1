//! Pre-defined page sizes for common paper formats.
//!
//! All sizes are provided in portrait orientation (width, height); use
//! [PageOrientation] to flip between portrait and landscape.

use crate::units::*;

/// Page dimensions as (width, height) in points.
pub type PageSize = (Pt, Pt);

// north american sizes
pub const LETTER: PageSize = (Pt(8.5 * 72.0), Pt(11.0 * 72.0));
pub const HALF_LETTER: PageSize = (Pt(5.5 * 72.0), Pt(8.5 * 72.0));
pub const LEGAL: PageSize = (Pt(8.5 * 72.0), Pt(13.0 * 72.0));
pub const TABLOID: PageSize = (Pt(11.0 * 72.0), Pt(17.0 * 72.0));

// iso a-series (converted from mm to points)
pub const A3: PageSize = (Pt(297.0 * 72.0 / 25.4), Pt(420.0 * 72.0 / 25.4));
pub const A4: PageSize = (Pt(210.0 * 72.0 / 25.4), Pt(297.0 * 72.0 / 25.4));
pub const A5: PageSize = (Pt(148.0 * 72.0 / 25.4), Pt(210.0 * 72.0 / 25.4));

/// Convert page sizes between portrait and landscape orientations.
pub trait PageOrientation {
    /// Returns the size in portrait orientation (width ≤ height).
    fn portrait(self) -> Self;
    /// Returns the size in landscape orientation (width ≥ height).
    fn landscape(self) -> Self;
}

impl PageOrientation for PageSize {
    fn portrait(self) -> Self {
        if self.0 <= self.1 {
            self
        } else {
            (self.1, self.0)
        }
    }

    fn landscape(self) -> PageSize {
        if self.0 >= self.1 {
            self
        } else {
            (self.1, self.0)
        }
    }
}
