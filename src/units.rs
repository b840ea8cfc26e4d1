use derive_more::{Add, AddAssign, Display, From, Into, Sub, SubAssign, Sum};

/// A distance in PDF points (1/72 of an inch). All layout maths in the crate
/// is carried out in points.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    AddAssign,
    Sub,
    SubAssign,
    Sum,
    Display,
    From,
    Into,
)]
pub struct Pt(pub f32);

impl Pt {
    /// The magnitude of the distance. Mostly used for descenders, which fonts
    /// report as negative values.
    pub fn abs(self) -> Pt {
        Pt(self.0.abs())
    }

    pub fn max(self, other: Pt) -> Pt {
        Pt(self.0.max(other.0))
    }

    pub fn min(self, other: Pt) -> Pt {
        Pt(self.0.min(other.0))
    }
}

impl std::ops::Mul<f32> for Pt {
    type Output = Pt;
    fn mul(self, rhs: f32) -> Pt {
        Pt(self.0 * rhs)
    }
}

impl std::ops::Mul<Pt> for f32 {
    type Output = Pt;
    fn mul(self, rhs: Pt) -> Pt {
        Pt(self * rhs.0)
    }
}

impl std::ops::Div<f32> for Pt {
    type Output = Pt;
    fn div(self, rhs: f32) -> Pt {
        Pt(self.0 / rhs)
    }
}

/// Dividing two point values yields a dimensionless scaling factor, kept as
/// [Pt] so it can multiply font-unit values directly.
impl std::ops::Div<Pt> for Pt {
    type Output = Pt;
    fn div(self, rhs: Pt) -> Pt {
        Pt(self.0 / rhs.0)
    }
}

impl std::ops::Neg for Pt {
    type Output = Pt;
    fn neg(self) -> Pt {
        Pt(-self.0)
    }
}

/// A distance in inches; converts into [Pt] at 72 points per inch
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd)]
pub struct In(pub f32);

impl From<In> for Pt {
    fn from(v: In) -> Pt {
        Pt(v.0 * 72.0)
    }
}

/// A distance in millimetres; converts into [Pt] at 25.4 mm per inch
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd)]
pub struct Mm(pub f32);

impl From<Mm> for Pt {
    fn from(v: Mm) -> Pt {
        Pt(v.0 * 72.0 / 25.4)
    }
}
