/// A colour, expressed in RGB, CMYK, or greyscale colour spaces
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Colour {
    /// DeviceRGB colour; r, g, and b range from 0.0 to 1.0
    RGB { r: f32, g: f32, b: f32 },
    /// DeviceCMYK colour; c, m, y, and k range from 0.0 to 1.0
    CMYK { c: f32, m: f32, y: f32, k: f32 },
    /// DeviceGray colour; g ranges from 0.0 to 1.0
    Grey { g: f32 },
}

impl Colour {
    /// Create a new colour in the RGB space. r, g, and b range from 0.0 to 1.0
    pub fn new_rgb(r: f32, g: f32, b: f32) -> Colour {
        Colour::RGB { r, g, b }
    }

    /// Create a new colour in the RGB space. r, g, and b range from 0 to 255
    pub fn new_rgb_bytes(r: u8, g: u8, b: u8) -> Colour {
        Colour::RGB {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Create a new colour in the CMYK space. c, m, y, and k range from 0.0 to 1.0
    pub fn new_cmyk(c: f32, m: f32, y: f32, k: f32) -> Colour {
        Colour::CMYK { c, m, y, k }
    }

    /// Create a new colour in the Gray space, g ranges from 0.0 to 1.0
    pub fn new_grey(g: f32) -> Colour {
        Colour::Grey { g }
    }

    /// Parse a colour from a six-digit RGB hex string such as `"ff0000"`.
    /// A leading `#` is accepted and ignored.
    pub fn from_rgb_hex(hex: &str) -> Option<Colour> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Colour::new_rgb_bytes(r, g, b))
    }

    /// Format an RGB colour as a six-digit hex string; [None] for other
    /// colour spaces
    pub fn to_rgb_hex(&self) -> Option<String> {
        match self {
            Colour::RGB { r, g, b } => Some(format!(
                "{:02x}{:02x}{:02x}",
                (r * 255.0).round() as u8,
                (g * 255.0).round() as u8,
                (b * 255.0).round() as u8
            )),
            _ => None,
        }
    }
}

impl<T: Into<f32>> From<(T, T, T)> for Colour {
    fn from(c: (T, T, T)) -> Self {
        Colour::RGB {
            r: c.0.into(),
            g: c.1.into(),
            b: c.2.into(),
        }
    }
}

impl<T: Into<f32>> From<(T, T, T, T)> for Colour {
    fn from(c: (T, T, T, T)) -> Self {
        Colour::CMYK {
            c: c.0.into(),
            m: c.1.into(),
            y: c.2.into(),
            k: c.3.into(),
        }
    }
}

/// A list of pre-defined colour constants
pub mod colours {
    use super::*;

    pub const BLACK: Colour = Colour::Grey { g: 0.0 };
    pub const WHITE: Colour = Colour::Grey { g: 1.0 };
    pub const RED: Colour = Colour::RGB {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };
    pub const GREEN: Colour = Colour::RGB {
        r: 0.0,
        g: 1.0,
        b: 0.0,
    };
    pub const BLUE: Colour = Colour::RGB {
        r: 0.0,
        g: 0.0,
        b: 1.0,
    };
}
