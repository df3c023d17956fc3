// THEORY:
// The `Pixel` module is the most fundamental unit of the tracer. It is a "dumb" data
// container for a single RGBA pixel plus the single-pixel brightness heuristics the
// rest of the system is built on. Nothing here knows about neighbors, columns or the
// background; anything that compares pixels belongs in higher modules.
//
// Two brightness forms live here:
// - brightness: sqrt(0.299·R² + 0.587·G² + 0.114·B²), a perceptual "root mean square"
//   weighting that keeps the 0..255 range. This is what the boundary scan uses.
// - luminance: the linear Rec. 601 luma (0.299·R + 0.587·G + 0.114·B).
//
// Alpha is carried through untouched and never contributes to either value.

pub mod pixel {
    use crate::error::TraceError;

    pub type Byte = u8;
    pub type Bytes = Vec<Byte>;
    pub type Channel = Byte;
    pub type Brightness = f64;
    pub type Luminance = f64;

    pub const CHANNELS: usize = 4;

    const RED_WEIGHT: f64 = 0.299;
    const GREEN_WEIGHT: f64 = 0.587;
    const BLUE_WEIGHT: f64 = 0.114;

    /// A "dumb" data container representing a single RGBA pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha (transparency) channel value (0-255).
        pub alpha: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        /// Opaque pixel from RGB channels.
        pub fn rgb(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel::new(red, green, blue, Channel::MAX)
        }

        /// Perceived brightness, sqrt(0.299·R² + 0.587·G² + 0.114·B²).
        ///
        /// - Channels are used on their raw 0..255 scale, so the result is in [0, 255].
        /// - A neutral gray of value `v` has brightness `v`.
        pub fn brightness(&self) -> Brightness {
            let red = self.red as f64;
            let green = self.green as f64;
            let blue = self.blue as f64;
            (RED_WEIGHT * red * red + GREEN_WEIGHT * green * green + BLUE_WEIGHT * blue * blue)
                .sqrt()
        }

        /// Luminance estimate (Rec. 601 luma).
        pub fn luminance(&self) -> Luminance {
            RED_WEIGHT * self.red as f64 + GREEN_WEIGHT * self.green as f64 + BLUE_WEIGHT * self.blue as f64
        }
    }

    impl TryFrom<&[Byte]> for Pixel {
        type Error = TraceError;

        fn try_from(bytes: &[Byte]) -> Result<Self, Self::Error> {
            if bytes.len() != CHANNELS {
                return Err(TraceError::InvalidBuffer {
                    message: format!("cannot convert {} bytes into a pixel", bytes.len()),
                });
            }
            Ok(Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3]))
        }
    }

    impl From<image::Rgba<u8>> for Pixel {
        fn from(rgba: image::Rgba<u8>) -> Self {
            let [red, green, blue, alpha] = rgba.0;
            Pixel::new(red, green, blue, alpha)
        }
    }

    impl From<Pixel> for Bytes {
        fn from(pixel: Pixel) -> Self {
            vec![pixel.red, pixel.green, pixel.blue, pixel.alpha]
        }
    }
}
