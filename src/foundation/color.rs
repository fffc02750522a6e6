/// Largest value a single 16-bit channel can hold.
pub const MAX_CHANNEL_VALUE: u16 = 0xFFFF;

/// 16-bit-per-channel RGBA color packed into a single `u64` as `R:G:B:A`, most significant first.
///
/// Equality is bit-exact on the packed value. Channels are straight (not premultiplied) alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Color(u64);

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0);

    /// Wrap a packed value verbatim.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Pack four channels as `(r << 48) | (g << 32) | (b << 16) | a`.
    pub const fn from_rgba(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self(((r as u64) << 48) | ((g as u64) << 32) | ((b as u64) << 16) | a as u64)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub const fn r(self) -> u16 {
        ((self.0 >> 48) & MAX_CHANNEL_VALUE as u64) as u16
    }

    pub const fn g(self) -> u16 {
        ((self.0 >> 32) & MAX_CHANNEL_VALUE as u64) as u16
    }

    pub const fn b(self) -> u16 {
        ((self.0 >> 16) & MAX_CHANNEL_VALUE as u64) as u16
    }

    pub const fn a(self) -> u16 {
        (self.0 & MAX_CHANNEL_VALUE as u64) as u16
    }

    pub const fn rgba(self) -> [u16; 4] {
        [self.r(), self.g(), self.b(), self.a()]
    }
}

impl From<u64> for Color {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl std::fmt::LowerHex for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::LowerHex::fmt(&self.0, f)
    }
}

impl std::fmt::UpperHex for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::UpperHex::fmt(&self.0, f)
    }
}
