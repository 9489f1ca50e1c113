// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Stores the Chip-8's screen memory
//!
//! The screen is a 64x32 grid of on/off pixels, row-major. Only `Dxyn` and
//! `00e0` change it; everything else just looks.

/// Width of the screen, in pixels
pub const WIDTH: usize = 64;
/// Height of the screen, in pixels
pub const HEIGHT: usize = 32;

/// A 64x32 monochrome frame buffer
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Screen {
    pixels: Vec<bool>,
}

impl Default for Screen {
    fn default() -> Self {
        Screen {
            pixels: vec![false; WIDTH * HEIGHT],
        }
    }
}

impl Screen {
    /// Constructs a new, blank screen
    pub fn new() -> Self {
        Screen::default()
    }

    /// Gets the pixel at (x, y). Coordinates wrap around the edges.
    /// # Examples
    /// ```rust
    /// # use fantasy8::Screen;
    /// let mut screen = Screen::new();
    /// screen.xor(64 + 3, 32 + 1, true);
    /// assert!(screen.get(3, 1));
    /// ```
    #[inline(always)]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.pixels[Self::index(x, y)]
    }

    /// XORs `bit` into the pixel at (x, y), wrapping both coordinates.
    ///
    /// Returns true if the pixel was set and `bit` was set, i.e. the pixel
    /// was erased by this write.
    #[inline(always)]
    pub fn xor(&mut self, x: usize, y: usize, bit: bool) -> bool {
        let pixel = &mut self.pixels[Self::index(x, y)];
        let collision = *pixel && bit;
        *pixel ^= bit;
        collision
    }

    /// Turns every pixel off
    pub fn clear(&mut self) {
        self.pixels.fill(false)
    }

    /// Whether every pixel is off
    pub fn is_blank(&self) -> bool {
        !self.pixels.iter().any(|&p| p)
    }

    /// Iterates over the rows of the screen, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.chunks_exact(WIDTH)
    }

    /// Gets every pixel, row-major
    pub fn as_slice(&self) -> &[bool] {
        &self.pixels
    }

    #[inline(always)]
    fn index(x: usize, y: usize) -> usize {
        (y % HEIGHT) * WIDTH + (x % WIDTH)
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("lit", &self.pixels.iter().filter(|&&p| p).count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_is_self_inverse() {
        let mut screen = Screen::new();
        assert!(!screen.xor(10, 10, true));
        assert!(screen.get(10, 10));
        assert!(screen.xor(10, 10, true));
        assert!(!screen.get(10, 10));
        assert!(screen.is_blank());
    }

    #[test]
    fn xor_clear_bit_is_noop() {
        let mut screen = Screen::new();
        screen.xor(1, 2, true);
        assert!(!screen.xor(1, 2, false));
        assert!(screen.get(1, 2));
    }

    #[test]
    fn wraps_each_axis() {
        let mut screen = Screen::new();
        screen.xor(WIDTH, HEIGHT - 1, true);
        assert!(screen.get(0, HEIGHT - 1));
        screen.xor(WIDTH - 1, HEIGHT, true);
        assert!(screen.get(WIDTH - 1, 0));
        assert_eq!(2, screen.as_slice().iter().filter(|&&p| p).count());
    }

    #[test]
    fn rows_are_row_major() {
        let mut screen = Screen::new();
        screen.xor(5, 3, true);
        let row = screen.rows().nth(3).unwrap();
        assert_eq!(WIDTH, row.len());
        assert!(row[5]);
        assert_eq!(HEIGHT, screen.rows().count());
        screen.clear();
        assert!(screen.is_blank());
    }
}
