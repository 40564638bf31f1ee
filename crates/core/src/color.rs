//! Clear-color selection.

use std::time::Duration;

/// The three background colors the demo cycles through, one per second.
///
/// The state is recomputed from elapsed time every frame and never stored
/// anywhere else, so there is nothing to keep in sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorState {
    Red,
    Green,
    Blue,
}

impl ColorState {
    /// Selects the clear color for the current frame.
    ///
    /// The schedule is `floor(elapsed seconds) mod 3`: red during the first
    /// second of the session, green during the second, blue during the
    /// third, then red again. The remainder can only be 0, 1, or 2;
    /// `previous` is returned on the unreachable arm so a bogus index can
    /// never change the color.
    pub fn select(elapsed: Duration, previous: ColorState) -> ColorState {
        match elapsed.as_secs() % 3 {
            0 => ColorState::Red,
            1 => ColorState::Green,
            2 => ColorState::Blue,
            _ => previous,
        }
    }

    /// The color as opaque RGBA bytes.
    pub fn rgba(self) -> [u8; 4] {
        match self {
            ColorState::Red => [255, 0, 0, 255],
            ColorState::Green => [0, 255, 0, 255],
            ColorState::Blue => [0, 0, 255, 255],
        }
    }

    /// The color as a normalized RGBA clear value.
    pub fn clear_value(self) -> [f32; 4] {
        let [r, g, b, a] = self.rgba();
        [
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ]
    }
}

impl Default for ColorState {
    fn default() -> Self {
        ColorState::Red
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs_f64: f64) -> ColorState {
        ColorState::select(Duration::from_secs_f64(secs_f64), ColorState::Red)
    }

    #[test]
    fn test_first_three_seconds() {
        assert_eq!(at(0.0), ColorState::Red);
        assert_eq!(at(0.5), ColorState::Red);
        assert_eq!(at(1.2), ColorState::Green);
        assert_eq!(at(2.9), ColorState::Blue);
    }

    #[test]
    fn test_wraps_at_exact_second_boundary() {
        // floor(3.0) = 3, 3 mod 3 = 0 -> back to red exactly at t=3.0s.
        assert_eq!(at(3.0), ColorState::Red);
        assert_eq!(at(4.0), ColorState::Green);
        assert_eq!(at(5.999), ColorState::Blue);
        assert_eq!(at(6.0), ColorState::Red);
    }

    #[test]
    fn test_mapping_is_exhaustive_over_whole_seconds() {
        for s in 0u64..1000 {
            let expected = match s % 3 {
                0 => ColorState::Red,
                1 => ColorState::Green,
                _ => ColorState::Blue,
            };
            assert_eq!(
                ColorState::select(Duration::from_secs(s), ColorState::Blue),
                expected,
                "second {s}"
            );
        }
    }

    #[test]
    fn test_rgba_channels() {
        assert_eq!(ColorState::Red.rgba(), [255, 0, 0, 255]);
        assert_eq!(ColorState::Green.rgba(), [0, 255, 0, 255]);
        assert_eq!(ColorState::Blue.rgba(), [0, 0, 255, 255]);
    }

    #[test]
    fn test_clear_value_is_normalized_and_opaque() {
        for color in [ColorState::Red, ColorState::Green, ColorState::Blue] {
            let value = color.clear_value();
            assert!(value.iter().all(|c| (0.0..=1.0).contains(c)));
            assert_eq!(value[3], 1.0);
        }
    }
}
