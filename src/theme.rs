//! Terminal color palette for the text report

use crossterm::style::Color;

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

#[derive(Debug, Clone, Copy)]
pub struct ThemeColors {
    pub border: Color,
    pub title: Color,

    // Text
    pub text_primary: Color,
    pub text_muted: Color,

    // Accents
    pub accent_blue: Color,
    pub accent_green: Color,
    pub accent_magenta: Color,
    pub accent_orange: Color,
    pub accent_yellow: Color,
}

impl ThemeColors {
    pub const DEFAULT: Self = Self {
        border: rgb(130, 135, 160),
        title: rgb(120, 220, 170),

        text_primary: rgb(230, 233, 248),
        text_muted: rgb(140, 145, 168),

        accent_blue: rgb(120, 170, 250),
        accent_green: rgb(110, 210, 120),
        accent_magenta: rgb(210, 150, 235),
        accent_orange: rgb(245, 175, 100),
        accent_yellow: rgb(235, 195, 100),
    };

    /// Token input color
    #[inline]
    pub const fn token_input(&self) -> Color {
        self.accent_blue
    }

    /// Token output color
    #[inline]
    pub const fn token_output(&self) -> Color {
        self.accent_magenta
    }

    /// Streak highlight
    #[inline]
    pub const fn streak(&self) -> Color {
        self.accent_orange
    }

    /// Rotating colors for ranked rows
    #[inline]
    pub fn rank_color(&self, index: usize) -> Color {
        const COLORS: [Color; 5] = [
            rgb(100, 210, 225),
            rgb(200, 150, 225),
            rgb(110, 200, 120),
            rgb(225, 190, 100),
            rgb(235, 140, 175),
        ];
        COLORS[index % COLORS.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_colors_rotate() {
        let colors = ThemeColors::DEFAULT;
        assert_eq!(colors.rank_color(0), colors.rank_color(5));
        assert_ne!(colors.rank_color(0), colors.rank_color(1));
        assert_eq!(colors.token_input(), colors.accent_blue);
    }
}
