use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub fg_primary: Color,
    pub fg_secondary: Color,
    /// Lines already sung
    pub fg_past: Color,
    pub accent: Color,
    /// The line being sung right now
    pub sung: Color,
    pub border: Color,
    pub border_focus: Color,
    pub error: Color,
}

impl Palette {
    pub const STAGE: Self = Self {
        fg_primary: Color::Rgb(235, 235, 235),
        fg_secondary: Color::Rgb(136, 136, 136),
        fg_past: Color::Rgb(90, 90, 90),
        accent: Color::Rgb(255, 255, 255),
        sung: Color::Rgb(255, 196, 64),     // #ffc440 amber
        border: Color::Rgb(64, 64, 64),
        border_focus: Color::Rgb(160, 160, 160),
        error: Color::Rgb(240, 96, 96),
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::STAGE
    }
}
