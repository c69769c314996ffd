//! Nerd Font glyphs (https://www.nerdfonts.com)

#[derive(Debug, Clone)]
pub struct Icons {
    pub play: &'static str,
    pub pause: &'static str,
    pub stop: &'static str,
    pub volume_mute: &'static str,
    pub volume_low: &'static str,
    pub volume_high: &'static str,

    pub search: &'static str,
    pub music: &'static str,
    pub lyrics: &'static str,
    pub list: &'static str,

    pub success: &'static str,
    pub error: &'static str,

    pub selected: &'static str,
    /// Marker for the line being sung
    pub note: &'static str,

    pub progress_full: &'static str,
    pub progress_empty: &'static str,
    pub progress_head: &'static str,
}

impl Icons {
    pub const fn nerd() -> Self {
        Self {
            play: "\u{f04b}",           // nf-fa-play
            pause: "\u{f04c}",          // nf-fa-pause
            stop: "\u{f04d}",           // nf-fa-stop
            volume_mute: "\u{f026}",    // nf-fa-volume_off
            volume_low: "\u{f027}",     // nf-fa-volume_down
            volume_high: "\u{f028}",    // nf-fa-volume_up

            search: "\u{f002}",         // nf-fa-search
            music: "\u{f001}",          // nf-fa-music
            lyrics: "\u{f0c4d}",        // nf-md-microphone_variant
            list: "\u{f03a}",           // nf-fa-list

            success: "\u{f00c}",        // nf-fa-check
            error: "\u{f00d}",          // nf-fa-times

            selected: "\u{f054} ",      // nf-fa-chevron_right
            note: "♪",

            progress_full: "━",
            progress_empty: "─",
            progress_head: "●",
        }
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self::nerd()
    }
}

pub struct LoadingSpinner;

impl LoadingSpinner {
    pub const BRAILLE: [&'static str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

    pub fn frame(tick: u64) -> &'static str {
        let idx = (tick / 4) as usize % Self::BRAILLE.len();
        Self::BRAILLE[idx]
    }
}
