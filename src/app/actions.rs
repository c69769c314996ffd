use super::state::PromptKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,

    // Playback
    TogglePause,
    SeekForward,
    SeekBack,
    VolumeUp,
    VolumeDown,

    // Lyric view
    ScrollLyrics(isize),
    JumpToAnchor,
    /// Seek to the start of a lyric line (mouse click)
    SeekToLine(usize),
    FollowPlayback,

    // Candidates
    NextCandidate,
    PrevCandidate,
    SelectCandidateAt(usize),

    // Prompt line
    OpenPrompt(PromptKind),
    InputChar(char),
    Backspace,
    ClearInput,
    SubmitPrompt,
    CancelPrompt,

    Resize,
}
