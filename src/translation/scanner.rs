#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    BacktickQuoted,
    LineComment,
    BlockComment(u32),
}

/// Closing delimiter for a quoted state.
pub(super) fn closing_quote(state: State) -> Option<u8> {
    match state {
        State::SingleQuoted => Some(b'\''),
        State::DoubleQuoted => Some(b'"'),
        State::BacktickQuoted => Some(b'`'),
        _ => None,
    }
}
