//! Character classification shared by the reader, scanner, and emitter.

pub(crate) fn is_alpha(ch: impl Into<Option<char>>) -> bool {
    let Some(ch) = ch.into() else {
        return false;
    };
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

pub(crate) fn is_digit(ch: impl Into<Option<char>>) -> bool {
    ch.into().is_some_and(|ch| ch.is_ascii_digit())
}

pub(crate) fn is_hex(ch: impl Into<Option<char>>) -> bool {
    ch.into().is_some_and(|ch| ch.is_ascii_hexdigit())
}

/// YAML's "printable" set: the characters a stream may contain outside of
/// escape sequences. Excludes the BOM and the two non-characters adjacent
/// to it (`U+FFFE`, `U+FFFF`).
pub(crate) fn is_printable(ch: char) -> bool {
    matches!(ch,
        '\x09' | '\x0a' | '\x0d'
        | '\x20'..='\x7e'
        | '\u{0085}'
        | '\u{00a0}'..='\u{d7ff}'
        | '\u{e000}'..='\u{fffd}'
        | '\u{10000}'..='\u{10ffff}'
    ) && !matches!(ch, '\u{feff}')
}

pub(crate) fn is_bom(ch: char) -> bool {
    ch == '\u{feff}'
}

pub(crate) fn is_space(ch: impl Into<Option<char>>) -> bool {
    ch.into() == Some(' ')
}

pub(crate) fn is_tab(ch: impl Into<Option<char>>) -> bool {
    ch.into() == Some('\t')
}

pub(crate) fn is_blank(ch: impl Into<Option<char>>) -> bool {
    let ch = ch.into();
    is_space(ch) || is_tab(ch)
}

pub(crate) fn is_break(ch: impl Into<Option<char>>) -> bool {
    matches!(
        ch.into(),
        Some('\r' | '\n' | '\u{0085}' | '\u{2028}' | '\u{2029}')
    )
}

pub(crate) fn is_breakz(ch: impl Into<Option<char>>) -> bool {
    let ch = ch.into();
    ch.is_none() || is_break(ch)
}

pub(crate) fn is_blankz(ch: impl Into<Option<char>>) -> bool {
    let ch = ch.into();
    is_blank(ch) || is_breakz(ch)
}

pub(crate) fn vecdeque_starts_with<T: PartialEq + Copy>(
    vec: &std::collections::VecDeque<T>,
    needle: &[T],
) -> bool {
    let (head, tail) = vec.as_slices();
    if head.len() >= needle.len() {
        head.starts_with(needle)
    } else {
        head.iter()
            .chain(tail.iter())
            .copied()
            .take(needle.len())
            .eq(needle.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_is_feff_not_garbage() {
        assert!(is_bom('\u{feff}'));
        assert!(!is_bom('\u{7eff}'));
    }

    #[test]
    fn printable_excludes_bom_and_noncharacters() {
        assert!(!is_printable('\u{feff}'));
        assert!(!is_printable('\u{fffe}'));
        assert!(!is_printable('\u{ffff}'));
        assert!(is_printable('a'));
        assert!(is_printable('\n'));
        assert!(is_printable('\t'));
    }
}
