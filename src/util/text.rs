use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// Removes terminal control sequences and control characters from feed text.
///
/// Listing fields come from a remote service and are drawn straight into the
/// terminal, so CSI (`ESC [ ... final`) and OSC (`ESC ] ... BEL|ST`) sequences
/// are dropped whole, along with any other C0 control byte, DEL and C1
/// controls. Newlines and tabs become spaces since every field is drawn on a
/// single table row.
///
/// Returns `Cow::Borrowed` when nothing needs removing.
///
/// ```
/// use listwatch::util::sanitize;
///
/// assert_eq!(sanitize("\x1b[31mLeBron\x1b[0m"), "LeBron");
/// assert_eq!(sanitize("plain"), "plain");
/// ```
pub fn sanitize(s: &str) -> Cow<'_, str> {
    if !s.chars().any(|c| c.is_control()) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\x1b' => match chars.peek() {
                Some('[') => {
                    chars.next();
                    // Parameter and intermediate bytes, then one final byte in @..~
                    for c in chars.by_ref() {
                        if ('@'..='~').contains(&c) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\x07' {
                            break;
                        }
                        if c == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            '\t' | '\n' | '\r' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    Cow::Owned(out)
}

/// Truncates a string to at most `max_width` terminal columns.
///
/// Wide characters (CJK, emoji) count as two columns. When the text does not
/// fit, the last visible column becomes `…`.
///
/// ```
/// use listwatch::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("0xf853bd09d46e7db6", 8), "0xf853b…");
/// assert_eq!(truncate_to_width("short", 8), "short");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if UnicodeWidthStr::width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    let budget = max_width - 1;
    let mut width = 0;
    let mut out = String::with_capacity(max_width + ELLIPSIS.len_utf8());
    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push(ELLIPSIS);
    Cow::Owned(out)
}
