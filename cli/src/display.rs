//! Terminal-safe rendering of model text.
//!
//! Feedback and fun facts come from a remote model and are printed verbatim
//! to the terminal, so escape sequences and control characters are dropped
//! before display. Emoji and other printable Unicode pass through.

use std::borrow::Cow;

const ESC: char = '\x1b';
const BEL: char = '\x07';

#[must_use]
pub fn sanitize_terminal_text(input: &str) -> Cow<'_, str> {
    if !input.chars().any(is_unsafe) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ESC {
            match chars.peek() {
                // CSI: parameters and intermediates up to a final byte in @..~
                Some('[') => {
                    chars.next();
                    for c in chars.by_ref() {
                        if ('@'..='~').contains(&c) {
                            break;
                        }
                    }
                }
                // OSC: terminated by BEL or ST (ESC \)
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == BEL {
                            break;
                        }
                        if c == ESC && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                Some(_) => {
                    chars.next();
                }
                None => {}
            }
        } else if !is_unsafe(c) {
            out.push(c);
        }
    }

    Cow::Owned(out)
}

fn is_unsafe(c: char) -> bool {
    let allowed = matches!(c, '\n' | '\t');
    (c.is_control() && !allowed) || c == ESC
}
