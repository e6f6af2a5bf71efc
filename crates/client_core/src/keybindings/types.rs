//! Keystroke and modifier types.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Modifier keys as a bitfield.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000);

    pub const fn new(ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= Self::CTRL.0;
        }
        if shift {
            bits |= Self::SHIFT.0;
        }
        if alt {
            bits |= Self::ALT.0;
        }
        if meta {
            bits |= Self::META.0;
        }
        Modifiers(bits)
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & Self::CTRL.0 != 0
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & Self::SHIFT.0 != 0
    }

    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & Self::ALT.0 != 0
    }

    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & Self::META.0 != 0
    }

    /// Ctrl and Meta (Cmd) are interchangeable as the command modifier.
    #[inline]
    pub const fn has_cmd(self) -> bool {
        self.ctrl() || self.meta()
    }

    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl() {
            parts.push("Ctrl");
        }
        if self.shift() {
            parts.push("Shift");
        }
        if self.alt() {
            parts.push("Alt");
        }
        if self.meta() {
            parts.push("Meta");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A character key plus modifiers. The character is normalised to lowercase
/// so that Shift does not change which key a pattern sees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Keystroke {
    pub key: char,
    pub modifiers: Modifiers,
}

impl Keystroke {
    pub fn new(key: char, modifiers: Modifiers) -> Self {
        Self {
            key: key.to_lowercase().next().unwrap_or(key),
            modifiers,
        }
    }

    pub fn char(key: char) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

impl fmt::Display for Keystroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers == Modifiers::NONE {
            write!(f, "{}", self.key.to_uppercase())
        } else {
            write!(f, "{}+{}", self.modifiers, self.key.to_uppercase())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeystrokeParseError {
    #[error("empty keystroke")]
    Empty,
    #[error("unknown modifier: {0}")]
    UnknownModifier(String),
    #[error("expected a single character key, got {0:?}")]
    InvalidKey(String),
}

impl FromStr for Keystroke {
    type Err = KeystrokeParseError;

    /// Parses shortcuts such as `ctrl+shift+f` or `cmd+s`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeystrokeParseError::Empty);
        }

        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key_part = parts.pop().unwrap_or_default();

        let mut modifiers = Modifiers::NONE;
        for part in parts {
            modifiers = modifiers
                | match part.to_ascii_lowercase().as_str() {
                    "ctrl" | "control" => Modifiers::CTRL,
                    "shift" => Modifiers::SHIFT,
                    "alt" | "option" | "opt" => Modifiers::ALT,
                    "meta" | "cmd" | "command" | "super" => Modifiers::META,
                    _ => return Err(KeystrokeParseError::UnknownModifier(part.to_string())),
                };
        }

        let mut chars = key_part.chars();
        match (chars.next(), chars.next()) {
            (Some(key), None) => Ok(Keystroke::new(key, modifiers)),
            _ => Err(KeystrokeParseError::InvalidKey(key_part.to_string())),
        }
    }
}

/// One physical key press on its way through the interceptor chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub keystroke: Keystroke,
    default_prevented: bool,
}

impl KeyEvent {
    pub fn new(keystroke: Keystroke) -> Self {
        Self {
            keystroke,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}
