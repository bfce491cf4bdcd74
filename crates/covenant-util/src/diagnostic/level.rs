//! Diagnostic severity levels and label styles.
//!
//! # Examples
//!
//! ```
//! use covenant_util::diagnostic::{Level, LabelStyle};
//!
//! assert!(Level::Error.is_error());
//! assert!(!Level::Warning.is_error());
//!
//! assert_eq!(LabelStyle::Primary.as_str(), "^");
//! assert_eq!(LabelStyle::Secondary.as_str(), "-");
//! ```

use std::fmt;

/// Diagnostic severity, matching the data model's `severity ∈ {error,
/// warning, info, hint}`.
///
/// # Examples
///
/// ```
/// use covenant_util::diagnostic::Level;
///
/// assert_eq!(format!("{}", Level::Error), "error");
/// assert_eq!(format!("{}", Level::Warning), "warning");
/// ```
///
/// Declared least-to-most severe so the derived [`Ord`] ranks `Error`
/// highest (`Level::Error > Level::Warning > Level::Info > Level::Hint`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// A suggestion ("did you mean ...") for resolving a diagnostic.
    Hint,
    /// Informational context attached to a diagnostic or emitted standalone.
    Info,
    /// A warning: does not affect success.
    Warning,
    /// An error: causes `success = false` on the owning `TypeCheckResult`.
    Error,
}

impl Level {
    /// Returns true if this level represents an error
    #[inline]
    pub const fn is_error(&self) -> bool {
        matches!(self, Level::Error)
    }

    /// Returns true if this level represents a warning
    #[inline]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Level::Warning)
    }

    /// Returns true if this level is informational (Info or Hint)
    #[inline]
    pub const fn is_info(&self) -> bool {
        matches!(self, Level::Info | Level::Hint)
    }

    /// Returns the canonical name for this level
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Hint => "hint",
        }
    }

    /// Returns the ANSI color code for this level
    #[inline]
    pub const fn color_code(&self) -> Option<&'static str> {
        match self {
            Level::Error => Some("31"),
            Level::Warning => Some("33"),
            Level::Info => Some("36"),
            Level::Hint => Some("32"),
        }
    }

    /// Returns the intensity modifier for terminal output
    #[inline]
    pub const fn intensity(&self) -> &'static str {
        match self {
            Level::Error => "1",
            _ => "0",
        }
    }

    /// Returns a short single-character indicator for this level
    #[inline]
    pub const fn indicator(&self) -> &'static str {
        match self {
            Level::Error => "E",
            Level::Warning => "W",
            Level::Info => "I",
            Level::Hint => "H",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Style for span labels in multi-span diagnostics
///
/// # Examples
///
/// ```
/// use covenant_util::diagnostic::LabelStyle;
///
/// assert_eq!(LabelStyle::Primary.as_str(), "^");
/// assert_eq!(LabelStyle::Secondary.as_str(), "-");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelStyle {
    /// Primary span - the main location of the issue
    Primary,
    /// Secondary span - related locations (`related_information`)
    Secondary,
}

impl LabelStyle {
    /// Returns the underline character for this style
    #[inline]
    pub const fn underline_char(&self) -> char {
        match self {
            LabelStyle::Primary => '^',
            LabelStyle::Secondary => '-',
        }
    }

    /// Returns the string representation for formatting
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LabelStyle::Primary => "^",
            LabelStyle::Secondary => "-",
        }
    }

    /// Returns true if this is a primary label
    #[inline]
    pub const fn is_primary(&self) -> bool {
        matches!(self, LabelStyle::Primary)
    }

    /// Returns true if this is a secondary label
    #[inline]
    pub const fn is_secondary(&self) -> bool {
        matches!(self, LabelStyle::Secondary)
    }
}

impl fmt::Display for LabelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Color configuration for diagnostic rendering
///
/// # Examples
///
/// ```
/// use covenant_util::diagnostic::ColorConfig;
///
/// let config = ColorConfig::Auto;
/// let config = ColorConfig::Always;
/// let config = ColorConfig::Never;
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ColorConfig {
    /// Automatically detect terminal color support
    #[default]
    Auto,
    /// Always use colors, even in pipes
    Always,
    /// Never use colors
    Never,
    /// Use ANSI colors only
    Ansi,
}

impl ColorConfig {
    /// Returns true if colors should be used for the given environment
    pub fn use_color(&self, is_tty: bool) -> bool {
        match self {
            ColorConfig::Auto => is_tty,
            ColorConfig::Always => true,
            ColorConfig::Never => false,
            ColorConfig::Ansi => true,
        }
    }

    /// Returns true if this configuration enables colors
    pub const fn is_enabled(&self) -> bool {
        matches!(self, ColorConfig::Always | ColorConfig::Ansi)
    }
}
