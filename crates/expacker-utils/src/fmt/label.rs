use std::fmt;

use console::{style, Color};

/**
    Prefix for lines printed to the user, such as `[WARN] Module foo not found.`
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Info,
    Warn,
    Error,
    Done,
}

impl Label {
    /**
        Returns the name of the label in all uppercase.
    */
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Done => "DONE",
        }
    }

    /**
        Returns the color of the label.
    */
    #[must_use]
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Blue,
            Self::Warn => Color::Yellow,
            Self::Error => Color::Red,
            Self::Done => Color::Green,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            style("[").dim(),
            style(self.name()).fg(self.color()),
            style("]").dim()
        )
    }
}
