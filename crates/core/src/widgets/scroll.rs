//! Header scroll state.

/// Offsets (in pixels) below this count as the top of the page.
pub const TOP_THRESHOLD: f64 = 50.0;

/// Bucket for the page's scroll position, used to style the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollState {
    Top,
    ScrollingDown,
    ScrollingUp,
}

impl ScrollState {
    /// Classify the current offset relative to the previous one.
    #[must_use]
    pub fn classify(offset: f64, previous: f64) -> Self {
        if offset < TOP_THRESHOLD {
            Self::Top
        } else if offset > previous {
            Self::ScrollingDown
        } else {
            Self::ScrollingUp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_top() {
        assert_eq!(ScrollState::classify(10.0, 400.0), ScrollState::Top);
    }

    #[test]
    fn test_direction() {
        assert_eq!(ScrollState::classify(300.0, 200.0), ScrollState::ScrollingDown);
        assert_eq!(ScrollState::classify(200.0, 300.0), ScrollState::ScrollingUp);
    }

    #[test]
    fn test_stationary_counts_as_up() {
        assert_eq!(ScrollState::classify(300.0, 300.0), ScrollState::ScrollingUp);
    }
}
