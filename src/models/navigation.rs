// Data models for slide-deck navigation

use serde::{Deserialize, Serialize};

/// Where the presenter currently is in the deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidePosition {
    pub slide_number: u32, // 1-based
    pub total_slides: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

impl SlidePosition {
    pub fn new(slide_number: u32, total_slides: u32) -> Self {
        Self {
            slide_number,
            total_slides,
            has_previous: slide_number > 1,
            has_next: slide_number < total_slides,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_slide_has_both_neighbours() {
        let position = SlidePosition::new(3, 5);
        assert!(position.has_previous);
        assert!(position.has_next);
    }

    #[test]
    fn test_single_slide_deck() {
        let position = SlidePosition::new(1, 1);
        assert!(!position.has_previous);
        assert!(!position.has_next);
    }

    #[test]
    fn test_position_serializes_like_slide_api() {
        let json = serde_json::to_value(SlidePosition::new(5, 5)).unwrap();
        assert_eq!(json["slide_number"], 5);
        assert_eq!(json["total_slides"], 5);
        assert_eq!(json["has_previous"], true);
        assert_eq!(json["has_next"], false);
    }
}
