//! Timestamp label placed beneath an accepted drawing.

use crate::util::{Bounds, Point};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Label format used when the configured one cannot be parsed.
pub const DEFAULT_LABEL_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Text label anchored in canvas space.
///
/// `position` is the horizontal centre and baseline of the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub position: Point,
    pub drawing: Bounds,
}

/// Returns true if `format` is a usable chrono strftime string.
pub fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Positions a timestamp label centred under `drawing`.
///
/// Returns `None` when the bounds fail the validity check with `min_extent`.
///
/// # Arguments
/// * `drawing` - Accumulated drawing bounds in canvas space
/// * `margin` - Gap between the bottom of the drawing and the label
/// * `min_extent` - Minimum width and height for the drawing to count
/// * `timestamp` - Time printed on the label
/// * `format` - chrono strftime format for the label text
pub fn place_annotation(
    drawing: &Bounds,
    margin: f64,
    min_extent: f64,
    timestamp: &DateTime<Local>,
    format: &str,
) -> Option<Annotation> {
    if !drawing.is_valid(min_extent) {
        return None;
    }

    let format = if is_valid_format(format) {
        format
    } else {
        DEFAULT_LABEL_FORMAT
    };

    Some(Annotation {
        text: timestamp.format(format).to_string(),
        position: Point::new(drawing.center_x(), drawing.max_y + margin),
        drawing: *drawing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn timestamp() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 17, 14, 30, 0).unwrap()
    }

    #[test]
    fn label_is_centred_below_drawing() {
        let drawing = Bounds::spanning(Point::new(100.0, 50.0), Point::new(300.0, 250.0));
        let annotation = place_annotation(&drawing, 40.0, 5.0, &timestamp(), "%Y-%m-%d %H:%M")
            .expect("valid drawing");
        assert_eq!(annotation.position, Point::new(200.0, 290.0));
        assert_eq!(annotation.text, "2024-05-17 14:30");
        assert_eq!(annotation.drawing, drawing);
    }

    #[test]
    fn degenerate_drawing_gets_no_label() {
        let line = Bounds::spanning(Point::new(100.0, 100.0), Point::new(110.0, 100.0));
        assert!(place_annotation(&line, 40.0, 5.0, &timestamp(), DEFAULT_LABEL_FORMAT).is_none());
    }

    #[test]
    fn broken_format_falls_back_to_default() {
        assert!(!is_valid_format("%Y-%"));
        let drawing = Bounds::spanning(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let annotation = place_annotation(&drawing, 0.0, 5.0, &timestamp(), "%Y-%").unwrap();
        assert_eq!(annotation.text, "2024-05-17 14:30");
    }
}
