use serde::{Deserialize, Serialize};

/// Rectangle the layout collaborator fills with the diagram.
///
/// The host recomputes this whenever the viewport or surrounding chrome
/// changes size, then re-runs layout against it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::new(0.0, 0.0, 600.0, 400.0)
    }
}
