/// One annotated box on a frame.
///
/// Produced fresh by an annotator for every frame and discarded once drawn.
/// Coordinates are in source pixels and may extend past the frame edges;
/// the painter clips them.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub confidence: Option<f64>,
    pub label: Option<String>,
}

impl Detection {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            confidence: None,
            label: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn bbox(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Text drawn above the box, if any.
    ///
    /// `"person 0.87"` with both fields, `"0.87"` with only a confidence,
    /// `"alice"` with only a label.
    pub fn caption(&self) -> Option<String> {
        match (&self.label, self.confidence) {
            (Some(label), Some(conf)) => Some(format!("{label} {conf:.2}")),
            (None, Some(conf)) => Some(format!("{conf:.2}")),
            (Some(label), None) => Some(label.clone()),
            (None, None) => None,
        }
    }
}
