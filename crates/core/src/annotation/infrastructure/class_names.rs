//! Class-name tables for object detection models.
//!
//! Ultralytics ONNX exports store their label map in the custom metadata key
//! `names` as a Python dict literal, e.g. `{0: 'person', 1: 'bicycle'}`.

/// Metadata key that holds the label map in ultralytics exports.
pub const NAMES_METADATA_KEY: &str = "names";

/// The 80 COCO labels, in class-index order.
pub const COCO_CLASS_NAMES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch", "potted plant",
    "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone",
    "microwave", "oven", "toaster", "sink", "refrigerator", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

/// Index-ordered class names. Unknown indices render as `class{N}`.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn coco() -> Self {
        Self::new(COCO_CLASS_NAMES.iter().map(|s| s.to_string()).collect())
    }

    /// Names from the model's metadata, falling back to COCO when the
    /// metadata is missing or unparseable.
    pub fn from_metadata(raw: Option<&str>) -> Self {
        match raw.and_then(parse_names) {
            Some(names) => Self::new(names),
            None => {
                log::debug!("Model carries no usable class names, using COCO labels");
                Self::coco()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, class_id: usize) -> String {
        self.names
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| format!("class{class_id}"))
    }
}

/// Parse `{0: 'person', 1: "bicycle"}` into an index-ordered list.
///
/// Gaps in the index sequence are filled with `class{N}`.
fn parse_names(raw: &str) -> Option<Vec<String>> {
    let body = raw.trim().strip_prefix('{')?.strip_suffix('}')?;
    let mut pairs: Vec<(usize, String)> = Vec::new();

    let mut rest = body.trim();
    while !rest.is_empty() {
        let (key, after_key) = rest.split_once(':')?;
        let index: usize = key.trim().parse().ok()?;

        let after_key = after_key.trim_start();
        let quote = after_key.chars().next().filter(|c| *c == '\'' || *c == '"')?;
        let value_and_rest = &after_key[1..];
        let end = value_and_rest.find(quote)?;
        pairs.push((index, value_and_rest[..end].to_string()));

        rest = value_and_rest[end + 1..].trim_start();
        rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
    }

    if pairs.is_empty() {
        return None;
    }
    let len = pairs.iter().map(|(i, _)| i + 1).max().unwrap_or(0);
    let mut names: Vec<String> = (0..len).map(|i| format!("class{i}")).collect();
    for (i, name) in pairs {
        names[i] = name;
    }
    Some(names)
}
