use std::fmt;

/// Prefix marking an image value the source could not extract automatically.
pub const MANUAL_EXTRACT_PREFIX: &str = "MANUAL_EXTRACT:";

/// The record fields an enrichment result may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Manufacturer,
    Name,
    Scale,
    ImageUrl,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Manufacturer,
        Field::Name,
        Field::Scale,
        Field::ImageUrl,
    ];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Manufacturer => write!(f, "manufacturer"),
            Field::Name => write!(f, "name"),
            Field::Scale => write!(f, "scale"),
            Field::ImageUrl => write!(f, "image url"),
        }
    }
}

/// Literal form field names, supplied by the owning form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub trigger: String,
    pub manufacturer: String,
    pub name: String,
    pub scale: String,
    pub image_url: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            trigger: "url".to_string(),
            manufacturer: "manufacturer".to_string(),
            name: "name".to_string(),
            scale: "scale".to_string(),
            image_url: "imageUrl".to_string(),
        }
    }
}

impl FieldNames {
    pub fn name_of(&self, field: Field) -> &str {
        match field {
            Field::Manufacturer => &self.manufacturer,
            Field::Name => &self.name,
            Field::Scale => &self.scale,
            Field::ImageUrl => &self.image_url,
        }
    }
}

/// Fields returned by the enrichment source. Absent fields stay `None`;
/// nothing is defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnrichedFields {
    pub manufacturer: Option<String>,
    pub name: Option<String>,
    pub scale: Option<String>,
    pub image_url: Option<String>,
}

impl EnrichedFields {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Manufacturer => self.manufacturer.as_deref(),
            Field::Name => self.name.as_deref(),
            Field::Scale => self.scale.as_deref(),
            Field::ImageUrl => self.image_url.as_deref(),
        }
    }

    /// Fields carrying a non-blank value, in record order.
    pub fn present(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL.into_iter().filter_map(|field| {
            self.get(field)
                .filter(|value| !value.trim().is_empty())
                .map(|value| (field, value))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }

    pub fn image(&self) -> Option<ImageRef> {
        self.image_url.as_deref().map(ImageRef::parse)
    }
}

/// Settled response of the enrichment source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnrichmentResult {
    pub success: bool,
    pub fields: EnrichedFields,
    pub message: Option<String>,
}

impl EnrichmentResult {
    pub fn populated(fields: EnrichedFields) -> Self {
        Self {
            success: true,
            fields,
            message: None,
        }
    }

    pub fn failed(message: Option<String>) -> Self {
        Self {
            success: false,
            fields: EnrichedFields::default(),
            message,
        }
    }
}

/// Interpretation of an `imageUrl` value for renderers.
///
/// The pipeline itself never filters on this; the wire string is what gets
/// merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Populated(String),
    RequiresManualAction(String),
}

impl ImageRef {
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(MANUAL_EXTRACT_PREFIX) {
            Some(reason) => ImageRef::RequiresManualAction(reason.to_string()),
            None => ImageRef::Populated(raw.to_string()),
        }
    }

    pub fn to_wire(&self) -> String {
        match self {
            ImageRef::Populated(url) => url.clone(),
            ImageRef::RequiresManualAction(reason) => format!("{MANUAL_EXTRACT_PREFIX}{reason}"),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ImageRef::Populated(_) => None,
            ImageRef::RequiresManualAction(reason) => Some(reason),
        }
    }
}
