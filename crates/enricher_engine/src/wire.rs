use enricher_core::{EnrichedFields, EnrichmentResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrichRequest<'a> {
    pub trigger_value: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EnrichResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<EnrichData>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrichData {
    #[serde(default)]
    manufacturer: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    scale: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

impl EnrichResponse {
    pub fn into_result(self) -> EnrichmentResult {
        match (self.success, self.data) {
            (true, Some(data)) => EnrichmentResult {
                success: true,
                fields: data.into(),
                message: self.message,
            },
            _ => EnrichmentResult::failed(self.message),
        }
    }
}

impl From<EnrichData> for EnrichedFields {
    fn from(data: EnrichData) -> Self {
        Self {
            manufacturer: data.manufacturer,
            name: data.name,
            scale: data.scale,
            image_url: data.image_url,
        }
    }
}
