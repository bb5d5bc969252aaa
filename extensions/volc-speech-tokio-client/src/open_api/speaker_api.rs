use crate::{
    config::OpenApiConfig,
    constants::{SPEAKER_API_VERSION, SPEAKER_SERVICE},
    error::ApiError,
    open_api::{OpenApiClient, ResponseMetadata},
};
use serde::{Deserialize, Serialize};

/// State of a cloned voice as reported by the train status actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeakerState {
    /// No record for the speaker id. Also reported for ids never used.
    #[default]
    Unknown,
    Training,
    /// Training finished; the speaker can be activated.
    Success,
    Active,
    /// Console instance expired or account in arrears.
    Expired,
    Reclaimed,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListTrainStatusRequest {
    #[serde(rename = "AppID")]
    pub app_id: String,
    /// All speakers of the app are listed when empty.
    #[serde(rename = "SpeakerIDs", skip_serializing_if = "Vec::is_empty")]
    pub speaker_ids: Vec<String>,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// A [`ListTrainStatusRequest`] with paging.
///
/// Paging is either by `page_number`/`page_size` or by `next_token` (with
/// `max_results`); a non-empty `next_token` takes precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchListTrainStatusRequest {
    #[serde(flatten)]
    pub list: ListTrainStatusRequest,
    #[serde(rename = "PageNumber", skip_serializing_if = "is_zero")]
    pub page_number: u32,
    #[serde(rename = "PageSize", skip_serializing_if = "is_zero")]
    pub page_size: u32,
    #[serde(rename = "NextToken", skip_serializing_if = "String::is_empty")]
    pub next_token: String,
    #[serde(rename = "MaxResults", skip_serializing_if = "is_zero")]
    pub max_results: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivateTrainStatusRequest {
    #[serde(rename = "AppID")]
    pub app_id: String,
    #[serde(rename = "SpeakerIDs")]
    pub speaker_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SpeakerTrainStatus {
    #[serde(rename = "CreateTime", default)]
    pub create_time: i64,
    #[serde(rename = "DemoAudio", default)]
    pub demo_audio: String,
    #[serde(rename = "InstanceNO", default)]
    pub instance_no: String,
    #[serde(rename = "IsActivable", default)]
    pub is_activable: bool,
    #[serde(rename = "SpeakerID", default)]
    pub speaker_id: String,
    #[serde(rename = "State", default)]
    pub state: SpeakerState,
    #[serde(rename = "Version", default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SpeakerList {
    #[serde(rename = "AppID", default)]
    pub app_id: String,
    #[serde(rename = "TotalCount", default)]
    pub total_count: u32,
    #[serde(rename = "NextToken", default)]
    pub next_token: String,
    #[serde(rename = "PageNumber", default)]
    pub page_number: u32,
    #[serde(rename = "PageSize", default)]
    pub page_size: u32,
    #[serde(rename = "Statuses", default)]
    pub statuses: Vec<SpeakerTrainStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListResponse {
    #[serde(rename = "ResponseMetadata", default)]
    pub metadata: ResponseMetadata,
    #[serde(rename = "Result", default)]
    pub result: SpeakerList,
}

impl ListResponse {
    pub fn into_result(self) -> Result<SpeakerList, ApiError> {
        self.metadata.check()?;
        Ok(self.result)
    }
}

/// Voice-clone speaker lifecycle actions of the OpenAPI gateway.
#[derive(Debug, Clone)]
pub struct SpeakerApi {
    client: OpenApiClient,
}

impl SpeakerApi {
    pub fn new(config: &OpenApiConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: OpenApiClient::new(config, SPEAKER_SERVICE)?,
        })
    }

    /// Lists train status for `speaker_ids`, or every speaker of the app
    /// (capped by the service) when the list is empty.
    pub async fn list_train_status(
        &self,
        request: &ListTrainStatusRequest,
    ) -> Result<SpeakerList, ApiError> {
        self.client
            .post_action::<_, ListResponse>("ListMegaTTSTrainStatus", SPEAKER_API_VERSION, request)
            .await?
            .into_result()
    }

    pub async fn batch_list_train_status(
        &self,
        request: &BatchListTrainStatusRequest,
    ) -> Result<SpeakerList, ApiError> {
        self.client
            .post_action::<_, ListResponse>(
                "BatchListMegaTTSTrainStatus",
                SPEAKER_API_VERSION,
                request,
            )
            .await?
            .into_result()
    }

    /// Locks the given speakers against further training.
    ///
    /// The call is all or nothing: if any id cannot be activated none are.
    pub async fn activate_speakers(
        &self,
        request: &ActivateTrainStatusRequest,
    ) -> Result<Vec<SpeakerTrainStatus>, ApiError> {
        let list = self
            .client
            .post_action::<_, ListResponse>(
                "ActivateMegaTTSTrainStatus",
                SPEAKER_API_VERSION,
                request,
            )
            .await?
            .into_result()?;

        Ok(list.statuses)
    }
}
