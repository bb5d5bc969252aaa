mod open_api_client;
mod speaker_api;
mod speaker_client;

pub use open_api_client::{MetadataError, OpenApiClient, ResponseMetadata};
pub use speaker_api::{
    ActivateTrainStatusRequest, BatchListTrainStatusRequest, ListResponse,
    ListTrainStatusRequest, SpeakerApi, SpeakerList, SpeakerState, SpeakerTrainStatus,
};
pub use speaker_client::{
    SpeakerClient, SpeakerClientConfig, StatusRequest, StatusResponse, TrainingStatus,
    UploadAudio, UploadRequest, UploadResponse,
};
