use crate::{ApiClient, ApiError};
use reqwest::{
    multipart::{Form, Part},
    Method,
};
use serde_derive::{Deserialize, Serialize};

/// Upload a recorded audio clip and get its transcription back.
///
/// The clip is taken by value because a multipart body can't be reused
/// across attempts; the form is rebuilt from the bytes if the request has
/// to be replayed after a session refresh.
pub async fn transcribe(
    api: &ApiClient,
    audio: Vec<u8>,
    filename: &str,
) -> Result<String, ApiError> {
    log::debug!("Transcribing {} ({} bytes)", filename, audio.len());

    let response = api
        .send(Method::POST, "stt", |req| {
            let part =
                Part::bytes(audio.clone()).file_name(filename.to_string());
            req.multipart(Form::new().part("file", part))
        })
        .await?
        .error_for_status()?;

    let doc: Document = response.json().await?;
    log::trace!("Transcription: {}", doc.text);

    Ok(doc.text)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Document {
    text: String,
}
