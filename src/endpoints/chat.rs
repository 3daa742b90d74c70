use crate::{ApiClient, ApiError, ChatReply, HealthProfile};
use reqwest::Method;
use serde_derive::Serialize;

/// Send one symptom description and get the assistant's answer along with
/// any structured facts and the safety classification.
pub async fn chat(
    api: &ApiClient,
    text: &str,
    lang: &str,
    profile: &HealthProfile,
) -> Result<ChatReply, ApiError> {
    let data = Data {
        text,
        lang,
        profile,
    };
    log::trace!("Payload: {:#?}", data);

    let response = api
        .send(Method::POST, "chat", |req| req.json(&data))
        .await?
        .error_for_status()?;

    let reply: ChatReply = response.json().await?;
    log::trace!("Parsed response: {:#?}", reply);

    Ok(reply)
}

#[derive(Debug, Serialize)]
struct Data<'a> {
    text: &'a str,
    lang: &'a str,
    profile: &'a HealthProfile,
}
