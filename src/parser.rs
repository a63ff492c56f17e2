use crate::error::{Result, VpaidError};
use crate::models::{AdParameters, CreativeData, MediaSource};
use log::debug;
use serde::Deserialize;
use url::Url;

/// `AdParameters` exactly as it arrives on the wire, before URL validation
#[derive(Debug, Deserialize)]
struct RawAdParameters {
    #[serde(default)]
    overlays: Vec<String>,

    #[serde(default)]
    videos: Vec<RawMediaSource>,
}

#[derive(Debug, Deserialize)]
struct RawMediaSource {
    url: String,

    #[serde(alias = "mimeType")]
    mimetype: String,
}

/// Parse the `creativeData` object a host passes to `initAd` from its JSON form
pub fn parse_creative_data(json: &str) -> Result<CreativeData> {
    Ok(serde_json::from_str(json)?)
}

/// Extract and parse the `AdParameters` payload carried by `creative`
pub fn parse_creative_parameters(creative: &CreativeData) -> Result<AdParameters> {
    let payload = creative
        .ad_parameters
        .as_deref()
        .ok_or_else(|| VpaidError::MissingField("AdParameters".to_string()))?;

    parse_ad_parameters(payload)
}

/// Parse an `AdParameters` JSON string into overlays and candidate videos
///
/// Order is preserved for both lists. Every URL must be absolute.
pub fn parse_ad_parameters(json: &str) -> Result<AdParameters> {
    let raw: RawAdParameters = serde_json::from_str(json)?;

    let overlays = raw
        .overlays
        .iter()
        .map(|overlay| Url::parse(overlay))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let videos = raw
        .videos
        .into_iter()
        .map(|video| {
            Ok(MediaSource {
                url: Url::parse(&video.url)?,
                mime_type: video.mimetype,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Parsed AdParameters: {} overlay(s), {} video(s)",
        overlays.len(),
        videos.len()
    );

    Ok(AdParameters { overlays, videos })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMETERS: &str = r#"{
        "overlays": ["https://cdn.example.com/banner.png", "https://cdn.example.com/close.png"],
        "videos": [
            {"url": "https://cdn.example.com/ad.webm", "mimetype": "video/webm"},
            {"url": "https://cdn.example.com/ad.mp4", "mimeType": "video/mp4"}
        ]
    }"#;

    #[test]
    fn test_parse_preserves_order() {
        let parameters = parse_ad_parameters(PARAMETERS).unwrap();

        assert_eq!(parameters.overlays.len(), 2);
        assert_eq!(parameters.overlays[0].as_str(), "https://cdn.example.com/banner.png");
        assert_eq!(parameters.overlays[1].as_str(), "https://cdn.example.com/close.png");

        assert_eq!(parameters.videos.len(), 2);
        assert_eq!(parameters.videos[0].mime_type, "video/webm");
        assert_eq!(parameters.videos[1].mime_type, "video/mp4");
        assert_eq!(parameters.videos[1].url.as_str(), "https://cdn.example.com/ad.mp4");
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let parameters = parse_ad_parameters("{}").unwrap();
        assert!(parameters.overlays.is_empty());
        assert!(parameters.videos.is_empty());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            parse_ad_parameters("{\"overlays\": ["),
            Err(VpaidError::JsonError(_))
        ));
    }

    #[test]
    fn test_relative_url_is_rejected() {
        let result = parse_ad_parameters(r#"{"overlays": ["banner.png"]}"#);
        assert!(matches!(result, Err(VpaidError::UrlError(_))));
    }

    #[test]
    fn test_video_without_mime_type_is_rejected() {
        let result = parse_ad_parameters(r#"{"videos": [{"url": "https://cdn.example.com/a.mp4"}]}"#);
        assert!(matches!(result, Err(VpaidError::JsonError(_))));
    }

    #[test]
    fn test_creative_without_ad_parameters() {
        let creative = parse_creative_data("{}").unwrap();
        match parse_creative_parameters(&creative) {
            Err(VpaidError::MissingField(field)) => assert_eq!(field, "AdParameters"),
            other => panic!("expected missing field, got {:?}", other),
        }
    }

    #[test]
    fn test_creative_data_round_trips_through_host_json() {
        let host_json = serde_json::json!({ "AdParameters": PARAMETERS }).to_string();
        let creative = parse_creative_data(&host_json).unwrap();
        let parameters = parse_creative_parameters(&creative).unwrap();
        assert_eq!(parameters.videos.len(), 2);
    }
}
