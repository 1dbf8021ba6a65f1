//! Video posts shown in the trending list.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::document::{Document, DocumentError};
use super::id::DocumentId;

/// A video post from the videos collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoPost {
    /// Document ID of the post.
    #[serde(rename = "$id")]
    pub id: DocumentId,
    pub title: String,
    pub thumbnail: String,
    #[serde(default)]
    pub prompt: String,
    pub video: String,
    /// Profile document of the creator, when the relationship is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<DocumentId>,
}

impl TryFrom<&Document> for VideoPost {
    type Error = DocumentError;

    fn try_from(doc: &Document) -> Result<Self, Self::Error> {
        // The relationship comes back either as a bare ID or expanded into
        // the creator's profile document.
        let creator = match doc.field("creator") {
            None => None,
            Some(Value::String(id)) => Some(DocumentId::new(id.as_str())),
            Some(Value::Object(obj)) => {
                let id = obj
                    .get("$id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| doc.invalid("creator", "expanded creator has no $id"))?;
                Some(DocumentId::new(id))
            }
            Some(other) => {
                return Err(doc.invalid("creator", format!("unexpected value {other}")));
            }
        };

        Ok(Self {
            id: doc.id.clone(),
            title: doc.required_str("title")?.to_owned(),
            thumbnail: doc.required_str("thumbnail")?.to_owned(),
            prompt: doc.optional_str("prompt").unwrap_or_default().to_owned(),
            video: doc.required_str("video")?.to_owned(),
            creator,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: serde_json::Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_post_with_expanded_creator() {
        let document = doc(json!({
            "$id": "v1",
            "title": "Sunrise",
            "thumbnail": "https://cdn.example.com/t.png",
            "prompt": "a sunrise over the sea",
            "video": "https://cdn.example.com/v.mp4",
            "creator": { "$id": "p1", "username": "alice" }
        }));

        let post = VideoPost::try_from(&document).unwrap();
        assert_eq!(post.title, "Sunrise");
        assert_eq!(post.creator, Some(DocumentId::new("p1")));
    }

    #[test]
    fn test_post_with_creator_id_and_no_prompt() {
        let document = doc(json!({
            "$id": "v1",
            "title": "Sunrise",
            "thumbnail": "t",
            "video": "v",
            "creator": "p1"
        }));

        let post = VideoPost::try_from(&document).unwrap();
        assert_eq!(post.prompt, "");
        assert_eq!(post.creator, Some(DocumentId::new("p1")));
    }

    #[test]
    fn test_post_missing_video() {
        let document = doc(json!({ "$id": "v1", "title": "t", "thumbnail": "t" }));
        assert!(matches!(
            VideoPost::try_from(&document),
            Err(DocumentError::MissingField { field: "video", .. })
        ));
    }

    #[test]
    fn test_post_with_bad_creator() {
        let document = doc(json!({
            "$id": "v1", "title": "t", "thumbnail": "t", "video": "v", "creator": 7
        }));
        assert!(matches!(
            VideoPost::try_from(&document),
            Err(DocumentError::InvalidField { field: "creator", .. })
        ));
    }
}
