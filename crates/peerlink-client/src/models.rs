//! Wire types shared by the Peerlink server and its clients.
//!
//! Field names follow the JSON the REST API has always spoken (`_id`,
//! `githubusername`, `fieldofstudy`, `date`), so existing browser code keeps
//! working against these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Request bodies
// =============================================================================

/// Body of `POST /api/users`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /api/auth`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /api/profiles`
///
/// `skills` is the comma-separated string typed into the profile form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub githubusername: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

/// Body of `PUT /api/profiles/experience`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    /// `null` and a missing field both read as not current
    #[serde(default)]
    pub current: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PUT /api/profiles/education`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationInput {
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub fieldofstudy: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    /// `null` and a missing field both read as not current
    #[serde(default)]
    pub current: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `POST /api/posts` and `POST /api/posts/comment/:id`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextInput {
    #[serde(default)]
    pub text: Option<String>,
}

impl TextInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// The submitted text, empty when absent or `null`
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

impl ExperienceInput {
    pub fn is_current(&self) -> bool {
        self.current.unwrap_or_default()
    }
}

impl EducationInput {
    pub fn is_current(&self) -> bool {
        self.current.unwrap_or_default()
    }
}

// =============================================================================
// Response bodies
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Plain confirmation or error message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub msg: String,
}

impl MessageBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub msg: String,
    pub param: String,
}

impl FieldViolation {
    pub fn new(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: param.into(),
        }
    }
}

/// Error body returned for every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub msg: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldViolation>,
}

impl ErrorBody {
    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            errors: Vec::new(),
        }
    }
}

/// Account as returned by `GET /api/auth` (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

/// User fields joined into profile responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

impl SocialLinks {
    pub fn is_empty(&self) -> bool {
        self.youtube.is_none()
            && self.facebook.is_none()
            && self.twitter.is_none()
            && self.instagram.is_none()
            && self.linkedin.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceView {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub from: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationView {
    #[serde(rename = "_id")]
    pub id: String,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: UserRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub githubusername: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub social: SocialLinks,
    #[serde(default)]
    pub experience: Vec<ExperienceView>,
    #[serde(default)]
    pub education: Vec<EducationView>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeView {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
    pub text: String,
    pub name: String,
    pub avatar: String,
    #[serde(default)]
    pub likes: Vec<LikeView>,
    #[serde(default)]
    pub comments: Vec<CommentView>,
    pub date: DateTime<Utc>,
}

/// Split the comma-separated skills field into trimmed, non-empty entries.
pub fn split_skills(skills: &str) -> Vec<String> {
    skills
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_skills_trims_entries() {
        assert_eq!(split_skills("js, node"), vec!["js", "node"]);
        assert_eq!(split_skills(" rust ,  go,, "), vec!["rust", "go"]);
        assert!(split_skills(" , ").is_empty());
    }

    #[test]
    fn test_error_body_omits_empty_violations() {
        let body = serde_json::to_value(ErrorBody::message("post not found")).unwrap();
        assert_eq!(body, serde_json::json!({ "msg": "post not found" }));
    }

    #[test]
    fn test_profile_input_accepts_partial_form() {
        let input: ProfileInput =
            serde_json::from_str(r#"{"status":"Developer","skills":"js"}"#).unwrap();
        assert_eq!(input.status.as_deref(), Some("Developer"));
        assert!(input.company.is_none());
    }

    #[test]
    fn test_null_fields_read_as_absent() {
        let text: TextInput = serde_json::from_str(r#"{"text":null}"#).unwrap();
        assert_eq!(text.text(), "");

        let entry: ExperienceInput =
            serde_json::from_str(r#"{"title":"Engineer","current":null}"#).unwrap();
        assert!(!entry.is_current());

        let entry: EducationInput = serde_json::from_str(r#"{"current":true}"#).unwrap();
        assert!(entry.is_current());
    }

    #[test]
    fn test_post_view_uses_wire_field_names() {
        let json = serde_json::json!({
            "_id": "p1",
            "user": "u1",
            "text": "hello",
            "name": "Ada",
            "avatar": "//avatar",
            "likes": [{ "_id": "l1", "user": "u2" }],
            "date": "2024-01-01T00:00:00Z"
        });
        let post: PostView = serde_json::from_value(json).unwrap();
        assert_eq!(post.likes[0].user, "u2");
        assert!(post.comments.is_empty());
    }
}
