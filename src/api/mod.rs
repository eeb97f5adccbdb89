//! Backend interaction layer: attitude record types and the REST client.
//!
//! The backend is the chat-bot plugin's own HTTP surface; this module only
//! speaks its wire contract and never touches UI state. All mutations are
//! confirmed by a full list reload driven from the application layer.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::listview::{Record, SortValue};

const LEGACY_USER_PREFIX: &str = "user_";
const LEGACY_GROUP_PREFIX: &str = "group_";

/// Attitude keywords that count as negative when the score is not numeric.
const NEGATIVE_KEYWORDS: [&str; 4] = ["bad", "dislike", "negative", "angry"];

/// Attitude record the backend keeps for a single user.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct UserAttitude {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub attitude: Option<String>,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub other: Option<String>,
}

/// Attitude record the backend keeps for a chat group.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GroupAttitude {
    pub group_id: String,
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub attitude: Option<String>,
    #[serde(default)]
    pub other: Option<String>,
}

impl UserAttitude {
    /// Identifier for display: the legacy `user_` prefix is stripped, the
    /// underlying value stays untouched for search and comparisons.
    pub fn display_id(&self) -> &str {
        self.user_id
            .strip_prefix(LEGACY_USER_PREFIX)
            .unwrap_or(&self.user_id)
    }

    /// Username, or a deterministic placeholder derived from the id.
    pub fn display_name(&self) -> String {
        match self.username.as_deref().filter(|s| !s.is_empty()) {
            Some(name) => name.to_string(),
            None => placeholder_name(LEGACY_USER_PREFIX, &self.user_id),
        }
    }

    /// Nickname, falling back to the username, then a dash.
    pub fn display_nickname(&self) -> String {
        self.nickname
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.username.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("-")
            .to_string()
    }

    pub fn attitude_value(&self) -> Option<f64> {
        parse_attitude(self.attitude.as_deref())
    }

    pub fn is_negative(&self) -> bool {
        attitude_is_negative(self.attitude.as_deref())
    }
}

impl GroupAttitude {
    pub fn display_id(&self) -> &str {
        self.group_id
            .strip_prefix(LEGACY_GROUP_PREFIX)
            .unwrap_or(&self.group_id)
    }

    pub fn display_name(&self) -> String {
        match self.channel_name.as_deref().filter(|s| !s.is_empty()) {
            Some(name) => name.to_string(),
            None => placeholder_name(LEGACY_GROUP_PREFIX, &self.group_id),
        }
    }

    pub fn attitude_value(&self) -> Option<f64> {
        parse_attitude(self.attitude.as_deref())
    }

    pub fn is_negative(&self) -> bool {
        attitude_is_negative(self.attitude.as_deref())
    }
}

fn placeholder_name(prefix: &str, raw_id: &str) -> String {
    let head: String = raw_id.chars().take(5).collect();
    format!("{}{}", prefix, head)
}

fn parse_attitude(attitude: Option<&str>) -> Option<f64> {
    attitude.and_then(|s| s.trim().parse::<f64>().ok())
}

/// Negative when the score parses below zero, or when a free-text score
/// contains one of the known negative keywords.
fn attitude_is_negative(attitude: Option<&str>) -> bool {
    let Some(raw) = attitude else { return false };
    match parse_attitude(Some(raw)) {
        Some(v) => v < 0.0,
        None => {
            let lower = raw.to_lowercase();
            NEGATIVE_KEYWORDS.iter().any(|k| lower.contains(k))
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UserSortKey {
    Id,
    Name,
    Nickname,
    Attitude,
    Relationship,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GroupSortKey {
    Id,
    Name,
    Attitude,
}

/// Export row for a user record; absent fields become explicit `null`.
#[derive(Serialize, Debug)]
pub struct UserExport {
    pub user_id: String,
    pub username: Option<String>,
    pub nickname: Option<String>,
    pub attitude: Option<String>,
    pub relationship: Option<String>,
    pub other: Option<String>,
}

/// Export row for a group record; the name has the placeholder applied.
#[derive(Serialize, Debug)]
pub struct GroupExport {
    pub id: String,
    pub name: String,
    pub attitude: Option<String>,
    pub other: Option<String>,
}

impl Record for UserAttitude {
    const KIND: &'static str = "users";
    type SortKey = UserSortKey;
    type Export = UserExport;

    fn raw_id(&self) -> &str {
        &self.user_id
    }

    fn search_haystacks(&self) -> Vec<String> {
        vec![
            self.user_id.to_lowercase(),
            self.display_name().to_lowercase(),
            self.nickname.clone().unwrap_or_default().to_lowercase(),
            self.relationship.clone().unwrap_or_default().to_lowercase(),
        ]
    }

    fn sort_value(&self, key: UserSortKey) -> SortValue {
        match key {
            UserSortKey::Id => SortValue::Text(self.user_id.clone()),
            UserSortKey::Name => SortValue::Text(self.display_name()),
            UserSortKey::Nickname => SortValue::Text(self.display_nickname()),
            UserSortKey::Attitude => {
                SortValue::Number(self.attitude_value().unwrap_or(f64::NEG_INFINITY))
            }
            UserSortKey::Relationship => {
                SortValue::Text(self.relationship.clone().unwrap_or_default())
            }
        }
    }

    fn to_export(&self) -> UserExport {
        UserExport {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            nickname: self.nickname.clone(),
            attitude: self.attitude.clone(),
            relationship: self.relationship.clone(),
            other: self.other.clone(),
        }
    }
}

impl Record for GroupAttitude {
    const KIND: &'static str = "groups";
    type SortKey = GroupSortKey;
    type Export = GroupExport;

    fn raw_id(&self) -> &str {
        &self.group_id
    }

    fn search_haystacks(&self) -> Vec<String> {
        vec![
            self.display_id().to_lowercase(),
            self.display_name().to_lowercase(),
        ]
    }

    fn sort_value(&self, key: GroupSortKey) -> SortValue {
        match key {
            GroupSortKey::Id => SortValue::Text(self.group_id.clone()),
            GroupSortKey::Name => SortValue::Text(self.display_name()),
            GroupSortKey::Attitude => {
                SortValue::Number(self.attitude_value().unwrap_or(f64::NEG_INFINITY))
            }
        }
    }

    fn to_export(&self) -> GroupExport {
        GroupExport {
            id: self.group_id.clone(),
            name: self.display_name(),
            attitude: self.attitude.clone(),
            other: self.other.clone(),
        }
    }
}

/// PUT body for a user record. The user path sends every text field even when
/// the operator left it empty; only an empty attitude is omitted.
#[derive(Serialize, Clone, Debug)]
pub struct UserAttitudeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attitude: Option<String>,
    pub relationship: String,
    pub other: String,
    pub username: String,
    pub nickname: String,
}

/// PUT body for a group record. Empty optional fields are omitted entirely.
#[derive(Serialize, Clone, Debug)]
pub struct GroupAttitudeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attitude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Error body shapes the backend produces: FastAPI `detail`, or a
/// `message` field on soft failures.
#[derive(Deserialize, Debug, Default)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Failure taxonomy for one user-triggered action. Every failure is terminal:
/// no retries, and the in-memory snapshot is left untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response.
    Network(String),
    /// The backend answered with a non-2xx status or an explicit failure.
    Backend {
        status: Option<u16>,
        message: String,
    },
    /// Rejected client-side before any network call.
    Validation(String),
}

impl ApiError {
    fn network(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "network error: {}", msg),
            ApiError::Backend { status: Some(s), message } => {
                write!(f, "backend error ({}): {}", s, message)
            }
            ApiError::Backend { status: None, message } => write!(f, "{}", message),
            ApiError::Validation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

fn extract_backend_message(body: &[u8]) -> String {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    parsed
        .detail
        .or(parsed.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "unknown error".to_string())
}

/// HTTP client for the plugin's REST surface.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_users(&self) -> Result<Vec<UserAttitude>, ApiError> {
        let url = format!("{}/users", self.base_url);
        debug!("GET {}", url);
        let resp = self.http.get(&url).send().await.map_err(ApiError::network)?;
        let users: Vec<UserAttitude> = parse_json(resp).await?;
        info!("fetched {} user attitude records", users.len());
        Ok(users)
    }

    pub async fn list_groups(&self) -> Result<Vec<GroupAttitude>, ApiError> {
        let url = format!("{}/groups", self.base_url);
        debug!("GET {}", url);
        let resp = self.http.get(&url).send().await.map_err(ApiError::network)?;
        let groups: Vec<GroupAttitude> = parse_json(resp).await?;
        info!("fetched {} group attitude records", groups.len());
        Ok(groups)
    }

    pub async fn update_user(
        &self,
        user_id: &str,
        update: &UserAttitudeUpdate,
    ) -> Result<UserAttitude, ApiError> {
        let url = format!("{}/users/{}", self.base_url, user_id);
        debug!("PUT {}", url);
        let resp = self
            .http
            .put(&url)
            .json(update)
            .send()
            .await
            .map_err(ApiError::network)?;
        let user: UserAttitude = parse_json(resp).await?;
        info!("updated attitude for user {}", user_id);
        Ok(user)
    }

    pub async fn update_group(
        &self,
        group_id: &str,
        update: &GroupAttitudeUpdate,
    ) -> Result<GroupAttitude, ApiError> {
        let url = format!("{}/groups/{}", self.base_url, group_id);
        debug!("PUT {}", url);
        let resp = self
            .http
            .put(&url)
            .json(update)
            .send()
            .await
            .map_err(ApiError::network)?;
        let group: GroupAttitude = parse_json(resp).await?;
        info!("updated attitude for group {}", group_id);
        Ok(group)
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<DeleteResponse, ApiError> {
        let url = format!("{}/users/{}", self.base_url, user_id);
        debug!("DELETE {}", url);
        let resp = self.http.delete(&url).send().await.map_err(ApiError::network)?;
        let deleted: DeleteResponse = parse_json(resp).await?;
        confirm_delete(deleted)
    }

    pub async fn delete_group(&self, group_id: &str) -> Result<DeleteResponse, ApiError> {
        let url = format!("{}/groups/{}", self.base_url, group_id);
        debug!("DELETE {}", url);
        let resp = self.http.delete(&url).send().await.map_err(ApiError::network)?;
        let deleted: DeleteResponse = parse_json(resp).await?;
        confirm_delete(deleted)
    }
}

/// The delete endpoints can answer 200 with `success: false`; that still
/// counts as a backend-reported failure.
fn confirm_delete(resp: DeleteResponse) -> Result<DeleteResponse, ApiError> {
    if resp.success {
        Ok(resp)
    } else {
        let message = if resp.message.is_empty() {
            "unknown error".to_string()
        } else {
            resp.message
        };
        error!("delete rejected by backend: {}", message);
        Err(ApiError::Backend { status: None, message })
    }
}

async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.bytes().await.map_err(ApiError::network)?;
    if !status.is_success() {
        let message = extract_backend_message(&body);
        error!("backend returned {}: {}", status, message);
        return Err(ApiError::Backend {
            status: Some(status.as_u16()),
            message,
        });
    }
    serde_json::from_slice(&body).map_err(|e| ApiError::Backend {
        status: Some(status.as_u16()),
        message: format!("malformed response: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserAttitude {
        UserAttitude {
            user_id: id.to_string(),
            username: None,
            nickname: None,
            attitude: None,
            relationship: None,
            other: None,
        }
    }

    #[test]
    fn legacy_prefix_is_stripped_for_display_only() {
        let u = user("user_123456");
        assert_eq!(u.display_id(), "123456");
        assert_eq!(u.raw_id(), "user_123456");

        let g = GroupAttitude {
            group_id: "group_777".to_string(),
            channel_name: None,
            attitude: None,
            other: None,
        };
        assert_eq!(g.display_id(), "777");
    }

    #[test]
    fn placeholder_names_derive_from_truncated_id() {
        let u = user("1234567890");
        assert_eq!(u.display_name(), "user_12345");

        let g = GroupAttitude {
            group_id: "42".to_string(),
            channel_name: None,
            attitude: None,
            other: None,
        };
        assert_eq!(g.display_name(), "group_42");
    }

    #[test]
    fn attitude_parsing_and_negativity() {
        let mut u = user("1");
        assert_eq!(u.attitude_value(), None);
        assert!(!u.is_negative());

        u.attitude = Some("-0.5".to_string());
        assert_eq!(u.attitude_value(), Some(-0.5));
        assert!(u.is_negative());

        u.attitude = Some("somewhat angry".to_string());
        assert_eq!(u.attitude_value(), None);
        assert!(u.is_negative());

        u.attitude = Some("cheerful".to_string());
        assert!(!u.is_negative());
    }

    #[test]
    fn unparseable_attitude_sorts_as_minimum() {
        let mut u = user("1");
        u.attitude = Some("grumpy".to_string());
        assert_eq!(
            u.sort_value(UserSortKey::Attitude),
            SortValue::Number(f64::NEG_INFINITY)
        );
    }

    #[test]
    fn user_update_sends_empty_fields_but_omits_empty_attitude() {
        let update = UserAttitudeUpdate {
            attitude: None,
            relationship: String::new(),
            other: String::new(),
            username: String::new(),
            nickname: String::new(),
        };
        let value = serde_json::to_value(&update).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("attitude"));
        assert_eq!(obj["relationship"], "");
        assert_eq!(obj["username"], "");
    }

    #[test]
    fn group_update_omits_empty_optional_fields() {
        let update = GroupAttitudeUpdate {
            attitude: None,
            other: None,
        };
        let value = serde_json::to_value(&update).unwrap();
        assert!(value.as_object().unwrap().is_empty());

        let update = GroupAttitudeUpdate {
            attitude: Some("0.5".to_string()),
            other: None,
        };
        let value = serde_json::to_value(&update).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["attitude"], "0.5");
    }

    #[test]
    fn export_rows_carry_explicit_nulls() {
        let u = user("42");
        let value = serde_json::to_value(u.to_export()).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj["attitude"].is_null());
        assert!(obj["username"].is_null());
        assert!(obj["relationship"].is_null());
        assert_eq!(obj["user_id"], "42");
    }

    #[test]
    fn backend_message_extraction_prefers_detail() {
        assert_eq!(
            extract_backend_message(br#"{"detail": "user 42 not found"}"#),
            "user 42 not found"
        );
        assert_eq!(
            extract_backend_message(br#"{"message": "nope"}"#),
            "nope"
        );
        assert_eq!(extract_backend_message(b"not json"), "unknown error");
        assert_eq!(extract_backend_message(b"{}"), "unknown error");
    }

    #[test]
    fn soft_delete_failure_maps_to_backend_error() {
        let err = confirm_delete(DeleteResponse {
            success: false,
            message: "record missing".to_string(),
        })
        .unwrap_err();
        assert_eq!(
            err,
            ApiError::Backend {
                status: None,
                message: "record missing".to_string()
            }
        );

        let ok = confirm_delete(DeleteResponse {
            success: true,
            message: "deleted".to_string(),
        });
        assert!(ok.is_ok());
    }
}
