/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Caller-supplied parameter bag. Values are JSON-tagged
/// (string, number, bool, object, array, null); keys iterate in sorted order.
pub type ParamMap = serde_json::Map<String, serde_json::Value>;

/// Header bag: header values are always plain strings
pub type HeaderMap = BTreeMap<String, String>;

/// Current wall-clock time as epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// HTTP methods an interface definition may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Methods whose definitions must declare a post type
    pub fn requires_post_type(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            other => Err(format!("unknown HTTP method: {}", other)),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body encoding for non-GET executions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostType {
    #[serde(rename = "application/json")]
    Json,
    #[serde(rename = "application/x-www-form-urlencoded")]
    Form,
}

impl PostType {
    pub fn content_type(&self) -> &'static str {
        match self {
            PostType::Json => "application/json",
            PostType::Form => "application/x-www-form-urlencoded",
        }
    }

    /// Unknown or missing encodings fall back to JSON
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("application/x-www-form-urlencoded") => PostType::Form,
            _ => PostType::Json,
        }
    }
}

/// Where a declared parameter travels in the outbound request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamLocation {
    #[serde(rename = "URL_PARAM")]
    Url,
    #[serde(rename = "HEADER_PARAM")]
    Header,
    #[default]
    #[serde(rename = "BODY_PARAM")]
    Body,
}

impl ParamLocation {
    pub fn label(&self) -> &'static str {
        match self {
            ParamLocation::Url => "URL",
            ParamLocation::Header => "Header",
            ParamLocation::Body => "Body",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    String,
    Integer,
    Long,
    Double,
    Boolean,
    Date,
    Datetime,
    Json,
    /// Structured object: string values are parsed as JSON before invocation
    JsonObject,
    Array,
    Text,
    Xml,
    Html,
    Css,
    Javascript,
    Typescript,
    Java,
    Kotlin,
    Sql,
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputType {
    Text,
    Select,
    MultiSelect,
    Date,
    Datetime,
    Number,
    Textarea,
    Code,
    Password,
    Email,
    Url,
}

/// Deployment tag carried by an interface definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterfaceEnvironment {
    Test,
    Production,
}

impl InterfaceEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceEnvironment::Test => "TEST",
            InterfaceEnvironment::Production => "PRODUCTION",
        }
    }
}

/// Soft-delete lifecycle shared by admin entities. `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Active,
    Inactive,
    Deleted,
}

impl EntityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Active => "active",
            EntityStatus::Inactive => "inactive",
            EntityStatus::Deleted => "deleted",
        }
    }
}

impl FromStr for EntityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EntityStatus::Active),
            "inactive" => Ok(EntityStatus::Inactive),
            "deleted" => Ok(EntityStatus::Deleted),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_methods_case_insensitively() {
        assert_eq!("post".parse::<HttpMethod>(), Ok(HttpMethod::Post));
        assert_eq!(" Patch ".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert!("TRACE".parse::<HttpMethod>().is_err());
        assert!(HttpMethod::Put.requires_post_type());
        assert!(!HttpMethod::Get.requires_post_type());
    }

    #[test]
    fn wire_codes_match_stored_definitions() {
        assert_eq!(serde_json::to_value(ParamLocation::Header).unwrap(), "HEADER_PARAM");
        assert_eq!(serde_json::to_value(DataType::JsonObject).unwrap(), "JSON_OBJECT");
        assert_eq!(serde_json::to_value(InputType::MultiSelect).unwrap(), "MULTI_SELECT");
        assert_eq!(
            serde_json::to_value(PostType::Form).unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(PostType::from_code(Some("text/plain")), PostType::Json);
        assert_eq!(PostType::from_code(None), PostType::Json);
    }
}
