use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;

use crate::types::{DataType, InputType, ParamLocation, PostType};

/// Status value of an enabled interface
pub const INTERFACE_ENABLED: i32 = 1;
/// Status value of a disabled interface
pub const INTERFACE_DISABLED: i32 = 0;

/// Stored outbound call template (`api_interface` table)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApiInterface {
    pub id: i64,
    pub name: String,
    pub method: String,
    pub url: String,
    pub description: Option<String>,
    pub post_type: Option<String>,
    /// Ordered parameter schema across all locations
    pub params: Json<Vec<ApiParam>>,
    pub status: i32,
    pub environment: Option<String>,
    /// Seconds
    pub timeout: Option<i64>,
    pub value_path: Option<String>,
    pub create_time: i64,
    pub update_time: i64,
}

impl ApiInterface {
    pub fn is_enabled(&self) -> bool {
        self.status == INTERFACE_ENABLED
    }

    pub fn post_type(&self) -> PostType {
        PostType::from_code(self.post_type.as_deref())
    }

    pub fn schema(&self) -> &[ApiParam] {
        &self.params.0
    }

    /// Non-blank extraction path, if one is configured
    pub fn value_path(&self) -> Option<&str> {
        self.value_path.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    pub fn params_at(&self, location: ParamLocation) -> Vec<ApiParam> {
        self.params
            .0
            .iter()
            .filter(|p| p.location == location)
            .cloned()
            .collect()
    }
}

/// One entry of an interface's parameter schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiParam {
    pub name: String,
    #[serde(default, alias = "chineseName")]
    pub display_name: Option<String>,
    #[serde(rename = "paramType", default)]
    pub location: ParamLocation,
    #[serde(default)]
    pub input_type: Option<InputType>,
    #[serde(default)]
    pub data_type: Option<DataType>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub changeable: Option<bool>,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort: Option<i32>,
}

impl ApiParam {
    pub fn is_structured(&self) -> bool {
        self.data_type == Some(DataType::JsonObject)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: Option<String>,
    pub label: Option<String>,
}
