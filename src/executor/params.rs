use serde_json::Value;
use thiserror::Error;

use crate::database::models::ApiParam;
use crate::executor::ExecuteRequest;
use crate::types::ParamLocation;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("{} parameter {name} is required", location.label())]
    Missing {
        location: ParamLocation,
        name: String,
    },
}

/// Returns a copy of `request` with every structured-object parameter that was
/// supplied as a string replaced by its parsed JSON value. Strings that do not
/// parse are kept as they are. Headers are never converted.
///
/// A parameter is only looked up in the map of its declared location: a
/// `JSON_OBJECT` body parameter is parsed in `body_params` but a same-named
/// key in `url_params` is left as text.
pub fn process_params(schema: &[ApiParam], request: &ExecuteRequest) -> ExecuteRequest {
    let mut processed = request.clone();

    for param in schema.iter().filter(|p| p.is_structured()) {
        let target = match param.location {
            ParamLocation::Url => processed.url_params.as_mut(),
            ParamLocation::Body => processed.body_params.as_mut(),
            ParamLocation::Header => None,
        };
        let Some(values) = target else { continue };

        if let Some(Value::String(raw)) = values.get(&param.name) {
            if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
                values.insert(param.name.clone(), parsed);
            }
        }
    }

    processed
}

/// Presence check only: a key mapped to `null` or `""` satisfies the rule.
/// Locations are checked in url, header, body order.
pub fn validate_required(schema: &[ApiParam], request: &ExecuteRequest) -> Result<(), ParamError> {
    for location in [ParamLocation::Url, ParamLocation::Header, ParamLocation::Body] {
        for param in schema
            .iter()
            .filter(|p| p.location == location && p.required)
        {
            let present = match location {
                ParamLocation::Url => request
                    .url_params
                    .as_ref()
                    .map_or(false, |m| m.contains_key(&param.name)),
                ParamLocation::Header => request
                    .headers
                    .as_ref()
                    .map_or(false, |m| m.contains_key(&param.name)),
                ParamLocation::Body => request
                    .body_params
                    .as_ref()
                    .map_or(false, |m| m.contains_key(&param.name)),
            };

            if !present {
                return Err(ParamError::Missing {
                    location,
                    name: param.name.clone(),
                });
            }
        }
    }
    Ok(())
}
