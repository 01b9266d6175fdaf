use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum HikeLogError {
    /// Every candidate record was malformed or rejected.
    #[error("no valid data points found")]
    NoValidData,
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Why a decoded object was not accepted as a [`Record`](crate::record::Record).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("value is not an object")]
    NotAnObject,
    #[error("missing or non-numeric '{0}'")]
    MissingCoordinate(&'static str),
    #[error("sentinel (0, 0) coordinate")]
    NoFix,
}

/// A fragment that could not be decoded and was left out of the result.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("skipping malformed object: {summary}... ({reason})")]
pub struct SkippedFragment {
    /// Leading characters of the fragment text.
    pub summary: String,
    pub reason: String,
}

impl From<HikeLogError> for JsValue {
    fn from(e: HikeLogError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
