//! Flattening of raw grocery-search responses into tabular rows.
//!
//! A response nests products as `results[] → search_result.aisles[] →
//! products[]`. [`extract_rows`] walks that tree and emits one [`Row`] per
//! product, reading every row field through [`lookup`] so a missing key only
//! nulls out the field it belongs to.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Date format stored in [`Row::date`].
pub const ROW_DATE_FORMAT: &str = "%d-%m-%Y";

/// One product seen in one aisle of one store's search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub date: String,
    pub aisle_name: Option<String>,
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub package: Option<String>,
    pub store_name: Option<String>,
    pub store_city: Option<String>,
    pub search_term: Option<String>,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    /// A field that is iterated over holds something other than an array.
    #[error("expected `{path}` to be an array, found {found}")]
    NotASequence { path: String, found: &'static str },
    /// A whole response is something other than a JSON object.
    #[error("expected response {index} to be an object, found {found}")]
    NotAnObject { index: usize, found: &'static str },
}

/// Follows `path` through nested objects.
///
/// Returns `None` as soon as a key is missing or an intermediate value is not
/// an object.
#[must_use]
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// Flattens `responses` into rows dated today (local time).
///
/// # Errors
///
/// Returns [`ExtractError::NotAnObject`] if a response is not a JSON object,
/// or [`ExtractError::NotASequence`] if `results`, `aisles`, or `products` is
/// present but not an array.
pub fn extract_rows(responses: &[Value]) -> Result<Vec<Row>, ExtractError> {
    extract_rows_on(Local::now().date_naive(), responses)
}

/// Flattens `responses` into rows stamped with `date`.
///
/// Rows keep input order: response, then result, then aisle, then product.
///
/// # Errors
///
/// Returns [`ExtractError::NotAnObject`] if a response is not a JSON object,
/// or [`ExtractError::NotASequence`] if `results`, `aisles`, or `products` is
/// present but not an array.
pub fn extract_rows_on(date: NaiveDate, responses: &[Value]) -> Result<Vec<Row>, ExtractError> {
    let date = date.format(ROW_DATE_FORMAT).to_string();
    let mut rows = Vec::new();

    for (index, response) in responses.iter().enumerate() {
        if !response.is_object() {
            return Err(ExtractError::NotAnObject {
                index,
                found: kind_of(response),
            });
        }
        for result in sequence_at(response, &["results"])? {
            for aisle in sequence_at(result, &["search_result", "aisles"])? {
                for product in sequence_at(aisle, &["products"])? {
                    rows.push(build_row(&date, result, aisle, product));
                }
            }
        }
    }

    Ok(rows)
}

fn build_row(date: &str, result: &Value, aisle: &Value, product: &Value) -> Row {
    Row {
        date: date.to_owned(),
        aisle_name: text_at(aisle, &["aisle_name"]),
        product_name: text_at(product, &["name"]),
        brand: text_at(product, &["brand", "name"]),
        price: number_at(product, &["pricing", "price", "amount"]),
        package: text_at(product, &["package"]),
        store_name: text_at(result, &["store", "name"]),
        store_city: text_at(result, &["store", "closest_branch", "city"]),
        search_term: text_at(result, &["search_result", "search_term"]),
    }
}

/// Absent and `null` both read as an empty sequence.
fn sequence_at<'a>(value: &'a Value, path: &[&str]) -> Result<&'a [Value], ExtractError> {
    match lookup(value, path) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(ExtractError::NotASequence {
            path: path.join("."),
            found: kind_of(other),
        }),
    }
}

fn text_at(value: &Value, path: &[&str]) -> Option<String> {
    match lookup(value, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn number_at(value: &Value, path: &[&str]) -> Option<f64> {
    match lookup(value, path)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "rows_test.rs"]
mod tests;
