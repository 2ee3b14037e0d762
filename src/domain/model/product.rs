//! The `Product` record and its validating constructor.
//!
//! A `Product` can only be obtained through [`create_product`], so holding one
//! is proof that every field passed validation.

use super::error::{ProductError, ProductField};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// A validated catalogue product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: String,
    name: String,
    quantity: u64,
    loan_days: u64,
    description: String,
    /// ISO-8601 timestamp of the last write.
    #[serde(serialize_with = "serialize_timestamp")]
    #[schema(value_type = String, format = DateTime)]
    updated_at: DateTime<Utc>,
}

impl Product {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn loan_days(&self) -> u64 {
        self.loan_days
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Raw, unvalidated product fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateProductParams {
    pub id: String,
    pub name: String,
    pub quantity: i128,
    pub loan_days: i128,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

/// Where `CreateProductParams::from_json` takes the record's timestamp from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatedAtSource {
    /// Stamp the record with this instant; any `updatedAt` in the input is ignored.
    Supplied(DateTime<Utc>),
    /// Read the `updatedAt` string carried by the input itself.
    Field,
}

impl CreateProductParams {
    /// Reads product fields from an untrusted JSON object.
    ///
    /// Type checks are folded into the per-field rules so the first failing
    /// field is reported in the same order `create_product` uses.
    pub fn from_json(value: &JsonValue, updated_at: UpdatedAtSource) -> Result<Self, ProductError> {
        let id = text_field(value, ProductField::Id)?;
        let name = text_field(value, ProductField::Name)?;
        let quantity = count_field(value, ProductField::Quantity)?;
        let loan_days = count_field(value, ProductField::LoanDays)?;
        let description = text_field(value, ProductField::Description)?;
        let updated_at = match updated_at {
            UpdatedAtSource::Supplied(ts) => ts,
            UpdatedAtSource::Field => value
                .get(ProductField::UpdatedAt.as_str())
                .and_then(JsonValue::as_str)
                .and_then(parse_timestamp)
                .ok_or_else(|| ProductError::new(ProductField::UpdatedAt))?,
        };

        Ok(Self {
            id,
            name,
            quantity,
            loan_days,
            description,
            updated_at,
        })
    }
}

/// Validates `params` and builds a `Product` carrying exactly the supplied values.
///
/// Fields are checked in the order id, name, quantity, loanDays, description;
/// the first failure is returned.
pub fn create_product(params: CreateProductParams) -> Result<Product, ProductError> {
    check_text(ProductField::Id, &params.id)?;
    check_text(ProductField::Name, &params.name)?;
    let quantity = check_count(ProductField::Quantity, params.quantity)?;
    let loan_days = check_count(ProductField::LoanDays, params.loan_days)?;
    check_text(ProductField::Description, &params.description)?;

    Ok(Product {
        id: params.id,
        name: params.name,
        quantity,
        loan_days,
        description: params.description,
        updated_at: params.updated_at,
    })
}

/// Parses an ISO-8601 instant (RFC 3339, or a bare `YYYY-MM-DD` date taken as UTC midnight).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Formats an instant as RFC 3339 UTC with only the fractional digits it needs,
/// so `parse_timestamp(format_timestamp(ts)) == Some(ts)`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(ts))
}

fn check_text(field: ProductField, value: &str) -> Result<(), ProductError> {
    if value.trim().is_empty() {
        return Err(ProductError::new(field));
    }
    Ok(())
}

fn check_count(field: ProductField, value: i128) -> Result<u64, ProductError> {
    u64::try_from(value).map_err(|_| ProductError::new(field))
}

fn text_field(value: &JsonValue, field: ProductField) -> Result<String, ProductError> {
    match value.get(field.as_str()).and_then(JsonValue::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(ProductError::new(field)),
    }
}

fn count_field(value: &JsonValue, field: ProductField) -> Result<i128, ProductError> {
    let n = value
        .get(field.as_str())
        .and_then(integral)
        .ok_or_else(|| ProductError::new(field))?;
    check_count(field, n)?;
    Ok(n)
}

/// JSON numbers with an integral value, including `25.0`.
fn integral(value: &JsonValue) -> Option<i128> {
    if let Some(n) = value.as_u64() {
        return Some(i128::from(n));
    }
    if let Some(n) = value.as_i64() {
        return Some(i128::from(n));
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i128::MIN as f64 && f < i128::MAX as f64 {
        return Some(f as i128);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn params() -> CreateProductParams {
        CreateProductParams {
            id: "prod-123".to_string(),
            name: "Test Product".to_string(),
            quantity: 25,
            loan_days: 2,
            description: "A great test product".to_string(),
            updated_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn creates_product_with_supplied_fields() {
        let product = create_product(params()).unwrap();

        assert_eq!(product.id(), "prod-123");
        assert_eq!(product.name(), "Test Product");
        assert_eq!(product.quantity(), 25);
        assert_eq!(product.loan_days(), 2);
        assert_eq!(product.description(), "A great test product");
        assert_eq!(product.updated_at(), Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn keeps_text_untrimmed() {
        let mut p = params();
        p.name = "  Padded  ".to_string();
        assert_eq!(create_product(p).unwrap().name(), "  Padded  ");
    }

    #[test]
    fn zero_quantity_and_loan_days_are_valid() {
        let mut p = params();
        p.quantity = 0;
        p.loan_days = 0;
        let product = create_product(p).unwrap();
        assert_eq!(product.quantity(), 0);
        assert_eq!(product.loan_days(), 0);
    }

    #[test]
    fn rejects_whitespace_id() {
        let mut p = params();
        p.id = "   ".to_string();
        let err = create_product(p).unwrap_err();
        assert_eq!(err.field, ProductField::Id);
        assert_eq!(err.message, "Product id must be a non-empty string.");
    }

    #[test]
    fn rejects_empty_id() {
        let mut p = params();
        p.id = String::new();
        assert_eq!(create_product(p).unwrap_err().field, ProductField::Id);
    }

    #[test]
    fn rejects_negative_counts() {
        let mut p = params();
        p.quantity = -1;
        assert_eq!(create_product(p).unwrap_err().field, ProductField::Quantity);

        let mut p = params();
        p.loan_days = -3;
        let err = create_product(p).unwrap_err();
        assert_eq!(err.field, ProductField::LoanDays);
        assert_eq!(err.to_string(), "Product loanDays must be a non-negative integer.");
    }

    #[test]
    fn rejects_blank_name_and_description() {
        let mut p = params();
        p.name = "\t".to_string();
        assert_eq!(create_product(p).unwrap_err().field, ProductField::Name);

        let mut p = params();
        p.description = " ".to_string();
        assert_eq!(create_product(p).unwrap_err().field, ProductField::Description);
    }

    #[test]
    fn reports_first_failing_field() {
        let mut p = params();
        p.id = " ".to_string();
        p.name = String::new();
        p.quantity = -1;
        assert_eq!(create_product(p).unwrap_err().field, ProductField::Id);

        let mut p = params();
        p.quantity = -1;
        p.description = String::new();
        assert_eq!(create_product(p).unwrap_err().field, ProductField::Quantity);
    }

    #[test]
    fn from_json_reads_body_and_stamps_time() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        let body = json!({
            "id": "prod-123",
            "name": "Test Product",
            "quantity": 25,
            "loanDays": 2.0,
            "description": "A great test product",
            "updatedAt": "1999-01-01T00:00:00Z"
        });

        let params = CreateProductParams::from_json(&body, UpdatedAtSource::Supplied(now)).unwrap();
        assert_eq!(params.loan_days, 2);
        assert_eq!(params.updated_at, now);
    }

    #[test]
    fn counts_beyond_i64_are_accepted() {
        let body = json!({
            "id": "a", "name": "b", "quantity": 10_000_000_000_000_000_000u64,
            "loanDays": u64::MAX, "description": "c"
        });
        let params = CreateProductParams::from_json(&body, UpdatedAtSource::Supplied(Utc::now())).unwrap();
        let product = create_product(params).unwrap();
        assert_eq!(product.quantity(), 10_000_000_000_000_000_000);
        assert_eq!(product.loan_days(), u64::MAX);

        let mut body = body;
        body["quantity"] = json!(1e20);
        let err = CreateProductParams::from_json(&body, UpdatedAtSource::Supplied(Utc::now())).unwrap_err();
        assert_eq!(err.field, ProductField::Quantity);
    }

    #[test]
    fn from_json_rejects_non_integer_counts() {
        let now = Utc::now();
        let base = json!({
            "id": "a", "name": "b", "quantity": 1, "loanDays": 1, "description": "c"
        });

        for bad in [json!(2.5), json!("3"), JsonValue::Null, json!(-1)] {
            let mut body = base.clone();
            body["quantity"] = bad.clone();
            let err = CreateProductParams::from_json(&body, UpdatedAtSource::Supplied(now)).unwrap_err();
            assert_eq!(err.field, ProductField::Quantity, "quantity = {bad}");

            let mut body = base.clone();
            body["loanDays"] = bad.clone();
            let err = CreateProductParams::from_json(&body, UpdatedAtSource::Supplied(now)).unwrap_err();
            assert_eq!(err.field, ProductField::LoanDays, "loanDays = {bad}");
        }
    }

    #[test]
    fn from_json_keeps_field_order_across_type_errors() {
        let body = json!({ "id": " ", "name": "b", "quantity": "lots", "loanDays": 1, "description": "c" });
        let err = CreateProductParams::from_json(&body, UpdatedAtSource::Supplied(Utc::now())).unwrap_err();
        assert_eq!(err.field, ProductField::Id);

        let body = json!({ "id": 42, "name": "b", "quantity": 1, "loanDays": 1, "description": "c" });
        let err = CreateProductParams::from_json(&body, UpdatedAtSource::Supplied(Utc::now())).unwrap_err();
        assert_eq!(err.field, ProductField::Id);
    }

    #[test]
    fn from_json_requires_parseable_updated_at_when_read_from_record() {
        let mut body = json!({
            "id": "a", "name": "b", "quantity": 1, "loanDays": 1, "description": "c",
            "updatedAt": "not a date"
        });
        let err = CreateProductParams::from_json(&body, UpdatedAtSource::Field).unwrap_err();
        assert_eq!(err.field, ProductField::UpdatedAt);

        body["updatedAt"] = json!("2024-01-05T12:00:00Z");
        let params = CreateProductParams::from_json(&body, UpdatedAtSource::Field).unwrap();
        assert_eq!(params.updated_at, Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap());
    }

    #[test]
    fn timestamps_round_trip_through_text() {
        let ts = Utc.timestamp_nanos(1_760_780_000_123_456_789);
        assert_eq!(parse_timestamp(&format_timestamp(&ts)), Some(ts));

        let midnight = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(&midnight), "2025-01-01T00:00:00Z");
        assert_eq!(parse_timestamp("2025-01-01"), Some(midnight));
        assert_eq!(parse_timestamp("garbage"), None);
    }

    #[test]
    fn serializes_with_wire_names() {
        let product = create_product(params()).unwrap();
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "prod-123",
                "name": "Test Product",
                "quantity": 25,
                "loanDays": 2,
                "description": "A great test product",
                "updatedAt": "2025-01-01T00:00:00Z"
            })
        );
    }
}
