// 📐 Shape Layer - wire schemas and create-payload validation
//
// Wire names are camelCase (swiftCode, bankName, countryISO2, ...) for both
// requests and responses.

use serde::{Deserialize, Serialize};

use crate::db::{NewSwiftCode, SwiftCode};

/// Required length of `countryISO2`
pub const COUNTRY_ISO2_LEN: usize = 2;

// ============================================================================
// VALIDATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
            context: "body".to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Strip surrounding whitespace from every string field
pub fn normalize_new_swift_code(data: NewSwiftCode) -> NewSwiftCode {
    NewSwiftCode {
        swift_code: data.swift_code.trim().to_string(),
        bank_name: data.bank_name.trim().to_string(),
        address: data.address.trim().to_string(),
        country_iso2: data.country_iso2.trim().to_string(),
        country_name: data.country_name.trim().to_string(),
        is_headquarter: data.is_headquarter,
    }
}

/// Shape checks beyond "all fields present with the right JSON types",
/// which deserialization already enforces.
///
/// The headquarter flag is not checked against the "XXX" suffix: API callers
/// may set it freely.
pub fn validate_new_swift_code(data: &NewSwiftCode) -> ValidationResult {
    let mut errors = Vec::new();

    let iso2_len = data.country_iso2.chars().count();
    if iso2_len != COUNTRY_ISO2_LEN {
        errors.push(ValidationError::new(
            "countryISO2",
            format!(
                "String should have exactly {} characters, got {}",
                COUNTRY_ISO2_LEN, iso2_len
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ============================================================================
// RESPONSE SHAPES
// ============================================================================

/// Compact entry used in branch lists and country listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwiftCodeBranch {
    pub address: String,

    #[serde(rename = "bankName")]
    pub bank_name: String,

    #[serde(rename = "countryISO2")]
    pub country_iso2: String,

    #[serde(rename = "isHeadquarter")]
    pub is_headquarter: bool,

    #[serde(rename = "swiftCode")]
    pub swift_code: String,
}

impl From<SwiftCode> for SwiftCodeBranch {
    fn from(code: SwiftCode) -> Self {
        Self {
            address: code.address,
            bank_name: code.bank_name,
            country_iso2: code.country_iso2,
            is_headquarter: code.is_headquarter,
            swift_code: code.swift_code,
        }
    }
}

/// Single-code lookup: the full record plus its branches (empty unless HQ)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwiftCodeDetail {
    #[serde(flatten)]
    pub record: SwiftCode,

    pub branches: Vec<SwiftCodeBranch>,
}

impl SwiftCodeDetail {
    pub fn new(record: SwiftCode, branches: Vec<SwiftCode>) -> Self {
        Self {
            record,
            branches: branches.into_iter().map(SwiftCodeBranch::from).collect(),
        }
    }
}

/// All codes of one country
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountrySwiftCodes {
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,

    #[serde(rename = "countryName")]
    pub country_name: String,

    #[serde(rename = "swiftCodes")]
    pub swift_codes: Vec<SwiftCodeBranch>,
}

impl CountrySwiftCodes {
    /// `None` when there are no records; the name comes from the first record
    pub fn from_records(iso2: &str, records: Vec<SwiftCode>) -> Option<Self> {
        let country_name = records.first()?.country_name.clone();

        Some(Self {
            country_iso2: iso2.to_uppercase(),
            country_name,
            swift_codes: records.into_iter().map(SwiftCodeBranch::from).collect(),
        })
    }
}

/// Generic acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
