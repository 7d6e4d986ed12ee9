//! Field Keys
//!
//! The fixed whitelist of payment inputs a hosted-fields component can
//! host. Anything else in a merchant's field map is ignored at
//! construction and rejected by operations.

use serde::{Deserialize, Serialize};

/// Whitelisted field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    Number,
    Cvv,
    ExpirationDate,
    ExpirationMonth,
    ExpirationYear,
    PostalCode,
}

impl FieldKey {
    /// Whitelist in injection order
    pub const ALL: [FieldKey; 6] = [
        FieldKey::Number,
        FieldKey::Cvv,
        FieldKey::ExpirationDate,
        FieldKey::ExpirationMonth,
        FieldKey::ExpirationYear,
        FieldKey::PostalCode,
    ];

    /// Merchant-facing key, as used in field maps and events
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::Number => "number",
            FieldKey::Cvv => "cvv",
            FieldKey::ExpirationDate => "expirationDate",
            FieldKey::ExpirationMonth => "expirationMonth",
            FieldKey::ExpirationYear => "expirationYear",
            FieldKey::PostalCode => "postalCode",
        }
    }

    /// Default `name` of the input rendered inside the frame
    pub fn input_name(&self) -> &'static str {
        match self {
            FieldKey::Number => "credit-card-number",
            FieldKey::Cvv => "cvv",
            FieldKey::ExpirationDate => "expiration",
            FieldKey::ExpirationMonth => "expiration-month",
            FieldKey::ExpirationYear => "expiration-year",
            FieldKey::PostalCode => "postal-code",
        }
    }

    /// Default accessible label of the input
    pub fn label(&self) -> &'static str {
        match self {
            FieldKey::Number => "Credit Card Number",
            FieldKey::Cvv => "CVV",
            FieldKey::ExpirationDate => "Expiration Date",
            FieldKey::ExpirationMonth => "Expiration Month",
            FieldKey::ExpirationYear => "Expiration Year",
            FieldKey::PostalCode => "Postal Code",
        }
    }

    /// Name of the iframe injected for this field
    pub fn frame_name(&self) -> String {
        format!("{}{}", crate::constants::FRAME_NAME_PREFIX, self.as_str())
    }
}

impl std::str::FromStr for FieldKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        FieldKey::ALL.into_iter().find(|k| k.as_str() == s).ok_or(())
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
