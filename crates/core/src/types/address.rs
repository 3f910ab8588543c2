//! Billing and shipping addresses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::email::Email;
use super::id::RegionId;
use super::region::RegionDirectory;
use super::scalar::{self, Attributes};

/// Which of the cart's two addresses a record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    Billing,
    Shipping,
}

impl AddressKind {
    /// The wire/storage name of the address type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Billing => "billing",
            Self::Shipping => "shipping",
        }
    }
}

/// A shipping rate computed for a shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRate {
    /// Rate code, `carrier_method` (e.g. `flatrate_flatrate`).
    pub code: String,
    /// Carrier display title.
    pub carrier_title: String,
    /// Method display title.
    pub method_title: String,
    /// Shipping price in the cart currency.
    pub price: Decimal,
}

/// Attribute codes copied by the same-as-billing export/import.
pub const CUSTOMER_ADDRESS_FIELDS: &[&str] = &[
    "firstname",
    "lastname",
    "company",
    "street",
    "city",
    "region",
    "region_id",
    "postcode",
    "country_id",
    "telephone",
    "email",
];

/// A cart address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub kind: AddressKind,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub company: Option<String>,
    pub street: Vec<String>,
    pub city: Option<String>,
    /// Region display name, or the raw string the customer typed when it
    /// could not be resolved.
    pub region: Option<String>,
    pub region_id: Option<RegionId>,
    pub postcode: Option<String>,
    pub country_id: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    /// Shipping only: this address mirrors the billing address.
    pub same_as_billing: bool,
    /// Shipping only: selected rate code.
    pub shipping_method: Option<String>,
    /// Shipping only: rates from the last collection.
    pub shipping_rates: Vec<ShippingRate>,
    /// Shipping only: rates are stale and must be collected on next save.
    pub collect_shipping_rates: bool,
    /// Payment method code mirrored from the payment record.
    pub payment_method: Option<String>,
}

impl Address {
    /// An empty address of the given kind.
    #[must_use]
    pub const fn new(kind: AddressKind) -> Self {
        Self {
            kind,
            firstname: None,
            lastname: None,
            company: None,
            street: Vec::new(),
            city: None,
            region: None,
            region_id: None,
            postcode: None,
            country_id: None,
            telephone: None,
            email: None,
            same_as_billing: false,
            shipping_method: None,
            shipping_rates: Vec::new(),
            collect_shipping_rates: false,
            payment_method: None,
        }
    }

    /// Clear every field, keeping the address kind.
    pub fn reset(&mut self) {
        *self = Self::new(self.kind);
    }

    /// The computed rate matching `code`, if any.
    #[must_use]
    pub fn shipping_rate_by_code(&self, code: &str) -> Option<&ShippingRate> {
        self.shipping_rates.iter().find(|rate| rate.code == code)
    }

    /// Export the address as an attribute bag keyed by internal codes.
    #[must_use]
    pub fn export_attributes(&self) -> Attributes {
        let mut out = self.export_customer_address();
        out.insert("address_type".into(), Value::from(self.kind.as_str()));
        if self.kind == AddressKind::Shipping {
            out.insert("same_as_billing".into(), Value::Bool(self.same_as_billing));
            out.insert(
                "shipping_method".into(),
                scalar::opt_string_value(self.shipping_method.as_deref()),
            );
        }
        out
    }

    /// Export only the customer-address fields (see [`CUSTOMER_ADDRESS_FIELDS`]).
    #[must_use]
    pub fn export_customer_address(&self) -> Attributes {
        let mut out = Attributes::new();
        out.insert("firstname".into(), scalar::opt_string_value(self.firstname.as_deref()));
        out.insert("lastname".into(), scalar::opt_string_value(self.lastname.as_deref()));
        out.insert("company".into(), scalar::opt_string_value(self.company.as_deref()));
        out.insert(
            "street".into(),
            Value::Array(self.street.iter().cloned().map(Value::String).collect()),
        );
        out.insert("city".into(), scalar::opt_string_value(self.city.as_deref()));
        out.insert("region".into(), scalar::opt_string_value(self.region.as_deref()));
        out.insert(
            "region_id".into(),
            self.region_id.map_or(Value::Null, |id| Value::from(id.as_i32())),
        );
        out.insert("postcode".into(), scalar::opt_string_value(self.postcode.as_deref()));
        out.insert("country_id".into(), scalar::opt_string_value(self.country_id.as_deref()));
        out.insert("telephone".into(), scalar::opt_string_value(self.telephone.as_deref()));
        out.insert("email".into(), scalar::opt_string_value(self.email.as_deref()));
        out
    }

    /// Copy customer-address fields from another address's export.
    ///
    /// Flags such as `same_as_billing` are untouched.
    pub fn import_customer_address(&mut self, data: &Attributes) {
        for code in CUSTOMER_ADDRESS_FIELDS {
            if let Some(value) = data.get(*code) {
                self.set_attribute(code, value);
            }
        }
    }

    /// Apply an attribute bag keyed by internal codes.
    ///
    /// Only codes present in `data` are touched. Shipping-only codes are
    /// ignored on billing addresses; unknown codes are ignored.
    pub fn import_attributes(&mut self, data: &Attributes) {
        for (code, value) in data {
            self.set_attribute(code, value);
        }
    }

    fn set_attribute(&mut self, code: &str, value: &Value) {
        match code {
            "firstname" => self.firstname = scalar::to_opt_string(value),
            "lastname" => self.lastname = scalar::to_opt_string(value),
            "company" => self.company = scalar::to_opt_string(value),
            "street" => self.street = street_lines(value),
            "city" => self.city = scalar::to_opt_string(value),
            "region" => self.region = scalar::to_opt_string(value),
            "region_id" => {
                self.region_id = scalar::to_i64(value)
                    .and_then(|id| i32::try_from(id).ok())
                    .map(RegionId::new);
            }
            "postcode" => self.postcode = scalar::to_opt_string(value),
            "country_id" => {
                self.country_id = scalar::to_opt_string(value).map(|c| c.to_ascii_uppercase());
            }
            "telephone" => self.telephone = scalar::to_opt_string(value),
            "email" => self.email = scalar::to_opt_string(value),
            "same_as_billing" if self.kind == AddressKind::Shipping => {
                self.same_as_billing = scalar::to_bool(value).unwrap_or(false);
            }
            "shipping_method" if self.kind == AddressKind::Shipping => {
                self.shipping_method = scalar::to_opt_string(value);
            }
            _ => {}
        }
    }

    /// Validate the address for checkout.
    ///
    /// # Errors
    ///
    /// Returns the ordered list of human-readable problems when the address
    /// is incomplete or inconsistent.
    pub fn validate(&self, regions: &dyn RegionDirectory) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.firstname.is_none() {
            errors.push("Please enter the first name.".to_string());
        }
        if self.lastname.is_none() {
            errors.push("Please enter the last name.".to_string());
        }
        if self.street.first().is_none_or(|line| line.trim().is_empty()) {
            errors.push("Please enter the street.".to_string());
        }
        if self.city.is_none() {
            errors.push("Please enter the city.".to_string());
        }
        if self.telephone.is_none() {
            errors.push("Please enter the telephone number.".to_string());
        }
        if self.postcode.is_none() {
            errors.push("Please enter the zip/postal code.".to_string());
        }

        match self.country_id.as_deref() {
            None => errors.push("Please enter the country.".to_string()),
            Some(country) if regions.has_regions(country) => match self.region_id {
                None => errors.push("Please enter the state/province.".to_string()),
                Some(id) => {
                    if regions
                        .find_by_id(id)
                        .is_none_or(|region| region.country_id != country)
                    {
                        errors.push(
                            "Please select a valid state/province for the selected country."
                                .to_string(),
                        );
                    }
                }
            },
            Some(_) => {}
        }

        if let Some(email) = self.email.as_deref()
            && Email::parse(email).is_err()
        {
            errors.push("Please enter a valid email address.".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn street_lines(value: &Value) -> Vec<String> {
    match value {
        Value::Array(lines) => lines.iter().filter_map(scalar::to_opt_string).collect(),
        Value::String(s) => s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
