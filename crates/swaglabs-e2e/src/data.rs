//! Test data: credentials, product catalog, checkout information.
//!
//! The catalogs ship embedded as YAML and are shared read-only across
//! concurrent scenarios. A directory holding `credentials.yaml` and
//! `products.yaml` can replace them at run time.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::result::{E2eError, E2eResult};

const EMBEDDED_CREDENTIALS: &str = include_str!("../test-data/credentials.yaml");
const EMBEDDED_PRODUCTS: &str = include_str!("../test-data/products.yaml");

/// A username/password pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username (may be empty for negative cases)
    pub username: String,
    /// Password (may be empty for negative cases)
    pub password: String,
}

/// Named accounts used by the suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialCatalog {
    pub valid_user: Credentials,
    pub invalid_credentials: Credentials,
    pub empty_username: Credentials,
    pub empty_password: Credentials,
    pub locked_out_user: Credentials,
    pub problem_user: Credentials,
    pub performance_glitch_user: Credentials,
}

/// Exact decimal price in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(u64);

impl Price {
    /// Price from whole cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Value in cents
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Tax at the storefront's flat 8% rate, rounded half up to the cent
    #[must_use]
    pub const fn tax(self) -> Self {
        Self(self.0.saturating_mul(8).saturating_add(50) / 100)
    }

    /// Parse storefront text such as `$29.99` or `Total: $32.39`.
    pub fn parse_label(text: &str) -> E2eResult<Self> {
        let unexpected = || E2eError::UnexpectedContent {
            what: "price".into(),
            content: text.to_string(),
        };
        let amount = text
            .rsplit_once('$')
            .map(|(_, amount)| amount)
            .ok_or_else(unexpected)?
            .trim();
        let (whole, fraction) = amount.split_once('.').unwrap_or((amount, "00"));
        if whole.is_empty()
            || fraction.len() != 2
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(unexpected());
        }
        let whole: u64 = whole.parse().map_err(|_| unexpected())?;
        let fraction: u64 = fraction.parse().map_err(|_| unexpected())?;
        whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .map(Self)
            .ok_or_else(unexpected)
    }
}

impl TryFrom<f64> for Price {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("price must be a non-negative amount, got {value}"));
        }
        Ok(Self((value * 100.0).round() as u64))
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0 as f64 / 100.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A catalog product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable identifier
    pub id: u32,
    /// Display name
    pub name: String,
    /// Marketing copy
    pub description: String,
    /// Unit price
    pub price: Price,
}

impl Product {
    /// The `data-test` slug the storefront derives from the name
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '(' || c == ')' { c } else { '-' })
            .collect()
    }
}

/// Customer details entered on checkout step one
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutInfo {
    pub first_name: String,
    pub last_name: String,
    pub postal_code: String,
}

impl CheckoutInfo {
    /// Build from parts
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            postal_code: postal_code.into(),
        }
    }

    /// Value of one field
    #[must_use]
    pub fn field(&self, field: CheckoutField) -> &str {
        match field {
            CheckoutField::FirstName => &self.first_name,
            CheckoutField::LastName => &self.last_name,
            CheckoutField::PostalCode => &self.postal_code,
        }
    }

    /// First empty field in validation order, if any
    #[must_use]
    pub fn first_missing_field(&self) -> Option<CheckoutField> {
        CheckoutField::VALIDATION_ORDER
            .into_iter()
            .find(|field| self.field(*field).is_empty())
    }
}

/// Named checkout inputs used by the suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCatalog {
    pub valid: CheckoutInfo,
    pub empty_first_name: CheckoutInfo,
    pub empty_last_name: CheckoutInfo,
    pub empty_postal_code: CheckoutInfo,
}

/// Required fields on checkout step one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutField {
    FirstName,
    LastName,
    PostalCode,
}

impl CheckoutField {
    /// Order in which the storefront validates; the first empty field wins
    pub const VALIDATION_ORDER: [Self; 3] = [Self::FirstName, Self::LastName, Self::PostalCode];

    /// `data-test` id of the input
    #[must_use]
    pub const fn test_id(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::PostalCode => "postalCode",
        }
    }

    /// Error banner shown when this field is empty
    #[must_use]
    pub const fn required_message(self) -> &'static str {
        match self {
            Self::FirstName => "Error: First Name is required",
            Self::LastName => "Error: Last Name is required",
            Self::PostalCode => "Error: Postal Code is required",
        }
    }
}

/// Inventory sort orders offered by the product sort dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Name (A to Z)
    #[serde(rename = "az")]
    NameAsc,
    /// Name (Z to A)
    #[serde(rename = "za")]
    NameDesc,
    /// Price (low to high)
    #[serde(rename = "lohi")]
    PriceAsc,
    /// Price (high to low)
    #[serde(rename = "hilo")]
    PriceDesc,
}

impl SortOrder {
    /// All orders in dropdown order
    pub const ALL: [Self; 4] = [Self::NameAsc, Self::NameDesc, Self::PriceAsc, Self::PriceDesc];

    /// `<option value>` in the dropdown
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::NameAsc => "az",
            Self::NameDesc => "za",
            Self::PriceAsc => "lohi",
            Self::PriceDesc => "hilo",
        }
    }

    /// Visible option label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NameAsc => "Name (A to Z)",
            Self::NameDesc => "Name (Z to A)",
            Self::PriceAsc => "Price (low to high)",
            Self::PriceDesc => "Price (high to low)",
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::NameAsc
    }
}

impl FromStr for SortOrder {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.value() == s)
            .ok_or_else(|| E2eError::Data {
                message: format!("unknown sort option '{s}' (expected az, za, lohi or hilo)"),
            })
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    credentials: CredentialCatalog,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductsFile {
    products: Vec<Product>,
    checkout_info: CheckoutCatalog,
}

/// All static test data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestData {
    pub credentials: CredentialCatalog,
    pub products: Vec<Product>,
    pub checkout: CheckoutCatalog,
}

impl TestData {
    /// Catalogs compiled into the crate
    pub fn embedded() -> E2eResult<Self> {
        Self::from_yaml(EMBEDDED_CREDENTIALS, EMBEDDED_PRODUCTS)
    }

    /// Load `credentials.yaml` and `products.yaml` from a directory
    pub fn load(dir: impl AsRef<Path>) -> E2eResult<Self> {
        let dir = dir.as_ref();
        let credentials = std::fs::read_to_string(dir.join("credentials.yaml"))?;
        let products = std::fs::read_to_string(dir.join("products.yaml"))?;
        Self::from_yaml(&credentials, &products)
    }

    fn from_yaml(credentials: &str, products: &str) -> E2eResult<Self> {
        let CredentialsFile { credentials } = serde_yaml_ng::from_str(credentials)?;
        let ProductsFile {
            products,
            checkout_info,
        } = serde_yaml_ng::from_str(products)?;
        if products.is_empty() {
            return Err(E2eError::Data {
                message: "product catalog is empty".into(),
            });
        }
        Ok(Self {
            credentials,
            products,
            checkout: checkout_info,
        })
    }

    /// Product by id
    #[must_use]
    pub fn product(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod catalog_tests {
        use super::*;

        #[test]
        fn test_embedded_catalog_loads() {
            let data = TestData::embedded().unwrap();
            assert_eq!(data.products.len(), 6);
            assert_eq!(data.credentials.valid_user.username, "standard_user");
            assert_eq!(data.credentials.valid_user.password, "secret_sauce");
            assert_eq!(data.credentials.invalid_credentials.password, "incorrect_password");
            assert!(data.credentials.empty_username.username.is_empty());
            assert!(data.credentials.empty_password.password.is_empty());
            assert_eq!(data.checkout.valid, CheckoutInfo::new("John", "Doe", "12345"));
        }

        #[test]
        fn test_product_prices_are_exact() {
            let data = TestData::embedded().unwrap();
            let backpack = data.product(1).unwrap();
            assert_eq!(backpack.name, "Sauce Labs Backpack");
            assert_eq!(backpack.price, Price::from_cents(2999));
            assert_eq!(data.product(5).unwrap().price.to_string(), "$7.99");
        }

        #[test]
        fn test_load_from_directory() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("credentials.yaml"), EMBEDDED_CREDENTIALS).unwrap();
            std::fs::write(dir.path().join("products.yaml"), EMBEDDED_PRODUCTS).unwrap();
            assert_eq!(TestData::load(dir.path()).unwrap(), TestData::embedded().unwrap());
        }

        #[test]
        fn test_load_missing_directory_is_io_error() {
            let err = TestData::load("/nonexistent/test-data").unwrap_err();
            assert!(matches!(err, E2eError::Io(_)));
        }

        #[test]
        fn test_slug_matches_storefront_test_ids() {
            let data = TestData::embedded().unwrap();
            assert_eq!(data.product(1).unwrap().slug(), "sauce-labs-backpack");
            assert_eq!(data.product(6).unwrap().slug(), "test.allthethings()-t-shirt");
        }
    }

    mod price_tests {
        use super::*;

        #[test]
        fn test_parse_plain_and_labelled() {
            assert_eq!(Price::parse_label("$29.99").unwrap().cents(), 2999);
            assert_eq!(Price::parse_label("Total: $32.39").unwrap().cents(), 3239);
            assert_eq!(Price::parse_label("Item total: $10").unwrap().cents(), 1000);
        }

        #[test]
        fn test_parse_rejects_garbage() {
            assert!(Price::parse_label("29.99").is_err());
            assert!(Price::parse_label("$").is_err());
            assert!(Price::parse_label("$1.5").is_err());
            assert!(Price::parse_label("$-1.00").is_err());
        }

        #[test]
        fn test_parse_rejects_overflow() {
            let err = Price::parse_label("Total: $999999999999999999.99").unwrap_err();
            assert!(matches!(err, E2eError::UnexpectedContent { .. }));
            assert!(Price::parse_label("$184467440737095516.15").is_ok());
            assert!(Price::parse_label("$184467440737095516.16").is_err());
        }

        #[test]
        fn test_large_amounts_saturate() {
            let huge = Price::from_cents(u64::MAX / 4);
            assert!(huge.tax() <= huge);
            assert_eq!(huge + Price::from_cents(u64::MAX), Price::from_cents(u64::MAX));
        }

        #[test]
        fn test_tax_rounds_half_up() {
            assert_eq!(Price::from_cents(2999).tax(), Price::from_cents(240));
            assert_eq!(Price::from_cents(3998).tax(), Price::from_cents(320));
        }

        #[test]
        fn test_sum_and_display() {
            let total: Price = [2999, 999].into_iter().map(Price::from_cents).sum();
            assert_eq!(total.to_string(), "$39.98");
        }

        #[test]
        fn test_try_from_f64_rejects_negative() {
            assert!(Price::try_from(-1.0).is_err());
            assert_eq!(Price::try_from(15.99).unwrap(), Price::from_cents(1599));
        }
    }

    mod checkout_tests {
        use super::*;

        #[test]
        fn test_first_missing_field_priority() {
            let info = CheckoutInfo::new("", "", "");
            assert_eq!(info.first_missing_field(), Some(CheckoutField::FirstName));
            let info = CheckoutInfo::new("John", "", "");
            assert_eq!(info.first_missing_field(), Some(CheckoutField::LastName));
            let info = CheckoutInfo::new("", "Doe", "12345");
            assert_eq!(info.first_missing_field(), Some(CheckoutField::FirstName));
            assert_eq!(CheckoutInfo::new("John", "Doe", "12345").first_missing_field(), None);
        }

        #[test]
        fn test_required_messages() {
            assert_eq!(
                CheckoutField::PostalCode.required_message(),
                "Error: Postal Code is required"
            );
        }
    }

    mod sort_order_tests {
        use super::*;

        #[test]
        fn test_round_trip_through_value() {
            for order in SortOrder::ALL {
                assert_eq!(order.value().parse::<SortOrder>().unwrap(), order);
            }
        }

        #[test]
        fn test_unknown_value_is_rejected() {
            assert!("price".parse::<SortOrder>().is_err());
        }
    }
}
