use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use crate::errors::ValidationError;

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 250;

const PRICE_SCALE: u32 = 2;
const PRICE_MAX_INTEGER_DIGITS: u32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse::<i64>().map(Self)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Category {
    #[default]
    Unknown,
    Cloths,
    Food,
    Housewares,
    Automotive,
    Tools,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Unknown,
        Category::Cloths,
        Category::Food,
        Category::Housewares,
        Category::Automotive,
        Category::Tools,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Cloths => "CLOTHS",
            Self::Food => "FOOD",
            Self::Housewares => "HOUSEWARES",
            Self::Automotive => "AUTOMOTIVE",
            Self::Tools => "TOOLS",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "UNKNOWN" => Ok(Self::Unknown),
            "CLOTHS" => Ok(Self::Cloths),
            "FOOD" => Ok(Self::Food),
            "HOUSEWARES" => Ok(Self::Housewares),
            "AUTOMOTIVE" => Ok(Self::Automotive),
            "TOOLS" => Ok(Self::Tools),
            _ => Err(ValidationError::UnknownCategory(value.to_string())),
        }
    }
}

/// A currency amount with exactly two fractional digits.
///
/// Numeric and string inputs that denote the same value produce equal prices,
/// so `12.5` and `"12.50"` are interchangeable everywhere a price is compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Price(Decimal);

impl Price {
    pub fn new(amount: Decimal) -> Result<Self, ValidationError> {
        let normalized = amount.normalize();
        if normalized.is_sign_negative() {
            return Err(invalid_price(amount, "price must not be negative"));
        }
        if normalized.scale() > PRICE_SCALE {
            return Err(invalid_price(amount, "at most two decimal places are allowed"));
        }
        if normalized.trunc() >= Decimal::from(10_i64.pow(PRICE_MAX_INTEGER_DIGITS)) {
            return Err(invalid_price(amount, "at most eight integer digits are allowed"));
        }

        let mut amount = normalized;
        amount.rescale(PRICE_SCALE);
        Ok(Self(amount))
    }

    /// Every `u32` count of cents is a valid price.
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), PRICE_SCALE))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Accepts either a JSON number or its string representation.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Number(number) => number.to_string().parse(),
            Value::String(text) => text.parse(),
            _ => Err(ValidationError::InvalidType {
                field: "price",
                expected: "a number or a decimal string",
            }),
        }
    }
}

fn invalid_price(amount: impl ToString, reason: &'static str) -> ValidationError {
    ValidationError::InvalidPrice { value: amount.to_string(), reason }
}

impl FromStr for Price {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // Decimal parsing tolerates digit separators; prices are plain base-10 text.
        if value.contains('_') {
            return Err(invalid_price(value, "not a decimal number"));
        }
        let amount = Decimal::from_str(value.trim())
            .map_err(|_| invalid_price(value, "not a decimal number"))?;
        Self::new(amount)
    }
}

impl TryFrom<f64> for Price {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(invalid_price(value, "not a finite number"));
        }
        // f64 `Display` is the shortest round-trip form and never uses exponents.
        value.to_string().parse()
    }
}

impl TryFrom<Decimal> for Price {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Product {
    pub id: Option<ProductId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub available: bool,
    pub category: Category,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        price: Price,
        available: bool,
        category: Category,
    ) -> Self {
        Self { id: None, name: name.into(), description, price, available, category }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.name.chars().count() > NAME_MAX_LEN {
            return Err(ValidationError::TooLong { field: "name", max: NAME_MAX_LEN });
        }
        if let Some(description) = &self.description {
            if description.chars().count() > DESCRIPTION_MAX_LEN {
                return Err(ValidationError::TooLong {
                    field: "description",
                    max: DESCRIPTION_MAX_LEN,
                });
            }
        }
        Ok(())
    }

    /// Wire representation: price as a decimal string, category by member name.
    pub fn to_record(&self) -> Value {
        json!({
            "id": self.id.map(|id| id.0),
            "name": self.name,
            "description": self.description,
            "price": self.price.to_string(),
            "available": self.available,
            "category": self.category.as_str(),
        })
    }

    /// Builds an unsaved product from its wire representation. Any `id` key is ignored.
    pub fn from_record(record: &Value) -> Result<Self, ValidationError> {
        let object = record.as_object().ok_or(ValidationError::NotAnObject)?;

        let name = match required(object, "name")? {
            Value::String(name) => name.clone(),
            _ => return Err(ValidationError::InvalidType { field: "name", expected: "a string" }),
        };
        let description = match object.get("description") {
            None | Some(Value::Null) => None,
            Some(Value::String(description)) => Some(description.clone()),
            Some(_) => {
                return Err(ValidationError::InvalidType {
                    field: "description",
                    expected: "a string or null",
                })
            }
        };
        let price = Price::from_json(required(object, "price")?)?;
        let available = required(object, "available")?.as_bool().ok_or(
            ValidationError::InvalidType { field: "available", expected: "a boolean" },
        )?;
        let category = match required(object, "category")? {
            Value::String(category) => category.parse()?,
            _ => {
                return Err(ValidationError::InvalidType {
                    field: "category",
                    expected: "a category name",
                })
            }
        };

        let product = Self { id: None, name, description, price, available, category };
        product.validate()?;
        Ok(product)
    }

    /// Replaces every field except `id` from a wire record; `self` is untouched on error.
    pub fn apply_record(&mut self, record: &Value) -> Result<(), ValidationError> {
        let incoming = Self::from_record(record)?;
        self.name = incoming.name;
        self.description = incoming.description;
        self.price = incoming.price;
        self.available = incoming.available;
        self.category = incoming.category;
        Ok(())
    }
}

fn required<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, ValidationError> {
    object.get(field).ok_or(ValidationError::MissingField(field))
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Product {} id=[{}]>", self.name, id),
            None => write!(f, "<Product {} id=[None]>", self.name),
        }
    }
}
