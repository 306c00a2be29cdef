//! Field kind mapping from schema type tokens.

use serde::Serialize;
use std::fmt;

/// Internal tag for a field's widget family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Integer,
    Date,
    DateTime,
    Time,
    Url,
    Tel,
    Search,
    Password,
    Range,
    Percent,
    Money,
    Country,
    Language,
    Locale,
    Currency,
    Checkbox,
    Radio,
    Choice,
    File,
    Collection,
}

/// Every kind, in table order.
pub const ALL_KINDS: &[FieldKind] = &[
    FieldKind::Text,
    FieldKind::Email,
    FieldKind::Integer,
    FieldKind::Date,
    FieldKind::DateTime,
    FieldKind::Time,
    FieldKind::Url,
    FieldKind::Tel,
    FieldKind::Search,
    FieldKind::Password,
    FieldKind::Range,
    FieldKind::Percent,
    FieldKind::Money,
    FieldKind::Country,
    FieldKind::Language,
    FieldKind::Locale,
    FieldKind::Currency,
    FieldKind::Checkbox,
    FieldKind::Radio,
    FieldKind::Choice,
    FieldKind::File,
    FieldKind::Collection,
];

impl FieldKind {
    /// Map a schema type token to a kind. Unknown tokens fall back to
    /// [`FieldKind::Text`] without an error.
    pub fn from_token(token: &str) -> FieldKind {
        match token {
            "email" => FieldKind::Email,
            "integer" | "number" => FieldKind::Integer,
            "date" => FieldKind::Date,
            "datetime" => FieldKind::DateTime,
            "time" => FieldKind::Time,
            "url" => FieldKind::Url,
            "tel" => FieldKind::Tel,
            "search" => FieldKind::Search,
            "password" => FieldKind::Password,
            "range" => FieldKind::Range,
            "percent" => FieldKind::Percent,
            "money" => FieldKind::Money,
            "country" => FieldKind::Country,
            "language" => FieldKind::Language,
            "locale" => FieldKind::Locale,
            "currency" => FieldKind::Currency,
            "checkbox" => FieldKind::Checkbox,
            "radio" => FieldKind::Radio,
            "choice" => FieldKind::Choice,
            "file" => FieldKind::File,
            "collection" => FieldKind::Collection,
            _ => FieldKind::Text,
        }
    }

    /// The canonical type token for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Integer => "integer",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::Time => "time",
            FieldKind::Url => "url",
            FieldKind::Tel => "tel",
            FieldKind::Search => "search",
            FieldKind::Password => "password",
            FieldKind::Range => "range",
            FieldKind::Percent => "percent",
            FieldKind::Money => "money",
            FieldKind::Country => "country",
            FieldKind::Language => "language",
            FieldKind::Locale => "locale",
            FieldKind::Currency => "currency",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::Choice => "choice",
            FieldKind::File => "file",
            FieldKind::Collection => "collection",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Integer)
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, FieldKind::Date | FieldKind::DateTime | FieldKind::Time)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
