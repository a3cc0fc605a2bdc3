//! Canonicalization of loosely-typed form input.
//!
//! Portal forms post whatever the browser had in the input box: numbers as
//! strings with Brazilian separators, blank strings for untouched fields,
//! company names with or without accents. Everything that reaches the store
//! goes through this module first.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;

static UUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
    )
    .expect("uuid pattern compiles")
});

/// Trimmed text, or `None` for missing, null and blank input.
///
/// Numbers and booleans are rendered as text; arrays and objects are rejected
/// to `None`.
pub fn clean_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// `clean_text`, upper-cased. Used for plant identifiers and company names.
pub fn upper_text(value: Option<&Value>) -> Option<String> {
    clean_text(value).map(|s| s.to_uppercase())
}

/// Parses numbers typed with either decimal separator.
///
/// `"1.234,56"` and `"1234,56"` and `"1234.56"` all yield `1234.56`. When both
/// separators are present the right-most one is the decimal separator. Dots
/// are thousands separators when there are several of them (`"1.234.567"`) or
/// when a single one splits a non-zero group of up to three digits from exactly
/// three more (`"1.234"` is `1234`, while `"0.125"` and `"1.5"` stay decimal).
pub fn parse_loose_number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_number_text(s)?,
        _ => return None,
    };
    parsed.is_finite().then_some(parsed)
}

fn parse_number_text(raw: &str) -> Option<f64> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    let compact = compact.trim_start_matches("R$");
    if compact.is_empty() {
        return None;
    }

    let last_comma = compact.rfind(',');
    let last_dot = compact.rfind('.');
    let canonical = match (last_comma, last_dot) {
        (Some(c), Some(d)) if c > d => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (Some(_), None) => {
            if compact.matches(',').count() > 1 {
                return None;
            }
            compact.replace(',', ".")
        }
        (None, Some(_)) if compact.matches('.').count() > 1 || is_thousands_group(compact) => {
            compact.replace('.', "")
        }
        _ => compact.to_string(),
    };

    canonical.parse::<f64>().ok()
}

/// `"1.234"` shaped: one dot, a leading group without a leading zero, three digits after.
fn is_thousands_group(compact: &str) -> bool {
    let unsigned = compact.trim_start_matches(['-', '+']);
    let Some((head, tail)) = unsigned.split_once('.') else {
        return false;
    };
    (1..=3).contains(&head.len())
        && !head.starts_with('0')
        && head.bytes().all(|b| b.is_ascii_digit())
        && tail.len() == 3
        && tail.bytes().all(|b| b.is_ascii_digit())
}

/// Integer variant of [`parse_loose_number`], truncating toward zero.
pub fn parse_loose_int(value: Option<&Value>) -> Option<i64> {
    if let Some(Value::Number(n)) = value {
        if let Some(i) = n.as_i64() {
            return Some(i);
        }
    }
    let number = parse_loose_number(value)?.trunc();
    if number >= i64::MIN as f64 && number <= i64::MAX as f64 {
        Some(number as i64)
    } else {
        None
    }
}

/// Booleans as forms send them: `true`, `1`, `"sim"`, `"Não"`, `"yes"`...
pub fn parse_loose_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match canonical_key(s).as_str() {
            "SIM" | "S" | "YES" | "Y" | "TRUE" | "1" => Some(true),
            "NAO" | "N" | "NO" | "FALSE" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD` (or the date part of an ISO timestamp) and `DD/MM/YYYY`.
pub fn parse_loose_date(value: Option<&Value>) -> Option<NaiveDate> {
    let text = clean_text(value)?;
    if let Some(head) = text.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
            return Some(date);
        }
    }
    NaiveDate::parse_from_str(&text, "%d/%m/%Y").ok()
}

/// Query-string flavour of [`clean_text`].
pub fn clean_param(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn parse_date_param(raw: Option<&str>) -> Option<NaiveDate> {
    clean_param(raw).and_then(|s| parse_loose_date(Some(&Value::String(s))))
}

/// Accent-free, whitespace-collapsed, upper-cased form used for enum matching.
pub fn canonical_key(raw: &str) -> String {
    let stripped: String = raw.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Persisted representation of the financial `impacto` flag.
pub fn impact_label(impact: bool) -> &'static str {
    if impact {
        "Sim"
    } else {
        "Não"
    }
}

/// Validates a caller-supplied record id before it is used against the store.
pub fn validate_record_id(raw: &str) -> Result<Uuid, ServiceError> {
    if !UUID_PATTERN.is_match(raw) {
        return Err(ServiceError::validation(format!("id inválido: '{}'", raw)));
    }
    Uuid::parse_str(raw).map_err(|_| ServiceError::validation(format!("id inválido: '{}'", raw)))
}

/// Closed vocabulary resolved through [`canonical_key`].
pub trait ClosedSet: Sized + Copy + IntoEnumIterator + Into<&'static str> {
    /// Field name used in validation messages
    const FIELD: &'static str;

    fn as_str(self) -> &'static str {
        self.into()
    }

    fn from_loose(raw: &str) -> Option<Self> {
        let key = canonical_key(raw);
        if key.is_empty() {
            return None;
        }
        Self::iter().find(|member| canonical_key(member.as_str()) == key)
    }

    /// Resolves a JSON value, failing with a 400-class error on non-members.
    fn require(value: Option<&Value>) -> Result<Self, ServiceError> {
        let text = clean_text(value)
            .ok_or_else(|| ServiceError::validation(format!("{} é obrigatório", Self::FIELD)))?;
        Self::from_loose(&text)
            .ok_or_else(|| ServiceError::validation(format!("{} inválido: '{}'", Self::FIELD, text)))
    }

    /// Canonical labels, in declaration order
    fn allowed() -> Vec<&'static str> {
        Self::iter().map(|member| member.as_str()).collect()
    }
}

/// Client companies served by the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr, Serialize, Deserialize, ToSchema)]
pub enum Cliente {
    #[strum(serialize = "ÉLIS")]
    #[serde(rename = "ÉLIS")]
    Elis,
    #[strum(serialize = "ÓRIGO ENERGIA")]
    #[serde(rename = "ÓRIGO ENERGIA")]
    OrigoEnergia,
    #[strum(serialize = "SOLÁRIA")]
    #[serde(rename = "SOLÁRIA")]
    Solaria,
}

impl ClosedSet for Cliente {
    const FIELD: &'static str = "cliente";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr, Serialize, Deserialize, ToSchema)]
pub enum FormaPagamento {
    #[strum(serialize = "PIX")]
    #[serde(rename = "PIX")]
    Pix,
    #[strum(serialize = "BOLETO")]
    #[serde(rename = "BOLETO")]
    Boleto,
    #[strum(serialize = "CARTÃO DE CRÉDITO")]
    #[serde(rename = "CARTÃO DE CRÉDITO")]
    CartaoDeCredito,
    #[strum(serialize = "TRANSFERÊNCIA")]
    #[serde(rename = "TRANSFERÊNCIA")]
    Transferencia,
}

impl ClosedSet for FormaPagamento {
    const FIELD: &'static str = "forma_de_pag";
}

/// Shared vocabulary of `status_cliente` and `status_aya`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr, Serialize, Deserialize, ToSchema)]
pub enum StatusPagamento {
    #[strum(serialize = "PENDENTE")]
    #[serde(rename = "PENDENTE")]
    Pendente,
    #[strum(serialize = "APROVADO")]
    #[serde(rename = "APROVADO")]
    Aprovado,
    #[strum(serialize = "PAGO")]
    #[serde(rename = "PAGO")]
    Pago,
}

impl ClosedSet for StatusPagamento {
    const FIELD: &'static str = "status";
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(""))]
    #[case(json!("   "))]
    #[case(json!(null))]
    #[case(json!([]))]
    fn blank_text_is_none(#[case] input: Value) {
        assert_eq!(clean_text(Some(&input)), None);
    }

    #[test]
    fn missing_text_is_none() {
        assert_eq!(clean_text(None), None);
    }

    #[test]
    fn text_is_trimmed_and_numbers_rendered() {
        assert_eq!(clean_text(Some(&json!("  inv 03 "))).as_deref(), Some("inv 03"));
        assert_eq!(clean_text(Some(&json!(42))).as_deref(), Some("42"));
        assert_eq!(upper_text(Some(&json!(" ufv-sol "))).as_deref(), Some("UFV-SOL"));
    }

    #[rstest]
    #[case("1.234,56", 1234.56)]
    #[case("1234,56", 1234.56)]
    #[case("1234.56", 1234.56)]
    #[case("1,234.56", 1234.56)]
    #[case("1.234.567", 1234567.0)]
    #[case(" R$ 12,5 ", 12.5)]
    #[case("-3,25", -3.25)]
    #[case("1.234", 1234.0)]
    #[case("-12.500", -12500.0)]
    #[case("0.125", 0.125)]
    #[case("1.5", 1.5)]
    #[case("1234.567", 1234.567)]
    fn numbers_with_either_separator(#[case] input: &str, #[case] expected: f64) {
        let parsed = parse_loose_number(Some(&json!(input))).unwrap();
        assert!((parsed - expected).abs() < 1e-9, "{input} -> {parsed}");
    }

    #[rstest]
    #[case(json!("abc"))]
    #[case(json!(""))]
    #[case(json!("1,2,3"))]
    #[case(json!("NaN"))]
    #[case(json!("inf"))]
    #[case(json!(true))]
    fn unparsable_numbers_are_none(#[case] input: Value) {
        assert_eq!(parse_loose_number(Some(&input)), None);
    }

    #[test]
    fn json_numbers_pass_through() {
        assert_eq!(parse_loose_number(Some(&json!(10.5))), Some(10.5));
        assert_eq!(parse_loose_int(Some(&json!(77123))), Some(77123));
        assert_eq!(parse_loose_int(Some(&json!("1.234,00"))), Some(1234));
        assert_eq!(parse_loose_int(Some(&json!("12,9"))), Some(12));
    }

    #[test]
    fn booleans_in_portuguese_and_english() {
        assert_eq!(parse_loose_bool(Some(&json!("Sim"))), Some(true));
        assert_eq!(parse_loose_bool(Some(&json!("não"))), Some(false));
        assert_eq!(parse_loose_bool(Some(&json!("NAO"))), Some(false));
        assert_eq!(parse_loose_bool(Some(&json!(1))), Some(true));
        assert_eq!(parse_loose_bool(Some(&json!("talvez"))), None);
    }

    #[test]
    fn dates_in_both_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(parse_loose_date(Some(&json!("2024-03-07"))), Some(expected));
        assert_eq!(
            parse_loose_date(Some(&json!("2024-03-07T10:00:00Z"))),
            Some(expected)
        );
        assert_eq!(parse_loose_date(Some(&json!("07/03/2024"))), Some(expected));
        assert_eq!(parse_loose_date(Some(&json!("2024-13-01"))), None);
        assert_eq!(parse_loose_date(Some(&json!(""))), None);
    }

    #[rstest]
    #[case("élis")]
    #[case("ELIS")]
    #[case("Élis")]
    #[case("  elis ")]
    fn client_variants_canonicalize(#[case] input: &str) {
        assert_eq!(Cliente::from_loose(input), Some(Cliente::Elis));
        assert_eq!(Cliente::from_loose(input).unwrap().as_str(), "ÉLIS");
    }

    #[test]
    fn whitespace_inside_enum_values_is_collapsed() {
        assert_eq!(
            FormaPagamento::from_loose("cartao   de credito"),
            Some(FormaPagamento::CartaoDeCredito)
        );
        assert_eq!(Cliente::from_loose("origo\tenergia"), Some(Cliente::OrigoEnergia));
        assert_eq!(StatusPagamento::from_loose("pago"), Some(StatusPagamento::Pago));
    }

    #[test]
    fn non_members_are_rejected() {
        assert_eq!(Cliente::from_loose("ACME"), None);
        assert_eq!(FormaPagamento::from_loose(""), None);
        assert!(matches!(
            StatusPagamento::require(Some(&json!("cancelado"))),
            Err(ServiceError::ValidationError(_))
        ));
        assert!(matches!(
            Cliente::require(None),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn record_ids_must_look_like_uuids() {
        let id = Uuid::new_v4();
        assert_eq!(validate_record_id(&id.to_string()).unwrap(), id);
        assert!(validate_record_id("123").is_err());
        assert!(validate_record_id("g0000000-0000-0000-0000-000000000000").is_err());
        assert!(validate_record_id(&format!("{} ", id)).is_err());
        assert!(validate_record_id(&id.simple().to_string()).is_err());
    }

    #[test]
    fn allowed_lists_keep_declaration_order() {
        assert_eq!(StatusPagamento::allowed(), vec!["PENDENTE", "APROVADO", "PAGO"]);
        assert_eq!(impact_label(true), "Sim");
        assert_eq!(impact_label(false), "Não");
    }
}
