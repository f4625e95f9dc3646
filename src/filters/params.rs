// src/filters/params.rs

// Leitura tolerante da query string.
// Valores malformados são ignorados (como se o parâmetro não tivesse sido enviado).

use std::{collections::HashMap, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub type Params = HashMap<String, String>;

/// Flags aceitam "on" (formulários) e "true" (API).
pub fn flag(params: &Params, key: &str) -> bool {
    params
        .get(key)
        .map(|v| {
            let v = v.trim();
            v.eq_ignore_ascii_case("on") || v.eq_ignore_ascii_case("true")
        })
        .unwrap_or(false)
}

/// Texto não vazio, sem espaços nas pontas.
pub fn text<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Números, UUIDs, etc. Falha de parse = parâmetro ausente.
pub fn parsed<T: FromStr>(params: &Params, key: &str) -> Option<T> {
    text(params, key).and_then(|v| v.parse().ok())
}

// Como completar uma data sem horário
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBound {
    Start,
    End,
}

/// Aceita RFC 3339, "YYYY-MM-DDTHH:MM:SS", "YYYY-MM-DD HH:MM:SS" (UTC) ou só a data.
pub fn timestamp(value: &str, bound: DayBound) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let naive = match bound {
        DayBound::Start => date.and_hms_opt(0, 0, 0)?,
        DayBound::End => date.and_hms_micro_opt(23, 59, 59, 999_999)?,
    };
    Some(naive.and_utc())
}

/// Todos os aliases válidos valem juntos: fica o limite mais apertado
/// (o maior para `Start`, o menor para `End`).
pub fn timestamp_param(params: &Params, keys: &[&str], bound: DayBound) -> Option<DateTime<Utc>> {
    let values = keys
        .iter()
        .filter_map(|key| text(params, key))
        .filter_map(|value| timestamp(value, bound));
    match bound {
        DayBound::Start => values.max(),
        DayBound::End => values.min(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn flags_accept_on_and_true_only() {
        let p = params(&[("a", "on"), ("b", "TRUE"), ("c", "false"), ("d", "1"), ("e", " true ")]);
        assert!(flag(&p, "a"));
        assert!(flag(&p, "b"));
        assert!(!flag(&p, "c"));
        assert!(!flag(&p, "d"));
        assert!(flag(&p, "e"));
        assert!(!flag(&p, "missing"));
    }

    #[test]
    fn malformed_numbers_are_ignored() {
        let p = params(&[("n", "12"), ("bad", "doze"), ("blank", "  ")]);
        assert_eq!(parsed::<i32>(&p, "n"), Some(12));
        assert_eq!(parsed::<i32>(&p, "bad"), None);
        assert_eq!(parsed::<i32>(&p, "blank"), None);
    }

    #[test]
    fn parses_timestamp_formats() {
        let rfc = timestamp("2025-03-14T10:00:00+03:00", DayBound::Start).unwrap();
        assert_eq!(rfc.hour(), 7);

        let naive = timestamp("2025-03-14 10:30:00", DayBound::Start).unwrap();
        assert_eq!((naive.hour(), naive.minute()), (10, 30));

        let start = timestamp("2025-03-14", DayBound::Start).unwrap();
        assert_eq!((start.day(), start.hour()), (14, 0));

        let end = timestamp("2025-03-14", DayBound::End).unwrap();
        assert_eq!((end.day(), end.hour(), end.minute()), (14, 23, 59));

        assert_eq!(timestamp("14/03/2025", DayBound::Start), None);
    }

    #[test]
    fn timestamp_param_skips_malformed_alias() {
        let p = params(&[("date_from", "lixo"), ("created_after", "2025-01-02")]);
        let ts = timestamp_param(&p, &["date_from", "created_after"], DayBound::Start).unwrap();
        assert_eq!(ts.day(), 2);
        assert_eq!(timestamp_param(&params(&[("date_from", "lixo")]), &["date_from"], DayBound::Start), None);
    }

    #[test]
    fn timestamp_param_applies_every_alias() {
        let p = params(&[
            ("date_from", "2025-01-05"),
            ("created_after", "2025-01-02"),
            ("date_to", "2025-02-10"),
            ("created_before", "2025-02-01"),
        ]);
        let from = timestamp_param(&p, &["date_from", "created_after"], DayBound::Start).unwrap();
        assert_eq!(from.day(), 5);
        let to = timestamp_param(&p, &["date_to", "created_before"], DayBound::End).unwrap();
        assert_eq!((to.month(), to.day(), to.hour()), (2, 1, 23));
    }
}
