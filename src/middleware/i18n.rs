// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

use crate::common::i18n;

// Extrator de idioma, lido do cabeçalho Accept-Language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Locale {
    /// Idiomas fora do catálogo caem no padrão.
    #[cfg(test)]
    pub fn new(lang: &str) -> Self {
        if i18n::is_supported(lang) {
            Locale(lang.to_string())
        } else {
            Locale::default()
        }
    }

    pub fn lang(&self) -> &str {
        &self.0
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_str| {
                // "ru-RU" -> "ru"; pega o primeiro idioma suportado
                accept_language::parse(header_str)
                    .iter()
                    .map(|tag| tag.split('-').next().unwrap_or(tag.as_str()).to_ascii_lowercase())
                    .find(|lang| i18n::is_supported(lang))
            })
            .map(Locale)
            .unwrap_or_default()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale(i18n::DEFAULT_LANG.to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn picks_first_supported_language() {
        assert_eq!(Locale::from_headers(&headers("de-DE, en-US;q=0.8")).lang(), "en");
        assert_eq!(Locale::from_headers(&headers("ru-RU,ru;q=0.9")).lang(), "ru");
    }

    #[test]
    fn defaults_to_russian() {
        assert_eq!(Locale::from_headers(&HeaderMap::new()).lang(), "ru");
        assert_eq!(Locale::from_headers(&headers("fr")).lang(), "ru");
        assert_eq!(Locale::new("xx").lang(), "ru");
    }
}
