//! Request language detection.
//!
//! A request's language is resolved once from an ordered set of
//! signals. The first signal that yields a valid ISO 639-1 style code
//! (2–3 lowercase ASCII letters, region subtag stripped) wins and later
//! signals are never consulted. Invalid signals are skipped, never
//! reported as errors: callers always get a usable code.

/// Language used when no signal produces a valid code, and the final
/// element of every [`FallbackChain`].
pub const DEFAULT_LANGUAGE: &str = "en";

/// Whether `code` is already a canonical language code.
pub fn is_valid_language_code(code: &str) -> bool {
    (2..=3).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_lowercase())
}

/// Reduce a language tag to its canonical primary subtag.
///
/// `" en-US "` → `en`, `"PT_br"` → `pt`. Returns `None` for anything
/// whose primary subtag is not 2–3 ASCII letters (`"123"`, `"english"`,
/// `"*"`).
pub fn parse_language_tag(raw: &str) -> Option<String> {
    let primary = raw.trim().split(['-', '_']).next()?;
    let code = primary.to_ascii_lowercase();
    is_valid_language_code(&code).then_some(code)
}

/// Pick the preferred language from an `Accept-Language` header value.
///
/// Entries are `tag[;q=weight]`; a missing weight means 1.0. Entries
/// with an invalid tag, a wildcard, or a weight that does not parse or
/// falls outside `(0, 1]` are discarded. The highest weight wins; equal
/// weights keep the earliest entry.
pub fn parse_accept_language(header: &str) -> Option<String> {
    let mut best: Option<(String, f32)> = None;

    for entry in header.split(',') {
        let mut parts = entry.split(';');
        let Some(tag) = parts.next().and_then(parse_language_tag) else {
            continue;
        };

        let mut quality = 1.0_f32;
        let mut valid = true;
        for param in parts {
            let param = param.trim();
            let Some(weight) = param
                .strip_prefix("q=")
                .or_else(|| param.strip_prefix("Q="))
            else {
                continue;
            };
            match weight.trim().parse::<f32>() {
                Ok(q) if q > 0.0 && q <= 1.0 => quality = q,
                _ => {
                    valid = false;
                    break;
                }
            }
        }
        if !valid {
            continue;
        }

        if best.as_ref().is_none_or(|(_, q)| quality > *q) {
            best = Some((tag, quality));
        }
    }

    best.map(|(tag, _)| tag)
}

/// Raw language signals gathered from a request, in priority order.
#[derive(Debug, Default, Clone, Copy)]
pub struct LanguageSignals<'a> {
    /// `?lang=` query parameter.
    pub query: Option<&'a str>,
    /// `X-Language` header.
    pub header: Option<&'a str>,
    /// `Accept-Language` header.
    pub accept_language: Option<&'a str>,
    /// Language already attached to the request context (for example
    /// the `lang` claim of an authenticated session).
    pub context: Option<&'a str>,
    /// Secondary stored preference (the `lang` cookie).
    pub cookie: Option<&'a str>,
}

/// Resolve the request language; falls back to [`DEFAULT_LANGUAGE`].
pub fn detect_language(signals: &LanguageSignals<'_>) -> String {
    signals
        .query
        .and_then(parse_language_tag)
        .or_else(|| signals.header.and_then(parse_language_tag))
        .or_else(|| signals.accept_language.and_then(parse_accept_language))
        .or_else(|| signals.context.and_then(parse_language_tag))
        .or_else(|| signals.cookie.and_then(parse_language_tag))
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

/// Ordered languages to try when looking up a localized resource:
/// the requested language, then English unless it already is English.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChain {
    primary: String,
}

impl FallbackChain {
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Iterate the chain. Each call starts again from the primary code.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        let fallback = (self.primary != DEFAULT_LANGUAGE).then_some(DEFAULT_LANGUAGE);
        std::iter::once(self.primary.as_str()).chain(fallback)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }
}

impl Default for FallbackChain {
    fn default() -> Self {
        fallback_chain(DEFAULT_LANGUAGE)
    }
}

pub fn fallback_chain(code: &str) -> FallbackChain {
    FallbackChain {
        primary: code.to_string(),
    }
}
