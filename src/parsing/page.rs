use std::borrow::Cow;

use html_escape::decode_html_entities;
use kuchiki::{NodeRef, traits::TendrilSink};
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};

pub const XSRF_COOKIE: &str = "XSRF-TOKEN";

static DATA_PAGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"data-page="([^"]+)""#).unwrap());

/// Pulls the raw, still JSON-encoded page object out of the entry page HTML.
///
/// The page object is the bootstrap payload of the client-rendered app; its `version`
/// field has to be echoed back on every later request.
pub trait HandshakeExtractor: Send + Sync {
    fn page_json(&self, html: &str) -> Option<String>;

    fn version(&self, html: &str) -> Result<String> {
        let json = self
            .page_json(html)
            .ok_or_else(|| Error::Protocol("could not find data-page attribute".into()))?;
        parse_version(&json)
    }
}

/// Scans the raw markup for `data-page="..."`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexExtractor;

impl HandshakeExtractor for RegexExtractor {
    fn page_json(&self, html: &str) -> Option<String> {
        DATA_PAGE_REGEX
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| decode_html_entities(m.as_str()).into_owned())
    }
}

/// Parses the document and reads the first `[data-page]` attribute.
#[derive(Debug, Default, Clone, Copy)]
pub struct DomExtractor;

impl HandshakeExtractor for DomExtractor {
    fn page_json(&self, html: &str) -> Option<String> {
        let document = parse_document(html);
        let node = document.select("[data-page]").ok()?.next()?;
        let attrs = node.attributes.borrow();
        attrs
            .get("data-page")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

pub fn parse_document(html: &str) -> NodeRef {
    kuchiki::parse_html().one(html)
}

fn parse_version(page_json: &str) -> Result<String> {
    let page: Value = serde_json::from_str(page_json)
        .map_err(|e| Error::Protocol(format!("data-page is not valid JSON: {e}")))?;

    let version = match page.get("version") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(Error::Protocol("could not find inertia version".into())),
    };

    Ok(version)
}

/// Finds the CSRF cookie among `(name, value)` pairs and percent-decodes it.
pub fn find_xsrf_token<'a, I>(cookies: I) -> Option<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    cookies
        .into_iter()
        .find(|(name, _)| *name == XSRF_COOKIE)
        .map(|(_, value)| percent_decode(value))
        .filter(|token| !token.is_empty())
}

/// Splits a `Cookie` request header value (`a=1; b=2`) into pairs.
pub fn cookie_pairs(header: &str) -> impl Iterator<Item = (&str, &str)> {
    header.split(';').filter_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        Some((name.trim(), value.trim()))
    })
}

fn percent_decode(value: &str) -> String {
    match percent_decode_str(value).decode_utf8() {
        Ok(Cow::Borrowed(s)) => s.to_string(),
        Ok(Cow::Owned(s)) => s,
        Err(_) => percent_decode_str(value).decode_utf8_lossy().into_owned(),
    }
}
