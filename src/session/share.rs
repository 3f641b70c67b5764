//! Shareable links carrying the current input and output.

use std::fmt;

use url::Url;

/// Query parameter holding the input text.
pub const INPUT_PARAM: &str = "input";

/// Query parameter holding the output text.
pub const OUTPUT_PARAM: &str = "output";

/// A URL whose `input`/`output` query parameters reproduce a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    url: Url,
}

impl ShareLink {
    /// Build a link on `base`, replacing any existing query.
    pub fn new(base: &Url, input: &str, output: &str) -> Self {
        let mut url = base.clone();
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair(INPUT_PARAM, input)
            .append_pair(OUTPUT_PARAM, output);
        Self { url }
    }

    pub fn parse(link: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            url: Url::parse(link)?,
        })
    }

    /// Decoded `input` parameter.
    pub fn input(&self) -> Option<String> {
        self.param(INPUT_PARAM)
    }

    /// Decoded `output` parameter.
    pub fn output(&self) -> Option<String> {
        self.param(OUTPUT_PARAM)
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    fn param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

impl fmt::Display for ShareLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
