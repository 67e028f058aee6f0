//! Directory listing parser
//!
//! A frequency search on the directory returns one HTML page with a repeating
//! block per stream. Each block starts with the origin row and carries the
//! stream name, its feed status, a link to the stream and a facilities table
//! listing everything the stream covers:
//!
//! ```text
//! <tr><td><strong>ICAO: </strong>KSFO<strong> ...
//! <td bgcolor="lightblue"><strong>KSFO Tower</strong>
//! <tr><td><strong>Feed Status:</strong> <font color="green"><strong>UP</strong>
//! <a href="/play/ksfo_twr.pls" onClick=...
//! <table class="freqTable"> <tr><td class="td1">...</tr> ...
//! ```
//!
//! The number of facilities rows is the candidate's specificity: a stream
//! covering fewer facilities is more specific to the searched frequency.

use regex::Regex;
use tracing::{debug, warn};
use url::Url;

use atc_core::{CandidateSet, StreamCandidate};

use crate::error::{ParseAnomaly, ResolveError};

/// Marks the start of one stream block
const SECTION_MARKER: &str = "<tr><td><strong>ICAO:";

/// Start of the facilities table inside a block
const FACILITIES_TABLE: &str = "<table class=\"freqTable\"";

/// One row of the facilities table
const FACILITY_ROW: &str = "<tr><td class=\"td";

/// Feed status of a stream that is online
const STATUS_UP: &str = "UP";

/// Outcome of parsing one listing page
#[derive(Debug, Clone, Default)]
pub struct ListingParse {
    /// Streams that are up, merged by origin
    pub candidates: CandidateSet,
    /// Blocks that could not be read completely
    pub anomalies: Vec<ParseAnomaly>,
    /// Number of blocks skipped because the feed was not up
    pub down: usize,
}

/// Compiled patterns for reading listing pages and playlists
#[derive(Debug, Clone)]
pub struct ListingParser {
    base_url: Url,
    origin: Regex,
    label: Regex,
    status: Regex,
    link: Regex,
    playlist_entry: Regex,
}

impl ListingParser {
    /// Create a parser that resolves relative links against `base_url`
    pub fn new(base_url: &str) -> Result<Self, ResolveError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            origin: Regex::new(r"<tr><td><strong>ICAO: </strong>(\w\w\w\w)<strong>")?,
            label: Regex::new(r#"<td bgcolor="lightblue"><strong>(.+?)</strong>"#)?,
            status: Regex::new(
                r#"<tr><td><strong>Feed Status:</strong> <font color=\\?"\w+\\?"><strong>(\w+)</strong>"#,
            )?,
            link: Regex::new(r#"<a href="(.+?)" onClick="#)?,
            playlist_entry: Regex::new(r"File1=(http\S+)")?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Parse a listing page into candidates
    ///
    /// Blocks missing their origin, name or link are skipped and reported as
    /// anomalies. A block without a feed status is assumed to be up.
    pub fn parse(&self, body: &str) -> ListingParse {
        let mut result = ListingParse::default();

        for section in split_sections(body) {
            match self.parse_section(section, &mut result.anomalies) {
                Ok(Some(candidate)) => {
                    result.candidates.insert(candidate);
                }
                Ok(None) => result.down += 1,
                Err(anomaly) => {
                    warn!("{}", anomaly);
                    result.anomalies.push(anomaly);
                }
            }
        }

        result
    }

    /// Read one block; `Ok(None)` means the feed is not up
    fn parse_section(
        &self,
        section: &str,
        anomalies: &mut Vec<ParseAnomaly>,
    ) -> Result<Option<StreamCandidate>, ParseAnomaly> {
        let origin = capture(&self.origin, section).ok_or(ParseAnomaly::MissingOrigin)?;
        let label = capture(&self.label, section).ok_or_else(|| ParseAnomaly::MissingLabel {
            origin: origin.to_string(),
        })?;

        match capture(&self.status, section) {
            None => {
                let anomaly = ParseAnomaly::MissingStatus {
                    label: label.to_string(),
                };
                warn!("{}", anomaly);
                anomalies.push(anomaly);
            }
            Some(status) if status != STATUS_UP => {
                debug!("Stream '{}' is {}, skipping", label, status);
                return Ok(None);
            }
            Some(_) => {}
        }

        let href = capture(&self.link, section).ok_or_else(|| ParseAnomaly::MissingUrl {
            label: label.to_string(),
        })?;
        let url = if href.starts_with("http") {
            href.to_string()
        } else {
            self.base_url
                .join(href)
                .map_err(|_| ParseAnomaly::MissingUrl {
                    label: label.to_string(),
                })?
                .to_string()
        };

        Ok(Some(StreamCandidate::new(
            origin,
            label,
            url,
            count_facilities(section),
        )))
    }

    /// First playable reference of a playlist, if any
    pub fn playlist_entry(&self, playlist: &str) -> Option<String> {
        capture(&self.playlist_entry, playlist).map(str::to_string)
    }
}

fn capture<'a>(re: &Regex, haystack: &'a str) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Split a listing page into per-stream blocks
fn split_sections(body: &str) -> Vec<&str> {
    let starts: Vec<usize> = body.match_indices(SECTION_MARKER).map(|(i, _)| i).collect();
    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(body.len());
            &body[start..end]
        })
        .collect()
}

/// Count facilities table rows in a block
fn count_facilities(section: &str) -> u32 {
    match section.find(FACILITIES_TABLE) {
        Some(pos) => section[pos..].matches(FACILITY_ROW).count() as u32,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(origin: &str, label: &str, status: Option<&str>, href: &str, rows: usize) -> String {
        let mut s = format!(
            "<tr><td><strong>ICAO: </strong>{origin}<strong> IATA: </strong>XXX</td></tr>\n\
             <tr><td bgcolor=\"lightblue\"><strong>{label}</strong></td></tr>\n"
        );
        if let Some(status) = status {
            s.push_str(&format!(
                "<tr><td><strong>Feed Status:</strong> <font color=\"green\"><strong>{status}</strong></font></td></tr>\n"
            ));
        }
        s.push_str(&format!(
            "<tr><td><a href=\"{href}\" onClick=\"return false;\">Listen</a></td></tr>\n"
        ));
        s.push_str("<table class=\"freqTable\"><tr><th>Facility</th><th>Frequency</th></tr>\n");
        for i in 0..rows {
            s.push_str(&format!("<tr><td class=\"td{}\">Facility {i}</td></tr>\n", i % 2 + 1));
        }
        s.push_str("</table>\n");
        s
    }

    fn parser() -> ListingParser {
        ListingParser::new("https://www.liveatc.net").unwrap()
    }

    #[test]
    fn test_parse_single_block() {
        let body = block("KSFO", "KSFO Tower", Some("UP"), "/play/ksfo_twr.pls", 2);
        let parsed = parser().parse(&body);

        assert_eq!(parsed.candidates.len(), 1);
        let c = parsed.candidates.get("KSFO").unwrap();
        assert_eq!(c.label, "KSFO Tower");
        assert_eq!(c.url, "https://www.liveatc.net/play/ksfo_twr.pls");
        assert_eq!(c.specificity, 2);
        assert!(parsed.anomalies.is_empty());
    }

    #[test]
    fn test_absolute_url_kept() {
        let body = block("KJFK", "KJFK Ground", Some("UP"), "http://d.liveatc.net/kjfk_gnd", 1);
        let parsed = parser().parse(&body);
        assert_eq!(
            parsed.candidates.get("KJFK").map(|c| c.url.as_str()),
            Some("http://d.liveatc.net/kjfk_gnd")
        );
    }

    #[test]
    fn test_down_streams_dropped() {
        let body = format!(
            "{}{}",
            block("KSFO", "KSFO Tower", Some("DOWN"), "/play/a.pls", 1),
            block("KOAK", "KOAK Tower", Some("UP"), "/play/b.pls", 1)
        );
        let parsed = parser().parse(&body);
        assert_eq!(parsed.candidates.origins(), vec!["KOAK"]);
        assert_eq!(parsed.down, 1);
    }

    #[test]
    fn test_missing_status_assumed_up() {
        let body = block("EGLL", "EGLL Director", None, "/play/egll.pls", 3);
        let parsed = parser().parse(&body);
        assert_eq!(parsed.candidates.len(), 1);
        assert_eq!(
            parsed.anomalies,
            vec![ParseAnomaly::MissingStatus {
                label: "EGLL Director".into()
            }]
        );
    }

    #[test]
    fn test_block_without_link_skipped() {
        let mut body = block("KSFO", "KSFO Tower", Some("UP"), "/play/a.pls", 1);
        body = body.replace("onClick", "data-x");
        body.push_str(&block("KSJC", "KSJC Tower", Some("UP"), "/play/b.pls", 1));

        let parsed = parser().parse(&body);
        assert_eq!(parsed.candidates.origins(), vec!["KSJC"]);
        assert_eq!(
            parsed.anomalies,
            vec![ParseAnomaly::MissingUrl {
                label: "KSFO Tower".into()
            }]
        );
    }

    #[test]
    fn test_more_specific_block_wins() {
        let body = format!(
            "{}{}",
            block("KSFO", "KSFO Bay Approach", Some("UP"), "/play/ksfo_app.pls", 3),
            block("KSFO", "KSFO Tower", Some("UP"), "/play/ksfo_twr.pls", 1)
        );
        let parsed = parser().parse(&body);
        let c = parsed.candidates.get("KSFO").unwrap();
        assert_eq!(c.specificity, 1);
        assert_eq!(c.label, "KSFO Tower");
    }

    #[test]
    fn test_playlist_entry() {
        let pls = "[playlist]\nFile1=http://d.liveatc.net/kjfk_gnd\nTitle1=KJFK Ground\n";
        assert_eq!(
            parser().playlist_entry(pls).as_deref(),
            Some("http://d.liveatc.net/kjfk_gnd")
        );
        assert_eq!(parser().playlist_entry("[playlist]\nNumberOfEntries=0\n"), None);
    }

    #[test]
    fn test_empty_page() {
        let parsed = parser().parse("<html><body>No results</body></html>");
        assert!(parsed.candidates.is_empty());
        assert!(parsed.anomalies.is_empty());
    }
}
