//! Conversion from a grounded Gemini response to [`Record`]s.
//!
//! Names, addresses, and links come from the maps grounding chunks. Phone
//! numbers only appear in the free-text answer, so they are attributed to a
//! business by the line ownership of the text: a number belongs to the most
//! recent business title seen above it.

use std::collections::HashMap;
use std::sync::LazyLock;

use mapcrawl_core::{QueryTuple, Record, PHONE_PLACEHOLDER};
use regex::Regex;

use crate::types::GenerateContentResponse;

/// Turkish landline/mobile numbers with optional `+90`/`0` prefix and loose spacing.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+90|0)?\s?[2-5][0-9]{2}\s?[0-9]{3}\s?[0-9]{2}\s?[0-9]{2}")
        .expect("valid phone regex")
});

const MAX_PHONES: usize = 2;
const UNKNOWN_NAME: &str = "Unknown business";

/// Distinct phone numbers in `text`, in order of first appearance, at most `limit`.
#[must_use]
pub fn extract_phones(text: &str, limit: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for m in PHONE_RE.find_iter(text) {
        let phone = m.as_str().trim().to_owned();
        if !out.contains(&phone) {
            out.push(phone);
        }
        if out.len() == limit {
            break;
        }
    }
    out
}

/// Group the phone numbers of `text` under the business titles they follow.
///
/// Returns `None` when the text names none of the titles, in which case the
/// caller falls back to the numbers of the whole text.
fn phones_by_title(text: &str, titles: &[&str]) -> Option<HashMap<String, Vec<String>>> {
    let mut owner: Option<&str> = None;
    let mut sections: HashMap<&str, String> = HashMap::new();

    for line in text.lines() {
        if let Some(title) = titles
            .iter()
            .copied()
            .filter(|t| !t.is_empty() && line.contains(*t))
            .max_by_key(|t| t.len())
        {
            owner = Some(title);
        }
        if let Some(title) = owner {
            let section = sections.entry(title).or_default();
            section.push_str(line);
            section.push('\n');
        }
    }

    if sections.is_empty() {
        return None;
    }

    Some(
        sections
            .into_iter()
            .map(|(title, section)| (title.to_owned(), extract_phones(&section, MAX_PHONES)))
            .collect(),
    )
}

/// Build one record per maps grounding chunk of `response`.
#[must_use]
pub fn records_from_response(response: &GenerateContentResponse, tuple: &QueryTuple) -> Vec<Record> {
    let text = response.text();
    let titles: Vec<&str> = response
        .maps_chunks()
        .filter_map(|m| m.title.as_deref())
        .collect();
    let attributed = phones_by_title(&text, &titles);
    let whole_text_phones = extract_phones(&text, MAX_PHONES);

    response
        .maps_chunks()
        .map(|chunk| {
            let name = chunk
                .title
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(UNKNOWN_NAME)
                .to_owned();

            let phones = match &attributed {
                Some(map) => map.get(&name).cloned().unwrap_or_default(),
                None => whole_text_phones.clone(),
            };
            let phone = if phones.is_empty() {
                PHONE_PLACEHOLDER.to_owned()
            } else {
                phones.join(", ")
            };

            let address = chunk
                .address
                .clone()
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| format!("{} {}", tuple.city, tuple.zone));

            Record {
                id: Record::next_id(),
                name,
                address,
                phone,
                city: tuple.city.clone(),
                district: tuple.zone.to_string(),
                category: tuple.category.clone(),
                source_url: chunk.uri.clone().unwrap_or_else(|| "#".to_owned()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use mapcrawl_core::Zone;
    use serde_json::json;

    use super::*;

    fn tuple() -> QueryTuple {
        QueryTuple::new("Istanbul", Zone::Center, "Dentist")
    }

    fn response(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).expect("fixture should deserialize")
    }

    #[test]
    fn extract_phones_dedups_and_limits() {
        let text = "Call 0212 555 12 34 or 0212 555 12 34, mobile 0532 111 22 33, fax 0212 999 88 77";
        assert_eq!(
            extract_phones(text, 2),
            vec!["0212 555 12 34", "0532 111 22 33"]
        );
    }

    #[test]
    fn extract_phones_accepts_country_prefix() {
        assert_eq!(extract_phones("+90 216 444 55 66", 2), vec!["+90 216 444 55 66"]);
    }

    #[test]
    fn extract_phones_none_found() {
        assert!(extract_phones("no numbers here", 2).is_empty());
    }

    #[test]
    fn phones_are_attributed_to_the_business_they_follow() {
        let resp = response(json!({
            "candidates": [{
                "content": { "parts": [{ "text":
                    "1. Smile Dental\n   Phone: 0212 555 12 34\n2. Pearl Clinic\n   Phone: 0216 444 55 66, 0532 111 22 33\n"
                }]},
                "groundingMetadata": { "groundingChunks": [
                    { "maps": { "title": "Smile Dental", "uri": "https://maps.google.com/?cid=1", "address": "Bağdat Cd. 1" } },
                    { "maps": { "title": "Pearl Clinic", "uri": "https://maps.google.com/?cid=2" } }
                ]}
            }]
        }));

        let records = records_from_response(&resp, &tuple());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Smile Dental");
        assert_eq!(records[0].phone, "0212 555 12 34");
        assert_eq!(records[0].address, "Bağdat Cd. 1");
        assert_eq!(records[1].name, "Pearl Clinic");
        assert_eq!(records[1].phone, "0216 444 55 66, 0532 111 22 33");
    }

    #[test]
    fn missing_fields_fall_back() {
        let resp = response(json!({
            "candidates": [{
                "groundingMetadata": { "groundingChunks": [ { "maps": {} } ] }
            }]
        }));

        let records = records_from_response(&resp, &tuple());
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.name, "Unknown business");
        assert_eq!(r.address, "Istanbul Center");
        assert_eq!(r.phone, PHONE_PLACEHOLDER);
        assert_eq!(r.source_url, "#");
        assert_eq!(r.city, "Istanbul");
        assert_eq!(r.district, "Center");
        assert_eq!(r.category, "Dentist");
        assert!(r.id.starts_with("rec-"));
    }

    #[test]
    fn unattributable_text_falls_back_to_whole_text_numbers() {
        let resp = response(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Numbers: 0212 555 12 34" }]},
                "groundingMetadata": { "groundingChunks": [
                    { "maps": { "title": "Smile Dental" } }
                ]}
            }]
        }));

        let records = records_from_response(&resp, &tuple());
        assert_eq!(records[0].phone, "0212 555 12 34");
    }

    #[test]
    fn business_without_numbers_gets_placeholder() {
        let resp = response(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Smile Dental\nPearl Clinic 0216 444 55 66" }]},
                "groundingMetadata": { "groundingChunks": [
                    { "maps": { "title": "Smile Dental" } },
                    { "maps": { "title": "Pearl Clinic" } }
                ]}
            }]
        }));

        let records = records_from_response(&resp, &tuple());
        assert_eq!(records[0].phone, PHONE_PLACEHOLDER);
        assert_eq!(records[1].phone, "0216 444 55 66");
    }

    #[test]
    fn no_grounding_means_no_records() {
        let resp = response(json!({
            "candidates": [{ "content": { "parts": [{ "text": "I could not find any." }]} }]
        }));
        assert!(records_from_response(&resp, &tuple()).is_empty());
    }
}
