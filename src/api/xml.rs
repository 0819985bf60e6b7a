//! quick-xml helpers shared by the endpoint parsers.
//!
//! The BetaFace responses are flat XML documents; parsers only ever need
//! "first text of the element at this path, anywhere in the document" plus
//! one repeated-element collection for recognition matches. Paths match as a
//! suffix of the open-element stack, so `["faces", "FaceInfo", "uid"]`
//! behaves like ElementTree's `.//faces/FaceInfo/uid`.

use crate::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

fn stack_ends_with(stack: &[String], path: &[&str]) -> bool {
    if stack.len() < path.len() {
        return false;
    }
    stack[stack.len() - path.len()..]
        .iter()
        .zip(path.iter())
        .all(|(have, want)| have == want)
}

/// Text content of the first element whose path ends with `path`.
///
/// Empty and self-closing elements yield an empty string; a missing element
/// yields `None`.
pub fn first_text_at(xml: &str, path: &[&str]) -> Result<Option<String>> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push(name);
                if stack_ends_with(&stack, path) {
                    let mut text_buf = Vec::new();
                    if let Ok(Event::Text(te)) = reader.read_event_into(&mut text_buf) {
                        return Ok(Some(te.unescape().unwrap_or_default().into_owned()));
                    }
                    return Ok(Some(String::new()));
                }
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push(name);
                let hit = stack_ends_with(&stack, path);
                stack.pop();
                if hit {
                    return Ok(Some(String::new()));
                }
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }
    Ok(None)
}

/// The readiness flag shared by every endpoint.
///
/// The wire value is an integer status code where `0` means success, so the
/// boolean is inverted relative to the raw text. A document without an
/// `int_response` element fails parsing outright.
pub fn ready_flag(xml: &str) -> Result<bool> {
    let raw = first_text_at(xml, &["int_response"])?
        .ok_or(Error::MissingField("int_response"))?;
    Ok(raw.trim() == "0")
}

/// Collect every `PersonMatchInfo` entry under the recognition-result path.
///
/// Returns `(person_name, confidence)` pairs in document order. An entry
/// missing either child, or carrying a non-numeric confidence, fails the
/// parse: a malformed vendor response must not be reported as fewer matches.
pub fn person_matches(xml: &str) -> Result<Vec<(String, f64)>> {
    const MATCH_PATH: [&str; 4] = [
        "faces_matches",
        "FaceRecognizeInfo",
        "matches",
        "PersonMatchInfo",
    ];

    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut matches = Vec::new();
    let mut in_match = false;
    let mut person_name: Option<String> = None;
    let mut confidence: Option<String> = None;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push(name.clone());
                if stack_ends_with(&stack, &MATCH_PATH) {
                    in_match = true;
                    person_name = None;
                    confidence = None;
                } else if in_match && (name == "person_name" || name == "confidence") {
                    let mut text_buf = Vec::new();
                    if let Ok(Event::Text(te)) = reader.read_event_into(&mut text_buf) {
                        let text = te.unescape().unwrap_or_default().into_owned();
                        if name == "person_name" {
                            person_name = Some(text);
                        } else {
                            confidence = Some(text);
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                if in_match && e.local_name().as_ref() == b"PersonMatchInfo" {
                    in_match = false;
                    let name = person_name.take().ok_or(Error::MissingField("person_name"))?;
                    let raw = confidence.take().ok_or(Error::MissingField("confidence"))?;
                    let score: f64 = raw.trim().parse().map_err(|_| {
                        Error::Api(format!("confidence '{}' is not a number", raw))
                    })?;
                    matches.push((name, score));
                }
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }
    Ok(matches)
}
