// Request Body Decoding
//
// Dispatches on the declared Content-Type and feeds body fields into a Harvest.
//
//   application/x-www-form-urlencoded  -> key/value pairs
//   multipart/form-data                -> non-file fields, bounded by MAX_MULTIPART_BYTES
//   application/json                   -> recursive object walk (walker.rs)
//   *xml*                              -> substring tag scan, NOT an XML parser
//   anything else                      -> ignored
//
// Decode failures skip the body silently; the rest of the request is still harvested.

use super::classifier::CredentialClassifier;
use super::walker::walk_json;
use crate::models::{Category, Harvest};
use bytes::Bytes;
use multer::{Constraints, Multipart, SizeLimit};
use serde_json::{Map, Value};
use tracing::debug;

pub const MAX_MULTIPART_BYTES: u64 = 32 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Form,
    Multipart,
    Json,
    Xml,
    Other,
}

impl BodyKind {
    pub fn from_content_type(content_type: &str) -> Self {
        let ct = content_type.to_ascii_lowercase();
        if ct.starts_with("application/x-www-form-urlencoded") {
            BodyKind::Form
        } else if ct.starts_with("multipart/form-data") {
            BodyKind::Multipart
        } else if ct.starts_with("application/json") {
            BodyKind::Json
        } else if ct.contains("xml") {
            BodyKind::Xml
        } else {
            BodyKind::Other
        }
    }
}

/// Records body parameters and credential-shaped values for one request.
pub async fn harvest_body(content_type: Option<&str>, body: &Bytes, harvest: &mut Harvest) {
    let Some(content_type) = content_type else {
        return;
    };
    match BodyKind::from_content_type(content_type) {
        BodyKind::Form => harvest_fields(form_fields(body), harvest),
        BodyKind::Multipart => match multipart_fields(content_type, body.clone()).await {
            Ok(fields) => harvest_fields(fields, harvest),
            Err(e) => debug!(error = %e, "skipping malformed multipart body"),
        },
        BodyKind::Json => match decode_json_object(body) {
            Some(object) => walk_json(&object, harvest),
            None => debug!("skipping undecodable JSON body"),
        },
        BodyKind::Xml => harvest_xml(body, harvest),
        BodyKind::Other => {}
    }
}

/// Keys go to parameters, values through the credential heuristic.
pub fn harvest_fields(fields: Vec<(String, String)>, harvest: &mut Harvest) {
    for (key, value) in fields {
        harvest.record(Category::Parameters, key.as_str());
        CredentialClassifier::inspect(harvest, &key, &value);
    }
}

pub fn form_fields(body: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Named, non-file fields of a multipart/form-data body. Any error discards the whole body.
pub async fn multipart_fields(
    content_type: &str,
    body: Bytes,
) -> Result<Vec<(String, String)>, multer::Error> {
    let boundary = multer::parse_boundary(content_type)?;
    let constraints =
        Constraints::new().size_limit(SizeLimit::new().whole_stream(MAX_MULTIPART_BYTES));
    let stream = futures_util::stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut multipart = Multipart::with_constraints(stream, boundary, constraints);

    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(|n| n.to_string());
        if field.file_name().is_some() {
            field.bytes().await?;
            continue;
        }
        let value = field.text().await?;
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            fields.push((name, value));
        }
    }
    Ok(fields)
}

/// Decodes the first JSON value of the body; it must be an object.
pub fn decode_json_object(body: &[u8]) -> Option<Map<String, Value>> {
    serde_json::Deserializer::from_slice(body)
        .into_iter::<Map<String, Value>>()
        .next()?
        .ok()
}

/// Finds `<key>value</key>` pairs for every credential key in the lowercased body.
///
/// Known limitation: nested, repeated or interleaved tags can pair the wrong
/// open and close tags. Values come back lowercased and trimmed.
pub fn scan_xml_tags(body: &[u8]) -> Vec<(&'static str, String)> {
    let lower = String::from_utf8_lossy(body).to_lowercase();
    let mut found = Vec::new();

    for key in CredentialClassifier::candidate_keys() {
        let open_tag = format!("<{}>", key);
        let close_tag = format!("</{}>", key);
        let mut idx = 0;
        while let Some(open_rel) = lower[idx..].find(&open_tag) {
            let open_at = idx + open_rel;
            let close_at = match lower[open_at..].find(&close_tag) {
                Some(rel) => open_at + rel,
                None => break,
            };
            let value = lower[open_at + open_tag.len()..close_at].trim();
            found.push((key, value.to_string()));
            idx = close_at + close_tag.len();
        }
    }
    found
}

fn harvest_xml(body: &[u8], harvest: &mut Harvest) {
    for (key, value) in scan_xml_tags(body) {
        CredentialClassifier::inspect(harvest, key, &value);
    }
    // every candidate is a parameter name, matched or not
    for key in CredentialClassifier::candidate_keys() {
        harvest.record(Category::Parameters, key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_dispatch() {
        assert_eq!(
            BodyKind::from_content_type("application/x-www-form-urlencoded; charset=utf-8"),
            BodyKind::Form
        );
        assert_eq!(
            BodyKind::from_content_type("multipart/form-data; boundary=x"),
            BodyKind::Multipart
        );
        assert_eq!(BodyKind::from_content_type("Application/JSON"), BodyKind::Json);
        assert_eq!(BodyKind::from_content_type("text/xml"), BodyKind::Xml);
        assert_eq!(BodyKind::from_content_type("application/soap+xml"), BodyKind::Xml);
        assert_eq!(BodyKind::from_content_type("text/plain"), BodyKind::Other);
    }

    #[test]
    fn form_fields_are_decoded() {
        let fields = form_fields(b"user=alice&pass=s%26cret&remember=on");
        assert_eq!(
            fields,
            vec![
                ("user".to_string(), "alice".to_string()),
                ("pass".to_string(), "s&cret".to_string()),
                ("remember".to_string(), "on".to_string()),
            ]
        );
    }

    #[test]
    fn json_must_be_an_object() {
        assert!(decode_json_object(br#"{"a":1}"#).is_some());
        assert!(decode_json_object(br#"[{"a":1}]"#).is_none());
        assert!(decode_json_object(b"{not json").is_none());
        assert!(decode_json_object(b"").is_none());
    }

    #[test]
    fn xml_scan_finds_repeated_tags() {
        let body = b"<Login><User> Alice </User><PASSWORD>Secret</PASSWORD><user>bob</user></Login>";
        let found = scan_xml_tags(body);
        assert!(found.contains(&("user", "alice".to_string())));
        assert!(found.contains(&("user", "bob".to_string())));
        assert!(found.contains(&("password", "secret".to_string())));
        assert!(found.contains(&("login", "<user> alice </user><password>secret</password><user>bob</user>".to_string())));
    }

    #[test]
    fn xml_scan_stops_without_close_tag() {
        assert!(scan_xml_tags(b"<token>abc").is_empty());
    }

    #[test]
    fn xml_records_every_candidate_key() {
        let mut harvest = Harvest::new();
        harvest_xml(b"<nothing/>", &mut harvest);
        for key in CredentialClassifier::candidate_keys() {
            assert!(harvest.contains(&Category::Parameters, key));
        }
        assert!(harvest.values(&Category::Users).is_empty());
    }

    #[tokio::test]
    async fn multipart_skips_file_parts() {
        let body = Bytes::from_static(
            b"--XyZ\r\n\
Content-Disposition: form-data; name=\"username\"\r\n\r\n\
carol\r\n\
--XyZ\r\n\
Content-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\n\
Content-Type: text/plain\r\n\r\n\
file contents\r\n\
--XyZ--\r\n",
        );
        let fields = multipart_fields("multipart/form-data; boundary=XyZ", body)
            .await
            .unwrap();
        assert_eq!(fields, vec![("username".to_string(), "carol".to_string())]);
    }

    #[tokio::test]
    async fn multipart_without_boundary_is_an_error() {
        let result = multipart_fields("multipart/form-data", Bytes::from_static(b"junk")).await;
        assert!(result.is_err());
    }
}
