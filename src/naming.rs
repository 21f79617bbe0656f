//! Type and field name synthesis.
//!
//! Every generated identifier comes from here, so the casing rules are applied
//! the same way to message names, nested type names and field names:
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `["trip_created"]`, v2, disambiguated | [`synthesize`] | `TripCreatedV2` |
//! | `["TripCreated", "vehicle"]` | [`synthesize`] | `TripCreatedVehicle` |
//! | `user_id` | [`field_name`] | `UserID` |
//! | `TripCreated` | [`factory_name`] | `NewTripCreatedData` |

use lazy_static::lazy_static;

lazy_static! {
    /// Known initialisms, longest first so a suffix check is deterministic.
    static ref COMMON_INITIALISMS: Vec<&'static str> = {
        let mut initialisms = vec![
            "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS",
            "ID", "IP", "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH",
            "TCP", "TLS", "TTL", "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML",
            "XMPP", "XSRF", "XSS",
        ];
        initialisms.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        initialisms
    };
}

/// Path segments are joined with this before case conversion.
const SEGMENT_SEPARATOR: &str = "_";

/// Converts an identifier to UpperCamelCase.
///
/// ASCII letters are kept. The first letter and any letter following a
/// separator (`_`, `-`, `.`, space) or a digit is upper-cased. Digits are kept
/// and everything else is dropped.
pub fn to_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut cap_next = true;
    for c in s.trim().chars() {
        if c.is_ascii_alphabetic() {
            out.push(if cap_next { c.to_ascii_uppercase() } else { c });
            cap_next = false;
        } else if c.is_ascii_digit() {
            out.push(c);
            cap_next = true;
        } else {
            cap_next = matches!(c, '_' | '-' | '.' | ' ');
        }
    }
    out
}

fn title_case(initialism: &str) -> String {
    let mut chars = initialism.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}

/// Rewrites a trailing initialism to its all-caps form (`UserId` -> `UserID`).
/// Only the suffix is checked and at most one rewrite happens.
fn normalize_initialism(camel: String) -> String {
    for initialism in COMMON_INITIALISMS.iter() {
        if let Some(stem) = camel.strip_suffix(title_case(initialism).as_str()) {
            return format!("{stem}{initialism}");
        }
    }
    camel
}

/// Builds a type name from a schema path.
///
/// `disambiguate` is decided per message type: it is set when more than one
/// major version of the type exists, in which case every version gets the
/// `V<major>` suffix.
pub fn synthesize<S: AsRef<str>>(segments: &[S], major: Option<u32>, disambiguate: bool) -> String {
    let joined = segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(SEGMENT_SEPARATOR);
    let base = normalize_initialism(to_camel(&joined));
    match major {
        Some(major) if disambiguate => format!("{base}V{major}"),
        _ => base,
    }
}

/// Builds the identifier of a struct field from its property name.
pub fn field_name(property: &str) -> String {
    let camel = to_camel(property);
    if camel == "Id" {
        return "ID".to_string();
    }
    normalize_initialism(camel)
}

/// Name of the constructor that produces an empty instance of a message type.
pub fn factory_name(type_name: &str) -> String {
    format!("New{type_name}Data")
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn test_to_camel() {
        assert_eq!(to_camel("snake_case.sub_field"), "SnakeCaseSubField");
        assert_eq!(to_camel("trip_created"), "TripCreated");
        assert_eq!(to_camel("TripCreatedV1_vehicle"), "TripCreatedV1Vehicle");
        assert_eq!(to_camel("vehicle_1.0"), "Vehicle10");
        assert_eq!(to_camel("kebab-case name"), "KebabCaseName");
        assert_eq!(to_camel("item2go"), "Item2Go");
        // a dropped leading character also drops the initial capital
        assert_eq!(to_camel("$weird!key"), "weirdkey");
        assert_eq!(to_camel("_private"), "Private");
        assert_eq!(to_camel(""), "");
    }

    #[test]
    fn test_initialism_suffix_only() {
        assert_eq!(field_name("user_id"), "UserID");
        assert_eq!(field_name("callback_url"), "CallbackURL");
        assert_eq!(field_name("device_uuid"), "DeviceUUID");
        assert_eq!(field_name("encoding_utf8"), "EncodingUTF8");
        // mid-name initialisms stay as they are
        assert_eq!(field_name("id_token"), "IdToken");
        assert_eq!(field_name("paid"), "Paid");
    }

    #[test]
    fn test_field_name_bare_id() {
        assert_eq!(field_name("id"), "ID");
        assert_eq!(field_name("ID"), "ID");
        assert_eq!(field_name("vin"), "Vin");
    }

    #[test]
    fn test_synthesize_version_suffix() {
        assert_eq!(synthesize(&["trip_created"], Some(1), false), "TripCreated");
        assert_eq!(synthesize(&["trip_created"], Some(1), true), "TripCreatedV1");
        assert_eq!(synthesize(&["trip_created"], Some(2), true), "TripCreatedV2");
        assert_eq!(synthesize(&["trip.created"], Some(2), true), "TripCreatedV2");
    }

    #[test]
    fn test_synthesize_initialism_before_suffix() {
        assert_eq!(synthesize(&["device_api"], Some(3), true), "DeviceAPIV3");
        assert_eq!(synthesize(&["TripCreated", "owner_id"], None, false), "TripCreatedOwnerID");
    }

    #[test]
    fn test_synthesize_path() {
        assert_eq!(
            synthesize(&["TripCreatedV1", "stops", "list"], None, false),
            "TripCreatedV1StopsList"
        );
        assert_eq!(synthesize(&["vehicle", "1.0"], None, false), "Vehicle10");
    }

    #[test]
    fn test_factory_name() {
        assert_eq!(factory_name("TripCreated"), "NewTripCreatedData");
        assert_eq!(factory_name("TripCreatedV2"), "NewTripCreatedV2Data");
    }
}
