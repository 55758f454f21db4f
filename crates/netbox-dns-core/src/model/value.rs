//! Decoded record values
//!
//! A [`DecodedValue`] is the provider-agnostic form of one record value. Its
//! `Display` implementation renders the NetBox text form of the value, which
//! is what the change applicator writes when it creates a record. Values are
//! compared with `PartialEq`, after both sides went through the translator.

use serde::Serialize;
use std::fmt;

/// A single decoded record value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DecodedValue {
    /// A/AAAA address
    Address(String),
    /// CNAME/DNAME/NS/PTR target
    Name(String),
    Caa(CaaValue),
    Loc(LocValue),
    Mx(MxValue),
    Naptr(NaptrValue),
    Sshfp(SshfpValue),
    Srv(SrvValue),
    /// SPF/TXT text with `;` escaped as `\;`
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaaValue {
    pub flags: u8,
    pub tag: String,
    pub value: String,
}

/// Geographic location (RFC 1876), in degrees and meters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocValue {
    pub lat_direction: char,
    pub lat_degrees: u32,
    pub lat_minutes: u32,
    pub lat_seconds: f64,
    pub long_direction: char,
    pub long_degrees: u32,
    pub long_minutes: u32,
    pub long_seconds: f64,
    pub altitude: f64,
    pub size: f64,
    pub precision_horz: f64,
    pub precision_vert: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MxValue {
    pub preference: u16,
    pub exchange: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NaptrValue {
    pub order: u16,
    pub preference: u16,
    pub flags: String,
    pub service: String,
    pub regexp: String,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SshfpValue {
    pub algorithm: u8,
    pub fingerprint_type: u8,
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SrvValue {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

/// Quote a character-string for the presentation format
fn quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Address(address) => f.write_str(address),
            DecodedValue::Name(target) => f.write_str(target),
            DecodedValue::Caa(caa) => {
                write!(f, "{} {} {}", caa.flags, caa.tag, quoted(&caa.value))
            }
            DecodedValue::Loc(loc) => write!(
                f,
                "{} {} {:.3} {} {} {} {:.3} {} {:.2}m {:.2}m {:.2}m {:.2}m",
                loc.lat_degrees,
                loc.lat_minutes,
                loc.lat_seconds,
                loc.lat_direction,
                loc.long_degrees,
                loc.long_minutes,
                loc.long_seconds,
                loc.long_direction,
                loc.altitude,
                loc.size,
                loc.precision_horz,
                loc.precision_vert,
            ),
            DecodedValue::Mx(mx) => write!(f, "{} {}", mx.preference, mx.exchange),
            DecodedValue::Naptr(naptr) => write!(
                f,
                "{} {} {} {} {} {}",
                naptr.order,
                naptr.preference,
                quoted(&naptr.flags),
                quoted(&naptr.service),
                quoted(&naptr.regexp),
                naptr.replacement,
            ),
            DecodedValue::Sshfp(sshfp) => write!(
                f,
                "{} {} {}",
                sshfp.algorithm, sshfp.fingerprint_type, sshfp.fingerprint
            ),
            DecodedValue::Srv(srv) => write!(
                f,
                "{} {} {} {}",
                srv.priority, srv.weight, srv.port, srv.target
            ),
            DecodedValue::Text(text) => f.write_str(&text.replace("\\;", ";")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mx_text_form() {
        let value = DecodedValue::Mx(MxValue {
            preference: 10,
            exchange: "mail.example.com.".to_string(),
        });
        assert_eq!(value.to_string(), "10 mail.example.com.");
    }

    #[test]
    fn test_text_unescapes_semicolons() {
        let value = DecodedValue::Text("v=DKIM1\\; k=rsa\\; p=abc".to_string());
        assert_eq!(value.to_string(), "v=DKIM1; k=rsa; p=abc");
    }

    #[test]
    fn test_caa_and_naptr_quote_strings() {
        let caa = DecodedValue::Caa(CaaValue {
            flags: 0,
            tag: "issue".to_string(),
            value: "letsencrypt.org".to_string(),
        });
        assert_eq!(caa.to_string(), "0 issue \"letsencrypt.org\"");

        let naptr = DecodedValue::Naptr(NaptrValue {
            order: 100,
            preference: 10,
            flags: "S".to_string(),
            service: "SIP+D2U".to_string(),
            regexp: "".to_string(),
            replacement: "_sip._udp.example.com.".to_string(),
        });
        assert_eq!(
            naptr.to_string(),
            "100 10 \"S\" \"SIP+D2U\" \"\" _sip._udp.example.com."
        );
    }

    #[test]
    fn test_loc_text_form() {
        let loc = DecodedValue::Loc(LocValue {
            lat_direction: 'N',
            lat_degrees: 52,
            lat_minutes: 22,
            lat_seconds: 23.0,
            long_direction: 'E',
            long_degrees: 4,
            long_minutes: 53,
            long_seconds: 32.5,
            altitude: -2.0,
            size: 1.0,
            precision_horz: 10000.0,
            precision_vert: 10.0,
        });
        assert_eq!(
            loc.to_string(),
            "52 22 23.000 N 4 53 32.500 E -2.00m 1.00m 10000.00m 10.00m"
        );
    }

    #[test]
    fn test_untagged_serialization() {
        let addr = DecodedValue::Address("192.0.2.1".to_string());
        assert_eq!(serde_json::to_value(&addr).unwrap(), serde_json::json!("192.0.2.1"));

        let srv = DecodedValue::Srv(SrvValue {
            priority: 10,
            weight: 20,
            port: 5060,
            target: "sip.example.com.".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&srv).unwrap(),
            serde_json::json!({"priority": 10, "weight": 20, "port": 5060, "target": "sip.example.com."})
        );
    }
}
