//! Record data parsing
//!
//! Parses the textual record data NetBox stores in a record's `value` field
//! into typed [`Rdata`]. Everything hickory knows how to read goes through
//! its presentation-format parser (`RData::try_from_str`), so quoting and
//! escaping follow the zone file rules a name server applies.
//!
//! Names are parsed without an origin: a name without a trailing dot stays
//! relative.
//!
//! Two types are read locally. LOC has no hickory text parser, and SOA
//! timers accept BIND duration units (`1h`, `2w`).

use std::net::{Ipv4Addr, Ipv6Addr};

use hickory_proto::rr::{Name, RData, RecordType as WireType};
use hickory_proto::serialize::txt::RDataParser;
use thiserror::Error;

use crate::model::RecordType;

/// Why a record's data could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct RdataError(String);

impl RdataError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

type Result<T> = std::result::Result<T, RdataError>;

/// One LOC coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinate {
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub milliseconds: u32,
    /// `1` for north/east, `-1` for south/west
    pub sign: i8,
}

/// LOC record data; lengths are in centimeters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loc {
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub altitude: i64,
    pub size: i64,
    pub horizontal_precision: i64,
    pub vertical_precision: i64,
}

/// SOA record data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Soa {
    pub mname: String,
    pub rname: String,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

/// Typed record data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rdata {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Caa {
        flags: u8,
        tag: String,
        value: String,
    },
    Cname(String),
    Dname(String),
    Loc(Loc),
    Mx {
        preference: u16,
        exchange: String,
    },
    Naptr {
        order: u16,
        preference: u16,
        flags: String,
        service: String,
        regexp: String,
        replacement: String,
    },
    Ns(String),
    Ptr(String),
    Soa(Soa),
    Spf,
    Srv {
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
    },
    Sshfp {
        algorithm: u8,
        fingerprint_type: u8,
        fingerprint: String,
    },
    Txt,
}

impl Rdata {
    pub fn record_type(&self) -> RecordType {
        match self {
            Rdata::A(_) => RecordType::A,
            Rdata::Aaaa(_) => RecordType::Aaaa,
            Rdata::Caa { .. } => RecordType::Caa,
            Rdata::Cname(_) => RecordType::Cname,
            Rdata::Dname(_) => RecordType::Dname,
            Rdata::Loc(_) => RecordType::Loc,
            Rdata::Mx { .. } => RecordType::Mx,
            Rdata::Naptr { .. } => RecordType::Naptr,
            Rdata::Ns(_) => RecordType::Ns,
            Rdata::Ptr(_) => RecordType::Ptr,
            Rdata::Soa(_) => RecordType::Soa,
            Rdata::Spf => RecordType::Spf,
            Rdata::Srv { .. } => RecordType::Srv,
            Rdata::Sshfp { .. } => RecordType::Sshfp,
            Rdata::Txt => RecordType::Txt,
        }
    }
}

/// Parse `text` as record data of `record_type`
pub fn parse(record_type: RecordType, text: &str) -> Result<Rdata> {
    if text.trim().is_empty() {
        return Err(RdataError::new("missing record data"));
    }

    match record_type {
        RecordType::Loc => return parse_loc(text).map(Rdata::Loc),
        RecordType::Soa => return parse_soa(text).map(Rdata::Soa),
        _ => {}
    }

    let rdata = match wire_parse(record_type, text)? {
        RData::A(a) => Rdata::A(a.0),
        RData::AAAA(aaaa) => Rdata::Aaaa(aaaa.0),
        // The issuer value is kept as written; hickory only validates it
        RData::CAA(_) => parse_caa(text)?,
        RData::CNAME(cname) if record_type == RecordType::Dname => {
            Rdata::Dname(name_text(&cname.0))
        }
        RData::CNAME(cname) => Rdata::Cname(name_text(&cname.0)),
        RData::MX(mx) => Rdata::Mx {
            preference: mx.preference(),
            exchange: name_text(mx.exchange()),
        },
        RData::NAPTR(naptr) => Rdata::Naptr {
            order: naptr.order(),
            preference: naptr.preference(),
            flags: String::from_utf8_lossy(naptr.flags()).into_owned(),
            service: String::from_utf8_lossy(naptr.services()).into_owned(),
            regexp: String::from_utf8_lossy(naptr.regexp()).into_owned(),
            replacement: name_text(naptr.replacement()),
        },
        RData::NS(ns) => Rdata::Ns(name_text(&ns.0)),
        RData::PTR(ptr) => Rdata::Ptr(name_text(&ptr.0)),
        RData::SRV(srv) => Rdata::Srv {
            priority: srv.priority(),
            weight: srv.weight(),
            port: srv.port(),
            target: name_text(srv.target()),
        },
        RData::SSHFP(sshfp) if sshfp.fingerprint().is_empty() => {
            return Err(RdataError::new("missing fingerprint"));
        }
        RData::SSHFP(sshfp) => Rdata::Sshfp {
            algorithm: u8::from(sshfp.algorithm()),
            fingerprint_type: u8::from(sshfp.fingerprint_type()),
            fingerprint: sshfp
                .fingerprint()
                .iter()
                .map(|byte| format!("{:02x}", byte))
                .collect(),
        },
        RData::TXT(_) if record_type == RecordType::Spf => Rdata::Spf,
        RData::TXT(_) => Rdata::Txt,
        other => {
            return Err(RdataError::new(format!(
                "unexpected {} data for {}",
                other.record_type(),
                record_type
            )));
        }
    };
    Ok(rdata)
}

/// Run hickory's text parser for the wire type behind `record_type`
fn wire_parse(record_type: RecordType, text: &str) -> Result<RData> {
    let wire_type = match record_type {
        RecordType::A => WireType::A,
        RecordType::Aaaa => WireType::AAAA,
        RecordType::Caa => WireType::CAA,
        // DNAME data is a single domain name, same as CNAME
        RecordType::Cname | RecordType::Dname => WireType::CNAME,
        RecordType::Mx => WireType::MX,
        RecordType::Naptr => WireType::NAPTR,
        RecordType::Ns => WireType::NS,
        RecordType::Ptr => WireType::PTR,
        RecordType::Srv => WireType::SRV,
        RecordType::Sshfp => WireType::SSHFP,
        RecordType::Spf | RecordType::Txt => WireType::TXT,
        RecordType::Loc | RecordType::Soa => {
            return Err(RdataError::new(format!("{} is parsed locally", record_type)));
        }
    };

    RData::try_from_str(wire_type, text).map_err(|e| RdataError::new(e.to_string()))
}

/// A parsed name in ASCII presentation form, trailing dot only when absolute
fn name_text(name: &Name) -> String {
    name.to_ascii()
}

fn parse_name(text: &str, field: &str) -> Result<String> {
    Name::parse(text, None)
        .map(|name| name_text(&name))
        .map_err(|e| RdataError::new(format!("invalid {}: {}", field, e)))
}

/// `<flags> <tag> <value>` with the value's quotes and escapes resolved
fn parse_caa(text: &str) -> Result<Rdata> {
    let mut parts = text.trim().splitn(3, char::is_whitespace);
    let flags = parts
        .next()
        .and_then(|flags| flags.parse().ok())
        .ok_or_else(|| RdataError::new(format!("invalid CAA flags: {}", text)))?;
    let tag = parts
        .next()
        .ok_or_else(|| RdataError::new("missing CAA tag"))?
        .to_string();
    let value = parts
        .next()
        .map(|value| unquote(value.trim()))
        .ok_or_else(|| RdataError::new("missing CAA value"))??;
    Ok(Rdata::Caa { flags, tag, value })
}

/// Strip surrounding quotes and resolve `\X` and `\DDD` escapes
fn unquote(text: &str) -> Result<String> {
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let next = chars
            .next()
            .ok_or_else(|| RdataError::new("dangling escape"))?;
        if !next.is_ascii_digit() {
            out.push(next);
            continue;
        }
        let digits: String = std::iter::once(next).chain(chars.by_ref().take(2)).collect();
        let octet: u8 = digits
            .parse()
            .map_err(|_| RdataError::new(format!("invalid escape \\{}", digits)))?;
        out.push(char::from(octet));
    }
    Ok(out)
}

/// Whitespace-separated fields of an unquoted record
struct Fields<'a> {
    parts: std::iter::Peekable<std::str::SplitWhitespace<'a>>,
}

impl<'a> Fields<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            parts: text.split_whitespace().peekable(),
        }
    }

    fn has_more(&mut self) -> bool {
        self.parts.peek().is_some()
    }

    fn next(&mut self, field: &str) -> Result<&'a str> {
        self.parts
            .next()
            .ok_or_else(|| RdataError::new(format!("missing {}", field)))
    }

    fn number<T: std::str::FromStr>(&mut self, field: &str) -> Result<T> {
        let text = self.next(field)?;
        text.parse()
            .map_err(|_| RdataError::new(format!("invalid {}: {}", field, text)))
    }

    fn finish(mut self) -> Result<()> {
        match self.parts.next() {
            Some(extra) => Err(RdataError::new(format!("unexpected trailing data: {}", extra))),
            None => Ok(()),
        }
    }
}

fn parse_soa(text: &str) -> Result<Soa> {
    let mut fields = Fields::new(text);
    let soa = Soa {
        mname: parse_name(fields.next("mname")?, "mname")?,
        rname: parse_name(fields.next("rname")?, "rname")?,
        serial: fields.number("serial")?,
        refresh: parse_duration(fields.next("refresh")?)?,
        retry: parse_duration(fields.next("retry")?)?,
        expire: parse_duration(fields.next("expire")?)?,
        minimum: parse_duration(fields.next("minimum")?)?,
    };
    fields.finish()?;
    Ok(soa)
}

/// TTL-style duration: plain seconds or BIND units (`1h30m`, `2d`, `1w`)
fn parse_duration(text: &str) -> Result<u32> {
    if let Ok(seconds) = text.parse::<u32>() {
        return Ok(seconds);
    }

    let invalid = || RdataError::new(format!("invalid duration: {}", text));
    let mut total: u32 = 0;
    let mut digits = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let multiplier: u32 = match c.to_ascii_lowercase() {
            's' => 1,
            'm' => 60,
            'h' => 3_600,
            'd' => 86_400,
            'w' => 604_800,
            _ => return Err(invalid()),
        };
        let amount: u32 = digits.parse().map_err(|_| invalid())?;
        total = amount
            .checked_mul(multiplier)
            .and_then(|seconds| total.checked_add(seconds))
            .ok_or_else(|| RdataError::new(format!("duration out of range: {}", text)))?;
        digits.clear();
    }
    if !digits.is_empty() {
        return Err(invalid());
    }
    Ok(total)
}

fn parse_loc(text: &str) -> Result<Loc> {
    let mut fields = Fields::new(text);
    let latitude = parse_coordinate(&mut fields, "latitude", 90, ('N', 'S'))?;
    let longitude = parse_coordinate(&mut fields, "longitude", 180, ('E', 'W'))?;
    let altitude = parse_centimeters(fields.next("altitude")?)?;

    let mut optional = |default: i64, field: &str| -> Result<i64> {
        if !fields.has_more() {
            return Ok(default);
        }
        let value = parse_centimeters(fields.next(field)?)?;
        if value < 0 {
            return Err(RdataError::new(format!("negative {}", field)));
        }
        Ok(value)
    };
    let size = optional(100, "size")?;
    let horizontal_precision = optional(1_000_000, "horizontal precision")?;
    let vertical_precision = optional(1_000, "vertical precision")?;
    fields.finish()?;

    Ok(Loc {
        latitude,
        longitude,
        altitude,
        size,
        horizontal_precision,
        vertical_precision,
    })
}

fn parse_coordinate(
    fields: &mut Fields<'_>,
    field: &str,
    max_degrees: u32,
    (positive, negative): (char, char),
) -> Result<Coordinate> {
    let hemisphere = |text: &str| -> Option<i8> {
        match text.to_ascii_uppercase().as_str() {
            s if s.len() == 1 && s.starts_with(positive) => Some(1),
            s if s.len() == 1 && s.starts_with(negative) => Some(-1),
            _ => None,
        }
    };

    let mut coordinate = Coordinate {
        degrees: fields.number(field)?,
        minutes: 0,
        seconds: 0,
        milliseconds: 0,
        sign: 1,
    };

    let text = fields.next(field)?;
    if let Some(sign) = hemisphere(text) {
        coordinate.sign = sign;
        return check_coordinate(coordinate, field, max_degrees);
    }
    coordinate.minutes = text
        .parse()
        .map_err(|_| RdataError::new(format!("invalid {} minutes: {}", field, text)))?;

    let text = fields.next(field)?;
    if let Some(sign) = hemisphere(text) {
        coordinate.sign = sign;
        return check_coordinate(coordinate, field, max_degrees);
    }
    let (seconds, milliseconds) = parse_seconds(text)
        .ok_or_else(|| RdataError::new(format!("invalid {} seconds: {}", field, text)))?;
    coordinate.seconds = seconds;
    coordinate.milliseconds = milliseconds;

    let text = fields.next(field)?;
    coordinate.sign = hemisphere(text).ok_or_else(|| {
        RdataError::new(format!(
            "invalid {} direction: {} (expected {} or {})",
            field, text, positive, negative
        ))
    })?;

    check_coordinate(coordinate, field, max_degrees)
}

fn check_coordinate(coordinate: Coordinate, field: &str, max_degrees: u32) -> Result<Coordinate> {
    if coordinate.degrees > max_degrees || coordinate.minutes >= 60 || coordinate.seconds >= 60 {
        return Err(RdataError::new(format!("{} out of range", field)));
    }
    Ok(coordinate)
}

/// `SS` or `SS.sss` into whole seconds and milliseconds
fn parse_seconds(text: &str) -> Option<(u32, u32)> {
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    if fraction.len() > 3 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let seconds = whole.parse().ok()?;
    let milliseconds = if fraction.is_empty() {
        0
    } else {
        format!("{:0<3}", fraction).parse().ok()?
    };
    Some((seconds, milliseconds))
}

/// Meters with an optional `m` suffix, into centimeters
fn parse_centimeters(text: &str) -> Result<i64> {
    let meters: f64 = text
        .trim_end_matches(['m', 'M'])
        .parse()
        .map_err(|_| RdataError::new(format!("invalid length: {}", text)))?;
    if !meters.is_finite() || meters.abs() > 1e10 {
        return Err(RdataError::new(format!("invalid length: {}", text)));
    }
    Ok((meters * 100.0).round() as i64)
}
