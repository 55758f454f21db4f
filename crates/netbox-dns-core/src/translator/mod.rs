//! Record translator
//!
//! Turns the records NetBox stores for one zone into canonical records:
//!
//! 1. Normalize the owner name (`@` becomes `""`) and substitute a value of
//!    `@` with the zone name.
//! 2. Resolve the TTL: an explicit TTL wins, an `NS` record without one gets
//!    the zone's SOA refresh, anything else the zone's default TTL.
//! 3. Parse the value as record data of its type and decode it. `SOA`
//!    records are dropped; types without a decode rule are an error.
//! 4. Group values by `(name, type)` in first-seen order. The first record
//!    seen for a key sets the group's TTL.
//!
//! The same decoding is used for raw values read from change files.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{
    APEX, CaaValue, CanonicalRecord, Change, ChangeSpec, DecodedValue, LocValue, MxValue,
    NaptrValue, RecordSpec, RecordType, SrvValue, SshfpValue,
};
use crate::rdata::{self, Coordinate, Rdata};
use crate::traits::{RemoteRecord, RemoteZone};

/// Per-zone facts the translator needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneContext {
    /// Zone name as the remote store spells it
    pub fqdn: String,
    pub default_ttl: u32,
    pub soa_refresh: u32,
}

impl ZoneContext {
    /// Build the context for a remote zone
    ///
    /// `fallback_ttl` stands in for a default TTL the zone does not report;
    /// a missing SOA refresh falls back to the default TTL.
    pub fn from_remote(zone: &RemoteZone, fallback_ttl: u32) -> Self {
        let default_ttl = zone.default_ttl.unwrap_or(fallback_ttl);
        Self {
            fqdn: zone.name.clone(),
            default_ttl,
            soa_refresh: zone.soa_refresh.unwrap_or(default_ttl),
        }
    }

    /// TTL for a record of `record_type` that declares `ttl`
    pub fn resolve_ttl(&self, record_type: RecordType, ttl: Option<u32>) -> u32 {
        match (ttl, record_type) {
            (Some(ttl), _) => ttl,
            (None, RecordType::Ns) => self.soa_refresh,
            (None, _) => self.default_ttl,
        }
    }
}

/// Converts remote records into canonical records
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordTranslator {
    make_absolute: bool,
}

impl RecordTranslator {
    /// Create a translator
    ///
    /// With `make_absolute` set, CNAME targets, MX exchanges and SRV targets
    /// get a trailing dot when they lack one.
    pub fn new(make_absolute: bool) -> Self {
        Self { make_absolute }
    }

    /// Translate a zone's remote records
    ///
    /// Fails on the first record that cannot be decoded; an empty input
    /// yields an empty output.
    pub fn translate(
        &self,
        zone: &ZoneContext,
        records: &[RemoteRecord],
    ) -> Result<Vec<CanonicalRecord>> {
        let mut grouped: Vec<CanonicalRecord> = Vec::new();
        let mut index: HashMap<(String, RecordType), usize> = HashMap::new();

        for remote in records {
            let name = if remote.name == APEX {
                String::new()
            } else {
                remote.name.clone()
            };
            let raw_value = if remote.value == APEX {
                zone.fqdn.as_str()
            } else {
                remote.value.as_str()
            };

            let record_type: RecordType = remote.record_type.parse().map_err(|e| {
                Error::decode(&remote.name, &remote.record_type, &remote.value, format!("{}", e))
            })?;
            let ttl = zone.resolve_ttl(record_type, remote.ttl);

            debug!(
                name = %name,
                record_type = %record_type,
                ttl,
                value = %raw_value,
                "decoding record"
            );

            let Some(value) = self.decode(&remote.name, record_type, raw_value)? else {
                debug!(name = %name, "skipping SOA record");
                continue;
            };

            let key = (name, record_type);
            match index.get(&key).copied() {
                Some(position) => grouped[position].values.push(value),
                None => {
                    let record = CanonicalRecord::new(key.0.clone(), record_type, ttl)
                        .with_value(value);
                    index.insert(key, grouped.len());
                    grouped.push(record);
                }
            }
        }

        Ok(grouped)
    }

    /// Parse and decode one raw value
    ///
    /// Returns `Ok(None)` for `SOA`, which has no canonical form.
    pub fn decode(
        &self,
        name: &str,
        record_type: RecordType,
        raw_value: &str,
    ) -> Result<Option<DecodedValue>> {
        let rdata = rdata::parse(record_type, raw_value)
            .map_err(|e| Error::decode(name, record_type.as_str(), raw_value, e.to_string()))?;

        let value = self.decode_rdata(rdata, raw_value);
        if let Some(ref value) = value {
            debug!(name, record_type = %record_type, value = ?value, "decoded record value");
        }
        Ok(value)
    }

    fn decode_rdata(&self, rdata: Rdata, raw_value: &str) -> Option<DecodedValue> {
        let value = match rdata {
            Rdata::A(address) => DecodedValue::Address(address.to_string()),
            Rdata::Aaaa(address) => DecodedValue::Address(address.to_string()),
            Rdata::Cname(target) => DecodedValue::Name(self.absolute(target)),
            Rdata::Dname(target) | Rdata::Ns(target) | Rdata::Ptr(target) => {
                DecodedValue::Name(target)
            }
            Rdata::Caa { flags, tag, value } => DecodedValue::Caa(CaaValue { flags, tag, value }),
            Rdata::Loc(loc) => DecodedValue::Loc(LocValue {
                lat_direction: if loc.latitude.sign >= 0 { 'N' } else { 'S' },
                lat_degrees: loc.latitude.degrees,
                lat_minutes: loc.latitude.minutes,
                lat_seconds: seconds(&loc.latitude),
                long_direction: if loc.longitude.sign >= 0 { 'E' } else { 'W' },
                long_degrees: loc.longitude.degrees,
                long_minutes: loc.longitude.minutes,
                long_seconds: seconds(&loc.longitude),
                altitude: loc.altitude as f64 / 100.0,
                size: loc.size as f64 / 100.0,
                precision_horz: loc.horizontal_precision as f64 / 100.0,
                precision_vert: loc.vertical_precision as f64 / 100.0,
            }),
            Rdata::Mx {
                preference,
                exchange,
            } => DecodedValue::Mx(MxValue {
                preference,
                exchange: self.absolute(exchange),
            }),
            Rdata::Naptr {
                order,
                preference,
                flags,
                service,
                regexp,
                replacement,
            } => DecodedValue::Naptr(NaptrValue {
                order,
                preference,
                flags,
                service,
                regexp,
                replacement,
            }),
            Rdata::Sshfp {
                algorithm,
                fingerprint_type,
                fingerprint,
            } => DecodedValue::Sshfp(SshfpValue {
                algorithm,
                fingerprint_type,
                fingerprint,
            }),
            // The remote text is kept verbatim apart from escaping
            Rdata::Spf | Rdata::Txt => {
                DecodedValue::Text(raw_value.replace("\\\\", "\\").replace(';', "\\;"))
            }
            Rdata::Srv {
                priority,
                weight,
                port,
                target,
            } => DecodedValue::Srv(SrvValue {
                priority,
                weight,
                port,
                target: self.absolute(target),
            }),
            Rdata::Soa(_) => return None,
        };
        Some(value)
    }

    fn absolute(&self, name: String) -> String {
        if !self.make_absolute || name.ends_with('.') {
            return name;
        }
        let absolute = format!("{}.", name);
        debug!(relative = %name, absolute = %absolute, "made name absolute");
        absolute
    }

    /// Build a canonical record from a change-file record
    pub fn record_from_spec(&self, spec: &RecordSpec) -> Result<CanonicalRecord> {
        let mut record = CanonicalRecord::new(spec.name.clone(), spec.record_type, spec.ttl);
        for raw in &spec.values {
            let value = self.decode(&spec.name, spec.record_type, raw)?.ok_or_else(|| {
                Error::decode(&spec.name, "SOA", raw, "SOA records are not managed")
            })?;
            record.values.push(value);
        }
        Ok(record)
    }

    /// Build a change from a change-file entry
    pub fn change_from_spec(&self, spec: &ChangeSpec) -> Result<Change> {
        let change = match spec {
            ChangeSpec::Create(new) => Change::Create {
                new: self.record_from_spec(new)?,
            },
            ChangeSpec::Delete(existing) => Change::Delete {
                existing: self.record_from_spec(existing)?,
            },
            ChangeSpec::Update { existing, new } => Change::Update {
                existing: self.record_from_spec(existing)?,
                new: self.record_from_spec(new)?,
            },
        };
        Ok(change)
    }
}

fn seconds(coordinate: &Coordinate) -> f64 {
    coordinate.seconds as f64 + coordinate.milliseconds as f64 / 1000.0
}
