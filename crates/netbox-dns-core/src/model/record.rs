//! Canonical records and zones

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};

use super::record_type::RecordType;
use super::value::DecodedValue;
use crate::error::{Error, Result};

/// NetBox spelling of the zone apex
pub const APEX: &str = "@";

/// A provider-agnostic record, keyed by `(name, record_type)` within a zone
///
/// With exactly one value the record is a single-value record, otherwise a
/// multi-value record. The JSON form follows the same split: `value` versus
/// `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    /// Owner name relative to the zone; the apex is `""`
    pub name: String,
    pub record_type: RecordType,
    pub ttl: u32,
    /// Values in encounter order
    pub values: Vec<DecodedValue>,
}

impl CanonicalRecord {
    /// Create a record with no values yet
    pub fn new(name: impl Into<String>, record_type: RecordType, ttl: u32) -> Self {
        Self {
            name: name.into(),
            record_type,
            ttl,
            values: Vec::new(),
        }
    }

    /// Builder-style value append
    pub fn with_value(mut self, value: DecodedValue) -> Self {
        self.values.push(value);
        self
    }

    /// The `(name, type)` key
    pub fn key(&self) -> (&str, RecordType) {
        (&self.name, self.record_type)
    }

    pub fn is_single_value(&self) -> bool {
        self.values.len() == 1
    }

    /// The scalar value of a single-value record
    pub fn value(&self) -> Option<&DecodedValue> {
        if self.is_single_value() {
            self.values.first()
        } else {
            None
        }
    }

    /// Owner name as NetBox spells it (`@` for the apex)
    pub fn remote_name(&self) -> &str {
        if self.name.is_empty() { APEX } else { &self.name }
    }

    /// Values without repeats, in value order
    ///
    /// A record without values is neither single- nor multi-value shaped and
    /// is rejected.
    pub fn distinct_values(&self) -> Result<Vec<&DecodedValue>> {
        if self.values.is_empty() {
            return Err(Error::MalformedChange {
                name: self.name.clone(),
                record_type: self.record_type.to_string(),
            });
        }

        let mut distinct: Vec<&DecodedValue> = Vec::with_capacity(self.values.len());
        for value in &self.values {
            if !distinct.contains(&value) {
                distinct.push(value);
            }
        }
        Ok(distinct)
    }

    /// NetBox text form of each distinct value
    pub fn raw_values(&self) -> Result<Vec<String>> {
        Ok(self
            .distinct_values()?
            .into_iter()
            .map(ToString::to_string)
            .collect())
    }
}

impl Serialize for CanonicalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("type", &self.record_type)?;
        map.serialize_entry("ttl", &self.ttl)?;
        match self.value() {
            Some(value) => map.serialize_entry("value", value)?,
            None => map.serialize_entry("values", &self.values)?,
        }
        map.end()
    }
}

/// A zone's canonical record set, in insertion order
#[derive(Debug, Clone, Default, Serialize)]
pub struct Zone {
    /// Fully-qualified zone name, with trailing dot
    pub name: String,
    records: Vec<CanonicalRecord>,
    #[serde(skip)]
    index: HashMap<(String, RecordType), usize>,
}

impl Zone {
    /// Create an empty zone; a missing trailing dot is added
    pub fn new(name: impl Into<String>) -> Self {
        let mut name = name.into();
        if !name.ends_with('.') {
            name.push('.');
        }
        Self {
            name,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Zone name as NetBox stores it (no trailing dot)
    pub fn remote_name(&self) -> &str {
        self.name.strip_suffix('.').unwrap_or(&self.name)
    }

    /// Add a record to the zone
    ///
    /// A record whose `(name, type)` is already present is rejected unless
    /// `replace` is set, in which case it takes the existing record's place.
    pub fn add_record(&mut self, record: CanonicalRecord, replace: bool) -> Result<()> {
        let key = (record.name.clone(), record.record_type);
        match self.index.get(&key).copied() {
            Some(position) if replace => {
                self.records[position] = record;
                Ok(())
            }
            Some(_) => Err(Error::DuplicateRecord {
                zone: self.name.clone(),
                name: record.name,
                record_type: record.record_type.to_string(),
            }),
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(record);
                Ok(())
            }
        }
    }

    /// Add a batch of records; a rejected duplicate leaves the zone untouched
    pub fn add_records(&mut self, records: Vec<CanonicalRecord>, replace: bool) -> Result<()> {
        if !replace {
            let mut seen: HashSet<(&str, RecordType)> = HashSet::new();
            for record in &records {
                let taken = self
                    .index
                    .contains_key(&(record.name.clone(), record.record_type));
                if taken || !seen.insert(record.key()) {
                    return Err(Error::DuplicateRecord {
                        zone: self.name.clone(),
                        name: record.name.clone(),
                        record_type: record.record_type.to_string(),
                    });
                }
            }
        }

        for record in records {
            self.add_record(record, replace)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str, record_type: RecordType) -> Option<&CanonicalRecord> {
        self.index
            .get(&(name.to_string(), record_type))
            .map(|&position| &self.records[position])
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::MxValue;

    fn mx(preference: u16, exchange: &str) -> DecodedValue {
        DecodedValue::Mx(MxValue {
            preference,
            exchange: exchange.to_string(),
        })
    }

    #[test]
    fn test_single_and_multi_value_shape() {
        let single = CanonicalRecord::new("", RecordType::Mx, 300).with_value(mx(10, "a."));
        assert!(single.is_single_value());
        assert!(single.value().is_some());

        let multi = single.clone().with_value(mx(20, "b."));
        assert!(!multi.is_single_value());
        assert!(multi.value().is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let single = CanonicalRecord::new("www", RecordType::A, 60)
            .with_value(DecodedValue::Address("192.0.2.1".to_string()));
        assert_eq!(
            serde_json::to_value(&single).unwrap(),
            serde_json::json!({"name": "www", "type": "A", "ttl": 60, "value": "192.0.2.1"})
        );

        let multi = single
            .clone()
            .with_value(DecodedValue::Address("192.0.2.2".to_string()));
        assert_eq!(
            serde_json::to_value(&multi).unwrap(),
            serde_json::json!({"name": "www", "type": "A", "ttl": 60, "values": ["192.0.2.1", "192.0.2.2"]})
        );
    }

    #[test]
    fn test_raw_values_deduplicate_and_reject_empty() {
        let record = CanonicalRecord::new("", RecordType::Mx, 300)
            .with_value(mx(10, "mail1.example.com."))
            .with_value(mx(10, "mail1.example.com."))
            .with_value(mx(20, "mail2.example.com."));
        assert_eq!(
            record.raw_values().unwrap(),
            vec!["10 mail1.example.com.", "20 mail2.example.com."]
        );

        let empty = CanonicalRecord::new("x", RecordType::A, 300);
        assert!(matches!(empty.raw_values(), Err(Error::MalformedChange { .. })));
    }

    #[test]
    fn test_remote_name_maps_apex() {
        assert_eq!(CanonicalRecord::new("", RecordType::A, 1).remote_name(), "@");
        assert_eq!(CanonicalRecord::new("www", RecordType::A, 1).remote_name(), "www");
    }

    #[test]
    fn test_zone_duplicate_handling() {
        let mut zone = Zone::new("example.com");
        assert_eq!(zone.name, "example.com.");
        assert_eq!(zone.remote_name(), "example.com");

        let first = CanonicalRecord::new("www", RecordType::A, 60)
            .with_value(DecodedValue::Address("192.0.2.1".to_string()));
        let second = CanonicalRecord::new("www", RecordType::A, 120)
            .with_value(DecodedValue::Address("192.0.2.9".to_string()));

        zone.add_record(first, false).unwrap();
        assert!(matches!(
            zone.add_record(second.clone(), false),
            Err(Error::DuplicateRecord { .. })
        ));

        zone.add_record(second, true).unwrap();
        assert_eq!(zone.len(), 1);
        assert_eq!(zone.get("www", RecordType::A).unwrap().ttl, 120);
    }

    #[test]
    fn test_add_records_is_all_or_nothing() {
        let address = |value: &str| DecodedValue::Address(value.to_string());
        let mut zone = Zone::new("example.com.");
        zone.add_record(
            CanonicalRecord::new("mail", RecordType::A, 60).with_value(address("192.0.2.1")),
            false,
        )
        .unwrap();

        let batch = vec![
            CanonicalRecord::new("www", RecordType::A, 60).with_value(address("192.0.2.2")),
            CanonicalRecord::new("mail", RecordType::A, 60).with_value(address("192.0.2.3")),
        ];
        assert!(matches!(
            zone.add_records(batch.clone(), false),
            Err(Error::DuplicateRecord { ref name, .. }) if name == "mail"
        ));
        assert_eq!(zone.len(), 1);
        assert!(zone.get("www", RecordType::A).is_none());

        zone.add_records(batch, true).unwrap();
        assert_eq!(zone.len(), 2);
        assert_eq!(zone.get("mail", RecordType::A).unwrap().values, vec![address("192.0.2.3")]);
    }
}
