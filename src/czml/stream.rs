//! Scoped packet/property writers over an in-memory output buffer

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use super::values::{Color, CzmlValue, Interpolation, NearFarScalar, ReferenceFrame};
use crate::error::Result;
use crate::reference::PropertyReference;
use crate::time::{iso8601, seconds_between, TimeInterval};

/// Output document: a JSON array of packets
///
/// Packets are serialized as soon as their [`PacketWriter`] is dropped, in the
/// order they were opened. Only one packet can be open at a time.
#[derive(Debug)]
pub struct CzmlStream {
    buffer: Vec<u8>,
    packets: usize,
    pretty: bool,
    failure: Option<serde_json::Error>,
}

impl Default for CzmlStream {
    fn default() -> Self {
        Self::new()
    }
}

impl CzmlStream {
    /// Compact output, one packet per line
    pub fn new() -> Self {
        Self {
            buffer: b"[".to_vec(),
            packets: 0,
            pretty: false,
            failure: None,
        }
    }

    /// Indented output
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::new()
        }
    }

    /// Open a packet; it is written when the returned guard is dropped
    pub fn open_packet(&mut self, id: &str) -> PacketWriter<'_> {
        let mut body = Map::new();
        body.insert("id".into(), Value::String(id.to_string()));
        PacketWriter { stream: self, body }
    }

    /// Number of packets closed so far
    pub fn packet_count(&self) -> usize {
        self.packets
    }

    /// Close the outer array and hand back the document bytes
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if let Some(err) = self.failure.take() {
            return Err(err.into());
        }
        self.buffer.extend_from_slice(b"\n]\n");
        Ok(std::mem::take(&mut self.buffer))
    }

    fn append(&mut self, packet: Value) {
        if self.failure.is_some() {
            return;
        }

        let separator: &[u8] = if self.packets == 0 { b"\n" } else { b",\n" };
        self.buffer.extend_from_slice(separator);

        let written = if self.pretty {
            serde_json::to_writer_pretty(&mut self.buffer, &packet)
        } else {
            serde_json::to_writer(&mut self.buffer, &packet)
        };

        match written {
            Ok(()) => self.packets += 1,
            Err(e) => {
                log::error!("Failed to serialize packet: {}", e);
                self.failure = Some(e);
            }
        }
    }
}

/// Scoped packet; closed on drop
pub struct PacketWriter<'a> {
    stream: &'a mut CzmlStream,
    body: Map<String, Value>,
}

impl PacketWriter<'_> {
    pub fn id(&self) -> &str {
        self.body.get("id").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn write_name(&mut self, name: &str) {
        self.write_value("name", name);
    }

    pub fn write_parent(&mut self, parent: &str) {
        self.write_value("parent", parent);
    }

    pub fn write_availability(&mut self, interval: &TimeInterval) {
        self.write_value("availability", interval.to_string());
    }

    pub fn write_value(&mut self, key: &str, value: impl Into<Value>) {
        self.body.insert(key.to_string(), value.into());
    }

    /// Open a property sub-element; it is attached when the guard is dropped
    pub fn open_property(&mut self, name: &str) -> PropertyWriter<'_> {
        PropertyWriter::new(&mut self.body, name)
    }
}

impl Drop for PacketWriter<'_> {
    fn drop(&mut self) {
        let body = std::mem::take(&mut self.body);
        self.stream.append(Value::Object(body));
    }
}

/// Scoped property (or nested sub-property); closed on drop
pub struct PropertyWriter<'a> {
    parent: &'a mut Map<String, Value>,
    name: String,
    body: Map<String, Value>,
    intervals: Vec<Value>,
}

impl<'a> PropertyWriter<'a> {
    fn new(parent: &'a mut Map<String, Value>, name: &str) -> Self {
        Self {
            parent,
            name: name.to_string(),
            body: Map::new(),
            intervals: Vec::new(),
        }
    }

    pub fn open_property(&mut self, name: &str) -> PropertyWriter<'_> {
        PropertyWriter::new(&mut self.body, name)
    }

    pub fn write_value(&mut self, key: &str, value: impl Into<Value>) {
        self.body.insert(key.to_string(), value.into());
    }

    pub fn write_interval(&mut self, interval: &TimeInterval) {
        self.write_value("interval", interval.to_string());
    }

    pub fn write_epoch(&mut self, epoch: &DateTime<Utc>) {
        self.write_value("epoch", iso8601(epoch));
    }

    pub fn write_interpolation(&mut self, interpolation: &Interpolation) {
        self.write_value(
            "interpolationAlgorithm",
            interpolation.algorithm.as_czml(),
        );
        self.write_value("interpolationDegree", interpolation.degree);
    }

    pub fn write_reference_frame(&mut self, frame: ReferenceFrame) {
        self.write_value("referenceFrame", frame.as_czml());
    }

    pub fn write_reference(&mut self, reference: &PropertyReference) {
        self.write_value("reference", reference.to_string());
    }

    pub fn write_references(&mut self, references: &[PropertyReference]) {
        let list: Vec<Value> = references
            .iter()
            .map(|r| Value::String(r.to_string()))
            .collect();
        self.write_value("references", list);
    }

    pub fn write_color(&mut self, color: &Color) {
        self.write_value("rgba", color.to_array().to_vec());
    }

    /// Nested `material.solidColor.color.rgba`
    pub fn write_solid_color_material(&mut self, color: &Color) {
        let mut material = self.open_property("material");
        let mut solid = material.open_property("solidColor");
        let mut inner = solid.open_property("color");
        inner.write_color(color);
    }

    pub fn write_near_far(&mut self, key: &str, scalar: &NearFarScalar) {
        let mut prop = self.open_property(key);
        prop.write_value("nearFarScalar", scalar.to_array().to_vec());
    }

    /// Static value, flattened under `key`
    pub fn write_components<T: CzmlValue>(&mut self, key: &str, value: &T) {
        let mut components = Vec::new();
        value.push_components(&mut components);
        self.write_value(key, components);
    }

    /// Time-tagged values as `[t0, c..., t1, c..., ...]` relative to `epoch`
    pub fn write_samples<T: CzmlValue>(
        &mut self,
        key: &str,
        epoch: &DateTime<Utc>,
        instants: &[DateTime<Utc>],
        values: &[T],
    ) {
        let mut flat = Vec::with_capacity(instants.len() * 4);
        for (instant, value) in instants.iter().zip(values) {
            flat.push(seconds_between(epoch, instant));
            value.push_components(&mut flat);
        }
        self.write_epoch(epoch);
        self.write_value(key, flat);
    }

    /// Turn this property into a list of `{interval, boolean}` entries
    pub fn write_boolean_intervals(&mut self, entries: &[(TimeInterval, bool)]) {
        for (interval, show) in entries {
            self.intervals.push(json!({
                "interval": interval.to_string(),
                "boolean": show,
            }));
        }
    }
}

impl Drop for PropertyWriter<'_> {
    fn drop(&mut self) {
        let value = if self.intervals.is_empty() {
            Value::Object(std::mem::take(&mut self.body))
        } else {
            Value::Array(std::mem::take(&mut self.intervals))
        };
        self.parent.insert(std::mem::take(&mut self.name), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nalgebra::Vector3;

    fn parse(bytes: &[u8]) -> Vec<Value> {
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn test_empty_stream_is_valid_array() {
        let stream = CzmlStream::new();
        assert!(parse(&stream.finish().unwrap()).is_empty());
    }

    #[test]
    fn test_packets_keep_order_and_id_first() {
        let mut stream = CzmlStream::pretty();
        {
            let mut packet = stream.open_packet("A");
            packet.write_name("first");
        }
        {
            let mut packet = stream.open_packet("B");
            let mut billboard = packet.open_property("billboard");
            billboard.write_value("show", true);
        }
        assert_eq!(stream.packet_count(), 2);

        let doc = parse(&stream.finish().unwrap());
        assert_eq!(doc[0]["id"], "A");
        assert_eq!(doc[0]["name"], "first");
        assert_eq!(doc[1]["billboard"]["show"], true);
        let first_key = doc[0].as_object().unwrap().keys().next().unwrap().clone();
        assert_eq!(first_key, "id");
    }

    fn write_until_error(stream: &mut CzmlStream) -> std::result::Result<(), String> {
        let mut packet = stream.open_packet("X");
        let mut prop = packet.open_property("position");
        prop.write_components("cartesian", &Vector3::new(1.0, 2.0, 3.0));
        Err("interrupted".into())
    }

    #[test]
    fn test_guards_close_on_early_return() {
        let mut stream = CzmlStream::new();
        assert!(write_until_error(&mut stream).is_err());
        let doc = parse(&stream.finish().unwrap());
        assert_eq!(doc[0]["position"]["cartesian"], json!([1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_samples_relative_to_epoch() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let instants = vec![t0, t0 + chrono::Duration::seconds(60)];
        let values = vec![Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0)];

        let mut stream = CzmlStream::new();
        {
            let mut packet = stream.open_packet("S");
            let mut position = packet.open_property("position");
            position.write_interpolation(&Interpolation::default());
            position.write_samples("cartesian", &t0, &instants, &values);
        }
        let doc = parse(&stream.finish().unwrap());
        let position = &doc[0]["position"];
        assert_eq!(position["epoch"], "2024-01-01T00:00:00.000Z");
        assert_eq!(position["interpolationAlgorithm"], "LAGRANGE");
        assert_eq!(position["interpolationDegree"], 5);
        assert_eq!(
            position["cartesian"],
            json!([0.0, 1.0, 0.0, 0.0, 60.0, 0.0, 1.0, 0.0])
        );
    }

    #[test]
    fn test_boolean_intervals_become_array() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let interval = TimeInterval::new(t0, t0 + chrono::Duration::seconds(10)).unwrap();

        let mut stream = CzmlStream::new();
        {
            let mut packet = stream.open_packet("L");
            let mut polyline = packet.open_property("polyline");
            let mut show = polyline.open_property("show");
            show.write_boolean_intervals(&[(interval, true)]);
        }
        let doc = parse(&stream.finish().unwrap());
        let show = &doc[0]["polyline"]["show"];
        assert!(show.is_array());
        assert_eq!(show[0]["boolean"], true);
    }
}
