//! The object-ID field table.
//!
//! This table is the single source of truth for per-field layout and
//! scaling: one row per object id, sorted by id. Adding support for a new
//! BTHome field means adding a row here; the payload scanner never needs
//! to change.

/// Decoding descriptor for one object id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    pub object_id: u8,
    pub label: &'static str,
    /// Value size in bytes, consumed from the payload after the id.
    pub width: usize,
    pub signed: bool,
    /// Multiplier converting the raw integer into its physical value.
    pub scale: f64,
    pub unit: &'static str,
}

impl FieldDescriptor {
    /// Decimal places used when rendering a value of this field.
    pub fn decimals(&self) -> usize {
        if self.scale < 1.0 { 2 } else { 0 }
    }
}

const fn field(
    object_id: u8,
    label: &'static str,
    width: usize,
    signed: bool,
    scale: f64,
    unit: &'static str,
) -> FieldDescriptor {
    FieldDescriptor {
        object_id,
        label,
        width,
        signed,
        scale,
        unit,
    }
}

// Sorted by object id; `lookup` relies on the ordering.
static FIELDS: &[FieldDescriptor] = &[
    field(0x00, "Packet", 1, false, 1.0, ""),
    field(0x01, "Battery", 1, false, 1.0, "%"),
    field(0x02, "Temperature", 2, true, 0.01, "°C"),
    field(0x03, "Humidity", 2, false, 0.01, "%"),
    field(0x06, "Mass", 2, false, 0.01, "kg"),
    field(0x08, "Dewpoint", 2, true, 0.01, "°C"),
    field(0x09, "Count", 1, false, 1.0, ""),
    field(0x0C, "Voltage", 2, false, 0.001, "V"),
    field(0x0D, "PM2.5", 2, false, 1.0, "µg/m³"),
    field(0x0E, "PM10", 2, false, 1.0, "µg/m³"),
    field(0x12, "CO2", 2, false, 1.0, "ppm"),
    field(0x13, "TVOC", 2, false, 1.0, "µg/m³"),
    field(0x2E, "Humidity", 1, false, 1.0, "%"),
    field(0x45, "Temperature", 2, true, 0.1, "°C"),
];

/// Look up the decoding descriptor for an object id.
pub fn lookup(object_id: u8) -> Option<&'static FieldDescriptor> {
    FIELDS
        .binary_search_by_key(&object_id, |field| field.object_id)
        .ok()
        .map(|index| &FIELDS[index])
}

#[cfg(test)]
pub(crate) fn entries() -> &'static [FieldDescriptor] {
    FIELDS
}

#[cfg(test)]
mod tests {
    use super::{FIELDS, lookup};

    #[test]
    fn table_is_sorted_and_unique() {
        for pair in FIELDS.windows(2) {
            assert!(pair[0].object_id < pair[1].object_id);
        }
    }

    #[test]
    fn lookup_finds_every_row() {
        for field in FIELDS {
            let found = lookup(field.object_id).expect("registered id");
            assert_eq!(found.label, field.label);
        }
    }

    #[test]
    fn lookup_unknown_id_is_none() {
        assert!(lookup(0xFF).is_none());
        assert!(lookup(0x04).is_none());
    }

    #[test]
    fn battery_descriptor() {
        let field = lookup(0x01).expect("battery");
        assert_eq!(field.label, "Battery");
        assert_eq!(field.width, 1);
        assert!(!field.signed);
        assert_eq!(field.scale, 1.0);
        assert_eq!(field.unit, "%");
        assert_eq!(field.decimals(), 0);
    }

    #[test]
    fn temperature_descriptor() {
        let field = lookup(0x02).expect("temperature");
        assert_eq!(field.label, "Temperature");
        assert_eq!(field.width, 2);
        assert!(field.signed);
        assert_eq!(field.scale, 0.01);
        assert_eq!(field.unit, "°C");
        assert_eq!(field.decimals(), 2);
    }

    #[test]
    fn voltage_descriptor() {
        let field = lookup(0x0C).expect("voltage");
        assert_eq!(field.width, 2);
        assert!(!field.signed);
        assert_eq!(field.scale, 0.001);
        assert_eq!(field.unit, "V");
    }
}
