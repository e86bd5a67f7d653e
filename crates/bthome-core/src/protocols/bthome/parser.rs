use std::fmt;

use super::error::{FrameError, Truncated};
use super::layout;
use super::reader::FrameReader;
use super::registry;

/// One decoded reading, already scaled to its physical unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub label: &'static str,
    pub value: f64,
    pub unit: &'static str,
    /// Decimal places used when rendering; 2 for fractional scales.
    pub decimals: usize,
}

impl Measurement {
    /// Render the value with the field's decimal precision.
    pub fn value_text(&self) -> String {
        format!("{:.*}", self.decimals, self.value)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}{}", self.label, self.value_text(), self.unit)
    }
}

/// Result of scanning one payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPayload {
    /// Measurements in payload order.
    pub measurements: Vec<Measurement>,
    /// Set when the scan stopped before the end of the payload.
    pub truncated: Option<Truncated>,
}

/// Validate the advertisement envelope and return the payload slice.
pub fn validate_frame(frame: &[u8]) -> Result<&[u8], FrameError> {
    let reader = FrameReader::new(frame);
    reader.require_len(layout::MIN_LEN)?;

    let service_id = reader.read_u16_le(layout::SERVICE_ID_RANGE.clone())?;
    if service_id != layout::SERVICE_ID {
        return Err(FrameError::ServiceIdMismatch {
            expected: layout::SERVICE_ID,
            actual: service_id,
        });
    }

    let device_info = reader.read_u8(layout::DEVICE_INFO_OFFSET)?;
    let version = (device_info >> layout::VERSION_SHIFT) & layout::VERSION_MASK;
    if version != layout::SUPPORTED_VERSION {
        return Err(FrameError::UnsupportedVersion { version });
    }

    reader.read_remainder(layout::PAYLOAD_OFFSET)
}

/// Scan a payload into measurements.
///
/// Object ids imply the value length, so an unknown id stops the whole
/// scan: without a width the remaining bytes cannot be segmented. The
/// same applies to a value cut off by the end of the payload. Everything
/// decoded before the stop point is returned either way.
pub fn decode_payload(payload: &[u8]) -> DecodedPayload {
    let reader = FrameReader::new(payload);
    let mut measurements = Vec::new();
    let mut cursor = 0usize;

    while let Ok(object_id) = reader.read_u8(cursor) {
        let id_offset = cursor;
        cursor += 1;

        let field = match registry::lookup(object_id) {
            Some(field) => field,
            None => {
                return DecodedPayload {
                    measurements,
                    truncated: Some(Truncated::UnknownObjectId {
                        object_id,
                        offset: id_offset,
                    }),
                };
            }
        };

        let raw = match reader.read_int_le(cursor, field.width, field.signed) {
            Ok(raw) => raw,
            Err(_) => {
                return DecodedPayload {
                    measurements,
                    truncated: Some(Truncated::IncompleteValue {
                        object_id,
                        needed: field.width,
                        remaining: payload.len() - cursor,
                    }),
                };
            }
        };
        cursor += field.width;

        measurements.push(Measurement {
            label: field.label,
            value: raw as f64 * field.scale,
            unit: field.unit,
            decimals: field.decimals(),
        });
    }

    DecodedPayload {
        measurements,
        truncated: None,
    }
}

/// Validate a frame and decode its payload in one step.
pub fn decode_frame(frame: &[u8]) -> Result<DecodedPayload, FrameError> {
    let payload = validate_frame(frame)?;
    Ok(decode_payload(payload))
}

#[cfg(test)]
mod tests {
    use super::{decode_frame, decode_payload, validate_frame};
    use crate::protocols::bthome::error::{FrameError, Truncated};
    use crate::protocols::bthome::{layout, registry};

    fn frame_with_payload(payload: &[u8]) -> Vec<u8> {
        let mut frame = vec![0xD2, 0xFC, 0x40];
        frame.extend_from_slice(payload);
        frame
    }

    #[test]
    fn decode_battery_and_temperature() {
        let decoded = decode_payload(&[0x01, 0x64, 0x02, 0x34, 0x12]);
        assert!(decoded.truncated.is_none());
        assert_eq!(decoded.measurements.len(), 2);

        let battery = &decoded.measurements[0];
        assert_eq!(battery.label, "Battery");
        assert_eq!(battery.value, 100.0);
        assert_eq!(battery.unit, "%");
        assert_eq!(battery.value_text(), "100");

        let temperature = &decoded.measurements[1];
        assert_eq!(temperature.label, "Temperature");
        assert!((temperature.value - 46.6).abs() < 1e-9);
        assert_eq!(temperature.unit, "°C");
        assert_eq!(temperature.value_text(), "46.60");
    }

    #[test]
    fn decode_voltage() {
        let decoded = decode_payload(&[0x0C, 0xE8, 0x03]);
        assert!(decoded.truncated.is_none());
        assert_eq!(decoded.measurements.len(), 1);

        let voltage = &decoded.measurements[0];
        assert_eq!(voltage.label, "Voltage");
        assert!((voltage.value - 1.0).abs() < 1e-9);
        assert_eq!(voltage.unit, "V");
        assert_eq!(voltage.value_text(), "1.00");
    }

    #[test]
    fn decode_negative_temperature() {
        // 0xFF38 little-endian is -200 raw, -2.00 °C scaled.
        let decoded = decode_payload(&[0x02, 0x38, 0xFF]);
        let temperature = &decoded.measurements[0];
        assert!((temperature.value - -2.0).abs() < 1e-9);
        assert_eq!(temperature.value_text(), "-2.00");
    }

    #[test]
    fn decode_packet_id() {
        let decoded = decode_payload(&[0x00, 0x05]);
        let packet = &decoded.measurements[0];
        assert_eq!(packet.label, "Packet");
        assert_eq!(packet.value_text(), "5");
        assert_eq!(packet.unit, "");
        assert_eq!(packet.to_string(), "Packet: 5");
    }

    #[test]
    fn unknown_id_stops_the_scan() {
        let decoded = decode_payload(&[0xFF, 0x00]);
        assert!(decoded.measurements.is_empty());
        assert_eq!(
            decoded.truncated,
            Some(Truncated::UnknownObjectId {
                object_id: 0xFF,
                offset: 0
            })
        );
    }

    #[test]
    fn unknown_id_keeps_prior_measurements() {
        let decoded = decode_payload(&[0x01, 0x64, 0xFF, 0x01, 0x02]);
        assert_eq!(decoded.measurements.len(), 1);
        assert_eq!(decoded.measurements[0].label, "Battery");
        assert_eq!(
            decoded.truncated,
            Some(Truncated::UnknownObjectId {
                object_id: 0xFF,
                offset: 2
            })
        );
    }

    #[test]
    fn incomplete_trailing_value_stops_the_scan() {
        let decoded = decode_payload(&[0x01, 0x64, 0x02, 0x34]);
        assert_eq!(decoded.measurements.len(), 1);
        assert_eq!(
            decoded.truncated,
            Some(Truncated::IncompleteValue {
                object_id: 0x02,
                needed: 2,
                remaining: 1
            })
        );
    }

    #[test]
    fn empty_payload_decodes_to_nothing() {
        let decoded = decode_payload(&[]);
        assert!(decoded.measurements.is_empty());
        assert!(decoded.truncated.is_none());
    }

    #[test]
    fn every_registered_field_round_trips_a_single_record() {
        for field in registry::entries() {
            let mut payload = vec![field.object_id];
            payload.extend(std::iter::repeat(0x01).take(field.width));
            let decoded = decode_payload(&payload);
            assert!(decoded.truncated.is_none(), "field {:#04x}", field.object_id);
            assert_eq!(decoded.measurements.len(), 1);

            let mut raw = 0i64;
            for index in 0..field.width {
                raw |= 0x01 << (8 * index);
            }
            let expected = raw as f64 * field.scale;
            assert!(
                (decoded.measurements[0].value - expected).abs() < 1e-9,
                "field {:#04x}",
                field.object_id
            );
        }
    }

    #[test]
    fn every_registered_field_reports_truncation_when_cut() {
        for field in registry::entries() {
            let mut payload = vec![field.object_id];
            payload.extend(std::iter::repeat(0x01).take(field.width - 1));
            let decoded = decode_payload(&payload);
            assert!(decoded.measurements.is_empty());
            assert_eq!(
                decoded.truncated,
                Some(Truncated::IncompleteValue {
                    object_id: field.object_id,
                    needed: field.width,
                    remaining: field.width - 1
                })
            );
        }
    }

    #[test]
    fn validate_accepts_matching_envelope() {
        let frame = frame_with_payload(&[0x01, 0x64]);
        let payload = validate_frame(&frame).unwrap();
        assert_eq!(payload, &[0x01, 0x64]);
    }

    #[test]
    fn validate_ignores_device_info_low_bits() {
        // 0x45 still carries version 2 in bits 5-7.
        let payload = validate_frame(&[0xD2, 0xFC, 0x45]).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn validate_rejects_service_id_mismatch() {
        let err = validate_frame(&[0x34, 0x12, 0x40, 0x01, 0x64]).unwrap_err();
        assert_eq!(
            err,
            FrameError::ServiceIdMismatch {
                expected: layout::SERVICE_ID,
                actual: 0x1234
            }
        );
    }

    #[test]
    fn validate_rejects_short_frame() {
        let err = validate_frame(&[0xD2, 0xFC]).unwrap_err();
        assert_eq!(
            err,
            FrameError::ShortFrame {
                needed: 3,
                actual: 2
            }
        );
        assert!(matches!(
            validate_frame(&[]),
            Err(FrameError::ShortFrame { .. })
        ));
    }

    #[test]
    fn validate_rejects_unsupported_version() {
        // Device info 0x60 carries version 3.
        let err = validate_frame(&[0xD2, 0xFC, 0x60]).unwrap_err();
        assert_eq!(err, FrameError::UnsupportedVersion { version: 3 });
    }

    #[test]
    fn decode_frame_end_to_end() {
        let frame = frame_with_payload(&[0x01, 0x64, 0x02, 0x34, 0x12]);
        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.measurements.len(), 2);
        assert_eq!(decoded.measurements[1].value_text(), "46.60");
    }
}
