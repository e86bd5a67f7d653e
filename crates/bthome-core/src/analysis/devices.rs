use std::collections::{BTreeMap, HashMap};

use crate::protocols::bthome::Measurement;
use crate::{DeviceSummary, MeasurementSummary};

#[derive(Debug, Default)]
pub(crate) struct DeviceStats {
    frames: u64,
    // Keyed by (label, unit) so fields sharing a label stay distinct.
    measurements: BTreeMap<(String, String), MeasurementStats>,
}

#[derive(Debug)]
struct MeasurementStats {
    last_value: String,
    samples: u64,
}

pub(crate) fn add_device_frame(
    stats: &mut HashMap<String, DeviceStats>,
    address: &str,
    measurements: &[Measurement],
) {
    let entry = stats.entry(address.to_string()).or_default();
    entry.frames += 1;
    for measurement in measurements {
        let key = (
            measurement.label.to_string(),
            measurement.unit.to_string(),
        );
        match entry.measurements.get_mut(&key) {
            Some(existing) => {
                existing.last_value = measurement.value_text();
                existing.samples += 1;
            }
            None => {
                entry.measurements.insert(
                    key,
                    MeasurementStats {
                        last_value: measurement.value_text(),
                        samples: 1,
                    },
                );
            }
        }
    }
}

pub(crate) fn build_device_summaries(stats: HashMap<String, DeviceStats>) -> Vec<DeviceSummary> {
    let mut devices: Vec<DeviceSummary> = stats
        .into_iter()
        .map(|(address, stats)| DeviceSummary {
            address,
            frames: stats.frames,
            measurements: stats
                .measurements
                .into_iter()
                .map(|((label, unit), stats)| MeasurementSummary {
                    label,
                    last_value: stats.last_value,
                    unit,
                    samples: stats.samples,
                })
                .collect(),
        })
        .collect();

    devices.sort_by(|a, b| a.address.cmp(&b.address));
    devices
}

#[cfg(test)]
mod tests {
    use super::{add_device_frame, build_device_summaries};
    use crate::protocols::bthome::Measurement;
    use std::collections::HashMap;

    fn battery(value: f64) -> Measurement {
        Measurement {
            label: "Battery",
            value,
            unit: "%",
            decimals: 0,
        }
    }

    #[test]
    fn repeated_frames_update_last_value_and_samples() {
        let mut stats = HashMap::new();
        add_device_frame(&mut stats, "a4:c1:38:2f:6e:01", &[battery(100.0)]);
        add_device_frame(&mut stats, "a4:c1:38:2f:6e:01", &[battery(99.0)]);

        let devices = build_device_summaries(stats);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].frames, 2);
        assert_eq!(devices[0].measurements.len(), 1);
        assert_eq!(devices[0].measurements[0].last_value, "99");
        assert_eq!(devices[0].measurements[0].samples, 2);
    }

    #[test]
    fn devices_are_sorted_by_address() {
        let mut stats = HashMap::new();
        add_device_frame(&mut stats, "b0:00:00:00:00:01", &[]);
        add_device_frame(&mut stats, "a0:00:00:00:00:01", &[]);

        let devices = build_device_summaries(stats);
        assert_eq!(devices[0].address, "a0:00:00:00:00:01");
        assert_eq!(devices[1].address, "b0:00:00:00:00:01");
    }

    #[test]
    fn measurements_are_sorted_by_label() {
        let voltage = Measurement {
            label: "Voltage",
            value: 1.0,
            unit: "V",
            decimals: 2,
        };
        let mut stats = HashMap::new();
        add_device_frame(&mut stats, "a0:00:00:00:00:01", &[voltage, battery(80.0)]);

        let devices = build_device_summaries(stats);
        let labels: Vec<&str> = devices[0]
            .measurements
            .iter()
            .map(|m| m.label.as_str())
            .collect();
        assert_eq!(labels, ["Battery", "Voltage"]);
    }
}
