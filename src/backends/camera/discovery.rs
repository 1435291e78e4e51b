// SPDX-License-Identifier: GPL-3.0-only

//! Front/back device selection

use super::CameraBackend;
use super::types::{CameraDevice, CameraPosition, DeviceFacing, DeviceFilter};
use tracing::{debug, info};

/// Devices chosen for the two pipelines
///
/// A missing device means that pipeline is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredDevices {
    pub front: Option<CameraDevice>,
    pub back: Option<CameraDevice>,
}

impl DiscoveredDevices {
    /// Device selected for a position
    pub fn get(&self, position: CameraPosition) -> Option<&CameraDevice> {
        match position {
            CameraPosition::Front => self.front.as_ref(),
            CameraPosition::Back => self.back.as_ref(),
        }
    }

    /// Partition an enumerated list; the first match per facing wins
    pub fn select(devices: impl IntoIterator<Item = CameraDevice>, filter: &DeviceFilter) -> Self {
        let mut selected = Self::default();

        for device in devices {
            if !filter.matches(&device) {
                debug!(name = %device.name, kind = %device.kind, "Device rejected by filter");
                continue;
            }
            let slot = match device.facing {
                DeviceFacing::Front => &mut selected.front,
                DeviceFacing::Back => &mut selected.back,
                DeviceFacing::External | DeviceFacing::Unspecified => {
                    debug!(
                        name = %device.name,
                        facing = %device.facing,
                        "Ignoring device without front/back facing"
                    );
                    continue;
                }
            };
            if slot.is_none() {
                *slot = Some(device);
            }
        }

        selected
    }
}

/// Enumerate once and pick the first front and first back device
///
/// Never fails; absence is reported as `None`.
pub fn discover(backend: &dyn CameraBackend, filter: &DeviceFilter) -> DiscoveredDevices {
    let devices = backend.enumerate_cameras();
    let selected = DiscoveredDevices::select(devices, filter);

    info!(
        front = selected.front.as_ref().map(|d| d.name.as_str()),
        back = selected.back.as_ref().map(|d| d.name.as_str()),
        "Device discovery complete"
    );

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::{DeviceKind, SensorRotation};

    fn device(name: &str, facing: DeviceFacing, kind: DeviceKind) -> CameraDevice {
        CameraDevice {
            name: name.to_string(),
            path: format!("pipewire-{}", name),
            metadata_path: None,
            facing,
            kind,
            rotation: SensorRotation::None,
        }
    }

    #[test]
    fn test_first_match_per_facing_wins() {
        let devices = vec![
            device("ir", DeviceFacing::Front, DeviceKind::Infrared),
            device("front-a", DeviceFacing::Front, DeviceKind::WideAngle),
            device("front-b", DeviceFacing::Front, DeviceKind::WideAngle),
            device("usb", DeviceFacing::External, DeviceKind::WideAngle),
            device("back-a", DeviceFacing::Back, DeviceKind::DualCamera),
        ];
        let selected = DiscoveredDevices::select(devices, &DeviceFilter::default());
        assert_eq!(selected.front.unwrap().name, "front-a");
        assert_eq!(selected.back.unwrap().name, "back-a");
    }

    #[test]
    fn test_filter_excluding_everything() {
        let devices = vec![device("tele", DeviceFacing::Back, DeviceKind::Telephoto)];
        let selected = DiscoveredDevices::select(devices, &DeviceFilter::default());
        assert_eq!(selected, DiscoveredDevices::default());
        assert!(selected.get(CameraPosition::Back).is_none());
    }
}
