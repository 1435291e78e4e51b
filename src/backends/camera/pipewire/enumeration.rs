// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire camera enumeration and format detection
//!
//! Cameras are discovered by parsing `pw-cli` output. Parsing is kept in pure
//! functions so it can be tested against captured output.

use super::super::types::{
    CameraDevice, CameraFormat, DeviceFacing, DeviceKind, Framerate, SensorRotation,
};
use crate::constants::formats;
use tracing::{debug, info, warn};

/// A `Video/Source` node as listed by `pw-cli ls Node`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeEntry {
    pub id: String,
    pub serial: Option<String>,
    pub description: Option<String>,
    pub nick: Option<String>,
}

impl NodeEntry {
    /// Capture path understood by the pipeline builder
    pub fn capture_path(&self) -> String {
        match &self.serial {
            Some(serial) => format!("pipewire-serial-{}", serial),
            None => format!("pipewire-{}", self.id),
        }
    }

    /// Human-readable name, preferring the description
    pub fn display_name(&self) -> String {
        self.description
            .clone()
            .or_else(|| self.nick.clone())
            .unwrap_or_else(|| format!("Camera {}", self.id))
    }

    /// Virtual camera outputs published by other camera apps
    pub fn is_virtual(&self) -> bool {
        self.display_name().contains("(Virtual)")
    }
}

/// Per-node properties only exposed by `pw-cli info`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeProperties {
    pub facing: DeviceFacing,
    pub rotation: SensorRotation,
}

/// Enumerate cameras using PipeWire
///
/// Returns `None` when PipeWire is unavailable or no camera node exists.
pub fn enumerate_pipewire_cameras() -> Option<Vec<CameraDevice>> {
    debug!("Attempting to enumerate cameras via PipeWire");

    if !is_pipewire_available() {
        warn!("pipewiresrc not available, cannot enumerate cameras");
        return None;
    }

    let stdout = run_pw_cli(&["ls", "Node"])?;
    let nodes = parse_node_list(&stdout);

    let cameras: Vec<CameraDevice> = nodes
        .into_iter()
        .filter(|node| {
            if node.is_virtual() {
                debug!(name = %node.display_name(), "Skipping virtual camera output");
            }
            !node.is_virtual()
        })
        .map(|node| {
            let properties = run_pw_cli(&["info", &node.id])
                .map(|info| parse_node_info(&info))
                .unwrap_or_default();
            let name = node.display_name();
            let device = CameraDevice {
                kind: DeviceKind::from_name(&name),
                path: node.capture_path(),
                metadata_path: Some(node.id.clone()),
                facing: properties.facing,
                rotation: properties.rotation,
                name,
            };
            debug!(
                id = %node.id,
                name = %device.name,
                facing = %device.facing,
                kind = %device.kind,
                rotation = %device.rotation,
                "Found video camera"
            );
            device
        })
        .collect();

    if cameras.is_empty() {
        debug!("No cameras found via pw-cli");
        None
    } else {
        info!(count = cameras.len(), "Enumerated cameras via pw-cli");
        Some(cameras)
    }
}

fn run_pw_cli(args: &[&str]) -> Option<String> {
    let output = std::process::Command::new("pw-cli").args(args).output();
    match output {
        Ok(output) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(output) => {
            debug!(?args, status = ?output.status, "pw-cli command failed");
            None
        }
        Err(e) => {
            debug!(?args, error = %e, "pw-cli not runnable");
            None
        }
    }
}

/// Parse `pw-cli ls Node` output into the list of video source nodes
pub fn parse_node_list(stdout: &str) -> Vec<NodeEntry> {
    let mut nodes = Vec::new();
    let mut current: Option<NodeEntry> = None;
    let mut is_video_source = false;

    for line in stdout.lines() {
        let trimmed = line.trim();

        // "id 76, type PipeWire:Interface:Node/3"
        if trimmed.starts_with("id ") && trimmed.contains("type PipeWire:Interface:Node") {
            if is_video_source && let Some(node) = current.take() {
                nodes.push(node);
            }
            current = trimmed
                .strip_prefix("id ")
                .and_then(|rest| rest.split(',').next())
                .map(|id| NodeEntry {
                    id: id.trim().to_string(),
                    ..NodeEntry::default()
                });
            is_video_source = false;
            continue;
        }

        let Some(node) = current.as_mut() else {
            continue;
        };

        if trimmed.contains("media.class") && trimmed.contains("\"Video/Source\"") {
            is_video_source = true;
        } else if trimmed.contains("object.serial") {
            node.serial = extract_quoted_value(trimmed);
        } else if trimmed.contains("node.description") {
            node.description = extract_quoted_value(trimmed);
        } else if trimmed.contains("node.nick") {
            node.nick = extract_quoted_value(trimmed);
        }
    }

    if is_video_source && let Some(node) = current {
        nodes.push(node);
    }

    nodes
}

/// Parse `pw-cli info <id>` output for libcamera location and rotation
pub fn parse_node_info(stdout: &str) -> NodeProperties {
    let mut properties = NodeProperties::default();

    for line in stdout.lines() {
        let trimmed = line.trim();
        if trimmed.contains("api.libcamera.location")
            && let Some(value) = extract_quoted_value(trimmed)
        {
            properties.facing = DeviceFacing::from_location(&value);
        } else if trimmed.contains("api.libcamera.rotation")
            && let Some(value) = extract_quoted_value(trimmed)
        {
            properties.rotation = SensorRotation::from_degrees(&value);
        }
    }

    properties
}

/// Extract quoted value from a property line (e.g., 'property = "value"' -> "value")
fn extract_quoted_value(line: &str) -> Option<String> {
    let start = line.find('"')?;
    let end = line[start + 1..].find('"')?;
    Some(line[start + 1..start + 1 + end].to_string())
}

/// Get supported formats for a PipeWire camera
///
/// Falls back to common MJPEG formats when the node cannot be queried.
pub fn get_pipewire_formats(device: &CameraDevice) -> Vec<CameraFormat> {
    if let Some(node_id) = device.metadata_path.as_deref() {
        if let Some(formats) =
            run_pw_cli(&["enum-params", node_id, "EnumFormat"]).map(|out| parse_enum_formats(&out))
            && !formats.is_empty()
        {
            info!(count = formats.len(), node_id, "Enumerated formats via pw-cli");
            return formats;
        }
        warn!(node_id, "Failed to enumerate formats from node, using fallback");
    } else {
        warn!(path = %device.path, "No node ID for format enumeration, using fallback");
    }

    fallback_formats()
}

/// Fallback formats when PipeWire enumeration fails
pub fn fallback_formats() -> Vec<CameraFormat> {
    formats::FALLBACK_RESOLUTIONS
        .iter()
        .flat_map(|&(width, height)| {
            formats::COMMON_FRAMERATES.iter().map(move |&fps| CameraFormat {
                width,
                height,
                framerate: Some(Framerate::from_int(fps)),
                pixel_format: "MJPG".to_string(),
            })
        })
        .collect()
}

/// Accumulates one `Object:` block of `pw-cli enum-params` output
#[derive(Default)]
struct FormatGroup {
    width: Option<u32>,
    height: Option<u32>,
    subtype: Option<String>,
    video_format: Option<String>,
    framerates: Vec<Framerate>,
}

impl FormatGroup {
    fn flush(&mut self, formats: &mut Vec<CameraFormat>) {
        let group = std::mem::take(self);
        let (Some(width), Some(height), Some(subtype)) = (group.width, group.height, group.subtype)
        else {
            return;
        };

        // Raw formats are named by VideoFormat, compressed ones by subtype
        let pixel_format = if subtype == "raw" {
            group.video_format.unwrap_or_else(|| "YUY2".to_string())
        } else {
            subtype.to_uppercase()
        };

        // libcamera nodes list no framerates and negotiate them on their own
        if group.framerates.is_empty() {
            formats.push(CameraFormat {
                width,
                height,
                framerate: None,
                pixel_format,
            });
        } else {
            formats.extend(group.framerates.iter().map(|fps| CameraFormat {
                width,
                height,
                framerate: Some(*fps),
                pixel_format: pixel_format.clone(),
            }));
        }
    }
}

/// Parse `pw-cli enum-params <id> EnumFormat` output
pub fn parse_enum_formats(stdout: &str) -> Vec<CameraFormat> {
    let mut formats = Vec::new();
    let mut group = FormatGroup::default();

    for line in stdout.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("Object:") {
            group.flush(&mut formats);
            continue;
        }

        // Id 131074   (Spa:Enum:MediaSubtype:mjpg)
        if trimmed.contains("Spa:Enum:MediaSubtype:")
            && let Some(start) = trimmed.rfind(':')
        {
            group.subtype = Some(trimmed[start + 1..].trim_end_matches(')').to_lowercase());
        }

        // Id 4   (Spa:Enum:VideoFormat:YUY2)
        if trimmed.contains("Spa:Enum:VideoFormat:")
            && let Some(start) = trimmed.rfind(':')
        {
            group.video_format = Some(trimmed[start + 1..].trim_end_matches(')').to_uppercase());
        }

        if let Some((w, h)) = trimmed
            .strip_prefix("Rectangle ")
            .and_then(|res| res.split_once('x'))
        {
            group.width = w.trim().parse().ok();
            group.height = h.trim().parse().ok();
        }

        if let Some((num, denom)) = trimmed
            .strip_prefix("Fraction ")
            .and_then(|frac| frac.split_once('/'))
            && let (Ok(num), Ok(denom)) = (num.trim().parse::<u32>(), denom.trim().parse::<u32>())
            && num > 0
            && denom > 0
        {
            let fps = Framerate::new(num, denom);
            if !group.framerates.iter().any(|f| f.as_int() == fps.as_int()) {
                group.framerates.push(fps);
            }
        }
    }
    group.flush(&mut formats);

    formats
}

/// Test if PipeWire is available and working
pub fn is_pipewire_available() -> bool {
    if gstreamer::init().is_err() {
        return false;
    }

    gstreamer::ElementFactory::make("pipewiresrc")
        .build()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LS_NODE: &str = r#"
	id 31, type PipeWire:Interface:Node/3
 		object.serial = "31"
 		factory.id = "18"
 		node.description = "Dummy-Driver"
 		node.name = "Dummy-Driver"
	id 64, type PipeWire:Interface:Node/3
 		object.serial = "2146"
 		object.path = "libcamera:/base/soc/i2c0mux/i2c@1/ov5640@3c"
 		node.description = "Built-in Front Camera"
 		node.nick = "ov5640"
 		media.class = "Video/Source"
	id 65, type PipeWire:Interface:Node/3
 		node.description = "Built-in Back Camera"
 		media.class = "Video/Source"
"#;

    #[test]
    fn test_virtual_outputs_are_recognized() {
        let node = NodeEntry {
            id: "90".into(),
            description: Some("Camera (Virtual)".into()),
            ..NodeEntry::default()
        };
        assert!(node.is_virtual());

        let nodes = parse_node_list(LS_NODE);
        assert!(nodes.iter().all(|node| !node.is_virtual()));
    }

    #[test]
    fn test_parse_node_list_keeps_video_sources() {
        let nodes = parse_node_list(LS_NODE);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, "64");
        assert_eq!(nodes[0].capture_path(), "pipewire-serial-2146");
        assert_eq!(nodes[0].display_name(), "Built-in Front Camera");
        // No serial falls back to the node id
        assert_eq!(nodes[1].capture_path(), "pipewire-65");
    }

    #[test]
    fn test_parse_node_info() {
        let info = r#"
    id: 64
    * properties:
    *     api.libcamera.location = "front"
    *     api.libcamera.rotation = "270"
"#;
        let props = parse_node_info(info);
        assert_eq!(props.facing, DeviceFacing::Front);
        assert_eq!(props.rotation, SensorRotation::Rotate270);

        let props = parse_node_info("    * node.name = \"usb\"");
        assert_eq!(props, NodeProperties::default());
    }

    #[test]
    fn test_parse_enum_formats() {
        let out = r#"
  Object: size 232, type Spa:Pod:Object:Param:Format (262147), id Spa:Enum:ParamId:EnumFormat (3)
    Prop: key Spa:Pod:Object:Param:Format:mediaSubtype (2), flags 00000000
      Id 131073   (Spa:Enum:MediaSubtype:mjpg)
    Prop: key Spa:Pod:Object:Param:Format:Video:size (131075), flags 00000000
      Rectangle 1280x720
    Prop: key Spa:Pod:Object:Param:Format:Video:framerate (131076), flags 00000000
      Enum Fraction {
        Fraction 30/1
        Fraction 30/1
        Fraction 15/1
      }
  Object: size 232, type Spa:Pod:Object:Param:Format (262147), id Spa:Enum:ParamId:EnumFormat (3)
      Id 1   (Spa:Enum:MediaSubtype:raw)
      Id 4   (Spa:Enum:VideoFormat:YUY2)
      Rectangle 640x480
"#;
        let formats = parse_enum_formats(out);
        assert_eq!(formats.len(), 3);
        assert!(formats[0].is_mjpeg());
        assert_eq!(formats[0].framerate, Some(Framerate::from_int(30)));
        assert_eq!(formats[1].framerate, Some(Framerate::from_int(15)));
        assert_eq!(formats[2].pixel_format, "YUY2");
        assert_eq!(formats[2].framerate, None);
    }

    #[test]
    fn test_fallback_formats_are_mjpeg() {
        let formats = fallback_formats();
        assert!(!formats.is_empty());
        assert!(formats.iter().all(CameraFormat::is_mjpeg));
    }

    #[test]
    fn test_extract_quoted_value() {
        assert_eq!(
            extract_quoted_value(r#"node.nick = "Webcam""#),
            Some("Webcam".to_string())
        );
        assert_eq!(extract_quoted_value("no quotes"), None);
    }
}
