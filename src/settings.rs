use serde::{Deserialize, Serialize};
use std::fmt;

/// Visual layout used for motion cues.
///
/// Unknown tags decode as `EdgeLines`, which is also the default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VisualStyle {
    #[default]
    EdgeLines,
    CornerDots,
    CenterCircle,
}

impl VisualStyle {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "corner_dots" => VisualStyle::CornerDots,
            "center_circle" => VisualStyle::CenterCircle,
            _ => VisualStyle::EdgeLines,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            VisualStyle::EdgeLines => "edge_lines",
            VisualStyle::CornerDots => "corner_dots",
            VisualStyle::CenterCircle => "center_circle",
        }
    }
}

impl From<String> for VisualStyle {
    fn from(tag: String) -> Self {
        VisualStyle::from_tag(&tag)
    }
}

impl From<VisualStyle> for String {
    fn from(style: VisualStyle) -> Self {
        style.as_tag().to_string()
    }
}

impl fmt::Display for VisualStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Per-axis zero offsets and scale factors stored by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    pub offset_x: f64,
    pub offset_y: f64,
    pub offset_z: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub scale_z: f64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            offset_z: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            scale_z: 1.0,
        }
    }
}

/// Plugin settings as returned by `get_settings`.
///
/// Values are validated by the backend; nothing here clamps them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub enabled: bool,
    pub sensitivity: f64,
    pub visual_style: VisualStyle,
    pub color: String,
    pub opacity: f64,
    pub auto_activate: bool,
    pub calibration: CalibrationSettings,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            sensitivity: 0.5,
            visual_style: VisualStyle::EdgeLines,
            color: "#00FF00".to_string(),
            opacity: 0.8,
            auto_activate: false,
            calibration: CalibrationSettings::default(),
        }
    }
}

impl OverlaySettings {
    /// Merge a partial update into these settings.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(sensitivity) = patch.sensitivity {
            self.sensitivity = sensitivity;
        }
        if let Some(style) = patch.visual_style {
            self.visual_style = style;
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity;
        }
        if let Some(auto_activate) = patch.auto_activate {
            self.auto_activate = auto_activate;
        }
    }

    /// The style-related subset stored in presets.
    pub fn preset_patch(&self) -> SettingsPatch {
        SettingsPatch {
            enabled: None,
            sensitivity: Some(self.sensitivity),
            visual_style: Some(self.visual_style),
            color: Some(self.color.clone()),
            opacity: Some(self.opacity),
            auto_activate: Some(self.auto_activate),
        }
    }
}

/// Partial settings update sent to `update_settings` and stored in presets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_style: Option<VisualStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_activate: Option<bool>,
}

impl SettingsPatch {
    pub fn auto_activate(value: bool) -> Self {
        Self {
            auto_activate: Some(value),
            ..Default::default()
        }
    }

    pub fn sensitivity(value: f64) -> Self {
        Self {
            sensitivity: Some(value),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_style_falls_back_to_edge_lines() {
        let style: VisualStyle = serde_json::from_value(json!("spiral")).unwrap();
        assert_eq!(style, VisualStyle::EdgeLines);
        let style: VisualStyle = serde_json::from_value(json!("center_circle")).unwrap();
        assert_eq!(style, VisualStyle::CenterCircle);
    }

    #[test]
    fn test_style_encodes_as_tag() {
        let value = serde_json::to_value(VisualStyle::CornerDots).unwrap();
        assert_eq!(value, json!("corner_dots"));
    }

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: OverlaySettings =
            serde_json::from_value(json!({ "sensitivity": 0.9, "auto_activate": true })).unwrap();
        assert_eq!(settings.sensitivity, 0.9);
        assert!(settings.auto_activate);
        assert_eq!(settings.visual_style, VisualStyle::EdgeLines);
        assert_eq!(settings.color, "#00FF00");
        assert_eq!(settings.calibration.scale_y, 1.0);
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = SettingsPatch::auto_activate(false);
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "auto_activate": false }));
        assert!(SettingsPatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_apply_patch() {
        let mut settings = OverlaySettings::default();
        settings.apply(&SettingsPatch {
            visual_style: Some(VisualStyle::CenterCircle),
            color: Some("#FF0000".to_string()),
            ..Default::default()
        });
        assert_eq!(settings.visual_style, VisualStyle::CenterCircle);
        assert_eq!(settings.color, "#FF0000");
        assert_eq!(settings.sensitivity, 0.5);
    }

    #[test]
    fn test_preset_patch_round_trips_style_fields() {
        let mut source = OverlaySettings::default();
        source.sensitivity = 0.7;
        source.visual_style = VisualStyle::CornerDots;

        let mut target = OverlaySettings::default();
        target.enabled = true;
        target.apply(&source.preset_patch());

        assert_eq!(target.sensitivity, 0.7);
        assert_eq!(target.visual_style, VisualStyle::CornerDots);
        assert!(target.enabled);
    }
}
