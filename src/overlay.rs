//! Geometry for the three motion cue layouts.
//!
//! Rendering is a pure function of the smoothed axis values and the style
//! settings. Sizes are in abstract overlay units (pixels in the plugin UI).
//! All smoothing state lives in [`crate::smoothing::MotionHistoryBuffer`].

use serde::{Deserialize, Serialize};

use crate::settings::VisualStyle;

/// Edge bar length at full intensity.
pub const EDGE_MAX_LENGTH: f64 = 100.0;
/// Edge bar thickness.
pub const EDGE_THICKNESS: f64 = 4.0;
/// Corner dot diameter.
pub const DOT_SIZE: f64 = 10.0;
/// Corner dot travel from its corner at full intensity.
pub const DOT_MAX_OFFSET: f64 = 30.0;
/// Center ring diameter at rest.
pub const CIRCLE_BASE_SIZE: f64 = 20.0;
/// Center ring diameter at full intensity.
pub const CIRCLE_MAX_SIZE: f64 = 80.0;
/// Center ring stroke width.
pub const CIRCLE_BORDER_WIDTH: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// One drawable cue element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CueShape {
    /// Bar centred on a screen edge.
    EdgeBar {
        edge: Edge,
        width: f64,
        height: f64,
        opacity: f64,
    },
    /// Filled dot pushed inwards from a corner.
    CornerDot {
        corner: Corner,
        inset_x: f64,
        inset_y: f64,
        diameter: f64,
        opacity: f64,
    },
    /// Stroke-only ring in the screen centre.
    CenterRing {
        diameter: f64,
        border_width: f64,
        opacity: f64,
    },
}

impl CueShape {
    pub fn opacity(&self) -> f64 {
        match self {
            CueShape::EdgeBar { opacity, .. }
            | CueShape::CornerDot { opacity, .. }
            | CueShape::CenterRing { opacity, .. } => *opacity,
        }
    }
}

/// Rendered cue layout for one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CueLayout {
    pub style: VisualStyle,
    pub color: String,
    pub cues: Vec<CueShape>,
}

/// Produce the cue layout for the given smoothed values and style.
pub fn render_cues(
    x: f64,
    y: f64,
    z: f64,
    style: VisualStyle,
    color: &str,
    opacity: f64,
) -> CueLayout {
    let cues = match style {
        VisualStyle::EdgeLines => edge_lines(x, y, opacity),
        VisualStyle::CornerDots => corner_dots(x, y, opacity),
        VisualStyle::CenterCircle => vec![center_circle(x, y, z, opacity)],
    };

    CueLayout {
        style,
        color: color.to_string(),
        cues,
    }
}

/// Render from a raw style tag; unknown tags render as edge lines.
pub fn render_cues_tagged(
    x: f64,
    y: f64,
    z: f64,
    style_tag: &str,
    color: &str,
    opacity: f64,
) -> CueLayout {
    render_cues(x, y, z, VisualStyle::from_tag(style_tag), color, opacity)
}

// Top/bottom track x, left/right track y.
fn edge_lines(x: f64, y: f64, opacity: f64) -> Vec<CueShape> {
    let horizontal = |edge| CueShape::EdgeBar {
        edge,
        width: EDGE_MAX_LENGTH * x,
        height: EDGE_THICKNESS,
        opacity: opacity * x,
    };
    let vertical = |edge| CueShape::EdgeBar {
        edge,
        width: EDGE_THICKNESS,
        height: EDGE_MAX_LENGTH * y,
        opacity: opacity * y,
    };

    vec![
        horizontal(Edge::Top),
        horizontal(Edge::Bottom),
        vertical(Edge::Left),
        vertical(Edge::Right),
    ]
}

fn corner_dots(x: f64, y: f64, opacity: f64) -> Vec<CueShape> {
    let dot_opacity = opacity * x.max(y);
    [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ]
    .into_iter()
    .map(|corner| CueShape::CornerDot {
        corner,
        inset_x: DOT_MAX_OFFSET * x,
        inset_y: DOT_MAX_OFFSET * y,
        diameter: DOT_SIZE,
        opacity: dot_opacity,
    })
    .collect()
}

fn center_circle(x: f64, y: f64, z: f64, opacity: f64) -> CueShape {
    let intensity = x.max(y).max(z);
    CueShape::CenterRing {
        diameter: CIRCLE_BASE_SIZE + (CIRCLE_MAX_SIZE - CIRCLE_BASE_SIZE) * intensity,
        border_width: CIRCLE_BORDER_WIDTH,
        opacity: opacity * intensity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_edge_lines_geometry() {
        let layout = render_cues(0.5, 0.25, 0.9, VisualStyle::EdgeLines, "#00FF00", 0.8);
        assert_eq!(layout.cues.len(), 4);
        assert_eq!(layout.color, "#00FF00");

        match &layout.cues[0] {
            CueShape::EdgeBar { edge, width, height, opacity } => {
                assert_eq!(*edge, Edge::Top);
                assert_abs_diff_eq!(*width, 50.0, epsilon = 1e-9);
                assert_eq!(*height, EDGE_THICKNESS);
                assert_abs_diff_eq!(*opacity, 0.4, epsilon = 1e-9);
            }
            other => panic!("unexpected cue {other:?}"),
        }
        match &layout.cues[3] {
            CueShape::EdgeBar { edge, width, height, opacity } => {
                assert_eq!(*edge, Edge::Right);
                assert_eq!(*width, EDGE_THICKNESS);
                assert_abs_diff_eq!(*height, 25.0, epsilon = 1e-9);
                assert_abs_diff_eq!(*opacity, 0.2, epsilon = 1e-9);
            }
            other => panic!("unexpected cue {other:?}"),
        }
    }

    #[test]
    fn test_corner_dots_share_offsets() {
        let layout = render_cues(0.2, 0.6, 0.0, VisualStyle::CornerDots, "#FFFFFF", 1.0);
        assert_eq!(layout.cues.len(), 4);
        for cue in &layout.cues {
            match cue {
                CueShape::CornerDot { inset_x, inset_y, diameter, opacity, .. } => {
                    assert_abs_diff_eq!(*inset_x, 6.0, epsilon = 1e-9);
                    assert_abs_diff_eq!(*inset_y, 18.0, epsilon = 1e-9);
                    assert_eq!(*diameter, DOT_SIZE);
                    assert_abs_diff_eq!(*opacity, 0.6, epsilon = 1e-9);
                }
                other => panic!("unexpected cue {other:?}"),
            }
        }
    }

    #[test]
    fn test_center_circle_interpolates_size() {
        let rest = render_cues(0.0, 0.0, 0.0, VisualStyle::CenterCircle, "#FF0000", 0.9);
        let full = render_cues(0.1, 0.2, 1.0, VisualStyle::CenterCircle, "#FF0000", 0.9);
        let half = render_cues(0.5, 0.1, 0.2, VisualStyle::CenterCircle, "#FF0000", 0.9);

        assert_eq!(
            rest.cues,
            vec![CueShape::CenterRing { diameter: 20.0, border_width: 2.0, opacity: 0.0 }]
        );
        match (&full.cues[0], &half.cues[0]) {
            (
                CueShape::CenterRing { diameter: d_full, opacity: o_full, .. },
                CueShape::CenterRing { diameter: d_half, opacity: o_half, .. },
            ) => {
                assert_abs_diff_eq!(*d_full, 80.0, epsilon = 1e-9);
                assert_abs_diff_eq!(*o_full, 0.9, epsilon = 1e-9);
                assert_abs_diff_eq!(*d_half, 50.0, epsilon = 1e-9);
                assert_abs_diff_eq!(*o_half, 0.45, epsilon = 1e-9);
            }
            other => panic!("unexpected cues {other:?}"),
        }
    }

    #[test]
    fn test_unknown_style_matches_edge_lines() {
        let tagged = render_cues_tagged(0.3, 0.7, 0.1, "wobble", "#00AAFF", 0.5);
        let edge = render_cues(0.3, 0.7, 0.1, VisualStyle::EdgeLines, "#00AAFF", 0.5);
        assert_eq!(tagged, edge);
    }

    #[test]
    fn test_rendering_is_stateless() {
        let first = render_cues(0.4, 0.4, 0.4, VisualStyle::CornerDots, "#FFFF00", 0.7);
        for _ in 0..100 {
            render_cues(1.0, 0.0, 1.0, VisualStyle::CornerDots, "#FFFF00", 0.7);
        }
        let again = render_cues(0.4, 0.4, 0.4, VisualStyle::CornerDots, "#FFFF00", 0.7);
        assert_eq!(first, again);
    }

    #[test]
    fn test_shape_serializes_with_kind_tag() {
        let layout = render_cues(0.0, 0.0, 0.0, VisualStyle::CenterCircle, "#FFFFFF", 1.0);
        let value = serde_json::to_value(&layout).unwrap();
        assert_eq!(value["style"], "center_circle");
        assert_eq!(value["cues"][0]["kind"], "center_ring");
    }
}
