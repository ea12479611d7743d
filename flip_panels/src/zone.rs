//! Panel zones and their static layout

use common::{rgba8, Color};

use crate::text::TextStyle;

/// Thematic panel group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Past,
    Present,
    Near,
    Far,
}

/// How a zone's panels combine with what is behind them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Normal,
    Additive,
}

/// Shared colour and blend policy of a zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneStyle {
    pub color: Color,
    pub opacity: f32,
    pub blend: BlendMode,
    pub text_color: Color,
    /// Edge length of a panel in world units
    pub panel_size: f32,
}

impl Zone {
    pub const ALL: [Zone; 4] = [Zone::Past, Zone::Present, Zone::Near, Zone::Far];

    pub fn index(self) -> usize {
        match self {
            Zone::Past => 0,
            Zone::Present => 1,
            Zone::Near => 2,
            Zone::Far => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Zone::Past => "PAST",
            Zone::Present => "PRESENT",
            Zone::Near => "NEAR",
            Zone::Far => "FAR",
        }
    }

    pub fn style(self) -> ZoneStyle {
        match self {
            Zone::Past => ZoneStyle {
                color: rgba8(200, 168, 128, 255),
                opacity: 0.55,
                blend: BlendMode::Normal,
                text_color: rgba8(60, 40, 24, 255),
                panel_size: 70.0,
            },
            Zone::Present => ZoneStyle {
                color: rgba8(240, 240, 236, 255),
                opacity: 0.95,
                blend: BlendMode::Normal,
                text_color: rgba8(16, 16, 20, 255),
                panel_size: 90.0,
            },
            Zone::Near => ZoneStyle {
                color: rgba8(90, 220, 255, 255),
                opacity: 0.85,
                blend: BlendMode::Additive,
                text_color: rgba8(230, 250, 255, 255),
                panel_size: 80.0,
            },
            Zone::Far => ZoneStyle {
                color: rgba8(160, 110, 255, 255),
                opacity: 0.6,
                blend: BlendMode::Additive,
                text_color: rgba8(245, 235, 255, 255),
                panel_size: 110.0,
            },
        }
    }

    /// Style handed to the text rasterizer for this zone's cards
    pub fn text_style(self) -> TextStyle {
        let style = self.style();
        TextStyle {
            background: style.color,
            foreground: style.text_color,
            opacity: style.opacity,
        }
    }
}

/// Opacity multiplier for ambient effects: FAR panels pulse, the others stay solid
pub fn ambient_opacity(zone: Zone, now_ms: f64) -> f32 {
    match zone {
        Zone::Far => {
            let wave = (1.0 + (now_ms * 0.002).sin()) as f32 / 2.0;
            (0.6 + 0.4 * wave).clamp(0.5, 1.2)
        }
        _ => 1.0,
    }
}

/// Where and how many panels a zone gets
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneConfig {
    pub zone: Zone,
    pub count: usize,
    pub radius: f32,
    pub y_offset: f32,
    /// Added to every layout angle of the zone, in radians
    pub angle_offset: f32,
    /// Candidate texts, cycled in order
    pub texts: Vec<String>,
}

impl ZoneConfig {
    pub fn new(zone: Zone, count: usize, radius: f32, y_offset: f32, texts: &[&str]) -> Self {
        Self {
            zone,
            count,
            radius,
            y_offset,
            angle_offset: zone.index() as f32 * ZONE_ANGLE_STEP,
            texts: texts.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Angle offset between consecutive zones
pub const ZONE_ANGLE_STEP: f32 = 0.35;

/// The piece's built-in layout
pub fn default_layout() -> Vec<ZoneConfig> {
    vec![
        ZoneConfig::new(
            Zone::Past,
            6,
            420.0,
            -60.0,
            &[
                "what we kept",
                "an old address\nstill remembered",
                "the first winter",
                "letters never sent",
            ],
        ),
        ZoneConfig::new(
            Zone::Present,
            4,
            160.0,
            0.0,
            &[
                "now",
                "this breath",
                "the room you are in",
                "hands on the table",
            ],
        ),
        ZoneConfig::new(
            Zone::Near,
            5,
            260.0,
            40.0,
            &[
                "tomorrow morning",
                "the next message",
                "almost here",
                "a door left open",
            ],
        ),
        ZoneConfig::new(
            Zone::Far,
            7,
            520.0,
            120.0,
            &[
                "someday",
                "a city not yet built",
                "whoever reads this later",
                "light still travelling",
            ],
        ),
    ]
}
