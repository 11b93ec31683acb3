//! # Body Model Module
//!
//! The selectable regions of the human-body panel. Each region maps to the
//! pressure signal it anatomically represents: the head prefers the
//! intracranial channel, everything else the arterial one.
//!
//! The highlight colors are a fixed contract carried over from the
//! dashboard stylesheet and must not drift.

use crate::corpus::SignalKind;
use iced::Color;

/// Identifier for a selectable body region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyRegion {
    Head,
    Torso,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl BodyRegion {
    /// Human-readable label shown in the info panel
    pub fn display_name(&self) -> &'static str {
        match self {
            BodyRegion::Head => "Head",
            BodyRegion::Torso => "Torso",
            BodyRegion::LeftArm => "Left arm",
            BodyRegion::RightArm => "Right arm",
            BodyRegion::LeftLeg => "Left leg",
            BodyRegion::RightLeg => "Right leg",
        }
    }

    /// Highlight fill shown while the region is hovered or selected.
    ///
    /// head #fbb6ce, torso #9ae6b4, arms #81e6d9, legs #d6bcfa
    pub fn highlight_color(&self) -> Color {
        match self {
            BodyRegion::Head => Color::from_rgb8(0xfb, 0xb6, 0xce),
            BodyRegion::Torso => Color::from_rgb8(0x9a, 0xe6, 0xb4),
            BodyRegion::LeftArm | BodyRegion::RightArm => Color::from_rgb8(0x81, 0xe6, 0xd9),
            BodyRegion::LeftLeg | BodyRegion::RightLeg => Color::from_rgb8(0xd6, 0xbc, 0xfa),
        }
    }

    /// The signal this region selects when present in the loaded recording
    pub fn preferred_kind(&self) -> SignalKind {
        match self {
            BodyRegion::Head => SignalKind::Icp,
            _ => SignalKind::Art,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_names() {
        assert_eq!(BodyRegion::Head.display_name(), "Head");
        assert_eq!(BodyRegion::LeftLeg.display_name(), "Left leg");
    }

    #[test]
    fn test_region_signal_mapping() {
        assert_eq!(BodyRegion::Head.preferred_kind(), SignalKind::Icp);
        assert_eq!(BodyRegion::Torso.preferred_kind(), SignalKind::Art);
        assert_eq!(BodyRegion::RightLeg.preferred_kind(), SignalKind::Art);
    }

    #[test]
    fn test_highlight_colors_match_contract() {
        assert_eq!(
            BodyRegion::Head.highlight_color(),
            Color::from_rgb8(0xfb, 0xb6, 0xce)
        );
        assert_eq!(
            BodyRegion::Torso.highlight_color(),
            Color::from_rgb8(0x9a, 0xe6, 0xb4)
        );
        assert_eq!(
            BodyRegion::RightArm.highlight_color(),
            Color::from_rgb8(0x81, 0xe6, 0xd9)
        );
        assert_eq!(
            BodyRegion::LeftLeg.highlight_color(),
            Color::from_rgb8(0xd6, 0xbc, 0xfa)
        );
    }

    #[test]
    fn test_arm_regions_share_highlight() {
        assert_eq!(
            BodyRegion::LeftArm.highlight_color(),
            BodyRegion::RightArm.highlight_color()
        );
        assert_ne!(
            BodyRegion::Head.highlight_color(),
            BodyRegion::Torso.highlight_color()
        );
    }
}
