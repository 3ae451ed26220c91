//! Acquisition settings chosen by the user.

use crate::error::ParseSettingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Detector pixel binning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Binning {
    #[serde(rename = "1x")]
    X1,
    #[serde(rename = "2x")]
    X2,
    #[serde(rename = "3x")]
    X3,
}

impl Binning {
    pub const ALL: [Binning; 3] = [Binning::X1, Binning::X2, Binning::X3];

    pub fn factor(self) -> u32 {
        match self {
            Binning::X1 => 1,
            Binning::X2 => 2,
            Binning::X3 => 3,
        }
    }

    fn index(self) -> usize {
        self.factor() as usize - 1
    }
}

impl fmt::Display for Binning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.factor())
    }
}

impl FromStr for Binning {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1x" | "1" => Ok(Binning::X1),
            "2x" | "2" => Ok(Binning::X2),
            "3x" | "3" => Ok(Binning::X3),
            _ => Err(ParseSettingError {
                kind: "binning",
                value: s.to_string(),
                expected: "1x, 2x, 3x",
            }),
        }
    }
}

/// Detector width in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectorWidth {
    #[serde(rename = "1920")]
    Px1920,
    #[serde(rename = "2856")]
    Px2856,
}

impl DetectorWidth {
    pub const ALL: [DetectorWidth; 2] = [DetectorWidth::Px1920, DetectorWidth::Px2856];

    pub fn pixels(self) -> u32 {
        match self {
            DetectorWidth::Px1920 => 1920,
            DetectorWidth::Px2856 => 2856,
        }
    }

    fn index(self) -> usize {
        match self {
            DetectorWidth::Px1920 => 0,
            DetectorWidth::Px2856 => 1,
        }
    }
}

impl fmt::Display for DetectorWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pixels())
    }
}

impl FromStr for DetectorWidth {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1920" => Ok(DetectorWidth::Px1920),
            "2856" => Ok(DetectorWidth::Px2856),
            _ => Err(ParseSettingError {
                kind: "detector width",
                value: s.to_string(),
                expected: "1920, 2856",
            }),
        }
    }
}

/// Row in the per-configuration calibration tables, which are laid out
/// binning-major: (1x,1920), (1x,2856), (2x,1920), ...
pub(crate) fn config_index(binning: Binning, detector: DetectorWidth) -> usize {
    binning.index() * DetectorWidth::ALL.len() + detector.index()
}

/// What the scan has to deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudyPurpose {
    Qualitative,
    Quantify,
    Classify,
}

impl StudyPurpose {
    pub const ALL: [StudyPurpose; 3] = [
        StudyPurpose::Qualitative,
        StudyPurpose::Quantify,
        StudyPurpose::Classify,
    ];

    /// Voxels needed across the smallest feature of interest.
    pub fn voxel_multiplier(self) -> i64 {
        match self {
            StudyPurpose::Qualitative => 3,
            StudyPurpose::Quantify => 5,
            StudyPurpose::Classify => 7,
        }
    }
}

impl fmt::Display for StudyPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StudyPurpose::Qualitative => "Qualitative",
            StudyPurpose::Quantify => "Quantify",
            StudyPurpose::Classify => "Classify",
        };
        f.write_str(s)
    }
}

impl FromStr for StudyPurpose {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qualitative" => Ok(StudyPurpose::Qualitative),
            "quantify" => Ok(StudyPurpose::Quantify),
            "classify" => Ok(StudyPurpose::Classify),
            _ => Err(ParseSettingError {
                kind: "study purpose",
                value: s.to_string(),
                expected: "Qualitative, Quantify, Classify",
            }),
        }
    }
}

/// How the pre-hardening filter thickness is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterPolicy {
    #[serde(rename = "No Filter", alias = "None")]
    NoFilter,
    Fast,
    Ideal,
}

impl FilterPolicy {
    pub const ALL: [FilterPolicy; 3] = [FilterPolicy::NoFilter, FilterPolicy::Fast, FilterPolicy::Ideal];
}

impl fmt::Display for FilterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterPolicy::NoFilter => "No Filter",
            FilterPolicy::Fast => "Fast",
            FilterPolicy::Ideal => "Ideal",
        };
        f.write_str(s)
    }
}

impl FromStr for FilterPolicy {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no filter" | "none" | "no-filter" => Ok(FilterPolicy::NoFilter),
            "fast" => Ok(FilterPolicy::Fast),
            "ideal" => Ok(FilterPolicy::Ideal),
            _ => Err(ParseSettingError {
                kind: "filter policy",
                value: s.to_string(),
                expected: "No Filter, Fast, Ideal",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_round_trip() {
        for b in Binning::ALL {
            assert_eq!(b.to_string().parse::<Binning>().unwrap(), b);
        }
        for d in DetectorWidth::ALL {
            assert_eq!(d.to_string().parse::<DetectorWidth>().unwrap(), d);
        }
        for p in StudyPurpose::ALL {
            assert_eq!(p.to_string().parse::<StudyPurpose>().unwrap(), p);
        }
        for f in FilterPolicy::ALL {
            assert_eq!(f.to_string().parse::<FilterPolicy>().unwrap(), f);
        }
    }

    #[test]
    fn lenient_spellings() {
        assert_eq!("2".parse::<Binning>().unwrap(), Binning::X2);
        assert_eq!("none".parse::<FilterPolicy>().unwrap(), FilterPolicy::NoFilter);
        assert_eq!("CLASSIFY".parse::<StudyPurpose>().unwrap(), StudyPurpose::Classify);
    }

    #[test]
    fn rejects_unknown_values() {
        let err = "4x".parse::<Binning>().unwrap_err();
        assert_eq!(err.kind, "binning");
        assert!("1024".parse::<DetectorWidth>().is_err());
    }

    #[test]
    fn config_index_covers_table() {
        let mut seen = Vec::new();
        for b in Binning::ALL {
            for d in DetectorWidth::ALL {
                seen.push(config_index(b, d));
            }
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    }
}
