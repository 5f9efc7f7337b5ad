//! Easing curves for entrance timelines.
//!
//! Names follow the `family.kind(arg)` form used in page configs, e.g.
//! `power3.out`, `back.out(1.7)`, `sine.inOut`, `linear`.

use anyhow::{Context, Result, anyhow};
use once_cell::sync::Lazy;
use regex::Regex;
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

const DEFAULT_BACK_OVERSHOOT: f32 = 1.70158;

static EASE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<family>[a-z]+[0-4]?)(?:\.(?P<kind>in|out|inout))?(?:\((?P<arg>[-+]?(?:\d+\.?\d*|\.\d+))\))?$")
        .expect("ease name pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EaseKind {
    In,
    Out,
    InOut,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ease {
    Linear,
    /// `power1` (quad) through `power4` (quint).
    Power { degree: u8, kind: EaseKind },
    Sine(EaseKind),
    Back { overshoot: f32, kind: EaseKind },
}

impl Default for Ease {
    fn default() -> Self {
        Ease::Power {
            degree: 3,
            kind: EaseKind::Out,
        }
    }
}

impl Ease {
    /// Map linear progress `t` in `[0, 1]` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Ease::Linear => t,
            Ease::Power { degree, kind } => power(t, i32::from(degree) + 1, kind),
            Ease::Sine(kind) => sine(t, kind),
            Ease::Back { overshoot, kind } => back(t, overshoot, kind),
        }
    }
}

fn power(t: f32, exponent: i32, kind: EaseKind) -> f32 {
    match kind {
        EaseKind::In => t.powi(exponent),
        EaseKind::Out => 1.0 - (1.0 - t).powi(exponent),
        EaseKind::InOut => {
            if t < 0.5 {
                (2.0 * t).powi(exponent) / 2.0
            } else {
                1.0 - (2.0 * (1.0 - t)).powi(exponent) / 2.0
            }
        }
    }
}

fn sine(t: f32, kind: EaseKind) -> f32 {
    match kind {
        EaseKind::In => 1.0 - (t * PI / 2.0).cos(),
        EaseKind::Out => (t * PI / 2.0).sin(),
        EaseKind::InOut => -((PI * t).cos() - 1.0) / 2.0,
    }
}

fn back(t: f32, s: f32, kind: EaseKind) -> f32 {
    let c3 = s + 1.0;
    match kind {
        EaseKind::In => c3 * t * t * t - s * t * t,
        EaseKind::Out => {
            let u = t - 1.0;
            1.0 + c3 * u * u * u + s * u * u
        }
        EaseKind::InOut => {
            let s2 = s * 1.525;
            if t < 0.5 {
                let u = 2.0 * t;
                (u * u * ((s2 + 1.0) * u - s2)) / 2.0
            } else {
                let u = 2.0 * t - 2.0;
                (u * u * ((s2 + 1.0) * u + s2) + 2.0) / 2.0
            }
        }
    }
}

impl FromStr for Ease {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let caps = EASE_NAME
            .captures(&normalized)
            .ok_or_else(|| anyhow!("unrecognized ease `{s}`"))?;

        let kind = match caps.name("kind").map(|m| m.as_str()) {
            None | Some("out") => EaseKind::Out,
            Some("in") => EaseKind::In,
            Some(_) => EaseKind::InOut,
        };
        let arg = caps
            .name("arg")
            .map(|m| m.as_str().parse::<f32>())
            .transpose()
            .with_context(|| format!("invalid ease argument in `{s}`"))?;

        let family = &caps["family"];
        let ease = match family {
            "linear" | "none" | "power0" => Ease::Linear,
            "power1" | "quad" => Ease::Power { degree: 1, kind },
            "power2" | "cubic" => Ease::Power { degree: 2, kind },
            "power3" | "quart" => Ease::Power { degree: 3, kind },
            "power4" | "quint" | "strong" => Ease::Power { degree: 4, kind },
            "sine" => Ease::Sine(kind),
            "back" => Ease::Back {
                overshoot: arg.unwrap_or(DEFAULT_BACK_OVERSHOOT),
                kind,
            },
            other => return Err(anyhow!("unknown ease family `{other}` in `{s}`")),
        };
        if arg.is_some() && !matches!(ease, Ease::Back { .. }) {
            return Err(anyhow!("ease `{s}` does not take an argument"));
        }
        Ok(ease)
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = |kind: &EaseKind| match kind {
            EaseKind::In => "in",
            EaseKind::Out => "out",
            EaseKind::InOut => "inOut",
        };
        match self {
            Ease::Linear => write!(f, "linear"),
            Ease::Power { degree, kind: k } => write!(f, "power{degree}.{}", kind(k)),
            Ease::Sine(k) => write!(f, "sine.{}", kind(k)),
            Ease::Back { overshoot, kind: k } => write!(f, "back.{}({overshoot})", kind(k)),
        }
    }
}

impl serde::Serialize for Ease {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Ease {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
