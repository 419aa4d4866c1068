//! OSC message mapping — converts OSC addresses and arguments to ControlEvents.

use rosc::{OscMessage, OscType};
use serde::{Deserialize, Serialize};

use crate::control::ControlEvent;

/// What an OSC message maps to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum OscTarget {
    /// Replace the expression (expects a string arg).
    Eval,
    /// Set master volume (expects a finite numeric arg, clamped to 0.0-1.0).
    Volume,
    /// Set the expression rate in ticks per second (expects a finite arg of at least 1).
    Rate,
    /// Restart `t` at zero.
    ResetTime,
}

/// A mapping from an OSC address to a target action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OscMapping {
    pub address_pattern: String,
    pub target: OscTarget,
}

/// Apply an OSC message against mappings to produce a ControlEvent.
///
/// Returns `None` for unmapped addresses and for messages whose arguments
/// don't fit the target.
pub fn apply_osc_message(msg: &OscMessage, mappings: &[OscMapping]) -> Option<ControlEvent> {
    let mapping = mappings
        .iter()
        .find(|m| osc_address_matches(&msg.addr, &m.address_pattern))?;

    match mapping.target {
        OscTarget::Eval => {
            let source = extract_string(&msg.args, 0)?;
            Some(ControlEvent::SetExpression(source))
        }
        OscTarget::Volume => {
            let volume = extract_float(&msg.args, 0)?;
            volume
                .is_finite()
                .then(|| ControlEvent::SetVolume(volume.clamp(0.0, 1.0)))
        }
        OscTarget::Rate => {
            let rate = extract_float(&msg.args, 0)?;
            (rate.is_finite() && rate >= 1.0).then(|| ControlEvent::SetRate(rate as u32))
        }
        OscTarget::ResetTime => Some(ControlEvent::ResetTime),
    }
}

/// Exact address match.
fn osc_address_matches(addr: &str, pattern: &str) -> bool {
    addr == pattern
}

/// Extract a float from OSC args at the given index.
fn extract_float(args: &[OscType], index: usize) -> Option<f32> {
    args.get(index).and_then(|arg| match arg {
        OscType::Float(f) => Some(*f),
        OscType::Double(d) => Some(*d as f32),
        OscType::Int(i) => Some(*i as f32),
        OscType::Long(l) => Some(*l as f32),
        _ => None,
    })
}

/// Extract a string from OSC args at the given index.
fn extract_string(args: &[OscType], index: usize) -> Option<String> {
    args.get(index).and_then(|arg| match arg {
        OscType::String(s) => Some(s.clone()),
        _ => None,
    })
}
