//! Vibration feedback for game events

use crate::sim::{GameEvent, PlatformKind};

/// Vibration pattern (ms) for an event, `None` for events that stay silent
pub fn pattern_for(event: &GameEvent) -> Option<&'static [u32]> {
    match event {
        GameEvent::Landed {
            kind: PlatformKind::Bouncy,
        } => Some(&[12]),
        GameEvent::Landed { .. } | GameEvent::CountdownFinished => None,
        GameEvent::CoinCollected => Some(&[8]),
        GameEvent::BitCollected { .. } => Some(&[18]),
        GameEvent::WrongBit { .. } => Some(&[60, 40, 60]),
        GameEvent::Fell => Some(&[80]),
        GameEvent::Won => Some(&[30, 30, 30, 30, 90]),
    }
}

/// Vibrate for every event of the last tick that has a pattern
pub fn play(events: &[GameEvent], enabled: bool) {
    if !enabled {
        return;
    }
    // One vibration per frame; the strongest (last) event wins
    if let Some(pattern) = events.iter().rev().find_map(pattern_for) {
        vibrate(pattern);
    }
}

#[cfg(target_arch = "wasm32")]
fn vibrate(pattern: &[u32]) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let array = js_sys::Array::new();
    for ms in pattern {
        array.push(&wasm_bindgen::JsValue::from(*ms));
    }
    // Unsupported browsers (iOS Safari) simply return false
    let _ = window.navigator().vibrate_with_pattern(&array);
}

#[cfg(not(target_arch = "wasm32"))]
fn vibrate(pattern: &[u32]) {
    log::trace!("vibrate {:?}", pattern);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_bit_is_strongest() {
        let wrong = pattern_for(&GameEvent::WrongBit { got: 0, wanted: 1 }).unwrap();
        let coin = pattern_for(&GameEvent::CoinCollected).unwrap();
        assert!(wrong.iter().sum::<u32>() > coin.iter().sum::<u32>());
    }

    #[test]
    fn test_plain_landing_is_silent() {
        assert!(
            pattern_for(&GameEvent::Landed {
                kind: PlatformKind::Static
            })
            .is_none()
        );
        assert!(
            pattern_for(&GameEvent::Landed {
                kind: PlatformKind::Bouncy
            })
            .is_some()
        );
    }
}
