use std::sync::{Arc, PoisonError, RwLock};

use crate::foundation::{
    core::Canvas,
    error::{StatwheelError, StatwheelResult},
};

/// Fully decoded portrait bitmap. Immutable once built; shared by reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Portrait {
    canvas: Canvas,
    rgba8_premul: Arc<Vec<u8>>,
}

impl Portrait {
    pub fn from_premul_rgba8(width: u32, height: u32, rgba8_premul: Vec<u8>) -> StatwheelResult<Self> {
        let canvas = Canvas::new(width, height)?;
        if rgba8_premul.len() != canvas.byte_len() {
            return Err(StatwheelError::validation(format!(
                "portrait byte length {} does not match {width}x{height}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            canvas,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }
}

/// Single-slot holder for the current portrait.
///
/// The upload side calls [`PortraitSlot::replace`] once a decode has finished; renders call
/// [`PortraitSlot::current`] and see either nothing or a complete portrait. When two decodes
/// overlap, whichever finishes last wins, even if it was requested first.
#[derive(Clone, Debug, Default)]
pub struct PortraitSlot {
    inner: Arc<RwLock<Option<Arc<Portrait>>>>,
}

impl PortraitSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `portrait`, returning the one it superseded.
    pub fn replace(&self, portrait: Portrait) -> Option<Arc<Portrait>> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(
            width = portrait.width(),
            height = portrait.height(),
            "portrait replaced"
        );
        guard.replace(Arc::new(portrait))
    }

    /// Drop the current portrait (e.g. the file picker was emptied).
    pub fn clear(&self) -> Option<Arc<Portrait>> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.take()
    }

    pub fn current(&self) -> Option<Arc<Portrait>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_present(&self) -> bool {
        self.current().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> Portrait {
        Portrait::from_premul_rgba8(w, h, px.repeat((w * h) as usize)).unwrap()
    }

    #[test]
    fn rejects_mismatched_buffers() {
        assert!(Portrait::from_premul_rgba8(2, 2, vec![0; 15]).is_err());
        assert!(Portrait::from_premul_rgba8(0, 2, vec![]).is_err());
    }

    #[test]
    fn slot_starts_absent_and_last_replace_wins() {
        let slot = PortraitSlot::new();
        assert!(slot.current().is_none());

        assert!(slot.replace(solid(1, 1, [255, 0, 0, 255])).is_none());
        let prev = slot.replace(solid(2, 1, [0, 255, 0, 255])).unwrap();
        assert_eq!(prev.width(), 1);
        assert_eq!(slot.current().unwrap().width(), 2);

        let handle = slot.clone();
        handle.clear();
        assert!(!slot.is_present());
    }

    #[test]
    fn readers_keep_their_snapshot_after_replacement() {
        let slot = PortraitSlot::new();
        slot.replace(solid(3, 3, [1, 2, 3, 255]));
        let held = slot.current().unwrap();
        slot.replace(solid(5, 5, [9, 9, 9, 255]));
        assert_eq!(held.width(), 3);
        assert_eq!(held.rgba8_premul()[0..4], [1, 2, 3, 255]);
    }
}
