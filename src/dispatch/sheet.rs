//! Draggable bottom sheet: drag offset plus a minimized flag.

/// Downward drag (px) past which a released sheet minimizes.
pub const DEFAULT_DRAG_THRESHOLD_PX: f32 = 150.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DraggableSheet {
    threshold: f32,
    drag_origin: Option<f32>,
    offset: f32,
    minimized: bool,
}

impl Default for DraggableSheet {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD_PX)
    }
}

impl DraggableSheet {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            drag_origin: None,
            offset: 0.0,
            minimized: false,
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    pub fn drag_start(&mut self, y: f32) {
        self.drag_origin = Some(y);
        self.offset = 0.0;
    }

    /// Track the pointer; upward movement is clamped at zero.
    pub fn drag_move(&mut self, y: f32) {
        if let Some(origin) = self.drag_origin {
            self.offset = (y - origin).max(0.0);
        }
    }

    /// Release: snap to minimized past the threshold, otherwise spring back.
    pub fn drag_end(&mut self) -> bool {
        if self.drag_origin.take().is_some() && self.offset > self.threshold {
            self.minimized = true;
        }
        self.offset = 0.0;
        self.minimized
    }

    /// Tap on the handle of a minimized sheet.
    pub fn expand(&mut self) {
        self.minimized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(sheet: &mut DraggableSheet, distance: f32) -> bool {
        sheet.drag_start(100.0);
        sheet.drag_move(100.0 + distance / 2.0);
        sheet.drag_move(100.0 + distance);
        sheet.drag_end()
    }

    #[test]
    fn drag_past_threshold_minimizes() {
        let mut sheet = DraggableSheet::new(150.0);
        assert!(drag(&mut sheet, 160.0));
        assert!(sheet.is_minimized());
        assert_eq!(sheet.offset(), 0.0);
    }

    #[test]
    fn drag_at_or_below_threshold_springs_back() {
        let mut sheet = DraggableSheet::new(150.0);
        assert!(!drag(&mut sheet, 150.0));
        assert!(!drag(&mut sheet, 20.0));
        assert!(!sheet.is_minimized());
    }

    #[test]
    fn upward_drag_is_clamped() {
        let mut sheet = DraggableSheet::default();
        sheet.drag_start(300.0);
        sheet.drag_move(100.0);
        assert_eq!(sheet.offset(), 0.0);
        assert!(sheet.is_dragging());
        assert!(!sheet.drag_end());
    }

    #[test]
    fn expand_restores_minimized_sheet() {
        let mut sheet = DraggableSheet::new(150.0);
        drag(&mut sheet, 400.0);
        sheet.expand();
        assert!(!sheet.is_minimized());
    }

    #[test]
    fn move_without_start_is_ignored() {
        let mut sheet = DraggableSheet::new(150.0);
        sheet.drag_move(500.0);
        assert_eq!(sheet.offset(), 0.0);
        assert!(!sheet.drag_end());
    }
}
