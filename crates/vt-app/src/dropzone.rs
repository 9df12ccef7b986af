use std::path::PathBuf;
use vt_core::ImageRole;
use crate::ui::UiEvent;

/// Drop target for one image role.
///
/// A drop becomes the same [`UiEvent::FileSelected`] the file picker sends,
/// so dropped and picked files go through identical intake.
#[derive(Debug, Clone)]
pub struct DropZone {
    role: ImageRole,
    active: bool,
}

impl DropZone {
    pub fn new(role: ImageRole) -> Self {
        Self { role, active: false }
    }

    pub fn role(&self) -> ImageRole {
        self.role
    }

    /// Highlight while files hover over the zone. Cosmetic only.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn drag_enter(&mut self) {
        self.active = true;
    }

    pub fn drag_leave(&mut self) {
        self.active = false;
    }

    /// Feeds the per-frame hover state, firing enter/leave on edges.
    pub fn track_hover(&mut self, hovering: bool) {
        match (hovering, self.active) {
            (true, false) => self.drag_enter(),
            (false, true) => self.drag_leave(),
            _ => {}
        }
    }

    pub fn drop_files(&mut self, files: &[PathBuf]) -> Option<UiEvent> {
        self.active = false;
        let first = files.first()?;

        Some(UiEvent::FileSelected {
            role: self.role,
            paths: vec![first.clone()],
        })
    }

    /// Event for a file chosen in the native picker.
    pub fn pick(&self, path: PathBuf) -> UiEvent {
        UiEvent::FileSelected {
            role: self.role,
            paths: vec![path],
        }
    }
}

/// Which zone receives a drop.
///
/// The zone under the pointer wins. Without a pointer position the first
/// role that has no file yet takes it; if both have files the drop is ignored.
pub fn drop_target(
    pointer_over: Option<ImageRole>,
    pointer_known: bool,
    selected: impl Fn(ImageRole) -> bool,
) -> Option<ImageRole> {
    if pointer_known {
        return pointer_over;
    }
    ImageRole::all().into_iter().find(|role| !selected(*role))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_toggles_highlight() {
        let mut zone = DropZone::new(ImageRole::Person);
        zone.track_hover(true);
        assert!(zone.is_active());
        zone.track_hover(true);
        assert!(zone.is_active());
        zone.track_hover(false);
        assert!(!zone.is_active());
    }

    #[test]
    fn test_drop_forwards_first_file_only() {
        let mut zone = DropZone::new(ImageRole::Garment);
        zone.drag_enter();

        let event = zone.drop_files(&[PathBuf::from("a.png"), PathBuf::from("b.png")]);
        match event {
            Some(UiEvent::FileSelected { role, paths }) => {
                assert_eq!(role, ImageRole::Garment);
                assert_eq!(paths, vec![PathBuf::from("a.png")]);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(!zone.is_active());
    }

    #[test]
    fn test_empty_drop_is_ignored() {
        let mut zone = DropZone::new(ImageRole::Person);
        zone.drag_enter();
        assert!(zone.drop_files(&[]).is_none());
        assert!(!zone.is_active());
    }

    #[test]
    fn test_drop_and_pick_produce_same_event() {
        let mut zone = DropZone::new(ImageRole::Person);
        let dropped = zone.drop_files(&[PathBuf::from("me.jpg")]).unwrap();
        let picked = zone.pick(PathBuf::from("me.jpg"));
        assert_eq!(format!("{:?}", dropped), format!("{:?}", picked));
    }

    #[test]
    fn test_drop_target() {
        assert_eq!(drop_target(Some(ImageRole::Garment), true, |_| false), Some(ImageRole::Garment));
        assert_eq!(drop_target(None, true, |_| false), None);
        assert_eq!(
            drop_target(None, false, |role| role == ImageRole::Person),
            Some(ImageRole::Garment)
        );
        assert_eq!(drop_target(None, false, |_| true), None);
    }
}
