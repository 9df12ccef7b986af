use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::{debug, info, warn};
use uuid::Uuid;
use vt_core::{ImageFile, ImageRole};
use crate::error::AppError;
use crate::storage::LocalStore;

/// What the user has picked so far.
///
/// Preview references can outlive the files: after a restart only the
/// previews come back, and generation stays disabled until both files are
/// picked again.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    person_file: Option<ImageFile>,
    garment_file: Option<ImageFile>,
    person_preview: Option<PathBuf>,
    garment_preview: Option<PathBuf>,
}

impl SelectionState {
    pub fn file(&self, role: ImageRole) -> Option<&ImageFile> {
        match role {
            ImageRole::Person => self.person_file.as_ref(),
            ImageRole::Garment => self.garment_file.as_ref(),
        }
    }

    pub fn preview(&self, role: ImageRole) -> Option<&Path> {
        match role {
            ImageRole::Person => self.person_preview.as_deref(),
            ImageRole::Garment => self.garment_preview.as_deref(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.person_file.is_some() && self.garment_file.is_some()
    }

    pub fn ready_files(&self) -> Option<(ImageFile, ImageFile)> {
        Some((self.person_file.clone()?, self.garment_file.clone()?))
    }

    fn set_file(&mut self, role: ImageRole, file: ImageFile) {
        match role {
            ImageRole::Person => self.person_file = Some(file),
            ImageRole::Garment => self.garment_file = Some(file),
        }
    }

    fn set_preview(&mut self, role: ImageRole, preview: PathBuf) -> Option<PathBuf> {
        match role {
            ImageRole::Person => self.person_preview.replace(preview),
            ImageRole::Garment => self.garment_preview.replace(preview),
        }
    }
}

/// Sole writer of [`SelectionState`].
pub struct FileIntake {
    store: Arc<LocalStore>,
    previews_dir: PathBuf,
    selection: SelectionState,
}

impl FileIntake {
    /// Restores the preview references kept in local storage.
    pub fn new(store: Arc<LocalStore>, previews_dir: impl Into<PathBuf>) -> Self {
        let mut selection = SelectionState::default();

        for role in ImageRole::all() {
            if let Some(preview) = store.get(role.storage_key()) {
                debug!("Rehydrated {} preview {}", role.slug(), preview);
                selection.set_preview(role, PathBuf::from(preview));
            }
        }

        Self {
            store,
            previews_dir: previews_dir.into(),
            selection,
        }
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Takes the first of `files` for `role`. An empty list does nothing.
    pub fn on_file_selected(&mut self, role: ImageRole, files: &[PathBuf]) -> Result<Option<PathBuf>, AppError> {
        let Some(path) = files.first() else {
            return Ok(None);
        };

        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| role.slug().to_string());
        let file = ImageFile::new(file_name, bytes);

        info!("Selected {} image {} ({} bytes)", role.slug(), path.display(), file.len());

        let preview = match self.write_preview(role, &file) {
            Ok(preview) => preview,
            Err(e) => {
                warn!("Could not keep a preview copy for {}: {}", role.slug(), e);
                path.clone()
            }
        };

        self.store
            .set(role.storage_key(), &preview.to_string_lossy());
        self.selection.set_file(role, file);
        if let Some(old) = self.selection.set_preview(role, preview.clone()) {
            self.discard_preview(&old, &preview);
        }

        Ok(Some(preview))
    }

    fn write_preview(&self, role: ImageRole, file: &ImageFile) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.previews_dir)?;

        let mut name = format!("{}-{}", role.slug(), Uuid::new_v4());
        if let Some(ext) = file.extension() {
            name.push('.');
            name.push_str(&ext);
        }

        let preview = self.previews_dir.join(name);
        std::fs::write(&preview, &file.bytes)?;
        Ok(preview)
    }

    /// Only copies we made ourselves are removed.
    fn discard_preview(&self, old: &Path, current: &Path) {
        if old == current || !old.starts_with(&self.previews_dir) {
            return;
        }
        if let Err(e) = std::fs::remove_file(old) {
            debug!("Could not remove old preview {}: {}", old.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::scratch_dir;

    fn write_image(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let dir = scratch_dir("intake");
        let store = Arc::new(LocalStore::open(dir.join("store.json")));
        let mut intake = FileIntake::new(store.clone(), dir.join("previews"));

        assert!(intake.on_file_selected(ImageRole::Person, &[]).unwrap().is_none());
        assert!(intake.selection().file(ImageRole::Person).is_none());
        assert_eq!(store.get(ImageRole::Person.storage_key()), None);
    }

    #[test]
    fn test_selection_stores_preview() {
        let dir = scratch_dir("intake");
        let store = Arc::new(LocalStore::open(dir.join("store.json")));
        let mut intake = FileIntake::new(store.clone(), dir.join("previews"));
        let person = write_image(&dir, "me.png", b"person-bytes");

        let preview = intake
            .on_file_selected(ImageRole::Person, &[person])
            .unwrap()
            .unwrap();

        assert_eq!(std::fs::read(&preview).unwrap(), b"person-bytes");
        assert_eq!(preview.extension().unwrap(), "png");
        assert_eq!(
            store.get(ImageRole::Person.storage_key()),
            Some(preview.to_string_lossy().to_string())
        );
        let file = intake.selection().file(ImageRole::Person).unwrap();
        assert_eq!(file.file_name, "me.png");
        assert!(!intake.selection().is_ready());
    }

    #[test]
    fn test_only_first_file_is_taken() {
        let dir = scratch_dir("intake");
        let store = Arc::new(LocalStore::open(dir.join("store.json")));
        let mut intake = FileIntake::new(store, dir.join("previews"));
        let first = write_image(&dir, "first.jpg", b"1");
        let second = write_image(&dir, "second.jpg", b"2");

        intake.on_file_selected(ImageRole::Garment, &[first, second]).unwrap();
        assert_eq!(intake.selection().file(ImageRole::Garment).unwrap().file_name, "first.jpg");
    }

    #[test]
    fn test_reselect_replaces_preview_copy() {
        let dir = scratch_dir("intake");
        let store = Arc::new(LocalStore::open(dir.join("store.json")));
        let mut intake = FileIntake::new(store, dir.join("previews"));
        let a = write_image(&dir, "a.png", b"a");
        let b = write_image(&dir, "b.png", b"b");

        let first = intake.on_file_selected(ImageRole::Person, &[a]).unwrap().unwrap();
        let second = intake.on_file_selected(ImageRole::Person, &[b]).unwrap().unwrap();
        assert_ne!(first, second);
        assert!(!first.exists());
        assert!(second.exists());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = scratch_dir("intake");
        let store = Arc::new(LocalStore::open(dir.join("store.json")));
        let mut intake = FileIntake::new(store, dir.join("previews"));

        let result = intake.on_file_selected(ImageRole::Person, &[dir.join("nope.png")]);
        assert!(matches!(result, Err(AppError::Io(_))));
        assert!(intake.selection().preview(ImageRole::Person).is_none());
    }

    #[test]
    fn test_restart_restores_previews_but_not_files() {
        let dir = scratch_dir("intake");
        let store_path = dir.join("store.json");
        {
            let store = Arc::new(LocalStore::open(&store_path));
            let mut intake = FileIntake::new(store, dir.join("previews"));
            let person = write_image(&dir, "me.png", b"p");
            let garment = write_image(&dir, "shirt.png", b"g");
            intake.on_file_selected(ImageRole::Person, &[person]).unwrap();
            intake.on_file_selected(ImageRole::Garment, &[garment]).unwrap();
            assert!(intake.selection().is_ready());
        }

        let store = Arc::new(LocalStore::open(&store_path));
        let intake = FileIntake::new(store, dir.join("previews"));
        let selection = intake.selection();

        for role in ImageRole::all() {
            let preview = selection.preview(role).unwrap();
            assert!(preview.exists());
            assert!(selection.file(role).is_none());
        }
        assert!(!selection.is_ready());
        assert!(selection.ready_files().is_none());
    }
}
