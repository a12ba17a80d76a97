use std::error::Error;

/// Shows the last reported error until it is dismissed.
pub struct ErrorModal {
    id: egui::Id,
    message: Option<String>,
}

impl ErrorModal {
    pub fn new(id: impl std::hash::Hash) -> Self {
        Self {
            id: egui::Id::new(id),
            message: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.message.is_some()
    }

    pub fn open(&mut self, err: &dyn Error) {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(&format!("\n{cause}"));
            source = cause.source();
        }

        tracing::error!("{message}");
        self.message = Some(message);
    }

    /// Runs `action` and opens the modal if it fails.
    pub fn handle_error<T, E: Error>(&mut self, action: impl FnOnce() -> Result<T, E>) -> Option<T> {
        match action() {
            Ok(value) => Some(value),
            Err(err) => {
                self.open(&err);
                None
            }
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let Some(message) = &self.message else {
            return;
        };

        let mut close = false;
        let modal = egui::Modal::new(self.id).show(ctx, |ui| {
            ui.heading("Error");
            ui.label(message);
            ui.add_space(8.0);
            close = ui.button("Ok").clicked();
        });

        if close || modal.should_close() {
            self.message = None;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::FileError;

    #[test]
    fn collects_the_error_chain() {
        let mut modal = ErrorModal::new("error");

        let value: Option<()> = modal.handle_error(|| {
            Err(FileError::Io {
                path: "missing.geojson".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        });

        assert!(value.is_none());
        assert!(modal.is_open());
        assert_eq!(
            modal.message.as_deref(),
            Some("failed to access \"missing.geojson\"\nnot found")
        );
    }
}
