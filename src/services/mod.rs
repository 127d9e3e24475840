use std::sync::Mutex;

pub mod entries;
pub mod session;
pub mod stats;

/// Loading flag plus last error message for one cache's in-flight request,
/// readable synchronously. Mirrors the reactive status every cache exposes.
#[derive(Debug, Default)]
pub(crate) struct RequestStatus {
    inner: Mutex<StatusInner>,
}

#[derive(Debug, Default)]
struct StatusInner {
    loading: bool,
    error: Option<String>,
}

impl RequestStatus {
    /// Mark a request as in flight and drop any stale error.
    pub(crate) fn begin(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.loading = true;
        inner.error = None;
    }

    pub(crate) fn succeed(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.loading = false;
        inner.error = None;
    }

    pub(crate) fn fail(&self, message: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.loading = false;
        inner.error = Some(message.into());
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.inner.lock().unwrap().loading
    }

    pub(crate) fn last_error(&self) -> Option<String> {
        self.inner.lock().unwrap().error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_clears_previous_error() {
        let status = RequestStatus::default();
        status.fail("Une erreur est survenue");
        assert_eq!(
            status.last_error().as_deref(),
            Some("Une erreur est survenue")
        );

        status.begin();
        assert!(status.is_loading());
        assert_eq!(status.last_error(), None);
    }

    #[test]
    fn test_fail_clears_loading() {
        let status = RequestStatus::default();
        status.begin();
        status.fail("Identifiants invalides");
        assert!(!status.is_loading());
        assert_eq!(status.last_error().as_deref(), Some("Identifiants invalides"));
    }
}
