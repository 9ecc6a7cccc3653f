use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::coords::Viewport;
use crate::tracking::{
    CameraTextureId, InstallStatus, SessionError, TrackingFrame, TrackingRuntime, TrackingSession,
};

/// Lifecycle state of the tracking session.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SessionState {
    Uninitialized,
    InstallPending,
    Created,
    Resumed,
    Paused,
    /// Terminal. Every operation is a no-op from here on.
    Closed,
}

/// Session manager shared between the lifecycle thread and the render thread.
pub type SharedSession = Arc<Mutex<SessionManager>>;

/// Locks a shared session.
///
/// A panic on another thread while holding the lock does not leave the session in a
/// torn state (each transition is a single assignment), so poisoning is ignored.
pub fn lock_session(session: &SharedSession) -> MutexGuard<'_, SessionManager> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the tracking-session handle and drives its lifecycle.
pub struct SessionManager {
    runtime: Box<dyn TrackingRuntime>,
    session: Option<Box<dyn TrackingSession>>,
    state: SessionState,

    install_requested: bool,
    display: Viewport,
    camera_texture: Option<CameraTextureId>,

    render_thread: Option<ThreadId>,
}

impl SessionManager {
    pub fn new(runtime: Box<dyn TrackingRuntime>) -> Self {
        Self {
            runtime,
            session: None,
            state: SessionState::Uninitialized,
            install_requested: false,
            display: Viewport::default(),
            camera_texture: None,
            render_thread: None,
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a backend session handle currently exists.
    #[inline]
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    #[inline]
    pub fn display_geometry(&self) -> Viewport {
        self.display
    }

    #[inline]
    pub fn camera_texture(&self) -> Option<CameraTextureId> {
        self.camera_texture
    }

    /// Makes sure the tracking runtime is present.
    ///
    /// Starts an install when it is not (state becomes `InstallPending`). The user is
    /// prompted only on the first request. Idempotent once installed.
    pub fn ensure_installed(&mut self) -> Result<InstallStatus, SessionError> {
        match self.state {
            SessionState::Closed => {
                return Err(SessionError::InvalidState {
                    op: "ensure_installed",
                    state: self.state,
                });
            }
            SessionState::Created | SessionState::Resumed | SessionState::Paused => {
                return Ok(InstallStatus::Installed);
            }
            SessionState::Uninitialized | SessionState::InstallPending => {}
        }

        let prompt = !self.install_requested;
        match self.runtime.request_install(prompt)? {
            InstallStatus::Requested => {
                log::info!("tracking runtime install requested");
                self.install_requested = true;
                self.state = SessionState::InstallPending;
                Ok(InstallStatus::Requested)
            }
            InstallStatus::Installed => {
                if self.state == SessionState::InstallPending {
                    log::info!("tracking runtime installed");
                    self.state = SessionState::Uninitialized;
                }
                Ok(InstallStatus::Installed)
            }
        }
    }

    /// Creates the backend session (`Uninitialized → Created`).
    ///
    /// Returns `InstallationPending` while an install is in flight. Display geometry
    /// and the camera texture recorded so far are forwarded to the new session.
    pub fn create(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Closed => {
                return Err(SessionError::InvalidState { op: "create", state: self.state });
            }
            SessionState::Created | SessionState::Resumed | SessionState::Paused => {
                log::debug!("create: session already exists ({:?})", self.state);
                return Ok(());
            }
            SessionState::Uninitialized | SessionState::InstallPending => {}
        }

        if self.ensure_installed()? == InstallStatus::Requested {
            return Err(SessionError::InstallationPending);
        }

        let mut session = self.runtime.create_session().map_err(|e| {
            log::error!("failed to create tracking session: {e}");
            e
        })?;

        if self.display.is_valid() {
            session.set_display_geometry(self.display);
        }
        if let Some(texture) = self.camera_texture {
            session.set_camera_texture(texture);
        }

        self.session = Some(session);
        self.state = SessionState::Created;
        log::info!("tracking session created");
        Ok(())
    }

    /// Starts tracking (`Created | Paused → Resumed`).
    ///
    /// On failure the session is discarded and the state returns to `Uninitialized`
    /// so the caller can `create` a fresh one.
    pub fn resume(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Closed | SessionState::Resumed => return Ok(()),
            SessionState::Uninitialized | SessionState::InstallPending => {
                return Err(SessionError::InvalidState { op: "resume", state: self.state });
            }
            SessionState::Created | SessionState::Paused => {}
        }

        let Some(session) = self.session.as_mut() else {
            return Err(SessionError::InvalidState { op: "resume", state: self.state });
        };

        match session.resume() {
            Ok(()) => {
                self.state = SessionState::Resumed;
                log::info!("tracking session resumed");
                Ok(())
            }
            Err(e) => {
                log::error!("failed to resume tracking session, discarding it: {e}");
                self.discard_session();
                self.state = SessionState::Uninitialized;
                Err(e)
            }
        }
    }

    /// Stops tracking and releases the camera (`Resumed → Paused`).
    ///
    /// Call before the drawing surface stops being visible.
    pub fn pause(&mut self) {
        if self.state != SessionState::Resumed {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.pause();
        }
        self.state = SessionState::Paused;
        log::info!("tracking session paused");
    }

    /// Releases everything and enters the terminal `Closed` state.
    pub fn destroy(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.discard_session();
        self.state = SessionState::Closed;
        self.render_thread = None;
        log::info!("tracking session destroyed");
    }

    /// Records the display geometry and forwards it to the live session.
    pub fn set_display_geometry(&mut self, viewport: Viewport) {
        if self.state == SessionState::Closed {
            return;
        }
        self.display = viewport;
        if let Some(session) = self.session.as_mut() {
            session.set_display_geometry(viewport);
        }
    }

    /// Records the camera texture handle and forwards it to the live session.
    pub fn bind_camera_texture(&mut self, texture: CameraTextureId) {
        if self.state == SessionState::Closed {
            return;
        }
        self.camera_texture = Some(texture);
        if let Some(session) = self.session.as_mut() {
            session.set_camera_texture(texture);
        }
    }

    /// Advances the session by one frame. Valid only while `Resumed`.
    ///
    /// Render thread only: the first call records the calling thread and debug
    /// builds assert every later call comes from it.
    pub fn tick(&mut self) -> Result<Arc<dyn TrackingFrame>, SessionError> {
        let current = thread::current().id();
        let bound = *self.render_thread.get_or_insert(current);
        debug_assert_eq!(bound, current, "SessionManager::tick called off the render thread");

        if self.state != SessionState::Resumed {
            return Err(SessionError::InvalidState { op: "tick", state: self.state });
        }
        let Some(session) = self.session.as_mut() else {
            return Err(SessionError::InvalidState { op: "tick", state: self.state });
        };

        session.update().inspect_err(|e| {
            if e.is_transient() {
                log::warn!("tracking update skipped: {e}");
            }
        })
    }

    fn discard_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.discard_session();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Pose;
    use crate::tracking::{
        AnchorTracking, Camera, HitResult, Plane, PointCloud, TrackingState,
    };
    use std::collections::VecDeque;

    // ── fakes ─────────────────────────────────────────────────────────────

    #[derive(Debug, Default)]
    struct Log {
        calls: Vec<String>,
    }

    type SharedLog = Arc<Mutex<Log>>;

    fn record(log: &SharedLog, call: impl Into<String>) {
        log.lock().unwrap().calls.push(call.into());
    }

    struct IdleFrame;

    impl TrackingFrame for IdleFrame {
        fn camera(&self) -> Camera {
            Camera { pose: Pose::IDENTITY, tracking_state: TrackingState::Tracking, fov_y: 1.0 }
        }
        fn planes(&self) -> Vec<Plane> {
            Vec::new()
        }
        fn acquire_point_cloud(&self) -> Result<PointCloud, SessionError> {
            Ok(PointCloud::detached(Arc::from(Vec::new())))
        }
        fn hit_test(&self, _x: f32, _y: f32) -> Vec<HitResult> {
            Vec::new()
        }
        fn create_anchor(&self, _hit: &HitResult) -> Result<AnchorTracking, SessionError> {
            Err(SessionError::Backend("unused".into()))
        }
        fn display_geometry_changed(&self) -> bool {
            false
        }
    }

    struct FakeSession {
        log: SharedLog,
        resume_result: Result<(), SessionError>,
        updates: VecDeque<Result<(), SessionError>>,
    }

    impl TrackingSession for FakeSession {
        fn resume(&mut self) -> Result<(), SessionError> {
            record(&self.log, "resume");
            self.resume_result.clone()
        }
        fn pause(&mut self) {
            record(&self.log, "pause");
        }
        fn close(&mut self) {
            record(&self.log, "close");
        }
        fn set_display_geometry(&mut self, viewport: Viewport) {
            record(&self.log, format!("display {}x{}", viewport.width, viewport.height));
        }
        fn set_camera_texture(&mut self, texture: CameraTextureId) {
            record(&self.log, format!("texture {}", texture.0));
        }
        fn update(&mut self) -> Result<Arc<dyn TrackingFrame>, SessionError> {
            record(&self.log, "update");
            match self.updates.pop_front().unwrap_or(Ok(())) {
                Ok(()) => Ok(Arc::new(IdleFrame)),
                Err(e) => Err(e),
            }
        }
    }

    struct FakeRuntime {
        log: SharedLog,
        installs: VecDeque<Result<InstallStatus, SessionError>>,
        create_result: Result<(), SessionError>,
        resume_result: Result<(), SessionError>,
        updates: VecDeque<Result<(), SessionError>>,
    }

    impl FakeRuntime {
        fn new(log: SharedLog) -> Self {
            Self {
                log,
                installs: VecDeque::new(),
                create_result: Ok(()),
                resume_result: Ok(()),
                updates: VecDeque::new(),
            }
        }
    }

    impl TrackingRuntime for FakeRuntime {
        fn request_install(&mut self, user_prompt: bool) -> Result<InstallStatus, SessionError> {
            record(&self.log, format!("install prompt={user_prompt}"));
            self.installs.pop_front().unwrap_or(Ok(InstallStatus::Installed))
        }
        fn create_session(&mut self) -> Result<Box<dyn TrackingSession>, SessionError> {
            record(&self.log, "create_session");
            self.create_result.clone()?;
            Ok(Box::new(FakeSession {
                log: self.log.clone(),
                resume_result: self.resume_result.clone(),
                updates: std::mem::take(&mut self.updates),
            }))
        }
    }

    fn manager_with(configure: impl FnOnce(&mut FakeRuntime)) -> (SessionManager, SharedLog) {
        let log: SharedLog = Arc::default();
        let mut runtime = FakeRuntime::new(log.clone());
        configure(&mut runtime);
        (SessionManager::new(Box::new(runtime)), log)
    }

    fn calls(log: &SharedLog) -> Vec<String> {
        log.lock().unwrap().calls.clone()
    }

    // ── install / create ──────────────────────────────────────────────────

    #[test]
    fn install_request_moves_to_install_pending_without_session() {
        let (mut m, log) = manager_with(|r| {
            r.installs.push_back(Ok(InstallStatus::Requested));
        });
        assert_eq!(m.create(), Err(SessionError::InstallationPending));
        assert_eq!(m.state(), SessionState::InstallPending);
        assert!(!m.has_session());
        assert!(!calls(&log).contains(&"create_session".to_string()));
    }

    #[test]
    fn user_is_prompted_only_once() {
        let (mut m, log) = manager_with(|r| {
            r.installs.push_back(Ok(InstallStatus::Requested));
            r.installs.push_back(Ok(InstallStatus::Installed));
        });
        assert!(m.create().is_err());
        m.create().unwrap();
        assert_eq!(m.state(), SessionState::Created);
        let installs: Vec<_> = calls(&log).into_iter().filter(|c| c.starts_with("install")).collect();
        assert_eq!(installs, vec!["install prompt=true", "install prompt=false"]);
    }

    #[test]
    fn ensure_installed_is_idempotent_once_installed() {
        let (mut m, _log) = manager_with(|_| {});
        assert_eq!(m.ensure_installed(), Ok(InstallStatus::Installed));
        assert_eq!(m.ensure_installed(), Ok(InstallStatus::Installed));
        assert_eq!(m.state(), SessionState::Uninitialized);
    }

    #[test]
    fn incompatible_device_fails_create_and_stays_uninitialized() {
        let (mut m, _log) = manager_with(|r| r.create_result = Err(SessionError::DeviceIncompatible));
        let err = m.create().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(m.state(), SessionState::Uninitialized);
    }

    #[test]
    fn outdated_runtime_is_user_actionable() {
        let (mut m, _log) = manager_with(|r| r.create_result = Err(SessionError::RuntimeOutdated));
        let err = m.create().unwrap_err();
        assert!(err.is_user_actionable());
        assert!(!err.is_fatal());
    }

    #[test]
    fn create_forwards_recorded_geometry_and_texture() {
        let (mut m, log) = manager_with(|_| {});
        m.set_display_geometry(Viewport::new(480, 960));
        m.bind_camera_texture(CameraTextureId(3));
        m.create().unwrap();
        let c = calls(&log);
        assert!(c.contains(&"display 480x960".to_string()));
        assert!(c.contains(&"texture 3".to_string()));
    }

    // ── resume / pause / destroy ──────────────────────────────────────────

    #[test]
    fn full_lifecycle() {
        let (mut m, _log) = manager_with(|_| {});
        m.create().unwrap();
        m.resume().unwrap();
        assert_eq!(m.state(), SessionState::Resumed);
        m.pause();
        assert_eq!(m.state(), SessionState::Paused);
        m.resume().unwrap();
        assert_eq!(m.state(), SessionState::Resumed);
        m.destroy();
        assert_eq!(m.state(), SessionState::Closed);
        assert!(!m.has_session());
    }

    #[test]
    fn camera_unavailable_on_resume_discards_session() {
        let (mut m, log) = manager_with(|r| r.resume_result = Err(SessionError::CameraUnavailable));
        m.create().unwrap();
        assert_eq!(m.resume(), Err(SessionError::CameraUnavailable));
        assert_eq!(m.state(), SessionState::Uninitialized);
        assert!(!m.has_session());
        assert!(calls(&log).contains(&"close".to_string()));
    }

    #[test]
    fn resume_after_destroy_is_a_noop() {
        let (mut m, log) = manager_with(|_| {});
        m.create().unwrap();
        m.destroy();
        let before = calls(&log).len();
        assert_eq!(m.resume(), Ok(()));
        m.pause();
        m.destroy();
        assert_eq!(m.state(), SessionState::Closed);
        assert_eq!(calls(&log).len(), before);
    }

    #[test]
    fn create_after_destroy_does_not_reopen() {
        let (mut m, _log) = manager_with(|_| {});
        m.destroy();
        assert!(m.create().is_err());
        assert_eq!(m.state(), SessionState::Closed);
        assert!(!m.has_session());
    }

    #[test]
    fn resume_before_create_is_invalid() {
        let (mut m, _log) = manager_with(|_| {});
        assert!(matches!(m.resume(), Err(SessionError::InvalidState { op: "resume", .. })));
    }

    // ── tick ──────────────────────────────────────────────────────────────

    #[test]
    fn tick_requires_resumed() {
        let (mut m, _log) = manager_with(|_| {});
        m.create().unwrap();
        assert!(m.tick().is_err());
        m.resume().unwrap();
        assert!(m.tick().is_ok());
        m.pause();
        assert!(matches!(
            m.tick(),
            Err(SessionError::InvalidState { state: SessionState::Paused, .. })
        ));
    }

    #[test]
    fn transient_camera_error_keeps_session_resumed() {
        let (mut m, _log) = manager_with(|r| {
            r.updates.push_back(Err(SessionError::CameraUnavailable));
        });
        m.create().unwrap();
        m.resume().unwrap();
        assert_eq!(m.tick().err(), Some(SessionError::CameraUnavailable));
        assert_eq!(m.state(), SessionState::Resumed);
        assert!(m.tick().is_ok());
    }

    #[test]
    fn shared_session_serializes_lifecycle_and_tick() {
        let (m, _log) = manager_with(|_| {});
        let shared = m.into_shared();
        {
            let mut s = lock_session(&shared);
            s.create().unwrap();
            s.resume().unwrap();
        }
        let lifecycle = {
            let shared = shared.clone();
            std::thread::spawn(move || lock_session(&shared).pause())
        };
        lifecycle.join().unwrap();
        assert_eq!(lock_session(&shared).state(), SessionState::Paused);
    }
}
