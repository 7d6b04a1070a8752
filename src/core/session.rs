//! Queue session state machine.
//!
//! A session starts `Closed`. `start` publishes the queue message and moves it
//! to `Open`; there is no way back. Every successful mutation is followed by
//! exactly one render-and-publish, which fetches the message first and only
//! then renders the store, so the edit always carries the snapshot that is
//! current when it is sent.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::{DisplaySettings, Settings};
use crate::transport::{ChatTransport, MessageContent, MessageHandle};

use super::auth::is_admin;
use super::clock::Clock;
use super::error::QueueError;
use super::render::render;
use super::store::{Member, QueueStore};
use super::time::{self, TimeUnit};

pub type Result<T> = std::result::Result<T, QueueError>;

/// Lifecycle state. The message handle exists only while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Open { message: MessageHandle },
}

/// The single queue plus its rendered message.
pub struct QueueSession {
    store: QueueStore,
    state: SessionState,
    clock: Arc<dyn Clock>,
    admin_roles: HashSet<String>,
    display: DisplaySettings,
    use_rich_rendering: bool,
}

impl QueueSession {
    pub fn new(settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: QueueStore::new(),
            state: SessionState::Closed,
            clock,
            admin_roles: settings.admin_role_set(),
            display: settings.display.clone(),
            use_rich_rendering: settings.use_rich_rendering,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open { .. })
    }

    pub fn snapshot(&self) -> &[Member] {
        self.store.snapshot()
    }

    /// Open the queue and publish its message in `channel_id`.
    pub async fn start(
        &mut self,
        transport: &dyn ChatTransport,
        channel_id: i64,
    ) -> Result<MessageHandle> {
        if self.is_open() {
            tracing::info!(
                "Queue start requested in channel {} but one already exists",
                channel_id
            );
            return Err(QueueError::AlreadyOpen);
        }

        let handle = transport
            .publish_message(channel_id, self.render_content())
            .await
            .map_err(|e| {
                tracing::warn!("Failed to publish queue message via {}: {}", transport.name(), e);
                QueueError::transport(e)
            })?;

        self.state = SessionState::Open { message: handle };
        tracing::info!(
            "Queue opened in channel {} (message {})",
            handle.channel_id,
            handle.message_id
        );
        Ok(handle)
    }

    /// Add the caller to the end of the queue.
    pub async fn join(
        &mut self,
        transport: &dyn ChatTransport,
        display_name: &str,
        member_id: &str,
    ) -> Result<()> {
        self.ensure_open()?;
        self.add_member(display_name, member_id)?;
        self.publish(transport).await
    }

    /// Remove the caller from the queue.
    pub async fn leave(&mut self, transport: &dyn ChatTransport, member_id: &str) -> Result<()> {
        self.ensure_open()?;
        self.remove_member(member_id)?;
        self.publish(transport).await
    }

    /// Check that the queue is open and the actor holds an admin role.
    pub fn authorize(&self, actor_roles: &HashSet<String>) -> Result<()> {
        self.ensure_open()?;
        if !is_admin(actor_roles, &self.admin_roles) {
            tracing::info!("Refused admin action for roles {:?}", actor_roles);
            return Err(QueueError::NotAuthorized);
        }
        Ok(())
    }

    /// Add another user on an admin's behalf.
    pub async fn admin_add(
        &mut self,
        transport: &dyn ChatTransport,
        actor_roles: &HashSet<String>,
        display_name: &str,
        member_id: &str,
    ) -> Result<()> {
        self.authorize(actor_roles)?;
        self.add_member(display_name, member_id)?;
        self.publish(transport).await
    }

    /// Remove another user on an admin's behalf.
    pub async fn admin_remove(
        &mut self,
        transport: &dyn ChatTransport,
        actor_roles: &HashSet<String>,
        member_id: &str,
    ) -> Result<()> {
        self.authorize(actor_roles)?;
        self.remove_member(member_id)?;
        self.publish(transport).await
    }

    /// How long `member_id` has been waiting.
    pub fn query_time(&self, member_id: &str, unit: TimeUnit) -> Result<String> {
        self.ensure_open()?;
        let member = self.store.find(member_id).ok_or(QueueError::NotQueued)?;
        Ok(time::elapsed(member, self.clock.now(), unit))
    }

    pub fn move_up(&mut self, _member_id: &str) -> Result<()> {
        Err(QueueError::NotImplemented("Moving up in the queue"))
    }

    pub fn move_down(&mut self, _member_id: &str) -> Result<()> {
        Err(QueueError::NotImplemented("Moving down in the queue"))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(QueueError::QueueNotOpen)
        }
    }

    fn add_member(&mut self, display_name: &str, member_id: &str) -> Result<()> {
        if !self.store.add(display_name, member_id, self.clock.now()) {
            return Err(QueueError::DuplicateMember);
        }
        tracing::info!("{} ({}) joined the queue", display_name, member_id);
        Ok(())
    }

    fn remove_member(&mut self, member_id: &str) -> Result<()> {
        if !self.store.remove(member_id) {
            return Err(QueueError::NotQueued);
        }
        tracing::info!("{} left the queue", member_id);
        Ok(())
    }

    fn render_content(&self) -> MessageContent {
        let body = render(
            self.store.snapshot(),
            &self.display.queue_title,
            self.use_rich_rendering,
        );
        self.display.queue_message(body, self.use_rich_rendering)
    }

    /// Bring the published message back in line with the store.
    async fn publish(&self, transport: &dyn ChatTransport) -> Result<()> {
        let SessionState::Open { message } = self.state else {
            return Err(QueueError::QueueNotOpen);
        };

        let editable = transport.fetch_message(message).await.map_err(|e| {
            tracing::warn!("Failed to fetch queue message {}: {}", message.message_id, e);
            QueueError::transport(e)
        })?;

        // Rendered after the fetch returns, never before.
        let content = self.render_content();

        transport.edit_message(editable, content).await.map_err(|e| {
            tracing::warn!("Failed to update queue message {}: {}", message.message_id, e);
            QueueError::transport(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::transport::testing::RecordingTransport;
    use chrono::{Duration, Utc};

    const CHANNEL: i64 = -100;

    fn plain_settings() -> Settings {
        Settings {
            use_rich_rendering: false,
            admin_roles: vec!["administrator".to_string()],
            ..Settings::default()
        }
    }

    fn session_with_clock(settings: &Settings) -> (QueueSession, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (QueueSession::new(settings, clock.clone()), clock)
    }

    fn roles(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn names(session: &QueueSession) -> Vec<String> {
        session
            .snapshot()
            .iter()
            .map(|m| m.display_name.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_operations_require_open_session() {
        let transport = RecordingTransport::new();
        let (mut session, _) = session_with_clock(&plain_settings());

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(
            session.join(&transport, "A", "1").await,
            Err(QueueError::QueueNotOpen)
        );
        assert_eq!(session.leave(&transport, "1").await, Err(QueueError::QueueNotOpen));
        assert_eq!(
            session.query_time("1", TimeUnit::Minutes),
            Err(QueueError::QueueNotOpen)
        );
        assert_eq!(
            session
                .admin_add(&transport, &roles(&["administrator"]), "A", "1")
                .await,
            Err(QueueError::QueueNotOpen)
        );
        assert!(session.snapshot().is_empty());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_start_twice_publishes_once() {
        let transport = RecordingTransport::new();
        let (mut session, _) = session_with_clock(&plain_settings());

        let handle = session.start(&transport, CHANNEL).await.unwrap();
        assert_eq!(handle.channel_id, CHANNEL);
        assert_eq!(session.state(), SessionState::Open { message: handle });

        assert_eq!(
            session.start(&transport, CHANNEL).await,
            Err(QueueError::AlreadyOpen)
        );
        assert_eq!(transport.published_texts(), vec!["Queue".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_start_stays_closed() {
        let transport = RecordingTransport::new();
        transport.set_fail_publish(true);
        let (mut session, _) = session_with_clock(&plain_settings());

        assert!(matches!(
            session.start(&transport, CHANNEL).await,
            Err(QueueError::Transport(_))
        ));
        assert!(!session.is_open());

        transport.set_fail_publish(false);
        assert!(session.start(&transport, CHANNEL).await.is_ok());
    }

    #[tokio::test]
    async fn test_join_leave_scenario_renders_latest() {
        let transport = RecordingTransport::new();
        let (mut session, _) = session_with_clock(&plain_settings());

        session.start(&transport, CHANNEL).await.unwrap();
        session.join(&transport, "A", "1").await.unwrap();
        session.join(&transport, "B", "2").await.unwrap();
        session.leave(&transport, "1").await.unwrap();

        assert_eq!(names(&session), vec!["B"]);
        assert_eq!(transport.edits().len(), 3);
        assert_eq!(transport.last_edit_text().unwrap(), "Queue\nB");
    }

    #[tokio::test]
    async fn test_rich_rendering_lists_names_only() {
        let transport = RecordingTransport::new();
        let settings = Settings::default();
        let (mut session, _) = session_with_clock(&settings);

        session.start(&transport, CHANNEL).await.unwrap();
        session.join(&transport, "A", "1").await.unwrap();
        session.join(&transport, "B", "2").await.unwrap();

        assert_eq!(transport.published_texts(), vec![String::new()]);
        assert_eq!(transport.last_edit_text().unwrap(), "A\nB");
    }

    #[tokio::test]
    async fn test_duplicate_join_does_not_publish() {
        let transport = RecordingTransport::new();
        let (mut session, _) = session_with_clock(&plain_settings());

        session.start(&transport, CHANNEL).await.unwrap();
        session.join(&transport, "A", "1").await.unwrap();
        assert_eq!(
            session.join(&transport, "A", "1").await,
            Err(QueueError::DuplicateMember)
        );

        assert_eq!(session.snapshot().len(), 1);
        assert_eq!(transport.edits().len(), 1);
    }

    #[tokio::test]
    async fn test_leave_when_absent() {
        let transport = RecordingTransport::new();
        let (mut session, _) = session_with_clock(&plain_settings());

        session.start(&transport, CHANNEL).await.unwrap();
        session.join(&transport, "A", "1").await.unwrap();
        assert_eq!(session.leave(&transport, "2").await, Err(QueueError::NotQueued));

        assert_eq!(names(&session), vec!["A"]);
        assert_eq!(transport.edits().len(), 1);
    }

    #[tokio::test]
    async fn test_admin_actions_require_admin_role() {
        let transport = RecordingTransport::new();
        let (mut session, _) = session_with_clock(&plain_settings());
        session.start(&transport, CHANNEL).await.unwrap();

        assert_eq!(
            session
                .admin_add(&transport, &roles(&["member"]), "C", "3")
                .await,
            Err(QueueError::NotAuthorized)
        );
        assert!(session.snapshot().is_empty());
        assert!(transport.edits().is_empty());

        let admin = roles(&["member", "administrator"]);
        session.admin_add(&transport, &admin, "C", "3").await.unwrap();
        assert_eq!(names(&session), vec!["C"]);

        assert_eq!(
            session.admin_remove(&transport, &roles(&[]), "3").await,
            Err(QueueError::NotAuthorized)
        );
        session.admin_remove(&transport, &admin, "3").await.unwrap();
        assert!(session.snapshot().is_empty());
        assert_eq!(
            session.admin_remove(&transport, &admin, "3").await,
            Err(QueueError::NotQueued)
        );
    }

    #[tokio::test]
    async fn test_admin_add_existing_member_leaves_render_unchanged() {
        let transport = RecordingTransport::new();
        let (mut session, _) = session_with_clock(&plain_settings());
        session.start(&transport, CHANNEL).await.unwrap();
        session.join(&transport, "C", "3").await.unwrap();
        let before = transport.calls();

        assert_eq!(
            session
                .admin_add(&transport, &roles(&["administrator"]), "C", "3")
                .await,
            Err(QueueError::DuplicateMember)
        );
        assert_eq!(transport.calls(), before);
    }

    #[tokio::test]
    async fn test_query_time() {
        let transport = RecordingTransport::new();
        let (mut session, clock) = session_with_clock(&plain_settings());
        session.start(&transport, CHANNEL).await.unwrap();
        session.join(&transport, "A", "1").await.unwrap();

        assert_eq!(
            session.query_time("1", TimeUnit::Minutes).unwrap(),
            "0 minute(s)"
        );

        clock.advance(Duration::seconds(90));
        assert_eq!(
            session.query_time("1", TimeUnit::Minutes).unwrap(),
            "2 minute(s)"
        );
        assert_eq!(session.query_time("1", TimeUnit::Hours).unwrap(), "0 hour(s)");
        assert_eq!(
            session.query_time("2", TimeUnit::Minutes),
            Err(QueueError::NotQueued)
        );
    }

    #[tokio::test]
    async fn test_edit_failure_keeps_committed_state() {
        let transport = RecordingTransport::new();
        let (mut session, _) = session_with_clock(&plain_settings());
        session.start(&transport, CHANNEL).await.unwrap();

        transport.set_fail_edits(true);
        assert!(matches!(
            session.join(&transport, "A", "1").await,
            Err(QueueError::Transport(_))
        ));
        assert_eq!(names(&session), vec!["A"]);

        // Next successful publish catches the message up
        transport.set_fail_edits(false);
        session.join(&transport, "B", "2").await.unwrap();
        assert_eq!(transport.last_edit_text().unwrap(), "Queue\nA\nB");
    }

    #[tokio::test]
    async fn test_resync_to_text_already_shown() {
        let transport = RecordingTransport::new();
        let (mut session, _) = session_with_clock(&plain_settings());
        session.start(&transport, CHANNEL).await.unwrap();
        session.join(&transport, "A", "1").await.unwrap();

        transport.set_fail_edits(true);
        assert!(session.join(&transport, "B", "2").await.is_err());
        transport.set_fail_edits(false);

        // The chat still shows "Queue\nA"; re-rendering the same text is a success
        session.leave(&transport, "2").await.unwrap();
        assert_eq!(names(&session), vec!["A"]);
        assert_eq!(transport.last_edit_text().unwrap(), "Queue\nA");
    }

    #[test]
    fn test_reordering_is_not_implemented() {
        let (mut session, _) = session_with_clock(&plain_settings());
        assert!(matches!(
            session.move_up("1"),
            Err(QueueError::NotImplemented(_))
        ));
        assert!(matches!(
            session.move_down("1"),
            Err(QueueError::NotImplemented(_))
        ));
    }
}
