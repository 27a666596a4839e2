//! The booking conversation.
//!
//! Every entry point locks the user's session for the whole request,
//! applies one step of the state machine and returns the next screen.
//! User errors never escape as `Err`: they become a rendered reply and the
//! session stays where it was.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::OwnedMutexGuard;

use crate::clock::{self, Clock};
use crate::domain::{ErrorKind, ExternalId, NewTrip, Station, ValidationError};
use crate::schedule::ScheduleQuery;
use crate::session::{ConvState, Session, SessionStore};
use crate::stations::StationDirectory;
use crate::trips::{Profile, TripError, TripService};

use super::command::{Command, StationRef};
use super::render::{self, Leg, POPULAR_SHOWN};
use super::reply::{Button, Reply, ReplyMode};

/// Conversation controller shared by all request handlers.
#[derive(Clone)]
pub struct Controller {
    sessions: SessionStore,
    stations: Arc<StationDirectory>,
    query: ScheduleQuery,
    trips: TripService,
    clock: Clock,
}

impl Controller {
    pub fn new(
        sessions: SessionStore,
        stations: Arc<StationDirectory>,
        query: ScheduleQuery,
        trips: TripService,
    ) -> Self {
        Self {
            sessions,
            stations,
            query,
            trips,
            clock: clock::system(),
        }
    }

    /// Replace the clock (for tests).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn offset(&self) -> FixedOffset {
        self.query.offset()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// First contact: register the user and greet them.
    pub async fn welcome(&self, profile: &Profile) -> Reply {
        if let Err(e) = self.trips.ensure_user(profile).await {
            tracing::warn!(external_id = %profile.external_id, error = %e, "could not register user");
        }
        render::welcome(&profile.name)
    }

    pub fn help(&self) -> Reply {
        render::help()
    }

    /// Start a new booking, discarding any booking in progress.
    pub async fn new_trip(&self, profile: &Profile) -> Reply {
        if let Err(e) = self.trips.ensure_user(profile).await {
            tracing::warn!(external_id = %profile.external_id, error = %e, "could not register user");
        }

        let mut session = self.lock_session(profile.external_id).await;
        session.restart(self.now());

        tracing::debug!(user = %profile.external_id, "booking started");
        render::station_picker(&session, &self.stations, Leg::From)
    }

    /// Abandon the booking in progress. Valid in every state.
    pub async fn cancel(&self, user: ExternalId) -> Reply {
        let mut session = self.lock_session(user).await;
        self.clear(user, &mut session).await;
        render::cancelled()
    }

    /// The user's committed trips.
    pub async fn my_trips(&self, user: ExternalId) -> Reply {
        match self.trips.trips_for(user).await {
            Ok(trips) => render::trip_list(&trips, &self.stations, self.offset()),
            Err(e) => {
                tracing::warn!(%user, error = %e, "could not list trips");
                Reply::send("⚠️ Could not load your trips, please try again later.")
            }
        }
    }

    /// Free text typed by the user.
    pub async fn handle_text(&self, user: ExternalId, text: &str) -> Reply {
        let text = text.trim();
        if text == "/cancel" || text == "/cancel_" {
            return self.cancel(user).await;
        }

        let mut session = self.lock_session(user).await;

        match session.state() {
            ConvState::WaitingFrom => self.typed_origin(&mut session, text),
            ConvState::WaitingTo => self.typed_destination(&mut session, text).await,
            _ => render::not_started(),
        }
    }

    /// A raw button token. Undecodable tokens are answered inline and leave
    /// the session untouched.
    pub async fn handle_token(&self, user: ExternalId, token: &str) -> Reply {
        match Command::decode(token) {
            Ok(command) => self.handle_command(user, command).await,
            Err(e) => {
                tracing::debug!(%user, token, error = %e, "undecodable token");
                Reply::answer("Unknown command")
            }
        }
    }

    /// A decoded button press.
    pub async fn handle_command(&self, user: ExternalId, command: Command) -> Reply {
        let mut session = self.lock_session(user).await;
        let state = session.state();

        tracing::debug!(%user, ?command, state = state.as_str(), "command");

        match command {
            Command::Cancel => {
                self.clear(user, &mut session).await;
                return render::cancelled();
            }
            Command::Noop => return Reply::answer(""),
            _ if state == ConvState::Idle => {
                return Reply::answer("No trip in progress. Use /newtrip to start.");
            }
            _ => {}
        }

        match command {
            Command::Back => self.back(user, &mut session).await,
            Command::SelectStation(station) => self.select_station(&mut session, station).await,
            Command::SelectTrain(index) => self.select_train(user, &mut session, index).await,
            Command::SchedulePage(page) => self.show_page(&mut session, page),
            Command::EditFrom => {
                session.rewind_to(ConvState::SelectingFrom);
                render::station_picker(&session, &self.stations, Leg::From)
            }
            Command::EditTo => {
                if session.from.is_none() {
                    return Reply::answer("Choose the departure station first");
                }
                session.rewind_to(ConvState::SelectingTo);
                render::station_picker(&session, &self.stations, Leg::To)
            }
            Command::ManualEntry => match state {
                ConvState::SelectingFrom => {
                    session.transition(ConvState::WaitingFrom);
                    render::manual_prompt(Leg::From)
                }
                ConvState::SelectingTo => {
                    session.transition(ConvState::WaitingTo);
                    render::manual_prompt(Leg::To)
                }
                _ => Reply::answer("Not available right now"),
            },
            Command::Retry => {
                if !state.is_choosing_destination() || session.to.is_none() {
                    return Reply::answer("Nothing to retry");
                }
                self.search(&mut session).await
            }
            Command::Cancel | Command::Noop => Reply::answer(""),
        }
    }

    /// Lock the user's live session.
    ///
    /// A request that fetched the handle before a concurrent `clear`
    /// removed it would otherwise work on a detached session, so the handle
    /// is checked against the store once the lock is held.
    async fn lock_session(&self, user: ExternalId) -> OwnedMutexGuard<Session> {
        loop {
            let handle = self.sessions.get(user, self.now()).await;
            let guard = Arc::clone(&handle).lock_owned().await;
            match self.sessions.peek(user).await {
                Some(live) if Arc::ptr_eq(&live, &handle) => return guard,
                _ => tracing::debug!(%user, "session replaced while waiting, retrying"),
            }
        }
    }

    /// Drop the session. The guarded value is reset too, so requests
    /// already queued on the lock start from scratch.
    async fn clear(&self, user: ExternalId, session: &mut Session) {
        *session = Session::new(self.now());
        self.sessions.remove(user).await;
        tracing::debug!(%user, "session cleared");
    }

    async fn back(&self, user: ExternalId, session: &mut Session) -> Reply {
        let Some(state) = session.back() else {
            return Reply::answer("No previous step");
        };

        match state {
            ConvState::SelectingFrom => render::station_picker(session, &self.stations, Leg::From),
            ConvState::SelectingTo => render::station_picker(session, &self.stations, Leg::To),
            ConvState::ShowingSchedule => render::schedule(session, self.offset(), ReplyMode::Send),
            ConvState::WaitingFrom => render::manual_prompt(Leg::From),
            ConvState::WaitingTo => render::manual_prompt(Leg::To),
            ConvState::Idle => {
                self.clear(user, session).await;
                render::cancelled()
            }
        }
    }

    async fn select_station(&self, session: &mut Session, station: StationRef) -> Reply {
        let state = session.state();
        if !matches!(state, ConvState::SelectingFrom | ConvState::SelectingTo) {
            return Reply::answer("This button is no longer active");
        }

        let picked = match station {
            StationRef::Recent(i) => session.recent().get(i).cloned(),
            StationRef::Popular(i) => self.stations.popular(POPULAR_SHOWN).get(i).cloned(),
        };
        let Some(picked) = picked else {
            return Reply::answer("Station not found");
        };

        if state == ConvState::SelectingFrom {
            session.remember_station(&picked);
            session.from = Some(picked);
            session.transition(ConvState::SelectingTo);
            return render::station_picker(session, &self.stations, Leg::To);
        }

        if let Some(reply) = Self::reject_same_station(session, &picked) {
            return reply;
        }
        session.remember_station(&picked);
        session.to = Some(picked);
        self.search(session).await
    }

    fn typed_origin(&self, session: &mut Session, text: &str) -> Reply {
        let station = match self.stations.resolve(text) {
            Ok(station) => station,
            Err(e) => return Self::unknown_station(&e.to_string()),
        };

        session.remember_station(&station);
        let reply = render::origin_accepted(&station);
        session.from = Some(station);
        session.transition(ConvState::WaitingTo);
        reply
    }

    async fn typed_destination(&self, session: &mut Session, text: &str) -> Reply {
        let station = match self.stations.resolve(text) {
            Ok(station) => station,
            Err(e) => return Self::unknown_station(&e.to_string()),
        };

        if let Some(reply) = Self::reject_same_station(session, &station) {
            return reply;
        }
        session.remember_station(&station);
        session.to = Some(station);
        self.search(session).await
    }

    fn unknown_station(message: &str) -> Reply {
        render::recoverable(
            &format!("{message}. Check the name or code and type it again."),
            vec![
                Button::new("📋 Pick from list", Command::Back),
                Button::new("❌ Cancel", Command::Cancel),
            ],
        )
    }

    fn reject_same_station(session: &Session, to: &Station) -> Option<Reply> {
        let from = session.from.as_ref()?;
        if from.code != to.code {
            return None;
        }
        Some(render::recoverable(
            &ValidationError::SameStation.to_string(),
            vec![
                Button::new("🔀 Other stations", Command::EditFrom),
                Button::new("❌ Cancel", Command::Cancel),
            ],
        ))
    }

    /// Run the schedule search for the chosen stations. On success the
    /// session moves to `ShowingSchedule`; on failure it stays put and the
    /// user gets retry actions.
    async fn search(&self, session: &mut Session) -> Reply {
        let (Some(from), Some(to)) = (session.from.clone(), session.to.clone()) else {
            return Reply::answer("Choose both stations first");
        };

        match self.query.search(&from.code, &to.code, session.date).await {
            Err(e) => {
                tracing::warn!(from = %from.code, to = %to.code, error = %e, "schedule search failed");
                render::recoverable(
                    &format!("Schedule search failed: {e}"),
                    render::search_actions(),
                )
            }
            Ok(found) if found.is_empty() => render::recoverable(
                "No trains found for this route.",
                render::search_actions(),
            ),
            Ok(found) => {
                session.set_results(found.options, found.date);
                session.transition(ConvState::ShowingSchedule);
                render::schedule(session, self.offset(), ReplyMode::Send)
            }
        }
    }

    fn show_page(&self, session: &mut Session, page: usize) -> Reply {
        if session.state() != ConvState::ShowingSchedule || !session.set_page(page) {
            return Reply::answer("Page not available");
        }
        render::schedule(session, self.offset(), ReplyMode::Edit)
    }

    async fn select_train(&self, user: ExternalId, session: &mut Session, index: usize) -> Reply {
        if session.state() != ConvState::ShowingSchedule {
            return Reply::answer("This button is no longer active");
        }
        let Some(option) = session.results().get(index).cloned() else {
            return Reply::answer("Schedule not found, please search again");
        };
        let (Some(from), Some(to)) = (session.from.clone(), session.to.clone()) else {
            return Reply::answer("Schedule not found, please search again");
        };

        let account = match self.trips.user_by_external_id(user).await {
            Ok(account) => account,
            Err(e) => {
                tracing::warn!(%user, error = %e, "user lookup failed on confirmation");
                return Reply::answer("Could not load your profile. Send /start and try again.");
            }
        };

        let trip = NewTrip::new(account.id, from.code.clone(), to.code.clone(), option.departure);
        match self.trips.confirm_trip(trip).await {
            Ok(_) => {
                self.clear(user, session).await;
                render::trip_created(&option, &from.name, &to.name, self.offset())
            }
            Err(e) => {
                tracing::warn!(%user, error = %e, "trip confirmation failed");
                Reply::answer(confirmation_error(&e))
            }
        }
    }
}

/// User-facing text for a failed confirmation.
fn confirmation_error(e: &TripError) -> String {
    match (e, e.kind()) {
        (TripError::ReminderFailed { .. }, _) => e.to_string(),
        (_, ErrorKind::Validation) => e.to_string(),
        (_, ErrorKind::Conflict) => "You already have this trip.".to_string(),
        (_, ErrorKind::NotFound) => format!("{e}. Please try again."),
        (_, ErrorKind::Transient) => "Something went wrong, please try again later.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ReminderStatus, ScheduleOption, StationCode, TripId};
    use crate::provider::MockScheduleProvider;
    use crate::session::SessionConfig;
    use crate::domain::{NewReminder, Reminder, ReminderId};
    use crate::store::{MemoryStore, ReminderRepository, StoreError, TripRepository};
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate, TimeZone};

    const USER: ExternalId = ExternalId(4242);

    fn msk() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    /// 09:00 Moscow time on 2026-01-23.
    fn now() -> DateTime<Utc> {
        msk()
            .with_ymd_and_hms(2026, 1, 23, 9, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn code(s: &str) -> StationCode {
        StationCode::parse(s).unwrap()
    }

    /// Popular stations 0 and 3.
    fn kotelshchik() -> StationCode {
        code("s9634302")
    }

    fn rostov() -> StationCode {
        code("s9612913")
    }

    fn train(i: i64) -> ScheduleOption {
        let departure = now() + Duration::minutes(30 + 40 * i);
        ScheduleOption {
            train_number: format!("{}", 6000 + i),
            title: "Taganrog - Rostov".into(),
            departure,
            arrival: departure + Duration::minutes(75),
            duration: Duration::minutes(75),
        }
    }

    struct Harness {
        controller: Controller,
        provider: MockScheduleProvider,
        store: Arc<MemoryStore>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        build(now(), store.clone(), store)
    }

    /// A harness whose clock reads `at` and whose reminders go to
    /// `reminders` instead of the shared store.
    fn build(
        at: DateTime<Utc>,
        store: Arc<MemoryStore>,
        reminders: Arc<dyn ReminderRepository>,
    ) -> Harness {
        let provider = MockScheduleProvider::new();
        let stations = Arc::new(StationDirectory::builtin());
        let trips = TripService::new(store.clone(), reminders, store.clone(), stations.clone());
        let query = ScheduleQuery::new(Arc::new(provider.clone()), msk());
        let controller = Controller::new(
            SessionStore::new(&SessionConfig::default()),
            stations,
            query,
            trips,
        )
        .with_clock(clock::fixed(at));

        Harness {
            controller,
            provider,
            store,
        }
    }

    fn profile() -> Profile {
        Profile::new(USER, "Anna")
    }

    async fn state(h: &Harness) -> ConvState {
        let handle = h.controller.sessions().get(USER, now()).await;
        let state = handle.lock().await.state();
        state
    }

    async fn history(h: &Harness) -> Vec<ConvState> {
        let handle = h.controller.sessions().get(USER, now()).await;
        let history = handle.lock().await.history().to_vec();
        history
    }

    async fn tap(h: &Harness, token: &str) -> Reply {
        h.controller.handle_token(USER, token).await
    }

    /// Start a booking and pick Krasny Kotelshchik -> Rostov-Glavny.
    async fn to_schedule(h: &Harness, count: i64) -> Reply {
        h.provider
            .set_route(kotelshchik(), rostov(), (0..count).map(train).collect())
            .await;
        h.controller.new_trip(&profile()).await;
        tap(h, "ss:p0").await;
        tap(h, "ss:p3").await
    }

    #[tokio::test]
    async fn idle_accepts_only_start_and_cancel() {
        let h = harness();

        let reply = tap(&h, "ss:p0").await;
        assert_eq!(reply.mode, ReplyMode::Answer);
        assert_eq!(state(&h).await, ConvState::Idle);

        let reply = h.controller.handle_text(USER, "Rostov").await;
        assert!(reply.text.contains("/newtrip"));

        let reply = tap(&h, "x").await;
        assert!(reply.text.contains("cancelled"));
    }

    #[tokio::test]
    async fn start_registers_user_and_shows_origin_picker() {
        let h = harness();
        let reply = h.controller.new_trip(&profile()).await;

        assert!(reply.text.contains("departure station"));
        assert_eq!(state(&h).await, ConvState::SelectingFrom);
        assert!(h.controller.trips.user_by_external_id(USER).await.is_ok());
    }

    #[tokio::test]
    async fn button_flow_reaches_schedule() {
        let h = harness();
        h.controller.new_trip(&profile()).await;

        let reply = tap(&h, "ss:p0").await;
        assert!(reply.text.contains("destination station"));
        assert_eq!(state(&h).await, ConvState::SelectingTo);

        h.provider
            .set_route(kotelshchik(), rostov(), (0..7).map(train).collect())
            .await;
        let reply = tap(&h, "ss:p3").await;

        assert_eq!(reply.mode, ReplyMode::Send);
        assert!(reply.text.contains("Krasny Kotelshchik → Rostov-Glavny"));
        assert_eq!(
            history(&h).await,
            vec![
                ConvState::SelectingFrom,
                ConvState::SelectingTo,
                ConvState::ShowingSchedule
            ]
        );

        let handle = h.controller.sessions().get(USER, now()).await;
        let session = handle.lock().await;
        assert_eq!(session.results().len(), 7);
        let recent: Vec<_> = session.recent().iter().map(|s| s.code.clone()).collect();
        assert_eq!(recent, vec![rostov(), kotelshchik()]);
    }

    #[tokio::test]
    async fn recent_station_buttons_work() {
        let h = harness();
        to_schedule(&h, 2).await;

        // Recent list is [Rostov, Kotelshchik] after the first booking
        h.controller.new_trip(&profile()).await;
        tap(&h, "ss:r1").await;

        let handle = h.controller.sessions().get(USER, now()).await;
        let from = handle.lock().await.from.clone().unwrap();
        assert_eq!(from.code, kotelshchik());
    }

    #[tokio::test]
    async fn unknown_station_index_leaves_state() {
        let h = harness();
        h.controller.new_trip(&profile()).await;

        let reply = tap(&h, "ss:r0").await;
        assert_eq!(reply, Reply::answer("Station not found"));
        let reply = tap(&h, "ss:p99").await;
        assert_eq!(reply.mode, ReplyMode::Answer);
        assert_eq!(state(&h).await, ConvState::SelectingFrom);
    }

    #[tokio::test]
    async fn pagination_edits_in_place() {
        let h = harness();
        to_schedule(&h, 12).await;

        let reply = tap(&h, "sp:2").await;
        assert_eq!(reply.mode, ReplyMode::Edit);
        let trains: Vec<_> = reply.commands().filter(|c| c.starts_with("tr:")).collect();
        assert_eq!(trains, vec!["tr:10", "tr:11"]);
        assert!(!reply.commands().any(|c| c == "sp:3"));

        // Out of range pages are refused and the page is unchanged
        let reply = tap(&h, "sp:3").await;
        assert_eq!(reply.mode, ReplyMode::Answer);
        let handle = h.controller.sessions().get(USER, now()).await;
        assert_eq!(handle.lock().await.page(), 2);
        assert_eq!(handle.lock().await.results().len(), 12);
    }

    #[tokio::test]
    async fn back_navigation_rerenders_previous_screen() {
        let h = harness();
        to_schedule(&h, 3).await;

        let reply = tap(&h, "b").await;
        assert!(reply.text.contains("destination station"));
        assert_eq!(state(&h).await, ConvState::SelectingTo);

        let reply = tap(&h, "b").await;
        assert!(reply.text.contains("departure station"));

        let reply = tap(&h, "b").await;
        assert_eq!(reply, Reply::answer("No previous step"));
        assert_eq!(state(&h).await, ConvState::SelectingFrom);
    }

    #[tokio::test]
    async fn empty_schedule_is_recoverable() {
        let h = harness();
        h.controller.new_trip(&profile()).await;
        tap(&h, "ss:p0").await;

        let reply = tap(&h, "ss:p3").await;
        assert!(reply.text.contains("No trains found"));
        assert_eq!(reply.commands().collect::<Vec<_>>(), vec!["rt", "ef", "x"]);
        assert_eq!(state(&h).await, ConvState::SelectingTo);

        // Today and tomorrow were both tried
        let dates: Vec<_> = h.provider.calls().await.iter().map(|c| c.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 1, 23).unwrap(),
                NaiveDate::from_ymd_opt(2026, 1, 24).unwrap()
            ]
        );
    }

    #[tokio::test]
    async fn retry_after_provider_failure() {
        let h = harness();
        h.provider.fail_with(Some(503)).await;
        h.controller.new_trip(&profile()).await;
        tap(&h, "ss:p0").await;

        let reply = tap(&h, "ss:p3").await;
        assert!(reply.text.contains("Schedule search failed"));
        assert_eq!(state(&h).await, ConvState::SelectingTo);

        h.provider.fail_with(None).await;
        h.provider
            .set_route(kotelshchik(), rostov(), vec![train(0)])
            .await;
        let reply = tap(&h, "rt").await;
        assert!(reply.text.contains("Train schedule"));
        assert_eq!(state(&h).await, ConvState::ShowingSchedule);
    }

    #[tokio::test]
    async fn confirmation_creates_trip_and_reminder_then_clears() {
        let h = harness();
        to_schedule(&h, 7).await;

        let reply = tap(&h, "tr:3").await;
        assert!(reply.text.contains("Trip created"));
        assert_eq!(reply.mode, ReplyMode::Edit);

        let user = h.controller.trips.user_by_external_id(USER).await.unwrap();
        let trips = h.store.trips_by_user(user.id).await.unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].departure, train(3).departure);
        assert_eq!(trips[0].from, kotelshchik());

        let reminders = h.store.reminders().await;
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].trip_id, TripId(1));
        assert_eq!(
            reminders[0].trigger_at,
            train(3).departure - Duration::minutes(30)
        );
        assert_eq!(reminders[0].status, ReminderStatus::Pending);

        assert!(h.controller.sessions().peek(USER).await.is_none());
    }

    #[tokio::test]
    async fn bad_train_index_is_answered_inline() {
        let h = harness();
        to_schedule(&h, 2).await;

        let reply = tap(&h, "tr:5").await;
        assert_eq!(reply.mode, ReplyMode::Answer);
        assert_eq!(state(&h).await, ConvState::ShowingSchedule);
        assert!(h.store.reminders().await.is_empty());
    }

    #[tokio::test]
    async fn duplicate_booking_reports_conflict_and_keeps_session() {
        let h = harness();
        to_schedule(&h, 2).await;
        tap(&h, "tr:0").await;

        to_schedule(&h, 2).await;
        let reply = tap(&h, "tr:0").await;
        assert_eq!(reply, Reply::answer("You already have this trip."));
        assert_eq!(state(&h).await, ConvState::ShowingSchedule);
    }

    #[tokio::test]
    async fn manual_entry_path() {
        let h = harness();
        h.provider
            .set_route(code("s9613483"), rostov(), vec![train(0), train(1)])
            .await;
        h.controller.new_trip(&profile()).await;

        let reply = tap(&h, "text_input").await;
        assert!(reply.text.contains("departure station"));
        assert_eq!(state(&h).await, ConvState::WaitingFrom);

        let reply = h.controller.handle_text(USER, "Atlantis").await;
        assert!(reply.text.starts_with("⚠️"));
        assert_eq!(state(&h).await, ConvState::WaitingFrom);

        let reply = h.controller.handle_text(USER, "9613483").await;
        assert!(reply.text.contains("Taganrog (Old Station)"));
        assert_eq!(state(&h).await, ConvState::WaitingTo);

        let reply = h.controller.handle_text(USER, "rostov-glavny").await;
        assert!(reply.text.contains("Train schedule"));
        assert_eq!(
            history(&h).await,
            vec![
                ConvState::SelectingFrom,
                ConvState::WaitingFrom,
                ConvState::WaitingTo,
                ConvState::ShowingSchedule
            ]
        );
    }

    #[tokio::test]
    async fn same_station_is_rejected() {
        let h = harness();
        h.controller.new_trip(&profile()).await;
        tap(&h, "ss:p0").await;

        let reply = tap(&h, "ss:p0").await;
        assert!(reply.text.contains("must differ"));
        assert_eq!(state(&h).await, ConvState::SelectingTo);
        assert!(h.provider.calls().await.is_empty());
    }

    #[tokio::test]
    async fn cancel_text_clears_session() {
        let h = harness();
        h.controller.new_trip(&profile()).await;
        tap(&h, "ss:p0").await;

        let reply = h.controller.handle_text(USER, "/cancel").await;
        assert!(reply.text.contains("cancelled"));
        assert!(h.controller.sessions().peek(USER).await.is_none());
    }

    #[tokio::test]
    async fn garbage_tokens_leave_session_alone() {
        let h = harness();
        h.controller.new_trip(&profile()).await;

        let reply = tap(&h, "launch:missiles").await;
        assert_eq!(reply, Reply::answer("Unknown command"));
        assert_eq!(history(&h).await, vec![ConvState::SelectingFrom]);
    }

    #[tokio::test]
    async fn edit_from_returns_to_origin_picker() {
        let h = harness();
        to_schedule(&h, 2).await;

        let reply = tap(&h, "ef").await;
        assert!(reply.text.contains("departure station"));
        assert_eq!(state(&h).await, ConvState::SelectingFrom);
    }

    #[tokio::test]
    async fn repeated_edits_do_not_grow_history() {
        let h = harness();
        to_schedule(&h, 2).await;

        for _ in 0..3 {
            tap(&h, "ef").await;
            assert_eq!(history(&h).await, vec![ConvState::SelectingFrom]);
            tap(&h, "ss:p0").await;
            tap(&h, "ss:p3").await;
        }
        assert_eq!(history(&h).await.len(), 3);

        tap(&h, "et").await;
        tap(&h, "et").await;
        assert_eq!(
            history(&h).await,
            vec![ConvState::SelectingFrom, ConvState::SelectingTo]
        );

        let reply = tap(&h, "b").await;
        assert!(reply.text.contains("departure station"));
        assert_eq!(tap(&h, "b").await, Reply::answer("No previous step"));
    }

    #[tokio::test]
    async fn next_day_results_do_not_move_search_date() {
        let late = msk()
            .with_ymd_and_hms(2026, 1, 23, 23, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let store = Arc::new(MemoryStore::new());
        let h = build(late, store.clone(), store);
        let day = |d| NaiveDate::from_ymd_opt(2026, 1, d).unwrap();
        let at = |d, hh, mm| {
            msk()
                .with_ymd_and_hms(2026, 1, d, hh, mm, 0)
                .unwrap()
                .with_timezone(&Utc)
        };
        let option = |number: &str, departure: DateTime<Utc>| ScheduleOption {
            train_number: number.into(),
            title: "Suburban".into(),
            departure,
            arrival: departure + Duration::minutes(50),
            duration: Duration::minutes(50),
        };

        let taganrog = code("s9613483");
        h.provider
            .set_route_on(kotelshchik(), rostov(), day(24), vec![option("6101", at(24, 7, 0))])
            .await;
        h.provider
            .set_route_on(kotelshchik(), taganrog, day(23), vec![option("6202", at(23, 23, 40))])
            .await;

        h.controller.new_trip(&profile()).await;
        tap(&h, "ss:p0").await;
        let reply = tap(&h, "ss:p3").await;
        assert!(reply.text.contains("No trains left on 23.01.2026, showing 24.01.2026"));
        assert!(reply.text.contains("6101"));

        tap(&h, "b").await;
        assert_eq!(state(&h).await, ConvState::SelectingTo);

        // Taganrog (Old Station) is popular station 1
        let reply = tap(&h, "ss:p1").await;
        assert!(reply.text.contains("6202"));
        assert!(reply.text.contains("23:40"));
        assert!(!reply.text.contains("No trains left"));

        let dates: Vec<_> = h.provider.calls().await.iter().map(|c| c.date).collect();
        assert_eq!(dates, vec![day(23), day(24), day(23)]);

        let handle = h.controller.sessions().get(USER, late).await;
        assert_eq!(handle.lock().await.date, late);
    }

    #[tokio::test(start_paused = true)]
    async fn waiter_on_cleared_session_uses_the_live_one() {
        let h = harness();
        let handle = h.controller.sessions().get(USER, now()).await;
        let mut guard = handle.lock().await;

        let controller = h.controller.clone();
        let waiter = tokio::spawn(async move { controller.new_trip(&profile()).await });
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        // What `clear` does while holding the lock
        h.controller.sessions().remove(USER).await;
        *guard = Session::new(now());
        drop(guard);

        let reply = waiter.await.unwrap();
        assert!(reply.text.contains("departure station"));
        assert_eq!(state(&h).await, ConvState::SelectingFrom);
    }

    /// Reminder storage that is down.
    struct BrokenReminders;

    #[async_trait]
    impl ReminderRepository for BrokenReminders {
        async fn create_reminder(&self, _: NewReminder) -> Result<Reminder, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }

        async fn mark_reminder_sent(&self, _: ReminderId) -> Result<(), StoreError> {
            Ok(())
        }

        async fn pending_reminders(&self, _: DateTime<Utc>) -> Result<Vec<Reminder>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn reminder_failure_keeps_trip_and_session() {
        let store = Arc::new(MemoryStore::new());
        let h = build(now(), store, Arc::new(BrokenReminders));
        to_schedule(&h, 2).await;

        let reply = tap(&h, "tr:1").await;
        assert_eq!(reply.mode, ReplyMode::Answer);
        assert!(reply.text.contains("trip #1"));

        let user = h.controller.trips.user_by_external_id(USER).await.unwrap();
        let trips = h.store.trips_by_user(user.id).await.unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].departure, train(1).departure);
        assert!(h.store.reminders().await.is_empty());
        assert_eq!(state(&h).await, ConvState::ShowingSchedule);
    }

    #[tokio::test]
    async fn my_trips_lists_confirmed_trips() {
        let h = harness();
        let reply = h.controller.my_trips(USER).await;
        assert!(reply.text.contains("no trips"));

        to_schedule(&h, 1).await;
        tap(&h, "tr:0").await;

        let reply = h.controller.my_trips(USER).await;
        assert!(reply.text.contains("#1 Krasny Kotelshchik → Rostov-Glavny"));
    }

    #[test]
    fn confirmation_error_messages() {
        assert_eq!(
            confirmation_error(&TripError::Validation(ValidationError::MissingDeparture)),
            "departure time must be set"
        );
        assert_eq!(
            confirmation_error(&TripError::Store(StoreError::Backend("x".into()))),
            "Something went wrong, please try again later."
        );
        let partial = TripError::ReminderFailed {
            trip_id: TripId(9),
            source: StoreError::Backend("x".into()),
        };
        assert!(confirmation_error(&partial).contains("trip #9"));
    }
}
