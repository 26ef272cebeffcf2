//! The worker's single session-driver task: owns every piece of mutable
//! state a bot identity's worker has (§3 "ownership in design terms", §5
//! single-actor scheduling model).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use modbridge_core::moderation::{evaluate, MatcherCache, ModerationInput, PipelineAction, PresetCache};
use modbridge_core::worker::backoff::ReconnectState;
use modbridge_core::worker::classify;
use modbridge_core::worker::entity_map::EntityMap;
use modbridge_core::worker::outgoing_queue::OutgoingQueue;
use modbridge_core::worker::reconciliation;
use modbridge_core::worker::room_state::RoomCounters;
use modbridge_core::worker::state_machine::WorkerState;
use modbridge_infra::http::admin_api::AdminApiClient;
use modbridge_infra::http::dataplane_client::DataPlaneClient;
use modbridge_infra::http::discord_webhook::DiscordWebhookClient;
use modbridge_infra::http::oauth::UpstreamAuthClient;
use modbridge_infra::upstream::jid;
use modbridge_infra::upstream::sasl;
use modbridge_infra::upstream::stanza::{self, Inbound, OutgoingStanza};
use modbridge_infra::upstream::transport::{TransportError, UpstreamConnection};
use modbridge_types::entity::Entity;
use modbridge_types::error::SessionError;
use modbridge_types::ids::{BotId, EntityGuid, PresetId, UserGuid};
use modbridge_types::config::WorkerTuning;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::commands::{Command, ReconnectionStateSnapshot};
use super::jid_index::JidIndex;
use super::moderation::{self, EntityModeration};

pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// What interrupted the online run loop.
pub enum OnlineExit {
    /// Transport lost or watchdog tripped: reconnect (Offline -> Backoff).
    Reconnect,
    /// Shutdown requested: drain and exit.
    Drain,
    /// Process watchdog or another fatal condition: exit immediately.
    Exit(i32),
}

pub struct Driver {
    pub bot_id: BotId,
    pub ws_url: String,
    pub muc_domain: String,
    pub supergroup_domain: String,
    pub tuning: WorkerTuning,

    pub dataplane: DataPlaneClient,
    pub auth: UpstreamAuthClient,
    pub admin: AdminApiClient,
    pub webhook: DiscordWebhookClient,

    pub preset_cache: PresetCache,
    pub matcher_cache: MatcherCache,

    pub state: WorkerState,
    pub connection: Option<UpstreamConnection>,
    pub entity_map: EntityMap,
    pub jid_index: JidIndex,
    pub moderation: HashMap<EntityGuid, EntityModeration>,
    pub counters: HashMap<EntityGuid, RoomCounters>,
    pub queue: OutgoingQueue<OutgoingStanza>,
    pub reconnect: ReconnectState,
    pub startup_backoff: ReconnectState,

    pub bot_guid: Option<String>,
    pub access_token: Option<String>,
    pub force_refresh: bool,
    pub startup_retry_attempts: u32,

    pub last_activity: Instant,
    pub last_watchdog_warning: Instant,

    pub shutdown: CancellationToken,
}

impl Driver {
    pub fn new(
        bot_id: BotId,
        ws_url: String,
        muc_domain: String,
        supergroup_domain: String,
        tuning: WorkerTuning,
        dataplane: DataPlaneClient,
        auth: UpstreamAuthClient,
        admin: AdminApiClient,
        webhook: DiscordWebhookClient,
        shutdown: CancellationToken,
    ) -> Self {
        let debounce = tuning.recently_unassigned_debounce();
        let backoff_initial = tuning.backoff_initial();
        let backoff_max = tuning.backoff_max();
        Self {
            bot_id,
            ws_url,
            muc_domain,
            supergroup_domain,
            tuning,
            dataplane,
            auth,
            admin,
            webhook,
            preset_cache: PresetCache::new(),
            matcher_cache: MatcherCache::new(),
            state: WorkerState::Init,
            connection: None,
            entity_map: EntityMap::new(debounce),
            jid_index: JidIndex::new(),
            moderation: HashMap::new(),
            counters: HashMap::new(),
            queue: OutgoingQueue::new(),
            reconnect: ReconnectState::new(backoff_initial, backoff_max),
            startup_backoff: ReconnectState::new(backoff_initial, backoff_max),
            bot_guid: None,
            access_token: None,
            force_refresh: false,
            startup_retry_attempts: 0,
            last_activity: Instant::now(),
            last_watchdog_warning: Instant::now() - Duration::from_secs(3600),
            shutdown,
        }
    }

    /// Drive the full state machine until a `TerminalExit` (Draining
    /// complete) or an explicit process exit.
    pub async fn run(mut self, mut cmd_rx: mpsc::Receiver<Command>) {
        loop {
            match self.state {
                WorkerState::Init => {
                    self.state = WorkerState::FetchingCreds;
                }
                WorkerState::FetchingCreds => {
                    self.drain_commands(&mut cmd_rx).await;
                    if self.shutdown.is_cancelled() {
                        self.state = WorkerState::Draining;
                        continue;
                    }
                    match self.fetch_credentials().await {
                        Ok(()) => self.state = WorkerState::Connecting,
                        Err(err) => {
                            tracing::warn!(bot_id = %self.bot_id, %err, "failed to fetch credentials");
                            self.startup_retry_attempts += 1;
                            if self.startup_retry_attempts > self.tuning.startup_retry_budget {
                                tracing::error!(bot_id = %self.bot_id, "startup retry budget exhausted, exiting");
                                std::process::exit(1);
                            }
                            let delay = self.startup_backoff.record_attempt(Instant::now());
                            self.sleep_or_shutdown(delay, &mut cmd_rx).await;
                            if self.shutdown.is_cancelled() {
                                self.state = WorkerState::Draining;
                            }
                        }
                    }
                }
                WorkerState::Connecting => {
                    self.drain_commands(&mut cmd_rx).await;
                    match self.establish_session().await {
                        Ok(()) => {
                            self.state = WorkerState::Online;
                            self.reconnect.reset();
                            self.startup_backoff.reset();
                            self.force_refresh = false;
                            self.startup_retry_attempts = 0;
                        }
                        Err(err) => {
                            tracing::warn!(bot_id = %self.bot_id, %err, "session establishment failed");
                            if err.downcast_ref::<SessionError>().is_some_and(|e| matches!(e, SessionError::AuthExpired)) {
                                self.connection = None;
                                self.startup_retry_attempts += 1;
                                if self.startup_retry_attempts > self.tuning.startup_retry_budget {
                                    tracing::error!(bot_id = %self.bot_id, "startup retry budget exhausted, exiting");
                                    std::process::exit(1);
                                }
                                let delay = self.startup_backoff.record_attempt(Instant::now());
                                self.sleep_or_shutdown(delay, &mut cmd_rx).await;
                                self.state = if self.shutdown.is_cancelled() { WorkerState::Draining } else { WorkerState::FetchingCreds };
                            } else {
                                self.state = WorkerState::Offline;
                            }
                        }
                    }
                }
                WorkerState::Online => match self.run_online(&mut cmd_rx).await {
                    OnlineExit::Reconnect if self.force_refresh => {
                        self.connection = None;
                        self.state = WorkerState::FetchingCreds;
                    }
                    OnlineExit::Reconnect => self.state = WorkerState::Offline,
                    OnlineExit::Drain => self.state = WorkerState::Draining,
                    OnlineExit::Exit(code) => std::process::exit(code),
                },
                WorkerState::Offline => {
                    self.connection = None;
                    self.state = WorkerState::Backoff;
                }
                WorkerState::Backoff => {
                    if self.reconnect.circuit_open(self.tuning.circuit_breaker_threshold) {
                        tracing::error!(bot_id = %self.bot_id, attempts = self.reconnect.attempt_count(), "circuit breaker tripped, exiting");
                        std::process::exit(1);
                    }
                    let delay = self.reconnect.record_attempt(Instant::now());
                    self.sleep_or_shutdown(delay, &mut cmd_rx).await;
                    self.state = if self.shutdown.is_cancelled() { WorkerState::Draining } else { WorkerState::Connecting };
                }
                WorkerState::Draining => {
                    if let Some(conn) = &mut self.connection {
                        let _ = tokio::time::timeout(Duration::from_secs(5), conn.close()).await;
                    }
                    self.state = WorkerState::TerminalExit;
                }
                WorkerState::TerminalExit => break,
            }
        }
    }

    async fn sleep_or_shutdown(&mut self, delay: Duration, cmd_rx: &mut mpsc::Receiver<Command>) {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = self.shutdown.cancelled() => {}
            Some(cmd) = cmd_rx.recv() => { self.handle_command(cmd).await; }
        }
    }

    async fn drain_commands(&mut self, cmd_rx: &mut mpsc::Receiver<Command>) {
        while let Ok(cmd) = cmd_rx.try_recv() {
            self.handle_command(cmd).await;
        }
    }

    async fn fetch_credentials(&mut self) -> anyhow::Result<()> {
        let config = self.dataplane.bot_config(self.bot_id, self.force_refresh).await?;
        self.bot_guid = Some(config.bot_guid);
        self.access_token = Some(config.bot_token);
        Ok(())
    }

    pub async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Assign { guid, entity } => self.apply_assign(guid, entity).await,
            Command::Unassign { guid } => self.apply_unassign(guid).await,
            Command::Update { guid } => self.apply_update(guid).await,
            Command::RefreshPreset { preset_id } => self.apply_refresh_preset(preset_id).await,
            Command::ExitProcess => self.shutdown.cancel(),
            Command::ReconnectionState { reply } => {
                let snapshot = ReconnectionStateSnapshot {
                    worker_state: format!("{:?}", self.state),
                    attempt_count: self.reconnect.attempt_count(),
                    current_delay_ms: self.reconnect.current_delay().as_millis() as u64,
                    entity_count: self.entity_map.len(),
                };
                let _ = reply.send(snapshot);
            }
        }
    }

    async fn apply_assign(&mut self, guid: EntityGuid, entity: Option<Entity>) {
        let entity = match entity {
            Some(e) => e,
            None => match self.dataplane.entity_data(&guid).await {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!(%guid, %err, "assign: failed to fetch entity data");
                    return;
                }
            },
        };
        if let Err(err) = entity.validate() {
            tracing::warn!(%guid, %err, "assign: rejecting malformed entity");
            return;
        }

        let muc_jid = jid::muc_light_jid(&entity, &self.muc_domain);
        self.entity_map.assign(entity);
        self.jid_index.register_muc_jid(guid.clone(), muc_jid.clone());

        let modstate = moderation::load_entity_moderation(&self.dataplane, &self.preset_cache, &guid).await;
        self.moderation.insert(guid.clone(), modstate);
        self.counters.entry(guid.clone()).or_default();

        self.queue.push(stanza::muc_light_config_query(&new_id(), &muc_jid, guid));
    }

    async fn apply_unassign(&mut self, guid: EntityGuid) {
        let presence_group = self.jid_index.presence_group_of(&guid).map(String::from);

        if self.entity_map.unassign(&guid, Instant::now()).is_none() {
            return;
        }
        if let Some(modstate) = self.moderation.remove(&guid) {
            moderation::release_entity_moderation(&self.preset_cache, &modstate);
        }
        self.counters.remove(&guid);

        if let Some(pg) = presence_group {
            self.queue.push(stanza::supergroup_subscribe(&new_id(), &pg, false, guid.clone()));
        }
        self.jid_index.forget(&guid);
    }

    async fn apply_update(&mut self, guid: EntityGuid) {
        let entity = match self.dataplane.entity_data(&guid).await {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(%guid, %err, "update: failed to fetch entity data");
                return;
            }
        };
        if let Err(err) = entity.validate() {
            tracing::warn!(%guid, %err, "update: rejecting malformed entity");
            return;
        }

        let muc_jid = jid::muc_light_jid(&entity, &self.muc_domain);
        self.jid_index.register_muc_jid(guid.clone(), muc_jid);
        self.entity_map.update(entity);

        if let Some(old) = self.moderation.remove(&guid) {
            moderation::release_entity_moderation(&self.preset_cache, &old);
        }
        let modstate = moderation::load_entity_moderation(&self.dataplane, &self.preset_cache, &guid).await;
        self.moderation.insert(guid, modstate);
    }

    async fn apply_refresh_preset(&mut self, preset_id: PresetId) {
        let preset = match self.dataplane.preset(preset_id).await {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(%preset_id, %err, "refresh-preset: failed to fetch preset");
                return;
            }
        };
        self.matcher_cache.invalidate(&preset.words);
        self.preset_cache.replace(preset);

        if let Some(refreshed) = self.preset_cache.get(preset_id) {
            for modstate in self.moderation.values_mut() {
                if modstate.preset.as_ref().map(|p| p.id) == Some(preset_id) {
                    modstate.preset = Some(refreshed.clone());
                    moderation::recompute_effective_words(modstate);
                }
            }
        }
    }

    /// Session establishment contract (§4.1.1): fetch the chat token, open
    /// the transport, authenticate, send initial presence, then queue a
    /// configuration query for every currently-assigned entity.
    async fn establish_session(&mut self) -> anyhow::Result<()> {
        let bot_guid = self.bot_guid.clone().ok_or_else(|| anyhow::anyhow!("missing bot guid"))?;
        let access_token = self.access_token.clone().ok_or_else(|| anyhow::anyhow!("missing access token"))?;
        let chat_token = self.auth.exchange_chat_token(&access_token).await?;

        let mut conn = UpstreamConnection::connect(&self.ws_url).await?;
        let auth_xml = format!(
            "<auth xmlns='urn:ietf:params:xml:ns:xmpp-sasl' mechanism='PLAIN'>{}</auth>",
            sasl::plain_initial_response(&bot_guid, &self.muc_domain, &chat_token)
        );
        conn.send(&auth_xml).await?;

        match conn.recv().await? {
            Some(xml) if stanza::classify(&xml) == Inbound::AuthFailure => {
                self.force_refresh = true;
                return Err(SessionError::AuthExpired.into());
            }
            _ => {}
        }

        conn.send(&stanza::initial_presence(&new_id()).xml).await?;

        self.connection = Some(conn);
        self.last_activity = Instant::now();

        for guid in self.entity_map.keys().cloned().collect::<Vec<_>>() {
            if let Some(muc_jid) = self.jid_index.muc_jid_of(&guid).map(String::from) {
                self.queue.push(stanza::muc_light_config_query(&new_id(), &muc_jid, guid));
            }
        }

        Ok(())
    }

    /// The online run loop: multiplexes control commands, the upstream
    /// stream, and the five periodic tickers (§4.1.2-§4.1.6). Returns once
    /// something requires leaving the `Online` state.
    async fn run_online(&mut self, cmd_rx: &mut mpsc::Receiver<Command>) -> OnlineExit {
        self.do_reconcile().await;

        let mut queue_tick = tokio::time::interval(self.tuning.queue_tick());
        let mut reconciliation_tick = tokio::time::interval(self.tuning.reconciliation_interval());
        let mut reception_watchdog = tokio::time::interval(Duration::from_secs(self.tuning.reception_watchdog_interval_secs));
        let mut process_watchdog = tokio::time::interval(Duration::from_secs(self.tuning.process_watchdog_interval_secs));
        let mut memory_cleanup = tokio::time::interval(Duration::from_secs(self.tuning.memory_cleanup_interval_secs));
        queue_tick.tick().await;
        reconciliation_tick.tick().await;
        reception_watchdog.tick().await;
        process_watchdog.tick().await;
        memory_cleanup.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    return OnlineExit::Drain;
                }

                Some(cmd) = cmd_rx.recv() => {
                    self.handle_command(cmd).await;
                }

                frame = Self::recv_next(&mut self.connection) => {
                    match frame {
                        Ok(Some(xml)) => {
                            self.last_activity = Instant::now();
                            if self.handle_inbound(&xml).await {
                                tracing::warn!(bot_id = %self.bot_id, "auth expired mid-session, reconnecting with forced credential refresh");
                                return OnlineExit::Reconnect;
                            }
                        }
                        Ok(None) | Err(_) => {
                            tracing::warn!(bot_id = %self.bot_id, "upstream connection lost");
                            return OnlineExit::Reconnect;
                        }
                    }
                }

                _ = queue_tick.tick() => {
                    self.drain_queue_tick().await;
                }

                _ = reconciliation_tick.tick() => {
                    self.do_reconcile().await;
                }

                _ = reception_watchdog.tick() => {
                    if self.last_activity.elapsed() > Duration::from_secs(self.tuning.reception_watchdog_threshold_secs) {
                        let rate_limit = Duration::from_secs(self.tuning.reception_warning_rate_limit_secs);
                        if self.last_watchdog_warning.elapsed() >= rate_limit {
                            tracing::warn!(bot_id = %self.bot_id, "reception watchdog tripped, reconnecting");
                            self.last_watchdog_warning = Instant::now();
                        }
                        return OnlineExit::Reconnect;
                    }
                }

                _ = process_watchdog.tick() => {
                    if self.last_activity.elapsed() > Duration::from_secs(self.tuning.process_watchdog_threshold_secs) {
                        tracing::error!(bot_id = %self.bot_id, "process watchdog tripped, exiting");
                        return OnlineExit::Exit(1);
                    }
                }

                _ = memory_cleanup.tick() => {
                    self.entity_map.cleanup_expired_debounce(Instant::now());
                }
            }
        }
    }

    async fn recv_next(conn: &mut Option<UpstreamConnection>) -> Result<Option<String>, TransportError> {
        match conn {
            Some(c) => c.recv().await,
            None => std::future::pending().await,
        }
    }

    async fn drain_queue_tick(&mut self) {
        let now = Instant::now();
        let popped = self.queue.pop_next(|guid| self.entity_map.is_suppressed(guid, now));
        if let Some(stanza) = popped {
            if let Some(conn) = &mut self.connection {
                if let Err(err) = conn.send(&stanza.xml).await {
                    tracing::warn!(bot_id = %self.bot_id, %err, "failed to send queued stanza");
                }
            }
        }
    }

    /// Returns `true` if the caller must reconnect (currently only for a
    /// mid-session SASL failure, §4.1.2/§7 AuthExpired).
    async fn handle_inbound(&mut self, xml: &str) -> bool {
        match stanza::classify(xml) {
            Inbound::AuthFailure => {
                self.force_refresh = true;
                return true;
            }
            Inbound::PingRequest { id, from } => {
                self.queue.push(stanza::ping_result(&id, &from));
            }
            Inbound::MucLightConfigResult { from, presence_group } => {
                if let Some(guid) = self.jid_index.lookup(&from).cloned() {
                    if let Some(pg) = presence_group {
                        self.jid_index.register_presence_group(guid.clone(), pg.clone());
                        self.queue.push(stanza::supergroup_subscribe(&new_id(), &pg, true, guid));
                    }
                }
            }
            Inbound::EntityNotFound { from } => {
                if let Some(guid) = self.jid_index.lookup(&from).cloned() {
                    self.entity_map.mark_non_existent(&guid);
                    if let Err(err) = self.dataplane.mark_entity_status(&guid, false).await {
                        tracing::warn!(%guid, %err, "failed to report entity as inactive");
                    }
                }
            }
            Inbound::IqOtherGet { id, from } => {
                self.queue.push(stanza::feature_not_implemented(&id, &from));
            }
            Inbound::GroupchatMessage { id, from, author: _, body, attachment_id: _, delayed } => {
                self.handle_groupchat_message(id, from, body, delayed).await;
            }
            Inbound::PresenceAddedMember { from, member } => {
                self.handle_welcome(&from, &member).await;
            }
            Inbound::Unrecognized => {}
        }
        false
    }

    /// §4.2 points 4-7, §4.3: resolve the sending entity, derive the
    /// author's guid from the occupant JID's resource part (the upstream
    /// wire dialect beyond recognized stanza shapes is out of scope), gate
    /// on history/self-authorship, then run the moderation pipeline.
    async fn handle_groupchat_message(&mut self, message_id: String, from: String, body: String, delayed: bool) {
        let Some(guid) = self.jid_index.lookup(&from).cloned() else { return };

        let author_resource = from.split('/').nth(1).unwrap_or_default();
        let author_guid = UserGuid::from(author_resource);
        let bot_guid = UserGuid::from(self.bot_guid.clone().unwrap_or_default());

        if !classify::should_moderate(delayed, &author_guid, &bot_guid) {
            return;
        }

        let Some(entity) = self.entity_map.get(&guid).cloned() else { return };
        let Some(modstate) = self.moderation.get(&guid).cloned() else { return };
        let counters = self.counters.entry(guid.clone()).or_default();

        let input = ModerationInput {
            message_text: &body,
            author_guid: &author_guid,
            profanity: modstate.profanity.as_ref(),
            effective_words: &modstate.effective_words,
            read_only: entity.read_only,
            timers: &entity.timers,
            timer_counter_max: entity.timer_counter_max,
            commands: &entity.commands,
            read_only_mute_duration: self.tuning.read_only_mute(),
        };

        let Some(action) = evaluate(input, &self.matcher_cache, counters) else { return };

        match action {
            PipelineAction::BannedWord { reply, webhook_url, webhook_message, mute, .. } => {
                self.dispatch_delete(&message_id, &from, &guid, reply);
                if let Some(url) = webhook_url {
                    let client = self.webhook.clone();
                    let message = webhook_message.unwrap_or_else(|| format!("banned word triggered in {guid}"));
                    tokio::spawn(async move { client.notify(&url, &message).await });
                }
                if let Some(duration) = mute {
                    self.dispatch_mute(&entity, &author_guid, duration);
                }
            }
            PipelineAction::ReadOnly { mute } => {
                self.dispatch_delete(&message_id, &from, &guid, None);
                self.dispatch_mute(&entity, &author_guid, mute);
            }
            PipelineAction::Timer { timer, .. } => {
                self.queue.push(stanza::groupchat_message(&new_id(), &from, &timer.message, timer.attachment_id.as_deref(), guid));
            }
            PipelineAction::Command { command } => {
                self.queue.push(stanza::groupchat_message(&new_id(), &from, &command.response, command.attachment_id.as_deref(), guid));
            }
        }
    }

    /// §4.2 point 5: a freshly-added member's presence triggers the
    /// entity's configured welcome message, sent as a direct message.
    async fn handle_welcome(&mut self, from: &str, member: &str) {
        let Some(guid) = self.jid_index.lookup(from).cloned() else { return };
        let welcome = match self.entity_map.get(&guid).and_then(|e| e.welcome_message.clone()) {
            Some(w) => w,
            None => return,
        };
        self.queue.push(stanza::direct_message(&new_id(), member, &welcome, guid));
    }

    /// §4.4: retract via the admin API (predelay baked into the client),
    /// then optionally queue a reply. Fire-and-forget: the pipeline
    /// evaluation that chose this action already completed synchronously.
    fn dispatch_delete(&mut self, message_id: &str, from: &str, guid: &EntityGuid, reply: Option<String>) {
        let admin = self.admin.clone();
        let access_token = self.access_token.clone().unwrap_or_default();
        let message_id = message_id.to_string();
        let author_jid = from.to_string();
        let muc_jid = self.jid_index.muc_jid_of(guid).map(String::from).unwrap_or_else(|| from.to_string());
        let predelay = self.tuning.delete_predelay();
        tokio::spawn(async move {
            if let Err(err) = admin.delete_message(&access_token, &message_id, &author_jid, &muc_jid, predelay).await {
                tracing::warn!(%err, "failed to delete message");
            }
        });

        if let Some(reply) = reply {
            self.queue.push(stanza::groupchat_message(&new_id(), from, &reply, None, guid.clone()));
        }
    }

    fn dispatch_mute(&self, entity: &Entity, author_guid: &UserGuid, duration: Duration) {
        let admin = self.admin.clone();
        let access_token = self.access_token.clone().unwrap_or_default();
        let club_id = entity.club_guid().clone();
        let author = author_guid.clone();
        let until = chrono::Utc::now() + chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());
        tokio::spawn(async move {
            if let Err(err) = admin.mute_member(&access_token, &club_id, &author, until).await {
                tracing::warn!(%err, "failed to mute member");
            }
        });
    }

    pub async fn do_reconcile(&mut self) {
        let authoritative = match self.dataplane.bot_entities(self.bot_id).await {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(bot_id = %self.bot_id, %err, "reconciliation: data-plane unreachable");
                return;
            }
        };
        let current: std::collections::HashSet<EntityGuid> = self.entity_map.keys().cloned().collect();
        let plan = reconciliation::diff(&current, &authoritative);

        for guid in plan.to_assign {
            if let Some(entity) = authoritative.get(&guid).cloned() {
                self.apply_assign(guid, Some(entity)).await;
            }
        }
        for guid in plan.to_unassign {
            self.apply_unassign(guid).await;
        }
        for guid in plan.to_update {
            if let Some(entity) = authoritative.get(&guid).cloned() {
                let muc_jid = jid::muc_light_jid(&entity, &self.muc_domain);
                self.jid_index.register_muc_jid(guid.clone(), muc_jid);
                self.entity_map.update(entity);
            }
        }
    }
}
