//! Ordered moderation stages (§4.3). Early return on first action taken.

use std::time::Duration;

use modbridge_types::command_timer::{Command, Timer};
use modbridge_types::ids::UserGuid;
use modbridge_types::profanity::ProfanityConfigExtended;

use crate::worker::room_state::RoomCounters;
use std::collections::HashMap;

use super::matcher::MatcherCache;

/// Everything the pipeline needs about the current message and the entity
/// it arrived in, already resolved by the caller (worker). No I/O happens
/// inside `evaluate` -- webhook dispatch, delete, and mute are performed by
/// the caller in response to the returned [`PipelineAction`].
pub struct ModerationInput<'a> {
    pub message_text: &'a str,
    pub author_guid: &'a UserGuid,
    pub profanity: Option<&'a ProfanityConfigExtended>,
    pub effective_words: &'a [String],
    pub read_only: bool,
    pub timers: &'a [Timer],
    pub timer_counter_max: u32,
    pub commands: &'a HashMap<String, Command>,
    pub read_only_mute_duration: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineAction {
    /// Stage A hit: the message violates a banned word.
    BannedWord {
        matched_word: String,
        reply: Option<String>,
        webhook_url: Option<String>,
        webhook_message: Option<String>,
        mute: Option<Duration>,
    },
    /// Stage B hit: read-only room, non-exempt author.
    ReadOnly { mute: Duration },
    /// Stage C hit: timer rotation fired.
    Timer { index: usize, timer: Timer },
    /// Stage D hit: a `!command` matched.
    Command { command: Command },
}

fn is_exempt(author_guid: &UserGuid, profanity: Option<&ProfanityConfigExtended>) -> bool {
    profanity
        .map(|p| p.manager_guids.iter().any(|g| g == author_guid))
        .unwrap_or(false)
}

/// Run stages A-D in order against one inbound groupchat message, stopping
/// at the first action. `counters` is mutated in place (the message count
/// always advances for Stage C's accounting once reached).
pub fn evaluate(
    input: ModerationInput<'_>,
    matcher_cache: &MatcherCache,
    counters: &mut RoomCounters,
) -> Option<PipelineAction> {
    let lowered = input.message_text.to_lowercase();

    // Stage A: banned words.
    if let Some(profanity) = input.profanity {
        if profanity.config.active && !is_exempt(input.author_guid, input.profanity) {
            for word in input.effective_words {
                let matcher = matcher_cache.get_or_compile(word);
                if matcher.is_match(&lowered) {
                    return Some(PipelineAction::BannedWord {
                        matched_word: word.clone(),
                        reply: profanity.config.reply_message.clone(),
                        webhook_url: profanity.config.discord_webhook_url.clone(),
                        webhook_message: profanity.config.custom_webhook_message.clone(),
                        mute: profanity.config.mute_duration(),
                    });
                }
            }
        }
    }

    // Stage B: read-only mode.
    if input.read_only && !is_exempt(input.author_guid, input.profanity) {
        return Some(PipelineAction::ReadOnly {
            mute: input.read_only_mute_duration,
        });
    }

    // Stage C: timer tick (runs regardless of manager exemption).
    if let Some((index, timer)) = counters.tick(input.timers, input.timer_counter_max) {
        return Some(PipelineAction::Timer {
            index,
            timer: timer.clone(),
        });
    }

    // Stage D: command dispatch.
    if let Some(rest) = input.message_text.strip_prefix('!') {
        let key = rest.trim().to_lowercase();
        if let Some(command) = input.commands.get(&key) {
            return Some(PipelineAction::Command {
                command: command.clone(),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use modbridge_types::ids::EntityGuid;
    use modbridge_types::profanity::ProfanityConfig;

    fn profanity_cfg(words: Vec<&str>, managers: Vec<&str>) -> ProfanityConfigExtended {
        ProfanityConfigExtended {
            config: ProfanityConfig {
                entity_guid: EntityGuid::from("e1"),
                preset_id: None,
                custom_words: words.into_iter().map(String::from).collect(),
                discord_webhook_url: Some("https://discord.example/hook".into()),
                custom_webhook_message: None,
                reply_message: Some("please stop".into()),
                mute_duration_seconds: 60,
                active: true,
            },
            manager_guids: managers.into_iter().map(Into::into).collect(),
        }
    }

    fn base_input<'a>(
        text: &'a str,
        author: &'a UserGuid,
        profanity: Option<&'a ProfanityConfigExtended>,
        words: &'a [String],
    ) -> ModerationInput<'a> {
        ModerationInput {
            message_text: text,
            author_guid: author,
            profanity,
            effective_words: words,
            read_only: false,
            timers: &[],
            timer_counter_max: 100,
            commands: {
                static EMPTY: std::sync::OnceLock<HashMap<String, Command>> = std::sync::OnceLock::new();
                EMPTY.get_or_init(HashMap::new)
            },
            read_only_mute_duration: Duration::from_secs(10),
        }
    }

    #[test]
    fn banned_word_hit_with_evasion() {
        let cfg = profanity_cfg(vec!["badword"], vec!["m1"]);
        let words = cfg.config.custom_words.clone();
        let author = UserGuid::from("u1");
        let cache = MatcherCache::new();
        let mut counters = RoomCounters::new();
        let input = base_input("this is b a d w o r d indeed", &author, Some(&cfg), &words);
        let action = evaluate(input, &cache, &mut counters);
        match action {
            Some(PipelineAction::BannedWord { mute, reply, .. }) => {
                assert_eq!(mute, Some(Duration::from_secs(60)));
                assert_eq!(reply, Some("please stop".to_string()));
            }
            other => panic!("expected BannedWord, got {other:?}"),
        }
    }

    #[test]
    fn manager_author_is_exempt_from_banned_words() {
        let cfg = profanity_cfg(vec!["badword"], vec!["m1"]);
        let words = cfg.config.custom_words.clone();
        let manager = UserGuid::from("m1");
        let cache = MatcherCache::new();
        let mut counters = RoomCounters::new();
        let input = base_input("badword here", &manager, Some(&cfg), &words);
        assert_eq!(evaluate(input, &cache, &mut counters), None);
    }

    #[test]
    fn read_only_blocks_non_exempt_author() {
        let author = UserGuid::from("u1");
        let cache = MatcherCache::new();
        let mut counters = RoomCounters::new();
        let mut input = base_input("hi", &author, None, &[]);
        input.read_only = true;
        let action = evaluate(input, &cache, &mut counters);
        assert_eq!(action, Some(PipelineAction::ReadOnly { mute: Duration::from_secs(10) }));
    }

    #[test]
    fn command_dispatch_after_no_earlier_action() {
        let author = UserGuid::from("u1");
        let cache = MatcherCache::new();
        let mut counters = RoomCounters::new();
        let mut commands = HashMap::new();
        commands.insert(
            "ping".to_string(),
            Command {
                trigger: "ping".into(),
                response: "pong".into(),
                attachment_id: None,
            },
        );
        let input = ModerationInput {
            message_text: "!ping",
            author_guid: &author,
            profanity: None,
            effective_words: &[],
            read_only: false,
            timers: &[],
            timer_counter_max: 100,
            commands: &commands,
            read_only_mute_duration: Duration::from_secs(10),
        };
        let action = evaluate(input, &cache, &mut counters);
        assert!(matches!(action, Some(PipelineAction::Command { command }) if command.response == "pong"));
    }

    #[test]
    fn at_most_one_action_per_message() {
        // Read-only AND a command-shaped message AND timer overflow all line
        // up; only the read-only (earlier stage) action should surface.
        let author = UserGuid::from("u1");
        let cache = MatcherCache::new();
        let mut counters = RoomCounters::new();
        let mut input = base_input("!ping", &author, None, &[]);
        input.read_only = true;
        let action = evaluate(input, &cache, &mut counters);
        assert!(matches!(action, Some(PipelineAction::ReadOnly { .. })));
    }
}
