//! XMPP stanza construction and classification (§4.1.1, §4.2, §6).
//!
//! Stanzas are built as plain strings (the wire dialect beyond these shapes
//! is explicitly out of scope, §1) and parsed with `quick-xml`'s pull reader.
//! Parsing only recognizes the handful of shapes the worker must react to;
//! anything else comes back as `Inbound::Unrecognized`.

use modbridge_types::ids::EntityGuid;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use modbridge_core::worker::outgoing_queue::Addressed;

/// A stanza queued for delivery, carrying the entity it targets (if any) so
/// `OutgoingQueue` can suppress it for non-existent/debounced entities.
#[derive(Debug, Clone)]
pub struct OutgoingStanza {
    pub xml: String,
    pub target_entity: Option<EntityGuid>,
}

impl Addressed for OutgoingStanza {
    fn target_entity(&self) -> Option<&EntityGuid> {
        self.target_entity.as_ref()
    }
}

fn untargeted(xml: String) -> OutgoingStanza {
    OutgoingStanza { xml, target_entity: None }
}

fn targeted(xml: String, entity: EntityGuid) -> OutgoingStanza {
    OutgoingStanza { xml, target_entity: Some(entity) }
}

/// MUC-Light configuration query, issued on session establishment and on
/// entity assignment/update (§4.1.1, §4.1.4).
pub fn muc_light_config_query(id: &str, room_jid: &str, entity: EntityGuid) -> OutgoingStanza {
    let xml = format!(
        "<iq type='get' id='{id}' to='{}'><query xmlns='urn:xmpp:muclight:0#configuration'/></iq>",
        escape(room_jid)
    );
    targeted(xml, entity)
}

/// Supergroup subscribe/unsubscribe (§6).
pub fn supergroup_subscribe(id: &str, presence_group_jid: &str, subscribe: bool, entity: EntityGuid) -> OutgoingStanza {
    let xml = format!(
        "<iq type='set' id='{id}' to='{}'><query xmlns='faceit:supergroup:group:0'><subscribe set='{}'/></query></iq>",
        escape(presence_group_jid),
        if subscribe { "true" } else { "false" }
    );
    targeted(xml, entity)
}

/// Ping result, sent in reply to an inbound ping request (§4.2 point 1).
pub fn ping_result(id: &str, to: &str) -> OutgoingStanza {
    untargeted(format!("<iq type='result' id='{id}' to='{}'/>", escape(to)))
}

/// `feature-not-implemented` error, sent so the upstream stops retrying an
/// unrecognized IQ get (§4.2 point 3).
pub fn feature_not_implemented(id: &str, to: &str) -> OutgoingStanza {
    untargeted(format!(
        "<iq type='error' id='{id}' to='{}'><error type='cancel'><feature-not-implemented xmlns='urn:ietf:params:xml:ns:xmpp-stanzas'/></error></iq>",
        escape(to)
    ))
}

/// Groupchat message, used for command/timer replies and welcome messages.
pub fn groupchat_message(id: &str, to: &str, body: &str, attachment_id: Option<&str>, entity: EntityGuid) -> OutgoingStanza {
    let attachment = attachment_id
        .map(|img_id| format!("<x xmlns='msg:upload:1'><img id='{}'/></x>", escape(img_id)))
        .unwrap_or_default();
    let xml = format!(
        "<message type='groupchat' id='{id}' to='{}'><body>{}</body>{attachment}</message>",
        escape(to),
        escape(body)
    );
    targeted(xml, entity)
}

/// Direct message, used for welcome messages to a newly joined member.
pub fn direct_message(id: &str, to: &str, body: &str, entity: EntityGuid) -> OutgoingStanza {
    let xml = format!(
        "<message type='chat' id='{id}' to='{}'><body>{}</body></message>",
        escape(to),
        escape(body)
    );
    targeted(xml, entity)
}

/// Global presence, sent once on session establishment (§4.1.1 step 4).
pub fn initial_presence(id: &str) -> OutgoingStanza {
    untargeted(format!("<presence id='{id}'/>"))
}

/// Classified shape of an inbound stanza the worker must react to (§4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    PingRequest { id: String, from: String },
    MucLightConfigResult { from: String, presence_group: Option<String> },
    EntityNotFound { from: String },
    IqOtherGet { id: String, from: String },
    GroupchatMessage { id: String, from: String, author: Option<String>, body: String, attachment_id: Option<String>, delayed: bool },
    PresenceAddedMember { from: String, member: String },
    /// SASL `<failure>` carrying `<not-authorized/>` (§4.1.1, §7 AuthExpired).
    AuthFailure,
    Unrecognized,
}

/// Parse a single top-level XMPP stanza. Best-effort: malformed input yields
/// `Unrecognized` rather than an error, matching §7's "errors from inbound
/// handling never tear down the session."
pub fn classify(xml: &str) -> Inbound {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root_name = String::new();
    let mut root_type = String::new();
    let mut from = String::new();
    let mut id = String::new();
    let mut has_ping = false;
    let mut has_muc_light_query = false;
    let mut has_muc_light_error = false;
    let mut has_not_authorized = false;
    let mut error_code: Option<u16> = None;
    let mut presence_group: Option<String> = None;
    let mut body: Option<String> = None;
    let mut attachment_id: Option<String> = None;
    let mut delayed = false;
    let mut author: Option<String> = None;
    let mut in_presence_group_tag = false;
    let mut depth = 0i32;

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                if depth == 0 {
                    root_name = name.clone();
                    for attr in e.attributes().flatten() {
                        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                        let value = attr.unescape_value().unwrap_or_default().to_string();
                        match key.as_str() {
                            "type" => root_type = value,
                            "from" => from = value,
                            "id" => id = value,
                            _ => {}
                        }
                    }
                } else {
                    match name.as_str() {
                        "ping" => has_ping = true,
                        "query" => {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"xmlns" {
                                    let ns = attr.unescape_value().unwrap_or_default().to_string();
                                    if ns == "urn:xmpp:muclight:0#configuration" {
                                        has_muc_light_query = true;
                                    }
                                }
                            }
                        }
                        "error" => has_muc_light_error = true,
                        "not-authorized" => has_not_authorized = true,
                        "item-not-found" | "gone" => error_code = Some(404),
                        "presence-group" => in_presence_group_tag = true,
                        "delay" => delayed = true,
                        "img" => {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"id" {
                                    attachment_id = Some(attr.unescape_value().unwrap_or_default().to_string());
                                }
                            }
                        }
                        "x" => {}
                        "item" if root_name == "presence" => {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"jid" {
                                    author = Some(attr.unescape_value().unwrap_or_default().to_string());
                                }
                            }
                        }
                        _ => {}
                    }
                }
                depth += 1;
            }
            Ok(Event::Text(t)) => {
                if in_presence_group_tag {
                    presence_group = Some(t.unescape().unwrap_or_default().to_string());
                } else if root_name == "message" {
                    body = Some(t.unescape().unwrap_or_default().to_string());
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "presence-group" {
                    in_presence_group_tag = false;
                }
                depth -= 1;
            }
            Ok(_) => {}
            Err(_) => return Inbound::Unrecognized,
        }
    }

    match root_name.as_str() {
        "failure" if has_not_authorized => Inbound::AuthFailure,
        "iq" if has_ping && root_type == "get" => Inbound::PingRequest { id, from },
        "iq" if has_muc_light_error && error_code == Some(404) => Inbound::EntityNotFound { from },
        "iq" if has_muc_light_query && root_type == "result" => {
            Inbound::MucLightConfigResult { from, presence_group }
        }
        "iq" if root_type == "get" => Inbound::IqOtherGet { id, from },
        "message" if root_type == "groupchat" => Inbound::GroupchatMessage {
            id,
            from,
            author,
            body: body.unwrap_or_default(),
            attachment_id,
            delayed,
        },
        "presence" if author.is_some() => Inbound::PresenceAddedMember {
            from,
            member: author.unwrap_or_default(),
        },
        _ => Inbound::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_ping_request() {
        let xml = "<iq type='get' id='p1' from='server'><ping xmlns='urn:xmpp:ping'/></iq>";
        assert_eq!(
            classify(xml),
            Inbound::PingRequest { id: "p1".into(), from: "server".into() }
        );
    }

    #[test]
    fn classifies_muc_light_config_result() {
        let xml = "<iq type='result' from='room@muc' id='q1'><query xmlns='urn:xmpp:muclight:0#configuration'><presence-group>club-e1@sg/general</presence-group></query></iq>";
        match classify(xml) {
            Inbound::MucLightConfigResult { presence_group, .. } => {
                assert_eq!(presence_group.as_deref(), Some("club-e1@sg/general"));
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn classifies_entity_not_found() {
        let xml = "<iq type='error' from='club-eX-general@muc' id='e1'><error type='cancel'><item-not-found xmlns='urn:ietf:params:xml:ns:xmpp-stanzas'/></error></iq>";
        assert_eq!(classify(xml), Inbound::EntityNotFound { from: "club-eX-general@muc".into() });
    }

    #[test]
    fn classifies_groupchat_message_with_delay() {
        let xml = "<message type='groupchat' id='m1' from='room@muc'><delay xmlns='urn:xmpp:delay' stamp='2020-01-01T00:00:00Z'/><body>hello</body></message>";
        match classify(xml) {
            Inbound::GroupchatMessage { delayed, body, .. } => {
                assert!(delayed);
                assert_eq!(body, "hello");
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn classifies_other_iq_get_as_unimplemented_candidate() {
        let xml = "<iq type='get' id='x1' from='server'><vCard xmlns='vcard-temp'/></iq>";
        assert_eq!(classify(xml), Inbound::IqOtherGet { id: "x1".into(), from: "server".into() });
    }

    #[test]
    fn classifies_sasl_auth_failure() {
        let xml = "<failure xmlns='urn:ietf:params:xml:ns:xmpp-sasl'><not-authorized/></failure>";
        assert_eq!(classify(xml), Inbound::AuthFailure);
    }

    #[test]
    fn malformed_xml_is_unrecognized_not_an_error() {
        assert_eq!(classify("<iq type='get'"), Inbound::Unrecognized);
    }

    #[test]
    fn build_muc_light_query_escapes_and_targets_entity() {
        let stanza = muc_light_config_query("q1", "club-e1-general@muc", EntityGuid::from("e1"));
        assert!(stanza.xml.contains("urn:xmpp:muclight:0#configuration"));
        assert_eq!(stanza.target_entity, Some(EntityGuid::from("e1")));
    }
}
