//! Wire protocol between the arena client and the game server.
//!
//! Every frame is a single line of text of the form `<TypeName>:<json>`. The
//! type tag is decoded once and matched against the known message kinds, so two
//! payloads with similar shapes can never be confused with each other.

use crate::Point;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("message has no type tag")]
    MissingTag,
    #[error("unknown message type `{0}`")]
    UnknownTag(String),
    #[error("malformed {tag} payload: {source}")]
    Malformed {
        tag: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {tag} payload: {reason}")]
    Invalid {
        tag: &'static str,
        reason: &'static str,
    },
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Field-level checks applied after a payload has been deserialized.
trait Validate {
    fn validate(&self) -> Result<(), &'static str>;
}

/// Decodes one record of a batch, or drops it if it is malformed or invalid.
fn decode_record<T>(tag: &'static str, record: serde_json::Value) -> Option<T>
where
    T: DeserializeOwned + Validate,
{
    let value: T = match serde_json::from_value(record) {
        Ok(value) => value,
        Err(e) => {
            debug!("Dropping malformed {} record: {}", tag, e);
            return None;
        }
    };
    match value.validate() {
        Ok(()) => Some(value),
        Err(reason) => {
            debug!("Dropping invalid {} record: {}", tag, reason);
            None
        }
    }
}

fn decode_records<T>(tag: &'static str, records: Vec<serde_json::Value>) -> Vec<T>
where
    T: DeserializeOwned + Validate,
{
    records
        .into_iter()
        .filter_map(|record| decode_record(tag, record))
        .collect()
}

fn initial_players<'de, D>(deserializer: D) -> Result<Vec<ServerPlayerUpdate>, D::Error>
where
    D: Deserializer<'de>,
{
    let records = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(decode_records(ServerMessage::INITIAL_PLAYER_LIST, records))
}

fn finite(value: f32) -> Result<(), &'static str> {
    if value.is_finite() {
        Ok(())
    } else {
        Err("non-finite number")
    }
}

fn finite_opt(value: Option<f32>) -> Result<(), &'static str> {
    value.map_or(Ok(()), finite)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerPlayerUpdate {
    pub player_name: String,
    pub pos_x: f32,
    pub pos_y: f32,
}

impl ServerPlayerUpdate {
    pub fn position(&self) -> Point {
        Point::new(self.pos_x, self.pos_y)
    }
}

impl Validate for ServerPlayerUpdate {
    fn validate(&self) -> Result<(), &'static str> {
        finite(self.pos_x)?;
        finite(self.pos_y)
    }
}

/// Lifecycle stage carried by bullet and NPC records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletState {
    Created,
    Updated,
    Destroyed,
}

impl BulletState {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(BulletState::Created),
            1 => Some(BulletState::Updated),
            2 => Some(BulletState::Destroyed),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            BulletState::Created => 0,
            BulletState::Updated => 1,
            BulletState::Destroyed => 2,
        }
    }
}

fn validate_lifecycle(
    state: u8,
    position: (Option<f32>, Option<f32>),
    velocity: (Option<f32>, Option<f32>),
) -> Result<(), &'static str> {
    finite_opt(position.0)?;
    finite_opt(position.1)?;
    finite_opt(velocity.0)?;
    finite_opt(velocity.1)?;

    let has_position = position.0.is_some() && position.1.is_some();
    match BulletState::from_code(state) {
        Some(BulletState::Created | BulletState::Updated) if !has_position => {
            Err("missing position")
        }
        Some(_) => Ok(()),
        None => Err("unknown state code"),
    }
}

/// Server record describing one bullet. Update and destroy records leave out
/// the fields the client already knows, so most of them are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletInfo {
    #[serde(default)]
    pub owner: Option<String>,
    pub bullet_id: u64,
    #[serde(default)]
    pub position_x: Option<f32>,
    #[serde(default)]
    pub position_y: Option<f32>,
    #[serde(default)]
    pub velocity_x: Option<f32>,
    #[serde(default)]
    pub velocity_y: Option<f32>,
    pub state: u8,
}

impl BulletInfo {
    pub fn created(owner: &str, bullet_id: u64, position: Point, velocity: Point) -> Self {
        Self {
            owner: Some(owner.to_string()),
            bullet_id,
            position_x: Some(position.x),
            position_y: Some(position.y),
            velocity_x: Some(velocity.x),
            velocity_y: Some(velocity.y),
            state: BulletState::Created.code(),
        }
    }

    pub fn updated(bullet_id: u64, position: Point) -> Self {
        Self {
            owner: None,
            bullet_id,
            position_x: Some(position.x),
            position_y: Some(position.y),
            velocity_x: None,
            velocity_y: None,
            state: BulletState::Updated.code(),
        }
    }

    pub fn destroyed(bullet_id: u64) -> Self {
        Self {
            owner: None,
            bullet_id,
            position_x: None,
            position_y: None,
            velocity_x: None,
            velocity_y: None,
            state: BulletState::Destroyed.code(),
        }
    }

    /// Only meaningful on validated records.
    pub fn state(&self) -> Option<BulletState> {
        BulletState::from_code(self.state)
    }

    pub fn position(&self) -> Option<Point> {
        Some(Point::new(self.position_x?, self.position_y?))
    }

    pub fn velocity(&self) -> Point {
        Point::new(
            self.velocity_x.unwrap_or_default(),
            self.velocity_y.unwrap_or_default(),
        )
    }
}

impl Validate for BulletInfo {
    fn validate(&self) -> Result<(), &'static str> {
        if self.state == BulletState::Created.code() && self.owner.is_none() {
            return Err("created bullet without owner");
        }
        validate_lifecycle(
            self.state,
            (self.position_x, self.position_y),
            (self.velocity_x, self.velocity_y),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcInfo {
    pub npc_id: u64,
    #[serde(default)]
    pub position_x: Option<f32>,
    #[serde(default)]
    pub position_y: Option<f32>,
    #[serde(default)]
    pub velocity_x: Option<f32>,
    #[serde(default)]
    pub velocity_y: Option<f32>,
    pub state: u8,
}

impl NpcInfo {
    pub fn state(&self) -> Option<BulletState> {
        BulletState::from_code(self.state)
    }

    pub fn position(&self) -> Option<Point> {
        Some(Point::new(self.position_x?, self.position_y?))
    }

    pub fn velocity(&self) -> Point {
        Point::new(
            self.velocity_x.unwrap_or_default(),
            self.velocity_y.unwrap_or_default(),
        )
    }

    /// Velocity carried by the record, falling back per axis to `current`
    /// where the server left it out.
    pub fn velocity_or(&self, current: Point) -> Point {
        Point::new(
            self.velocity_x.unwrap_or(current.x),
            self.velocity_y.unwrap_or(current.y),
        )
    }
}

impl Validate for NpcInfo {
    fn validate(&self) -> Result<(), &'static str> {
        validate_lifecycle(
            self.state,
            (self.position_x, self.position_y),
            (self.velocity_x, self.velocity_y),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerListChange {
    pub username: String,
    pub joined: bool,
}

impl Validate for PlayerListChange {
    fn validate(&self) -> Result<(), &'static str> {
        if self.username.is_empty() {
            return Err("empty username");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsUpdate {
    pub username: String,
    pub num_points: i64,
}

impl Validate for PointsUpdate {
    fn validate(&self) -> Result<(), &'static str> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerHealthMessage {
    pub username: String,
    pub health: f32,
    pub affected_by: String,
}

impl Validate for PlayerHealthMessage {
    fn validate(&self) -> Result<(), &'static str> {
        finite(self.health)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialPlayerList {
    #[serde(default, deserialize_with = "initial_players")]
    pub players: Vec<ServerPlayerUpdate>,
}

impl Validate for InitialPlayerList {
    // Players are checked one by one while deserializing.
    fn validate(&self) -> Result<(), &'static str> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialServerJoinState {
    pub initial_username: String,
    pub authentication_string: String,
    pub initial_location_x: f32,
    pub initial_location_y: f32,
}

impl InitialServerJoinState {
    pub fn location(&self) -> Point {
        Point::new(self.initial_location_x, self.initial_location_y)
    }
}

impl Validate for InitialServerJoinState {
    fn validate(&self) -> Result<(), &'static str> {
        if self.initial_username.is_empty() {
            return Err("empty username");
        }
        finite(self.initial_location_x)?;
        finite(self.initial_location_y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerUsernameRequestStatus {
    pub status: String,
    pub message: String,
}

impl ServerUsernameRequestStatus {
    pub fn succeeded(&self) -> bool {
        self.status == "success"
    }
}

impl Validate for ServerUsernameRequestStatus {
    fn validate(&self) -> Result<(), &'static str> {
        Ok(())
    }
}

/// Periodic report of the local player's intent, sent every few frames.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInputStateUpdate {
    pub moving_up: bool,
    pub moving_down: bool,
    pub moving_left: bool,
    pub moving_right: bool,
    pub angle: f32,
    pub shooting: bool,
    pub username: String,
    pub auth_string: String,
}

impl Validate for ClientInputStateUpdate {
    fn validate(&self) -> Result<(), &'static str> {
        finite(self.angle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameChangeRequest {
    pub old_username: String,
    pub new_username: String,
    pub authentication_string: String,
}

impl Validate for UsernameChangeRequest {
    fn validate(&self) -> Result<(), &'static str> {
        if self.new_username.is_empty() {
            return Err("empty username");
        }
        Ok(())
    }
}

/// Messages sent by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    PlayerUpdates(Vec<ServerPlayerUpdate>),
    BulletInfos(Vec<BulletInfo>),
    NpcInfos(Vec<NpcInfo>),
    PlayerListChange(PlayerListChange),
    PointsUpdate(PointsUpdate),
    PlayerHealth(PlayerHealthMessage),
    InitialPlayerList(InitialPlayerList),
    InitialServerJoinState(InitialServerJoinState),
    UsernameRequestStatus(ServerUsernameRequestStatus),
}

impl ServerMessage {
    pub const PLAYER_UPDATES: &'static str = "ServerPlayerUpdate[]";
    pub const BULLET_INFOS: &'static str = "BulletInfo[]";
    pub const NPC_INFOS: &'static str = "NpcInfo[]";
    pub const PLAYER_LIST_CHANGE: &'static str = "PlayerListChange";
    pub const POINTS_UPDATE: &'static str = "PointsUpdate";
    pub const PLAYER_HEALTH: &'static str = "PlayerHealthMessage";
    pub const INITIAL_PLAYER_LIST: &'static str = "InitialPlayerList";
    pub const INITIAL_JOIN_STATE: &'static str = "InitialServerJoinState";
    pub const USERNAME_REQUEST_STATUS: &'static str = "ServerUsernameRequestStatus";

    pub fn tag(&self) -> &'static str {
        match self {
            ServerMessage::PlayerUpdates(_) => Self::PLAYER_UPDATES,
            ServerMessage::BulletInfos(_) => Self::BULLET_INFOS,
            ServerMessage::NpcInfos(_) => Self::NPC_INFOS,
            ServerMessage::PlayerListChange(_) => Self::PLAYER_LIST_CHANGE,
            ServerMessage::PointsUpdate(_) => Self::POINTS_UPDATE,
            ServerMessage::PlayerHealth(_) => Self::PLAYER_HEALTH,
            ServerMessage::InitialPlayerList(_) => Self::INITIAL_PLAYER_LIST,
            ServerMessage::InitialServerJoinState(_) => Self::INITIAL_JOIN_STATE,
            ServerMessage::UsernameRequestStatus(_) => Self::USERNAME_REQUEST_STATUS,
        }
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let (tag, payload) = split_tag(text)?;
        let message = match tag {
            Self::PLAYER_UPDATES => {
                ServerMessage::PlayerUpdates(parse_batch(Self::PLAYER_UPDATES, payload)?)
            }
            Self::BULLET_INFOS => {
                ServerMessage::BulletInfos(parse_batch(Self::BULLET_INFOS, payload)?)
            }
            Self::NPC_INFOS => ServerMessage::NpcInfos(parse_batch(Self::NPC_INFOS, payload)?),
            Self::PLAYER_LIST_CHANGE => {
                ServerMessage::PlayerListChange(parse(Self::PLAYER_LIST_CHANGE, payload)?)
            }
            Self::POINTS_UPDATE => {
                ServerMessage::PointsUpdate(parse(Self::POINTS_UPDATE, payload)?)
            }
            Self::PLAYER_HEALTH => ServerMessage::PlayerHealth(parse(Self::PLAYER_HEALTH, payload)?),
            Self::INITIAL_PLAYER_LIST => {
                ServerMessage::InitialPlayerList(parse(Self::INITIAL_PLAYER_LIST, payload)?)
            }
            Self::INITIAL_JOIN_STATE => {
                ServerMessage::InitialServerJoinState(parse(Self::INITIAL_JOIN_STATE, payload)?)
            }
            Self::USERNAME_REQUEST_STATUS => ServerMessage::UsernameRequestStatus(parse(
                Self::USERNAME_REQUEST_STATUS,
                payload,
            )?),
            other => return Err(ProtocolError::UnknownTag(other.to_string())),
        };
        Ok(message)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        let payload = match self {
            ServerMessage::PlayerUpdates(updates) => serde_json::to_string(updates)?,
            ServerMessage::BulletInfos(infos) => serde_json::to_string(infos)?,
            ServerMessage::NpcInfos(infos) => serde_json::to_string(infos)?,
            ServerMessage::PlayerListChange(change) => serde_json::to_string(change)?,
            ServerMessage::PointsUpdate(points) => serde_json::to_string(points)?,
            ServerMessage::PlayerHealth(health) => serde_json::to_string(health)?,
            ServerMessage::InitialPlayerList(list) => serde_json::to_string(list)?,
            ServerMessage::InitialServerJoinState(state) => serde_json::to_string(state)?,
            ServerMessage::UsernameRequestStatus(status) => serde_json::to_string(status)?,
        };
        Ok(format!("{}:{}", self.tag(), payload))
    }
}

/// Messages sent by the client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    InputState(ClientInputStateUpdate),
    UsernameChange(UsernameChangeRequest),
}

impl ClientMessage {
    pub const INPUT_STATE: &'static str = "ClientInputStateUpdate";
    pub const USERNAME_CHANGE: &'static str = "UsernameChangeRequest";

    pub fn tag(&self) -> &'static str {
        match self {
            ClientMessage::InputState(_) => Self::INPUT_STATE,
            ClientMessage::UsernameChange(_) => Self::USERNAME_CHANGE,
        }
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let (tag, payload) = split_tag(text)?;
        match tag {
            Self::INPUT_STATE => Ok(ClientMessage::InputState(parse(Self::INPUT_STATE, payload)?)),
            Self::USERNAME_CHANGE => Ok(ClientMessage::UsernameChange(parse(
                Self::USERNAME_CHANGE,
                payload,
            )?)),
            other => Err(ProtocolError::UnknownTag(other.to_string())),
        }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        let payload = match self {
            ClientMessage::InputState(state) => serde_json::to_string(state)?,
            ClientMessage::UsernameChange(request) => serde_json::to_string(request)?,
        };
        Ok(format!("{}:{}", self.tag(), payload))
    }
}

fn split_tag(text: &str) -> Result<(&str, &str), ProtocolError> {
    let text = text.trim();
    let (tag, payload) = text.split_once(':').ok_or(ProtocolError::MissingTag)?;

    let well_formed = !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '[' || c == ']');
    if !well_formed {
        return Err(ProtocolError::MissingTag);
    }

    Ok((tag, payload))
}

fn parse<T>(tag: &'static str, payload: &str) -> Result<T, ProtocolError>
where
    T: DeserializeOwned + Validate,
{
    let value: T =
        serde_json::from_str(payload).map_err(|source| ProtocolError::Malformed { tag, source })?;
    value
        .validate()
        .map_err(|reason| ProtocolError::Invalid { tag, reason })?;
    Ok(value)
}

/// Decodes a JSON array payload record by record. Only a payload that is not
/// an array at all fails the whole frame.
fn parse_batch<T>(tag: &'static str, payload: &str) -> Result<Vec<T>, ProtocolError>
where
    T: DeserializeOwned + Validate,
{
    let records: Vec<serde_json::Value> =
        serde_json::from_str(payload).map_err(|source| ProtocolError::Malformed { tag, source })?;
    Ok(decode_records(tag, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_decode_player_updates() {
        let text = r#"ServerPlayerUpdate[]:[{"playerName":"alice","posX":12.5,"posY":-3.0}]"#;
        match ServerMessage::decode(text).unwrap() {
            ServerMessage::PlayerUpdates(updates) => {
                assert_eq!(updates.len(), 1);
                assert_eq!(updates[0].player_name, "alice");
                assert_approx_eq!(updates[0].pos_x, 12.5);
                assert_approx_eq!(updates[0].pos_y, -3.0);
            }
            other => panic!("Wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_decode_sparse_bullet_records() {
        let text = concat!(
            r#"BulletInfo[]:[{"owner":null,"bulletId":7,"positionX":1.0,"positionY":2.0,"#,
            r#""velocityX":null,"velocityY":null,"state":1},"#,
            r#"{"bulletId":8,"state":2}]"#
        );
        match ServerMessage::decode(text).unwrap() {
            ServerMessage::BulletInfos(infos) => {
                assert_eq!(infos[0].state(), Some(BulletState::Updated));
                assert_eq!(infos[0].position(), Some(Point::new(1.0, 2.0)));
                assert_eq!(infos[0].velocity(), Point::new(0.0, 0.0));
                assert_eq!(infos[1].state(), Some(BulletState::Destroyed));
                assert_eq!(infos[1].position(), None);
            }
            other => panic!("Wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_decode_drops_unknown_bullet_state() {
        let text = r#"BulletInfo[]:[{"bulletId":8,"state":3},{"bulletId":9,"state":2}]"#;
        match ServerMessage::decode(text).unwrap() {
            ServerMessage::BulletInfos(infos) => {
                assert_eq!(infos.len(), 1);
                assert_eq!(infos[0].bullet_id, 9);
            }
            other => panic!("Wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_decode_drops_created_bullet_without_owner() {
        let orphan = BulletInfo {
            owner: None,
            ..BulletInfo::created("x", 1, Point::default(), Point::default())
        };
        let good = BulletInfo::created("bob", 2, Point::new(3.0, 4.0), Point::new(1.0, 0.0));
        let text = ServerMessage::BulletInfos(vec![orphan, good.clone()])
            .encode()
            .unwrap();
        match ServerMessage::decode(&text).unwrap() {
            ServerMessage::BulletInfos(infos) => assert_eq!(infos, vec![good]),
            other => panic!("Wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_bad_records_do_not_drop_the_batch() {
        let text = concat!(
            r#"NpcInfo[]:[{"npcId":1,"state":0,"positionX":1.0},"#,
            r#"{"npcId":"two","state":2},"#,
            r#"{"npcId":3,"state":0,"positionX":5.0,"positionY":6.0,"velocityX":1.0,"velocityY":0.0}]"#
        );
        match ServerMessage::decode(text).unwrap() {
            ServerMessage::NpcInfos(infos) => {
                assert_eq!(infos.len(), 1);
                assert_eq!(infos[0].npc_id, 3);
                assert_eq!(infos[0].position(), Some(Point::new(5.0, 6.0)));
            }
            other => panic!("Wrong message type: {:?}", other),
        }

        let text = concat!(
            r#"InitialPlayerList:{"players":[{"playerName":"bob","posX":1.0,"posY":2.0},"#,
            r#"{"playerName":"carol","posX":"far"}]}"#
        );
        match ServerMessage::decode(text).unwrap() {
            ServerMessage::InitialPlayerList(list) => {
                assert_eq!(list.players.len(), 1);
                assert_eq!(list.players[0].player_name, "bob");
            }
            other => panic!("Wrong message type: {:?}", other),
        }

        assert!(matches!(
            ServerMessage::decode(r#"BulletInfo[]:{"bulletId":1}"#),
            Err(ProtocolError::Malformed { .. })
        ));
    }

    #[test]
    fn test_decode_untagged_json_is_rejected() {
        let text = r#"{"username":"bob","joined":true}"#;
        assert!(matches!(
            ServerMessage::decode(text),
            Err(ProtocolError::MissingTag)
        ));
        assert!(matches!(
            ServerMessage::decode("no separator here"),
            Err(ProtocolError::MissingTag)
        ));
    }

    #[test]
    fn test_decode_unknown_tag() {
        match ServerMessage::decode("Teleport:{}") {
            Err(ProtocolError::UnknownTag(tag)) => assert_eq!(tag, "Teleport"),
            other => panic!("Expected unknown tag error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_malformed_payload() {
        assert!(matches!(
            ServerMessage::decode("PointsUpdate:{\"username\":\"a\"}"),
            Err(ProtocolError::Malformed { .. })
        ));
    }

    #[test]
    fn test_tag_disambiguates_identical_shapes() {
        // A points update and a health message could both carry `username`,
        // only the tag decides how the payload is read.
        let text = r#"PlayerHealthMessage:{"username":"a","health":0,"affectedBy":"b","numPoints":3}"#;
        assert!(matches!(
            ServerMessage::decode(text).unwrap(),
            ServerMessage::PlayerHealth(_)
        ));
    }

    #[test]
    fn test_input_state_round_trip() {
        let state = ClientInputStateUpdate {
            moving_up: true,
            moving_down: false,
            moving_left: false,
            moving_right: true,
            angle: -1.2345678,
            shooting: true,
            username: "alice".to_string(),
            auth_string: "token".to_string(),
        };

        let text = ClientMessage::InputState(state.clone()).encode().unwrap();
        assert!(text.starts_with("ClientInputStateUpdate:{"));
        assert!(text.contains("\"movingUp\":true"));
        assert!(text.contains("\"authString\":\"token\""));

        match ClientMessage::decode(&text).unwrap() {
            ClientMessage::InputState(decoded) => assert_eq!(decoded, state),
            other => panic!("Wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_angle_rejected() {
        let text = r#"ClientInputStateUpdate:{"movingUp":false,"movingDown":false,"movingLeft":false,"movingRight":false,"angle":1e999,"shooting":false,"username":"a","authString":"t"}"#;
        assert!(ClientMessage::decode(text).is_err());
    }

    #[test]
    fn test_username_status() {
        let text = r#"ServerUsernameRequestStatus:{"status":"success","message":"carol"}"#;
        match ServerMessage::decode(text).unwrap() {
            ServerMessage::UsernameRequestStatus(status) => {
                assert!(status.succeeded());
                assert_eq!(status.message, "carol");
            }
            other => panic!("Wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_trailing_newline_is_ignored() {
        let text = "PlayerListChange:{\"username\":\"bob\",\"joined\":false}\n";
        assert_eq!(
            ServerMessage::decode(text).unwrap(),
            ServerMessage::PlayerListChange(PlayerListChange {
                username: "bob".to_string(),
                joined: false,
            })
        );
    }
}
