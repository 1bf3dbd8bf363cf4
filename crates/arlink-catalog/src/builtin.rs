//! Built-in message catalog.
//!
//! Covers the subset of the upstream definition tables this engine drives:
//! the `common` and `ardrone3` projects, the `skyctrl` project, and the
//! feature-style `drone_manager` tables. Identities match the upstream ids;
//! unsupported messages simply resolve to nothing and are skipped on receive.

use crate::catalog::MessageCatalog;
use crate::schema::{AckClass, ArgKind, ArgSpec, EventContent, Expectation, MessageSchema};

/// Feature ids for the built-in tables.
pub const PROJECT_COMMON: u8 = 0;
pub const PROJECT_ARDRONE3: u8 = 1;
pub const PROJECT_SKYCTRL: u8 = 4;
pub const FEATURE_DRONE_MANAGER: u8 = 137;

fn arg(name: &'static str, kind: ArgKind) -> ArgSpec {
    ArgSpec::new(name, kind)
}

fn common(catalog: &mut MessageCatalog) {
    use AckClass::WithAck;
    let f = "common";

    // Settings (class 2) / SettingsState (class 3)
    catalog
        .insert(MessageSchema::command(
            (PROJECT_COMMON, 2, 0),
            f,
            "Settings",
            "AllSettings",
            WithAck,
            Some(Expectation::new(PROJECT_COMMON, 3, 0)),
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::command(
            (PROJECT_COMMON, 2, 1),
            f,
            "Settings",
            "Reset",
            WithAck,
            Some(Expectation::new(PROJECT_COMMON, 3, 1)),
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_COMMON, 3, 0),
            f,
            "SettingsState",
            "AllSettingsChanged",
            EventContent::Plain,
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_COMMON, 3, 1),
            f,
            "SettingsState",
            "ResetChanged",
            EventContent::Plain,
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_COMMON, 3, 2),
            f,
            "SettingsState",
            "ProductNameChanged",
            EventContent::Plain,
            vec![arg("name", ArgKind::String)],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_COMMON, 3, 3),
            f,
            "SettingsState",
            "ProductVersionChanged",
            EventContent::Plain,
            vec![
                arg("software", ArgKind::String),
                arg("hardware", ArgKind::String),
            ],
        ))
        .unwrap();

    // Common (class 4) / CommonState (class 5)
    catalog
        .insert(MessageSchema::command(
            (PROJECT_COMMON, 4, 0),
            f,
            "Common",
            "AllStates",
            WithAck,
            Some(Expectation::new(PROJECT_COMMON, 5, 0)),
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::command(
            (PROJECT_COMMON, 4, 1),
            f,
            "Common",
            "CurrentDate",
            WithAck,
            None,
            vec![arg("date", ArgKind::String)],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::command(
            (PROJECT_COMMON, 4, 2),
            f,
            "Common",
            "CurrentTime",
            WithAck,
            None,
            vec![arg("time", ArgKind::String)],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::command(
            (PROJECT_COMMON, 4, 3),
            f,
            "Common",
            "Reboot",
            WithAck,
            None,
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_COMMON, 5, 0),
            f,
            "CommonState",
            "AllStatesChanged",
            EventContent::Plain,
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_COMMON, 5, 1),
            f,
            "CommonState",
            "BatteryStateChanged",
            EventContent::Plain,
            vec![arg("percent", ArgKind::U8)],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_COMMON, 5, 2),
            f,
            "CommonState",
            "MassStorageStateListChanged",
            EventContent::ListItem,
            vec![
                arg("mass_storage_id", ArgKind::U8),
                arg("name", ArgKind::String),
                arg("list_flags", ArgKind::U8),
            ],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_COMMON, 5, 7),
            f,
            "CommonState",
            "WifiSignalChanged",
            EventContent::Plain,
            vec![arg("rssi", ArgKind::I16)],
        ))
        .unwrap();

    // Mavlink (class 11) / MavlinkState (class 12)
    let mavlink_type = || ArgKind::Enum(vec!["flightPlan", "mapMyHouse"]);
    catalog
        .insert(MessageSchema::command(
            (PROJECT_COMMON, 11, 0),
            f,
            "Mavlink",
            "Start",
            WithAck,
            None,
            vec![arg("filepath", ArgKind::String), arg("type", mavlink_type())],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::command(
            (PROJECT_COMMON, 11, 1),
            f,
            "Mavlink",
            "Pause",
            WithAck,
            None,
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::command(
            (PROJECT_COMMON, 11, 2),
            f,
            "Mavlink",
            "Stop",
            WithAck,
            None,
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_COMMON, 12, 0),
            f,
            "MavlinkState",
            "MavlinkFilePlayingStateChanged",
            EventContent::Plain,
            vec![
                arg(
                    "state",
                    ArgKind::Enum(vec!["playing", "stopped", "paused", "loaded"]),
                ),
                arg("filepath", ArgKind::String),
                arg("type", mavlink_type()),
            ],
        ))
        .unwrap();

    // Calibration (class 13) / CalibrationState (class 14)
    catalog
        .insert(MessageSchema::command(
            (PROJECT_COMMON, 13, 0),
            f,
            "Calibration",
            "MagnetoCalibration",
            WithAck,
            None,
            vec![arg("calibrate", ArgKind::U8)],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::command(
            (PROJECT_COMMON, 13, 1),
            f,
            "Calibration",
            "PitotCalibration",
            WithAck,
            None,
            vec![arg("calibrate", ArgKind::U8)],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_COMMON, 14, 3),
            f,
            "CalibrationState",
            "MagnetoCalibrationStartedChanged",
            EventContent::Plain,
            vec![arg("started", ArgKind::U8)],
        ))
        .unwrap();

    // Factory (class 30)
    catalog
        .insert(MessageSchema::command(
            (PROJECT_COMMON, 30, 0),
            f,
            "Factory",
            "Reset",
            WithAck,
            None,
            vec![],
        ))
        .unwrap();
}

fn ardrone3(catalog: &mut MessageCatalog) {
    use AckClass::{HighPrio, NoAck, WithAck};
    let f = "ardrone3";

    // Piloting (class 0)
    catalog
        .insert(MessageSchema::command(
            (PROJECT_ARDRONE3, 0, 0),
            f,
            "Piloting",
            "FlatTrim",
            WithAck,
            None,
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::command(
            (PROJECT_ARDRONE3, 0, 1),
            f,
            "Piloting",
            "TakeOff",
            WithAck,
            None,
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::command(
            (PROJECT_ARDRONE3, 0, 2),
            f,
            "Piloting",
            "PCMD",
            NoAck,
            None,
            vec![
                arg("flag", ArgKind::U8),
                arg("roll", ArgKind::I8),
                arg("pitch", ArgKind::I8),
                arg("yaw", ArgKind::I8),
                arg("gaz", ArgKind::I8),
                arg("timestampAndSeqNum", ArgKind::U32),
            ],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::command(
            (PROJECT_ARDRONE3, 0, 3),
            f,
            "Piloting",
            "Landing",
            WithAck,
            None,
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::command(
            (PROJECT_ARDRONE3, 0, 4),
            f,
            "Piloting",
            "Emergency",
            HighPrio,
            None,
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::command(
            (PROJECT_ARDRONE3, 0, 5),
            f,
            "Piloting",
            "NavigateHome",
            WithAck,
            None,
            vec![arg("start", ArgKind::U8)],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::command(
            (PROJECT_ARDRONE3, 0, 7),
            f,
            "Piloting",
            "moveBy",
            WithAck,
            Some(Expectation::new(PROJECT_ARDRONE3, 34, 0)),
            vec![
                arg("dX", ArgKind::Float),
                arg("dY", ArgKind::Float),
                arg("dZ", ArgKind::Float),
                arg("dPsi", ArgKind::Float),
            ],
        ))
        .unwrap();

    // PilotingState (class 4)
    catalog
        .insert(MessageSchema::event(
            (PROJECT_ARDRONE3, 4, 0),
            f,
            "PilotingState",
            "FlatTrimChanged",
            EventContent::Plain,
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_ARDRONE3, 4, 1),
            f,
            "PilotingState",
            "FlyingStateChanged",
            EventContent::Plain,
            vec![arg(
                "state",
                ArgKind::Enum(vec![
                    "landed",
                    "takingoff",
                    "hovering",
                    "flying",
                    "landing",
                    "emergency",
                    "usertakeoff",
                    "motor_ramping",
                    "emergency_landing",
                ]),
            )],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_ARDRONE3, 4, 2),
            f,
            "PilotingState",
            "AlertStateChanged",
            EventContent::Plain,
            vec![arg(
                "state",
                ArgKind::Enum(vec![
                    "none",
                    "user",
                    "cut_out",
                    "critical_battery",
                    "low_battery",
                    "too_much_angle",
                ]),
            )],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_ARDRONE3, 4, 4),
            f,
            "PilotingState",
            "PositionChanged",
            EventContent::Plain,
            vec![
                arg("latitude", ArgKind::Double),
                arg("longitude", ArgKind::Double),
                arg("altitude", ArgKind::Double),
            ],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_ARDRONE3, 4, 5),
            f,
            "PilotingState",
            "SpeedChanged",
            EventContent::Plain,
            vec![
                arg("speedX", ArgKind::Float),
                arg("speedY", ArgKind::Float),
                arg("speedZ", ArgKind::Float),
            ],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_ARDRONE3, 4, 6),
            f,
            "PilotingState",
            "AttitudeChanged",
            EventContent::Plain,
            vec![
                arg("roll", ArgKind::Float),
                arg("pitch", ArgKind::Float),
                arg("yaw", ArgKind::Float),
            ],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_ARDRONE3, 4, 8),
            f,
            "PilotingState",
            "AltitudeChanged",
            EventContent::Plain,
            vec![arg("altitude", ArgKind::Double)],
        ))
        .unwrap();

    // PilotingEvent (class 34)
    catalog
        .insert(MessageSchema::event(
            (PROJECT_ARDRONE3, 34, 0),
            f,
            "PilotingEvent",
            "moveByEnd",
            EventContent::Plain,
            vec![
                arg("dX", ArgKind::Float),
                arg("dY", ArgKind::Float),
                arg("dZ", ArgKind::Float),
                arg("dPsi", ArgKind::Float),
                arg(
                    "error",
                    ArgKind::Enum(vec![
                        "ok",
                        "unknown",
                        "busy",
                        "notAvailable",
                        "interrupted",
                    ]),
                ),
            ],
        ))
        .unwrap();
}

fn skyctrl(catalog: &mut MessageCatalog) {
    use AckClass::WithAck;
    let f = "skyctrl";

    catalog
        .insert(MessageSchema::command(
            (PROJECT_SKYCTRL, 4, 0),
            f,
            "Settings",
            "AllSettings",
            WithAck,
            Some(Expectation::new(PROJECT_SKYCTRL, 5, 0)),
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_SKYCTRL, 5, 0),
            f,
            "SettingsState",
            "AllSettingsChanged",
            EventContent::Plain,
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::command(
            (PROJECT_SKYCTRL, 6, 0),
            f,
            "Common",
            "AllStates",
            WithAck,
            Some(Expectation::new(PROJECT_SKYCTRL, 7, 0)),
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_SKYCTRL, 7, 0),
            f,
            "CommonState",
            "AllStatesChanged",
            EventContent::Plain,
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_SKYCTRL, 8, 0),
            f,
            "SkyControllerState",
            "BatteryChanged",
            EventContent::Plain,
            vec![arg("percent", ArgKind::U8)],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_SKYCTRL, 8, 2),
            f,
            "SkyControllerState",
            "GpsPositionChanged",
            EventContent::Plain,
            vec![
                arg("latitude", ArgKind::Double),
                arg("longitude", ArgKind::Double),
                arg("altitude", ArgKind::Double),
                arg("heading", ArgKind::Float),
            ],
        ))
        .unwrap();

    // CoPiloting (class 23) / CoPilotingState (class 24)
    let piloting_source = || ArgKind::Enum(vec!["SkyController", "Controller"]);
    catalog
        .insert(MessageSchema::command(
            (PROJECT_SKYCTRL, 23, 0),
            f,
            "CoPiloting",
            "setPilotingSource",
            WithAck,
            Some(Expectation::new(PROJECT_SKYCTRL, 24, 0)),
            vec![arg("source", piloting_source())],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::event(
            (PROJECT_SKYCTRL, 24, 0),
            f,
            "CoPilotingState",
            "pilotingSource",
            EventContent::Plain,
            vec![arg("source", piloting_source())],
        ))
        .unwrap();
}

fn drone_manager(catalog: &mut MessageCatalog) {
    use AckClass::WithAck;
    let f = "drone_manager";
    let security = || ArgKind::Enum(vec!["none", "wpa2"]);

    catalog
        .insert(MessageSchema::flat_command(
            (FEATURE_DRONE_MANAGER, 0, 1),
            f,
            "discover_drones",
            WithAck,
            Some(Expectation::new(FEATURE_DRONE_MANAGER, 0, 2)),
            vec![],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::flat_event(
            (FEATURE_DRONE_MANAGER, 0, 2),
            f,
            "drone_list_item",
            EventContent::MapItem("serial"),
            vec![
                arg("serial", ArgKind::String),
                arg("model", ArgKind::U16),
                arg("name", ArgKind::String),
                arg("connection_order", ArgKind::U8),
                arg("active", ArgKind::U8),
                arg("visible", ArgKind::U8),
                arg("security", security()),
                arg("saved_key", ArgKind::U8),
                arg("rssi", ArgKind::I8),
                arg("list_flags", ArgKind::U8),
            ],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::flat_command(
            (FEATURE_DRONE_MANAGER, 0, 3),
            f,
            "connect",
            WithAck,
            Some(Expectation::new(FEATURE_DRONE_MANAGER, 0, 4)),
            vec![arg("serial", ArgKind::String), arg("key", ArgKind::String)],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::flat_event(
            (FEATURE_DRONE_MANAGER, 0, 4),
            f,
            "connection_state",
            EventContent::Plain,
            vec![
                arg(
                    "state",
                    ArgKind::Enum(vec![
                        "idle",
                        "searching",
                        "connecting",
                        "connected",
                        "disconnecting",
                    ]),
                ),
                arg("serial", ArgKind::String),
                arg("model", ArgKind::U16),
            ],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::flat_command(
            (FEATURE_DRONE_MANAGER, 0, 7),
            f,
            "forget",
            WithAck,
            Some(Expectation::new(FEATURE_DRONE_MANAGER, 0, 8)),
            vec![arg("serial", ArgKind::String)],
        ))
        .unwrap();
    catalog
        .insert(MessageSchema::flat_event(
            (FEATURE_DRONE_MANAGER, 0, 8),
            f,
            "known_drone_item",
            EventContent::MapItem("serial"),
            vec![
                arg("serial", ArgKind::String),
                arg("model", ArgKind::U16),
                arg("name", ArgKind::String),
                arg("security", security()),
                arg("saved_key", ArgKind::U8),
                arg("list_flags", ArgKind::U8),
            ],
        ))
        .unwrap();
}

/// Build the embedded catalog.
pub fn builtin() -> MessageCatalog {
    let mut catalog = MessageCatalog::new();
    common(&mut catalog);
    ardrone3(&mut catalog);
    skyctrl(&mut catalog);
    drone_manager(&mut catalog);
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MessageKind;
    use crate::value::{ArgValue, Params};

    #[test]
    fn builtin_resolves_core_paths() {
        let catalog = builtin();
        for path in [
            "common.Common.AllStates",
            "common.Settings.AllSettings",
            "ardrone3.Piloting.TakeOff",
            "ardrone3.Piloting.PCMD",
            "skyctrl.Settings.AllSettings",
            "drone_manager.discover_drones",
            "drone_manager.connect",
        ] {
            assert!(catalog.resolve_path(path).is_ok(), "missing {path}");
        }
    }

    #[test]
    fn paths_and_identities_agree() {
        let catalog = builtin();
        for schema in catalog.iter() {
            let resolved = catalog.resolve(schema.identity()).unwrap();
            assert_eq!(resolved.path, schema.path);
        }
    }

    #[test]
    fn all_states_expects_all_states_changed() {
        let catalog = builtin();
        let cmd = catalog.resolve_path("common.Common.AllStates").unwrap();
        let expect = cmd.expects().unwrap();
        let evt = catalog
            .resolve((expect.feature_id, expect.class_id, expect.message_id))
            .unwrap();
        assert_eq!(evt.path, "common.CommonState.AllStatesChanged");
    }

    #[test]
    fn emergency_rides_the_high_priority_channel() {
        let catalog = builtin();
        let emergency = catalog.resolve_path("ardrone3.Piloting.Emergency").unwrap();
        match emergency.kind {
            MessageKind::Command { ack, .. } => assert_eq!(ack, AckClass::HighPrio),
            _ => panic!("Emergency must be a command"),
        }
        let pcmd = catalog.resolve_path("ardrone3.Piloting.PCMD").unwrap();
        match pcmd.kind {
            MessageKind::Command { ack, .. } => assert_eq!(ack, AckClass::NoAck),
            _ => panic!("PCMD must be a command"),
        }
    }

    #[test]
    fn drone_list_item_is_keyed_by_serial() {
        let catalog = builtin();
        let item = catalog.resolve_path("drone_manager.drone_list_item").unwrap();
        match &item.kind {
            MessageKind::Event { content } => {
                assert_eq!(*content, EventContent::MapItem("serial"));
            }
            _ => panic!("drone_list_item must be an event"),
        }
        assert!(item.flat);
    }

    #[test]
    fn pcmd_round_trips_through_its_schema() {
        let catalog = builtin();
        let pcmd = catalog.resolve_path("ardrone3.Piloting.PCMD").unwrap();
        let params = Params::new()
            .with("flag", 1u8)
            .with("roll", -20i8)
            .with("pitch", 15i8)
            .with("yaw", 0i8)
            .with("gaz", 50i8)
            .with("timestampAndSeqNum", 0u32);

        let message = pcmd.message(&params).unwrap();
        assert_eq!(message.feature_id, PROJECT_ARDRONE3);
        assert_eq!(pcmd.decode(&message.args).unwrap(), params);
    }

    #[test]
    fn flying_state_decodes_to_a_name() {
        let catalog = builtin();
        let evt = catalog
            .resolve_path("ardrone3.PilotingState.FlyingStateChanged")
            .unwrap();
        let params = evt.decode(&[2, 0, 0, 0]).unwrap();
        assert_eq!(params.get("state"), Some(&ArgValue::Enum("hovering".into())));
    }
}
