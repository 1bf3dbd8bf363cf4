//! Feature facades.
//!
//! [`Feature`] is the closed set of device feature groups this client
//! drives. Each variant has a typed facade borrowing the connection;
//! facade methods are thin wrappers over [`Connection::send_command`]
//! with the schema path and argument names filled in.

use std::time::{Duration, Instant};

use tracing::debug;

use arlink_catalog::{ArgValue, Params};
use arlink_transport::DatagramLink;

use crate::connection::Connection;
use crate::error::Result;
use crate::queue::CommandHandle;

/// Probe deadline for [`Connection::has_feature`]; shorter than a full
/// command timeout so presence checks stay snappy.
const PROBE_TIMEOUT: Duration = Duration::from_millis(2000);

/// The device feature groups with built-in support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Common,
    Ardrone3,
    SkyCtrl,
    DroneManager,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::Common,
        Feature::Ardrone3,
        Feature::SkyCtrl,
        Feature::DroneManager,
    ];

    /// Catalog feature name.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Common => "common",
            Feature::Ardrone3 => "ardrone3",
            Feature::SkyCtrl => "skyctrl",
            Feature::DroneManager => "drone_manager",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Feature::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Non-destructive command whose success implies the feature exists.
    fn probe_path(self) -> &'static str {
        match self {
            Feature::Common => "common.Common.AllStates",
            // Drones answer the common settings dump; a controller that
            // lacks ardrone3 leaves it unanswered.
            Feature::Ardrone3 => "common.Settings.AllSettings",
            Feature::SkyCtrl => "skyctrl.Settings.AllSettings",
            Feature::DroneManager => "drone_manager.discover_drones",
        }
    }
}

impl<L: DatagramLink> Connection<L> {
    /// Whether the connected device exposes `feature`.
    ///
    /// True as soon as any property for the feature has been observed;
    /// otherwise the probe command is sent and the loop is driven until it
    /// settles. Probe failure (timeout, refusal, closed link) is a plain
    /// `false`, never an error.
    pub fn has_feature(&mut self, feature: Feature) -> bool {
        if self.state().observed(feature.name()) {
            return true;
        }

        let handle = match self.send_command_with_timeout(
            feature.probe_path(),
            Params::new(),
            Some(PROBE_TIMEOUT),
        ) {
            Ok(handle) => handle,
            Err(err) => {
                debug!(feature = feature.name(), %err, "feature probe not sent");
                return false;
            }
        };

        // The probe may sit behind earlier commands; allow one extra
        // timeout's worth of queue drain before giving up.
        let deadline = Instant::now() + PROBE_TIMEOUT * 2;
        loop {
            if let Some(outcome) = handle.try_result() {
                return outcome.is_ok();
            }
            if Instant::now() >= deadline {
                return false;
            }
            if self.poll(Duration::from_millis(20)).is_err() {
                return false;
            }
        }
    }

    pub fn common(&mut self) -> CommonFacade<'_, L> {
        CommonFacade { conn: self }
    }

    pub fn ardrone3(&mut self) -> Ardrone3Facade<'_, L> {
        Ardrone3Facade { conn: self }
    }

    pub fn skyctrl(&mut self) -> SkyCtrlFacade<'_, L> {
        SkyCtrlFacade { conn: self }
    }

    pub fn drone_manager(&mut self) -> DroneManagerFacade<'_, L> {
        DroneManagerFacade { conn: self }
    }
}

/// `common` project commands.
pub struct CommonFacade<'a, L: DatagramLink> {
    conn: &'a mut Connection<L>,
}

impl<L: DatagramLink> CommonFacade<'_, L> {
    /// Request the full state dump.
    pub fn all_states(&mut self) -> Result<CommandHandle> {
        self.conn.send_command("common.Common.AllStates", Params::new())
    }

    /// Request the full settings dump.
    pub fn all_settings(&mut self) -> Result<CommandHandle> {
        self.conn
            .send_command("common.Settings.AllSettings", Params::new())
    }

    /// Push the controller's date, ISO `YYYY-MM-DD`.
    pub fn set_current_date(&mut self, date: &str) -> Result<CommandHandle> {
        self.conn
            .send_command("common.Common.CurrentDate", Params::new().with("date", date))
    }

    /// Push the controller's time, ISO `THHMMSS+0000` style.
    pub fn set_current_time(&mut self, time: &str) -> Result<CommandHandle> {
        self.conn
            .send_command("common.Common.CurrentTime", Params::new().with("time", time))
    }

    pub fn reboot(&mut self) -> Result<CommandHandle> {
        self.conn.send_command("common.Common.Reboot", Params::new())
    }

    /// Wipe the device back to factory settings.
    pub fn factory_reset(&mut self) -> Result<CommandHandle> {
        self.conn.send_command("common.Factory.Reset", Params::new())
    }

    /// Start a mavlink file; `kind` is `"flightPlan"` or `"mapMyHouse"`.
    pub fn mavlink_start(&mut self, filepath: &str, kind: &str) -> Result<CommandHandle> {
        self.conn.send_command(
            "common.Mavlink.Start",
            Params::new()
                .with("filepath", filepath)
                .with("type", ArgValue::Enum(kind.to_string())),
        )
    }

    pub fn mavlink_pause(&mut self) -> Result<CommandHandle> {
        self.conn.send_command("common.Mavlink.Pause", Params::new())
    }

    pub fn mavlink_stop(&mut self) -> Result<CommandHandle> {
        self.conn.send_command("common.Mavlink.Stop", Params::new())
    }

    /// Start (`true`) or abort (`false`) magnetometer calibration.
    pub fn magneto_calibration(&mut self, calibrate: bool) -> Result<CommandHandle> {
        self.conn.send_command(
            "common.Calibration.MagnetoCalibration",
            Params::new().with("calibrate", u8::from(calibrate)),
        )
    }

    /// Start (`true`) or abort (`false`) pitot calibration.
    pub fn pitot_calibration(&mut self, calibrate: bool) -> Result<CommandHandle> {
        self.conn.send_command(
            "common.Calibration.PitotCalibration",
            Params::new().with("calibrate", u8::from(calibrate)),
        )
    }
}

/// `ardrone3` piloting commands.
pub struct Ardrone3Facade<'a, L: DatagramLink> {
    conn: &'a mut Connection<L>,
}

impl<L: DatagramLink> Ardrone3Facade<'_, L> {
    pub fn flat_trim(&mut self) -> Result<CommandHandle> {
        self.conn
            .send_command("ardrone3.Piloting.FlatTrim", Params::new())
    }

    pub fn take_off(&mut self) -> Result<CommandHandle> {
        self.conn
            .send_command("ardrone3.Piloting.TakeOff", Params::new())
    }

    pub fn land(&mut self) -> Result<CommandHandle> {
        self.conn
            .send_command("ardrone3.Piloting.Landing", Params::new())
    }

    pub fn emergency(&mut self) -> Result<CommandHandle> {
        self.conn
            .send_command("ardrone3.Piloting.Emergency", Params::new())
    }

    pub fn navigate_home(&mut self, start: bool) -> Result<CommandHandle> {
        self.conn.send_command(
            "ardrone3.Piloting.NavigateHome",
            Params::new().with("start", u8::from(start)),
        )
    }

    /// Piloting setpoint. Angles are percentages of the configured maxima
    /// in `[-100, 100]`; `flag` zero makes the device ignore roll/pitch.
    pub fn pcmd(
        &mut self,
        flag: bool,
        roll: i8,
        pitch: i8,
        yaw: i8,
        gaz: i8,
        timestamp: u32,
    ) -> Result<CommandHandle> {
        self.conn.send_command(
            "ardrone3.Piloting.PCMD",
            Params::new()
                .with("flag", u8::from(flag))
                .with("roll", roll)
                .with("pitch", pitch)
                .with("yaw", yaw)
                .with("gaz", gaz)
                .with("timestampAndSeqNum", timestamp),
        )
    }

    /// Relative displacement in meters / radians.
    pub fn move_by(&mut self, dx: f32, dy: f32, dz: f32, dpsi: f32) -> Result<CommandHandle> {
        self.conn.send_command(
            "ardrone3.Piloting.moveBy",
            Params::new()
                .with("dX", dx)
                .with("dY", dy)
                .with("dZ", dz)
                .with("dPsi", dpsi),
        )
    }
}

/// `skyctrl` controller commands.
pub struct SkyCtrlFacade<'a, L: DatagramLink> {
    conn: &'a mut Connection<L>,
}

impl<L: DatagramLink> SkyCtrlFacade<'_, L> {
    pub fn all_settings(&mut self) -> Result<CommandHandle> {
        self.conn
            .send_command("skyctrl.Settings.AllSettings", Params::new())
    }

    pub fn all_states(&mut self) -> Result<CommandHandle> {
        self.conn
            .send_command("skyctrl.Common.AllStates", Params::new())
    }

    /// Route piloting input; `source` is `"SkyController"` or `"Controller"`.
    pub fn set_piloting_source(&mut self, source: &str) -> Result<CommandHandle> {
        self.conn.send_command(
            "skyctrl.CoPiloting.setPilotingSource",
            Params::new().with("source", ArgValue::Enum(source.to_string())),
        )
    }
}

/// `drone_manager` commands (pairing through a controller).
pub struct DroneManagerFacade<'a, L: DatagramLink> {
    conn: &'a mut Connection<L>,
}

impl<L: DatagramLink> DroneManagerFacade<'_, L> {
    /// List visible and known drones; resolves with the full map stream.
    pub fn discover_drones(&mut self) -> Result<CommandHandle> {
        self.conn
            .send_command("drone_manager.discover_drones", Params::new())
    }

    /// Pair with a drone by serial; `key` is the WPA2 passphrase, empty
    /// for open networks.
    pub fn connect(&mut self, serial: &str, key: &str) -> Result<CommandHandle> {
        self.conn.send_command(
            "drone_manager.connect",
            Params::new().with("serial", serial).with("key", key),
        )
    }

    pub fn forget(&mut self, serial: &str) -> Result<CommandHandle> {
        self.conn
            .send_command("drone_manager.forget", Params::new().with("serial", serial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arlink_frame::{decode_frame, FrameType, Message};
    use arlink_frame::channel::{C2D_CMD_HIGHPRIO, C2D_CMD_NOACK, D2C_CMD_WITHACK};
    use arlink_frame::{encode_frame, Frame};
    use arlink_transport::MockLink;
    use bytes::BytesMut;

    fn connection() -> Connection<MockLink> {
        Connection::with_builtin_catalog(MockLink::new())
    }

    fn sent_frame(conn: &Connection<MockLink>, n: usize) -> Frame {
        let mut buf = BytesMut::from(&conn.link().sent()[n][..]);
        decode_frame(&mut buf).unwrap().unwrap()
    }

    #[test]
    fn facade_calls_hit_the_right_channels() {
        let mut conn = connection();
        conn.ardrone3()
            .pcmd(true, 0, 50, 0, 0, 1)
            .unwrap();
        conn.ardrone3().emergency().unwrap();

        assert_eq!(sent_frame(&conn, 0).channel_id, C2D_CMD_NOACK);
        assert_eq!(sent_frame(&conn, 1).channel_id, C2D_CMD_HIGHPRIO);
    }

    #[test]
    fn take_off_resolves_fire_and_forget() {
        let mut conn = connection();
        let handle = conn.ardrone3().take_off().unwrap();
        assert!(handle.try_result().unwrap().unwrap().is_empty());

        let message = Message::decode(sent_frame(&conn, 0).payload).unwrap();
        assert!(message.matches(1, 0, 1));
    }

    #[test]
    fn feature_names_round_trip() {
        for feature in Feature::ALL {
            assert_eq!(Feature::from_name(feature.name()), Some(feature));
        }
        assert_eq!(Feature::from_name("bebop"), None);
    }

    #[test]
    fn observed_traffic_short_circuits_the_probe() {
        let mut conn = connection();
        let schema = conn
            .catalog()
            .resolve_path("common.CommonState.BatteryStateChanged")
            .unwrap();
        let params = Params::new().with("percent", 50u8);
        let message = schema.message(&params).unwrap();
        let mut buf = BytesMut::new();
        encode_frame(
            &Frame::new(FrameType::Data, D2C_CMD_WITHACK, 0, message.encode()),
            &mut buf,
        );
        conn.link_mut().push_inbound(buf.to_vec());
        conn.poll(Duration::ZERO).unwrap();

        // No probe goes out: the ack was the only datagram sent.
        let before = conn.link().sent().len();
        assert!(conn.has_feature(Feature::Common));
        assert_eq!(conn.link().sent().len(), before);
    }

    #[test]
    fn mavlink_start_encodes_the_type_by_name() {
        let mut conn = connection();
        conn.common()
            .mavlink_start("/data/plan.mavlink", "flightPlan")
            .unwrap();

        let message = Message::decode(sent_frame(&conn, 0).payload).unwrap();
        let schema = conn.catalog().resolve_path("common.Mavlink.Start").unwrap();
        let params = schema.decode(&message.args).unwrap();
        assert_eq!(
            params.get("filepath"),
            Some(&ArgValue::Str("/data/plan.mavlink".into()))
        );
        assert_eq!(
            params.get("type"),
            Some(&ArgValue::Enum("flightPlan".into()))
        );
    }

    #[test]
    fn probe_timeout_means_feature_absent() {
        let mut conn = connection();
        // MockLink never answers; the probe must settle to false.
        assert!(!conn.has_feature(Feature::SkyCtrl));
        assert!(conn.is_open());
    }
}
