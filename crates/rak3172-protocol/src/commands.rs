//! Commands that can be sent to the RAK3172 module.
//!
//! The AT interface supports several categories of commands:
//! - Parameter set/query commands (`AT+<NAME>=<value>` / `AT+<NAME>=?`)
//! - Network commands (join, send)
//! - Power management commands (sleep, low power mode)

/// Parameter names addressable via `AT+<NAME>=` / `AT+<NAME>=?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtKey {
    /// Global end-device identifier (`DEVEUI`)
    DevEui,
    /// Global application identifier (`APPEUI`)
    AppEui,
    /// Application key (`APPKEY`)
    AppKey,
    /// Application session key (`APPSKEY`)
    AppSKey,
    /// Network session key (`NWKSKEY`)
    NwkSKey,
    /// Device address (`DEVADDR`)
    DevAddr,
    /// Network identifier (`NETID`)
    NetId,
    /// Network work mode, 1 = LoRaWAN (`NWM`)
    WorkMode,
    /// Network join mode, 0 = ABP, 1 = OTAA (`NJM`)
    JoinMode,
    /// Network join state (`NJS`)
    JoinState,
    /// Regional frequency band (`BAND`)
    Band,
    /// Channel mask (`MASK`)
    ChannelMask,
    /// Device class A/B/C (`CLASS`)
    Class,
    /// Adaptive data rate switch (`ADR`)
    Adr,
    /// Duty cycle switch (`DCS`)
    DutyCycle,
    /// Remaining duty cycle time (`DUTYTIME`)
    DutyTime,
    /// Data rate (`DR`)
    DataRate,
    /// Transmit power (`TXP`)
    TxPower,
    /// Receive window 1 delay (`RX1DL`)
    Rx1Delay,
    /// Receive window 2 delay (`RX2DL`)
    Rx2Delay,
    /// Receive window 2 data rate (`RX2DR`)
    Rx2DataRate,
    /// Receive window 2 frequency (`RX2FQ`)
    Rx2Frequency,
    /// Join receive window 1 delay (`JN1DL`)
    JoinRx1Delay,
    /// Join receive window 2 delay (`JN2DL`)
    JoinRx2Delay,
    /// Confirmed uplink switch (`CFM`)
    Confirm,
    /// Retransmission count for confirmed packets (`RETY`)
    Retransmission,
    /// Link check mode (`LINKCHECK`)
    LinkCheck,
    /// Listen-before-talk switch (`LBT`)
    Lbt,
    /// Add a multicast group (`ADDMULC`)
    AddMulticast,
    /// Remove a multicast group (`RMVMULC`)
    RemoveMulticast,
    /// List multicast groups (`LSTMULC`)
    ListMulticast,
    /// Serial baud rate (`BAUD`)
    Baud,
    /// Low power mode switch (`LPM`)
    LowPowerMode,
    /// Low power mode level (`LPMLVL`)
    LowPowerLevel,
    /// Device alias (`ALIAS`)
    Alias,
    /// Firmware version (`VER`)
    Version,
    /// Equipment serial number (`SN`)
    SerialNumber,
    /// Battery voltage (`BAT`)
    Battery,
    /// Firmware build time (`BUILDTIME`)
    BuildTime,
    /// Firmware repository info (`REPOINFO`)
    RepoInfo,
    /// CLI version (`CLIVER`)
    CliVersion,
    /// RUI API version (`APIVER`)
    ApiVersion,
    /// Hardware model (`HWMODEL`)
    HwModel,
    /// Hardware ID (`HWID`)
    HwId,
    /// System voltage (`SYSV`)
    SystemVoltage,
}

impl AtKey {
    /// Get the parameter name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            AtKey::DevEui => "DEVEUI",
            AtKey::AppEui => "APPEUI",
            AtKey::AppKey => "APPKEY",
            AtKey::AppSKey => "APPSKEY",
            AtKey::NwkSKey => "NWKSKEY",
            AtKey::DevAddr => "DEVADDR",
            AtKey::NetId => "NETID",
            AtKey::WorkMode => "NWM",
            AtKey::JoinMode => "NJM",
            AtKey::JoinState => "NJS",
            AtKey::Band => "BAND",
            AtKey::ChannelMask => "MASK",
            AtKey::Class => "CLASS",
            AtKey::Adr => "ADR",
            AtKey::DutyCycle => "DCS",
            AtKey::DutyTime => "DUTYTIME",
            AtKey::DataRate => "DR",
            AtKey::TxPower => "TXP",
            AtKey::Rx1Delay => "RX1DL",
            AtKey::Rx2Delay => "RX2DL",
            AtKey::Rx2DataRate => "RX2DR",
            AtKey::Rx2Frequency => "RX2FQ",
            AtKey::JoinRx1Delay => "JN1DL",
            AtKey::JoinRx2Delay => "JN2DL",
            AtKey::Confirm => "CFM",
            AtKey::Retransmission => "RETY",
            AtKey::LinkCheck => "LINKCHECK",
            AtKey::Lbt => "LBT",
            AtKey::AddMulticast => "ADDMULC",
            AtKey::RemoveMulticast => "RMVMULC",
            AtKey::ListMulticast => "LSTMULC",
            AtKey::Baud => "BAUD",
            AtKey::LowPowerMode => "LPM",
            AtKey::LowPowerLevel => "LPMLVL",
            AtKey::Alias => "ALIAS",
            AtKey::Version => "VER",
            AtKey::SerialNumber => "SN",
            AtKey::Battery => "BAT",
            AtKey::BuildTime => "BUILDTIME",
            AtKey::RepoInfo => "REPOINFO",
            AtKey::CliVersion => "CLIVER",
            AtKey::ApiVersion => "APIVER",
            AtKey::HwModel => "HWMODEL",
            AtKey::HwId => "HWID",
            AtKey::SystemVoltage => "SYSV",
        }
    }
}

/// Regional frequency plans accepted by `AT+BAND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// Europe 433 MHz
    Eu433,
    /// China 470 MHz
    Cn470,
    /// Russia 864 MHz
    Ru864,
    /// India 865 MHz
    In865,
    /// Europe 868 MHz
    Eu868,
    /// United States 915 MHz
    Us915,
    /// Australia 915 MHz
    Au915,
    /// South Korea 920 MHz
    Kr920,
    /// Asia 923 MHz, region 1
    As923_1,
    /// Asia 923 MHz, region 1 with Japan listen-before-talk
    As923_1JpLbt,
    /// Asia 923 MHz, region 2
    As923_2,
    /// Asia 923 MHz, region 3
    As923_3,
    /// Asia 923 MHz, region 4
    As923_4,
    /// Latin America 915 MHz
    La915,
}

impl Band {
    /// Get the band code used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Eu433 => "0",
            Band::Cn470 => "1",
            Band::Ru864 => "2",
            Band::In865 => "3",
            Band::Eu868 => "4",
            Band::Us915 => "5",
            Band::Au915 => "6",
            Band::Kr920 => "7",
            Band::As923_1 => "8",
            Band::As923_1JpLbt => "8-1-JP",
            Band::As923_2 => "8-2",
            Band::As923_3 => "8-3",
            Band::As923_4 => "8-4",
            Band::La915 => "12",
        }
    }
}

/// LoRaWAN device classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceClass {
    /// Class A: downlink only after an uplink transmission.
    #[default]
    A,
    /// Class B: periodic scheduled downlink windows.
    B,
    /// Class C: continuous listening for downlinks.
    C,
}

impl DeviceClass {
    /// Get the class letter used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::A => "A",
            DeviceClass::B => "B",
            DeviceClass::C => "C",
        }
    }
}

/// LoRaWAN network join modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinMode {
    /// Over-The-Air Activation (negotiated keys).
    #[default]
    Otaa,
    /// Activation By Personalization (pre-shared keys).
    Abp,
}

impl JoinMode {
    /// Get the `AT+NJM` code: 1 for OTAA, 0 for ABP.
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinMode::Otaa => "1",
            JoinMode::Abp => "0",
        }
    }
}

/// Link check modes for `AT+LINKCHECK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCheckMode {
    /// Link check disabled.
    Disabled,
    /// Link check on the next valid uplink.
    Once,
    /// Link check after every uplink.
    Always,
}

impl LinkCheckMode {
    /// Get the mode code used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkCheckMode::Disabled => "0",
            LinkCheckMode::Once => "1",
            LinkCheckMode::Always => "2",
        }
    }
}

/// Serial baud rates supported by the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaudRate {
    /// 115200 bps (module default).
    #[default]
    Bps115200,
    /// 9600 bps.
    Bps9600,
    /// 4800 bps.
    Bps4800,
}

impl BaudRate {
    /// Get the rate in bits per second.
    pub fn bps(&self) -> u32 {
        match self {
            BaudRate::Bps115200 => 115_200,
            BaudRate::Bps9600 => 9_600,
            BaudRate::Bps4800 => 4_800,
        }
    }
}

/// Low power mode levels for `AT+LPMLVL`.
///
/// Stop1 allows both UARTs to wake the module; Stop2 draws less current but
/// UART1 cannot wake it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LowPowerLevel {
    /// Stop1 mode.
    One,
    /// Stop2 mode.
    Two,
}

impl LowPowerLevel {
    /// Get the level code used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            LowPowerLevel::One => "1",
            LowPowerLevel::Two => "2",
        }
    }
}

/// Commands that can be sent to the module's AT interface.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Bare attention command (`AT`), used as a liveness probe.
    Ping,

    /// Set a parameter value (`AT+<KEY>=<value>`).
    Set {
        /// The parameter to set.
        key: AtKey,
        /// The value to set.
        value: String,
    },

    /// Query a parameter value (`AT+<KEY>=?`).
    Query {
        /// The parameter to read.
        key: AtKey,
    },

    /// Start or stop the OTAA join procedure
    /// (`AT+JOIN=<start>:<auto>:<interval>:<count>`).
    Join {
        /// 1 to start joining, 0 to stop.
        start: bool,
        /// Automatically join on module boot.
        auto_join: bool,
        /// Seconds between module-side retries (7-255).
        retry_interval: u8,
        /// Maximum module-side retry attempts (0-255).
        retry_count: u8,
    },

    /// Send a hex-encoded uplink payload (`AT+SEND=<port>:<hex>`).
    Send {
        /// Destination port (1-233).
        port: u8,
        /// Hex-encoded payload (2-500 hex digits).
        hex_payload: String,
    },

    /// Enter sleep mode (`AT+SLEEP[=<ms>]`); no argument sleeps until woken.
    Sleep {
        /// Sleep duration in milliseconds, or continuous sleep if `None`.
        duration_ms: Option<u32>,
    },

    /// Send a raw command string.
    Raw {
        /// The raw command text, without terminator.
        command: String,
    },
}

impl Command {
    /// Encode the command as bytes to send to the module, including the
    /// `\n` terminator.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = self.to_command_string().into_bytes();
        buf.push(b'\n');
        buf
    }

    /// Get the command string without the terminator.
    pub fn to_command_string(&self) -> String {
        match self {
            Command::Ping => "AT".to_string(),
            Command::Set { key, value } => format!("AT+{}={}", key.as_str(), value),
            Command::Query { key } => format!("AT+{}=?", key.as_str()),
            Command::Join { start, auto_join, retry_interval, retry_count } => format!(
                "AT+JOIN={}:{}:{}:{}",
                u8::from(*start),
                u8::from(*auto_join),
                retry_interval,
                retry_count
            ),
            Command::Send { port, hex_payload } => format!("AT+SEND={}:{}", port, hex_payload),
            Command::Sleep { duration_ms } => match duration_ms {
                Some(ms) => format!("AT+SLEEP={}", ms),
                None => "AT+SLEEP".to_string(),
            },
            Command::Raw { command } => command.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_ping() {
        assert_eq!(Command::Ping.encode(), b"AT\n");
    }

    #[test]
    fn test_encode_set() {
        let cmd = Command::Set { key: AtKey::DevEui, value: "0011223344556677".to_string() };
        assert_eq!(cmd.encode(), b"AT+DEVEUI=0011223344556677\n");
    }

    #[test]
    fn test_encode_query() {
        let cmd = Command::Query { key: AtKey::Version };
        assert_eq!(cmd.encode(), b"AT+VER=?\n");
    }

    #[test]
    fn test_encode_join() {
        let cmd = Command::Join {
            start: true,
            auto_join: false,
            retry_interval: 7,
            retry_count: 10,
        };
        assert_eq!(cmd.to_command_string(), "AT+JOIN=1:0:7:10");
    }

    #[test]
    fn test_encode_send() {
        let cmd = Command::Send { port: 1, hex_payload: "48656c6c6f".to_string() };
        assert_eq!(cmd.encode(), b"AT+SEND=1:48656c6c6f\n");
    }

    #[test]
    fn test_encode_sleep() {
        assert_eq!(Command::Sleep { duration_ms: None }.to_command_string(), "AT+SLEEP");
        assert_eq!(
            Command::Sleep { duration_ms: Some(5000) }.to_command_string(),
            "AT+SLEEP=5000"
        );
    }

    #[test]
    fn test_band_codes() {
        assert_eq!(Band::Eu868.as_str(), "4");
        assert_eq!(Band::As923_1JpLbt.as_str(), "8-1-JP");
    }

    #[test]
    fn test_join_mode_codes() {
        assert_eq!(JoinMode::Otaa.as_str(), "1");
        assert_eq!(JoinMode::Abp.as_str(), "0");
    }
}
