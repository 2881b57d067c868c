//! Typed configuration facade over the AT parameter set.
//!
//! Every setter validates its argument locally before any transport traffic;
//! a rejected argument costs nothing on the wire. Getters return the raw
//! value string the module reported, or an empty string for parameters the
//! module answers without a value.
//!
//! Identity parameters are validated against the fixed hex lengths the
//! module's CLI accepts: 4 characters for the device address, 8 for the
//! EUIs, 16 for the session and application keys.

use rak3172_protocol::{
    hex, AtKey, Band, BaudRate, Command, DeviceClass, JoinMode, LinkCheckMode, LowPowerLevel,
};
use tracing::info;

use crate::driver::Rak3172;
use crate::error::{DriverResult, Error};
use crate::transport::Transport;

impl<T: Transport> Rak3172<T> {
    // ------------------------------------------------------------------
    // Shared plumbing
    // ------------------------------------------------------------------

    fn set_param(&self, key: AtKey, value: impl Into<String>) -> DriverResult<()> {
        self.send_command(Command::Set { key, value: value.into() })
    }

    fn get_param(&self, key: AtKey) -> DriverResult<String> {
        self.get_command(Command::Query { key })
    }

    fn set_switch(&self, key: AtKey, enabled: bool) -> DriverResult<()> {
        self.set_param(key, if enabled { "1" } else { "0" })
    }

    fn set_hex_param(&self, key: AtKey, value: &str, hex_len: usize) -> DriverResult<()> {
        if !hex::is_hex_string(value, hex_len) {
            return Err(Error::InvalidArgument(format!(
                "{} must be exactly {} hex characters",
                key.as_str(),
                hex_len
            )));
        }
        self.set_param(key, value)
    }

    fn require_otaa(&self) -> DriverResult<()> {
        if self.session().join_mode == JoinMode::Otaa {
            Ok(())
        } else {
            Err(Error::WrongJoinMode)
        }
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    /// Set the device EUI (8 hex characters).
    pub fn set_device_eui(&self, eui: &str) -> DriverResult<()> {
        self.set_hex_param(AtKey::DevEui, eui, 8)
    }

    pub fn device_eui(&self) -> DriverResult<String> {
        self.get_param(AtKey::DevEui)
    }

    /// Set the application EUI (8 hex characters).
    pub fn set_app_eui(&self, eui: &str) -> DriverResult<()> {
        self.set_hex_param(AtKey::AppEui, eui, 8)
    }

    pub fn app_eui(&self) -> DriverResult<String> {
        self.get_param(AtKey::AppEui)
    }

    /// Set the application key (16 hex characters).
    pub fn set_app_key(&self, key: &str) -> DriverResult<()> {
        self.set_hex_param(AtKey::AppKey, key, 16)
    }

    pub fn app_key(&self) -> DriverResult<String> {
        self.get_param(AtKey::AppKey)
    }

    /// Set the application session key (16 hex characters).
    pub fn set_app_session_key(&self, key: &str) -> DriverResult<()> {
        self.set_hex_param(AtKey::AppSKey, key, 16)
    }

    pub fn app_session_key(&self) -> DriverResult<String> {
        self.get_param(AtKey::AppSKey)
    }

    /// Set the network session key (16 hex characters).
    pub fn set_network_session_key(&self, key: &str) -> DriverResult<()> {
        self.set_hex_param(AtKey::NwkSKey, key, 16)
    }

    pub fn network_session_key(&self) -> DriverResult<String> {
        self.get_param(AtKey::NwkSKey)
    }

    /// Set the device address (4 hex characters).
    pub fn set_device_address(&self, addr: &str) -> DriverResult<()> {
        self.set_hex_param(AtKey::DevAddr, addr, 4)
    }

    pub fn device_address(&self) -> DriverResult<String> {
        self.get_param(AtKey::DevAddr)
    }

    pub fn network_id(&self) -> DriverResult<String> {
        self.get_param(AtKey::NetId)
    }

    // ------------------------------------------------------------------
    // Activation
    // ------------------------------------------------------------------

    /// Set the join mode and remember it in the session.
    pub fn set_join_mode(&self, mode: JoinMode) -> DriverResult<()> {
        self.set_param(AtKey::JoinMode, mode.as_str())?;
        self.shared.session.lock().unwrap().join_mode = mode;
        Ok(())
    }

    pub fn join_mode(&self) -> DriverResult<String> {
        self.get_param(AtKey::JoinMode)
    }

    /// Network join state as the module reports it (`AT+NJS`).
    pub fn network_join_state(&self) -> DriverResult<String> {
        self.get_param(AtKey::JoinState)
    }

    /// Configure OTAA activation in one shot: join mode, device EUI,
    /// application EUI and application key, stopping at the first failure.
    ///
    /// All three identifiers are validated before anything is sent.
    pub fn set_otaa(&self, dev_eui: &str, app_eui: &str, app_key: &str) -> DriverResult<()> {
        if !hex::is_hex_string(dev_eui, 8) {
            return Err(Error::InvalidArgument(
                "device EUI must be exactly 8 hex characters".to_string(),
            ));
        }
        if !hex::is_hex_string(app_eui, 8) {
            return Err(Error::InvalidArgument(
                "application EUI must be exactly 8 hex characters".to_string(),
            ));
        }
        if !hex::is_hex_string(app_key, 16) {
            return Err(Error::InvalidArgument(
                "application key must be exactly 16 hex characters".to_string(),
            ));
        }
        self.set_join_mode(JoinMode::Otaa)?;
        self.set_param(AtKey::DevEui, dev_eui)?;
        self.set_param(AtKey::AppEui, app_eui)?;
        self.set_param(AtKey::AppKey, app_key)?;
        info!("otaa activation configured");
        Ok(())
    }

    /// Configure ABP activation in one shot: join mode, device address,
    /// application session key and network session key, stopping at the
    /// first failure.
    pub fn set_abp(
        &self,
        dev_addr: &str,
        app_session_key: &str,
        network_session_key: &str,
    ) -> DriverResult<()> {
        if !hex::is_hex_string(dev_addr, 4) {
            return Err(Error::InvalidArgument(
                "device address must be exactly 4 hex characters".to_string(),
            ));
        }
        if !hex::is_hex_string(app_session_key, 16) {
            return Err(Error::InvalidArgument(
                "application session key must be exactly 16 hex characters".to_string(),
            ));
        }
        if !hex::is_hex_string(network_session_key, 16) {
            return Err(Error::InvalidArgument(
                "network session key must be exactly 16 hex characters".to_string(),
            ));
        }
        self.set_join_mode(JoinMode::Abp)?;
        self.set_param(AtKey::DevAddr, dev_addr)?;
        self.set_param(AtKey::AppSKey, app_session_key)?;
        self.set_param(AtKey::NwkSKey, network_session_key)?;
        info!("abp activation configured");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Region and radio
    // ------------------------------------------------------------------

    pub fn set_band(&self, band: Band) -> DriverResult<()> {
        self.set_param(AtKey::Band, band.as_str())
    }

    pub fn band(&self) -> DriverResult<String> {
        self.get_param(AtKey::Band)
    }

    /// Set the channel mask (4 hex characters; wide-band regions only).
    pub fn set_channel_mask(&self, mask: &str) -> DriverResult<()> {
        self.set_hex_param(AtKey::ChannelMask, mask, 4)
    }

    pub fn channel_mask(&self) -> DriverResult<String> {
        self.get_param(AtKey::ChannelMask)
    }

    /// Set the band and channel mask together, stopping at the first failure.
    pub fn set_band_with_mask(&self, band: Band, mask: &str) -> DriverResult<()> {
        if !hex::is_hex_string(mask, 4) {
            return Err(Error::InvalidArgument(
                "channel mask must be exactly 4 hex characters".to_string(),
            ));
        }
        self.set_band(band)?;
        self.set_param(AtKey::ChannelMask, mask)
    }

    /// Set the device class and remember it in the session.
    pub fn set_device_class(&self, class: DeviceClass) -> DriverResult<()> {
        self.set_param(AtKey::Class, class.as_str())?;
        self.shared.session.lock().unwrap().device_class = class;
        Ok(())
    }

    pub fn device_class(&self) -> DriverResult<String> {
        self.get_param(AtKey::Class)
    }

    /// Set the data rate (0-7).
    pub fn set_data_rate(&self, dr: u8) -> DriverResult<()> {
        if dr > 7 {
            return Err(Error::InvalidArgument(format!(
                "data rate must be in 0..=7, got {}",
                dr
            )));
        }
        self.set_param(AtKey::DataRate, dr.to_string())
    }

    pub fn data_rate(&self) -> DriverResult<String> {
        self.get_param(AtKey::DataRate)
    }

    /// Set the transmit power index (0-14, region dependent).
    pub fn set_tx_power(&self, txp: u8) -> DriverResult<()> {
        if txp > 14 {
            return Err(Error::InvalidArgument(format!(
                "tx power must be in 0..=14, got {}",
                txp
            )));
        }
        self.set_param(AtKey::TxPower, txp.to_string())
    }

    pub fn tx_power(&self) -> DriverResult<String> {
        self.get_param(AtKey::TxPower)
    }

    pub fn set_adr(&self, enabled: bool) -> DriverResult<()> {
        self.set_switch(AtKey::Adr, enabled)
    }

    pub fn adr(&self) -> DriverResult<String> {
        self.get_param(AtKey::Adr)
    }

    pub fn set_duty_cycle(&self, enabled: bool) -> DriverResult<()> {
        self.set_switch(AtKey::DutyCycle, enabled)
    }

    pub fn duty_cycle(&self) -> DriverResult<String> {
        self.get_param(AtKey::DutyCycle)
    }

    /// Remaining duty cycle wait time in seconds (EU868/RU864 only).
    pub fn duty_time(&self) -> DriverResult<String> {
        self.get_param(AtKey::DutyTime)
    }

    pub fn set_lbt(&self, enabled: bool) -> DriverResult<()> {
        self.set_switch(AtKey::Lbt, enabled)
    }

    pub fn lbt(&self) -> DriverResult<String> {
        self.get_param(AtKey::Lbt)
    }

    pub fn set_link_check(&self, mode: LinkCheckMode) -> DriverResult<()> {
        self.set_param(AtKey::LinkCheck, mode.as_str())
    }

    pub fn link_check(&self) -> DriverResult<String> {
        self.get_param(AtKey::LinkCheck)
    }

    // ------------------------------------------------------------------
    // Receive windows
    // ------------------------------------------------------------------

    /// Set the RX1 window delay in seconds (1-15).
    pub fn set_rx1_delay(&self, secs: u8) -> DriverResult<()> {
        if !(1..=15).contains(&secs) {
            return Err(Error::InvalidArgument(format!(
                "rx1 delay must be in 1..=15 seconds, got {}",
                secs
            )));
        }
        self.set_param(AtKey::Rx1Delay, secs.to_string())
    }

    pub fn rx1_delay(&self) -> DriverResult<String> {
        self.get_param(AtKey::Rx1Delay)
    }

    /// Set the RX2 window delay in seconds (2-16).
    pub fn set_rx2_delay(&self, secs: u8) -> DriverResult<()> {
        if !(2..=16).contains(&secs) {
            return Err(Error::InvalidArgument(format!(
                "rx2 delay must be in 2..=16 seconds, got {}",
                secs
            )));
        }
        self.set_param(AtKey::Rx2Delay, secs.to_string())
    }

    pub fn rx2_delay(&self) -> DriverResult<String> {
        self.get_param(AtKey::Rx2Delay)
    }

    /// Set the RX2 window data rate (0-13, region dependent).
    pub fn set_rx2_data_rate(&self, dr: u8) -> DriverResult<()> {
        if dr > 13 {
            return Err(Error::InvalidArgument(format!(
                "rx2 data rate must be in 0..=13, got {}",
                dr
            )));
        }
        self.set_param(AtKey::Rx2DataRate, dr.to_string())
    }

    pub fn rx2_data_rate(&self) -> DriverResult<String> {
        self.get_param(AtKey::Rx2DataRate)
    }

    pub fn rx2_frequency(&self) -> DriverResult<String> {
        self.get_param(AtKey::Rx2Frequency)
    }

    /// Set the join RX1 window delay in seconds (1-14). OTAA only.
    pub fn set_join_rx1_delay(&self, secs: u8) -> DriverResult<()> {
        self.require_otaa()?;
        if !(1..=14).contains(&secs) {
            return Err(Error::InvalidArgument(format!(
                "join rx1 delay must be in 1..=14 seconds, got {}",
                secs
            )));
        }
        self.set_param(AtKey::JoinRx1Delay, secs.to_string())
    }

    pub fn join_rx1_delay(&self) -> DriverResult<String> {
        self.get_param(AtKey::JoinRx1Delay)
    }

    /// Set the join RX2 window delay in seconds (1-14). OTAA only.
    pub fn set_join_rx2_delay(&self, secs: u8) -> DriverResult<()> {
        self.require_otaa()?;
        if !(1..=14).contains(&secs) {
            return Err(Error::InvalidArgument(format!(
                "join rx2 delay must be in 1..=14 seconds, got {}",
                secs
            )));
        }
        self.set_param(AtKey::JoinRx2Delay, secs.to_string())
    }

    pub fn join_rx2_delay(&self) -> DriverResult<String> {
        self.get_param(AtKey::JoinRx2Delay)
    }

    // ------------------------------------------------------------------
    // Uplink behavior
    // ------------------------------------------------------------------

    /// Switch confirmed uplinks on or off and remember it in the session.
    pub fn set_confirmed(&self, enabled: bool) -> DriverResult<()> {
        self.set_switch(AtKey::Confirm, enabled)?;
        self.shared.session.lock().unwrap().confirmed_uplink = enabled;
        Ok(())
    }

    pub fn confirmed(&self) -> DriverResult<String> {
        self.get_param(AtKey::Confirm)
    }

    /// Set the retransmission count for confirmed uplinks (0-7).
    pub fn set_retransmission(&self, count: u8) -> DriverResult<()> {
        if count > 7 {
            return Err(Error::InvalidArgument(format!(
                "retransmission count must be in 0..=7, got {}",
                count
            )));
        }
        self.set_param(AtKey::Retransmission, count.to_string())
    }

    pub fn retransmission(&self) -> DriverResult<String> {
        self.get_param(AtKey::Retransmission)
    }

    // ------------------------------------------------------------------
    // Multicast
    // ------------------------------------------------------------------

    /// Register a multicast group.
    ///
    /// `AT+ADDMULC=<class>:<devaddr>:<nwkskey>:<appskey>:<freq>:<dr>:<period>`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_multicast(
        &self,
        class: DeviceClass,
        dev_addr: &str,
        network_session_key: &str,
        app_session_key: &str,
        frequency_hz: u32,
        data_rate: u8,
        periodicity: u8,
    ) -> DriverResult<()> {
        if data_rate > 7 {
            return Err(Error::InvalidArgument(format!(
                "multicast data rate must be in 0..=7, got {}",
                data_rate
            )));
        }
        let value = format!(
            "{}:{}:{}:{}:{}:{}:{}",
            class.as_str(),
            dev_addr,
            network_session_key,
            app_session_key,
            frequency_hz,
            data_rate,
            periodicity
        );
        self.set_param(AtKey::AddMulticast, value)
    }

    /// Remove a multicast group by its device address.
    pub fn remove_multicast(&self, dev_addr: &str) -> DriverResult<()> {
        self.set_param(AtKey::RemoveMulticast, dev_addr)
    }

    pub fn multicast_list(&self) -> DriverResult<String> {
        self.get_param(AtKey::ListMulticast)
    }

    // ------------------------------------------------------------------
    // Serial and power
    // ------------------------------------------------------------------

    /// Change the module's baud rate, then retune the transport to match.
    pub fn set_baud_rate(&self, rate: BaudRate) -> DriverResult<()> {
        self.set_param(AtKey::Baud, rate.bps().to_string())?;
        let mut port = self.shared.transport.acquire(self.shared.config.lock_timeout)?;
        port.io.set_baud_rate(rate.bps())?;
        Ok(())
    }

    pub fn baud_rate(&self) -> DriverResult<String> {
        self.get_param(AtKey::Baud)
    }

    pub fn set_low_power_mode(&self, enabled: bool) -> DriverResult<()> {
        self.set_switch(AtKey::LowPowerMode, enabled)
    }

    pub fn low_power_mode(&self) -> DriverResult<String> {
        self.get_param(AtKey::LowPowerMode)
    }

    pub fn set_low_power_level(&self, level: LowPowerLevel) -> DriverResult<()> {
        self.set_param(AtKey::LowPowerLevel, level.as_str())
    }

    pub fn low_power_level(&self) -> DriverResult<String> {
        self.get_param(AtKey::LowPowerLevel)
    }

    /// Put the module to sleep, for `duration_ms` or until woken if `None`.
    ///
    /// The module answers with `OK` before sleeping; it does not respond to
    /// commands again until it wakes.
    pub fn sleep(&self, duration_ms: Option<u32>) -> DriverResult<()> {
        self.send_command(Command::Sleep { duration_ms })
    }

    /// Set the device alias (1-16 characters).
    pub fn set_device_alias(&self, alias: &str) -> DriverResult<()> {
        if alias.is_empty() || alias.len() > 16 {
            return Err(Error::InvalidArgument(format!(
                "alias must be 1..=16 characters, got {}",
                alias.len()
            )));
        }
        self.set_param(AtKey::Alias, alias)
    }

    pub fn device_alias(&self) -> DriverResult<String> {
        self.get_param(AtKey::Alias)
    }

    // ------------------------------------------------------------------
    // Diagnostics (read only)
    // ------------------------------------------------------------------

    pub fn version(&self) -> DriverResult<String> {
        self.get_param(AtKey::Version)
    }

    pub fn serial_number(&self) -> DriverResult<String> {
        self.get_param(AtKey::SerialNumber)
    }

    pub fn battery(&self) -> DriverResult<String> {
        self.get_param(AtKey::Battery)
    }

    pub fn build_time(&self) -> DriverResult<String> {
        self.get_param(AtKey::BuildTime)
    }

    pub fn repo_info(&self) -> DriverResult<String> {
        self.get_param(AtKey::RepoInfo)
    }

    pub fn cli_version(&self) -> DriverResult<String> {
        self.get_param(AtKey::CliVersion)
    }

    pub fn api_version(&self) -> DriverResult<String> {
        self.get_param(AtKey::ApiVersion)
    }

    pub fn hw_model(&self) -> DriverResult<String> {
        self.get_param(AtKey::HwModel)
    }

    pub fn hw_id(&self) -> DriverResult<String> {
        self.get_param(AtKey::HwId)
    }

    pub fn system_voltage(&self) -> DriverResult<String> {
        self.get_param(AtKey::SystemVoltage)
    }
}
