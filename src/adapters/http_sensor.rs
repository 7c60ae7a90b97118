//! HTTP sensor adapter.
//!
//! Implements [`SensorPort`] with a blocking `GET` against the sensor
//! endpoint, which answers with
//!
//! ```text
//! {"temperature": 22.4, "humidity": 41.0}     success
//! {"error": "DHT read failed"}                endpoint-side failure
//! ```
//!
//! Only the poll worker thread calls into this adapter.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspHttpConnection` wrapped in the
//!   `embedded_svc` HTTP client.
//! - **all other targets**: a canned response set with
//!   [`HttpSensorAdapter::respond_with`], decoded through the same path.

use log::warn;
use serde::Deserialize;

use crate::app::model::Measurement;
use crate::app::ports::SensorPort;
use crate::error::SensorError;

/// Largest response body accepted from the endpoint.
const MAX_BODY: usize = 512;

/// Plausible operating range of the remote sensor.
const TEMPERATURE_RANGE_C: core::ops::RangeInclusive<f32> = -40.0..=80.0;
const HUMIDITY_RANGE_PCT: core::ops::RangeInclusive<f32> = 0.0..=100.0;

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Reading { temperature: f32, humidity: f32 },
    Failure { error: String },
}

/// Decode an endpoint response body into a [`Measurement`].
pub fn decode_payload(body: &[u8]) -> Result<Measurement, SensorError> {
    match serde_json::from_slice::<Payload>(body) {
        Ok(Payload::Reading {
            temperature,
            humidity,
        }) => {
            if !TEMPERATURE_RANGE_C.contains(&temperature) || !HUMIDITY_RANGE_PCT.contains(&humidity)
            {
                return Err(SensorError::OutOfRange);
            }
            Ok(Measurement {
                temperature_c: temperature,
                humidity_pct: humidity,
            })
        }
        Ok(Payload::Failure { error }) => {
            warn!("Sensor endpoint reported: {}", error);
            Err(SensorError::Remote)
        }
        Err(_) => Err(SensorError::Decode),
    }
}

pub struct HttpSensorAdapter {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    url: String,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    timeout_ms: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_response: Option<(u16, Vec<u8>)>,
}

impl HttpSensorAdapter {
    pub fn new(url: &str, timeout_ms: u32) -> Self {
        Self {
            url: url.to_owned(),
            timeout_ms,
            #[cfg(not(target_os = "espidf"))]
            sim_response: None,
        }
    }

    /// Set the status and body every subsequent poll receives (simulation).
    #[cfg(not(target_os = "espidf"))]
    pub fn respond_with(&mut self, status: u16, body: &str) {
        self.sim_response = Some((status, body.as_bytes().to_vec()));
    }

    /// Make every subsequent poll fail at the transport level (simulation).
    #[cfg(not(target_os = "espidf"))]
    pub fn disconnect(&mut self) {
        self.sim_response = None;
    }

    #[cfg(target_os = "espidf")]
    fn fetch(&mut self) -> Result<(u16, Vec<u8>), SensorError> {
        use embedded_svc::http::client::Client as HttpClient;
        use embedded_svc::http::{Method, Status};
        use embedded_svc::io::Read;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let conf = Configuration {
            timeout: Some(core::time::Duration::from_millis(u64::from(self.timeout_ms))),
            ..Default::default()
        };
        let connection = EspHttpConnection::new(&conf).map_err(|e| {
            warn!("Sensor: HTTP connection setup failed: {:?}", e);
            SensorError::Transport
        })?;
        let mut client = HttpClient::wrap(connection);
        let request = client.request(Method::Get, &self.url, &[]).map_err(|e| {
            warn!("Sensor: request to {} failed: {:?}", self.url, e);
            SensorError::Transport
        })?;
        let mut response = request.submit().map_err(|e| {
            warn!("Sensor: submit to {} failed: {:?}", self.url, e);
            SensorError::Transport
        })?;

        let status = response.status();
        let mut body = Vec::with_capacity(128);
        let mut chunk = [0u8; 128];
        loop {
            let read = response.read(&mut chunk).map_err(|e| {
                warn!("Sensor: body read failed: {:?}", e);
                SensorError::Transport
            })?;
            if read == 0 {
                break;
            }
            if body.len() + read > MAX_BODY {
                return Err(SensorError::Decode);
            }
            body.extend_from_slice(&chunk[..read]);
        }
        Ok((status, body))
    }

    #[cfg(not(target_os = "espidf"))]
    fn fetch(&mut self) -> Result<(u16, Vec<u8>), SensorError> {
        let (status, body) = self.sim_response.clone().ok_or(SensorError::Transport)?;
        if body.len() > MAX_BODY {
            return Err(SensorError::Decode);
        }
        Ok((status, body))
    }
}

impl SensorPort for HttpSensorAdapter {
    fn poll(&mut self) -> Result<Measurement, SensorError> {
        let (status, body) = self.fetch()?;
        if !(200..300).contains(&status) {
            return Err(SensorError::HttpStatus(status));
        }
        decode_payload(&body)
    }
}
