//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements   | Connects to                     |
//! |---------------|--------------|---------------------------------|
//! | `display`     | EventSink    | Front-panel labels              |
//! | `hardware`    | ActuatorPort | Heater relay (GPIO)             |
//! | `http_sensor` | SensorPort   | Sensor node over HTTP           |
//! | `log_sink`    | EventSink    | Serial log output               |
//! | `nvs`         | ConfigPort   | NVS / in-memory store           |
//! | `poller`      | —            | Poll worker → event queue       |
//! | `time`        | Clock        | ESP32 system timer              |
//! | `wifi`        | —            | ESP-IDF WiFi STA bring-up       |

pub mod display;
pub mod hardware;
pub mod http_sensor;
pub mod log_sink;
pub mod nvs;
pub mod poller;
pub mod time;
pub mod wifi;
