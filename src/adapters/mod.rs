//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                 |
//! |-------------|--------------------|-----------------------------|
//! | `hardware`  | DriverPort         | Sensor driver settings      |
//! |             | IndicatorPort      | Status LED GPIO             |
//! |             | FaceClassifier     | Accelerometer gravity axis  |
//! | `log_sink`  | EventSink          | Serial log output           |
//! | `nvs`       | ConfigPort         | NVS / in-memory store       |
//! |             | StoragePort        |                             |
//! | `time`      | TickSource         | ESP32 system timer          |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
