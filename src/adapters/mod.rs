//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements     | Connects to                        |
//! |------------------|----------------|------------------------------------|
//! | `gpio`           | OutputPort     | ESP32 GPIO (`PinDriver`) / sim pins |
//! | `log_sink`       | EventSink      | Serial log output                  |
//! | `line_transport` | ParamTransport | `node/property=value` text lines   |

pub mod gpio;
pub mod line_transport;
pub mod log_sink;
